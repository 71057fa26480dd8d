//! Jump target resolution
//!
//! `break` and `continue` bind lexically: a labeled jump to the nearest
//! enclosing label of that name, an unlabeled `break` to the innermost loop
//! or switch, an unlabeled `continue` to the innermost loop. Walks that need
//! to know whether a jump leaves the subtree they cover keep a
//! [`JumpTargetStack`] of the constructs opened inside it.

use tarn_ast::*;

/// A construct a `break` or `continue` can bind to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JumpTarget {
    Loop,
    Switch,
    Label(String),
}

/// Stack of jump targets opened inside the subtree being walked
#[derive(Debug, Default)]
pub struct JumpTargetStack {
    stack: Vec<JumpTarget>,
}

impl JumpTargetStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, target: JumpTarget) {
        self.stack.push(target);
    }

    pub fn pop(&mut self) -> Option<JumpTarget> {
        self.stack.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.stack
            .iter()
            .any(|target| matches!(target, JumpTarget::Label(name) if name == label))
    }

    pub fn in_loop(&self) -> bool {
        self.stack.contains(&JumpTarget::Loop)
    }

    pub fn in_breakable(&self) -> bool {
        self.stack
            .iter()
            .any(|target| matches!(target, JumpTarget::Loop | JumpTarget::Switch))
    }

    /// Does `stmt` bind to a construct on this stack?
    ///
    /// Only `break` and `continue` can leave through a target; every other
    /// statement resolves trivially.
    pub fn resolves(&self, stmt: &Statement) -> bool {
        match stmt {
            Statement::Break(jump) => match &jump.label {
                Some(label) => self.has_label(label),
                None => self.in_breakable(),
            },
            Statement::Continue(jump) => match &jump.label {
                Some(label) => self.has_label(label),
                None => self.in_loop(),
            },
            _ => true,
        }
    }

    /// Target a statement opens for the statements nested in it
    pub fn target_of(stmt: &Statement) -> Option<JumpTarget> {
        match stmt {
            Statement::While(_) | Statement::For(_) => Some(JumpTarget::Loop),
            Statement::Switch(_) => Some(JumpTarget::Switch),
            Statement::Label(label) => Some(JumpTarget::Label(label.label.clone())),
            _ => None,
        }
    }
}

/// A `break` or `continue` that leaves the walked subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EscapingJump {
    pub is_break: bool,
    pub label: Option<String>,
}

/// Collects the jumps that leave a subtree
///
/// Jumps into inlined finally blocks are not escapes: those blocks end with
/// the original exit, which the walk sees on its own. Nested functions are
/// skipped.
#[derive(Default)]
pub(crate) struct EscapeFinder {
    targets: JumpTargetStack,
    pub escapes: Vec<EscapingJump>,
}

impl EscapeFinder {
    pub fn in_block(block: &Block) -> Vec<EscapingJump> {
        let mut finder = EscapeFinder::default();
        finder.visit_block(block);
        finder.escapes
    }

    pub fn in_statement(stmt: &Statement) -> Vec<EscapingJump> {
        let mut finder = EscapeFinder::default();
        finder.visit_statement(stmt);
        finder.escapes
    }
}

impl Visitor for EscapeFinder {
    fn visit_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Break(jump) | Statement::Continue(jump) => {
                if !self.targets.resolves(stmt) {
                    self.escapes.push(EscapingJump {
                        is_break: matches!(stmt, Statement::Break(_)),
                        label: jump.label.clone(),
                    });
                }
            }
            _ => match JumpTargetStack::target_of(stmt) {
                Some(target) => {
                    self.targets.push(target);
                    walk_statement(self, stmt);
                    self.targets.pop();
                }
                None => walk_statement(self, stmt),
            },
        }
    }

    fn visit_function(&mut self, _func: &FunctionNode) {}
}
