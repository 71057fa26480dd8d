//! Statement AST nodes
//!
//! Besides the usual JavaScript statements this includes two node kinds that
//! only the lowering pass produces:
//! - [`Statement::JumpToInlinedFinally`], a jump to one of the enclosing
//!   try's inlined finally blocks
//! - [`TryStatement::inlined_finallies`], the labeled finally copies such
//!   jumps land in
//!
//! Terminality ("no statement after this one in the same block can run") is
//! answered by [`Statement::is_terminal`]. For blocks, labels and switches it
//! is a flag the lowering pass computes; for everything else it follows from
//! the node's shape.

use crate::expression::Expression;
use crate::name::{Ident, Name, Synthetic};
use crate::span::Span;
use crate::symbol::Symbol;

/// Statement node
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Nested block
    Block(Block),

    /// Expression evaluated for side effects
    Expression(ExpressionStatement),

    /// `var` / `let` / `const` declaration (function declarations included)
    VarDecl(VarDecl),

    /// If statement
    If(IfStatement),

    /// While and do-while loops
    While(WhileStatement),

    /// Classic for, for-in and for-of loops
    For(ForStatement),

    /// Switch statement
    Switch(SwitchStatement),

    /// Break statement
    Break(JumpStatement),

    /// Continue statement
    Continue(JumpStatement),

    /// Return statement
    Return(ReturnStatement),

    /// Throw statement
    Throw(ThrowStatement),

    /// Try-catch-finally
    Try(TryStatement),

    /// Labeled statement
    Label(LabelStatement),

    /// With statement
    With(WithStatement),

    /// Jump into an inlined finally block (produced by lowering)
    JumpToInlinedFinally(InlinedFinallyJump),

    /// Class declaration (unsupported)
    ClassDecl(ClassDecl),

    /// Import or export declaration (unsupported)
    Module(ModuleItem),

    /// Empty statement (;)
    Empty(Span),
}

impl Statement {
    /// Get the span of this statement
    pub fn span(&self) -> Span {
        match self {
            Statement::Block(s) => s.span,
            Statement::Expression(s) => s.span,
            Statement::VarDecl(s) => s.span,
            Statement::If(s) => s.span,
            Statement::While(s) => s.span,
            Statement::For(s) => s.span,
            Statement::Switch(s) => s.span,
            Statement::Break(s) => s.span,
            Statement::Continue(s) => s.span,
            Statement::Return(s) => s.span,
            Statement::Throw(s) => s.span,
            Statement::Try(s) => s.span,
            Statement::Label(s) => s.span,
            Statement::With(s) => s.span,
            Statement::JumpToInlinedFinally(s) => s.span,
            Statement::ClassDecl(s) => s.span,
            Statement::Module(s) => s.span,
            Statement::Empty(span) => *span,
        }
    }

    /// Can control ever reach the statement after this one?
    pub fn is_terminal(&self) -> bool {
        match self {
            Statement::Return(_)
            | Statement::Throw(_)
            | Statement::Break(_)
            | Statement::Continue(_)
            | Statement::JumpToInlinedFinally(_) => true,
            Statement::Block(s) => s.is_terminal,
            Statement::If(s) => s.is_terminal(),
            Statement::While(s) => s.is_terminal(),
            Statement::For(s) => s.is_terminal(),
            Statement::Switch(s) => s.is_terminal,
            Statement::Label(s) => s.is_terminal,
            Statement::Try(s) => s.is_terminal(),
            Statement::With(s) => s.body.is_terminal,
            Statement::Expression(_)
            | Statement::VarDecl(_)
            | Statement::ClassDecl(_)
            | Statement::Module(_)
            | Statement::Empty(_) => false,
        }
    }

    /// Explicit transfer of control (break, continue, return, jump to an
    /// inlined finally)
    pub fn is_jump(&self) -> bool {
        matches!(
            self,
            Statement::Break(_)
                | Statement::Continue(_)
                | Statement::Return(_)
                | Statement::JumpToInlinedFinally(_)
        )
    }

    /// A declaration without initializer: the only thing allowed to follow a
    /// terminal statement in a lowered block
    pub fn is_uninitialized_var(&self) -> bool {
        matches!(self, Statement::VarDecl(decl) if decl.init.is_none())
    }
}

// ============================================================================
// Blocks
// ============================================================================

/// Sequence of statements with its own lexical scope
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,

    /// Set by lowering: the block never completes normally
    pub is_terminal: bool,

    /// Bindings declared directly in this block, filled in after lowering
    pub symbols: Vec<Symbol>,

    pub span: Span,
}

impl Block {
    /// Create a block and derive its terminal flag from the statements
    pub fn new(statements: Vec<Statement>, span: Span) -> Self {
        let is_terminal = Self::compute_terminal(&statements);
        Self {
            statements,
            is_terminal,
            symbols: Vec::new(),
            span,
        }
    }

    pub fn empty(span: Span) -> Self {
        Self::new(Vec::new(), span)
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// The block is terminal when its last statement is, skipping trailing
    /// hoisting placeholders (uninitialized declarations)
    pub fn compute_terminal(statements: &[Statement]) -> bool {
        statements
            .iter()
            .rev()
            .find(|stmt| !stmt.is_uninitialized_var())
            .is_some_and(Statement::is_terminal)
    }

    /// Last statement that is not a hoisting placeholder
    pub fn last_statement(&self) -> Option<&Statement> {
        self.statements
            .iter()
            .rev()
            .find(|stmt| !stmt.is_uninitialized_var())
    }

    pub fn symbol(&self, name: &Name) -> Option<&Symbol> {
        self.symbols.iter().find(|symbol| &symbol.name == name)
    }
}

// ============================================================================
// Simple statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Var,
    Let,
    Const,
}

/// Variable declaration: `var x = 42;`
///
/// Function declarations are represented as a `var` whose initializer is the
/// function expression, with `is_function_declaration` set.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: VarKind,
    pub binding: Binding,
    pub init: Option<Expression>,
    pub is_function_declaration: bool,
    pub span: Span,
}

impl VarDecl {
    /// Declared name, if the binding is a plain identifier
    pub fn name(&self) -> Option<&Name> {
        match &self.binding {
            Binding::Ident(ident) => Some(&ident.name),
            Binding::Pattern(_) => None,
        }
    }

    /// Copy of this declaration with the initializer dropped
    pub fn without_init(&self) -> VarDecl {
        VarDecl {
            init: None,
            ..self.clone()
        }
    }
}

/// Declaration target
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Ident(Ident),
    /// Destructuring (unsupported)
    Pattern(crate::expression::Pattern),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub test: Expression,
    pub consequent: Block,
    pub alternate: Option<Block>,
    pub span: Span,
}

impl IfStatement {
    pub fn is_terminal(&self) -> bool {
        match &self.alternate {
            Some(alternate) => self.consequent.is_terminal && alternate.is_terminal,
            None => false,
        }
    }
}

/// `break` / `continue`, optionally with a label
#[derive(Debug, Clone, PartialEq)]
pub struct JumpStatement {
    pub label: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStatement {
    pub value: Expression,
    /// Rethrow of a synthetic catch-all
    pub is_rethrow: bool,
    pub span: Span,
}

impl ThrowStatement {
    /// Is this the rethrow of the catch-all binding `exception`?
    pub fn rethrows(&self, exception: Synthetic) -> bool {
        self.is_rethrow && self.value.is_identifier(&Name::Synthetic(exception))
    }
}

// ============================================================================
// Loops
// ============================================================================

/// `while (test) body` or `do body while (test)`
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub test: Expression,
    pub body: Block,
    pub is_do_while: bool,
    /// Some break/continue in the body leaves the loop body
    pub control_flow_escapes: bool,
    pub span: Span,
}

impl WhileStatement {
    /// A do-while whose body never completes normally never reaches its
    /// test, so the loop itself is terminal
    pub fn is_terminal(&self) -> bool {
        self.is_do_while && self.body.is_terminal && !self.control_flow_escapes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForKind {
    /// `for (init; test; update)`
    Classic,
    /// `for (x in object)`
    In,
    /// `for (x of iterable)`
    Of,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    VarDecl(VarDecl),
    Expression(Expression),
}

/// For loop
///
/// For `In`/`Of` loops `init` is the loop binding and `iterable` the value
/// being iterated; `test` and `update` are unused.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub kind: ForKind,
    pub init: Option<ForInit>,
    pub test: Option<Expression>,
    pub update: Option<Expression>,
    pub iterable: Option<Expression>,
    pub body: Block,
    /// Iterator temporary of for-in / for-of loops, set by lowering
    pub iterator: Option<Synthetic>,
    pub control_flow_escapes: bool,
    pub span: Span,
}

impl ForStatement {
    /// A test-less classic loop only ends through an escaping jump
    pub fn is_terminal(&self) -> bool {
        self.kind == ForKind::Classic && self.test.is_none() && !self.control_flow_escapes
    }
}

// ============================================================================
// Switch / label / with
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    pub discriminant: Expression,
    pub cases: Vec<SwitchCase>,
    /// Binding the discriminant is stored in, set by lowering
    pub tag: Option<Synthetic>,
    pub is_terminal: bool,
    pub span: Span,
}

impl SwitchStatement {
    pub fn has_default(&self) -> bool {
        self.cases.iter().any(|case| case.test.is_none())
    }

    /// All case tests are distinct `i32` literals
    pub fn is_unique_integer(&self) -> bool {
        let mut seen = Vec::with_capacity(self.cases.len());
        for case in &self.cases {
            match &case.test {
                None => {}
                Some(Expression::Literal(lit)) => match lit.value.as_int() {
                    Some(value) if !seen.contains(&value) => seen.push(value),
                    _ => return false,
                },
                Some(_) => return false,
            }
        }
        true
    }
}

/// `case test:` (or `default:` when `test` is `None`)
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub test: Option<Expression>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelStatement {
    pub label: String,
    pub body: Box<Statement>,
    pub is_terminal: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithStatement {
    pub object: Expression,
    pub body: Block,
    pub span: Span,
}

// ============================================================================
// Try / catch / finally
// ============================================================================

/// Try statement
///
/// After lowering `finally` is always `None`; its code lives in
/// `inlined_finallies` (one copy per exit edge) and in the statement that
/// follows the try.
#[derive(Debug, Clone, PartialEq)]
pub struct TryStatement {
    pub body: Block,
    pub catches: Vec<CatchClause>,
    pub finally: Option<Block>,
    pub inlined_finallies: Vec<InlinedFinally>,
    pub span: Span,
}

impl TryStatement {
    pub fn new(body: Block, catches: Vec<CatchClause>, finally: Option<Block>, span: Span) -> Self {
        Self {
            body,
            catches,
            finally,
            inlined_finallies: Vec::new(),
            span,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.body.is_terminal && self.catches.iter().all(|c| c.body.is_terminal)
    }

    /// The last catch has a guard, so some exceptions pass through uncaught
    pub fn has_conditional_last_catch(&self) -> bool {
        self.catches
            .last()
            .is_some_and(|catch| catch.condition.is_some())
    }
}

/// `catch (param if condition) { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Ident,
    pub condition: Option<Expression>,
    pub body: Block,
    /// Compiler-generated unconditional catch that rethrows
    pub is_catch_all: bool,
    pub span: Span,
}

/// A copy of a finally body reached through [`InlinedFinallyJump`]
#[derive(Debug, Clone, PartialEq)]
pub struct InlinedFinally {
    pub label: Synthetic,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InlinedFinallyJump {
    pub label: Synthetic,
    pub span: Span,
}

// ============================================================================
// Unsupported declarations
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: Ident,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleItemKind {
    Import,
    Export,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleItem {
    pub kind: ModuleItemKind,
    pub span: Span,
}
