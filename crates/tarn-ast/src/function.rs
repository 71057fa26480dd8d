//! Function nodes

use crate::name::Ident;
use crate::span::Span;
use crate::statement::Block;

/// Compile-unit unique function identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

impl FunctionId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// Top-level script body
    Program,
    /// Function declaration or expression
    Normal,
    /// Arrow function
    Arrow,
    /// `function*` (unsupported)
    Generator,
    /// `async function` (unsupported)
    Async,
}

/// Facts about a function, some from the parser and some from lowering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FunctionFlags {
    /// `"use strict"` (set by the parser, or inherited during lowering)
    pub is_strict: bool,
    /// Declared with a function statement
    pub is_declaration: bool,
    /// Contains a direct `eval(...)` call (set by lowering)
    pub has_eval: bool,
    /// Some nested function contains a direct `eval(...)`, which can read
    /// this function's variables by name (set by lowering)
    pub has_nested_eval: bool,
    /// Contains a `with` statement (set by lowering)
    pub has_with: bool,
    /// Lowering wrote to the reserved `:return` binding
    pub needs_return_slot: bool,
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ident: Ident,
    /// `...rest` (unsupported)
    pub is_rest: bool,
}

impl Param {
    pub fn new(ident: Ident) -> Self {
        Self {
            ident,
            is_rest: false,
        }
    }
}

/// Function (or whole script) with its own statement tree
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    pub id: FunctionId,
    pub name: Option<Ident>,
    pub kind: FunctionKind,
    pub params: Vec<Param>,
    pub body: Block,
    pub flags: FunctionFlags,
    pub span: Span,
}

impl FunctionNode {
    pub fn new(
        id: FunctionId,
        name: Option<Ident>,
        kind: FunctionKind,
        params: Vec<Param>,
        body: Block,
        span: Span,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            params,
            body,
            flags: FunctionFlags::default(),
            span,
        }
    }

    pub fn is_program(&self) -> bool {
        self.kind == FunctionKind::Program
    }

    /// Bindings can appear at runtime: a direct eval in sloppy code can
    /// declare new variables in the function's scope
    pub fn is_dynamic_scope(&self) -> bool {
        self.flags.has_eval && !self.flags.is_strict
    }

    /// Name for logs and diagnostics
    pub fn display_name(&self) -> String {
        match (&self.name, self.kind) {
            (Some(name), _) => name.name.to_string(),
            (None, FunctionKind::Program) => ":program".to_string(),
            (None, _) => format!(":anonymous{}", self.id.0),
        }
    }
}
