//! Symbols
//!
//! A symbol is a binding declared directly in some block. Slots are assigned
//! by the code generator's lexical context while the lowered tree is
//! emitted; until then `slot` is `None`.

use crate::name::Name;
use crate::span::Span;

/// Compile-unit unique symbol identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

/// Runtime representation chosen for a value
///
/// Decided by type inference, which lives outside the lowering pass; symbols
/// default to `Object`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueKind {
    Boolean,
    Int,
    Long,
    Number,
    #[default]
    Object,
}

impl ValueKind {
    /// Number of storage units one value occupies
    pub fn slot_width(self) -> u16 {
        match self {
            ValueKind::Long | ValueKind::Number => 2,
            ValueKind::Boolean | ValueKind::Int | ValueKind::Object => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SymbolFlags {
    pub is_var: bool,
    pub is_let: bool,
    pub is_const: bool,
    pub is_param: bool,
    /// Compiler-synthesized; excluded from user name collision checks
    pub is_internal: bool,
    /// Lives in a scope object rather than a local slot
    pub is_scope: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: Name,
    pub flags: SymbolFlags,
    pub value_kind: ValueKind,
    pub slot: Option<u16>,
    pub span: Span,
}

impl Symbol {
    pub fn new(id: SymbolId, name: Name, flags: SymbolFlags, span: Span) -> Self {
        Self {
            id,
            name,
            flags,
            value_kind: ValueKind::default(),
            slot: None,
            span,
        }
    }

    /// Storage units this symbol's slot spans
    pub fn width(&self) -> u16 {
        self.value_kind.slot_width()
    }

    /// Scope-object symbols are accessed by name and get no slot
    pub fn has_slot(&self) -> bool {
        !self.flags.is_scope
    }

    pub fn is_internal(&self) -> bool {
        self.flags.is_internal
    }

    pub fn is_slot_assigned(&self) -> bool {
        self.slot.is_some()
    }
}
