//! Shared scope calls
//!
//! Accessing a variable that lives in a scope object, or calling a function
//! found there, takes a fair amount of bytecode. Call sites with the same
//! shape share one generated trampoline method instead; this module defines
//! the structural key those trampolines are cached by.

use std::fmt;
use std::ops::BitOr;

use tarn_ast::{Synthetic, SymbolId, ValueKind};

/// Call-site flags that change the generated trampoline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CallSiteFlags(u32);

impl CallSiteFlags {
    pub const NONE: CallSiteFlags = CallSiteFlags(0);
    /// The callee is looked up in scope rather than on a receiver
    pub const SCOPE: CallSiteFlags = CallSiteFlags(1);
    /// The call site is in strict code
    pub const STRICT: CallSiteFlags = CallSiteFlags(1 << 1);
    /// Scope lookup may skip `with` and eval checks
    pub const FAST_SCOPE: CallSiteFlags = CallSiteFlags(1 << 2);
    /// The return type is a guess that may be deoptimized
    pub const OPTIMISTIC: CallSiteFlags = CallSiteFlags(1 << 3);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: CallSiteFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for CallSiteFlags {
    type Output = CallSiteFlags;

    fn bitor(self, rhs: CallSiteFlags) -> CallSiteFlags {
        CallSiteFlags(self.0 | rhs.0)
    }
}

/// Structural identity of a shared scope call
///
/// `param_types` is `None` for a plain variable read ("scope get"), which
/// keeps a get distinct from a call with no arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SharedCallKey {
    pub symbol: SymbolId,
    pub value_type: ValueKind,
    pub return_type: ValueKind,
    pub param_types: Option<Vec<ValueKind>>,
    pub flags: CallSiteFlags,
}

impl SharedCallKey {
    pub fn call(
        symbol: SymbolId,
        value_type: ValueKind,
        return_type: ValueKind,
        param_types: Vec<ValueKind>,
        flags: CallSiteFlags,
    ) -> Self {
        Self {
            symbol,
            value_type,
            return_type,
            param_types: Some(param_types),
            flags,
        }
    }

    pub fn get(symbol: SymbolId, value_type: ValueKind, flags: CallSiteFlags) -> Self {
        Self {
            symbol,
            value_type,
            return_type: value_type,
            param_types: None,
            flags,
        }
    }
}

/// Descriptor of a generated trampoline
#[derive(Debug, PartialEq, Eq)]
pub struct SharedScopeCall {
    key: SharedCallKey,
    unit_name: String,
    name: Synthetic,
}

impl SharedScopeCall {
    pub(crate) fn new(key: SharedCallKey, unit_name: String, name: Synthetic) -> Self {
        Self {
            key,
            unit_name,
            name,
        }
    }

    pub fn key(&self) -> &SharedCallKey {
        &self.key
    }

    pub fn symbol(&self) -> SymbolId {
        self.key.symbol
    }

    pub fn is_get(&self) -> bool {
        self.key.param_types.is_none()
    }

    /// Compile unit the trampoline is generated into
    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    /// Unit-unique method name, e.g. `:scopeCall3`
    pub fn name(&self) -> Synthetic {
        self.name
    }
}

impl fmt::Display for SharedScopeCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.unit_name, self.name)
    }
}
