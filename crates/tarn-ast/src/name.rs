//! Binding names
//!
//! Identifiers written by the user are plain strings. Everything the
//! compiler introduces (exception bindings of synthetic catch clauses,
//! inlined-finally labels, switch tags, iterator temporaries, shared scope
//! call trampolines) is a [`Synthetic`] name: a kind plus an integer identity
//! handed out by the compile unit. Two synthetic names are equal only if the
//! same allocation produced them, so duplicating a subtree and giving its
//! binders fresh identities can never collide with the original.

use crate::span::Span;
use std::fmt;

/// Name of a binding or jump label
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Name {
    /// Identifier from the source text
    User(String),
    /// Reserved binding that holds a function's pending result (`:return`)
    Return,
    /// Compiler-introduced binding or label
    Synthetic(Synthetic),
}

impl Name {
    /// Create a user name
    pub fn user(name: impl Into<String>) -> Self {
        Name::User(name.into())
    }

    /// Compiler-introduced names never clash with user declarations
    pub fn is_internal(&self) -> bool {
        !matches!(self, Name::User(_))
    }

    /// Is this the user identifier `name`?
    pub fn is_user(&self, name: &str) -> bool {
        matches!(self, Name::User(n) if n == name)
    }

    pub fn as_synthetic(&self) -> Option<Synthetic> {
        match self {
            Name::Synthetic(s) => Some(*s),
            _ => None,
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Name::User(name) => f.write_str(name),
            Name::Return => f.write_str(":return"),
            Name::Synthetic(s) => s.fmt(f),
        }
    }
}

/// What a synthetic name was minted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SyntheticKind {
    /// Exception binding of a compiler-generated catch-all
    Exception,
    /// Label of an inlined finally block
    Finally,
    /// Tag binding holding a switch discriminant
    Switch,
    /// Iterator of a for-in / for-of loop
    Iterator,
    /// Shared scope call trampoline
    ScopeCall,
}

impl SyntheticKind {
    pub fn prefix(self) -> &'static str {
        match self {
            SyntheticKind::Exception => ":exception",
            SyntheticKind::Finally => ":finally",
            SyntheticKind::Switch => ":switch",
            SyntheticKind::Iterator => ":iter",
            SyntheticKind::ScopeCall => ":scopeCall",
        }
    }
}

/// A compiler-introduced name with a unit-unique identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Synthetic {
    pub kind: SyntheticKind,
    pub id: u32,
}

impl Synthetic {
    pub fn new(kind: SyntheticKind, id: u32) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for Synthetic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.id)
    }
}

/// An identifier occurrence (declaration or reference)
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: Name,
    pub span: Span,
}

impl Ident {
    pub fn new(name: Name, span: Span) -> Self {
        Self { name, span }
    }

    pub fn user(name: impl Into<String>, span: Span) -> Self {
        Self::new(Name::user(name), span)
    }

    pub fn synthetic(name: Synthetic, span: Span) -> Self {
        Self::new(Name::Synthetic(name), span)
    }

    /// Reference to the reserved `:return` binding
    pub fn return_value(span: Span) -> Self {
        Self::new(Name::Return, span)
    }
}
