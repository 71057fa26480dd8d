//! Tarn syntax tree
//!
//! Statement and expression nodes consumed and produced by the Tarn lowering
//! pass, the names and symbols that annotate them, and visitors for walking
//! them.

pub mod build;
pub mod expression;
pub mod function;
pub mod name;
pub mod span;
pub mod statement;
pub mod symbol;
pub mod visit_mut;
pub mod visitor;

pub use expression::*;
pub use function::{FunctionFlags, FunctionId, FunctionKind, FunctionNode, Param};
pub use name::{Ident, Name, Synthetic, SyntheticKind};
pub use span::Span;
pub use statement::*;
pub use symbol::{Symbol, SymbolFlags, SymbolId, ValueKind};
pub use visit_mut::*;
pub use visitor::*;
