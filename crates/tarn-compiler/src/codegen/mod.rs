//! Code generation support
//!
//! The emitter that produces bytecode is an external collaborator. This
//! module holds what it drives while walking a lowered function: the lexical
//! slot allocator, the method emitter seam, and shared scope call
//! descriptors.

pub mod context;
pub mod emitter;
pub mod shared_call;

pub use context::{CodegenContext, ExprKey};
pub use emitter::{LocalVariableEntry, LocalVariableTable, MethodEmitter};
pub use shared_call::{CallSiteFlags, SharedCallKey, SharedScopeCall};
