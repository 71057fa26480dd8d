//! Compile units
//!
//! A compile unit owns everything that must be unique or shared across the
//! functions compiled together: synthetic name, function and symbol
//! counters, and the shared scope call cache. It is passed explicitly, so
//! independent units can be compiled on different threads.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tarn_ast::{FunctionId, Synthetic, SyntheticKind, SymbolId};
use tracing::trace;

use crate::codegen::shared_call::{SharedCallKey, SharedScopeCall};

#[derive(Debug)]
pub struct CompileUnit {
    name: String,
    next_synthetic: u32,
    next_function: u32,
    next_symbol: u32,
    scope_calls: FxHashMap<SharedCallKey, Arc<SharedScopeCall>>,
    /// Creation order, for deterministic trampoline generation
    scope_call_order: Vec<Arc<SharedScopeCall>>,
    closed: bool,
}

impl CompileUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            next_synthetic: 0,
            next_function: 0,
            next_symbol: 0,
            scope_calls: FxHashMap::default(),
            scope_call_order: Vec::new(),
            closed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mint a synthetic name no other allocation in this unit will produce
    pub fn fresh(&mut self, kind: SyntheticKind) -> Synthetic {
        let id = self.next_synthetic;
        self.next_synthetic += 1;
        Synthetic::new(kind, id)
    }

    pub fn next_function_id(&mut self) -> FunctionId {
        let id = FunctionId(self.next_function);
        self.next_function += 1;
        id
    }

    pub fn next_symbol_id(&mut self) -> SymbolId {
        let id = SymbolId(self.next_symbol);
        self.next_symbol += 1;
        id
    }

    /// Number of synthetic names minted so far
    pub fn synthetic_count(&self) -> u32 {
        self.next_synthetic
    }

    /// Look up or register the trampoline for `key`
    ///
    /// # Panics
    ///
    /// Panics if the unit was closed: the cache is read-only once emission
    /// of the unit has finished.
    pub fn shared_scope_call(&mut self, key: SharedCallKey) -> Arc<SharedScopeCall> {
        assert!(
            !self.closed,
            "internal compiler error: shared scope call requested after unit {} was closed",
            self.name
        );

        if let Some(call) = self.scope_calls.get(&key) {
            return Arc::clone(call);
        }

        let name = self.fresh(SyntheticKind::ScopeCall);
        let call = Arc::new(SharedScopeCall::new(key.clone(), self.name.clone(), name));
        trace!(unit = %self.name, call = %call, "registered shared scope call");
        self.scope_calls.insert(key, Arc::clone(&call));
        self.scope_call_order.push(Arc::clone(&call));
        call
    }

    /// Trampolines in registration order
    pub fn shared_calls(&self) -> &[Arc<SharedScopeCall>] {
        &self.scope_call_order
    }

    /// Freeze the shared call cache
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Default for CompileUnit {
    fn default() -> Self {
        Self::new("Script")
    }
}
