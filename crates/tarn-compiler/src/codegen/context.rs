//! Lexical slot allocation
//!
//! [`CodegenContext`] is driven by the emitter while it walks a lowered
//! function. It keeps a stack of free-slot watermarks, one per open block or
//! split, and hands out slots to the symbols each block declares. Leaving a
//! block restores the parent's watermark, so sibling blocks reuse the same
//! slots while nested blocks never overlap.
//!
//! Besides slots it tracks:
//! - whether code is inside a dynamic scope (`with`, or sloppy-mode eval)
//! - the split depth of the current function
//! - the stack of expressions whose value is discarded
//! - the stack of method emitters, one per physical method being generated
//!
//! Calls must nest. Unbalanced calls are emitter bugs and panic.

use std::sync::Arc;

use tarn_ast::{Block, Expression, FunctionId, FunctionNode, Symbol, ValueKind};
use tracing::trace;

use crate::codegen::emitter::MethodEmitter;
use crate::codegen::shared_call::{CallSiteFlags, SharedCallKey, SharedScopeCall};
use crate::error::{CompileError, CompileResult};
use crate::unit::CompileUnit;

/// Identity of an expression node, used by the discard stack
///
/// Two keys are equal only for the very same node, never for structurally
/// equal copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprKey(usize);

impl ExprKey {
    pub fn of(expr: &Expression) -> Self {
        ExprKey(expr as *const Expression as usize)
    }
}

#[derive(Debug)]
struct FunctionFrame {
    id: FunctionId,
    /// Watermark stack height when the function was entered
    block_base: usize,
    split_depth: u32,
}

pub struct CodegenContext<'u, E: MethodEmitter> {
    unit: &'u mut CompileUnit,
    next_free_slots: Vec<u16>,
    functions: Vec<FunctionFrame>,
    /// Watermark stack height right after each open split was entered
    split_marks: Vec<usize>,
    dynamic_scope_count: u32,
    dynamic_frames: Vec<bool>,
    discard: Vec<ExprKey>,
    method_emitters: Vec<E>,
}

impl<'u, E: MethodEmitter> CodegenContext<'u, E> {
    pub fn new(unit: &'u mut CompileUnit) -> Self {
        Self {
            unit,
            next_free_slots: Vec::new(),
            functions: Vec::new(),
            split_marks: Vec::new(),
            dynamic_scope_count: 0,
            dynamic_frames: Vec::new(),
            discard: Vec::new(),
            method_emitters: Vec::new(),
        }
    }

    pub fn unit(&self) -> &CompileUnit {
        self.unit
    }

    // ========================================================================
    // Functions
    // ========================================================================

    pub fn enter_function(&mut self, func: &FunctionNode) {
        trace!(function = func.id.0, dynamic = func.is_dynamic_scope(), "enter function");
        self.functions.push(FunctionFrame {
            id: func.id,
            block_base: self.next_free_slots.len(),
            split_depth: 0,
        });
        self.enter_dynamic(func.is_dynamic_scope());
    }

    pub fn exit_function(&mut self) {
        let frame = self
            .functions
            .pop()
            .unwrap_or_else(|| ice("exit_function without a matching enter_function"));
        assert_eq!(
            frame.split_depth, 0,
            "internal compiler error: function {} exited inside a split",
            frame.id.0
        );
        assert_eq!(
            self.next_free_slots.len(),
            frame.block_base,
            "internal compiler error: function {} exited with open blocks",
            frame.id.0
        );
        self.exit_dynamic();
        trace!(function = frame.id.0, "exit function");
    }

    pub fn current_function(&self) -> Option<FunctionId> {
        self.functions.last().map(|frame| frame.id)
    }

    // ========================================================================
    // Blocks and slots
    // ========================================================================

    /// Assign slots to the block's symbols and open its scope
    ///
    /// The body block of a function starts numbering at slot 0; any other
    /// block starts at the current watermark, or above the highest live
    /// temporary if that is higher. Returns the new watermark.
    ///
    /// On [`CompileError::TooManyLocals`] nothing has been assigned or
    /// defined and no block was opened.
    pub fn enter_block(&mut self, block: &mut Block) -> CompileResult<u16> {
        let is_function_body = self
            .functions
            .last()
            .is_some_and(|frame| frame.block_base == self.next_free_slots.len());

        let emitter = self
            .method_emitters
            .last_mut()
            .unwrap_or_else(|| ice("enter_block without a method emitter"));

        let start = if is_function_body {
            0
        } else {
            let watermark = self.next_free_slots.last().copied().unwrap_or(0);
            watermark.max(emitter.used_slots_with_live_temporaries())
        };

        let watermark = block
            .symbols
            .iter()
            .filter(|symbol| symbol.has_slot())
            .try_fold(start, |next, symbol| next.checked_add(symbol.width()))
            .ok_or(CompileError::TooManyLocals)?;

        let mut next = start;
        for symbol in block.symbols.iter_mut().filter(|symbol| symbol.has_slot()) {
            let end = next + symbol.width();
            symbol.slot = Some(next);
            emitter.define_block_local_variable(symbol, next, end);
            next = end;
        }
        debug_assert_eq!(next, watermark);

        trace!(from = start, to = watermark, symbols = block.symbols.len(), "enter block");
        self.next_free_slots.push(watermark);
        Ok(watermark)
    }

    /// Close the innermost block and release its slots
    pub fn exit_block(&mut self) {
        let floor = self.innermost_floor();
        assert!(
            self.next_free_slots.len() > floor,
            "internal compiler error: exit_block without an open block"
        );
        self.next_free_slots.pop();
        let restored = self.used_slot_count();
        self.emitter_mut().undefine_local_variables(restored, true);
        trace!(watermark = restored, "exit block");
    }

    /// Next free slot of the innermost open block
    pub fn used_slot_count(&self) -> u16 {
        self.next_free_slots.last().copied().unwrap_or(0)
    }

    /// Open blocks of the current function
    pub fn block_depth(&self) -> usize {
        let base = self.functions.last().map_or(0, |frame| frame.block_base);
        self.next_free_slots.len() - base
    }

    /// Short-lived slot for an intermediate value
    pub fn temporary_slot(&mut self, width: u16) -> CompileResult<u16> {
        self.emitter_mut().define_temporary_local_variable(width)
    }

    pub fn release_temporary_slot(&mut self, slot: u16, width: u16) {
        self.emitter_mut().release_temporary_local_variable(slot, width);
    }

    /// Blocks may only be closed down to the innermost split or function
    fn innermost_floor(&self) -> usize {
        let function = self.functions.last().map_or(0, |frame| frame.block_base);
        let split = self.split_marks.last().copied().unwrap_or(0);
        function.max(split)
    }

    // ========================================================================
    // Splits
    // ========================================================================

    /// Start a split method; its slots begin above everything live now
    pub fn enter_split(&mut self) {
        let baseline = self.emitter().used_slots_with_live_temporaries();
        let frame = self
            .functions
            .last_mut()
            .unwrap_or_else(|| ice("enter_split outside a function"));
        frame.split_depth += 1;
        self.next_free_slots.push(baseline);
        self.split_marks.push(self.next_free_slots.len());
        trace!(baseline, "enter split");
    }

    pub fn exit_split(&mut self) {
        let frame = self
            .functions
            .last_mut()
            .unwrap_or_else(|| ice("exit_split outside a function"));
        assert!(frame.split_depth > 0, "internal compiler error: exit_split without a matching enter_split");
        let mark = self
            .split_marks
            .pop()
            .unwrap_or_else(|| ice("split mark stack is empty"));
        assert_eq!(
            mark,
            self.next_free_slots.len(),
            "internal compiler error: split exited with open blocks"
        );
        frame.split_depth -= 1;
        self.next_free_slots.pop();
        trace!("exit split");
    }

    pub fn in_split(&self) -> bool {
        self.functions.last().is_some_and(|frame| frame.split_depth > 0)
    }

    // ========================================================================
    // Dynamic scope
    // ========================================================================

    /// Open a region; `is_dynamic` regions can gain bindings at runtime
    pub fn enter_dynamic(&mut self, is_dynamic: bool) {
        if is_dynamic {
            self.dynamic_scope_count += 1;
        }
        self.dynamic_frames.push(is_dynamic);
    }

    pub fn exit_dynamic(&mut self) {
        let was_dynamic = self
            .dynamic_frames
            .pop()
            .unwrap_or_else(|| ice("exit_dynamic without a matching enter_dynamic"));
        if was_dynamic {
            self.dynamic_scope_count -= 1;
        }
    }

    /// `with` bodies are always dynamic
    pub fn enter_with(&mut self) {
        self.enter_dynamic(true);
    }

    pub fn exit_with(&mut self) {
        self.exit_dynamic();
    }

    /// Is any enclosing region dynamically scoped?
    pub fn in_dynamic_scope(&self) -> bool {
        self.dynamic_scope_count > 0
    }

    // ========================================================================
    // Shared scope calls
    // ========================================================================

    pub fn get_or_create_shared_call(
        &mut self,
        symbol: &Symbol,
        value_type: ValueKind,
        return_type: ValueKind,
        param_types: &[ValueKind],
        flags: CallSiteFlags,
    ) -> Arc<SharedScopeCall> {
        let key = SharedCallKey::call(symbol.id, value_type, return_type, param_types.to_vec(), flags);
        self.unit.shared_scope_call(key)
    }

    /// Shared read of a scope variable
    pub fn get_or_create_scope_get(
        &mut self,
        symbol: &Symbol,
        value_type: ValueKind,
        flags: CallSiteFlags,
    ) -> Arc<SharedScopeCall> {
        self.unit.shared_scope_call(SharedCallKey::get(symbol.id, value_type, flags))
    }

    pub fn shared_calls(&self) -> &[Arc<SharedScopeCall>] {
        self.unit.shared_calls()
    }

    // ========================================================================
    // Discarded values
    // ========================================================================

    pub fn push_discard(&mut self, expr: &Expression) {
        self.discard.push(ExprKey::of(expr));
    }

    /// Pop only if `expr` itself is on top; a mismatch leaves the stack alone
    pub fn pop_discard_if_current(&mut self, expr: &Expression) -> bool {
        if self.is_discarded(expr) {
            self.discard.pop();
            true
        } else {
            false
        }
    }

    /// Is `expr` the innermost expression whose value is discarded?
    pub fn is_discarded(&self, expr: &Expression) -> bool {
        self.discard.last() == Some(&ExprKey::of(expr))
    }

    pub fn discard_depth(&self) -> usize {
        self.discard.len()
    }

    // ========================================================================
    // Method emitters
    // ========================================================================

    pub fn push_method_emitter(&mut self, emitter: E) {
        self.method_emitters.push(emitter);
    }

    pub fn pop_method_emitter(&mut self) -> E {
        self.method_emitters
            .pop()
            .unwrap_or_else(|| ice("pop_method_emitter on an empty stack"))
    }

    pub fn method_emitter(&self) -> Option<&E> {
        self.method_emitters.last()
    }

    pub fn method_emitter_mut(&mut self) -> Option<&mut E> {
        self.method_emitters.last_mut()
    }

    fn emitter(&self) -> &E {
        self.method_emitters
            .last()
            .unwrap_or_else(|| ice("no method emitter"))
    }

    fn emitter_mut(&mut self) -> &mut E {
        self.method_emitters
            .last_mut()
            .unwrap_or_else(|| ice("no method emitter"))
    }
}

#[track_caller]
fn ice(message: &str) -> ! {
    panic!("internal compiler error: {}", message)
}
