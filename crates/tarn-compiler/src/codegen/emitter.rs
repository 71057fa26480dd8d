//! Method emitter seam
//!
//! The bytecode emitter lives outside this crate. The slot allocator only
//! needs it to track which local slots currently hold what, so that is all
//! [`MethodEmitter`] asks for. [`LocalVariableTable`] is a complete
//! implementation of that bookkeeping, usable on its own by tools that dump
//! local variable tables.

use tarn_ast::{Name, Symbol, SymbolId};

use crate::error::{CompileError, CompileResult};

/// Local slot bookkeeping of one physical method
pub trait MethodEmitter {
    /// `symbol` now lives in slots `from..to`
    fn define_block_local_variable(&mut self, symbol: &Symbol, from: u16, to: u16);

    /// No variable lives at or above `from` any more
    fn undefine_local_variables(&mut self, from: u16, can_truncate: bool);

    /// Reserve `width` slots for an intermediate value, returning the first
    ///
    /// Fails with [`CompileError::TooManyLocals`] when the range would run
    /// past the last addressable slot.
    fn define_temporary_local_variable(&mut self, width: u16) -> CompileResult<u16>;

    fn release_temporary_local_variable(&mut self, slot: u16, width: u16);

    /// One past the highest slot holding a variable or a live temporary
    fn used_slots_with_live_temporaries(&self) -> u16;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    Free,
    Variable(SymbolId),
    Temporary,
}

/// A variable's occupancy of a slot range
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariableEntry {
    pub symbol: SymbolId,
    pub name: Name,
    pub from: u16,
    pub to: u16,
}

#[derive(Debug, Clone, Default)]
pub struct LocalVariableTable {
    slots: Vec<SlotState>,
    entries: Vec<LocalVariableEntry>,
    max_locals: u16,
}

impl LocalVariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every definition made so far, in order
    pub fn entries(&self) -> &[LocalVariableEntry] {
        &self.entries
    }

    /// Largest number of slots in use at any point
    pub fn max_locals(&self) -> u16 {
        self.max_locals
    }

    /// Symbol occupying `slot` right now
    pub fn variable_at(&self, slot: u16) -> Option<SymbolId> {
        match self.slots.get(slot as usize) {
            Some(SlotState::Variable(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn is_temporary(&self, slot: u16) -> bool {
        matches!(self.slots.get(slot as usize), Some(SlotState::Temporary))
    }

    fn ensure_len(&mut self, len: u16) {
        if self.slots.len() < len as usize {
            self.slots.resize(len as usize, SlotState::Free);
        }
        self.max_locals = self.max_locals.max(len);
    }

    fn truncate_free(&mut self) {
        while matches!(self.slots.last(), Some(SlotState::Free)) {
            self.slots.pop();
        }
    }
}

impl MethodEmitter for LocalVariableTable {
    fn define_block_local_variable(&mut self, symbol: &Symbol, from: u16, to: u16) {
        self.ensure_len(to);
        for slot in &mut self.slots[from as usize..to as usize] {
            *slot = SlotState::Variable(symbol.id);
        }
        self.entries.push(LocalVariableEntry {
            symbol: symbol.id,
            name: symbol.name.clone(),
            from,
            to,
        });
    }

    fn undefine_local_variables(&mut self, from: u16, can_truncate: bool) {
        for slot in self.slots.iter_mut().skip(from as usize) {
            if let SlotState::Variable(_) = slot {
                *slot = SlotState::Free;
            }
        }
        if can_truncate {
            self.truncate_free();
        }
    }

    fn define_temporary_local_variable(&mut self, width: u16) -> CompileResult<u16> {
        self.truncate_free();
        let from = u16::try_from(self.slots.len()).map_err(|_| CompileError::TooManyLocals)?;
        let to = from.checked_add(width).ok_or(CompileError::TooManyLocals)?;
        self.ensure_len(to);
        for slot in &mut self.slots[from as usize..] {
            *slot = SlotState::Temporary;
        }
        Ok(from)
    }

    fn release_temporary_local_variable(&mut self, slot: u16, width: u16) {
        let end = usize::from(slot) + usize::from(width);
        for state in self.slots.iter_mut().take(end).skip(slot as usize) {
            *state = SlotState::Free;
        }
        self.truncate_free();
    }

    fn used_slots_with_live_temporaries(&self) -> u16 {
        self.slots
            .iter()
            .rposition(|slot| *slot != SlotState::Free)
            .map_or(0, |last| last as u16 + 1)
    }
}
