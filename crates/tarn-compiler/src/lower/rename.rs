//! Alpha-renaming of duplicated subtrees
//!
//! Synthetic names are integer identities, so renaming a copy means handing
//! each distinct synthetic name in it a newly minted identity of the same
//! kind, consistently across the copy. Nested functions in the copy get
//! fresh function ids as well.

use rustc_hash::FxHashMap;
use tarn_ast::*;

use crate::unit::CompileUnit;

/// Copy of `block` sharing no synthetic name or function id with the original
pub fn fresh_copy(block: &Block, unit: &mut CompileUnit) -> Block {
    let mut copy = block.clone();
    Renamer::new(unit).visit_block_mut(&mut copy);
    copy
}

/// Renamed copies of expressions, sharing one renaming
pub fn fresh_copy_expressions(expressions: &[Expression], unit: &mut CompileUnit) -> Vec<Expression> {
    let mut renamer = Renamer::new(unit);
    expressions
        .iter()
        .map(|expr| {
            let mut copy = expr.clone();
            renamer.visit_expression_mut(&mut copy);
            copy
        })
        .collect()
}

struct Renamer<'u> {
    unit: &'u mut CompileUnit,
    renamed: FxHashMap<Synthetic, Synthetic>,
}

impl<'u> Renamer<'u> {
    fn new(unit: &'u mut CompileUnit) -> Self {
        Self {
            unit,
            renamed: FxHashMap::default(),
        }
    }
}

impl VisitorMut for Renamer<'_> {
    fn visit_synthetic_mut(&mut self, name: &mut Synthetic) {
        let original = *name;
        let unit = &mut *self.unit;
        *name = *self
            .renamed
            .entry(original)
            .or_insert_with(|| unit.fresh(original.kind));
    }

    fn visit_function_mut(&mut self, func: &mut FunctionNode) {
        func.id = self.unit.next_function_id();
        walk_function_mut(self, func);
    }
}
