//! Control-flow lowering
//!
//! Rewrites a parsed function into the shape the emitter expects:
//! - statement lists end at their first terminal statement, with hoisted
//!   declarations kept as uninitialized placeholders
//! - `while (true)` style loops become test-less `for` loops, and loops a
//!   `break`/`continue` escapes from are flagged
//! - every `try` with a `finally` is replaced by a `try` whose exits jump to
//!   inlined copies of the finally code
//! - direct `eval` calls carry a renamed copy of their arguments
//! - constructs the compiler does not support are rejected
//!
//! The pass consumes the input tree and builds a new one bottom-up. Facts
//! about the function being lowered travel in an explicit
//! [`FunctionContext`].

mod expr;
mod finally;
mod jumps;
mod loops;
pub mod rename;
mod statements;

pub use jumps::{JumpTarget, JumpTargetStack};

use tarn_ast::*;
use tracing::debug;

use crate::error::{CompileError, CompileResult, Feature};
use crate::options::CompilerOptions;
use crate::unit::CompileUnit;

use statements::StatementList;

/// What the pass learns about a function while lowering its body
#[derive(Debug, Clone, Default)]
pub(crate) struct FunctionContext {
    pub strict: bool,
    pub is_program: bool,
    pub has_eval: bool,
    pub has_nested_eval: bool,
    pub has_with: bool,
    pub needs_return_slot: bool,
}

impl FunctionContext {
    fn new(strict: bool, is_program: bool) -> Self {
        Self {
            strict,
            is_program,
            ..Self::default()
        }
    }
}

/// Counters reported after a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LowerStats {
    pub functions: usize,
    /// Try statements whose finally was spliced
    pub splices: usize,
    pub inlined_finallies: usize,
    /// Unreachable statements removed
    pub pruned_statements: usize,
}

/// The lowering pass over one compile unit
pub struct Lowerer<'a> {
    options: &'a CompilerOptions,
    unit: &'a mut CompileUnit,
    stats: LowerStats,
}

impl<'a> Lowerer<'a> {
    pub fn new(options: &'a CompilerOptions, unit: &'a mut CompileUnit) -> Self {
        Self {
            options,
            unit,
            stats: LowerStats::default(),
        }
    }

    pub fn stats(&self) -> LowerStats {
        self.stats
    }

    /// Lower a top-level function or script
    pub fn lower(&mut self, func: FunctionNode) -> CompileResult<FunctionNode> {
        self.lower_function(func, false)
    }

    pub(crate) fn lower_function(&mut self, func: FunctionNode, parent_strict: bool) -> CompileResult<FunctionNode> {
        match func.kind {
            FunctionKind::Generator => return Err(CompileError::unsupported(Feature::Generator, func.span)),
            FunctionKind::Async => return Err(CompileError::unsupported(Feature::Async, func.span)),
            FunctionKind::Program | FunctionKind::Normal | FunctionKind::Arrow => {}
        }
        if let Some(rest) = func.params.iter().find(|param| param.is_rest) {
            return Err(CompileError::unsupported(Feature::RestParameter, rest.ident.span));
        }

        let FunctionNode {
            name,
            kind,
            params,
            body,
            flags,
            span,
            ..
        } = func;
        let id = self.unit.next_function_id();
        let strict = flags.is_strict || parent_strict || self.options.strict;
        let mut ctx = FunctionContext::new(strict, kind == FunctionKind::Program);

        let body_span = body.span;
        let mut list = self.lower_statements(hoist_function_declarations(body.statements), &mut ctx)?;
        if ctx.is_program {
            // The completion value is read back even when the body ends in a
            // throw, so the slot exists regardless
            ctx.needs_return_slot = true;
        }
        if !list.is_terminated() {
            list.push(implicit_return(&ctx, body_span));
        }
        self.stats.pruned_statements += list.pruned();
        let body = list.finish(body_span);

        let lowered = FunctionNode {
            id,
            name,
            kind,
            params,
            body,
            flags: FunctionFlags {
                is_strict: ctx.strict,
                is_declaration: flags.is_declaration,
                has_eval: ctx.has_eval,
                has_nested_eval: ctx.has_nested_eval,
                has_with: ctx.has_with,
                needs_return_slot: ctx.needs_return_slot,
            },
            span,
        };
        self.stats.functions += 1;
        debug!(
            function = %lowered.display_name(),
            id = id.0,
            strict = ctx.strict,
            has_eval = ctx.has_eval,
            "lowered function"
        );
        Ok(lowered)
    }

    pub(crate) fn lower_block(&mut self, block: Block, ctx: &mut FunctionContext) -> CompileResult<Block> {
        let span = block.span;
        let list = self.lower_statements(block.statements, ctx)?;
        self.stats.pruned_statements += list.pruned();
        Ok(list.finish(span))
    }

    fn lower_statements(&mut self, statements: Vec<Statement>, ctx: &mut FunctionContext) -> CompileResult<StatementList> {
        let mut list = StatementList::new();
        for stmt in statements {
            self.lower_statement(stmt, ctx, &mut list)?;
        }
        Ok(list)
    }
}

/// Function declarations are initialized before any statement of the body
/// runs, so they move to the front
fn hoist_function_declarations(statements: Vec<Statement>) -> Vec<Statement> {
    let (mut hoisted, rest): (Vec<_>, Vec<_>) = statements
        .into_iter()
        .partition(|stmt| matches!(stmt, Statement::VarDecl(decl) if decl.is_function_declaration));
    hoisted.extend(rest);
    hoisted
}

/// `return :return` for scripts, `return undefined` otherwise
fn implicit_return(ctx: &FunctionContext, span: Span) -> Statement {
    let value = if ctx.is_program {
        Expression::Identifier(Ident::return_value(span))
    } else {
        Expression::Literal(Literal {
            value: LiteralValue::Undefined,
            span,
        })
    };
    Statement::Return(ReturnStatement {
        value: Some(value),
        span,
    })
}
