//! Try/finally splicing
//!
//! A `try` with a finally body `F` is rewritten so that no finally region
//! is left for the emitter:
//!
//! ```text
//! try {                                 try {
//!     body                                  try { body } catch (e) { ... }
//! } catch (e) {                ==>      } catch (:exception1) {
//!     ...                                   F'; throw :exception1;
//! } finally {                           }
//!     F                                 F
//! }
//! ```
//!
//! Every exit from the protected region (`return`, and `break`/`continue`
//! to a target outside the try) becomes a jump to an inlined finally block
//! holding a renamed copy of `F` followed by the original exit. The inlined
//! blocks sit outside the protected region, so an exception thrown by a copy
//! of `F` does not run `F` a second time. The untouched `F` after the try
//! covers normal completion.

use std::mem;

use tarn_ast::*;
use tracing::trace;

use super::jumps::{JumpTarget, JumpTargetStack};
use super::rename::fresh_copy;
use super::statements::StatementList;
use super::{FunctionContext, Lowerer};
use crate::error::{CompileError, CompileResult};
use crate::unit::CompileUnit;

impl Lowerer<'_> {
    pub(super) fn lower_try(
        &mut self,
        stmt: TryStatement,
        ctx: &mut FunctionContext,
        out: &mut StatementList,
    ) -> CompileResult<()> {
        if !stmt.inlined_finallies.is_empty() {
            return Err(CompileError::internal_at("try statement was already lowered", stmt.span));
        }

        let span = stmt.span;
        let body = self.lower_block(stmt.body, ctx)?;
        let mut catches = Vec::with_capacity(stmt.catches.len());
        for catch in stmt.catches {
            catches.push(self.lower_catch(catch, ctx)?);
        }
        let finally = stmt
            .finally
            .map(|finally| self.lower_block(finally, ctx))
            .transpose()?;

        match finally {
            Some(finally) if !finally.is_empty() => {
                for lowered in self.splice_finally(body, catches, finally, span, ctx) {
                    out.push(lowered);
                }
            }
            _ if catches.is_empty() => out.push(Statement::Block(body)),
            _ => {
                let lowered = self.ensure_unconditional_catch(TryStatement::new(body, catches, None, span));
                out.push(Statement::Try(lowered));
            }
        }
        Ok(())
    }

    fn lower_catch(&mut self, catch: CatchClause, ctx: &mut FunctionContext) -> CompileResult<CatchClause> {
        let condition = catch
            .condition
            .map(|condition| self.lower_expression(condition, ctx))
            .transpose()?;
        let body = self.lower_block(catch.body, ctx)?;
        Ok(CatchClause {
            condition,
            body,
            ..catch
        })
    }

    /// A guarded last catch lets some exceptions through; append a catch-all
    /// that rethrows them so every exception has a handler
    fn ensure_unconditional_catch(&mut self, mut stmt: TryStatement) -> TryStatement {
        if stmt.has_conditional_last_catch() {
            let exception = self.unit.fresh(SyntheticKind::Exception);
            stmt.catches.push(catch_all(exception, stmt.span));
        }
        stmt
    }

    fn splice_finally(
        &mut self,
        body: Block,
        catches: Vec<CatchClause>,
        finally: Block,
        span: Span,
        ctx: &mut FunctionContext,
    ) -> Vec<Statement> {
        let exception = self.unit.fresh(SyntheticKind::Exception);

        let protected = if catches.is_empty() {
            body
        } else {
            let inner = self.ensure_unconditional_catch(TryStatement::new(body, catches, None, span));
            Block::new(vec![Statement::Try(inner)], span)
        };
        let mut outer = TryStatement::new(protected, vec![catch_all(exception, span)], None, span);

        let mut splicer = FinallySplicer::new(&finally, self.unit);
        splicer.splice_block(&mut outer.body, &mut JumpTargetStack::new());
        for catch in &mut outer.catches {
            splicer.splice_rethrow(&mut catch.body, exception);
        }

        let FinallySplicer {
            inlined,
            needs_return_slot,
            ..
        } = splicer;
        if needs_return_slot {
            ctx.needs_return_slot = true;
        }
        self.stats.splices += 1;
        self.stats.inlined_finallies += inlined.len();
        trace!(
            exception = %exception,
            exits = inlined.len(),
            terminal_finally = finally.is_terminal,
            "spliced finally"
        );
        outer.inlined_finallies = inlined;

        vec![Statement::Try(outer), Statement::Block(finally)]
    }
}

/// `catch (:exceptionN) { throw :exceptionN; }`
fn catch_all(exception: Synthetic, span: Span) -> CatchClause {
    let rethrow = Statement::Throw(ThrowStatement {
        value: Expression::Identifier(Ident::synthetic(exception, span)),
        is_rethrow: true,
        span,
    });
    CatchClause {
        param: Ident::synthetic(exception, span),
        condition: None,
        body: Block::new(vec![rethrow], span),
        is_catch_all: true,
        span,
    }
}

/// Values that can be returned after `F` runs without being captured first
fn is_trivial_return_value(value: &Option<Expression>) -> bool {
    match value {
        None => true,
        Some(value) => value.is_primitive_literal() || value.is_identifier(&Name::Return),
    }
}

struct FinallySplicer<'a> {
    finally: &'a Block,
    unit: &'a mut CompileUnit,
    inlined: Vec<InlinedFinally>,
    needs_return_slot: bool,
}

impl<'a> FinallySplicer<'a> {
    fn new(finally: &'a Block, unit: &'a mut CompileUnit) -> Self {
        Self {
            finally,
            unit,
            inlined: Vec::new(),
            needs_return_slot: false,
        }
    }

    fn splice_block(&mut self, block: &mut Block, targets: &mut JumpTargetStack) {
        for stmt in &mut block.statements {
            self.splice_statement(stmt, targets);
        }
    }

    fn splice_statement(&mut self, stmt: &mut Statement, targets: &mut JumpTargetStack) {
        match stmt {
            Statement::Return(_) => self.replace_exit(stmt),
            Statement::Break(_) | Statement::Continue(_) => {
                if !targets.resolves(stmt) {
                    self.replace_exit(stmt);
                }
            }
            Statement::Block(block) => self.splice_block(block, targets),
            Statement::If(stmt) => {
                self.splice_block(&mut stmt.consequent, targets);
                if let Some(alternate) = &mut stmt.alternate {
                    self.splice_block(alternate, targets);
                }
            }
            Statement::While(stmt) => {
                targets.push(JumpTarget::Loop);
                self.splice_block(&mut stmt.body, targets);
                targets.pop();
            }
            Statement::For(stmt) => {
                targets.push(JumpTarget::Loop);
                self.splice_block(&mut stmt.body, targets);
                targets.pop();
            }
            Statement::Switch(stmt) => {
                targets.push(JumpTarget::Switch);
                for case in &mut stmt.cases {
                    self.splice_block(&mut case.body, targets);
                }
                targets.pop();
            }
            Statement::Label(stmt) => {
                targets.push(JumpTarget::Label(stmt.label.clone()));
                self.splice_statement(&mut stmt.body, targets);
                targets.pop();
            }
            Statement::Try(stmt) => {
                self.splice_block(&mut stmt.body, targets);
                for catch in &mut stmt.catches {
                    self.splice_block(&mut catch.body, targets);
                }
                for inlined in &mut stmt.inlined_finallies {
                    self.splice_block(&mut inlined.body, targets);
                }
            }
            Statement::With(stmt) => self.splice_block(&mut stmt.body, targets),
            Statement::Expression(_)
            | Statement::VarDecl(_)
            | Statement::Throw(_)
            | Statement::JumpToInlinedFinally(_)
            | Statement::ClassDecl(_)
            | Statement::Module(_)
            | Statement::Empty(_) => {}
        }
    }

    /// Run a copy of `F` before the rethrow of the catch-all
    fn splice_rethrow(&mut self, body: &mut Block, exception: Synthetic) {
        for stmt in &mut body.statements {
            let is_rethrow = matches!(stmt, Statement::Throw(throw) if throw.rethrows(exception));
            if is_rethrow {
                let span = stmt.span();
                let rethrow = mem::replace(stmt, Statement::Empty(span));
                let copy = fresh_copy(self.finally, self.unit);
                *stmt = Statement::Block(Block::new(prepend_finally(copy, rethrow), span));
            }
        }
    }

    /// Replace an exit with a jump to a new inlined finally block
    fn replace_exit(&mut self, stmt: &mut Statement) {
        let span = stmt.span();
        let exit = mem::replace(stmt, Statement::Empty(span));
        let copy = fresh_copy(self.finally, self.unit);
        let label = self.unit.fresh(SyntheticKind::Finally);
        let jump = Statement::JumpToInlinedFinally(InlinedFinallyJump { label, span });

        let (replacement, inlined) = match exit {
            Statement::Return(ret) if !copy.is_terminal && !is_trivial_return_value(&ret.value) => {
                // Evaluate the value before F runs, then return it afterwards
                self.needs_return_slot = true;
                let value = ret.value.unwrap_or_else(|| unreachable_value(span));
                let capture = Statement::Expression(ExpressionStatement {
                    expression: Expression::Assign(AssignExpression {
                        op: None,
                        target: Box::new(Expression::Identifier(Ident::return_value(span))),
                        value: Box::new(value),
                        span,
                    }),
                    span,
                });
                let reload = Statement::Return(ReturnStatement {
                    value: Some(Expression::Identifier(Ident::return_value(span))),
                    span,
                });
                (
                    Statement::Block(Block::new(vec![capture, jump], span)),
                    vec![Statement::Block(copy), reload],
                )
            }
            exit => (jump, prepend_finally(copy, exit)),
        };

        self.inlined.push(InlinedFinally {
            label,
            body: Block::new(inlined, span),
        });
        *stmt = replacement;
    }
}

/// `F; exit`, or just `F` when `F` never completes
fn prepend_finally(copy: Block, exit: Statement) -> Vec<Statement> {
    if copy.is_terminal {
        vec![Statement::Block(copy)]
    } else {
        vec![Statement::Block(copy), exit]
    }
}

fn unreachable_value(span: Span) -> Expression {
    Expression::Literal(Literal {
        value: LiteralValue::Undefined,
        span,
    })
}
