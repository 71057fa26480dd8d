//! Loop normalization and escape analysis

use tarn_ast::*;

use super::jumps::EscapeFinder;
use super::{FunctionContext, Lowerer};
use crate::error::{CompileError, CompileResult, Feature};

impl Lowerer<'_> {
    /// `while (true)` and `do ... while (true)` become a test-less `for`
    pub(super) fn lower_while(&mut self, stmt: WhileStatement, ctx: &mut FunctionContext) -> CompileResult<Statement> {
        let test = self.lower_expression(stmt.test, ctx)?;
        let mut body = self.lower_block(stmt.body, ctx)?;
        let control_flow_escapes = check_escape(&mut body);

        if test.is_always_true() {
            return Ok(Statement::For(ForStatement {
                kind: ForKind::Classic,
                init: None,
                test: None,
                update: None,
                iterable: None,
                body,
                iterator: None,
                control_flow_escapes,
                span: stmt.span,
            }));
        }

        Ok(Statement::While(WhileStatement {
            test,
            body,
            is_do_while: stmt.is_do_while,
            control_flow_escapes,
            span: stmt.span,
        }))
    }

    pub(super) fn lower_for(&mut self, stmt: ForStatement, ctx: &mut FunctionContext) -> CompileResult<Statement> {
        if stmt.kind == ForKind::Of && !self.options.language.has_for_of() {
            return Err(CompileError::unsupported(Feature::ForOf, stmt.span));
        }

        let init = match stmt.init {
            Some(ForInit::VarDecl(decl)) => Some(ForInit::VarDecl(self.lower_var_decl(decl, ctx)?)),
            Some(ForInit::Expression(expr)) => Some(ForInit::Expression(self.lower_expression(expr, ctx)?)),
            None => None,
        };
        let test = stmt
            .test
            .map(|test| self.lower_expression(test, ctx))
            .transpose()?
            .filter(|test| !test.is_always_true());
        let update = stmt
            .update
            .map(|update| self.lower_expression(update, ctx))
            .transpose()?;
        let iterable = stmt
            .iterable
            .map(|iterable| self.lower_expression(iterable, ctx))
            .transpose()?;
        let mut body = self.lower_block(stmt.body, ctx)?;
        let control_flow_escapes = check_escape(&mut body);

        let iterator = match stmt.kind {
            ForKind::Classic => None,
            ForKind::In | ForKind::Of => Some(self.unit.fresh(SyntheticKind::Iterator)),
        };

        Ok(Statement::For(ForStatement {
            kind: stmt.kind,
            init,
            test,
            update,
            iterable,
            body,
            iterator,
            control_flow_escapes,
            span: stmt.span,
        }))
    }
}

/// A body that some `break`/`continue` leaves cannot be terminal: the jump
/// continues past whatever statement looks last
fn check_escape(body: &mut Block) -> bool {
    let escapes = !EscapeFinder::in_block(body).is_empty();
    if escapes {
        body.is_terminal = false;
    }
    escapes
}
