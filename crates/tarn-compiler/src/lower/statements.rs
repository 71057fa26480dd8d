//! Statement lowering and statement list accumulation

use tarn_ast::*;

use super::jumps::EscapeFinder;
use super::{FunctionContext, Lowerer};
use crate::error::{CompileError, CompileResult, Feature};

/// Statements of a block being rebuilt
///
/// Once a terminal statement or a jump has been pushed, later statements
/// are unreachable. They are dropped, except for the declarations in them:
/// a declaration binds its name for the whole function (or block) whether
/// or not it executes, so it survives as an uninitialized placeholder.
pub(crate) struct StatementList {
    statements: Vec<Statement>,
    terminated: bool,
    pruned: usize,
}

impl StatementList {
    pub fn new() -> Self {
        Self {
            statements: Vec::new(),
            terminated: false,
            pruned: 0,
        }
    }

    pub fn push(&mut self, stmt: Statement) {
        if self.terminated {
            self.pruned += 1;
            self.extract_declarations(&stmt);
            return;
        }
        if stmt.is_terminal() || stmt.is_jump() {
            self.terminated = true;
        }
        self.statements.push(stmt);
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn pruned(&self) -> usize {
        self.pruned
    }

    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }

    pub fn finish(self, span: Span) -> Block {
        Block::new(self.statements, span)
    }

    /// Append the statements of an already lowered block in place of the
    /// block itself
    pub fn splice(&mut self, block: Block) {
        for stmt in block.statements {
            if self.terminated && stmt.is_uninitialized_var() {
                self.statements.push(stmt);
            } else {
                self.push(stmt);
            }
        }
    }

    /// Keep only the `var` bindings of a block that never runs
    pub fn keep_declarations(&mut self, block: &Block) {
        let mut hoisted = HoistedVars::default();
        hoisted.visit_block(block);
        self.statements
            .extend(hoisted.decls.into_iter().map(Statement::VarDecl));
    }

    /// Keep the bindings of a dead statement: a declaration directly in this
    /// list, and any `var` nested in it (outside nested functions)
    fn extract_declarations(&mut self, stmt: &Statement) {
        if let Statement::VarDecl(decl) = stmt {
            self.statements.push(Statement::VarDecl(decl.without_init()));
            return;
        }
        let mut hoisted = HoistedVars::default();
        hoisted.visit_statement(stmt);
        self.statements
            .extend(hoisted.decls.into_iter().map(Statement::VarDecl));
    }
}

#[derive(Default)]
struct HoistedVars {
    decls: Vec<VarDecl>,
}

impl Visitor for HoistedVars {
    fn visit_var_decl(&mut self, decl: &VarDecl) {
        if decl.kind == VarKind::Var {
            self.decls.push(decl.without_init());
        }
    }

    fn visit_function(&mut self, _func: &FunctionNode) {}
}

impl Lowerer<'_> {
    /// Lower one statement, pushing its replacement(s) onto `out`
    pub(super) fn lower_statement(
        &mut self,
        stmt: Statement,
        ctx: &mut FunctionContext,
        out: &mut StatementList,
    ) -> CompileResult<()> {
        match stmt {
            Statement::Empty(_) => {}

            Statement::Block(block) => {
                let block = self.lower_block(block, ctx)?;
                out.push(Statement::Block(block));
            }

            Statement::Expression(stmt) => {
                let expression = self.lower_expression(stmt.expression, ctx)?;
                let expression = if ctx.is_program && !is_completion_assignment(&expression) {
                    ctx.needs_return_slot = true;
                    completion_assignment(expression, stmt.span)
                } else {
                    expression
                };
                out.push(Statement::Expression(ExpressionStatement {
                    expression,
                    span: stmt.span,
                }));
            }

            Statement::VarDecl(decl) => {
                let decl = self.lower_var_decl(decl, ctx)?;
                out.push(Statement::VarDecl(decl));
            }

            Statement::If(stmt) => {
                let test = self.lower_expression(stmt.test, ctx)?;
                let consequent = self.lower_block(stmt.consequent, ctx)?;
                let alternate = stmt
                    .alternate
                    .map(|alternate| self.lower_block(alternate, ctx))
                    .transpose()?;

                // A literal test picks its branch now; the other one only
                // leaves its `var` bindings behind
                if let Expression::Literal(literal) = &test {
                    let (taken, dropped) = if literal.value.is_truthy() {
                        (Some(consequent), alternate)
                    } else {
                        (alternate, Some(consequent))
                    };
                    if let Some(dropped) = &dropped {
                        out.keep_declarations(dropped);
                    }
                    if let Some(taken) = taken {
                        if declares_lexical(&taken) {
                            out.push(Statement::Block(taken));
                        } else {
                            out.splice(taken);
                        }
                    }
                    return Ok(());
                }

                out.push(Statement::If(IfStatement {
                    test,
                    consequent,
                    alternate,
                    span: stmt.span,
                }));
            }

            Statement::While(stmt) => {
                let lowered = self.lower_while(stmt, ctx)?;
                out.push(lowered);
            }

            Statement::For(stmt) => {
                let lowered = self.lower_for(stmt, ctx)?;
                out.push(lowered);
            }

            Statement::Switch(stmt) => {
                let lowered = self.lower_switch(stmt, ctx)?;
                out.push(lowered);
            }

            Statement::Label(stmt) => {
                let lowered = self.lower_label(stmt, ctx)?;
                out.push(lowered);
            }

            Statement::Break(_) | Statement::Continue(_) => out.push(stmt),

            Statement::Return(stmt) => {
                let value = stmt
                    .value
                    .map(|value| self.lower_expression(value, ctx))
                    .transpose()?;
                out.push(Statement::Return(ReturnStatement { value, span: stmt.span }));
            }

            Statement::Throw(stmt) => {
                let value = self.lower_expression(stmt.value, ctx)?;
                out.push(Statement::Throw(ThrowStatement { value, ..stmt }));
            }

            Statement::Try(stmt) => self.lower_try(stmt, ctx, out)?,

            Statement::With(stmt) => {
                ctx.has_with = true;
                let object = self.lower_expression(stmt.object, ctx)?;
                let body = self.lower_block(stmt.body, ctx)?;
                out.push(Statement::With(WithStatement {
                    object,
                    body,
                    span: stmt.span,
                }));
            }

            Statement::JumpToInlinedFinally(jump) => {
                return Err(CompileError::internal_at(
                    "jump to an inlined finally block in unlowered input",
                    jump.span,
                ));
            }

            Statement::ClassDecl(decl) => return Err(CompileError::unsupported(Feature::Class, decl.span)),
            Statement::Module(item) => return Err(CompileError::unsupported(Feature::Module, item.span)),
        }
        Ok(())
    }

    pub(super) fn lower_var_decl(&mut self, decl: VarDecl, ctx: &mut FunctionContext) -> CompileResult<VarDecl> {
        if let Binding::Pattern(pattern) = &decl.binding {
            return Err(CompileError::unsupported(Feature::Destructuring, pattern.span));
        }
        let kind = if self.options.language.has_block_scope() {
            decl.kind
        } else {
            VarKind::Var
        };
        let init = decl
            .init
            .map(|init| self.lower_expression(init, ctx))
            .transpose()?;
        Ok(VarDecl { kind, init, ..decl })
    }

    /// Switches on anything but distinct integer constants compare against
    /// a tag binding holding the evaluated discriminant
    fn lower_switch(&mut self, stmt: SwitchStatement, ctx: &mut FunctionContext) -> CompileResult<Statement> {
        let span = stmt.span;
        let discriminant = self.lower_expression(stmt.discriminant, ctx)?;
        let mut cases = Vec::with_capacity(stmt.cases.len());
        for case in stmt.cases {
            let test = case.test.map(|test| self.lower_expression(test, ctx)).transpose()?;
            let body = self.lower_block(case.body, ctx)?;
            cases.push(SwitchCase {
                test,
                body,
                span: case.span,
            });
        }

        let mut switch = SwitchStatement {
            discriminant,
            cases,
            tag: None,
            is_terminal: false,
            span,
        };
        switch.is_terminal = switch.has_default()
            && switch.cases.last().is_some_and(|case| case.body.is_terminal)
            && !breaks_out_of_switch(&switch);

        if switch.is_unique_integer() {
            return Ok(Statement::Switch(switch));
        }

        let tag = self.unit.fresh(SyntheticKind::Switch);
        let discriminant = std::mem::replace(
            &mut switch.discriminant,
            Expression::Identifier(Ident::synthetic(tag, span)),
        );
        switch.tag = Some(tag);
        let tag_decl = Statement::VarDecl(VarDecl {
            kind: VarKind::Var,
            binding: Binding::Ident(Ident::synthetic(tag, span)),
            init: Some(discriminant),
            is_function_declaration: false,
            span,
        });
        Ok(Statement::Block(Block::new(vec![tag_decl, Statement::Switch(switch)], span)))
    }

    fn lower_label(&mut self, stmt: LabelStatement, ctx: &mut FunctionContext) -> CompileResult<Statement> {
        let mut list = StatementList::new();
        self.lower_statement(*stmt.body, ctx, &mut list)?;
        let mut statements = list.into_statements();
        let body = if statements.len() == 1 {
            statements.remove(0)
        } else {
            Statement::Block(Block::new(statements, stmt.span))
        };

        let breaks_to_label = EscapeFinder::in_statement(&body)
            .iter()
            .any(|jump| jump.is_break && jump.label.as_deref() == Some(stmt.label.as_str()));
        let is_terminal = body.is_terminal() && !breaks_to_label;

        Ok(Statement::Label(LabelStatement {
            label: stmt.label,
            body: Box::new(body),
            is_terminal,
            span: stmt.span,
        }))
    }
}

/// `let`/`const` directly in the block would change scope if spliced out
fn declares_lexical(block: &Block) -> bool {
    block
        .statements
        .iter()
        .any(|stmt| matches!(stmt, Statement::VarDecl(decl) if decl.kind != VarKind::Var))
}

/// An unlabeled `break` in a case body that no nested loop or switch takes
fn breaks_out_of_switch(switch: &SwitchStatement) -> bool {
    switch.cases.iter().any(|case| {
        EscapeFinder::in_block(&case.body)
            .iter()
            .any(|jump| jump.is_break && jump.label.is_none())
    })
}

fn completion_assignment(expression: Expression, span: Span) -> Expression {
    Expression::Assign(AssignExpression {
        op: None,
        target: Box::new(Expression::Identifier(Ident::return_value(span))),
        value: Box::new(expression),
        span,
    })
}

fn is_completion_assignment(expression: &Expression) -> bool {
    matches!(expression, Expression::Assign(assign) if assign.op.is_none() && assign.target.is_identifier(&Name::Return))
}
