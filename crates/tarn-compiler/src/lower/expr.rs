//! Expression lowering
//!
//! Expressions are rebuilt as-is except for two things: nested functions are
//! lowered in their own context, and direct `eval` calls get their
//! [`EvalArgs`].

use tarn_ast::*;

use super::rename::fresh_copy_expressions;
use super::{FunctionContext, Lowerer};
use crate::error::{CompileError, CompileResult, Feature};

impl Lowerer<'_> {
    pub(super) fn lower_expression(&mut self, expr: Expression, ctx: &mut FunctionContext) -> CompileResult<Expression> {
        let lowered = match expr {
            Expression::Literal(_) | Expression::Identifier(_) | Expression::This(_) => expr,

            Expression::Assign(e) => {
                if let Expression::Pattern(pattern) = e.target.as_ref() {
                    return Err(CompileError::unsupported(Feature::Destructuring, pattern.span));
                }
                Expression::Assign(AssignExpression {
                    target: self.lower_boxed(e.target, ctx)?,
                    value: self.lower_boxed(e.value, ctx)?,
                    ..e
                })
            }
            Expression::Binary(e) => Expression::Binary(BinaryExpression {
                left: self.lower_boxed(e.left, ctx)?,
                right: self.lower_boxed(e.right, ctx)?,
                ..e
            }),
            Expression::Unary(e) => Expression::Unary(UnaryExpression {
                operand: self.lower_boxed(e.operand, ctx)?,
                ..e
            }),
            Expression::Update(e) => Expression::Update(UpdateExpression {
                target: self.lower_boxed(e.target, ctx)?,
                ..e
            }),
            Expression::Conditional(e) => Expression::Conditional(ConditionalExpression {
                test: self.lower_boxed(e.test, ctx)?,
                consequent: self.lower_boxed(e.consequent, ctx)?,
                alternate: self.lower_boxed(e.alternate, ctx)?,
                span: e.span,
            }),

            Expression::Call(e) => Expression::Call(self.lower_call(e, ctx)?),
            Expression::New(e) => Expression::New(NewExpression {
                callee: self.lower_boxed(e.callee, ctx)?,
                args: self.lower_expressions(e.args, ctx)?,
                span: e.span,
            }),
            Expression::Member(e) => Expression::Member(MemberExpression {
                object: self.lower_boxed(e.object, ctx)?,
                ..e
            }),
            Expression::Index(e) => Expression::Index(IndexExpression {
                object: self.lower_boxed(e.object, ctx)?,
                index: self.lower_boxed(e.index, ctx)?,
                span: e.span,
            }),

            Expression::Function(func) => {
                let lowered = self.lower_function(*func, ctx.strict)?;
                if lowered.flags.has_eval || lowered.flags.has_nested_eval {
                    ctx.has_nested_eval = true;
                }
                Expression::Function(Box::new(lowered))
            }

            Expression::Array(e) => Expression::Array(ArrayExpression {
                elements: self.lower_expressions(e.elements, ctx)?,
                span: e.span,
            }),
            Expression::Object(e) => {
                let mut properties = Vec::with_capacity(e.properties.len());
                for property in e.properties {
                    properties.push(Property {
                        value: self.lower_expression(property.value, ctx)?,
                        ..property
                    });
                }
                Expression::Object(ObjectExpression {
                    properties,
                    span: e.span,
                })
            }

            Expression::Spread(e) => return Err(CompileError::unsupported(Feature::Spread, e.span)),
            Expression::Yield(e) => return Err(CompileError::unsupported(Feature::Yield, e.span)),
            Expression::Class(e) => return Err(CompileError::unsupported(Feature::Class, e.span)),
            Expression::Pattern(e) => return Err(CompileError::unsupported(Feature::Destructuring, e.span)),
        };
        Ok(lowered)
    }

    fn lower_boxed(&mut self, expr: Box<Expression>, ctx: &mut FunctionContext) -> CompileResult<Box<Expression>> {
        Ok(Box::new(self.lower_expression(*expr, ctx)?))
    }

    fn lower_expressions(&mut self, exprs: Vec<Expression>, ctx: &mut FunctionContext) -> CompileResult<Vec<Expression>> {
        exprs
            .into_iter()
            .map(|expr| self.lower_expression(expr, ctx))
            .collect()
    }

    /// `eval(...)` with at least one argument may run code that sees and
    /// declares local bindings, so the function gets a dynamic scope
    fn lower_call(&mut self, call: CallExpression, ctx: &mut FunctionContext) -> CompileResult<CallExpression> {
        let callee = self.lower_boxed(call.callee, ctx)?;
        let args = self.lower_expressions(call.args, ctx)?;

        let is_direct_eval = callee.is_identifier(&Name::user("eval")) && !args.is_empty();
        let eval = if is_direct_eval {
            ctx.has_eval = true;
            Some(EvalArgs {
                args: fresh_copy_expressions(&args, self.unit),
                location: format!(
                    "{}#{}:{}<eval>",
                    self.options.source_name, call.span.line, call.span.column
                ),
                strict: ctx.strict,
            })
        } else {
            None
        };

        Ok(CallExpression {
            callee,
            args,
            eval,
            span: call.span,
        })
    }
}
