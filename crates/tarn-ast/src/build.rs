//! Tree construction helpers
//!
//! Short constructors for hand-built trees in tests, benchmarks and tools
//! that synthesize code. Every node gets a default span.

use crate::expression::*;
use crate::function::{FunctionId, FunctionKind, FunctionNode, Param};
use crate::name::{Ident, Name, Synthetic};
use crate::span::Span;
use crate::statement::*;

fn span() -> Span {
    Span::default()
}

// ============================================================================
// Expressions
// ============================================================================

pub fn num(value: f64) -> Expression {
    literal(LiteralValue::Number(value))
}

pub fn string(value: &str) -> Expression {
    literal(LiteralValue::String(value.to_string()))
}

pub fn boolean(value: bool) -> Expression {
    literal(LiteralValue::Bool(value))
}

pub fn undefined() -> Expression {
    literal(LiteralValue::Undefined)
}

pub fn literal(value: LiteralValue) -> Expression {
    Expression::Literal(Literal { value, span: span() })
}

pub fn ident(name: &str) -> Expression {
    Expression::Identifier(Ident::user(name, span()))
}

pub fn name_ref(name: Name) -> Expression {
    Expression::Identifier(Ident::new(name, span()))
}

/// `target = value`
pub fn assign_to(target: Expression, value: Expression) -> Expression {
    Expression::Assign(AssignExpression {
        op: None,
        target: Box::new(target),
        value: Box::new(value),
        span: span(),
    })
}

pub fn assign(name: &str, value: Expression) -> Expression {
    assign_to(ident(name), value)
}

pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Expression {
    Expression::Binary(BinaryExpression {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span: span(),
    })
}

/// `name++`
pub fn post_increment(name: &str) -> Expression {
    Expression::Update(UpdateExpression {
        op: UpdateOp::Increment,
        prefix: false,
        target: Box::new(ident(name)),
        span: span(),
    })
}

pub fn call(callee: &str, args: Vec<Expression>) -> Expression {
    Expression::Call(CallExpression {
        callee: Box::new(ident(callee)),
        args,
        eval: None,
        span: span(),
    })
}

pub fn new_expr(callee: &str, args: Vec<Expression>) -> Expression {
    Expression::New(NewExpression {
        callee: Box::new(ident(callee)),
        args,
        span: span(),
    })
}

pub fn function_expr(func: FunctionNode) -> Expression {
    Expression::Function(Box::new(func))
}

// ============================================================================
// Statements
// ============================================================================

pub fn expr_stmt(expression: Expression) -> Statement {
    Statement::Expression(ExpressionStatement {
        expression,
        span: span(),
    })
}

fn decl(kind: VarKind, name: &str, init: Option<Expression>) -> VarDecl {
    VarDecl {
        kind,
        binding: Binding::Ident(Ident::user(name, span())),
        init,
        is_function_declaration: false,
        span: span(),
    }
}

pub fn var(name: &str, init: Option<Expression>) -> Statement {
    Statement::VarDecl(decl(VarKind::Var, name, init))
}

pub fn let_decl(name: &str, init: Option<Expression>) -> Statement {
    Statement::VarDecl(decl(VarKind::Let, name, init))
}

/// `function name(params) { body }` as a hoisted declaration
pub fn function_decl(func: FunctionNode) -> Statement {
    let name = func
        .name
        .clone()
        .unwrap_or_else(|| Ident::user("anonymous", span()));
    Statement::VarDecl(VarDecl {
        kind: VarKind::Var,
        binding: Binding::Ident(name),
        init: Some(function_expr(func)),
        is_function_declaration: true,
        span: span(),
    })
}

pub fn ret(value: Option<Expression>) -> Statement {
    Statement::Return(ReturnStatement {
        value,
        span: span(),
    })
}

pub fn throw(value: Expression) -> Statement {
    Statement::Throw(ThrowStatement {
        value,
        is_rethrow: false,
        span: span(),
    })
}

/// `throw name` of a compiler-generated catch-all
pub fn rethrow(name: Synthetic) -> Statement {
    Statement::Throw(ThrowStatement {
        value: Expression::Identifier(Ident::synthetic(name, span())),
        is_rethrow: true,
        span: span(),
    })
}

pub fn brk(label: Option<&str>) -> Statement {
    Statement::Break(JumpStatement {
        label: label.map(str::to_string),
        span: span(),
    })
}

pub fn cont(label: Option<&str>) -> Statement {
    Statement::Continue(JumpStatement {
        label: label.map(str::to_string),
        span: span(),
    })
}

pub fn block(statements: Vec<Statement>) -> Block {
    Block::new(statements, span())
}

pub fn block_stmt(statements: Vec<Statement>) -> Statement {
    Statement::Block(block(statements))
}

pub fn if_stmt(test: Expression, consequent: Vec<Statement>, alternate: Option<Vec<Statement>>) -> Statement {
    Statement::If(IfStatement {
        test,
        consequent: block(consequent),
        alternate: alternate.map(block),
        span: span(),
    })
}

pub fn while_loop(test: Expression, body: Vec<Statement>) -> Statement {
    Statement::While(WhileStatement {
        test,
        body: block(body),
        is_do_while: false,
        control_flow_escapes: false,
        span: span(),
    })
}

pub fn do_while(body: Vec<Statement>, test: Expression) -> Statement {
    Statement::While(WhileStatement {
        test,
        body: block(body),
        is_do_while: true,
        control_flow_escapes: false,
        span: span(),
    })
}

/// `var name = init` in a for-loop head
pub fn for_var(name: &str, init: Expression) -> ForInit {
    ForInit::VarDecl(decl(VarKind::Var, name, Some(init)))
}

pub fn for_loop(
    init: Option<ForInit>,
    test: Option<Expression>,
    update: Option<Expression>,
    body: Vec<Statement>,
) -> Statement {
    Statement::For(ForStatement {
        kind: ForKind::Classic,
        init,
        test,
        update,
        iterable: None,
        body: block(body),
        iterator: None,
        control_flow_escapes: false,
        span: span(),
    })
}

/// `for (var name in object) { body }`
pub fn for_in(name: &str, object: Expression, body: Vec<Statement>) -> Statement {
    iteration(ForKind::In, name, object, body)
}

/// `for (var name of iterable) { body }`
pub fn for_of(name: &str, iterable: Expression, body: Vec<Statement>) -> Statement {
    iteration(ForKind::Of, name, iterable, body)
}

fn iteration(kind: ForKind, name: &str, iterable: Expression, body: Vec<Statement>) -> Statement {
    Statement::For(ForStatement {
        kind,
        init: Some(ForInit::VarDecl(decl(VarKind::Var, name, None))),
        test: None,
        update: None,
        iterable: Some(iterable),
        body: block(body),
        iterator: None,
        control_flow_escapes: false,
        span: span(),
    })
}

pub fn switch(discriminant: Expression, cases: Vec<(Option<Expression>, Vec<Statement>)>) -> Statement {
    Statement::Switch(SwitchStatement {
        discriminant,
        cases: cases
            .into_iter()
            .map(|(test, body)| SwitchCase {
                test,
                body: block(body),
                span: span(),
            })
            .collect(),
        tag: None,
        is_terminal: false,
        span: span(),
    })
}

pub fn label(name: &str, body: Statement) -> Statement {
    Statement::Label(LabelStatement {
        label: name.to_string(),
        body: Box::new(body),
        is_terminal: false,
        span: span(),
    })
}

pub fn with_stmt(object: Expression, body: Vec<Statement>) -> Statement {
    Statement::With(WithStatement {
        object,
        body: block(body),
        span: span(),
    })
}

pub fn catch_clause(param: &str, condition: Option<Expression>, body: Vec<Statement>) -> CatchClause {
    CatchClause {
        param: Ident::user(param, span()),
        condition,
        body: block(body),
        is_catch_all: false,
        span: span(),
    }
}

pub fn try_stmt(body: Vec<Statement>, catches: Vec<CatchClause>, finally: Option<Vec<Statement>>) -> Statement {
    Statement::Try(TryStatement::new(block(body), catches, finally.map(block), span()))
}

/// `try { body } finally { finally }`
pub fn try_finally(body: Vec<Statement>, finally: Vec<Statement>) -> Statement {
    try_stmt(body, Vec::new(), Some(finally))
}

// ============================================================================
// Functions
// ============================================================================

pub fn function(name: &str, params: &[&str], body: Vec<Statement>) -> FunctionNode {
    FunctionNode::new(
        FunctionId(0),
        Some(Ident::user(name, span())),
        FunctionKind::Normal,
        params
            .iter()
            .map(|param| Param::new(Ident::user(*param, span())))
            .collect(),
        block(body),
        span(),
    )
}

pub fn program(body: Vec<Statement>) -> FunctionNode {
    FunctionNode::new(FunctionId(0), None, FunctionKind::Program, Vec::new(), block(body), span())
}
