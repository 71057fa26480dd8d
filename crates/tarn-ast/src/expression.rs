//! Expression AST nodes
//!
//! The lowering pass does not evaluate expressions, so this is only as rich
//! as the statement rewrites need: enough to find `eval` calls and nested
//! functions, to build `:return = expr` assignments, and to reject the
//! constructs the compiler does not support (spread, yield, class
//! expressions, destructuring patterns).

use crate::function::FunctionNode;
use crate::name::{Ident, Name};
use crate::span::Span;

/// Expression node
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Literal value
    Literal(Literal),
    /// Identifier reference
    Identifier(Ident),
    /// `this`
    This(Span),
    /// Assignment, plain or compound
    Assign(AssignExpression),
    /// Binary operator, including `,`, `&&` and `||`
    Binary(BinaryExpression),
    /// Unary operator
    Unary(UnaryExpression),
    /// `++` / `--`
    Update(UpdateExpression),
    /// `test ? a : b`
    Conditional(ConditionalExpression),
    /// Function call
    Call(CallExpression),
    /// `new` expression
    New(NewExpression),
    /// `a.b`
    Member(MemberExpression),
    /// `a[b]`
    Index(IndexExpression),
    /// Function expression or arrow function
    Function(Box<FunctionNode>),
    /// Array literal
    Array(ArrayExpression),
    /// Object literal
    Object(ObjectExpression),
    /// `...expr` (unsupported)
    Spread(SpreadExpression),
    /// `yield expr` (unsupported)
    Yield(YieldExpression),
    /// Class expression (unsupported)
    Class(ClassExpression),
    /// Destructuring pattern used as an assignment target (unsupported)
    Pattern(Pattern),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Literal(e) => e.span,
            Expression::Identifier(e) => e.span,
            Expression::This(span) => *span,
            Expression::Assign(e) => e.span,
            Expression::Binary(e) => e.span,
            Expression::Unary(e) => e.span,
            Expression::Update(e) => e.span,
            Expression::Conditional(e) => e.span,
            Expression::Call(e) => e.span,
            Expression::New(e) => e.span,
            Expression::Member(e) => e.span,
            Expression::Index(e) => e.span,
            Expression::Function(e) => e.span,
            Expression::Array(e) => e.span,
            Expression::Object(e) => e.span,
            Expression::Spread(e) => e.span,
            Expression::Yield(e) => e.span,
            Expression::Class(e) => e.span,
            Expression::Pattern(e) => e.span,
        }
    }

    /// Is this a reference to `name`?
    pub fn is_identifier(&self, name: &Name) -> bool {
        matches!(self, Expression::Identifier(ident) if &ident.name == name)
    }

    /// Primitive literals can be re-read after a finally block runs without
    /// changing meaning
    pub fn is_primitive_literal(&self) -> bool {
        matches!(self, Expression::Literal(_))
    }

    /// A test that can never be false (`true`, a non-zero number, a
    /// non-empty string)
    pub fn is_always_true(&self) -> bool {
        matches!(self, Expression::Literal(lit) if lit.value.is_truthy())
    }
}

// ============================================================================
// Literals
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: LiteralValue,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl LiteralValue {
    /// ECMAScript ToBoolean on a literal
    pub fn is_truthy(&self) -> bool {
        match self {
            LiteralValue::Undefined | LiteralValue::Null => false,
            LiteralValue::Bool(b) => *b,
            LiteralValue::Number(n) => *n != 0.0 && !n.is_nan(),
            LiteralValue::String(s) => !s.is_empty(),
        }
    }

    /// Integral number literals that fit an `i32` (switch fast path)
    pub fn as_int(&self) -> Option<i32> {
        match self {
            LiteralValue::Number(n)
                if n.fract() == 0.0 && *n >= i32::MIN as f64 && *n <= i32::MAX as f64 =>
            {
                Some(*n as i32)
            }
            _ => None,
        }
    }
}

// ============================================================================
// Operators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    In,
    InstanceOf,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `,` (left operand is evaluated for side effects only)
    Comma,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
    BitNot,
    TypeOf,
    Void,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

// ============================================================================
// Compound expressions
// ============================================================================

/// `target = value`, or `target op= value` when `op` is set
#[derive(Debug, Clone, PartialEq)]
pub struct AssignExpression {
    pub op: Option<BinaryOp>,
    pub target: Box<Expression>,
    pub value: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub op: BinaryOp,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub op: UnaryOp,
    pub operand: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    pub op: UpdateOp,
    pub prefix: bool,
    pub target: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpression {
    pub test: Box<Expression>,
    pub consequent: Box<Expression>,
    pub alternate: Box<Expression>,
    pub span: Span,
}

/// Function call
///
/// `eval` is set by the lowering pass on direct `eval(...)` calls.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub callee: Box<Expression>,
    pub args: Vec<Expression>,
    pub eval: Option<EvalArgs>,
    pub span: Span,
}

/// Extra information attached to a direct `eval(...)` call
///
/// At runtime the callee may turn out to be a shadowing local named `eval`
/// rather than the global, so the emitter generates both paths. `args` is an
/// independently renamed copy of the call arguments, which lets the "true
/// eval" path evaluate them without sharing synthetic names with the regular
/// call path.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalArgs {
    pub args: Vec<Expression>,
    /// `source#line:column<eval>`, used as the evaluated code's source name
    pub location: String,
    pub strict: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpression {
    pub callee: Box<Expression>,
    pub args: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    pub object: Box<Expression>,
    pub property: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpression {
    pub object: Box<Expression>,
    pub index: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpression {
    pub elements: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectExpression {
    pub properties: Vec<Property>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub key: String,
    pub value: Expression,
    pub span: Span,
}

// ============================================================================
// Unsupported constructs
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SpreadExpression {
    pub argument: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct YieldExpression {
    pub argument: Option<Box<Expression>>,
    pub delegate: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassExpression {
    pub name: Option<Ident>,
    pub span: Span,
}

/// Destructuring pattern (`[a, b]` / `{a, b}`)
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub kind: PatternKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Array,
    Object,
}
