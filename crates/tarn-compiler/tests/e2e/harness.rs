//! Test harness for end-to-end lowering checks
//!
//! Runs a function tree through a small reference evaluator, once as parsed
//! and once after lowering, so tests can compare observable behavior: the
//! returned or thrown value, the `log(...)` trace, and how often
//! `sideEffect()` ran.
//!
//! Natives:
//! - `log(a, b, ...)` appends the arguments, space separated, to the trace
//! - `sideEffect()` bumps a counter and returns its new value
//! - `fail(message)` throws an error value
//! - `new Error(message)` builds an error value

use std::collections::{HashMap, HashSet};

use tarn_ast::*;
use tarn_compiler::{Compiler, CompilerOptions};

/// Guard against runaway loops in a broken lowering
const MAX_ITERATIONS: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Error(String),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Error(_) => true,
        }
    }

    fn to_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Null => 0.0,
            Value::Str(s) => s.trim().parse().unwrap_or(f64::NAN),
            Value::Undefined | Value::Error(_) => f64::NAN,
        }
    }

    fn display(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", *n as i64),
            Value::Number(n) => n.to_string(),
            Value::Str(s) => s.clone(),
            Value::Error(message) => format!("Error: {}", message),
        }
    }
}

impl From<&LiteralValue> for Value {
    fn from(value: &LiteralValue) -> Self {
        match value {
            LiteralValue::Undefined => Value::Undefined,
            LiteralValue::Null => Value::Null,
            LiteralValue::Bool(b) => Value::Bool(*b),
            LiteralValue::Number(n) => Value::Number(*n),
            LiteralValue::String(s) => Value::Str(s.clone()),
        }
    }
}

/// How a statement finished
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Normal,
    Return(Value),
    Break(Option<String>),
    Continue(Option<String>),
    Throw(Value),
    Jump(Synthetic),
}

/// Observable result of running a function
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Returned value, or the thrown one
    pub result: Result<Value, Value>,
    pub log: Vec<String>,
    pub side_effects: u32,
}

impl Outcome {
    pub fn returned(&self) -> &Value {
        match &self.result {
            Ok(value) => value,
            Err(thrown) => panic!("expected a return, got throw of {:?}", thrown),
        }
    }

    pub fn thrown(&self) -> &Value {
        match &self.result {
            Err(thrown) => thrown,
            Ok(value) => panic!("expected a throw, got return of {:?}", value),
        }
    }
}

/// Evaluate an expression or turn its exception into a throw completion
macro_rules! value {
    ($eval:expr) => {
        match $eval {
            Ok(value) => value,
            Err(thrown) => return Completion::Throw(thrown),
        }
    };
}

struct Interpreter {
    env: HashMap<Name, Value>,
    log: Vec<String>,
    side_effects: u32,
    /// Value of the last expression statement, the completion value of a
    /// script that runs off its end
    completion_value: Value,
}

impl Interpreter {
    fn new() -> Self {
        Self {
            env: HashMap::new(),
            log: Vec::new(),
            side_effects: 0,
            completion_value: Value::Undefined,
        }
    }

    fn exec_block(&mut self, block: &Block) -> Completion {
        for stmt in &block.statements {
            match self.exec(stmt) {
                Completion::Normal => {}
                other => return other,
            }
        }
        Completion::Normal
    }

    fn exec(&mut self, stmt: &Statement) -> Completion {
        match stmt {
            Statement::Block(block) => self.exec_block(block),
            Statement::Empty(_) => Completion::Normal,

            Statement::Expression(stmt) => {
                self.completion_value = value!(self.eval(&stmt.expression));
                Completion::Normal
            }

            Statement::VarDecl(decl) => {
                let name = decl.name().expect("destructuring is not evaluated").clone();
                match &decl.init {
                    Some(init) => {
                        let value = value!(self.eval(init));
                        self.env.insert(name, value);
                    }
                    None => {
                        self.env.entry(name).or_insert(Value::Undefined);
                    }
                }
                Completion::Normal
            }

            Statement::If(stmt) => {
                if value!(self.eval(&stmt.test)).is_truthy() {
                    self.exec_block(&stmt.consequent)
                } else if let Some(alternate) = &stmt.alternate {
                    self.exec_block(alternate)
                } else {
                    Completion::Normal
                }
            }

            Statement::While(_) | Statement::For(_) => self.exec_loop(stmt, &[]),

            Statement::Switch(stmt) => self.exec_switch(stmt),

            Statement::Label(stmt) => {
                let mut labels = vec![stmt.label.clone()];
                let mut body = stmt.body.as_ref();
                while let Statement::Label(inner) = body {
                    labels.push(inner.label.clone());
                    body = inner.body.as_ref();
                }
                let completion = match body {
                    Statement::While(_) | Statement::For(_) => self.exec_loop(body, &labels),
                    other => self.exec(other),
                };
                match completion {
                    Completion::Break(Some(label)) if labels.contains(&label) => Completion::Normal,
                    other => other,
                }
            }

            Statement::Break(jump) => Completion::Break(jump.label.clone()),
            Statement::Continue(jump) => Completion::Continue(jump.label.clone()),
            Statement::Return(stmt) => match &stmt.value {
                Some(value) => Completion::Return(value!(self.eval(value))),
                None => Completion::Return(Value::Undefined),
            },
            Statement::Throw(stmt) => Completion::Throw(value!(self.eval(&stmt.value))),
            Statement::JumpToInlinedFinally(jump) => Completion::Jump(jump.label),

            Statement::Try(stmt) => self.exec_try(stmt),

            Statement::With(_) | Statement::ClassDecl(_) | Statement::Module(_) => {
                panic!("harness does not evaluate {:?}", stmt)
            }
        }
    }

    fn exec_loop(&mut self, stmt: &Statement, labels: &[String]) -> Completion {
        match stmt {
            Statement::While(stmt) => {
                let mut first = true;
                for _ in 0..MAX_ITERATIONS {
                    if !(stmt.is_do_while && first) && !value!(self.eval(&stmt.test)).is_truthy() {
                        return Completion::Normal;
                    }
                    first = false;
                    if let Some(done) = loop_step(self.exec_block(&stmt.body), labels) {
                        return done;
                    }
                }
                panic!("loop did not terminate")
            }
            Statement::For(stmt) => {
                assert_eq!(stmt.kind, ForKind::Classic, "harness only evaluates classic for loops");
                match &stmt.init {
                    Some(ForInit::VarDecl(decl)) => {
                        let completion = self.exec(&Statement::VarDecl(decl.clone()));
                        if completion != Completion::Normal {
                            return completion;
                        }
                    }
                    Some(ForInit::Expression(expr)) => {
                        value!(self.eval(expr));
                    }
                    None => {}
                }
                for _ in 0..MAX_ITERATIONS {
                    if let Some(test) = &stmt.test {
                        if !value!(self.eval(test)).is_truthy() {
                            return Completion::Normal;
                        }
                    }
                    if let Some(done) = loop_step(self.exec_block(&stmt.body), labels) {
                        return done;
                    }
                    if let Some(update) = &stmt.update {
                        value!(self.eval(update));
                    }
                }
                panic!("loop did not terminate")
            }
            other => panic!("not a loop: {:?}", other),
        }
    }

    fn exec_switch(&mut self, stmt: &SwitchStatement) -> Completion {
        let discriminant = value!(self.eval(&stmt.discriminant));
        let mut start = None;
        for (index, case) in stmt.cases.iter().enumerate() {
            if let Some(test) = &case.test {
                if value!(self.eval(test)) == discriminant {
                    start = Some(index);
                    break;
                }
            }
        }
        let Some(start) = start.or_else(|| stmt.cases.iter().position(|case| case.test.is_none())) else {
            return Completion::Normal;
        };
        for case in &stmt.cases[start..] {
            match self.exec_block(&case.body) {
                Completion::Normal => {}
                Completion::Break(None) => return Completion::Normal,
                other => return other,
            }
        }
        Completion::Normal
    }

    /// Finally semantics for parsed trees, inlined finally dispatch for
    /// lowered ones
    fn exec_try(&mut self, stmt: &TryStatement) -> Completion {
        let mut completion = self.exec_block(&stmt.body);

        if let Completion::Throw(exception) = &completion {
            let exception = exception.clone();
            for catch in &stmt.catches {
                self.env.insert(catch.param.name.clone(), exception.clone());
                let matches = match &catch.condition {
                    Some(condition) => value!(self.eval(condition)).is_truthy(),
                    None => true,
                };
                if matches {
                    completion = self.exec_block(&catch.body);
                    break;
                }
            }
        }

        while let Completion::Jump(label) = &completion {
            let Some(inlined) = stmt.inlined_finallies.iter().find(|inlined| inlined.label == *label) else {
                break;
            };
            completion = self.exec_block(&inlined.body);
        }

        if let Some(finally) = &stmt.finally {
            match self.exec_block(finally) {
                Completion::Normal => {}
                other => completion = other,
            }
        }
        completion
    }

    fn eval(&mut self, expr: &Expression) -> Result<Value, Value> {
        match expr {
            Expression::Literal(lit) => Ok(Value::from(&lit.value)),
            Expression::Identifier(ident) => Ok(self.env.get(&ident.name).cloned().unwrap_or(Value::Undefined)),
            Expression::This(_) => Ok(Value::Undefined),

            Expression::Assign(assign) => {
                let name = assigned_name(&assign.target);
                let value = self.eval(&assign.value)?;
                let value = match assign.op {
                    Some(op) => {
                        let current = self.env.get(&name).cloned().unwrap_or(Value::Undefined);
                        binary(op, &current, &value)
                    }
                    None => value,
                };
                self.env.insert(name, value.clone());
                Ok(value)
            }

            Expression::Binary(e) => match e.op {
                BinaryOp::And => {
                    let left = self.eval(&e.left)?;
                    if left.is_truthy() {
                        self.eval(&e.right)
                    } else {
                        Ok(left)
                    }
                }
                BinaryOp::Or => {
                    let left = self.eval(&e.left)?;
                    if left.is_truthy() {
                        Ok(left)
                    } else {
                        self.eval(&e.right)
                    }
                }
                BinaryOp::Comma => {
                    self.eval(&e.left)?;
                    self.eval(&e.right)
                }
                op => {
                    let left = self.eval(&e.left)?;
                    let right = self.eval(&e.right)?;
                    Ok(binary(op, &left, &right))
                }
            },

            Expression::Unary(e) => {
                let operand = self.eval(&e.operand)?;
                Ok(match e.op {
                    UnaryOp::Not => Value::Bool(!operand.is_truthy()),
                    UnaryOp::Neg => Value::Number(-operand.to_number()),
                    UnaryOp::Plus => Value::Number(operand.to_number()),
                    UnaryOp::Void => Value::Undefined,
                    other => panic!("harness does not evaluate {:?}", other),
                })
            }

            Expression::Update(e) => {
                let name = assigned_name(&e.target);
                let old = self.env.get(&name).map_or(f64::NAN, Value::to_number);
                let new = match e.op {
                    UpdateOp::Increment => old + 1.0,
                    UpdateOp::Decrement => old - 1.0,
                };
                self.env.insert(name, Value::Number(new));
                Ok(Value::Number(if e.prefix { new } else { old }))
            }

            Expression::Conditional(e) => {
                if self.eval(&e.test)?.is_truthy() {
                    self.eval(&e.consequent)
                } else {
                    self.eval(&e.alternate)
                }
            }

            Expression::Call(call) => {
                let callee = native_name(&call.callee);
                let mut args = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    args.push(self.eval(arg)?);
                }
                match callee.as_str() {
                    "log" => {
                        let line = args.iter().map(Value::display).collect::<Vec<_>>().join(" ");
                        self.log.push(line);
                        Ok(Value::Undefined)
                    }
                    "sideEffect" => {
                        self.side_effects += 1;
                        Ok(Value::Number(f64::from(self.side_effects)))
                    }
                    "fail" => Err(Value::Error(args.first().map(Value::display).unwrap_or_default())),
                    other => panic!("harness has no native {}", other),
                }
            }

            Expression::New(new) if native_name(&new.callee) == "Error" => {
                let message = match new.args.first() {
                    Some(arg) => self.eval(arg)?.display(),
                    None => String::new(),
                };
                Ok(Value::Error(message))
            }

            other => panic!("harness does not evaluate {:?}", other),
        }
    }
}

fn loop_step(completion: Completion, labels: &[String]) -> Option<Completion> {
    match completion {
        Completion::Normal | Completion::Continue(None) => None,
        Completion::Continue(Some(label)) if labels.contains(&label) => None,
        Completion::Break(None) => Some(Completion::Normal),
        Completion::Break(Some(label)) if labels.contains(&label) => Some(Completion::Normal),
        other => Some(other),
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    let (l, r) = (left.to_number(), right.to_number());
    match op {
        BinaryOp::Add => match (left, right) {
            (Value::Str(_), _) | (_, Value::Str(_)) => Value::Str(left.display() + &right.display()),
            _ => Value::Number(l + r),
        },
        BinaryOp::Sub => Value::Number(l - r),
        BinaryOp::Mul => Value::Number(l * r),
        BinaryOp::Div => Value::Number(l / r),
        BinaryOp::Mod => Value::Number(l % r),
        BinaryOp::Lt => Value::Bool(l < r),
        BinaryOp::LtEq => Value::Bool(l <= r),
        BinaryOp::Gt => Value::Bool(l > r),
        BinaryOp::GtEq => Value::Bool(l >= r),
        BinaryOp::Eq | BinaryOp::StrictEq => Value::Bool(left == right),
        BinaryOp::NotEq | BinaryOp::StrictNotEq => Value::Bool(left != right),
        other => panic!("harness does not evaluate {:?}", other),
    }
}

fn assigned_name(target: &Expression) -> Name {
    match target {
        Expression::Identifier(ident) => ident.name.clone(),
        other => panic!("harness only assigns to identifiers, got {:?}", other),
    }
}

fn native_name(callee: &Expression) -> String {
    match callee {
        Expression::Identifier(Ident {
            name: Name::User(name), ..
        }) => name.clone(),
        other => panic!("harness only calls natives, got {:?}", other),
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Run a function with all parameters undefined
pub fn run(func: &FunctionNode) -> Outcome {
    let mut interpreter = Interpreter::new();
    for param in &func.params {
        interpreter.env.insert(param.ident.name.clone(), Value::Undefined);
    }
    let result = match interpreter.exec_block(&func.body) {
        Completion::Normal if func.is_program() => Ok(interpreter.completion_value.clone()),
        Completion::Normal => Ok(Value::Undefined),
        Completion::Return(value) => Ok(value),
        Completion::Throw(value) => Err(value),
        other => panic!("{:?} escaped {}", other, func.display_name()),
    };
    Outcome {
        result,
        log: interpreter.log,
        side_effects: interpreter.side_effects,
    }
}

/// Lower with default options, panicking on compile errors
pub fn lower(func: FunctionNode) -> FunctionNode {
    let mut compiler = Compiler::new(CompilerOptions::default());
    match compiler.lower(func) {
        Ok(lowered) => lowered,
        Err(e) => panic!("lowering failed: {}", e),
    }
}

/// Run `func` before and after lowering and require identical behavior
pub fn expect_same_behavior(func: FunctionNode) -> Outcome {
    let expected = run(&func);
    let lowered = lower(func);
    assert_lowered_shape(&lowered);
    let actual = run(&lowered);
    assert_eq!(actual, expected, "lowered tree behaves differently:\n{:#?}", lowered);
    actual
}

/// Structural guarantees of a lowered function
///
/// - nothing but uninitialized declarations follows a terminal statement
/// - no try keeps a finally block or ends with a guarded catch
/// - every jump targets an inlined finally block of an enclosing try
/// - inlined finally labels and catch-all bindings are unique
pub fn assert_lowered_shape(func: &FunctionNode) {
    let mut checker = ShapeChecker::default();
    checker.check_block(&func.body);
}

#[derive(Default)]
struct ShapeChecker {
    targets: Vec<Synthetic>,
    seen: HashSet<Synthetic>,
}

impl ShapeChecker {
    fn check_block(&mut self, block: &Block) {
        if let Some(end) = block
            .statements
            .iter()
            .position(|stmt| stmt.is_terminal() || stmt.is_jump())
        {
            for stmt in &block.statements[end + 1..] {
                assert!(stmt.is_uninitialized_var(), "statement after terminal: {:?}", stmt);
            }
        }
        for stmt in &block.statements {
            self.check_statement(stmt);
        }
    }

    fn check_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Block(block) => self.check_block(block),
            Statement::If(stmt) => {
                self.check_block(&stmt.consequent);
                if let Some(alternate) = &stmt.alternate {
                    self.check_block(alternate);
                }
            }
            Statement::While(stmt) => self.check_block(&stmt.body),
            Statement::For(stmt) => self.check_block(&stmt.body),
            Statement::Switch(stmt) => {
                for case in &stmt.cases {
                    self.check_block(&case.body);
                }
            }
            Statement::Label(stmt) => self.check_statement(&stmt.body),
            Statement::With(stmt) => self.check_block(&stmt.body),
            Statement::Try(stmt) => {
                assert!(stmt.finally.is_none(), "finally survived lowering");
                assert!(!stmt.has_conditional_last_catch(), "guarded catch without a catch-all");
                for catch in stmt.catches.iter().filter(|catch| catch.is_catch_all) {
                    let exception = catch.param.name.as_synthetic().expect("catch-all binds a synthetic name");
                    assert!(self.seen.insert(exception), "duplicate name {}", exception);
                }

                let depth = self.targets.len();
                for inlined in &stmt.inlined_finallies {
                    assert!(self.seen.insert(inlined.label), "duplicate label {}", inlined.label);
                    self.targets.push(inlined.label);
                }
                self.check_block(&stmt.body);
                for catch in &stmt.catches {
                    self.check_block(&catch.body);
                }
                self.targets.truncate(depth);

                for inlined in &stmt.inlined_finallies {
                    self.check_block(&inlined.body);
                }
            }
            Statement::JumpToInlinedFinally(jump) => {
                assert!(
                    self.targets.contains(&jump.label),
                    "jump to {} outside its try",
                    jump.label
                );
            }
            _ => {}
        }
    }
}
