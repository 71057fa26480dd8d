//! Read-only tree walking
//!
//! Every `visit_*` method defaults to the matching `walk_*` function, so an
//! implementation only overrides the nodes it cares about. Overriding
//! `visit_function` with an empty body keeps a walk inside the current
//! function, which is what most compiler analyses want.
//!
//! # Example
//!
//! ```rust
//! use tarn_ast::*;
//!
//! struct CountReturns {
//!     count: usize,
//! }
//!
//! impl Visitor for CountReturns {
//!     fn visit_statement(&mut self, stmt: &Statement) {
//!         if matches!(stmt, Statement::Return(_)) {
//!             self.count += 1;
//!         }
//!         walk_statement(self, stmt);
//!     }
//!
//!     fn visit_function(&mut self, _func: &FunctionNode) {
//!         // Returns of nested functions do not count
//!     }
//! }
//! ```

use crate::expression::*;
use crate::function::FunctionNode;
use crate::name::{Ident, Name, Synthetic};
use crate::statement::*;

/// AST visitor trait
pub trait Visitor: Sized {
    fn visit_function(&mut self, func: &FunctionNode) {
        walk_function(self, func);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_statement(&mut self, stmt: &Statement) {
        walk_statement(self, stmt);
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) {
        walk_var_decl(self, decl);
    }

    fn visit_try(&mut self, stmt: &TryStatement) {
        walk_try(self, stmt);
    }

    fn visit_catch(&mut self, catch: &CatchClause) {
        walk_catch(self, catch);
    }

    fn visit_expression(&mut self, expr: &Expression) {
        walk_expression(self, expr);
    }

    fn visit_call(&mut self, call: &CallExpression) {
        walk_call(self, call);
    }

    fn visit_ident(&mut self, ident: &Ident) {
        if let Name::Synthetic(name) = ident.name {
            self.visit_synthetic(name);
        }
    }

    /// Every compiler-introduced name: bindings, references and labels
    fn visit_synthetic(&mut self, _name: Synthetic) {}
}

// ============================================================================
// Walk functions
// ============================================================================

pub fn walk_function<V: Visitor>(visitor: &mut V, func: &FunctionNode) {
    if let Some(name) = &func.name {
        visitor.visit_ident(name);
    }
    for param in &func.params {
        visitor.visit_ident(&param.ident);
    }
    visitor.visit_block(&func.body);
}

pub fn walk_block<V: Visitor>(visitor: &mut V, block: &Block) {
    for stmt in &block.statements {
        visitor.visit_statement(stmt);
    }
}

pub fn walk_statement<V: Visitor>(visitor: &mut V, stmt: &Statement) {
    match stmt {
        Statement::Block(block) => visitor.visit_block(block),
        Statement::Expression(stmt) => visitor.visit_expression(&stmt.expression),
        Statement::VarDecl(decl) => visitor.visit_var_decl(decl),
        Statement::If(stmt) => {
            visitor.visit_expression(&stmt.test);
            visitor.visit_block(&stmt.consequent);
            if let Some(alternate) = &stmt.alternate {
                visitor.visit_block(alternate);
            }
        }
        Statement::While(stmt) => {
            visitor.visit_expression(&stmt.test);
            visitor.visit_block(&stmt.body);
        }
        Statement::For(stmt) => {
            match &stmt.init {
                Some(ForInit::VarDecl(decl)) => visitor.visit_var_decl(decl),
                Some(ForInit::Expression(expr)) => visitor.visit_expression(expr),
                None => {}
            }
            if let Some(test) = &stmt.test {
                visitor.visit_expression(test);
            }
            if let Some(update) = &stmt.update {
                visitor.visit_expression(update);
            }
            if let Some(iterable) = &stmt.iterable {
                visitor.visit_expression(iterable);
            }
            if let Some(iterator) = stmt.iterator {
                visitor.visit_synthetic(iterator);
            }
            visitor.visit_block(&stmt.body);
        }
        Statement::Switch(stmt) => {
            visitor.visit_expression(&stmt.discriminant);
            if let Some(tag) = stmt.tag {
                visitor.visit_synthetic(tag);
            }
            for case in &stmt.cases {
                if let Some(test) = &case.test {
                    visitor.visit_expression(test);
                }
                visitor.visit_block(&case.body);
            }
        }
        Statement::Break(_) | Statement::Continue(_) => {}
        Statement::Return(stmt) => {
            if let Some(value) = &stmt.value {
                visitor.visit_expression(value);
            }
        }
        Statement::Throw(stmt) => visitor.visit_expression(&stmt.value),
        Statement::Try(stmt) => visitor.visit_try(stmt),
        Statement::Label(stmt) => visitor.visit_statement(&stmt.body),
        Statement::With(stmt) => {
            visitor.visit_expression(&stmt.object);
            visitor.visit_block(&stmt.body);
        }
        Statement::JumpToInlinedFinally(jump) => visitor.visit_synthetic(jump.label),
        Statement::ClassDecl(decl) => visitor.visit_ident(&decl.name),
        Statement::Module(_) | Statement::Empty(_) => {}
    }
}

pub fn walk_var_decl<V: Visitor>(visitor: &mut V, decl: &VarDecl) {
    if let Binding::Ident(ident) = &decl.binding {
        visitor.visit_ident(ident);
    }
    if let Some(init) = &decl.init {
        visitor.visit_expression(init);
    }
}

pub fn walk_try<V: Visitor>(visitor: &mut V, stmt: &TryStatement) {
    visitor.visit_block(&stmt.body);
    for catch in &stmt.catches {
        visitor.visit_catch(catch);
    }
    if let Some(finally) = &stmt.finally {
        visitor.visit_block(finally);
    }
    for inlined in &stmt.inlined_finallies {
        visitor.visit_synthetic(inlined.label);
        visitor.visit_block(&inlined.body);
    }
}

pub fn walk_catch<V: Visitor>(visitor: &mut V, catch: &CatchClause) {
    visitor.visit_ident(&catch.param);
    if let Some(condition) = &catch.condition {
        visitor.visit_expression(condition);
    }
    visitor.visit_block(&catch.body);
}

pub fn walk_expression<V: Visitor>(visitor: &mut V, expr: &Expression) {
    match expr {
        Expression::Literal(_) | Expression::This(_) | Expression::Pattern(_) => {}
        Expression::Identifier(ident) => visitor.visit_ident(ident),
        Expression::Assign(e) => {
            visitor.visit_expression(&e.target);
            visitor.visit_expression(&e.value);
        }
        Expression::Binary(e) => {
            visitor.visit_expression(&e.left);
            visitor.visit_expression(&e.right);
        }
        Expression::Unary(e) => visitor.visit_expression(&e.operand),
        Expression::Update(e) => visitor.visit_expression(&e.target),
        Expression::Conditional(e) => {
            visitor.visit_expression(&e.test);
            visitor.visit_expression(&e.consequent);
            visitor.visit_expression(&e.alternate);
        }
        Expression::Call(call) => visitor.visit_call(call),
        Expression::New(e) => {
            visitor.visit_expression(&e.callee);
            for arg in &e.args {
                visitor.visit_expression(arg);
            }
        }
        Expression::Member(e) => visitor.visit_expression(&e.object),
        Expression::Index(e) => {
            visitor.visit_expression(&e.object);
            visitor.visit_expression(&e.index);
        }
        Expression::Function(func) => visitor.visit_function(func),
        Expression::Array(e) => {
            for element in &e.elements {
                visitor.visit_expression(element);
            }
        }
        Expression::Object(e) => {
            for property in &e.properties {
                visitor.visit_expression(&property.value);
            }
        }
        Expression::Spread(e) => visitor.visit_expression(&e.argument),
        Expression::Yield(e) => {
            if let Some(argument) = &e.argument {
                visitor.visit_expression(argument);
            }
        }
        Expression::Class(e) => {
            if let Some(name) = &e.name {
                visitor.visit_ident(name);
            }
        }
    }
}

pub fn walk_call<V: Visitor>(visitor: &mut V, call: &CallExpression) {
    visitor.visit_expression(&call.callee);
    for arg in &call.args {
        visitor.visit_expression(arg);
    }
    if let Some(eval) = &call.eval {
        for arg in &eval.args {
            visitor.visit_expression(arg);
        }
    }
}
