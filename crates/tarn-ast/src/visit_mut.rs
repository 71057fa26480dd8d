//! In-place tree rewriting
//!
//! Mirror of [`crate::visitor`] over `&mut` nodes. Used by passes that patch
//! names or identities without rebuilding the tree.

use crate::expression::*;
use crate::function::FunctionNode;
use crate::name::{Ident, Name, Synthetic};
use crate::statement::*;

/// Mutable AST visitor trait
pub trait VisitorMut: Sized {
    fn visit_function_mut(&mut self, func: &mut FunctionNode) {
        walk_function_mut(self, func);
    }

    fn visit_block_mut(&mut self, block: &mut Block) {
        walk_block_mut(self, block);
    }

    fn visit_statement_mut(&mut self, stmt: &mut Statement) {
        walk_statement_mut(self, stmt);
    }

    fn visit_var_decl_mut(&mut self, decl: &mut VarDecl) {
        walk_var_decl_mut(self, decl);
    }

    fn visit_catch_mut(&mut self, catch: &mut CatchClause) {
        walk_catch_mut(self, catch);
    }

    fn visit_expression_mut(&mut self, expr: &mut Expression) {
        walk_expression_mut(self, expr);
    }

    fn visit_ident_mut(&mut self, ident: &mut Ident) {
        if let Name::Synthetic(name) = &mut ident.name {
            self.visit_synthetic_mut(name);
        }
    }

    fn visit_synthetic_mut(&mut self, _name: &mut Synthetic) {}
}

pub fn walk_function_mut<V: VisitorMut>(visitor: &mut V, func: &mut FunctionNode) {
    if let Some(name) = &mut func.name {
        visitor.visit_ident_mut(name);
    }
    for param in &mut func.params {
        visitor.visit_ident_mut(&mut param.ident);
    }
    visitor.visit_block_mut(&mut func.body);
}

pub fn walk_block_mut<V: VisitorMut>(visitor: &mut V, block: &mut Block) {
    for stmt in &mut block.statements {
        visitor.visit_statement_mut(stmt);
    }
}

pub fn walk_statement_mut<V: VisitorMut>(visitor: &mut V, stmt: &mut Statement) {
    match stmt {
        Statement::Block(block) => visitor.visit_block_mut(block),
        Statement::Expression(stmt) => visitor.visit_expression_mut(&mut stmt.expression),
        Statement::VarDecl(decl) => visitor.visit_var_decl_mut(decl),
        Statement::If(stmt) => {
            visitor.visit_expression_mut(&mut stmt.test);
            visitor.visit_block_mut(&mut stmt.consequent);
            if let Some(alternate) = &mut stmt.alternate {
                visitor.visit_block_mut(alternate);
            }
        }
        Statement::While(stmt) => {
            visitor.visit_expression_mut(&mut stmt.test);
            visitor.visit_block_mut(&mut stmt.body);
        }
        Statement::For(stmt) => {
            match &mut stmt.init {
                Some(ForInit::VarDecl(decl)) => visitor.visit_var_decl_mut(decl),
                Some(ForInit::Expression(expr)) => visitor.visit_expression_mut(expr),
                None => {}
            }
            if let Some(test) = &mut stmt.test {
                visitor.visit_expression_mut(test);
            }
            if let Some(update) = &mut stmt.update {
                visitor.visit_expression_mut(update);
            }
            if let Some(iterable) = &mut stmt.iterable {
                visitor.visit_expression_mut(iterable);
            }
            if let Some(iterator) = &mut stmt.iterator {
                visitor.visit_synthetic_mut(iterator);
            }
            visitor.visit_block_mut(&mut stmt.body);
        }
        Statement::Switch(stmt) => {
            visitor.visit_expression_mut(&mut stmt.discriminant);
            if let Some(tag) = &mut stmt.tag {
                visitor.visit_synthetic_mut(tag);
            }
            for case in &mut stmt.cases {
                if let Some(test) = &mut case.test {
                    visitor.visit_expression_mut(test);
                }
                visitor.visit_block_mut(&mut case.body);
            }
        }
        Statement::Break(_) | Statement::Continue(_) => {}
        Statement::Return(stmt) => {
            if let Some(value) = &mut stmt.value {
                visitor.visit_expression_mut(value);
            }
        }
        Statement::Throw(stmt) => visitor.visit_expression_mut(&mut stmt.value),
        Statement::Try(stmt) => {
            visitor.visit_block_mut(&mut stmt.body);
            for catch in &mut stmt.catches {
                visitor.visit_catch_mut(catch);
            }
            if let Some(finally) = &mut stmt.finally {
                visitor.visit_block_mut(finally);
            }
            for inlined in &mut stmt.inlined_finallies {
                visitor.visit_synthetic_mut(&mut inlined.label);
                visitor.visit_block_mut(&mut inlined.body);
            }
        }
        Statement::Label(stmt) => visitor.visit_statement_mut(&mut stmt.body),
        Statement::With(stmt) => {
            visitor.visit_expression_mut(&mut stmt.object);
            visitor.visit_block_mut(&mut stmt.body);
        }
        Statement::JumpToInlinedFinally(jump) => visitor.visit_synthetic_mut(&mut jump.label),
        Statement::ClassDecl(decl) => visitor.visit_ident_mut(&mut decl.name),
        Statement::Module(_) | Statement::Empty(_) => {}
    }
}

pub fn walk_var_decl_mut<V: VisitorMut>(visitor: &mut V, decl: &mut VarDecl) {
    if let Binding::Ident(ident) = &mut decl.binding {
        visitor.visit_ident_mut(ident);
    }
    if let Some(init) = &mut decl.init {
        visitor.visit_expression_mut(init);
    }
}

pub fn walk_catch_mut<V: VisitorMut>(visitor: &mut V, catch: &mut CatchClause) {
    visitor.visit_ident_mut(&mut catch.param);
    if let Some(condition) = &mut catch.condition {
        visitor.visit_expression_mut(condition);
    }
    visitor.visit_block_mut(&mut catch.body);
}

pub fn walk_expression_mut<V: VisitorMut>(visitor: &mut V, expr: &mut Expression) {
    match expr {
        Expression::Literal(_) | Expression::This(_) | Expression::Pattern(_) => {}
        Expression::Identifier(ident) => visitor.visit_ident_mut(ident),
        Expression::Assign(e) => {
            visitor.visit_expression_mut(&mut e.target);
            visitor.visit_expression_mut(&mut e.value);
        }
        Expression::Binary(e) => {
            visitor.visit_expression_mut(&mut e.left);
            visitor.visit_expression_mut(&mut e.right);
        }
        Expression::Unary(e) => visitor.visit_expression_mut(&mut e.operand),
        Expression::Update(e) => visitor.visit_expression_mut(&mut e.target),
        Expression::Conditional(e) => {
            visitor.visit_expression_mut(&mut e.test);
            visitor.visit_expression_mut(&mut e.consequent);
            visitor.visit_expression_mut(&mut e.alternate);
        }
        Expression::Call(call) => {
            visitor.visit_expression_mut(&mut call.callee);
            for arg in &mut call.args {
                visitor.visit_expression_mut(arg);
            }
            if let Some(eval) = &mut call.eval {
                for arg in &mut eval.args {
                    visitor.visit_expression_mut(arg);
                }
            }
        }
        Expression::New(e) => {
            visitor.visit_expression_mut(&mut e.callee);
            for arg in &mut e.args {
                visitor.visit_expression_mut(arg);
            }
        }
        Expression::Member(e) => visitor.visit_expression_mut(&mut e.object),
        Expression::Index(e) => {
            visitor.visit_expression_mut(&mut e.object);
            visitor.visit_expression_mut(&mut e.index);
        }
        Expression::Function(func) => visitor.visit_function_mut(func),
        Expression::Array(e) => {
            for element in &mut e.elements {
                visitor.visit_expression_mut(element);
            }
        }
        Expression::Object(e) => {
            for property in &mut e.properties {
                visitor.visit_expression_mut(&mut property.value);
            }
        }
        Expression::Spread(e) => visitor.visit_expression_mut(&mut e.argument),
        Expression::Yield(e) => {
            if let Some(argument) = &mut e.argument {
                visitor.visit_expression_mut(argument);
            }
        }
        Expression::Class(e) => {
            if let Some(name) = &mut e.name {
                visitor.visit_ident_mut(name);
            }
        }
    }
}
