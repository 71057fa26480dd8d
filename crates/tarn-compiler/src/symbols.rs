//! Symbol collection
//!
//! Runs on a lowered function and fills in `Block::symbols`, which is what
//! the code generator's lexical context assigns slots from. Placement:
//! - function body: parameters, `:return` when the function needs it, then
//!   every `var`-scoped binding of the function in first-declaration order
//!   (user `var`s, function declarations, switch tags, loop iterators),
//!   then the body's own `let`/`const`
//! - any other block: its own `let`/`const`, including those of a `for`
//!   header directly inside it
//! - a catch body: the catch parameter first
//!
//! In a function whose bindings can be reached by name at runtime (sloppy
//! direct eval, `with`, or an eval in a nested function) user symbols live
//! in the scope object and get no slot. Internal symbols always get slots.

use std::mem;

use rustc_hash::FxHashSet;
use tarn_ast::*;
use tracing::trace;

use crate::unit::CompileUnit;

/// Declare the symbols of `func` and of every function nested in it
pub fn collect_symbols(func: &mut FunctionNode, unit: &mut CompileUnit) {
    let mut collector = SymbolCollector {
        unit,
        scoped: false,
        pending: Vec::new(),
    };
    collector.collect_function(func);
}

struct SymbolCollector<'u> {
    unit: &'u mut CompileUnit,
    /// User bindings of the current function live in a scope object
    scoped: bool,
    /// Declared ahead of the next block's own symbols
    pending: Vec<Symbol>,
}

impl SymbolCollector<'_> {
    fn collect_function(&mut self, func: &mut FunctionNode) {
        let outer = self.scoped;
        self.scoped = func.is_dynamic_scope() || func.flags.has_with || func.flags.has_nested_eval;

        let mut symbols: Vec<Symbol> = Vec::new();
        for param in &func.params {
            let flags = SymbolFlags {
                is_param: true,
                ..SymbolFlags::default()
            };
            symbols.push(self.symbol(param.ident.name.clone(), flags, param.ident.span));
        }
        if func.flags.needs_return_slot || func.is_program() {
            let flags = SymbolFlags {
                is_var: true,
                ..SymbolFlags::default()
            };
            symbols.push(self.symbol(Name::Return, flags, func.body.span));
        }
        for (name, span) in FunctionVars::collect(&func.body) {
            if symbols.iter().any(|symbol| symbol.name == name) {
                continue;
            }
            let flags = SymbolFlags {
                is_var: true,
                ..SymbolFlags::default()
            };
            symbols.push(self.symbol(name, flags, span));
        }
        let lexical = self.lexical_symbols(&func.body);
        symbols.extend(lexical);

        trace!(
            function = %func.display_name(),
            symbols = symbols.len(),
            scoped = self.scoped,
            "collected symbols"
        );
        func.body.symbols = symbols;
        walk_block_mut(self, &mut func.body);

        self.scoped = outer;
    }

    fn symbol(&mut self, name: Name, mut flags: SymbolFlags, span: Span) -> Symbol {
        flags.is_internal |= name.is_internal();
        flags.is_scope = self.scoped && !flags.is_internal;
        Symbol::new(self.unit.next_symbol_id(), name, flags, span)
    }

    fn lexical_symbols(&mut self, block: &Block) -> Vec<Symbol> {
        let mut symbols = Vec::new();
        for stmt in &block.statements {
            let decl = match stmt {
                Statement::VarDecl(decl) => decl,
                Statement::For(ForStatement {
                    init: Some(ForInit::VarDecl(decl)),
                    ..
                }) => decl,
                _ => continue,
            };
            let flags = match decl.kind {
                VarKind::Var => continue,
                VarKind::Let => SymbolFlags {
                    is_let: true,
                    ..SymbolFlags::default()
                },
                VarKind::Const => SymbolFlags {
                    is_const: true,
                    ..SymbolFlags::default()
                },
            };
            if let Some(name) = decl.name() {
                symbols.push(self.symbol(name.clone(), flags, decl.span));
            }
        }
        symbols
    }
}

impl VisitorMut for SymbolCollector<'_> {
    fn visit_function_mut(&mut self, func: &mut FunctionNode) {
        self.collect_function(func);
    }

    fn visit_block_mut(&mut self, block: &mut Block) {
        let mut symbols = mem::take(&mut self.pending);
        symbols.extend(self.lexical_symbols(block));
        block.symbols = symbols;
        walk_block_mut(self, block);
    }

    fn visit_catch_mut(&mut self, catch: &mut CatchClause) {
        if let Some(condition) = &mut catch.condition {
            self.visit_expression_mut(condition);
        }
        let flags = SymbolFlags {
            is_let: true,
            ..SymbolFlags::default()
        };
        let param = self.symbol(catch.param.name.clone(), flags, catch.param.span);
        self.pending.push(param);
        self.visit_block_mut(&mut catch.body);
    }
}

/// `var`-scoped bindings of one function, nested functions excluded
#[derive(Default)]
struct FunctionVars {
    seen: FxHashSet<Name>,
    names: Vec<(Name, Span)>,
}

impl FunctionVars {
    fn collect(body: &Block) -> Vec<(Name, Span)> {
        let mut vars = FunctionVars::default();
        vars.visit_block(body);
        vars.names
    }

    fn add(&mut self, name: &Name, span: Span) {
        if self.seen.insert(name.clone()) {
            self.names.push((name.clone(), span));
        }
    }
}

impl Visitor for FunctionVars {
    fn visit_statement(&mut self, stmt: &Statement) {
        if let Statement::For(ForStatement {
            iterator: Some(iterator),
            span,
            ..
        }) = stmt
        {
            self.add(&Name::Synthetic(*iterator), *span);
        }
        walk_statement(self, stmt);
    }

    fn visit_var_decl(&mut self, decl: &VarDecl) {
        if decl.kind == VarKind::Var {
            if let Some(name) = decl.name() {
                self.add(name, decl.span);
            }
        }
    }

    fn visit_function(&mut self, _func: &FunctionNode) {}
}
