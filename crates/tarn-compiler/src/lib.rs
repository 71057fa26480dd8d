//! Tarn Compiler - Control-Flow Lowering and Lexical Slot Allocation
//!
//! This crate sits between the parser and the bytecode emitter. It rewrites
//! a parsed function into the shape the emitter can translate directly
//! (see [`lower`]), declares the symbols of every block (see [`symbols`]),
//! and provides the lexical context the emitter drives to assign local
//! variable slots (see [`codegen`]).

pub mod codegen;
pub mod diagnostic;
pub mod error;
pub mod lower;
pub mod options;
pub mod symbols;
pub mod unit;

pub use codegen::{
    CallSiteFlags, CodegenContext, ExprKey, LocalVariableEntry, LocalVariableTable, MethodEmitter,
    SharedCallKey, SharedScopeCall,
};
pub use diagnostic::Diagnostic;
pub use error::{CompileError, CompileResult, Feature};
pub use lower::{LowerStats, Lowerer};
pub use options::{CompilerOptions, LanguageVersion};
pub use symbols::collect_symbols;
pub use unit::CompileUnit;

use tarn_ast::FunctionNode;

/// Main compiler entry point
///
/// Owns one compile unit; every function lowered through the same compiler
/// shares its synthetic name space and shared scope call cache.
pub struct Compiler {
    options: CompilerOptions,
    unit: CompileUnit,
    stats: LowerStats,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        let unit = CompileUnit::new(unit_name(&options.source_name));
        Self {
            options,
            unit,
            stats: LowerStats::default(),
        }
    }

    /// Lower a parsed function and declare its symbols
    pub fn lower(&mut self, func: FunctionNode) -> CompileResult<FunctionNode> {
        let mut lowerer = Lowerer::new(&self.options, &mut self.unit);
        let mut lowered = lowerer.lower(func)?;
        self.stats = lowerer.stats();
        collect_symbols(&mut lowered, &mut self.unit);
        Ok(lowered)
    }

    /// Counters of the last [`Compiler::lower`] call
    pub fn stats(&self) -> LowerStats {
        self.stats
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    pub fn unit(&self) -> &CompileUnit {
        &self.unit
    }

    pub fn unit_mut(&mut self) -> &mut CompileUnit {
        &mut self.unit
    }

    /// Lexical context for emitting functions of this unit
    pub fn codegen_context<E: MethodEmitter>(&mut self) -> CodegenContext<'_, E> {
        CodegenContext::new(&mut self.unit)
    }

    /// Close the unit and hand it over
    pub fn finish(mut self) -> CompileUnit {
        self.unit.close();
        self.unit
    }
}

/// Unit name derived from the source name: the file stem, or `Script`
fn unit_name(source_name: &str) -> String {
    let file = source_name.rsplit(['/', '\\']).next().unwrap_or(source_name);
    let stem = file.split('.').next().unwrap_or(file);
    if stem.is_empty() || stem.starts_with('<') {
        "Script".to_string()
    } else {
        stem.to_string()
    }
}
