//! Compilation errors

use std::fmt;

use tarn_ast::Span;
use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

/// Language constructs the lowering pass refuses to compile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Generator,
    Yield,
    Spread,
    Destructuring,
    Class,
    Module,
    RestParameter,
    Async,
    ForOf,
}

impl Feature {
    /// Stable key used by message catalogs
    pub fn message_key(self) -> &'static str {
        match self {
            Feature::Generator => "unsupported.generator",
            Feature::Yield => "unsupported.yield",
            Feature::Spread => "unsupported.spread",
            Feature::Destructuring => "unsupported.destructuring",
            Feature::Class => "unsupported.class",
            Feature::Module => "unsupported.module",
            Feature::RestParameter => "unsupported.rest",
            Feature::Async => "unsupported.async",
            Feature::ForOf => "unsupported.for_of",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Feature::Generator => "generator functions",
            Feature::Yield => "yield expressions",
            Feature::Spread => "spread arguments",
            Feature::Destructuring => "destructuring patterns",
            Feature::Class => "class declarations",
            Feature::Module => "import and export declarations",
            Feature::RestParameter => "rest parameters",
            Feature::Async => "async functions",
            Feature::ForOf => "for-of loops before ES6",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CompileError {
    #[error("Unsupported feature: {feature}")]
    Unsupported { feature: Feature, span: Span },

    #[error("Too many local variables (max 65535)")]
    TooManyLocals,

    #[error("Internal compiler error: {message}")]
    Internal { message: String, span: Option<Span> },
}

impl CompileError {
    pub fn unsupported(feature: Feature, span: Span) -> Self {
        CompileError::Unsupported { feature, span }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CompileError::Internal {
            message: message.into(),
            span: None,
        }
    }

    pub fn internal_at(message: impl Into<String>, span: Span) -> Self {
        CompileError::Internal {
            message: message.into(),
            span: Some(span),
        }
    }

    pub fn message_key(&self) -> &'static str {
        match self {
            CompileError::Unsupported { feature, .. } => feature.message_key(),
            CompileError::TooManyLocals => "limit.locals",
            CompileError::Internal { .. } => "internal.error",
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Unsupported { span, .. } => Some(*span),
            CompileError::TooManyLocals => None,
            CompileError::Internal { span, .. } => *span,
        }
    }

    /// `(message_key, line, column)` of the offending construct; internal
    /// errors without a position report line and column 0
    pub fn location(&self) -> (&'static str, u32, u32) {
        let (line, column) = self.span().map_or((0, 0), |span| (span.line, span.column));
        (self.message_key(), line, column)
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, CompileError::Internal { .. })
    }
}
