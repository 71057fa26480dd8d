//! Diagnostic rendering for compile errors
//!
//! Wraps codespan diagnostics with stable error codes, and renders them to a
//! terminal, to a string, or to JSON for editor integration.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, LabelStyle, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tarn_ast::Span;
use termcolor::{Buffer, ColorChoice, StandardStream};

use crate::error::{CompileError, Feature};

/// Error code for a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// A diagnostic message with source code context
pub struct Diagnostic {
    inner: CsDiagnostic<usize>,
    code: Option<ErrorCode>,
    message_key: &'static str,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
            message_key: "",
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Compiler defects are reported as bugs, not as user errors
    pub fn bug(message: impl Into<String>) -> Self {
        Self::new(Severity::Bug, message)
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self.inner = self.inner.with_code(code.0);
        self
    }

    pub fn with_message_key(mut self, key: &'static str) -> Self {
        self.message_key = key;
        self
    }

    /// Add a primary label (main error location)
    pub fn with_primary_label(mut self, file_id: usize, span: Span, message: impl Into<String>) -> Self {
        let label = Label::primary(file_id, span.start..span.end).with_message(message);
        self.inner.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.notes.push(format!("help: {}", help.into()));
        self
    }

    /// Create diagnostic from a CompileError
    pub fn from_compile_error(error: &CompileError, file_id: usize) -> Self {
        match error {
            CompileError::Unsupported { feature, span } => {
                let mut diag = Diagnostic::error(format!("{} are not supported", feature.description()))
                    .with_code(error_code(error))
                    .with_message_key(feature.message_key())
                    .with_primary_label(file_id, *span, "unsupported construct");

                if *feature == Feature::ForOf {
                    diag = diag.with_help("compile with language version ES6 to enable for-of loops");
                }

                diag
            }

            CompileError::TooManyLocals => Diagnostic::error(error.to_string())
                .with_code(error_code(error))
                .with_message_key(error.message_key())
                .with_help("split the function into smaller functions"),

            CompileError::Internal { message, span } => {
                let mut diag = Diagnostic::bug(format!("internal compiler error: {}", message))
                    .with_code(error_code(error))
                    .with_message_key(error.message_key())
                    .with_note("this is a bug in the compiler, not in the compiled program");

                if let Some(span) = span {
                    diag = diag.with_primary_label(file_id, *span, "while compiling this");
                }

                diag
            }
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message_key(&self) -> &'static str {
        self.message_key
    }

    pub fn severity(&self) -> Severity {
        self.inner.severity
    }

    pub fn message(&self) -> &str {
        &self.inner.message
    }

    /// Emit the diagnostic to stderr with colors
    pub fn emit(&self, files: &SimpleFiles<String, String>) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(ColorChoice::Auto);
        let config = term::Config::default();
        term::emit(&mut writer, &config, files, &self.inner)
    }

    /// Render without colors, e.g. for logs and snapshot tests
    pub fn render(&self, files: &SimpleFiles<String, String>) -> Result<String, codespan_reporting::files::Error> {
        let mut buffer = Buffer::no_color();
        let config = term::Config::default();
        term::emit(&mut buffer, &config, files, &self.inner)?;
        Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
    }

    /// Get the underlying codespan diagnostic
    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }

    /// Convert to JSON representation for IDE integration
    pub fn to_json(&self, files: &SimpleFiles<String, String>) -> Result<String, serde_json::Error> {
        let json_diag = JsonDiagnostic::from_diagnostic(self, files);
        serde_json::to_string_pretty(&json_diag)
    }
}

/// JSON representation of a diagnostic
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub code: Option<String>,
    /// Catalog key, e.g. "unsupported.spread"
    pub message_key: String,
    pub severity: String,
    pub message: String,
    pub labels: Vec<JsonLabel>,
    pub notes: Vec<String>,
}

/// JSON representation of a diagnostic label
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    pub file: String,
    /// Start line (1-indexed)
    pub start_line: usize,
    /// Start column (1-indexed)
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub message: Option<String>,
    /// "primary" or "secondary"
    pub style: String,
}

impl JsonDiagnostic {
    pub fn from_diagnostic(diag: &Diagnostic, files: &SimpleFiles<String, String>) -> Self {
        let severity = match diag.inner.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
            Severity::Bug => "bug",
        };

        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let file = files.get(label.file_id).ok()?;
                let start = file.location((), label.range.start).ok()?;
                let end = file.location((), label.range.end).ok()?;

                Some(JsonLabel {
                    file: file.name().to_string(),
                    start_line: start.line_number,
                    start_column: start.column_number,
                    end_line: end.line_number,
                    end_column: end.column_number,
                    message: Some(label.message.clone()),
                    style: match label.style {
                        LabelStyle::Primary => "primary",
                        LabelStyle::Secondary => "secondary",
                    }
                    .to_string(),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.map(|c| c.0.to_string()),
            message_key: diag.message_key.to_string(),
            severity: severity.to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// Get error code for a CompileError
pub fn error_code(error: &CompileError) -> ErrorCode {
    match error {
        CompileError::Unsupported { feature, .. } => match feature {
            Feature::Generator => ErrorCode("E4001"),
            Feature::Yield => ErrorCode("E4002"),
            Feature::Spread => ErrorCode("E4003"),
            Feature::Destructuring => ErrorCode("E4004"),
            Feature::Class => ErrorCode("E4005"),
            Feature::Module => ErrorCode("E4006"),
            Feature::RestParameter => ErrorCode("E4007"),
            Feature::Async => ErrorCode("E4008"),
            Feature::ForOf => ErrorCode("E4009"),
        },
        CompileError::TooManyLocals => ErrorCode("E4010"),
        CompileError::Internal { .. } => ErrorCode("E4999"),
    }
}

/// Helper to create a SimpleFiles instance from source code
pub fn create_files(path: impl Into<PathBuf>, source: impl Into<String>) -> SimpleFiles<String, String> {
    let mut files = SimpleFiles::new();
    files.add(path.into().display().to_string(), source.into());
    files
}
