//! Compiler configuration

use serde::{Deserialize, Serialize};

/// Language version the input was parsed as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageVersion {
    #[default]
    Es5,
    Es6,
}

impl LanguageVersion {
    /// `let` and `const` are block scoped
    pub fn has_block_scope(self) -> bool {
        self == LanguageVersion::Es6
    }

    pub fn has_for_of(self) -> bool {
        self == LanguageVersion::Es6
    }
}

/// Options shared by every function of a compile unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Compile all code as strict mode
    pub strict: bool,
    pub language: LanguageVersion,
    /// Name of the compiled source, used in eval location strings
    pub source_name: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            strict: false,
            language: LanguageVersion::default(),
            source_name: "<script>".to_string(),
        }
    }
}

impl CompilerOptions {
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_language(mut self, language: LanguageVersion) -> Self {
        self.language = language;
        self
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }
}
