//! Language type: a target language validated against the registry.

use crate::error::{PipelineError, Result};
use crate::i18n::{LanguageConfig, LanguageRegistry};
use std::fmt;

/// A validated target language.
///
/// Only codes present in the registry can be constructed, so a
/// `Language` can be dispatched to the service without further checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };

    pub const CHINESE: Language = Language { code: "zh" };

    /// Create a Language from a language code string.
    ///
    /// Surrounding whitespace is ignored; the code itself is case-sensitive.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is in the registry
    /// * `Err(PipelineError::UnsupportedLanguage)` otherwise
    pub fn from_code(code: &str) -> Result<Language> {
        let code = code.trim();

        LanguageRegistry::get()
            .get_by_code(code)
            .map(|config| Language { code: config.code })
            .ok_or_else(|| PipelineError::UnsupportedLanguage(code.to_string()))
    }

    /// Parse a comma-separated list of codes (e.g. "en, fr,ja").
    ///
    /// Empty items are skipped; the first unsupported code fails the whole list.
    pub fn parse_list(codes: &str) -> Result<Vec<Language>> {
        codes
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(Language::from_code)
            .collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is missing from the registry, which cannot happen for
    /// a `Language` built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// English name of the language (e.g. "French").
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Native name of the language (e.g. "Français").
    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    /// Archive member name for this language's locale file.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.code)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}
