//! Target language support.
//!
//! - `registry`: the fixed list of language codes the translation service accepts
//! - `language`: `Language`, a code validated against the registry
//!
//! # Example
//!
//! ```rust,ignore
//! use locale_translator::i18n::{Language, LanguageRegistry};
//!
//! let french = Language::from_code("fr")?;
//! let targets = Language::parse_list("en,ja,ko")?;
//! let supported = LanguageRegistry::get().supported_codes();
//! ```

mod language;
mod registry;

pub use language::Language;
pub use registry::{LanguageConfig, LanguageRegistry};
