//! Language registry: single source of truth for the target languages the
//! translation service accepts.
//!
//! The list is fixed at build time and initialized once on first access.

use std::sync::OnceLock;

/// Configuration for a supported target language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Language code sent as `targetLang` (e.g. "en", "zh-TW")
    pub code: &'static str,

    /// English name of the language (e.g. "French")
    pub name: &'static str,

    /// Native name of the language (e.g. "Français")
    pub native_name: &'static str,
}

/// Global language registry singleton.
///
/// Immutable after initialization, so it is the only process-wide value the
/// pipeline shares between jobs.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the language exists
    /// * `None` if the language is not found
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Supported codes in registry order, comma-separated (for error messages).
    pub fn supported_codes(&self) -> String {
        self.languages
            .iter()
            .map(|lang| lang.code)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn language(code: &'static str, name: &'static str, native_name: &'static str) -> LanguageConfig {
    LanguageConfig {
        code,
        name,
        native_name,
    }
}

/// Default language configurations.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        language("en", "English", "English"),
        language("zh", "Chinese (Simplified)", "简体中文"),
        language("zh-TW", "Chinese (Traditional)", "繁體中文"),
        language("ja", "Japanese", "日本語"),
        language("ko", "Korean", "한국어"),
        language("fr", "French", "Français"),
        language("de", "German", "Deutsch"),
        language("es", "Spanish", "Español"),
        language("it", "Italian", "Italiano"),
        language("pt", "Portuguese", "Português"),
        language("ru", "Russian", "Русский"),
        language("ar", "Arabic", "العربية"),
        language("hi", "Hindi", "हिन्दी"),
        language("vi", "Vietnamese", "Tiếng Việt"),
        language("th", "Thai", "ไทย"),
        language("id", "Indonesian", "Bahasa Indonesia"),
        language("tr", "Turkish", "Türkçe"),
        language("nl", "Dutch", "Nederlands"),
        language("pl", "Polish", "Polski"),
    ]
}
