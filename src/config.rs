use crate::i18n::{Language, LanguageRegistry};
use crate::pipeline::BatchPolicy;
use anyhow::{Context, Result};
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct Config {
    // Translation service
    pub api_url: String,

    // Job
    pub source_file: PathBuf,
    pub target_languages: Vec<Language>,
    pub extra_prompt: Option<String>,

    // Export
    pub output_dir: PathBuf,
    pub archive_name: String,
    pub batch_policy: BatchPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let target_langs = std::env::var("TARGET_LANGS").unwrap_or_else(|_| "zh".to_string());
        let target_languages = Language::parse_list(&target_langs)
            .with_context(|| {
                format!(
                    "Invalid TARGET_LANGS: {} (supported: {})",
                    target_langs,
                    LanguageRegistry::get().supported_codes()
                )
            })?;
        if target_languages.is_empty() {
            anyhow::bail!("TARGET_LANGS must name at least one language");
        }

        let batch_policy = match std::env::var("BATCH_POLICY") {
            Ok(value) => value
                .parse::<BatchPolicy>()
                .with_context(|| format!("Invalid BATCH_POLICY: {}", value))?,
            Err(_) => BatchPolicy::default(),
        };

        Ok(Self {
            // Translation service
            api_url: std::env::var("TRANSLATE_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),

            // Job
            source_file: std::env::var("SOURCE_FILE")
                .context("SOURCE_FILE not set")?
                .into(),
            target_languages,
            extra_prompt: std::env::var("EXTRA_PROMPT")
                .ok()
                .filter(|prompt| !prompt.trim().is_empty()),

            // Export
            output_dir: std::env::var("OUTPUT_DIR")
                .unwrap_or_else(|_| ".".to_string())
                .into(),
            archive_name: std::env::var("ARCHIVE_NAME")
                .unwrap_or_else(|_| crate::export::DEFAULT_ARCHIVE_NAME.to_string()),
            batch_policy,
        })
    }
}
