//! Translation jobs: compress -> translate -> expand, for one language or a
//! batch exported as a single archive.

use crate::client::TranslationClient;
use crate::codec::{self, CompactPayload};
use crate::error::{PipelineError, Result};
use crate::export::{self, ExportBundle};
use crate::i18n::Language;
use crate::validator::StructureValidator;
use serde_json::Value;
use std::str::FromStr;
use tracing::{info, warn};

/// What a batch export does when one language fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Record the failure and continue with the remaining languages
    #[default]
    SkipFailed,
    /// Stop at the first failure; no archive is produced
    Abort,
}

impl FromStr for BatchPolicy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" | "skip-failed" => Ok(BatchPolicy::SkipFailed),
            "abort" => Ok(BatchPolicy::Abort),
            other => Err(PipelineError::MalformedInput(format!(
                "unknown batch policy '{}' (expected 'skip' or 'abort')",
                other
            ))),
        }
    }
}

#[derive(Debug)]
pub struct LanguageFailure {
    pub language: Language,
    pub error: PipelineError,
}

/// Result of a batch export.
///
/// `archive` holds one member per language in `exported`; languages in
/// `failed` are absent from it.
#[derive(Debug)]
pub struct BatchExport {
    pub archive: Vec<u8>,
    pub exported: Vec<Language>,
    pub failed: Vec<LanguageFailure>,
}

impl BatchExport {
    /// True when every requested language made it into the archive.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Translate one locale document into `target` and return it pretty-printed.
pub async fn translate_locale(
    client: &TranslationClient,
    source: &str,
    target: Language,
    extra_prompt: Option<&str>,
) -> Result<String> {
    let payload = codec::compress(source)?;
    let source_tree = codec::expand_tree(payload.as_str())?;
    run_cycle(client, &source_tree, &payload, target, extra_prompt).await
}

/// Translate `source` into every language of `targets` and bundle the results
/// into one archive.
///
/// Languages run one after another. Duplicate targets are collapsed, keeping
/// the first occurrence. See [`BatchPolicy`] for failure handling.
pub async fn export_locales(
    client: &TranslationClient,
    source: &str,
    targets: &[Language],
    extra_prompt: Option<&str>,
    policy: BatchPolicy,
) -> Result<BatchExport> {
    let payload = codec::compress(source)?;
    let source_tree = codec::expand_tree(payload.as_str())?;

    let mut languages: Vec<Language> = Vec::with_capacity(targets.len());
    for target in targets {
        if !languages.contains(target) {
            languages.push(*target);
        }
    }
    if languages.is_empty() {
        return Err(PipelineError::MalformedInput(
            "no target languages requested".to_string(),
        ));
    }

    info!(
        "Exporting locale to {} languages ({:?})",
        languages.len(),
        policy
    );

    let mut bundle = ExportBundle::new();
    let mut failed = Vec::new();

    for language in languages {
        match run_cycle(client, &source_tree, &payload, language, extra_prompt).await {
            Ok(content) => bundle.push(language, content),
            Err(error) => match policy {
                BatchPolicy::Abort => {
                    warn!("Aborting export: {} failed: {}", language.code(), error);
                    return Err(PipelineError::LanguageFailed {
                        language: language.code().to_string(),
                        source: Box::new(error),
                    });
                }
                BatchPolicy::SkipFailed => {
                    warn!("Skipping {}: {}", language.code(), error);
                    failed.push(LanguageFailure { language, error });
                }
            },
        }
    }

    let archive = export::build_bundle(&bundle)?;
    let exported = bundle.entries().iter().map(|entry| entry.language).collect();

    Ok(BatchExport {
        archive,
        exported,
        failed,
    })
}

async fn run_cycle(
    client: &TranslationClient,
    source_tree: &Value,
    payload: &CompactPayload,
    target: Language,
    extra_prompt: Option<&str>,
) -> Result<String> {
    let raw = client.translate(payload, target, extra_prompt).await?;
    let translated_tree = codec::expand_tree(&raw)?;

    let report = StructureValidator::validate(source_tree, &translated_tree);
    if report.has_errors() {
        warn!(
            "Structure errors in {} translation: {:?}",
            target.code(),
            report.errors
        );
    }
    if report.has_warnings() {
        warn!(
            "Structure warnings in {} translation: {:?}",
            target.code(),
            report.warnings
        );
    }

    codec::expand(&raw)
}
