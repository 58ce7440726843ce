//! Translate a locale file through the translation service.
//!
//! Usage:
//!   locale-translator                    # one target: print the translated locale
//!   locale-translator --archive          # always export a zip archive
//!   locale-translator --server-export    # let the service build the bundle
//!
//! Required environment variables:
//! - SOURCE_FILE (.json, .xlsx/.xls/.ods, or .csv)
//!
//! Optional:
//! - TRANSLATE_API_URL (defaults to http://localhost:3000)
//! - TARGET_LANGS (defaults to zh)
//! - EXTRA_PROMPT
//! - OUTPUT_DIR (defaults to .)
//! - ARCHIVE_NAME (defaults to locales.json)
//! - BATCH_POLICY (skip or abort, defaults to skip)

use anyhow::{Context, Result};
use locale_translator::client::TranslationClient;
use locale_translator::{codec, config, export, ingest, pipeline};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_translator=info".parse()?),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let force_archive = args.iter().any(|arg| arg == "--archive");
    let server_export = args.iter().any(|arg| arg == "--server-export");

    // Load configuration from environment
    let config = config::Config::from_env()?;

    // Step 1: Load the source locale (spreadsheets become a JSON array of rows)
    info!("Loading source locale from {}", config.source_file.display());
    let source = ingest::load_source(&config.source_file)
        .await
        .with_context(|| format!("Failed to load {}", config.source_file.display()))?;

    let client = TranslationClient::new(&config);
    let extra_prompt = config.extra_prompt.as_deref();

    if server_export {
        let payload = codec::compress(&source).context("Source locale is not valid JSON")?;
        let reference = client
            .export_local_files(&payload, &config.target_languages)
            .await
            .context("Server-side export failed")?;
        println!("{}", serde_json::to_string_pretty(&reference)?);
        return Ok(());
    }

    // Step 2: Single language, print the result
    if let [target] = config.target_languages.as_slice() {
        if !force_archive {
            info!(
                "Translating to {} / {} ({})",
                target.name(),
                target.native_name(),
                target.code()
            );
            let translated = pipeline::translate_locale(&client, &source, *target, extra_prompt)
                .await
                .with_context(|| format!("Translation to {} failed", target.code()))?;
            println!("{}", translated);
            return Ok(());
        }
    }

    // Step 3: Batch export into one archive
    let batch = pipeline::export_locales(
        &client,
        &source,
        &config.target_languages,
        extra_prompt,
        config.batch_policy,
    )
    .await
    .context("Batch export failed")?;

    for failure in &batch.failed {
        warn!("{} was not exported: {}", failure.language.code(), failure.error);
    }

    if batch.exported.is_empty() {
        anyhow::bail!("No language could be translated; archive not written");
    }

    let saved = export::trigger_download(&batch.archive, &config.output_dir, &config.archive_name)
        .await
        .context("Failed to save archive")?;

    info!(
        "✓ Exported {} of {} languages to {}",
        batch.exported.len(),
        batch.exported.len() + batch.failed.len(),
        saved.display()
    );

    Ok(())
}
