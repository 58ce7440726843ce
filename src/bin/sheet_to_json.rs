//! Convert the first sheet of a spreadsheet (or a CSV file) into the JSON
//! array the translator accepts as a source locale.
//!
//! Usage:
//!   sheet2json strings.xlsx > en.json

use anyhow::{Context, Result};
use locale_translator::{codec, ingest};
use std::path::PathBuf;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_translator=info".parse()?),
        )
        .init();

    let path: PathBuf = std::env::args()
        .nth(1)
        .context("Usage: sheet2json <spreadsheet>")?
        .into();

    let records = ingest::ingest_file(&path)
        .await
        .with_context(|| format!("Failed to ingest {}", path.display()))?;

    let pretty = codec::expand(&ingest::records_to_json(&records))?;
    println!("{}", pretty);

    info!("✓ Converted {} rows from {}", records.len(), path.display());
    Ok(())
}
