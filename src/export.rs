//! Zip archive export: one `<code>.json` member per language.

use crate::error::{PipelineError, Result};
use crate::i18n::Language;
use std::collections::HashSet;
use std::ffi::OsStr;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Suggested download name. The file is a zip archive despite the suffix;
/// the name is kept for compatibility with existing consumers.
pub const DEFAULT_ARCHIVE_NAME: &str = "locales.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleEntry {
    pub language: Language,
    pub content: String,
}

/// Ordered collection of translated locale files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportBundle {
    entries: Vec<BundleEntry>,
}

impl ExportBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, language: Language, content: String) {
        self.entries.push(BundleEntry { language, content });
    }

    pub fn entries(&self) -> &[BundleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Language, String)> for ExportBundle {
    fn from_iter<I: IntoIterator<Item = (Language, String)>>(iter: I) -> Self {
        let mut bundle = ExportBundle::new();
        for (language, content) in iter {
            bundle.push(language, content);
        }
        bundle
    }
}

/// Build a zip archive with one Deflate member per entry, in bundle order.
///
/// Any failing member aborts the whole archive; a partially written archive is
/// never returned. A language appearing twice is rejected before writing.
pub fn build_bundle(bundle: &ExportBundle) -> Result<Vec<u8>> {
    let mut seen = HashSet::new();
    for entry in bundle.entries() {
        if !seen.insert(entry.language) {
            return Err(PipelineError::ArchiveWrite(format!(
                "duplicate entry {}",
                entry.language.file_name()
            )));
        }
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for entry in bundle.entries() {
        let name = entry.language.file_name();
        writer
            .start_file(name.clone(), options)
            .map_err(|e| PipelineError::ArchiveWrite(format!("failed to add {}: {}", name, e)))?;
        writer
            .write_all(entry.content.as_bytes())
            .map_err(|e| PipelineError::ArchiveWrite(format!("failed to write {}: {}", name, e)))?;
    }

    let archive = writer
        .finish()
        .map_err(|e| PipelineError::ArchiveWrite(format!("failed to finish archive: {}", e)))?
        .into_inner();

    info!(
        "Built archive with {} entries ({} bytes)",
        bundle.len(),
        archive.len()
    );

    Ok(archive)
}

/// Offer the archive to the user by saving it as `dir/filename`.
///
/// `filename` must be a bare file name; anything with a directory component
/// is rejected so the archive always lands directly in `dir`.
pub async fn trigger_download(archive: &[u8], dir: &Path, filename: &str) -> Result<PathBuf> {
    if Path::new(filename).file_name() != Some(OsStr::new(filename)) {
        return Err(PipelineError::ArchiveWrite(format!(
            "invalid archive name '{}'",
            filename
        )));
    }

    let target = dir.join(filename);
    tokio::fs::write(&target, archive).await.map_err(|e| {
        PipelineError::ArchiveWrite(format!("failed to save {}: {}", target.display(), e))
    })?;

    info!("Saved archive to {}", target.display());
    Ok(target)
}
