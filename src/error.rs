use thiserror::Error;

/// Errors surfaced by the translation pipeline.
///
/// Every variant is reported to the caller as-is; nothing in the library
/// retries on its own.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFileFormat(String),

    #[error("Unsupported language code: '{0}'")]
    UnsupportedLanguage(String),

    #[error("Translation service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Translation service error: {message}")]
    TranslationService { message: String },

    #[error("Failed to write archive: {0}")]
    ArchiveWrite(String),

    #[error("Translation to '{language}' failed: {source}")]
    LanguageFailed {
        language: String,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
