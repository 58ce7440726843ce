//! Locale translation pipeline.
//!
//! A JSON locale (or the first sheet of a spreadsheet) is compressed into a
//! compact payload, translated by a remote service and expanded back into a
//! pretty-printed locale file. Batches of languages are exported as one zip
//! archive.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod export;
pub mod i18n;
pub mod ingest;
pub mod pipeline;
pub mod validator;

pub use error::{PipelineError, Result};
