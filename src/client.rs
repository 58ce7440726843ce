//! Client for the remote translation service.
//!
//! Requests carry the compact payload verbatim. No retries and no internal
//! timeout: a failed call is reported once and the caller decides what to do.

use crate::codec::CompactPayload;
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::i18n::Language;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

const TRANSLATE_PATH: &str = "/api/fastTranslate";
const EXPORT_PATH: &str = "/api/exportLocalFiles";

/// Request body for `/api/fastTranslate`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslationRequest<'a> {
    content: &'a str,
    target_lang: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra_prompt: Option<&'a str>,
}

/// Request body for `/api/exportLocalFiles`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportRequest<'a> {
    content: &'a str,
    lang_list: Vec<&'a str>,
}

/// Response envelope shared by both endpoints
#[derive(Debug, Deserialize)]
struct ServiceResponse {
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

impl ServiceResponse {
    /// Turn the envelope into its payload, or the service-reported failure.
    fn into_data(self) -> Result<Value> {
        if !self.success {
            return Err(PipelineError::TranslationService {
                message: self
                    .message
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        match self.data {
            Some(Value::Null) | None => Err(PipelineError::TranslationService {
                message: "translation service returned no data".to_string(),
            }),
            Some(data) => Ok(data),
        }
    }
}

pub struct TranslationClient {
    http: reqwest::Client,
    base_url: String,
}

impl TranslationClient {
    pub fn new(config: &Config) -> Self {
        Self::with_client(reqwest::Client::new(), &config.api_url)
    }

    /// Build a client around an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Translate a compact payload into `target`.
    ///
    /// Returns the service's translated content verbatim, ready for
    /// `codec::expand`. A blank `extra_prompt` is not sent.
    pub async fn translate(
        &self,
        payload: &CompactPayload,
        target: Language,
        extra_prompt: Option<&str>,
    ) -> Result<String> {
        let request = TranslationRequest {
            content: payload.as_str(),
            target_lang: target.code(),
            extra_prompt: extra_prompt.filter(|p| !p.trim().is_empty()),
        };

        info!(
            "Requesting translation to {} ({}), {} bytes",
            target.name(),
            target.code(),
            payload.len()
        );

        let data = self.post(TRANSLATE_PATH, &request).await?;

        let translated = match data {
            Value::String(text) => text,
            // Some deployments return the tree itself instead of a string
            other => other.to_string(),
        };

        debug!(
            "Received {} bytes of translated content for {}",
            translated.len(),
            target.code()
        );

        Ok(translated)
    }

    /// Ask the service to build its own export bundle for `languages`.
    ///
    /// Returns the server-produced bundle reference untouched.
    pub async fn export_local_files(
        &self,
        payload: &CompactPayload,
        languages: &[Language],
    ) -> Result<Value> {
        let request = ExportRequest {
            content: payload.as_str(),
            lang_list: languages.iter().map(|l| l.code()).collect(),
        };

        info!(
            "Requesting server-side export for {} languages",
            languages.len()
        );

        self.post(EXPORT_PATH, &request).await
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                PipelineError::ServiceUnavailable(format!("request to {} failed: {}", url, e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            PipelineError::ServiceUnavailable(format!("failed to read response body: {}", e))
        })?;

        let envelope: ServiceResponse = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(PipelineError::ServiceUnavailable(format!(
                    "{} returned {}: {}",
                    path, status, body
                )));
            }
            Err(e) => {
                return Err(PipelineError::ServiceUnavailable(format!(
                    "unparseable response from {}: {}",
                    path, e
                )));
            }
        };

        envelope.into_data()
    }
}
