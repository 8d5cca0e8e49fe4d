//! Content translation server provider
//!
//! Sends section HTML to a content translation server, which forwards it to
//! the MT engine named in the request path (MinT, Google, Apertium, ...) and
//! returns translated HTML with the markup preserved.
//!
//! # Configuration
//!
//! The base URL is read from the `CX_SERVER_URL` environment variable, e.g.
//! `https://cxserver.wikimedia.org`.

use crate::error::{MtError, MtResult};
use crate::translator::{MachineTranslator, normalize_locale, validate_locale};
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

#[derive(Clone)]
pub struct CxServerProvider {
    /// Engine name as known by the server
    provider: String,
    client: reqwest::Client,
    base_url: String,
}

impl CxServerProvider {
    /// Maximum HTML size accepted in one request
    const MAX_HTML_BYTES: usize = 100_000;

    pub fn new(base_url: &str, provider: &str) -> MtResult<Self> {
        if base_url.trim().is_empty() {
            return Err(MtError::ConfigError("Server URL cannot be empty".to_string()));
        }
        if provider.trim().is_empty() || provider == "source" {
            return Err(MtError::ConfigError(format!(
                "Not a machine translation provider: {:?}",
                provider
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            provider: provider.to_string(),
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a provider using the `CX_SERVER_URL` environment variable
    pub fn from_env(provider: &str) -> MtResult<Self> {
        let base_url = std::env::var("CX_SERVER_URL").map_err(|_| {
            MtError::ConfigError("CX_SERVER_URL environment variable not set".to_string())
        })?;
        Self::new(&base_url, provider)
    }

    fn url(&self, source_locale: &str, target_locale: &str) -> String {
        format!(
            "{}/v2/translate/{}/{}/{}",
            self.base_url,
            normalize_locale(source_locale),
            normalize_locale(target_locale),
            self.provider
        )
    }
}

#[async_trait]
impl MachineTranslator for CxServerProvider {
    async fn translate(
        &self,
        html: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        validate_locale(source_locale)?;
        validate_locale(target_locale)?;
        if html.len() > Self::MAX_HTML_BYTES {
            return Err(MtError::TranslationError(format!(
                "Content of {} bytes exceeds the {} byte limit",
                html.len(),
                Self::MAX_HTML_BYTES
            )));
        }
        if html.trim().is_empty() {
            return Ok(String::new());
        }

        let url = self.url(source_locale, target_locale);
        debug!(%url, bytes = html.len(), "Requesting machine translation");
        let response = self.client.post(&url).json(&json!({ "html": html })).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(if status.is_client_error() {
                MtError::ConfigError(format!("Server client error ({}): {}", status, error_text))
            } else {
                MtError::TranslationError(format!("Server error ({}): {}", status, error_text))
            });
        }

        let json: serde_json::Value = response.json().await.map_err(|e| {
            MtError::TranslationError(format!("Failed to parse server response: {}", e))
        })?;

        json["contents"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                MtError::TranslationError("Invalid server response: missing 'contents'".to_string())
            })
    }

    fn provider_id(&self) -> &str {
        &self.provider
    }
}
