//! Async client for the OpenTyphoon chat-completions endpoint

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{ChatCompletionRequest, ChatMessage, TranslationRequest, TranslationResult};

/// Issues one translation request per call and interprets the response
#[derive(Debug, Clone)]
pub struct TranslationRequestManager {
    client: reqwest::Client,
    config: Arc<TranslatorConfig>,
}

impl TranslationRequestManager {
    /// Create a new manager
    pub fn new(config: TranslatorConfig) -> Result<Self> {
        config.validate()?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .build()
            .map_err(|e| TranslationError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translate a single request.
    ///
    /// Empty input and a missing credential are rejected before any network
    /// I/O. Exactly one HTTP request is sent otherwise; there is no retry.
    pub async fn translate(
        &self,
        request: &TranslationRequest,
        credential: &str,
    ) -> Result<TranslationResult> {
        let source_text = request.source_text.trim();
        if source_text.is_empty() {
            return Err(TranslationError::EmptyInput);
        }

        let credential = credential.trim();
        if credential.is_empty() {
            return Err(TranslationError::MissingCredential);
        }

        let body = self.build_body(source_text, request);
        debug!(
            "Sending {} chars ({}) to {}",
            source_text.chars().count(),
            request.direction,
            self.config.api_endpoint
        );

        let response = self
            .client
            .post(&self.config.api_endpoint)
            .header("Authorization", format!("Bearer {}", credential))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("Translation request could not be sent: {}", e.without_url());
                TranslationError::RequestFailed { status_code: None }
            })?;

        let status = response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let error_text = response.text().await.unwrap_or_default();
            warn!("Translation endpoint returned HTTP {}", status_code);
            debug!("Error body: {}", error_text);
            return Err(TranslationError::RequestFailed {
                status_code: Some(status_code),
            });
        }

        // A body cut off mid-read is a transport failure, not an HTTP status.
        let text = response.text().await.map_err(|e| {
            warn!("Failed to read response body: {}", e.without_url());
            TranslationError::RequestFailed { status_code: None }
        })?;

        let json: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| TranslationError::MalformedResponse {
                reason: format!("body is not JSON: {}", e),
            })?;

        let translated_text = extract_translation(&json)?;
        info!(
            "Translated {} chars ({})",
            source_text.chars().count(),
            request.direction
        );

        Ok(TranslationResult { translated_text })
    }

    /// Chat-completions body for a request
    fn build_body(&self, source_text: &str, request: &TranslationRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.direction.system_instruction().to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: source_text.to_string(),
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }
}

/// Read `choices[0].message.content` from a completions response
fn extract_translation(json: &serde_json::Value) -> Result<String> {
    let content = json["choices"]
        .get(0)
        .and_then(|c| c["message"]["content"].as_str())
        .ok_or_else(|| TranslationError::MalformedResponse {
            reason: "No translation in response".to_string(),
        })?
        .trim();

    if content.is_empty() {
        return Err(TranslationError::MalformedResponse {
            reason: "Empty translation in response".to_string(),
        });
    }

    Ok(content.to_string())
}
