//! HTTP backend for the Microsoft Translator token and Ajax endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info, warn};

use super::retry::with_retry;
use super::{TextTranslator, TokenProvider};
use crate::core::config::TranslatorConfig;
use crate::errors::BotError;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Talks to the credential service and the translation service over HTTP.
pub struct MicrosoftTranslator {
    http: Client,
    config: TranslatorConfig,
}

impl MicrosoftTranslator {
    /// # Errors
    ///
    /// Returns [`BotError::ConfigError`] if the HTTP client cannot be built.
    pub fn new(config: TranslatorConfig) -> Result<Self, BotError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| BotError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    async fn request_token(&self) -> Result<String, BotError> {
        let form = [
            ("scope", self.config.scope.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("grant_type", "client_credentials"),
        ];

        let body = self
            .http
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| BotError::AuthError(e.to_string()))?
            .text()
            .await
            .map_err(|e| BotError::AuthError(e.to_string()))?;

        parse_token_body(&body)
    }

    async fn request_translation(
        &self,
        token: &str,
        text: &str,
        from: Option<&str>,
        to: &str,
    ) -> Result<String, BotError> {
        let mut query = vec![("text", text), ("to", to)];
        if let Some(from) = from {
            query.push(("from", from));
        }

        let resp = self
            .http
            .get(&self.config.translate_url)
            .query(&query)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| BotError::TranslationServiceError(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| BotError::TranslationServiceError(e.to_string()))?;

        if !status.is_success() {
            error!("Translate request failed: status={} body={}", status, body);
            return Err(BotError::TranslationServiceError(format!(
                "translator returned {}",
                status
            )));
        }

        info!("In translate: {}", body);
        Ok(decode_translation_body(&body))
    }
}

#[async_trait]
impl TokenProvider for MicrosoftTranslator {
    async fn acquire_token(&self) -> Result<String, BotError> {
        with_retry(self.config.retry, || async {
            self.request_token().await.map_err(|e| {
                warn!("Token request attempt failed: {}", e);
                e
            })
        })
        .await
    }
}

#[async_trait]
impl TextTranslator for MicrosoftTranslator {
    async fn perform_translation(
        &self,
        token: &str,
        text: &str,
        from: Option<&str>,
        to: &str,
    ) -> Result<String, BotError> {
        with_retry(self.config.retry, || async {
            self.request_translation(token, text, from, to)
                .await
                .map_err(|e| {
                    warn!("Translate attempt failed: {}", e);
                    e
                })
        })
        .await
    }
}

/// Extracts `access_token` from the credential service's JSON reply.
///
/// # Errors
///
/// Returns [`BotError::AuthError`] when the body is not JSON or lacks the field.
pub fn parse_token_body(body: &str) -> Result<String, BotError> {
    serde_json::from_str::<TokenResponse>(body)
        .map(|t| t.access_token)
        .map_err(|e| BotError::AuthError(format!("Unparsable token response: {}", e)))
}

/// The Ajax endpoint answers with a JSON string literal, sometimes behind a BOM.
/// Anything that is not a JSON string is passed through trimmed.
pub fn decode_translation_body(body: &str) -> String {
    let trimmed = body.trim_start_matches('\u{feff}').trim();
    serde_json::from_str::<String>(trimmed).unwrap_or_else(|_| trimmed.to_string())
}
