//! Two-step translation call chain: fetch a bearer token, then translate.

pub mod client;
pub mod retry;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::core::models::{Command, TranslationResult};
use crate::errors::BotError;

pub use client::MicrosoftTranslator;

/// Issues short-lived access tokens for the translation service.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn acquire_token(&self) -> Result<String, BotError>;
}

/// Performs a single translation with an already acquired token.
#[async_trait]
pub trait TextTranslator: Send + Sync {
    async fn perform_translation(
        &self,
        token: &str,
        text: &str,
        from: Option<&str>,
        to: &str,
    ) -> Result<String, BotError>;
}

/// Sequences token acquisition and translation for one command.
///
/// A fresh token is requested for every call; nothing is cached between
/// commands.
#[derive(Clone)]
pub struct TranslationClient {
    tokens: Arc<dyn TokenProvider>,
    service: Arc<dyn TextTranslator>,
}

impl TranslationClient {
    pub fn new(tokens: Arc<dyn TokenProvider>, service: Arc<dyn TextTranslator>) -> Self {
        Self { tokens, service }
    }

    /// Builds a client whose both steps are served by one HTTP backend.
    pub fn from_backend(backend: Arc<MicrosoftTranslator>) -> Self {
        Self {
            tokens: backend.clone(),
            service: backend,
        }
    }

    /// Translates `command.text`.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::AuthError`] when no token could be obtained, in which
    /// case the translation service is never called, or
    /// [`BotError::TranslationServiceError`] when the translation call fails.
    #[instrument(level = "info", skip(self), fields(from = ?command.from_lang, to = %command.to_lang))]
    pub async fn translate(&self, command: &Command) -> Result<TranslationResult, BotError> {
        let token = self.tokens.acquire_token().await?;

        let translated_text = self
            .service
            .perform_translation(
                &token,
                &command.text,
                command.from_lang.as_deref(),
                &command.to_lang,
            )
            .await?;

        info!("Translation completed ({} chars)", translated_text.chars().count());

        Ok(TranslationResult {
            original_text: command.text.clone(),
            translated_text,
        })
    }
}
