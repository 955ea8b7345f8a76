//! Per-event orchestration: parse, translate, format, deliver.

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::command_parser::{ParseResult, parse};
use crate::core::models::{ChatPayload, ClientInfo, Color, TranslationResult, WebhookEvent};
use crate::errors::BotError;
use crate::hipchat::Messenger;
use crate::hipchat::response_builder::{
    format_installed_notice, format_link_card, format_service_failure, format_success,
    format_usage_error,
};
use crate::store::InstallationStore;
use crate::translator::TranslationClient;

/// Which branch a webhook event took, and whether its message reached the room.
#[derive(Debug)]
pub enum WebhookOutcome {
    Usage {
        delivered: bool,
    },
    Translated {
        result: TranslationResult,
        delivered: bool,
    },
    /// Translation failed. `notified` is true only when a failure notice was
    /// delivered, which requires `notify_on_failure`.
    Failed {
        error: BotError,
        notified: bool,
    },
}

impl WebhookOutcome {
    /// Color of the message that was (or would have been) posted, if any.
    pub fn color(&self) -> Option<Color> {
        match self {
            WebhookOutcome::Usage { .. } => Some(Color::Red),
            WebhookOutcome::Translated { .. } => Some(Color::Green),
            WebhookOutcome::Failed { notified: true, .. } => Some(Color::Yellow),
            WebhookOutcome::Failed { .. } => None,
        }
    }
}

pub struct TranslateBot {
    translator: TranslationClient,
    messenger: Arc<dyn Messenger>,
    store: Arc<dyn InstallationStore>,
    addon_name: String,
    notify_on_failure: bool,
}

impl TranslateBot {
    pub fn new(
        translator: TranslationClient,
        messenger: Arc<dyn Messenger>,
        store: Arc<dyn InstallationStore>,
        addon_name: impl Into<String>,
    ) -> Self {
        Self {
            translator,
            messenger,
            store,
            addon_name: addon_name.into(),
            notify_on_failure: false,
        }
    }

    /// Post a yellow notice to the room when translation fails instead of only logging it.
    #[must_use]
    pub fn with_notify_on_failure(mut self, enabled: bool) -> Self {
        self.notify_on_failure = enabled;
        self
    }

    pub fn store(&self) -> &Arc<dyn InstallationStore> {
        &self.store
    }

    /// Handles one `/translate` room message.
    ///
    /// Never fails: translation errors are logged (and optionally reported to
    /// the room) and delivery errors are logged.
    #[instrument(level = "info", skip(self, event), fields(room_id = event.room_id))]
    pub async fn handle_webhook_event(&self, event: &WebhookEvent) -> WebhookOutcome {
        let command = match parse(&event.message) {
            ParseResult::UsageError => {
                info!("Bare command, replying with usage");
                return self.reply_usage(event).await;
            }
            ParseResult::Command(command) if command.text.trim().is_empty() => {
                info!("Command has no text to translate, replying with usage");
                return self.reply_usage(event).await;
            }
            ParseResult::Command(command) => command,
        };

        match self.translator.translate(&command).await {
            Ok(result) => {
                let payload = format_success(&result.original_text, &result.translated_text);
                let delivered = self.deliver(event, &payload).await;
                WebhookOutcome::Translated { result, delivered }
            }
            Err(e) => {
                error!("Translation failed: {}", e);
                let notified = if self.notify_on_failure {
                    self.deliver(event, &format_service_failure(&e)).await
                } else {
                    false
                };
                WebhookOutcome::Failed { error: e, notified }
            }
        }
    }

    /// Records a new installation and announces it in the room.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the installation cannot be saved. A failed
    /// announcement is only logged.
    pub async fn handle_installed(
        &self,
        client_info: ClientInfo,
        room_id: Option<u64>,
    ) -> Result<(), BotError> {
        info!("Add-on installed for client {}", client_info.client_key);
        self.store.save_client(client_info.clone()).await?;

        if let Some(room_id) = room_id {
            let payload = format_installed_notice(&self.addon_name);
            self.deliver_to(&client_info, room_id, &payload).await;
        }
        Ok(())
    }

    /// Drops every stored record of `client_key`.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub async fn handle_uninstalled(&self, client_key: &str) -> Result<usize, BotError> {
        let removed = self.store.remove_client(client_key).await?;
        info!("Add-on uninstalled for client {} ({} keys removed)", client_key, removed);
        Ok(removed)
    }

    /// Posts a yellow link card titled `title`.
    pub async fn send_card(&self, client_info: &ClientInfo, room_id: u64, title: &str) -> bool {
        self.deliver_to(client_info, room_id, &format_link_card(title))
            .await
    }

    async fn reply_usage(&self, event: &WebhookEvent) -> WebhookOutcome {
        let delivered = self.deliver(event, &format_usage_error()).await;
        WebhookOutcome::Usage { delivered }
    }

    async fn deliver(&self, event: &WebhookEvent, payload: &ChatPayload) -> bool {
        self.deliver_to(&event.client_info, event.room_id, payload)
            .await
    }

    async fn deliver_to(&self, client_info: &ClientInfo, room_id: u64, payload: &ChatPayload) -> bool {
        match self
            .messenger
            .send_message(client_info, room_id, payload)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                error!("Delivery to room {} failed: {}", room_id, e);
                false
            }
        }
    }
}
