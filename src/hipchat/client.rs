//! HipChat room notification client.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{error, info};
use url::Url;

use crate::core::models::{ChatPayload, ClientInfo};
use crate::errors::BotError;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Posts messages into a room on behalf of an installation.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(
        &self,
        client_info: &ClientInfo,
        room_id: u64,
        payload: &ChatPayload,
    ) -> Result<(), BotError>;
}

/// [`Messenger`] backed by the HipChat v2 REST API.
#[derive(Clone, Default)]
pub struct HipChatClient;

impl HipChatClient {
    pub fn new() -> Self {
        Self
    }
}

/// `<api_url>room/<room_id>/notification`, tolerating a missing trailing slash.
///
/// # Errors
///
/// Returns [`BotError::DeliveryError`] when `api_url` is not a valid URL.
pub fn notification_url(api_url: &str, room_id: u64) -> Result<Url, BotError> {
    let base = if api_url.ends_with('/') {
        api_url.to_string()
    } else {
        format!("{api_url}/")
    };

    Url::parse(&base)
        .and_then(|u| u.join(&format!("room/{room_id}/notification")))
        .with_context(|| format!("invalid api_url '{api_url}'"))
        .map_err(|e| BotError::DeliveryError(format!("{e:#}")))
}

/// JSON body of a room notification.
#[must_use]
pub fn notification_body(payload: &ChatPayload) -> Value {
    let mut body = json!({
        "message": payload.message,
        "color": payload.color,
        "message_format": "html",
        "notify": false,
    });
    if let Some(card) = &payload.card {
        body["card"] = json!(card);
    }
    body
}

#[async_trait]
impl Messenger for HipChatClient {
    async fn send_message(
        &self,
        client_info: &ClientInfo,
        room_id: u64,
        payload: &ChatPayload,
    ) -> Result<(), BotError> {
        let token = client_info.access_token.as_deref().ok_or_else(|| {
            BotError::DeliveryError(format!(
                "no access token for client {}",
                client_info.client_key
            ))
        })?;
        let url = notification_url(&client_info.api_url, room_id)?;

        let resp = HTTP_CLIENT
            .post(url)
            .bearer_auth(token)
            .json(&notification_body(payload))
            .send()
            .await
            .map_err(|e| BotError::DeliveryError(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            error!(
                "Room notification failed: status={} body={}",
                status, body_text
            );
            return Err(BotError::DeliveryError(format!(
                "room {} returned {}",
                room_id, status
            )));
        }

        info!("Posted {:?} notification to room {}", payload.color, room_id);
        Ok(())
    }
}
