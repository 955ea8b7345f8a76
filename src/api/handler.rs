//! API Lambda handler - thin router that delegates to the bot.
//!
//! Routes:
//! - `GET  /healthcheck`
//! - `GET  /` and `GET /atlassian-connect.json` (capabilities descriptor)
//! - `POST /installable` (new installs; re-installs need the client's JWT)
//! - `DELETE /installable/{oauth_id}` (JWT issued to `oauth_id`)
//! - `POST /webhook` (`/translate` room messages, JWT)
//! - `POST /send_notification` (link card, JWT)

use std::sync::Arc;

use lambda_runtime::{Error, LambdaEvent};
use once_cell::sync::OnceCell;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use super::parsing::{
    InstallablePayload, NotificationRequest, RoomMessageWebhook, parse_json_body, request_method,
    request_path,
};
use super::{helpers, signature};
use crate::bot::TranslateBot;
use crate::core::config::AppConfig;
use crate::core::models::{ClientInfo, WebhookEvent};
use crate::errors::BotError;
use crate::hipchat::HipChatClient;
use crate::hipchat::descriptor::build_descriptor;
use crate::store::MemoryInstallationStore;
use crate::translator::{MicrosoftTranslator, TranslationClient};

pub use self::function_handler as handler;

static STATE: OnceCell<Arc<AppState>> = OnceCell::new();

/// Who sent a signed request: installation and room.
#[derive(Debug, Default, Clone)]
struct Identity {
    client_key: Option<String>,
    room_id: Option<u64>,
}

/// Long-lived pieces shared by every invocation of a warm Lambda.
pub struct AppState {
    pub config: AppConfig,
    pub bot: Arc<TranslateBot>,
    /// Installation used when a request names no client the store knows.
    pub default_client: Option<ClientInfo>,
}

impl AppState {
    /// # Errors
    ///
    /// Returns [`BotError::ConfigError`] if the translator backend cannot be built.
    pub fn from_config(config: AppConfig) -> Result<Self, BotError> {
        let backend = Arc::new(MicrosoftTranslator::new(config.translator.clone())?);
        let bot = TranslateBot::new(
            TranslationClient::from_backend(backend),
            Arc::new(HipChatClient::new()),
            Arc::new(MemoryInstallationStore::new()),
            config.addon_name.clone(),
        )
        .with_notify_on_failure(config.notify_on_failure);

        let default_client = config.hipchat_api_url.as_ref().map(|api_url| ClientInfo {
            client_key: "default".to_string(),
            group_id: None,
            room_id: None,
            api_url: api_url.clone(),
            access_token: config.hipchat_room_token.clone(),
        });

        Ok(Self::new(config, Arc::new(bot), default_client))
    }

    pub fn new(config: AppConfig, bot: Arc<TranslateBot>, default_client: Option<ClientInfo>) -> Self {
        Self {
            config,
            bot,
            default_client,
        }
    }

    async fn resolve_client(&self, client_key: Option<&str>) -> Option<ClientInfo> {
        if let Some(key) = client_key {
            match self.bot.store().get_client(key).await {
                Ok(Some(info)) => return Some(info),
                Ok(None) => {}
                Err(e) => error!("Installation lookup failed for {}: {}", key, e),
            }
        }
        self.default_client.clone()
    }
}

/// Lambda handler for the API entrypoint.
///
/// # Errors
///
/// Fails only when configuration cannot be loaded; every request-level problem
/// becomes an error response.
#[tracing::instrument(level = "info", skip(event))]
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let state = STATE
        .get_or_try_init(|| {
            let config = AppConfig::from_env()?;
            AppState::from_config(config)
                .map(Arc::new)
                .map_err(|e| e.to_string())
        })
        .map_err(|e| {
            error!("Config error: {}", e);
            Error::from(e)
        })?
        .clone();

    Ok(route(&state, &event.payload).await)
}

/// Dispatches one API Gateway request.
pub async fn route(state: &Arc<AppState>, payload: &Value) -> Value {
    let method = request_method(payload).to_ascii_uppercase();
    let path = request_path(payload).unwrap_or("/").trim_end_matches('/');
    info!(method = %method, raw_path = %path, "Request received");

    match (method.as_str(), path) {
        ("GET", "/healthcheck") => helpers::ok_text("OK"),
        ("GET", "") => helpers::redirect("/atlassian-connect.json"),
        ("GET", "/atlassian-connect.json") => helpers::ok_json(&build_descriptor(
            &state.config.addon_name,
            &state.config.addon_base_url,
        )),
        ("POST", "/installable") => handle_installable(state, payload).await,
        ("DELETE", p) if p.starts_with("/installable/") => {
            let oauth_id = p.trim_start_matches("/installable/");
            match authenticate(state, payload) {
                Ok(identity) => handle_uninstall(state, oauth_id, identity).await,
                Err(response) => response,
            }
        }
        ("POST", "/webhook") => match authenticate(state, payload) {
            Ok(identity) => handle_webhook(state, payload, identity).await,
            Err(response) => response,
        },
        ("POST", "/send_notification") => match authenticate(state, payload) {
            Ok(identity) => handle_send_notification(state, payload, identity).await,
            Err(response) => response,
        },
        _ => helpers::err_response(404, "Not found"),
    }
}

fn authenticate(state: &AppState, payload: &Value) -> Result<Identity, Value> {
    let Some(secret) = state.config.addon_jwt_secret.as_deref() else {
        return Ok(Identity::default());
    };

    let Some(token) = signature::extract_token(payload) else {
        error!("Request missing JWT");
        return Err(helpers::err_response(401, "Missing JWT"));
    };

    match signature::verify_jwt(token, secret, chrono::Utc::now().timestamp()) {
        Ok(claims) => Ok(Identity {
            room_id: claims.room_id(),
            client_key: Some(claims.iss),
        }),
        Err(e) => {
            error!("JWT verification failed: {}", e);
            Err(helpers::err_response(401, "Invalid JWT"))
        }
    }
}

async fn handle_installable(state: &AppState, payload: &Value) -> Value {
    let install: InstallablePayload = match parse_json_body(payload) {
        Ok(v) => v,
        Err(e) => return helpers::err_response(400, &e.to_string()),
    };

    let api_url = install.api_url();
    if !state.config.is_trusted_api_url(&api_url) {
        warn!(
            client_key = %install.oauth_id,
            "Rejecting install with untrusted capabilities URL {}",
            install.capabilities_url
        );
        return helpers::err_response(403, "Untrusted capabilities URL");
    }

    match state.bot.store().get_client(&install.oauth_id).await {
        Ok(None) => {}
        Ok(Some(_)) => {
            // Re-installing an existing client must be signed by that client.
            let verified = state.config.addon_jwt_secret.is_some()
                && authenticate(state, payload).is_ok_and(|identity| {
                    identity.client_key.as_deref() == Some(install.oauth_id.as_str())
                });
            if !verified {
                warn!("Refusing unverified re-install of {}", install.oauth_id);
                return helpers::err_response(409, "Already installed");
            }
        }
        Err(e) => {
            error!("Installation lookup failed for {}: {}", install.oauth_id, e);
            return helpers::err_response(500, &e.to_string());
        }
    }

    let client_info = ClientInfo {
        client_key: install.oauth_id.clone(),
        group_id: install.group_id,
        room_id: install.room_id,
        api_url,
        // Token exchange belongs to the session layer; reuse the configured room token.
        access_token: state.config.hipchat_room_token.clone(),
    };

    match state.bot.handle_installed(client_info, install.room_id).await {
        Ok(()) => helpers::ok_json(&json!({ "status": "ok" })),
        Err(e) => {
            error!("Install failed: {}", e);
            helpers::err_response(500, &e.to_string())
        }
    }
}

async fn handle_uninstall(state: &AppState, oauth_id: &str, identity: Identity) -> Value {
    if state.config.addon_jwt_secret.is_some() && identity.client_key.as_deref() != Some(oauth_id) {
        warn!("JWT issuer {:?} cannot uninstall {}", identity.client_key, oauth_id);
        return helpers::err_response(403, "Forbidden");
    }

    match state.bot.handle_uninstalled(oauth_id).await {
        Ok(_) => helpers::no_content(),
        Err(e) => {
            error!("Uninstall failed: {}", e);
            helpers::err_response(500, &e.to_string())
        }
    }
}

async fn handle_webhook(state: &Arc<AppState>, payload: &Value, identity: Identity) -> Value {
    let webhook: RoomMessageWebhook = match parse_json_body(payload) {
        Ok(v) => v,
        Err(e) => {
            error!("Webhook parse error: {}", e);
            return helpers::err_response(400, &format!("Parse Error: {e}"));
        }
    };

    if let Some(kind) = webhook.event.as_deref().filter(|k| *k != "room_message") {
        info!("Ignoring {} webhook", kind);
        return helpers::no_content();
    }

    let client_key = identity.client_key.or(webhook.oauth_client_id);
    let Some(client_info) = state.resolve_client(client_key.as_deref()).await else {
        error!("No installation for client {:?}", client_key);
        return helpers::err_response(403, "Unknown installation");
    };

    let event = WebhookEvent {
        client_info,
        room_id: identity.room_id.unwrap_or(webhook.item.room.id),
        message: webhook.item.message.message,
    };

    // The runtime freezes once the response is returned, so the whole chain
    // finishes first. Its outcome never changes the acknowledgement.
    let outcome = state.bot.handle_webhook_event(&event).await;
    info!("Webhook handled: {:?}", outcome.color());

    helpers::no_content()
}

async fn handle_send_notification(
    state: &AppState,
    payload: &Value,
    identity: Identity,
) -> Value {
    let request: NotificationRequest = match parse_json_body(payload) {
        Ok(v) => v,
        Err(e) => return helpers::err_response(400, &format!("Parse Error: {e}")),
    };

    let client_key = identity.client_key.or(request.client_key);
    let Some(client_info) = state.resolve_client(client_key.as_deref()).await else {
        return helpers::err_response(403, "Unknown installation");
    };
    let Some(room_id) = identity.room_id.or(request.room_id).or(client_info.room_id) else {
        return helpers::err_response(400, "Missing room id");
    };

    // Delivery outcome is logged by the bot; the caller always gets ok.
    state
        .bot
        .send_card(&client_info, room_id, &request.message_title)
        .await;

    helpers::ok_json(&json!({ "status": "ok" }))
}
