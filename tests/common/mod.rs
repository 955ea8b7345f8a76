#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use hiptranslate::core::config::{AppConfig, TranslatorConfig};
use hiptranslate::core::models::{ChatPayload, ClientInfo, WebhookEvent};
use hiptranslate::errors::BotError;
use hiptranslate::hipchat::Messenger;
use hiptranslate::store::MemoryInstallationStore;
use hiptranslate::translator::{TextTranslator, TokenProvider, TranslationClient};
use hiptranslate::TranslateBot;

pub struct FakeTokens {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeTokens {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self { fail: false, calls: AtomicUsize::new(0) })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { fail: true, calls: AtomicUsize::new(0) })
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenProvider for FakeTokens {
    async fn acquire_token(&self) -> Result<String, BotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(BotError::AuthError("credential service down".to_string()))
        } else {
            Ok("token-123".to_string())
        }
    }
}

/// Records every call and answers with `[<to>] <text>`, optionally after a delay.
pub struct FakeTranslator {
    pub fail: bool,
    pub delay: Option<Duration>,
    pub calls: Mutex<Vec<(String, String, Option<String>, String)>>,
}

impl FakeTranslator {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self { fail: false, delay: None, calls: Mutex::new(Vec::new()) })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { fail: true, delay: None, calls: Mutex::new(Vec::new()) })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self { fail: false, delay: Some(delay), calls: Mutex::new(Vec::new()) })
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TextTranslator for FakeTranslator {
    async fn perform_translation(
        &self,
        token: &str,
        text: &str,
        from: Option<&str>,
        to: &str,
    ) -> Result<String, BotError> {
        self.calls.lock().unwrap().push((
            token.to_string(),
            text.to_string(),
            from.map(str::to_string),
            to.to_string(),
        ));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            Err(BotError::TranslationServiceError("503".to_string()))
        } else {
            Ok(format!("[{to}] {text}"))
        }
    }
}

#[derive(Default)]
pub struct RecordingMessenger {
    pub fail: bool,
    pub sent: Mutex<Vec<(u64, ChatPayload)>>,
}

impl RecordingMessenger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { fail: true, sent: Mutex::new(Vec::new()) })
    }

    pub fn sent(&self) -> Vec<(u64, ChatPayload)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_message(
        &self,
        _client_info: &ClientInfo,
        room_id: u64,
        payload: &ChatPayload,
    ) -> Result<(), BotError> {
        self.sent.lock().unwrap().push((room_id, payload.clone()));
        if self.fail {
            Err(BotError::DeliveryError("room unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

pub struct Harness {
    pub tokens: Arc<FakeTokens>,
    pub translator: Arc<FakeTranslator>,
    pub messenger: Arc<RecordingMessenger>,
    pub store: Arc<MemoryInstallationStore>,
    pub bot: Arc<TranslateBot>,
}

pub fn harness(
    tokens: Arc<FakeTokens>,
    translator: Arc<FakeTranslator>,
    messenger: Arc<RecordingMessenger>,
    notify_on_failure: bool,
) -> Harness {
    let store = Arc::new(MemoryInstallationStore::new());
    let bot = TranslateBot::new(
        TranslationClient::new(tokens.clone(), translator.clone()),
        messenger.clone(),
        store.clone(),
        "HipTranslate",
    )
    .with_notify_on_failure(notify_on_failure);

    Harness {
        tokens,
        translator,
        messenger,
        store,
        bot: Arc::new(bot),
    }
}

pub fn client_info() -> ClientInfo {
    ClientInfo {
        client_key: "client-1".to_string(),
        group_id: Some(7),
        room_id: Some(42),
        api_url: "https://api.hipchat.com/v2/".to_string(),
        access_token: Some("room-token".to_string()),
    }
}

pub fn event(message: &str) -> WebhookEvent {
    WebhookEvent {
        client_info: client_info(),
        room_id: 42,
        message: message.to_string(),
    }
}

pub fn app_config(jwt_secret: Option<&str>) -> AppConfig {
    AppConfig {
        translator: TranslatorConfig::with_secret("secret"),
        addon_name: "HipTranslate".to_string(),
        addon_base_url: "https://translate.example.com".to_string(),
        addon_jwt_secret: jwt_secret.map(str::to_string),
        notify_on_failure: false,
        hipchat_api_url: None,
        hipchat_room_token: Some("room-token".to_string()),
        hipchat_api_hosts: vec!["api.hipchat.com".to_string()],
    }
}
