use serde::{Deserialize, Serialize};

/// Parsed `/translate` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub text: String,
    pub from_lang: Option<String>,
    pub to_lang: String,
}

/// Ordered `(from, to)` pair read from a `from:to` token. `from == None` means auto-detect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub from: Option<String>,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResult {
    pub original_text: String,
    pub translated_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Yellow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardIcon {
    pub url: String,
}

/// Link card attached to a room notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub style: String,
    pub url: String,
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: CardIcon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatPayload {
    pub message: String,
    pub color: Color,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
}

/// Installation record for one HipChat group/room, as handed over by the
/// authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub client_key: String,
    #[serde(default)]
    pub group_id: Option<u64>,
    #[serde(default)]
    pub room_id: Option<u64>,
    pub api_url: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

/// A `room_message` webhook, reduced to what the command pipeline reads.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    pub client_info: ClientInfo,
    pub room_id: u64,
    pub message: String,
}
