use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::BotError;

/// HipChat `room_message` webhook body.
#[derive(Debug, Deserialize)]
pub struct RoomMessageWebhook {
    #[serde(default)]
    pub event: Option<String>,
    pub item: WebhookItem,
    #[serde(default)]
    pub oauth_client_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookItem {
    pub message: WebhookMessage,
    pub room: WebhookRoom,
}

#[derive(Debug, Deserialize)]
pub struct WebhookMessage {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct WebhookRoom {
    pub id: u64,
}

/// Body HipChat posts to the installable callback.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallablePayload {
    pub oauth_id: String,
    pub capabilities_url: String,
    #[serde(default)]
    pub room_id: Option<u64>,
    #[serde(default)]
    pub group_id: Option<u64>,
}

impl InstallablePayload {
    /// API root derived from the capabilities URL, e.g.
    /// `https://api.hipchat.com/v2/capabilities` -> `https://api.hipchat.com/v2/`.
    pub fn api_url(&self) -> String {
        let url = self.capabilities_url.trim_end_matches('/');
        match url.strip_suffix("capabilities") {
            Some(root) => root.to_string(),
            None => format!("{url}/"),
        }
    }
}

/// Body of the `/send_notification` route.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub message_title: String,
    #[serde(default)]
    pub room_id: Option<u64>,
    #[serde(default)]
    pub client_key: Option<String>,
}

pub fn request_path(payload: &Value) -> Option<&str> {
    payload
        .get("rawPath")
        .and_then(|v| v.as_str())
        .or_else(|| payload.get("path").and_then(|v| v.as_str()))
}

pub fn request_method(payload: &Value) -> &str {
    payload
        .get("requestContext")
        .and_then(|c| c.get("http"))
        .and_then(|h| h.get("method"))
        .and_then(|m| m.as_str())
        .or_else(|| payload.get("httpMethod").and_then(|m| m.as_str()))
        .unwrap_or("GET")
}

pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

/// Looks a query parameter up in `queryStringParameters`, then in `rawQueryString`.
pub fn query_param<'a>(payload: &'a Value, name: &str) -> Option<&'a str> {
    payload
        .get("queryStringParameters")
        .and_then(|m| m.get(name))
        .and_then(|v| v.as_str())
        .or_else(|| {
            payload
                .get("rawQueryString")
                .and_then(|q| q.as_str())
                .and_then(|q| {
                    q.split('&').find_map(|kv| {
                        kv.split_once('=')
                            .and_then(|(k, v)| (k == name).then_some(v))
                    })
                })
        })
}

/// Request body as text, undoing API Gateway's base64 wrapping when flagged.
pub fn extract_body(payload: &Value) -> Result<String, BotError> {
    let body = payload
        .get("body")
        .and_then(|b| b.as_str())
        .ok_or_else(|| BotError::ParseError("Missing body".to_string()))?;

    let encoded = payload
        .get("isBase64Encoded")
        .and_then(|b| b.as_bool())
        .unwrap_or(false);

    if encoded {
        let bytes = STANDARD
            .decode(body)
            .map_err(|e| BotError::ParseError(format!("Invalid base64 body: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| BotError::ParseError(format!("Body is not UTF-8: {}", e)))
    } else {
        Ok(body.to_string())
    }
}

pub fn parse_json_body<T>(payload: &Value) -> Result<T, BotError>
where
    T: for<'de> Deserialize<'de>,
{
    let body = extract_body(payload)?;
    Ok(serde_json::from_str(&body)?)
}
