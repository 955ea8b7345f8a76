//! HS256 JWT checks for requests signed by HipChat.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use tracing::error;

use super::parsing::{get_header_value, query_param};
use crate::errors::BotError;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Deserialize)]
struct JwtHeader {
    alg: String,
}

/// Claims carried by a HipChat request token.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtClaims {
    /// OAuth client id of the installation.
    pub iss: String,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub context: Option<Value>,
}

impl JwtClaims {
    pub fn room_id(&self) -> Option<u64> {
        self.context
            .as_ref()
            .and_then(|c| c.get("room_id"))
            .and_then(|r| r.as_u64().or_else(|| r.as_str().and_then(|s| s.parse().ok())))
    }
}

/// Token from `Authorization: JWT <token>` or the `signed_request` query parameter.
pub fn extract_token(payload: &Value) -> Option<&str> {
    payload
        .get("headers")
        .and_then(|h| get_header_value(h, "Authorization"))
        .and_then(|v| v.strip_prefix("JWT "))
        .or_else(|| query_param(payload, "signed_request"))
}

/// Verifies signature and expiry of `token` against `secret` and returns its claims.
///
/// # Errors
///
/// Returns [`BotError::Unauthorized`] if the token is malformed, not HS256,
/// wrongly signed or expired.
pub fn verify_jwt(token: &str, secret: &str, now_secs: i64) -> Result<JwtClaims, BotError> {
    let mut parts = token.split('.');
    let (Some(header_b64), Some(claims_b64), Some(sig_b64), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(BotError::Unauthorized("token is not a JWT".to_string()));
    };

    let header: JwtHeader = decode_segment(header_b64)?;
    if header.alg != "HS256" {
        return Err(BotError::Unauthorized(format!(
            "unsupported algorithm {}",
            header.alg
        )));
    }

    let signature = URL_SAFE_NO_PAD
        .decode(sig_b64)
        .map_err(|e| BotError::Unauthorized(format!("bad signature encoding: {}", e)))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BotError::Unauthorized(format!("Failed to create HMAC: {}", e)))?;
    mac.update(format!("{header_b64}.{claims_b64}").as_bytes());
    if mac.verify_slice(&signature).is_err() {
        error!("JWT signature verification failed");
        return Err(BotError::Unauthorized("invalid signature".to_string()));
    }

    let claims: JwtClaims = decode_segment(claims_b64)?;
    if let Some(exp) = claims.exp {
        if exp < now_secs {
            return Err(BotError::Unauthorized("token expired".to_string()));
        }
    }

    Ok(claims)
}

/// Signs `claims` as an HS256 JWT. The counterpart of [`verify_jwt`].
pub fn sign_jwt(claims: &Value, secret: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(claims.to_string());
    let signing_input = format!("{header}.{body}");

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            return String::new();
        }
    };
    mac.update(signing_input.as_bytes());
    let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    format!("{signing_input}.{sig}")
}

fn decode_segment<T>(segment: &str) -> Result<T, BotError>
where
    T: for<'de> Deserialize<'de>,
{
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| BotError::Unauthorized(format!("bad token encoding: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| BotError::Unauthorized(format!("bad token json: {}", e)))
}
