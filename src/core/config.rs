use std::env;
use std::fmt;
use std::str::FromStr;

use url::Url;

pub const DEFAULT_CLIENT_ID: &str = "HipTranslate";
pub const DEFAULT_ADDON_NAME: &str = "HipTranslate";
pub const DEFAULT_HIPCHAT_API_HOST: &str = "api.hipchat.com";
pub const DEFAULT_SCOPE: &str = "http://api.microsofttranslator.com";
pub const DEFAULT_TOKEN_URL: &str = "https://datamarket.accesscontrol.windows.net/v2/OAuth2-13";
pub const DEFAULT_TRANSLATE_URL: &str = "http://api.microsofttranslator.com/V2/Ajax.svc/Translate";

const REDACTED: &str = "<redacted>";

/// How many times each remote call is attempted, and the base delay of the
/// exponential backoff between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 100,
        }
    }
}

/// Everything the translation client needs, handed over at construction.
#[derive(Clone)]
pub struct TranslatorConfig {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub token_url: String,
    pub translate_url: String,
    pub retry: RetryPolicy,
    pub request_timeout_secs: Option<u64>,
}

impl TranslatorConfig {
    /// Config pointing at the default endpoints with the given secret.
    pub fn with_secret(client_secret: impl Into<String>) -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            client_secret: client_secret.into(),
            scope: DEFAULT_SCOPE.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            translate_url: DEFAULT_TRANSLATE_URL.to_string(),
            retry: RetryPolicy::default(),
            request_timeout_secs: None,
        }
    }
}

impl fmt::Debug for TranslatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatorConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &REDACTED)
            .field("scope", &self.scope)
            .field("token_url", &self.token_url)
            .field("translate_url", &self.translate_url)
            .field("retry", &self.retry)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub translator: TranslatorConfig,
    pub addon_name: String,
    pub addon_base_url: String,
    pub addon_jwt_secret: Option<String>,
    pub notify_on_failure: bool,
    pub hipchat_api_url: Option<String>,
    pub hipchat_room_token: Option<String>,
    /// Hosts an installation's API root may point at before the room token
    /// is attached to it.
    pub hipchat_api_hosts: Vec<String>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("translator", &self.translator)
            .field("addon_name", &self.addon_name)
            .field("addon_base_url", &self.addon_base_url)
            .field("addon_jwt_secret", &self.addon_jwt_secret.as_ref().map(|_| REDACTED))
            .field("notify_on_failure", &self.notify_on_failure)
            .field("hipchat_api_url", &self.hipchat_api_url)
            .field("hipchat_room_token", &self.hipchat_room_token.as_ref().map(|_| REDACTED))
            .field("hipchat_api_hosts", &self.hipchat_api_hosts)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let translator = TranslatorConfig {
            client_id: env::var("CLIENT_ID").unwrap_or_else(|_| DEFAULT_CLIENT_ID.to_string()),
            client_secret: env::var("CLIENT_SECRET")
                .map_err(|e| format!("CLIENT_SECRET: {}", e))?,
            scope: env::var("TRANSLATOR_SCOPE").unwrap_or_else(|_| DEFAULT_SCOPE.to_string()),
            token_url: env::var("TRANSLATOR_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            translate_url: env::var("TRANSLATOR_API_URL")
                .unwrap_or_else(|_| DEFAULT_TRANSLATE_URL.to_string()),
            retry: RetryPolicy {
                max_attempts: parse_var("TRANSLATOR_MAX_ATTEMPTS")?.unwrap_or(1),
                base_delay_ms: parse_var("TRANSLATOR_BACKOFF_MS")?.unwrap_or(100),
            },
            request_timeout_secs: parse_var("TRANSLATOR_TIMEOUT_SECS")?,
        };

        let hipchat_api_url = env::var("HIPCHAT_API_URL").ok();

        Ok(Self {
            translator,
            addon_name: env::var("ADDON_NAME").unwrap_or_else(|_| DEFAULT_ADDON_NAME.to_string()),
            addon_base_url: env::var("ADDON_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            addon_jwt_secret: env::var("ADDON_JWT_SECRET").ok(),
            notify_on_failure: parse_var("NOTIFY_ON_FAILURE")?.unwrap_or(false),
            hipchat_api_hosts: api_hosts(hipchat_api_url.as_deref())?,
            hipchat_api_url,
            hipchat_room_token: env::var("HIPCHAT_ROOM_TOKEN").ok(),
        })
    }

    /// True when `api_url` is an https URL on one of the allowed API hosts.
    pub fn is_trusted_api_url(&self, api_url: &str) -> bool {
        let Ok(url) = Url::parse(api_url) else {
            return false;
        };
        url.scheme() == "https"
            && url.host_str().is_some_and(|host| {
                self.hipchat_api_hosts
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(host))
            })
    }
}

/// `HIPCHAT_API_HOSTS` (comma separated, default `api.hipchat.com`) plus the
/// host of `HIPCHAT_API_URL` when one is configured.
fn api_hosts(default_api_url: Option<&str>) -> Result<Vec<String>, String> {
    let mut hosts: Vec<String> = match env::var("HIPCHAT_API_HOSTS") {
        Ok(raw) => raw
            .split(',')
            .map(|h| h.trim().to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .collect(),
        Err(_) => vec![DEFAULT_HIPCHAT_API_HOST.to_string()],
    };
    if let Some(raw) = default_api_url {
        let url = Url::parse(raw).map_err(|e| format!("HIPCHAT_API_URL: {}", e))?;
        if let Some(host) = url.host_str() {
            let host = host.to_ascii_lowercase();
            if !hosts.contains(&host) {
                hosts.push(host);
            }
        }
    }
    Ok(hosts)
}

fn parse_var<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("{}: {}", name, e)),
        Err(_) => Ok(None),
    }
}
