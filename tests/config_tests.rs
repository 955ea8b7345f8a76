use std::env;
use std::sync::{Mutex, MutexGuard};

use hiptranslate::core::config::{
    AppConfig, DEFAULT_ADDON_NAME, DEFAULT_SCOPE, DEFAULT_TOKEN_URL, DEFAULT_TRANSLATE_URL,
    RetryPolicy, TranslatorConfig,
};

// Tests in this file share the process environment.
static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: &[&str] = &[
    "CLIENT_SECRET",
    "CLIENT_ID",
    "TRANSLATOR_SCOPE",
    "TRANSLATOR_TOKEN_URL",
    "TRANSLATOR_API_URL",
    "TRANSLATOR_MAX_ATTEMPTS",
    "TRANSLATOR_BACKOFF_MS",
    "TRANSLATOR_TIMEOUT_SECS",
    "ADDON_NAME",
    "ADDON_BASE_URL",
    "ADDON_JWT_SECRET",
    "NOTIFY_ON_FAILURE",
    "HIPCHAT_API_URL",
    "HIPCHAT_ROOM_TOKEN",
    "HIPCHAT_API_HOSTS",
];

/// Locks the environment and clears every variable the config reads.
fn clean_env() -> MutexGuard<'static, ()> {
    let guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    for var in VARS {
        unsafe { env::remove_var(var) };
    }
    guard
}

fn set(var: &str, value: &str) {
    unsafe { env::set_var(var, value) };
}

#[test]
fn test_client_secret_is_required() {
    let _env = clean_env();

    let err = AppConfig::from_env().unwrap_err();

    assert!(err.starts_with("CLIENT_SECRET: "), "{err}");
}

#[test]
fn test_defaults_with_only_client_secret() {
    let _env = clean_env();
    set("CLIENT_SECRET", "s3cret");

    let config = AppConfig::from_env().unwrap();

    assert_eq!(config.translator.client_secret, "s3cret");
    assert_eq!(config.translator.client_id, "HipTranslate");
    assert_eq!(config.translator.scope, DEFAULT_SCOPE);
    assert_eq!(config.translator.token_url, DEFAULT_TOKEN_URL);
    assert_eq!(config.translator.translate_url, DEFAULT_TRANSLATE_URL);
    assert_eq!(config.translator.retry, RetryPolicy::default());
    assert_eq!(config.translator.request_timeout_secs, None);
    assert_eq!(config.addon_name, DEFAULT_ADDON_NAME);
    assert_eq!(config.addon_base_url, "http://localhost:3000");
    assert!(config.addon_jwt_secret.is_none());
    assert!(!config.notify_on_failure);
    assert!(config.hipchat_api_url.is_none());
    assert!(config.hipchat_room_token.is_none());
    assert_eq!(config.hipchat_api_hosts, vec!["api.hipchat.com".to_string()]);
}

#[test]
fn test_overrides_are_parsed() {
    let _env = clean_env();
    set("CLIENT_SECRET", "s3cret");
    set("CLIENT_ID", "my-client");
    set("TRANSLATOR_MAX_ATTEMPTS", " 3 ");
    set("TRANSLATOR_BACKOFF_MS", "250");
    set("TRANSLATOR_TIMEOUT_SECS", "10");
    set("ADDON_NAME", "Babel");
    set("NOTIFY_ON_FAILURE", "true");
    set("HIPCHAT_API_HOSTS", "hipchat.corp.example, API.HIPCHAT.COM");
    set("HIPCHAT_API_URL", "https://chat.internal.example/v2/");

    let config = AppConfig::from_env().unwrap();

    assert_eq!(config.translator.client_id, "my-client");
    assert_eq!(
        config.translator.retry,
        RetryPolicy {
            max_attempts: 3,
            base_delay_ms: 250
        }
    );
    assert_eq!(config.translator.request_timeout_secs, Some(10));
    assert_eq!(config.addon_name, "Babel");
    assert!(config.notify_on_failure);
    assert_eq!(
        config.hipchat_api_hosts,
        vec![
            "hipchat.corp.example".to_string(),
            "api.hipchat.com".to_string(),
            "chat.internal.example".to_string(),
        ]
    );
}

#[test]
fn test_invalid_number_names_the_variable() {
    let _env = clean_env();
    set("CLIENT_SECRET", "s3cret");
    set("TRANSLATOR_MAX_ATTEMPTS", "many");

    let err = AppConfig::from_env().unwrap_err();

    assert!(err.starts_with("TRANSLATOR_MAX_ATTEMPTS: "), "{err}");
}

#[test]
fn test_invalid_bool_names_the_variable() {
    let _env = clean_env();
    set("CLIENT_SECRET", "s3cret");
    set("NOTIFY_ON_FAILURE", "yes");

    let err = AppConfig::from_env().unwrap_err();

    assert!(err.starts_with("NOTIFY_ON_FAILURE: "), "{err}");
}

#[test]
fn test_invalid_default_api_url_names_the_variable() {
    let _env = clean_env();
    set("CLIENT_SECRET", "s3cret");
    set("HIPCHAT_API_URL", "not a url");

    let err = AppConfig::from_env().unwrap_err();

    assert!(err.starts_with("HIPCHAT_API_URL: "), "{err}");
}

#[test]
fn test_trusted_api_url_requires_https_and_listed_host() {
    let _env = clean_env();
    set("CLIENT_SECRET", "s3cret");
    let config = AppConfig::from_env().unwrap();

    assert!(config.is_trusted_api_url("https://api.hipchat.com/v2/"));
    assert!(config.is_trusted_api_url("https://API.hipchat.com/v2/"));
    assert!(!config.is_trusted_api_url("http://api.hipchat.com/v2/"));
    assert!(!config.is_trusted_api_url("https://evil.example/v2/"));
    assert!(!config.is_trusted_api_url("https://api.hipchat.com.evil.example/v2/"));
    assert!(!config.is_trusted_api_url("not a url"));
}

#[test]
fn test_debug_output_redacts_secrets() {
    let mut config = {
        let _env = clean_env();
        set("CLIENT_SECRET", "s3cret-value");
        AppConfig::from_env().unwrap()
    };
    config.addon_jwt_secret = Some("jwt-secret-value".to_string());
    config.hipchat_room_token = Some("room-token-value".to_string());

    let translator = format!("{:?}", config.translator);
    assert!(!translator.contains("s3cret-value"), "{translator}");
    assert!(translator.contains("<redacted>"));
    assert!(translator.contains("HipTranslate"));

    let app = format!("{config:?}");
    assert!(!app.contains("s3cret-value"), "{app}");
    assert!(!app.contains("jwt-secret-value"), "{app}");
    assert!(!app.contains("room-token-value"), "{app}");
}

#[test]
fn test_with_secret_debug_is_redacted() {
    let config = TranslatorConfig::with_secret("hunter2");

    assert!(!format!("{config:?}").contains("hunter2"));
}
