use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Failed to acquire translator access token: {0}")]
    AuthError(String),

    #[error("Failed to access translation service: {0}")]
    TranslationServiceError(String),

    #[error("Failed to deliver room message: {0}")]
    DeliveryError(String),

    #[error("Failed to parse webhook payload: {0}")]
    ParseError(String),

    #[error("Request authentication failed: {0}")]
    Unauthorized(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for BotError {
    fn from(error: serde_json::Error) -> Self {
        BotError::ParseError(error.to_string())
    }
}
