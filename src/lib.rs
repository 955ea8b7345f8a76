//! HipTranslate - a HipChat add-on that translates room messages with `/translate`.
//!
//! A room message matching `^/translate` arrives as a webhook. The command is
//! parsed into text and a language pair, a bearer token is fetched from the
//! translator's credential service, the text is translated, and the result is
//! posted back into the room as a green notification. A bare `/translate`
//! gets red usage help instead.
//!
//! # Architecture
//!
//! The system uses:
//! - AWS Lambda (`lambda_runtime`) for the HTTP entrypoint
//! - reqwest for the translator and HipChat REST calls
//! - tokio-retry for the optional retry policy around remote calls
//! - Tokio for async runtime
//!
//! # Example
//!
//! ```
//! use hiptranslate::command_parser::{ParseResult, parse};
//!
//! match parse("/translate hi:ru नमस्कार") {
//!     ParseResult::Command(cmd) => {
//!         assert_eq!(cmd.from_lang.as_deref(), Some("hi"));
//!         assert_eq!(cmd.to_lang, "ru");
//!         assert_eq!(cmd.text, "नमस्कार");
//!     }
//!     ParseResult::UsageError => unreachable!(),
//! }
//! ```

// Module declarations
pub mod api;
pub mod bot;
pub mod command_parser;
pub mod core;
pub mod errors;
pub mod hipchat;
pub mod store;
pub mod translator;

pub use bot::{TranslateBot, WebhookOutcome};
pub use errors::BotError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// Output is filtered by `RUST_LOG` (default `info`). Calling it again after a
/// subscriber is installed is a no-op.
///
/// # Example
///
/// ```
/// hiptranslate::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let default_level = if cfg!(feature = "debug-logs") {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
