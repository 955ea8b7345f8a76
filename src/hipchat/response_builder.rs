//! Builders for the room notifications the bot sends.
//!
//! Every builder is a pure function of its inputs, except for the random
//! card id in [`format_link_card`].

use uuid::Uuid;

use crate::core::models::{Card, CardIcon, ChatPayload, Color};
use crate::errors::BotError;

pub const USAGE_HTML: &str = "<b>Usage: </b><code>/translate [[from]:[to]] message</code><br>\n\
Examples:<br>\n\
<code>/translate नमस्कार</code> <i>(translate from auto-detected language to English)</i><br>\n\
<code>/translate :ru hello</code> <i>(translate from auto-detected language to Russian)</i><br>\n\
<code>/translate hi:ru नमस्कार</code> <i>(translate from Hindi to Russian)</i><br>";

const CARD_URL: &str = "https://www.hipchat.com";
const CARD_DESCRIPTION: &str =
    "Great teams use HipChat: Group and private chat, file sharing, and integrations";
const CARD_ICON_URL: &str =
    "https://hipchat-public-m5.atlassian.com/assets/img/hipchat/bookmark-icons/favicon-192x192.png";

/// Red help text listing the grammar and three examples.
#[must_use]
pub fn format_usage_error() -> ChatPayload {
    ChatPayload {
        message: USAGE_HTML.to_string(),
        color: Color::Red,
        card: None,
    }
}

/// Green `"<original>" => <translated>` line.
///
/// # Examples
///
/// ```
/// use hiptranslate::core::models::Color;
/// use hiptranslate::hipchat::response_builder::format_success;
///
/// let payload = format_success("hello", "привет");
/// assert_eq!(payload.message, "\"hello\" => привет");
/// assert_eq!(payload.color, Color::Green);
/// ```
#[must_use]
pub fn format_success(original_text: &str, translated_text: &str) -> ChatPayload {
    ChatPayload {
        message: format!("\"{original_text}\" => {translated_text}"),
        color: Color::Green,
        card: None,
    }
}

/// Yellow notice for a translation that could not be completed.
#[must_use]
pub fn format_service_failure(error: &BotError) -> ChatPayload {
    let reason = match error {
        BotError::AuthError(_) => "the translation service rejected our credentials",
        BotError::TranslationServiceError(_) => "the translation service is unavailable",
        _ => "something went wrong",
    };

    ChatPayload {
        message: format!("Sorry, I couldn't translate that: {reason}. Please try again later."),
        color: Color::Yellow,
        card: None,
    }
}

#[must_use]
pub fn format_installed_notice(addon_name: &str) -> ChatPayload {
    ChatPayload {
        message: format!("The {addon_name} add-on has been installed in this room"),
        color: Color::Yellow,
        card: None,
    }
}

/// Yellow link card titled `title`.
#[must_use]
pub fn format_link_card(title: &str) -> ChatPayload {
    let card = Card {
        style: "link".to_string(),
        url: CARD_URL.to_string(),
        id: Uuid::new_v4().to_string(),
        title: title.to_string(),
        description: CARD_DESCRIPTION.to_string(),
        icon: CardIcon {
            url: CARD_ICON_URL.to_string(),
        },
    };

    ChatPayload {
        message: format!("<b>{}</b>: {}", card.title, card.description),
        color: Color::Yellow,
        card: Some(card),
    }
}
