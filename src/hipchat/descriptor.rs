//! The `atlassian-connect.json` capabilities descriptor served to HipChat.

use serde_json::{Value, json};

use crate::command_parser::COMMAND_KEYWORD;

/// Descriptor registering the `/translate` webhook and the install callback.
#[must_use]
pub fn build_descriptor(addon_name: &str, base_url: &str) -> Value {
    let base = base_url.trim_end_matches('/');

    json!({
        "key": addon_name.to_lowercase(),
        "name": addon_name,
        "description": "Translate chat messages between languages with /translate",
        "vendor": { "name": addon_name, "url": base },
        "links": {
            "self": format!("{base}/atlassian-connect.json"),
            "homepage": base,
        },
        "capabilities": {
            "hipchatApiConsumer": {
                "scopes": ["send_notification"]
            },
            "installable": {
                "callbackUrl": format!("{base}/installable"),
                "allowGlobal": false,
                "allowRoom": true,
            },
            "webhook": [{
                "url": format!("{base}/webhook"),
                "pattern": format!("^{COMMAND_KEYWORD}"),
                "event": "room_message",
                "name": "Translate",
                "authentication": "jwt",
            }]
        }
    })
}
