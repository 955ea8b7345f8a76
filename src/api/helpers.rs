//! Response builders shared by the API routes.

use serde_json::{Value, json};

/// Returns a 200 OK response with a JSON body.
#[must_use]
pub fn ok_json(body: &Value) -> Value {
    json!({
        "statusCode": 200,
        "headers": { "Content-Type": "application/json" },
        "body": body.to_string()
    })
}

/// Returns a 200 OK response with a plain-text body.
#[must_use]
pub fn ok_text(text: &str) -> Value {
    json!({
        "statusCode": 200,
        "headers": { "Content-Type": "text/plain" },
        "body": text
    })
}

/// Returns a 204 No Content response.
#[must_use]
pub fn no_content() -> Value {
    json!({ "statusCode": 204, "body": "" })
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json!({
        "statusCode": status_code,
        "body": json!({ "error": message }).to_string()
    })
}

/// Returns a 302 redirect response.
#[must_use]
pub fn redirect(url: &str) -> Value {
    json!({
        "statusCode": 302,
        "headers": { "Location": url },
        "body": ""
    })
}
