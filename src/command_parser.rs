//! Parser for the `/translate [[from]:[to]] message` command grammar.

use crate::core::models::{Command, LanguagePair};

/// Keyword the webhook is registered for.
pub const COMMAND_KEYWORD: &str = "/translate";

/// Target language used whenever the command does not name one.
pub const DEFAULT_TARGET_LANG: &str = "en";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult {
    /// The bare keyword with nothing after it.
    UsageError,
    Command(Command),
}

/// Parses a raw room message into a [`ParseResult`].
///
/// Everything up to and including the first whitespace character is treated as
/// the keyword. The first token of the remainder is a language token only when
/// it contains a `:`; otherwise it belongs to the message. The pair is split on
/// the first `:`, so a target code that itself contains `:` cannot be written.
///
/// # Examples
///
/// ```
/// use hiptranslate::command_parser::{ParseResult, parse};
///
/// let ParseResult::Command(cmd) = parse("/translate :ru hello") else {
///     panic!("expected a command");
/// };
/// assert_eq!(cmd.text, "hello");
/// assert_eq!(cmd.from_lang, None);
/// assert_eq!(cmd.to_lang, "ru");
///
/// assert_eq!(parse("  /translate  "), ParseResult::UsageError);
/// ```
pub fn parse(raw_command: &str) -> ParseResult {
    if raw_command.trim() == COMMAND_KEYWORD {
        return ParseResult::UsageError;
    }

    let rest = strip_keyword(raw_command.trim_start());
    let (token, candidate_text) = split_first_token(rest);

    match parse_language_token(token) {
        Some(pair) => ParseResult::Command(Command {
            text: candidate_text.to_string(),
            from_lang: pair.from,
            to_lang: pair.to,
        }),
        None => ParseResult::Command(Command {
            text: rest.to_string(),
            from_lang: None,
            to_lang: DEFAULT_TARGET_LANG.to_string(),
        }),
    }
}

/// Reads a `from:to` token. Returns `None` when the token has no `:`.
///
/// An empty `from` means auto-detect, an empty `to` falls back to English.
pub fn parse_language_token(token: &str) -> Option<LanguagePair> {
    let (from, to) = token.split_once(':')?;

    Some(LanguagePair {
        from: (!from.is_empty()).then(|| from.to_string()),
        to: if to.is_empty() {
            DEFAULT_TARGET_LANG.to_string()
        } else {
            to.to_string()
        },
    })
}

/// Drops the keyword and exactly one separator after it.
fn strip_keyword(command: &str) -> &str {
    match command.char_indices().find(|(_, c)| c.is_whitespace()) {
        Some((idx, sep)) => &command[idx + sep.len_utf8()..],
        None => "",
    }
}

/// Splits off the leading token (up to the first whitespace) and returns it with
/// everything after the single separator that follows it.
fn split_first_token(rest: &str) -> (&str, &str) {
    match rest.char_indices().find(|(_, c)| c.is_whitespace()) {
        Some((idx, sep)) => (&rest[..idx], &rest[idx + sep.len_utf8()..]),
        None => (rest, ""),
    }
}
