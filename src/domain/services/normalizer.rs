#[cfg(test)]
#[path = "normalizer_test.rs"]
mod tests;

use once_cell::sync::Lazy;
use regex::Captures;
use regex::Regex;
use serde_json::Value;

use crate::domain::models::GatewayResponse;

static JSON_BLOCK: Lazy<Regex> = Lazy::new(|| {
    return Regex::new(r"```json\s*([\s\S]*?)\s*```").unwrap();
});

static JSON_BLOCK_WITH_PADDING: Lazy<Regex> = Lazy::new(|| {
    return Regex::new(r"([ \t]*)```json[\s\S]*?```([ \t]*)").unwrap();
});

/// Splits a model reply into the text shown to the candidate and the
/// analysis the model embedded in a fenced json block.
///
/// Only the first block is parsed, but every json block is removed from the
/// display text once that parse succeeds.
pub fn normalize(raw_text: &str) -> GatewayResponse {
    let captures = match JSON_BLOCK.captures(raw_text) {
        Some(captures) => captures,
        None => return GatewayResponse::plain(raw_text),
    };

    let payload = match serde_json::from_str::<Value>(&captures[1]) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(error = ?err, "Failed to parse embedded json analysis");
            return GatewayResponse::plain(raw_text);
        }
    };

    let display_text = JSON_BLOCK_WITH_PADDING
        .replace_all(raw_text, |caps: &Captures| {
            let block = match caps.get(0) {
                Some(block) => block,
                None => return "".to_string(),
            };
            let starts_line = raw_text[..block.start()].ends_with('\n') || block.start() == 0;
            let ends_line = raw_text[block.end()..].starts_with('\n') || block.end() == raw_text.len();

            // A block between two runs of text on one line leaves a single space.
            if starts_line || ends_line || (caps[1].is_empty() && caps[2].is_empty()) {
                return "".to_string();
            }
            return " ".to_string();
        })
        .trim()
        .to_string();

    return GatewayResponse {
        display_text,
        structured_payload: Some(payload),
    };
}
