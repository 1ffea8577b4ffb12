//! Mini-parser for embedded prompt shortcodes.
//!
//! Grammar, scanned in two stages:
//!
//! ```text
//! token   = "[marquee-prompt" <anything except ']'> "]"
//! id-attr = "id=" quote? digit+          (quote is '"' or '\'')
//! ```
//!
//! Stage one finds tokens; stage two extracts the first id attribute
//! inside each. Tokens without a parseable id are silently dropped, and
//! the result is a set -- duplicates collapse.

use std::collections::BTreeSet;

use marquee_core::PromptId;

/// The shortcode tag, as written by authors and by the injector.
pub const SHORTCODE_TAG: &str = "marquee-prompt";

const TOKEN_OPEN: &str = "[marquee-prompt";

/// Extract all prompt ids referenced by shortcode in `text`.
pub fn extract_ids(text: &str) -> BTreeSet<PromptId> {
    let mut ids = BTreeSet::new();
    let mut rest = text;
    while let Some(start) = rest.find(TOKEN_OPEN) {
        let body = &rest[start + TOKEN_OPEN.len()..];
        let Some(close) = body.find(']') else {
            break;
        };
        if let Some(id) = parse_id_attr(&body[..close]) {
            ids.insert(id);
        }
        rest = &body[close + 1..];
    }
    ids
}

/// Find `id=`, skip an optional quote, and take the digit run.
fn parse_id_attr(token: &str) -> Option<PromptId> {
    let at = token.find("id=")?;
    let mut value = &token[at + 3..];
    if let Some(first) = value.chars().next() {
        if first == '"' || first == '\'' {
            value = &value[1..];
        }
    }
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u64>().ok().map(PromptId)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
