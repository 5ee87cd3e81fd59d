//! Tag substitution for pre-TOML configuration text.
//!
//! A minimal mustache-style pass run before the document is parsed, so paths
//! and names can be filled in at load time:
//!
//! ```text
//! filename = "log/{{ index }}-err/simple-{{path}}.log"
//! ```
//!
//! - `{{ key }}` is replaced by the value bound to `key`; whitespace inside
//!   the braces is ignored.
//! - `{{"text"}}` emits `text` verbatim, which is how literal `{{` / `}}`
//!   sequences are written.
//! - A key with no binding renders as the empty string.
//! - An unterminated `{{` is copied through unchanged.

use std::collections::HashMap;


enum Tag<'a> {
    Key(&'a str),
    Literal(&'a str),
}

/// Render `template`, replacing `{{ ... }}` tags from `vars`.
///
/// Never fails; see the module docs for the handling of unbound keys.
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let body = &rest[open + 2..];

        match parse_tag(body) {
            Some((Tag::Literal(text), consumed)) => {
                out.push_str(text);
                rest = &body[consumed..];
            }
            Some((Tag::Key(key), consumed)) => {
                match vars.get(key) {
                    Some(value) => out.push_str(value),
                    None => lgs_debug!(conf, key, "template key has no binding"),
                }
                rest = &body[consumed..];
            }
            None => {
                // unterminated tag
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Parse the inside of a tag, starting right after `{{`.
///
/// Returns the tag and the number of bytes consumed including the closing
/// `}}`, or `None` if no closing braces follow.
fn parse_tag(body: &str) -> Option<(Tag<'_>, usize)> {
    let trimmed = body.trim_start();
    let lead = body.len() - trimmed.len();

    // quoted literal: {{ "..." }}
    if let Some(quoted) = trimmed.strip_prefix('"') {
        if let Some(end_quote) = quoted.find('"') {
            let after = &quoted[end_quote + 1..];
            let after_trimmed = after.trim_start();
            if after_trimmed.starts_with("}}") {
                let consumed = lead + 1 + end_quote + 1 + (after.len() - after_trimmed.len()) + 2;
                return Some((Tag::Literal(&quoted[..end_quote]), consumed));
            }
        }
    }

    let close = body.find("}}")?;
    Some((Tag::Key(body[..close].trim()), close + 2))
}
