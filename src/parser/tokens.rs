//! Tag value grammar for `@param`, `@argument`, `@returns` and `@requires`.
//!
//! ```text
//! value       = type? name? description?
//! type        = "{" .. "}"
//! name        = "[" name ("=" default)? "]" | "`" .. "`" | bare-token
//! description = rest of the tokens, joined by spaces, leading "-" removed
//! ```
//!
//! Tokens are matched in order of precedence: brace group, bracket group,
//! backtick group, then any run of non-whitespace.

use crate::model::RequireKind;
use regex::Regex;
use std::sync::LazyLock;

static RE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^}]*\}|\[[^\]]*\]|`[^`]*`|\S+").unwrap());

/// Marker for `@requires` values pointing at the Node.js API docs.
const NODE_DOCS_MARKER: &str = "https://nodejs.org/api";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueTokens {
    pub type_name: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Name was written as `[name]`.
    pub optional: bool,
    /// Default from `[name=value]`.
    pub default: Option<String>,
}

/// Split a tag value into type, name and description.
pub fn tokenize(value: &str) -> ValueTokens {
    let tokens: Vec<&str> = RE_TOKEN.find_iter(value).map(|m| m.as_str()).collect();
    let mut rest = tokens.as_slice();
    let mut out = ValueTokens::default();

    if let Some(inner) = rest.first().and_then(|t| enclosed(t, '{', '}')) {
        out.type_name = non_empty(inner);
        rest = &rest[1..];
    }

    if let Some(&token) = rest.first() {
        if !token.starts_with('-') {
            if let Some(inner) = enclosed(token, '[', ']') {
                out.optional = true;
                match inner.split_once('=') {
                    Some((name, default)) => {
                        out.name = non_empty(name);
                        out.default = non_empty(default);
                    }
                    None => out.name = non_empty(inner),
                }
            } else if let Some(inner) = enclosed(token, '`', '`') {
                out.name = non_empty(inner);
            } else {
                out.name = non_empty(token);
            }
            rest = &rest[1..];
        }
    }

    let joined = rest.join(" ");
    out.description = non_empty(joined.strip_prefix('-').unwrap_or(&joined));
    out
}

/// Classify a `@requires` value into kind, name and description.
pub fn classify_requirement(value: &str) -> (RequireKind, Option<String>, Option<String>) {
    if value.contains(NODE_DOCS_MARKER) {
        // {@link https://nodejs.org/api/fs.html | fs}
        let name = value
            .split(" | ")
            .nth(1)
            .and_then(|s| non_empty(&s.replace('}', "")));
        let description = value
            .split("{@link ")
            .nth(1)
            .and_then(|s| s.split(" | ").next())
            .and_then(non_empty);
        return (RequireKind::NodeModule, name, description);
    }

    if let Some((prefix, target)) = value.split_once(':') {
        if prefix.contains("module") {
            let target = non_empty(target);
            return (RequireKind::Module, target.clone(), target);
        }
    }

    (RequireKind::Unknown, None, non_empty(value))
}

fn enclosed(token: &str, open: char, close: char) -> Option<&str> {
    if token.len() < 2 {
        return None;
    }
    token.strip_prefix(open)?.strip_suffix(close)
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
