//! Tag parser: turns one comment block into a tag table.
//!
//! Line-oriented: a line containing `@word <text>` is a tag occurrence,
//! a `* text` line without a tag is free-text description, anything else
//! (delimiters, blank `*` lines) is ignored.

use crate::model::{TagOccurrence, TagTable};
use regex::Regex;
use std::sync::LazyLock;

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@(\w+)\s+(.+)").unwrap());

static RE_TEXT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\s+(.+)").unwrap());

/// Result of parsing one comment block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBlock {
    pub tags: TagTable,
    /// Free text from untagged lines, trimmed.
    pub description: String,
}

/// Parse a comment block, delimiters and leading `*` included.
pub fn parse(comment: &str) -> ParsedBlock {
    let mut tags = TagTable::default();
    let mut description = String::new();

    for line in comment.lines() {
        if let Some(caps) = RE_TAG.captures(line) {
            tags.push(TagOccurrence {
                line: caps[0].to_string(),
                tag_name: caps[1].to_string(),
                description: tag_value(&caps[2]),
            });
        } else if let Some(caps) = RE_TEXT.captures(line) {
            let text = tag_value(&caps[1]);
            if !text.is_empty() {
                description.push_str(&text);
                description.push('\n');
            }
        }
    }

    ParsedBlock {
        tags,
        description: description.trim().to_string(),
    }
}

/// Trim the value and drop a closing `*/` left by single-line blocks.
fn tag_value(raw: &str) -> String {
    let value = raw.trim();
    value
        .strip_suffix("*/")
        .map(str::trim_end)
        .unwrap_or(value)
        .to_string()
}
