//! Comment extractor: finds every documentation block in a file.

use crate::model::{RawComment, SourceFile};
use crate::parser::tags;
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

/// Conventional `/** ... */` block, ending at the first `*/`.
pub const DEFAULT_BLOCK_PATTERN: &str = r"(?s)/\*\*.*?\*/";

static RE_DEFAULT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_BLOCK_PATTERN).unwrap());

/// Produces one `RawComment` per block matched by its pattern.
#[derive(Debug, Clone)]
pub struct Extractor {
    pattern: Regex,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(RE_DEFAULT_BLOCK.clone())
    }
}

impl Extractor {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    /// Build an extractor from a user-supplied block pattern.
    pub fn with_pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::new)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Extract all comment blocks from `source`. No match is not an error.
    pub fn extract(&self, source: &SourceFile) -> Vec<RawComment> {
        let file_path = source.path.to_string_lossy().to_string();
        let file_name = source
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file_path.clone());

        self.pattern
            .find_iter(&source.content)
            .map(|m| {
                let block = tags::parse(m.as_str());
                RawComment {
                    id: Uuid::new_v4(),
                    file_name: file_name.clone(),
                    file_path: file_path.clone(),
                    tags: block.tags,
                    body: block.description,
                    created_date: source.created,
                    modified_date: source.modified,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
/**
 * Adds numbers.
 * @param {number} a - left
 */
function add(a, b) { return a + b }

/* not a doc comment */
const x = 1 // @param {string} ignored

/** @summary Second */
"#;

    #[test]
    fn finds_each_block() {
        let source = SourceFile::new("src/math/add.ts", SOURCE);
        let comments = Extractor::default().extract(&source);
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].file_name, "add.ts");
        assert_eq!(comments[0].file_path, "src/math/add.ts");
        assert_eq!(comments[0].body, "Adds numbers.");
        assert_eq!(comments[0].tags.get("param").len(), 1);
        assert_eq!(comments[1].tags.first("summary"), Some("Second"));
        assert_ne!(comments[0].id, comments[1].id);
    }

    #[test]
    fn block_ends_at_first_closer() {
        let source = SourceFile::new("a.js", "/** @access public */ code(); /** @access private */");
        let comments = Extractor::default().extract(&source);
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].tags.first("access"), Some("public"));
        assert_eq!(comments[1].tags.first("access"), Some("private"));
    }

    #[test]
    fn no_blocks_is_empty() {
        let source = SourceFile::new("empty.ts", "export const a = 1;\n");
        assert!(Extractor::default().extract(&source).is_empty());
    }

    #[test]
    fn custom_pattern() {
        let extractor = Extractor::with_pattern(r"(?s)\{-\*.*?-\}").unwrap();
        let source = SourceFile::new("x.hs", "{-*\n * @summary Haskell style\n-}");
        let comments = extractor.extract(&source);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].tags.first("summary"), Some("Haskell style"));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(Extractor::with_pattern("(unclosed").is_err());
    }

    #[test]
    fn timestamps_come_from_source() {
        let source = SourceFile::new("a.ts", "/** @access public */");
        let comments = Extractor::default().extract(&source);
        assert_eq!(comments[0].created_date, source.created);
        assert_eq!(comments[0].modified_date, source.modified);
    }
}
