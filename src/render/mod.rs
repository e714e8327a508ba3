//! Renderer module — trait-based format dispatch.

pub mod html;
pub mod json;
pub mod markdown;

use crate::config::HtmlSettings;
use crate::link::Linked;
use crate::model::ElementGroup;
use anyhow::{anyhow, Result};

/// Everything a renderer may draw from.
pub struct Site<'a> {
    pub title: &'a str,
    pub linked: &'a Linked,
    pub elements: &'a [ElementGroup],
    pub html: &'a HtmlSettings,
}

/// Trait for rendering a `Site` into a specific output format.
pub trait Renderer {
    fn render(&self, site: &Site<'_>) -> Result<String>;
    fn file_extension(&self) -> &str;
}

/// Create a renderer for the given format name.
pub fn create_renderer(format: &str) -> Result<Box<dyn Renderer>> {
    match format {
        "html" => Ok(Box::new(html::HtmlRenderer)),
        "json" => Ok(Box::new(json::JsonRenderer)),
        "markdown" | "md" => Ok(Box::new(markdown::MarkdownRenderer)),
        _ => Err(anyhow!(
            "unknown format: {}. Use html, json, or markdown",
            format
        )),
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    use super::*;
    use crate::link::link;
    use crate::model::SourceFile;
    use crate::parser::Extractor;

    pub fn linked() -> Linked {
        let extractor = Extractor::default();
        let raw = [
            (
                "src/lib.ts",
                "/**\n * @namespace {Lib}\n * @module Lib.Core\n * @summary Core <library>\n * @version 1.0.0\n */",
            ),
            (
                "src/parse.ts",
                "/**\n * @type {function} parse\n * @memberof module:Lib.Core\n * @summary Parse input\n * @param {string} input - source text\n * @returns {Ast} - the tree\n * @requires {@link https://nodejs.org/api/fs.html | fs}\n */",
            ),
        ]
        .iter()
        .flat_map(|(p, c)| extractor.extract(&SourceFile::new(*p, *c)))
        .collect();
        link(raw).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_formats() {
        assert_eq!(create_renderer("html").unwrap().file_extension(), "html");
        assert_eq!(create_renderer("json").unwrap().file_extension(), "json");
        assert_eq!(create_renderer("md").unwrap().file_extension(), "md");
        assert_eq!(create_renderer("markdown").unwrap().file_extension(), "md");
    }

    #[test]
    fn unknown_format() {
        let err = create_renderer("xml").err().unwrap();
        assert!(err.to_string().contains("unknown format"));
    }
}
