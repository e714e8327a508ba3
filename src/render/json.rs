//! JSON renderer: the linked record set as one document.
//!
//! Useful for custom rendering pipelines and tooling integration.

use crate::model::*;
use crate::render::{Renderer, Site};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub struct JsonRenderer;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDoc<'a> {
    title: &'a str,
    generated: DateTime<Utc>,
    files: &'a Registry<FileRecord>,
    namespaces: &'a Registry<Namespace>,
    modules: &'a Registry<Module>,
    comments: &'a [ProcessedComment],
    elements: &'a [ElementGroup],
}

impl Renderer for JsonRenderer {
    fn render(&self, site: &Site<'_>) -> Result<String> {
        let registries = &site.linked.registries;
        let doc = JsonDoc {
            title: site.title,
            generated: Utc::now(),
            files: &registries.files,
            namespaces: &registries.namespaces,
            modules: &registries.modules,
            comments: &site.linked.processed,
            elements: site.elements,
        };
        let mut out = serde_json::to_string_pretty(&doc).context("failed to serialize docs")?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}
