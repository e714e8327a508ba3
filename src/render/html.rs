//! HTML renderer: standalone page built from the element tree.
//!
//! Each element becomes the tag for its kind, `domId` becomes `id`, and the
//! remaining attributes become `data-*` attributes.

use crate::config::HtmlSettings;
use crate::elements::{MAIN, NAV_HEADER};
use crate::model::*;
use crate::render::{Renderer, Site};
use anyhow::Result;

pub struct HtmlRenderer;

const DEFAULT_CSS: &str = "\
body { font-family: system-ui, sans-serif; margin: 0; color: #1a1a1a; }
header { background: #1f2933; color: white; padding: 1em 2em; }
header ul { list-style: none; margin: 0; padding: 0; display: flex; gap: 1em; }
header a { color: white; }
main { max-width: 60em; margin: 2em auto; padding: 0 1em; }
[data-role=\"container\"] { border-bottom: 1px solid #e4e7eb; padding-bottom: 2em; }
[data-role=\"tab-strip-nav\"] ul { list-style: none; display: flex; gap: 0.75em; padding: 0; }
[data-role=\"content\"] { margin-top: 1.5em; }
[data-role=\"kind\"] { font-size: 0.8em; text-transform: uppercase; color: #52606d; }
[data-role=\"error\"] { background: #fde8e8; color: #9b1c1c; padding: 0.5em; }
code { background: #f4f4f4; padding: 0.15em 0.3em; border-radius: 3px; }
";

impl Renderer for HtmlRenderer {
    fn render(&self, site: &Site<'_>) -> Result<String> {
        let mut out = String::new();

        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        out.push_str(&render_head(site.title, site.html));
        out.push_str("</head>\n");

        if site.html.body_classes.is_empty() {
            out.push_str("<body>\n");
        } else {
            out.push_str(&format!(
                "<body class=\"{}\">\n",
                html_escape(&site.html.body_classes.join(" "))
            ));
        }

        out.push_str("<header>\n");
        out.push_str(&format!("<h1>{}</h1>\n", html_escape(site.title)));
        out.push_str(&format!("<nav data-role=\"{}\">\n<ul>\n", NAV_HEADER));
        for node in top_level(site.elements, NAV_HEADER) {
            render_element(&mut out, node, 1);
        }
        out.push_str("</ul>\n</nav>\n</header>\n");

        out.push_str(&format!("<main data-role=\"{}\">\n", MAIN));
        if site.elements.is_empty() {
            out.push_str("<p>No documented namespaces found.</p>\n");
        }
        for node in top_level(site.elements, MAIN) {
            render_element(&mut out, node, 1);
        }
        out.push_str("</main>\n</body>\n</html>\n");
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "html"
    }
}

/// Nodes attached directly to one of the fixed page regions.
fn top_level<'a>(
    groups: &'a [ElementGroup],
    parent: &'a str,
) -> impl Iterator<Item = &'a ElementNode> + 'a {
    groups
        .iter()
        .flat_map(|g| &g.nodes)
        .filter(move |n| n.parent_id.as_deref() == Some(parent))
}

fn render_head(title: &str, html: &HtmlSettings) -> String {
    let mut out = format!("<title>{}</title>\n", html_escape(title));
    for meta in &html.meta {
        out.push_str(&format!("<meta {} />\n", meta));
    }
    for script in &html.scripts {
        out.push_str(&format!("<script src=\"{}\"></script>\n", html_escape(script)));
    }
    for style in &html.styles {
        out.push_str(&format!(
            "<link rel=\"stylesheet\" href=\"{}\" />\n",
            html_escape(style)
        ));
    }
    out.push_str("<style>\n");
    out.push_str(html.inline_css.as_deref().unwrap_or(DEFAULT_CSS));
    out.push_str("</style>\n");
    out
}

fn render_element(out: &mut String, node: &ElementNode, depth: usize) {
    let indent = "  ".repeat(depth);
    let tag = node.kind.tag_name();
    let attrs = &node.attributes;

    out.push_str(&format!("{}<{}", indent, tag));
    if let Some(ref id) = attrs.dom_id {
        out.push_str(&format!(" id=\"{}\"", html_escape(id)));
    }
    out.push_str(&format!(" data-role=\"{}\"", html_escape(&attrs.role)));
    for (name, value) in [("group", &attrs.group), ("sub-group", &attrs.sub_group)] {
        if let Some(value) = value {
            out.push_str(&format!(" data-{}=\"{}\"", name, html_escape(value)));
        }
    }
    if node.kind == ElementKind::NavLink {
        if let Some(ref value) = attrs.value {
            out.push_str(&format!(" data-value=\"{}\"", html_escape(value)));
        }
    }
    out.push('>');

    if let Some(ref value) = attrs.value {
        match link_target(node) {
            Some(target) => out.push_str(&format!(
                "<a href=\"#{}\">{}</a>",
                html_escape(&target),
                html_escape(value)
            )),
            None => out.push_str(&html_escape(value)),
        }
    }

    if !node.children.is_empty() {
        // List items need a list around them.
        let wrap = tag != "ul" && node.children.iter().any(|c| c.kind.tag_name() == "li");
        out.push('\n');
        if wrap {
            out.push_str(&format!("{}  <ul>\n", indent));
        }
        for child in &node.children {
            render_element(out, child, depth + if wrap { 2 } else { 1 });
        }
        if wrap {
            out.push_str(&format!("{}  </ul>\n", indent));
        }
        out.push_str(&indent);
    }
    out.push_str(&format!("</{}>\n", tag));
}

/// Anchor a navigation link points at.
///
/// `<..>--<root>--nav` opens the root's container, `<..>--tab` its panel.
fn link_target(node: &ElementNode) -> Option<String> {
    if node.kind != ElementKind::NavLink {
        return None;
    }
    let id = node.attributes.dom_id.as_deref()?;
    let (rest, last) = id.rsplit_once("--")?;
    match last {
        "nav" => rest
            .rsplit("--")
            .next()
            .map(|root| format!("{}--container", root)),
        "tab" => Some(format!("{}--content", rest)),
        _ => None,
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
