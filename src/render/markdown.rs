//! GitHub-flavored markdown renderer.
//!
//! One `##` section per root item with an index on top; the comments linked
//! beneath a root follow as `###` subsections.

use crate::elements::{describe_param, describe_requirement};
use crate::link::Linked;
use crate::model::*;
use crate::render::{Renderer, Site};
use crate::slug;
use anyhow::Result;
use std::collections::HashSet;

pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, site: &Site<'_>) -> Result<String> {
        let linked = site.linked;
        let mut output = format!("# {}\n\n", escape(site.title));

        let roots: Vec<&ProcessedComment> = linked.root_items().collect();
        if roots.is_empty() {
            output.push_str("_No documented namespaces found._\n\n");
        } else {
            output.push_str("## Index\n\n");
            for root in &roots {
                output.push_str(&format!("* {}\n", slug::anchor_link(&root_title(root))));
            }
            output.push('\n');
        }

        let mut shown: HashSet<CommentId> = HashSet::new();
        for root in &roots {
            render_tree(linked, root, &root_title(root), 2, &mut shown, &mut output);
        }

        let unattached: Vec<&ProcessedComment> = linked
            .processed
            .iter()
            .filter(|c| !shown.contains(&c.id))
            .collect();
        if !unattached.is_empty() {
            output.push_str("## Unattached\n\n");
            for comment in unattached {
                render_tree(linked, comment, &comment.label(), 3, &mut shown, &mut output);
            }
        }

        Ok(output)
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

/// Render `c` and, one level deeper, everything linked beneath it.
/// Each comment is printed once.
fn render_tree(
    linked: &Linked,
    c: &ProcessedComment,
    title: &str,
    level: usize,
    shown: &mut HashSet<CommentId>,
    output: &mut String,
) {
    if !shown.insert(c.id) {
        return;
    }
    output.push_str(&render_section(c, title, level));
    for edge in &c.children {
        if let Some(child) = linked.get(edge.id) {
            render_tree(linked, child, &child.label(), level + 1, shown, output);
        }
    }
}

fn root_title(root: &ProcessedComment) -> String {
    root.namespaces
        .first()
        .cloned()
        .unwrap_or_else(|| root.label())
}

/// Render one comment under a heading of the given level.
fn render_section(c: &ProcessedComment, title: &str, level: usize) -> String {
    let mut lines: Vec<String> = vec![format!("{} {}\n", heading(level), escape(title))];

    let badges = render_badges(c);
    if !badges.is_empty() {
        lines.push(badges);
        lines.push(String::new());
    }

    for text in [&c.summary, &c.description, &c.body].into_iter().flatten() {
        lines.push(text.clone());
        lines.push(String::new());
    }

    let sub = heading(level + 1);
    let lists: [(&str, Vec<String>); 7] = [
        ("Parameters", c.props.iter().map(describe_param).collect()),
        ("Arguments", c.arguments.iter().map(describe_param).collect()),
        ("Returns", c.returns.iter().map(describe_return).collect()),
        ("Requires", c.requires.iter().map(describe_requirement).collect()),
        ("Changelog", c.changelog.clone()),
        ("Todo", c.todo.clone()),
        ("Known bugs", c.bug.clone()),
    ];
    for (heading, items) in lists {
        if items.is_empty() {
            continue;
        }
        lines.push(format!("{} {}\n", sub, heading));
        for item in items {
            lines.push(format!("* {}", item.replace('\n', "\n  ")));
        }
        lines.push(String::new());
    }

    for example in &c.example {
        lines.push(format!("{} Example\n", sub));
        lines.push("```js".to_string());
        lines.push(example.clone());
        lines.push("```".to_string());
        lines.push(String::new());
    }

    lines.push(String::new());
    lines.join("\n")
}

fn describe_return(p: &ParamEntry) -> String {
    match (&p.type_name, &p.description) {
        (Some(ty), Some(desc)) => format!("`{}`: {}", ty, desc),
        (Some(ty), None) => format!("`{}`", ty),
        (None, Some(desc)) => desc.clone(),
        (None, None) => describe_param(p),
    }
}

/// `> `function` `v1.0.0` `module:Lib.Core`` style line.
fn render_badges(c: &ProcessedComment) -> String {
    let mut badges: Vec<String> = Vec::new();
    if let Some(kind) = c.kind() {
        badges.push(format!("`{}`", kind));
    }
    if let Some(ref access) = c.access {
        badges.push(format!("*`{}`*", access));
    }
    if let Some(ref version) = c.version {
        badges.push(format!("`v{}`", version.trim_start_matches('v')));
    }
    if let Some(ref since) = c.since {
        badges.push(format!("`since {}`", since));
    }
    for module in &c.modules {
        badges.push(format!("`module:{}`", module));
    }
    if let Some(ref author) = c.author {
        badges.push(format!("by {}", author));
    }

    if badges.is_empty() {
        return String::new();
    }
    format!("> {}", badges.join(" "))
}

/// Markdown stops at `######`.
fn heading(level: usize) -> String {
    "#".repeat(level.clamp(1, 6))
}

fn escape(text: &str) -> String {
    text.replace('<', "\\<").replace('>', "\\>")
}
