//! Anchor and DOM id generation.

/// GitHub heading anchor slug, used for markdown cross links.
///
/// - lowercase
/// - drop everything that isn't alphanumeric, space or hyphen
/// - spaces become hyphens
pub fn github_slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

/// Markdown link to the heading generated for `text`.
pub fn anchor_link(text: &str) -> String {
    format!("[{}](#{})", text, github_slug(text))
}

/// Identifier safe for an HTML `id` attribute.
///
/// Runs of non-alphanumeric characters collapse into one `-`, so
/// `build-docs.JsonToUi` becomes `build-docs-jsontoui`. The result never
/// contains `--`, which element ids use as their separator.
pub fn dom_id(text: &str) -> String {
    let mut id = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_alphanumeric() {
            id.push(c);
        } else if !id.ends_with('-') && !id.is_empty() {
            id.push('-');
        }
    }
    let id = id.trim_end_matches('-');
    if id.is_empty() {
        "item".to_string()
    } else {
        id.to_string()
    }
}
