//! Template filters built on the markdown renderer.

use std::sync::LazyLock;

use regex::Regex;

use crate::markdown::MarkdownRenderer;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("TAG_RE: hardcoded regex is valid"));

/// Render block markdown.
pub fn markdown(renderer: &MarkdownRenderer, content: &str) -> String {
    renderer.render(content)
}

/// Render markdown without the wrapping paragraph.
pub fn markdown_inline(renderer: &MarkdownRenderer, content: &str) -> String {
    renderer.render_inline(content)
}

/// Typographic quotes and dashes for plain text such as titles.
pub fn smart_quotes(renderer: &MarkdownRenderer, content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }
    renderer.render_inline(content)
}

/// Drop every tag and keep the text between them. Used on titles that end up
/// inside an anchor, where an autolinked domain would nest links.
pub fn strip_html(content: &str) -> String {
    TAG_RE.replace_all(content, "").into_owned()
}
