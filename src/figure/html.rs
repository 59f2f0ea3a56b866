//! Render-time figure normalization over finished html.
//!
//! Runs after image optimization, which may have turned `<img>` into
//! `<picture>`, so both shapes are handled:
//!
//! ```html
//! <p><picture>…</picture><br><em>Caption</em></p>
//! <p><img src="…"></p>
//! <p><em>Caption</em></p>
//! ```
//!
//! become `<figure><picture>…</picture><figcaption>Caption</figcaption></figure>`
//! (resp. the `<img>`). Media already inside a `<figure>` is skipped, which
//! makes the pass idempotent. Pages without a match come back byte-for-byte.

use std::path::Path;

use kuchiki::NodeRef;
use kuchiki::traits::TendrilSink;
use tracing::{debug, trace};

use super::caption_text;

/// Errors from the figure html transform.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// A hardcoded selector was rejected by the selector parser
    #[error("Invalid selector `{0}`")]
    Selector(&'static str),

    #[error("Failed to serialize HTML: {0}")]
    Serialize(#[from] std::io::Error),

    #[error("Serialized HTML is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Transform a rendered output file. Anything that is not written to an
/// `.html` path is returned as is.
pub fn transform_page(content: &str, output_path: Option<&Path>) -> Result<String, TransformError> {
    let is_html = output_path
        .and_then(Path::extension)
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html"));
    if !is_html {
        return Ok(content.to_string());
    }
    transform(content)
}

/// Wrap `<picture>`/`<img>` + italic caption into `<figure>`/`<figcaption>`.
pub fn transform(html: &str) -> Result<String, TransformError> {
    // Fast path: nothing can match without an <em> and some media
    let lower = html.to_ascii_lowercase();
    if !lower.contains("<em") || !(lower.contains("<img") || lower.contains("<picture")) {
        return Ok(html.to_string());
    }

    let document = kuchiki::parse_html().one(html.to_string());
    let mut changed = 0usize;

    // Collect first: wrapping moves nodes around while we go
    let pictures = select_all(&document, "picture")?;
    for picture in &pictures {
        if !is_attached(picture, &document) || has_ancestor(picture, &["figure"]) {
            continue;
        }
        if wrap_media(picture)? {
            changed += 1;
        }
    }

    let images = select_all(&document, "img")?;
    for img in &images {
        if !is_attached(img, &document) || has_ancestor(img, &["figure", "picture"]) {
            continue;
        }
        if wrap_media(img)? {
            changed += 1;
        }
    }

    if changed == 0 {
        return Ok(html.to_string());
    }
    debug!(figures = changed, "wrapped captioned media into figures");
    serialize(&document, is_full_document(&lower))
}

/// Try both caption placements for one media element.
fn wrap_media(media: &NodeRef) -> Result<bool, TransformError> {
    if wrap_same_paragraph(media)? {
        return Ok(true);
    }
    wrap_following_paragraph(media)
}

/// `<p>MEDIA<br><em>caption</em></p>`: the figure replaces the paragraph.
fn wrap_same_paragraph(media: &NodeRef) -> Result<bool, TransformError> {
    let Some(parent) = media.parent() else {
        return Ok(false);
    };
    if !is_tag(&parent, "p") || previous_significant(media).is_some() {
        return Ok(false);
    }
    let Some(br) = next_significant(media).filter(|n| is_tag(n, "br")) else {
        return Ok(false);
    };
    let Some(em) = next_significant(&br).filter(|n| is_tag(n, "em")) else {
        return Ok(false);
    };
    // the caption has to be all that is left of the paragraph
    if next_significant(&em).is_some() {
        return Ok(false);
    }
    let Some(caption) = caption_text(&em.text_contents()) else {
        trace!("same-paragraph caption is blank");
        return Ok(false);
    };

    let figure = new_figure(&caption)?;
    parent.insert_before(figure.clone());
    figure.prepend(media.clone());
    parent.detach();
    Ok(true)
}

/// MEDIA followed by `<p><em>caption</em></p>`, the media either standing
/// alone or wrapped in a paragraph of its own.
fn wrap_following_paragraph(media: &NodeRef) -> Result<bool, TransformError> {
    let parent = media.parent();
    let next = match next_significant(media) {
        Some(n) => Some(n),
        None => parent.as_ref().and_then(next_significant),
    };
    let Some(caption_p) = next.filter(|n| is_tag(n, "p")) else {
        return Ok(false);
    };
    let Some(caption) = sole_emphasis(&caption_p).and_then(|em| caption_text(&em.text_contents()))
    else {
        return Ok(false);
    };

    if let Some(parent) = parent.filter(|p| is_tag(p, "p")) {
        let only_media = significant_children(&parent).all(|c| &c == media);
        if !only_media {
            trace!("media shares its paragraph with other content, not wrapping");
            return Ok(false);
        }
        unwrap(&parent);
    }

    let figure = new_figure(&caption)?;
    media.insert_before(figure.clone());
    figure.prepend(media.clone());
    caption_p.detach();
    Ok(true)
}

/// The single `<em>` of a paragraph that holds nothing else.
fn sole_emphasis(p: &NodeRef) -> Option<NodeRef> {
    let mut children = significant_children(p);
    let first = children.next()?;
    if children.next().is_some() || !is_tag(&first, "em") {
        return None;
    }
    Some(first)
}

/// `<figure><figcaption>caption</figcaption></figure>`, detached and ready
/// to receive the media as its first child.
fn new_figure(caption: &str) -> Result<NodeRef, TransformError> {
    let scratch = kuchiki::parse_html().one("<figure><figcaption></figcaption></figure>");
    let figure = scratch
        .select_first("figure")
        .map_err(|()| TransformError::Selector("figure"))?
        .as_node()
        .clone();
    let figcaption = figure
        .select_first("figcaption")
        .map_err(|()| TransformError::Selector("figcaption"))?
        .as_node()
        .clone();
    figcaption.append(NodeRef::new_text(caption));
    figure.detach();
    Ok(figure)
}

/// Replace `node` by its children.
fn unwrap(node: &NodeRef) {
    let children: Vec<NodeRef> = node.children().collect();
    for child in children {
        node.insert_before(child);
    }
    node.detach();
}

fn select_all(document: &NodeRef, selector: &'static str) -> Result<Vec<NodeRef>, TransformError> {
    let found = document
        .select(selector)
        .map_err(|()| TransformError::Selector(selector))?
        .map(|el| el.as_node().clone())
        .collect();
    Ok(found)
}

fn is_tag(node: &NodeRef, tag: &str) -> bool {
    node.as_element().is_some_and(|el| &*el.name.local == tag)
}

fn has_ancestor(node: &NodeRef, tags: &[&str]) -> bool {
    node.ancestors().any(|a| tags.iter().any(|t| is_tag(&a, t)))
}

/// Earlier rewrites may have detached a candidate along with its container.
fn is_attached(node: &NodeRef, document: &NodeRef) -> bool {
    node.ancestors().any(|a| &a == document)
}

/// Whitespace-only text and comments do not count as content.
fn is_significant(node: &NodeRef) -> bool {
    if let Some(text) = node.as_text() {
        return !text.borrow().trim().is_empty();
    }
    node.as_comment().is_none()
}

fn next_significant(node: &NodeRef) -> Option<NodeRef> {
    node.following_siblings().find(is_significant)
}

fn previous_significant(node: &NodeRef) -> Option<NodeRef> {
    node.preceding_siblings().find(is_significant)
}

fn significant_children(node: &NodeRef) -> impl Iterator<Item = NodeRef> {
    node.children().filter(is_significant)
}

/// Expects lowercased input.
fn is_full_document(html: &str) -> bool {
    html.trim_start().starts_with("<!doctype") || html.contains("<html")
}

/// Serialize the whole document, or for fragments only what the parser put
/// into `<head>` and `<body>`, so no wrapper elements are invented.
fn serialize(document: &NodeRef, full: bool) -> Result<String, TransformError> {
    let mut output = Vec::new();
    if full {
        document.serialize(&mut output)?;
    } else {
        for container in ["head", "body"] {
            let Ok(el) = document.select_first(container) else {
                continue;
            };
            for child in el.as_node().children() {
                child.serialize(&mut output)?;
            }
        }
    }
    Ok(String::from_utf8(output)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picture_with_break_caption() {
        let html = r#"<p><picture><source srcset="/c.webp"><img src="/c.jpg" alt="Cat"></picture><br><em>Caption</em></p>"#;
        let out = transform(html).unwrap();
        assert_eq!(
            out,
            r#"<figure><picture><source srcset="/c.webp"><img alt="Cat" src="/c.jpg"></picture><figcaption>Caption</figcaption></figure>"#
        );
    }

    #[test]
    fn img_with_following_caption_paragraph() {
        let html = "<p><img src=\"/a.png\" alt=\"A\"></p>\n<p><em>Cap</em></p>\n";
        let out = transform(html).unwrap();
        assert_eq!(out, "<figure><img alt=\"A\" src=\"/a.png\"><figcaption>Cap</figcaption></figure>\n\n");
    }

    #[test]
    fn bare_img_followed_by_caption() {
        let html = "<div><img src=\"/a.png\" alt=\"A\">\n<p><em>Cap</em></p></div>";
        let out = transform(html).unwrap();
        assert_eq!(out, "<div><figure><img alt=\"A\" src=\"/a.png\"><figcaption>Cap</figcaption></figure>\n</div>");
    }

    #[test]
    fn existing_figure_is_untouched() {
        let html = "<figure><picture><img src=\"/a.png\" alt=\"A\"></picture><figcaption>X</figcaption></figure>\n<p><em>later</em></p>";
        assert_eq!(transform(html).unwrap(), html);
    }

    #[test]
    fn blank_caption_is_untouched() {
        let html = "<p><img src=\"/a.png\" alt=\"A\"><br><em>  </em></p>";
        assert_eq!(transform(html).unwrap(), html);
    }

    #[test]
    fn caption_paragraph_with_extra_text_is_untouched() {
        let html = "<p><img src=\"/a.png\" alt=\"A\"></p><p>see <em>this</em> here</p>";
        assert_eq!(transform(html).unwrap(), html);
    }

    #[test]
    fn text_before_media_is_not_dropped() {
        let html = "<p>Intro <img src=\"/a.png\" alt=\"A\"><br><em>Cap</em></p>";
        assert_eq!(transform(html).unwrap(), html);
    }

    #[test]
    fn adjacent_caption_paragraph_without_whitespace() {
        let html = "<p><img src=\"/a.png\" alt=\"A\"></p><p><em>Cap</em></p>";
        let out = transform(html).unwrap();
        assert_eq!(out, "<figure><img alt=\"A\" src=\"/a.png\"><figcaption>Cap</figcaption></figure>");
    }

    #[test]
    fn caption_two_paragraphs_away_is_not_pulled_in() {
        let html = "<p><img src=\"/a.png\" alt=\"A\"></p><p>Body text.</p><p><em>Cap</em></p>";
        assert_eq!(transform(html).unwrap(), html);
    }

    #[test]
    fn uppercase_markup_is_transformed() {
        let html = "<P><IMG SRC=\"/a.png\" ALT=\"A\"><BR><EM>cap</EM></P>";
        let out = transform(html).unwrap();
        assert_eq!(out, "<figure><img alt=\"A\" src=\"/a.png\"><figcaption>cap</figcaption></figure>");
    }

    #[test]
    fn non_html_output_paths_are_skipped() {
        let html = "<p><img src=\"/a.png\" alt=\"A\"><br><em>Cap</em></p>";
        let out = transform_page(html, Some(Path::new("feed.xml"))).unwrap();
        assert_eq!(out, html);
        let out = transform_page(html, None).unwrap();
        assert_eq!(out, html);
        let out = transform_page(html, Some(Path::new("_site/post/index.html"))).unwrap();
        assert!(out.starts_with("<figure>"));
    }

    #[test]
    fn full_documents_keep_their_shell() {
        let html = "<!DOCTYPE html><html><head><title>t</title></head><body><p><img src=\"/a.png\" alt=\"A\"><br><em>Cap</em></p></body></html>";
        let out = transform(html).unwrap();
        assert_eq!(
            out,
            "<!DOCTYPE html><html><head><title>t</title></head><body><figure><img alt=\"A\" src=\"/a.png\"><figcaption>Cap</figcaption></figure></body></html>"
        );
    }
}
