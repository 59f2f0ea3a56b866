use figcap::figure::{transform, transform_page};
use std::path::Path;

const PICTURE: &str = r#"<picture><source srcset="/p/cat-800.webp 800w" type="image/webp"><img alt="Cat" src="/p/cat-800.jpeg"></picture>"#;

#[test]
fn picture_break_caption_becomes_figure() {
    let html = format!("<p>{PICTURE}<br><em>Caption</em></p>");
    assert_eq!(
        transform(&html).unwrap(),
        format!("<figure>{PICTURE}<figcaption>Caption</figcaption></figure>")
    );
}

#[test]
fn picture_then_caption_paragraph_becomes_figure() {
    let html = format!("<p>{PICTURE}</p>\n<p><em>Caption</em></p>");
    assert_eq!(
        transform(&html).unwrap(),
        format!("<figure>{PICTURE}<figcaption>Caption</figcaption></figure>\n")
    );
}

#[test]
fn caption_paragraph_directly_after_picture() {
    let html = format!("<p>{PICTURE}</p><p><em>Caption</em></p>");
    assert_eq!(
        transform(&html).unwrap(),
        format!("<figure>{PICTURE}<figcaption>Caption</figcaption></figure>")
    );
}

#[test]
fn existing_figures_are_returned_unchanged() {
    let html = format!("<figure>{PICTURE}<figcaption>X</figcaption></figure>");
    assert_eq!(transform(&html).unwrap(), html);
    let html = format!("<figure>{PICTURE}<figcaption>X</figcaption></figure>\n<p><em>aside</em></p>");
    assert_eq!(transform(&html).unwrap(), html);
}

#[test]
fn transform_is_idempotent() {
    let inputs = [
        format!("<p>{PICTURE}<br><em>One</em></p>\n<p>{PICTURE}</p>\n<p><em>Two</em></p>"),
        "<p><img src=\"/a.png\" alt=\"A\"><br>\n<em>Cap</em></p>".to_string(),
        "<section><img src=\"/a.png\" alt=\"A\"><p><em>Cap</em></p></section>".to_string(),
    ];
    for html in inputs {
        let once = transform(&html).unwrap();
        assert!(once.contains("<figcaption>"), "no figure for {html:?}");
        assert_eq!(transform(&once).unwrap(), once, "second pass changed {html:?}");
    }
}

#[test]
fn several_figures_in_one_page() {
    let html = format!("<p>{PICTURE}<br><em>One</em></p>\n<p>{PICTURE}</p>\n<p><em>Two</em></p>");
    let out = transform(&html).unwrap();
    assert_eq!(out.matches("<figure>").count(), 2);
    assert!(out.contains("<figcaption>One</figcaption>"));
    assert!(out.contains("<figcaption>Two</figcaption>"));
    assert!(!out.contains("<em>"));
}

#[test]
fn unmatched_documents_come_back_byte_for_byte() {
    let inputs = [
        "",
        "plain text",
        "<p>An <em>emphasised</em> word.</p>",
        "<p><img src=\"/a.png\" alt=\"A\"></p>\n<p>no caption</p>",
        "<p><IMG SRC=/a.png><em>same line, no break</em></p>",
        "<p><img src=\"/a.png\" alt=\"A\"><br><em>cap</em> trailing</p>",
        "<p><img src=\"/a.png\"> and text</p><p><em>cap</em></p>",
        "<div><p><em>unclosed <img src=x>",
        "<p><img src=\"/a.png\"><br><em></em></p>",
        "<p><img src=\"/a.png\" alt=\"A\"></p><p>Body text.</p><p><em>Cap</em></p>",
        "<p>Intro <img src=\"/a.png\" alt=\"A\"><br><em>Cap</em></p>",
    ];
    for html in inputs {
        assert_eq!(transform(html).unwrap(), html, "changed {html:?}");
    }
}

#[test]
fn caption_text_is_flattened_and_escaped() {
    let html = "<p><img src=\"/a.png\" alt=\"A\"><br><em>Tom &amp; <strong>Jerry</strong></em></p>";
    let out = transform(html).unwrap();
    assert!(out.contains("<figcaption>Tom &amp; Jerry</figcaption>"));
}

#[test]
fn pages_are_filtered_by_output_extension() {
    let html = format!("<p>{PICTURE}<br><em>Caption</em></p>");
    assert_eq!(transform_page(&html, Some(Path::new("sitemap.xml"))).unwrap(), html);
    assert_eq!(transform_page(&html, Some(Path::new("blog/index.HTML"))).unwrap(), transform(&html).unwrap());
}
