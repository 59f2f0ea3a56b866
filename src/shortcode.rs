//! The `figure-image` shortcode for hand-placed figures in templates.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::figure::caption_text;

/// `<figure>` with a lazily loaded image and, when the caption is not blank,
/// a `<figcaption>`. The output already sits inside a figure, so the html
/// transform leaves it alone.
pub fn figure_image(src: &str, alt: &str, caption: Option<&str>) -> String {
    let mut html = format!(
        "<figure>\n  <img src=\"{}\" alt=\"{}\" loading=\"lazy\" decoding=\"async\">",
        encode_double_quoted_attribute(src),
        encode_double_quoted_attribute(alt),
    );
    if let Some(caption) = caption.and_then(caption_text) {
        html.push_str("\n  <figcaption>");
        html.push_str(&encode_text(&caption));
        html.push_str("</figcaption>");
    }
    html.push_str("\n</figure>");
    html
}
