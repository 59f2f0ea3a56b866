//! Image + italic caption detection, at markdown time (`tokens`) and over
//! rendered html (`html`).

pub mod html;
pub mod tokens;

pub use html::{TransformError, transform, transform_page};
pub use tokens::{rewrite_events, rewrite_figures};

/// Zero-width characters that render as nothing but survive `str::trim`.
const INVISIBLE: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}'];

/// Trim a raw caption. Blank captions (whitespace or zero-width characters
/// only) yield `None`, so `*​*` under an image is left alone.
pub fn caption_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.chars().all(|c| c.is_whitespace() || INVISIBLE.contains(&c)) {
        return None;
    }
    Some(trimmed.to_string())
}
