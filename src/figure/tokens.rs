//! Markdown-time figure rewriting.
//!
//! Two authoring patterns are recognized:
//!
//! ```markdown
//! ![Cat](/img/cat.png)
//! *A sleeping cat*
//! ```
//!
//! (image, line break and emphasis in one paragraph) and the same with a
//! blank line in between (an image-only paragraph followed by an
//! emphasis-only paragraph). Both become a single `Block::Figure`.
//!
//! The stream is rebuilt in one forward walk rather than spliced in place:
//! unmatched blocks are moved over as they are and matched runs are replaced
//! by the figure.

use pulldown_cmark::Event;
use tracing::{debug, trace};

use super::caption_text;
use crate::ast::{Block, Figure, Inline, blocks_to_events, parse_events_to_blocks, parse_inlines};

/// Rewrite a token stream, returning the new stream.
pub fn rewrite_events(events: Vec<Event<'static>>) -> Vec<Event<'static>> {
    blocks_to_events(rewrite_figures(parse_events_to_blocks(events)))
}

/// Replace every image + caption run in `blocks` with a `Block::Figure`.
pub fn rewrite_figures(blocks: Vec<Block>) -> Vec<Block> {
    let mut out: Vec<Block> = Vec::with_capacity(blocks.len());
    let mut rewritten = 0usize;
    let mut iter = blocks.into_iter().peekable();

    while let Some(block) = iter.next() {
        let Block::Paragraph(inner) = block else {
            out.push(block);
            continue;
        };
        let Some(inlines) = parse_inlines(&inner) else {
            out.push(Block::Paragraph(inner));
            continue;
        };

        if let Some(fig) = single_paragraph_figure(&inlines) {
            out.push(Block::Figure(fig));
            rewritten += 1;
            continue;
        }

        if let [image] = inlines.as_slice()
            && image.is_image()
        {
            let caption = match iter.peek() {
                Some(Block::Paragraph(next)) => parse_inlines(next)
                    .as_deref()
                    .and_then(caption_paragraph),
                _ => None,
            };
            if let Some(caption) = caption {
                iter.next();
                out.push(Block::Figure(Figure {
                    image: image.clone(),
                    caption,
                }));
                rewritten += 1;
                continue;
            }
        }

        out.push(Block::Paragraph(inner));
    }

    if rewritten > 0 {
        debug!(figures = rewritten, "rewrote image captions into figures");
    }
    out
}

/// `![alt](src)` + line break + caption, where the caption opens and closes
/// with emphasis. Text between several emphasis runs is kept, so
/// `*one* *two*` reads "one two".
fn single_paragraph_figure(inlines: &[Inline]) -> Option<Figure> {
    let [image, brk, caption @ ..] = inlines else {
        return None;
    };
    if !image.is_image() || !brk.is_break() {
        return None;
    }
    let emphasised = |inl: Option<&Inline>| matches!(inl, Some(Inline::Emphasis(_)));
    if !emphasised(caption.first()) || !emphasised(caption.last()) {
        return None;
    }
    let raw: String = caption.iter().map(Inline::plain_text).collect();
    let Some(caption) = caption_text(&raw) else {
        trace!("image followed by a blank caption, leaving paragraph alone");
        return None;
    };
    Some(Figure {
        image: image.clone(),
        caption,
    })
}

/// A paragraph made of exactly one emphasis run with non-blank text.
fn caption_paragraph(inlines: &[Inline]) -> Option<String> {
    match inlines {
        [em @ Inline::Emphasis(_)] => caption_text(&em.plain_text()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::{Parser, Tag};

    fn blocks(md: &str) -> Vec<Block> {
        let events = Parser::new(md).map(|e| e.into_static()).collect();
        rewrite_figures(parse_events_to_blocks(events))
    }

    fn figures(blocks: &[Block]) -> Vec<&Figure> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Figure(f) => Some(f),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn same_paragraph_caption() {
        let out = blocks("![Cat](/img/cat.png)\n*A sleeping cat*\n");
        assert_eq!(out.len(), 1);
        let fig = figures(&out)[0];
        assert_eq!(fig.caption, "A sleeping cat");
        assert!(matches!(&fig.image, Inline::Image { dest, .. } if dest == "/img/cat.png"));
    }

    #[test]
    fn following_paragraph_caption() {
        let out = blocks("![Cat](/img/cat.png)\n\n*A sleeping cat*\n");
        assert_eq!(out.len(), 1);
        assert_eq!(figures(&out)[0].caption, "A sleeping cat");
    }

    #[test]
    fn both_patterns_build_the_same_figure() {
        let a = blocks("![Cat](/img/cat.png)\n*A sleeping cat*\n");
        let b = blocks("![Cat](/img/cat.png)\n\n_A sleeping cat_\n");
        assert_eq!(figures(&a), figures(&b));
    }

    #[test]
    fn blank_captions_are_not_wrapped() {
        for md in ["![a](b)\n**_**\n", "![a](b)\n\n*\u{200B}*\n", "![a](b)\n* *\n"] {
            let out = blocks(md);
            assert!(figures(&out).is_empty(), "wrapped {md:?}");
        }
    }

    #[test]
    fn caption_must_be_only_emphasis() {
        let out = blocks("![a](b.png)\n\n*cap* and more\n");
        assert!(figures(&out).is_empty());
        let out = blocks("Look: ![a](b.png)\n*cap*\n");
        assert!(figures(&out).is_empty());
    }

    #[test]
    fn caption_spanning_several_emphasis_runs() {
        let out = blocks("![a](b.png)\n*one* *two*\n");
        assert_eq!(out.len(), 1);
        assert_eq!(figures(&out)[0].caption, "one two");

        let out = blocks("![a](b.png)\n*one* and more\n");
        assert!(figures(&out).is_empty());
    }

    #[test]
    fn caption_collects_nested_text() {
        let out = blocks("![a](b.png)\n*a **bold** cap*\n");
        assert_eq!(figures(&out)[0].caption, "a bold cap");
    }

    #[test]
    fn unrelated_blocks_pass_through() {
        let md = "# Title\n\n![a](b.png)\n\n*cap*\n\nTrailing text.\n";
        let out = blocks(md);
        assert!(matches!(&out[0], Block::Event(Event::Start(Tag::Heading { .. }))));
        assert_eq!(figures(&out).len(), 1);
        assert!(matches!(out.last(), Some(Block::Paragraph(_))));
    }

    #[test]
    fn image_runs_pair_with_the_nearest_caption() {
        let out = blocks("![one](1.png)\n\n![two](2.png)\n\n*second*\n");
        let figs = figures(&out);
        assert_eq!(figs.len(), 1);
        assert!(matches!(&figs[0].image, Inline::Image { dest, .. } if dest == "2.png"));
        assert!(matches!(out[0], Block::Paragraph(_)));
    }

    #[test]
    fn figure_inside_blockquote() {
        let out = blocks("> ![a](b.png)\n> *cap*\n");
        assert_eq!(figures(&out).len(), 1);
    }
}
