use crate::ast::inline::{Inline, inline_to_events};
use pulldown_cmark::{CowStr, Event, Tag, TagEnd};

/// A token stream grouped for rewriting. Paragraphs are pulled out as units
/// because every figure pattern is paragraph shaped; all other events pass
/// through one by one so flattening an untouched stream gives it back as is.
#[derive(Clone, Debug)]
pub enum Block {
    /// The events strictly between `Start(Paragraph)` and `End(Paragraph)`.
    Paragraph(Vec<Event<'static>>),
    Figure(Figure),
    Event(Event<'static>),
}

/// An image together with the caption found for it.
#[derive(Clone, Debug, PartialEq)]
pub struct Figure {
    /// Always an `Inline::Image`.
    pub image: Inline,
    /// Trimmed, never blank.
    pub caption: String,
}

impl Figure {
    /// Emits the figure as block-level html around the original image
    /// events, each structural tag on its own line.
    pub fn to_events(&self) -> Vec<Event<'static>> {
        let mut out = vec![Event::Html(CowStr::Borrowed("<figure>\n"))];
        out.extend(inline_to_events(&self.image));
        out.push(Event::Html(CowStr::Borrowed("\n<figcaption>")));
        out.push(Event::Text(CowStr::from(self.caption.clone())));
        out.push(Event::Html(CowStr::Borrowed("</figcaption>\n</figure>\n")));
        out
    }
}

/// Flatten blocks into one event stream, consuming them.
pub fn blocks_to_events(blocks: Vec<Block>) -> Vec<Event<'static>> {
    let mut out = Vec::new();
    for b in blocks {
        match b {
            Block::Paragraph(inner) => {
                out.push(Event::Start(Tag::Paragraph));
                out.extend(inner);
                out.push(Event::End(TagEnd::Paragraph));
            }
            Block::Event(e) => out.push(e),
            Block::Figure(f) => out.extend(f.to_events()),
        }
    }
    out
}
