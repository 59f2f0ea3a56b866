use crate::ast::block::Block;
use crate::ast::inline::Inline;
use pulldown_cmark::{Event, Tag, TagEnd};

/// Group a flat event stream into `Block`s. Paragraph contents are taken
/// over verbatim; every other event becomes its own `Block::Event`.
pub fn parse_events_to_blocks(events: Vec<Event<'static>>) -> Vec<Block> {
    let mut out: Vec<Block> = Vec::new();
    // Some(..) while inside a paragraph
    let mut para: Option<Vec<Event<'static>>> = None;

    for ev in events {
        if let Some(inner) = para.as_mut() {
            if matches!(ev, Event::End(TagEnd::Paragraph)) {
                out.push(Block::Paragraph(std::mem::take(inner)));
                para = None;
            } else {
                inner.push(ev);
            }
            continue;
        }
        match ev {
            Event::Start(Tag::Paragraph) => para = Some(Vec::new()),
            ev => out.push(Block::Event(ev)),
        }
    }

    // unterminated paragraph: hand the events back untouched
    if let Some(inner) = para {
        out.push(Block::Event(Event::Start(Tag::Paragraph)));
        out.extend(inner.into_iter().map(Block::Event));
    }
    out
}

/// Parse the inline events of one paragraph into an `Inline` tree.
///
/// Returns `None` when the events contain anything that is not inline
/// content (or is unbalanced); such paragraphs are never figure candidates.
pub fn parse_inlines(events: &[Event<'_>]) -> Option<Vec<Inline>> {
    // A simple stack frame used while parsing Start/End pairs.
    struct Frame<'a> {
        tag: Tag<'a>,
        inlines: Vec<Inline>,
    }

    let mut stack: Vec<Frame> = Vec::new();
    let mut out: Vec<Inline> = Vec::new();

    fn push(stack: &mut [Frame<'_>], out: &mut Vec<Inline>, inl: Inline) {
        match stack.last_mut() {
            Some(top) => top.inlines.push(inl),
            None => out.push(inl),
        }
    }

    for ev in events {
        match ev {
            Event::Start(tag) => {
                let inline_tag = matches!(
                    tag,
                    Tag::Emphasis
                        | Tag::Strong
                        | Tag::Strikethrough
                        | Tag::Subscript
                        | Tag::Superscript
                        | Tag::Link { .. }
                        | Tag::Image { .. }
                );
                if !inline_tag {
                    return None;
                }
                stack.push(Frame {
                    tag: tag.clone(),
                    inlines: Vec::new(),
                });
            }
            Event::End(_) => {
                let frame = stack.pop()?;
                let node = match frame.tag {
                    Tag::Emphasis => Inline::Emphasis(frame.inlines),
                    Tag::Strong => Inline::Strong(frame.inlines),
                    Tag::Strikethrough => Inline::Strikethrough(frame.inlines),
                    Tag::Subscript => Inline::Subscript(frame.inlines),
                    Tag::Superscript => Inline::Superscript(frame.inlines),
                    Tag::Link {
                        link_type,
                        dest_url,
                        title,
                        id,
                    } => Inline::Link {
                        link_type,
                        dest: dest_url.to_string(),
                        title: title.to_string(),
                        id: id.to_string(),
                        children: frame.inlines,
                    },
                    Tag::Image {
                        link_type,
                        dest_url,
                        title,
                        id,
                    } => Inline::Image {
                        link_type,
                        dest: dest_url.to_string(),
                        title: title.to_string(),
                        id: id.to_string(),
                        children: frame.inlines,
                    },
                    _ => return None,
                };
                push(&mut stack, &mut out, node);
            }
            Event::Text(t) => push(&mut stack, &mut out, Inline::Text(t.to_string())),
            Event::Code(t) => push(&mut stack, &mut out, Inline::Code(t.to_string())),
            Event::InlineHtml(t) => push(&mut stack, &mut out, Inline::InlineHtml(t.to_string())),
            Event::SoftBreak => push(&mut stack, &mut out, Inline::SoftBreak),
            Event::HardBreak => push(&mut stack, &mut out, Inline::HardBreak),
            Event::FootnoteReference(t) => {
                push(&mut stack, &mut out, Inline::FootnoteReference(t.to_string()))
            }
            Event::InlineMath(t) => push(&mut stack, &mut out, Inline::InlineMath(t.to_string())),
            Event::DisplayMath(t) => push(&mut stack, &mut out, Inline::DisplayMath(t.to_string())),
            Event::Html(_) | Event::Rule | Event::TaskListMarker(_) => return None,
        }
    }

    if !stack.is_empty() {
        return None;
    }
    Some(out)
}
