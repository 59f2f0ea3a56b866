use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd};

/// Inline level nodes parsed out of a paragraph's events. Only used to
/// inspect paragraph shape; paragraphs that are not rewritten keep their
/// original events.
#[derive(Clone, Debug, PartialEq)]
pub enum Inline {
    Text(String),
    Code(String),
    InlineHtml(String),
    SoftBreak,
    HardBreak,
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Strikethrough(Vec<Inline>),
    Subscript(Vec<Inline>),
    Superscript(Vec<Inline>),
    Link {
        link_type: LinkType,
        dest: String,
        title: String,
        id: String,
        children: Vec<Inline>,
    },
    Image {
        link_type: LinkType,
        dest: String,
        title: String,
        id: String,
        children: Vec<Inline>,
    },
    FootnoteReference(String),
    InlineMath(String),
    DisplayMath(String),
}

impl Inline {
    pub fn is_image(&self) -> bool {
        matches!(self, Inline::Image { .. })
    }

    pub fn is_break(&self) -> bool {
        matches!(self, Inline::SoftBreak | Inline::HardBreak)
    }

    /// Concatenated text of every `Text` node below this one. Code spans,
    /// raw html and math are not plain text and are left out.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Inline::Text(s) => out.push_str(s),
            Inline::Emphasis(children)
            | Inline::Strong(children)
            | Inline::Strikethrough(children)
            | Inline::Subscript(children)
            | Inline::Superscript(children)
            | Inline::Link { children, .. }
            | Inline::Image { children, .. } => {
                for c in children {
                    c.collect_text(out);
                }
            }
            _ => {}
        }
    }
}

fn wrap(start: Tag<'static>, end: TagEnd, children: &[Inline]) -> Vec<Event<'static>> {
    let mut out = vec![Event::Start(start)];
    for c in children {
        out.extend(inline_to_events(c));
    }
    out.push(Event::End(end));
    out
}

/// Convert `Inline` to a sequence of pulldown-cmark Events (owned, 'static).
pub fn inline_to_events(inl: &Inline) -> Vec<Event<'static>> {
    match inl {
        Inline::Text(s) => vec![Event::Text(CowStr::from(s.clone()))],
        Inline::Code(s) => vec![Event::Code(CowStr::from(s.clone()))],
        Inline::InlineHtml(s) => vec![Event::InlineHtml(CowStr::from(s.clone()))],
        Inline::SoftBreak => vec![Event::SoftBreak],
        Inline::HardBreak => vec![Event::HardBreak],
        Inline::Emphasis(children) => wrap(Tag::Emphasis, TagEnd::Emphasis, children),
        Inline::Strong(children) => wrap(Tag::Strong, TagEnd::Strong, children),
        Inline::Strikethrough(children) => wrap(Tag::Strikethrough, TagEnd::Strikethrough, children),
        Inline::Subscript(children) => wrap(Tag::Subscript, TagEnd::Subscript, children),
        Inline::Superscript(children) => wrap(Tag::Superscript, TagEnd::Superscript, children),
        Inline::Link {
            link_type,
            dest,
            title,
            id,
            children,
        } => wrap(
            Tag::Link {
                link_type: *link_type,
                dest_url: CowStr::from(dest.clone()),
                title: CowStr::from(title.clone()),
                id: CowStr::from(id.clone()),
            },
            TagEnd::Link,
            children,
        ),
        Inline::Image {
            link_type,
            dest,
            title,
            id,
            children,
        } => wrap(
            Tag::Image {
                link_type: *link_type,
                dest_url: CowStr::from(dest.clone()),
                title: CowStr::from(title.clone()),
                id: CowStr::from(id.clone()),
            },
            TagEnd::Image,
            children,
        ),
        Inline::FootnoteReference(s) => vec![Event::FootnoteReference(CowStr::from(s.clone()))],
        Inline::InlineMath(s) => vec![Event::InlineMath(CowStr::from(s.clone()))],
        Inline::DisplayMath(s) => vec![Event::DisplayMath(CowStr::from(s.clone()))],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_skips_code_and_descends_into_spans() {
        let em = Inline::Emphasis(vec![
            Inline::Text("a ".into()),
            Inline::Strong(vec![Inline::Text("bold".into())]),
            Inline::Code("x".into()),
            Inline::Text(" end".into()),
        ]);
        assert_eq!(em.plain_text(), "a bold end");
    }

    #[test]
    fn image_events_keep_alt_text_children() {
        let img = Inline::Image {
            link_type: LinkType::Inline,
            dest: "/img/cat.png".into(),
            title: String::new(),
            id: String::new(),
            children: vec![Inline::Text("Cat".into())],
        };
        let evs = inline_to_events(&img);
        assert_eq!(evs.len(), 3);
        assert!(matches!(&evs[0], Event::Start(Tag::Image { dest_url, .. }) if &**dest_url == "/img/cat.png"));
        assert!(matches!(&evs[1], Event::Text(t) if &**t == "Cat"));
        assert!(matches!(evs[2], Event::End(TagEnd::Image)));
    }
}
