//! Event passes applied between parsing and html serialization.

use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd};
use regex::Regex;

use crate::figure;

/// One step of the renderer's pass list. Passes take the whole token stream
/// and return the new one; they must keep Start/End events balanced.
pub trait EventPass: Send + Sync {
    /// Short name, used for logging and for inspecting the pass order.
    fn name(&self) -> &'static str;
    fn apply(&self, events: Vec<Event<'static>>) -> Vec<Event<'static>>;
}

/// Markdown-time image + caption to figure rewriting.
#[derive(Debug, Clone, Copy, Default)]
pub struct FigurePass;

impl EventPass for FigurePass {
    fn name(&self) -> &'static str {
        "figures"
    }

    fn apply(&self, events: Vec<Event<'static>>) -> Vec<Event<'static>> {
        figure::rewrite_events(events)
    }
}

/// Turns every soft line break into `<br />`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardBreakPass;

impl EventPass for HardBreakPass {
    fn name(&self) -> &'static str {
        "hard-breaks"
    }

    fn apply(&self, events: Vec<Event<'static>>) -> Vec<Event<'static>> {
        events
            .into_iter()
            .map(|ev| match ev {
                Event::SoftBreak => Event::HardBreak,
                other => other,
            })
            .collect()
    }
}

/// Bare URL candidates: an explicit http(s) scheme or a `www.` host.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<>]+").expect("URL_RE: hardcoded regex is valid")
});

/// Turns bare URLs in text into autolinks. Text inside links (including raw
/// `<a>` html), images, code blocks and raw html blocks is left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkifyPass;

impl EventPass for LinkifyPass {
    fn name(&self) -> &'static str {
        "linkify"
    }

    fn apply(&self, events: Vec<Event<'static>>) -> Vec<Event<'static>> {
        let mut out = Vec::with_capacity(events.len());
        // depth of constructs whose text must not be linked
        let mut suppress = 0usize;
        // the parser splits text runs at delimiter characters, so adjacent
        // text is merged before matching
        let mut pending: Option<String> = None;

        for ev in events {
            if suppress == 0
                && let Event::Text(t) = &ev
            {
                pending.get_or_insert_with(String::new).push_str(t);
                continue;
            }
            if let Some(text) = pending.take() {
                linkify_text(&text, &mut out);
            }
            match &ev {
                Event::Start(
                    Tag::Link { .. }
                    | Tag::Image { .. }
                    | Tag::CodeBlock(_)
                    | Tag::HtmlBlock
                    | Tag::MetadataBlock(_),
                ) => suppress += 1,
                Event::End(
                    TagEnd::Link
                    | TagEnd::Image
                    | TagEnd::CodeBlock
                    | TagEnd::HtmlBlock
                    | TagEnd::MetadataBlock(_),
                ) => suppress = suppress.saturating_sub(1),
                Event::InlineHtml(html) if opens_anchor(html) => suppress += 1,
                Event::InlineHtml(html) if closes_anchor(html) => {
                    suppress = suppress.saturating_sub(1)
                }
                _ => {}
            }
            out.push(ev);
        }
        if let Some(text) = pending.take() {
            linkify_text(&text, &mut out);
        }
        out
    }
}

fn opens_anchor(html: &str) -> bool {
    starts_with_ignore_case(html, "<a")
        && html[2..].starts_with(|c: char| c.is_ascii_whitespace() || c == '>')
}

fn closes_anchor(html: &str) -> bool {
    starts_with_ignore_case(html, "</a")
        && html[3..].starts_with(|c: char| c.is_ascii_whitespace() || c == '>')
}

fn linkify_text(text: &str, out: &mut Vec<Event<'static>>) {
    let mut last = 0usize;
    for m in URL_RE.find_iter(text) {
        let url = trim_url(m.as_str());
        if !has_host(url) {
            continue;
        }
        let start = m.start();
        if start > last {
            out.push(Event::Text(CowStr::from(text[last..start].to_string())));
        }
        let href = if starts_with_ignore_case(url, "www.") {
            format!("http://{url}")
        } else {
            url.to_string()
        };
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(href),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        out.push(Event::Text(CowStr::from(url.to_string())));
        out.push(Event::End(TagEnd::Link));
        last = start + url.len();
    }
    if last < text.len() {
        out.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

/// Drop sentence punctuation and unbalanced closing parens from the end of a
/// URL candidate.
fn trim_url(candidate: &str) -> &str {
    let mut url = candidate;
    while let Some(last) = url.chars().next_back() {
        let drop = match last {
            '.' | ',' | ':' | ';' | '!' | '?' | '\'' | '"' | '’' | '”' => true,
            ')' => url.matches(')').count() > url.matches('(').count(),
            _ => false,
        };
        if !drop {
            break;
        }
        url = &url[..url.len() - last.len_utf8()];
    }
    url
}

fn has_host(url: &str) -> bool {
    let rest = if starts_with_ignore_case(url, "www.") {
        &url[4..]
    } else {
        url.split_once("://").map_or("", |(_, rest)| rest)
    };
    !rest.is_empty()
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Rewrites `http://` link targets to `https://`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpsLinkPass;

impl EventPass for HttpsLinkPass {
    fn name(&self) -> &'static str {
        "https-links"
    }

    fn apply(&self, events: Vec<Event<'static>>) -> Vec<Event<'static>> {
        events
            .into_iter()
            .map(|ev| match ev {
                Event::Start(Tag::Link {
                    link_type,
                    dest_url,
                    title,
                    id,
                }) => {
                    let dest_url = match dest_url.strip_prefix("http://") {
                        Some(rest) => CowStr::from(format!("https://{rest}")),
                        None => dest_url,
                    };
                    Event::Start(Tag::Link {
                        link_type,
                        dest_url,
                        title,
                        id,
                    })
                }
                other => other,
            })
            .collect()
    }
}
