//! The markdown renderer: pulldown-cmark parsing, an ordered list of event
//! passes, then html serialization.
//!
//! Raw html is passed through unescaped. The other behaviours of the blog's
//! renderer (line breaks as `<br />`, bare URL linking, https upgrades,
//! figure captions) are passes, applied left to right in the order returned
//! by [`MarkdownRenderer::pass_names`].

pub mod passes;

use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd, html};
use regex::Regex;
use tracing::trace;

use crate::config::MarkdownOptions;
pub use passes::{EventPass, FigurePass, HardBreakPass, HttpsLinkPass, LinkifyPass};

pub struct MarkdownRenderer {
    options: Options,
    passes: Vec<Box<dyn EventPass>>,
}

impl MarkdownRenderer {
    pub fn new(opts: &MarkdownOptions) -> Self {
        let mut options = Options::empty();
        if opts.smart_punctuation {
            options.insert(Options::ENABLE_SMART_PUNCTUATION);
        }
        if opts.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if opts.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }

        let mut passes: Vec<Box<dyn EventPass>> = Vec::new();
        if opts.figures {
            passes.push(Box::new(FigurePass));
        }
        if opts.hard_breaks {
            passes.push(Box::new(HardBreakPass));
        }
        if opts.linkify {
            passes.push(Box::new(LinkifyPass));
        }
        if opts.upgrade_http_links {
            passes.push(Box::new(HttpsLinkPass));
        }

        Self { options, passes }
    }

    /// Append a pass after the configured ones.
    pub fn with_pass(mut self, pass: Box<dyn EventPass>) -> Self {
        self.passes.push(pass);
        self
    }

    pub fn pass_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.passes.iter().map(|p| p.name())
    }

    /// Parse `markdown` and run every pass over the resulting token stream.
    pub fn events(&self, markdown: &str) -> Vec<Event<'static>> {
        self.apply_passes(self.parse(markdown))
    }

    fn parse(&self, markdown: &str) -> Vec<Event<'static>> {
        Parser::new_ext(markdown, self.options)
            .map(Event::into_static)
            .collect()
    }

    fn apply_passes(&self, mut events: Vec<Event<'static>>) -> Vec<Event<'static>> {
        for pass in &self.passes {
            events = pass.apply(events);
            trace!(pass = pass.name(), events = events.len(), "applied markdown pass");
        }
        events
    }

    /// Render a markdown document to html.
    pub fn render(&self, markdown: &str) -> String {
        let events = self.events(markdown);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }

    /// Render inline markup only, for titles and other inline template
    /// slots. Nothing in the input opens a block: `# x` stays text and
    /// `2024. A year` is not a list.
    pub fn render_inline(&self, markdown: &str) -> String {
        let source = markdown
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(escape_block_start)
            .collect::<Vec<_>>()
            .join("\n");

        let mut events = Vec::new();
        for ev in self.parse(&source) {
            match ev {
                Event::Start(Tag::Paragraph) => {
                    if !events.is_empty() {
                        events.push(Event::SoftBreak);
                    }
                }
                Event::End(TagEnd::Paragraph) => {}
                other => events.push(other),
            }
        }

        let mut out = String::new();
        html::push_html(&mut out, self.apply_passes(events).into_iter());
        out
    }
}

static ORDERED_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,9}[.)](?:[ \t]|$)").expect("ORDERED_MARKER_RE: hardcoded regex is valid")
});

static REFERENCE_DEF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[[^\]]+\]:").expect("REFERENCE_DEF_RE: hardcoded regex is valid")
});

/// Backslash-escape whatever would make `line` open a block. Leading
/// indentation is dropped so it cannot start a code block.
fn escape_block_start(line: &str) -> String {
    let line = line.trim_start_matches([' ', '\t']);
    let Some(first) = line.chars().next() else {
        return String::new();
    };
    let escape_at = match first {
        '#' | '>' | '=' | '|' => Some(0),
        '`' if line.starts_with("```") => Some(0),
        '~' if line.starts_with("~~~") => Some(0),
        '-' | '+' | '*' | '_' if opens_list_or_rule(line, first) => Some(0),
        '[' if REFERENCE_DEF_RE.is_match(line) => Some(0),
        // digits cannot be escaped, the delimiter after them can
        '0'..='9' => ORDERED_MARKER_RE
            .find(line)
            .and_then(|_| line.find(['.', ')'])),
        _ => None,
    };
    match escape_at {
        Some(i) => format!("{}\\{}", &line[..i], &line[i..]),
        None => line.to_string(),
    }
}

/// A bullet marker followed by a space, or a thematic break such as `***`.
fn opens_list_or_rule(line: &str, marker: char) -> bool {
    let rest = &line[marker.len_utf8()..];
    let bullet = marker != '_' && (rest.is_empty() || rest.starts_with([' ', '\t']));
    let rule = line.chars().filter(|&c| c == marker).count() >= 3
        && line.chars().all(|c| c == marker || c == ' ' || c == '\t');
    bullet || rule
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(&MarkdownOptions::default())
    }
}
