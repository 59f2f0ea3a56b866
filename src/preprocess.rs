//! Markdown nested in raw html containers.
//!
//! CommonMark treats the content of an html block as raw html, so markdown
//! written inside `<div class="portrait-grid">` would come out verbatim. The
//! preprocessor renders that content up front and splices the html back in.

use regex::{Captures, Regex};
use tracing::{debug, trace};

use crate::config::ConfigError;
use crate::markdown::MarkdownRenderer;

/// Finds `<div class="CLASS">…</div>` blocks and renders their content as
/// markdown. The first `</div>` closes a block, so nested divs are not
/// supported.
#[derive(Debug, Clone)]
pub struct HtmlBlockPreprocessor {
    pattern: Regex,
}

impl HtmlBlockPreprocessor {
    pub fn new(container_class: &str) -> Result<Self, ConfigError> {
        let pattern = Regex::new(&format!(
            r#"(?s)(<div\s+class="{}">)(.*?)(</div>)"#,
            regex::escape(container_class)
        ))?;
        Ok(Self { pattern })
    }

    /// Returns `markdown` with every non-empty container rendered. Empty
    /// containers and text outside containers are left as they are.
    pub fn preprocess(&self, markdown: &str, renderer: &MarkdownRenderer) -> String {
        let mut blocks = 0usize;
        let out = self.pattern.replace_all(markdown, |caps: &Captures<'_>| {
            let inner = caps[2].trim();
            if inner.is_empty() {
                trace!("empty html block, leaving as is");
                return caps[0].to_string();
            }
            blocks += 1;
            // without the leading newline the first line is not seen as the
            // start of a block and a leading image is not converted
            let rendered = renderer.render(&format!("\n{inner}"));
            format!("{}\n{}\n{}", &caps[1], rendered, &caps[3])
        });
        if blocks > 0 {
            debug!(blocks, "rendered markdown inside html blocks");
        }
        out.into_owned()
    }
}
