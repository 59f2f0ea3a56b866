//! Pipeline configuration.
//!
//! Every field has a default matching the blog's setup, so an empty JSON
//! object (or `PipelineConfig::default()`) is a complete configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors raised while loading configuration or building the pipeline from it.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The container class produced an invalid block pattern
    #[error("Invalid HTML block pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Markdown renderer switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Single newlines inside a paragraph become `<br />`
    pub hard_breaks: bool,
    /// Bare `http(s)://` and `www.` URLs become links
    pub linkify: bool,
    /// Straight quotes and dashes become typographic ones
    pub smart_punctuation: bool,
    /// Rewrite `http://` link targets to `https://`
    pub upgrade_http_links: bool,
    /// Markdown-time image + caption to figure rewriting
    pub figures: bool,
    pub tables: bool,
    pub strikethrough: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            hard_breaks: true,
            linkify: true,
            smart_punctuation: true,
            upgrade_http_links: true,
            figures: true,
            tables: true,
            strikethrough: true,
        }
    }
}

/// Configuration for a whole document pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Class of the `<div>` containers whose content is rendered as markdown
    pub container_class: String,
    /// Run the html-block preprocessor before rendering
    pub preprocess_html_blocks: bool,
    /// Run the render-time figure transform over the final html
    pub html_figures: bool,
    pub markdown: MarkdownOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            container_class: "portrait-grid".to_string(),
            preprocess_html_blocks: true,
            html_figures: true,
            markdown: MarkdownOptions::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
