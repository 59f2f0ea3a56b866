//! Markdown to html for a static blog, with image + italic caption runs
//! normalized into `<figure>`/`<figcaption>`.
//!
//! The caption pattern is recognized twice: on the markdown token stream
//! ([`figure::rewrite_events`]) and over finished html
//! ([`figure::transform`]), the latter catching raw html and media that
//! image optimization turned into `<picture>`. [`Pipeline`] runs both.

pub mod ast;
pub mod config;
pub mod figure;
pub mod filters;
pub mod markdown;
pub mod pipeline;
pub mod preprocess;
pub mod shortcode;

pub use config::{ConfigError, MarkdownOptions, PipelineConfig};
pub use figure::TransformError;
pub use markdown::{EventPass, MarkdownRenderer};
pub use pipeline::{BoxError, DocumentSource, ImageOptimizer, NoopOptimizer, Pipeline, PipelineError, Stage};
pub use preprocess::HtmlBlockPreprocessor;
