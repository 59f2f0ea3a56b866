//! One document through every stage, in order:
//! `preprocess → render → optimize-images → figure-transform`.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, debug_span};

use crate::config::{ConfigError, PipelineConfig};
use crate::figure;
use crate::markdown::MarkdownRenderer;
use crate::preprocess::HtmlBlockPreprocessor;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Markdown source of one document. The path is only used to label errors
/// and log spans.
#[derive(Debug, Clone, Default)]
pub struct DocumentSource {
    pub text: String,
    pub path: Option<PathBuf>,
}

impl DocumentSource {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// The stages that can fail. Preprocessing and rendering cannot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    OptimizeImages,
    FigureTransform,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::OptimizeImages => "optimize-images",
            Stage::FigureTransform => "figure-transform",
        })
    }
}

/// A stage failed for a document.
#[derive(Debug, thiserror::Error)]
#[error("Stage `{stage}` failed for {}: {source}", document_label(.document))]
pub struct PipelineError {
    pub document: Option<PathBuf>,
    pub stage: Stage,
    pub source: BoxError,
}

fn document_label(document: &Option<PathBuf>) -> String {
    match document {
        Some(path) => path.display().to_string(),
        None => "<unnamed document>".to_string(),
    }
}

/// Rewrites rendered html to point at optimized images, possibly turning
/// `<img>` into `<picture>`. Runs before the figure transform.
pub trait ImageOptimizer: Send + Sync {
    fn optimize(&self, html: &str) -> Result<String, BoxError>;
}

impl<F> ImageOptimizer for F
where
    F: Fn(&str) -> Result<String, BoxError> + Send + Sync,
{
    fn optimize(&self, html: &str) -> Result<String, BoxError> {
        self(html)
    }
}

/// Leaves the html as it is.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopOptimizer;

impl ImageOptimizer for NoopOptimizer {
    fn optimize(&self, html: &str) -> Result<String, BoxError> {
        Ok(html.to_string())
    }
}

pub struct Pipeline {
    config: PipelineConfig,
    renderer: MarkdownRenderer,
    preprocessor: Option<HtmlBlockPreprocessor>,
    optimizer: Box<dyn ImageOptimizer>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        let renderer = MarkdownRenderer::new(&config.markdown);
        let preprocessor = if config.preprocess_html_blocks {
            Some(HtmlBlockPreprocessor::new(&config.container_class)?)
        } else {
            None
        };
        debug!(
            passes = ?renderer.pass_names().collect::<Vec<_>>(),
            preprocess = config.preprocess_html_blocks,
            html_figures = config.html_figures,
            "built document pipeline"
        );
        Ok(Self {
            config,
            renderer,
            preprocessor,
            optimizer: Box::new(NoopOptimizer),
        })
    }

    pub fn with_image_optimizer(mut self, optimizer: impl ImageOptimizer + 'static) -> Self {
        self.optimizer = Box::new(optimizer);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn renderer(&self) -> &MarkdownRenderer {
        &self.renderer
    }

    /// Run every stage over `doc`.
    pub fn render_document(&self, doc: &DocumentSource) -> Result<String, PipelineError> {
        let span = debug_span!("document", path = %document_label(&doc.path));
        let _guard = span.enter();
        let fail = |stage: Stage, source: BoxError| PipelineError {
            document: doc.path.clone(),
            stage,
            source,
        };

        let markdown = match &self.preprocessor {
            Some(pre) => pre.preprocess(&doc.text, &self.renderer),
            None => doc.text.clone(),
        };
        let html = self.renderer.render(&markdown);
        let html = self
            .optimizer
            .optimize(&html)
            .map_err(|e| fail(Stage::OptimizeImages, e))?;
        if !self.config.html_figures {
            return Ok(html);
        }
        figure::transform(&html).map_err(|e| fail(Stage::FigureTransform, e.into()))
    }

    /// [`Pipeline::render_document`] for an unnamed document.
    pub fn render_markdown(&self, markdown: &str) -> Result<String, PipelineError> {
        self.render_document(&DocumentSource::new(markdown))
    }

    /// Run the figure transform over an output file produced elsewhere, such
    /// as a template that embeds rendered content. Only `.html` outputs are
    /// touched.
    pub fn finish_page(&self, content: &str, output_path: &Path) -> Result<String, PipelineError> {
        if !self.config.html_figures {
            return Ok(content.to_string());
        }
        figure::transform_page(content, Some(output_path)).map_err(|e| PipelineError {
            document: Some(output_path.to_path_buf()),
            stage: Stage::FigureTransform,
            source: e.into(),
        })
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("passes", &self.renderer.pass_names().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
