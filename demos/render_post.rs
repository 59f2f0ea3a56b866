//! Render a markdown post through the full pipeline and print the html.
//!
//! `cargo run --example render_post -- post.md [config.json]`; without
//! arguments a built-in sample post is rendered.

use std::env;
use std::fs;

use figcap::{DocumentSource, Pipeline, PipelineConfig};

const SAMPLE: &str = r#"# Shelter visit

![Cat](/img/cat.png)
*A sleeping cat*

<div class="portrait-grid">
![Anna](/img/anna.jpg)
*Anna*

![Ben](/img/ben.jpg)

*Ben*
</div>

Photos by "the team", more at www.example.org.
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let doc = match args.next() {
        Some(path) => DocumentSource::new(fs::read_to_string(&path)?).with_path(path),
        None => DocumentSource::new(SAMPLE),
    };
    let config = match args.next() {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    let pipeline = Pipeline::new(config)?;
    println!("{}", pipeline.render_document(&doc)?);
    Ok(())
}
