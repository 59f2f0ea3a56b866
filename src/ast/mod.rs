//! Token stream model used by the markdown-time rewriters.
//!
//! The renderer's token stream is pulldown-cmark's flat `Event` list. For
//! rewriting we group it into `Block`s (paragraphs as units, everything else
//! one event at a time) and look inside paragraphs through an `Inline` tree.

pub mod block;
pub mod inline;
pub mod parse;

pub use block::{Block, Figure, blocks_to_events};
pub use inline::{Inline, inline_to_events};
pub use parse::{parse_events_to_blocks, parse_inlines};
