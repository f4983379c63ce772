//! Directory scanning logic

mod filter;
mod indexer;
mod walker;

pub use filter::{FontFilter, DEFAULT_EXTENSION, FONT_PATTERNS};
pub use indexer::{build_destination_index, IndexStats};
pub use walker::{enumerate_candidates, walk_fonts, WalkOptions};
