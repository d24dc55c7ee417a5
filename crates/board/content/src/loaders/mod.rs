//! Content loaders for reading authored game data from files.
//!
//! All loaders parse RON into mirror structs and convert those into
//! `board-core` types, so the file format can drift without touching core.

pub mod board;
pub mod templates;

pub use board::BoardLoader;
pub use templates::TemplateLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
