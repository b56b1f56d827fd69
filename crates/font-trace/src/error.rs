//! Error types for bitmap import.

use std::path::PathBuf;

/// Result type for bitmap import operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while importing a glyph bitmap.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to open or decode an image file.
    #[error("Failed to load image '{path}': {source}")]
    LoadImage {
        path: PathBuf,
        source: image::ImageError,
    },

    /// The image has no pixels.
    #[error("Image '{path}' is empty ({width}x{height})")]
    EmptyImage { path: PathBuf, width: u32, height: u32 },
}
