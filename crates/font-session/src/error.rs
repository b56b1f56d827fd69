//! Error types for the font session.

use std::path::PathBuf;

/// Result type for font session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while saving or generating a font.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to write an output file.
    #[error("Failed to write '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A glyph outline could not be converted to TrueType contours.
    #[error("Outline of glyph '{glyph}' cannot be converted: {message}")]
    Outline { glyph: String, message: String },

    /// A coordinate or metric does not fit its TrueType field.
    #[error("Glyph '{glyph}': {what} {value} is out of range for TrueType")]
    OutOfRange {
        glyph: String,
        what: &'static str,
        value: i64,
    },

    /// The font has more glyphs than a TrueType font can address.
    #[error("Too many glyphs: {0} (maximum is 65535)")]
    TooManyGlyphs(usize),

    /// Two glyphs claim the same code point in the cmap.
    #[error("Conflicting cmap entries: {0}")]
    CmapConflict(String),

    /// Failed to format the SFD source.
    #[error("Failed to format SFD source: {0}")]
    Format(#[from] std::fmt::Error),

    /// Table serialization error.
    #[error("Font write error: {0}")]
    Write(#[from] write_fonts::error::Error),

    /// Font builder error.
    #[error("Font builder error: {0}")]
    FontBuilder(#[from] write_fonts::BuilderError),
}
