//! Error types for glyph placement.

/// Result type for placement operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid alignment '{0}': expected 'top' or 'bottom'")]
    InvalidAlignment(String),

    #[error("Invalid scaling factor {0}: must be a positive number")]
    InvalidScale(f64),

    #[error("Glyph placement out of range: {what} is {value}")]
    OutOfRange { what: &'static str, value: String },
}
