//! Error types for value parsing in aranet-types.

use thiserror::Error;

/// Errors that can occur when strictly parsing a field value.
///
/// The output parser in `aranet-bridge` never surfaces these; it absorbs them
/// and falls back to raw values. They are returned only by explicit
/// conversions such as `"12/300".parse::<Age>()`.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A field value had an unexpected shape.
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Result type alias using aranet-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
