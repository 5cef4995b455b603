//! Error types for copyclean library.
//!
//! Cleaning itself never fails; these errors only surface at the edges
//! (settings parsing, file I/O, the C ABI).

use std::io;
use thiserror::Error;

/// Result type alias for copyclean operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for copyclean library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading input or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The settings snapshot could not be parsed or serialized.
    #[error("Settings error: {0}")]
    Settings(#[from] serde_json::Error),

    /// A cleaning mode name was not recognized (strict parsing only).
    #[error("Unknown cleaning mode: {0}")]
    UnknownMode(String),

    /// Input text was not usable (e.g. invalid UTF-8 across the C ABI).
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::InvalidInput(err.to_string())
    }
}
