//! Error types for draak-common.

use thiserror::Error;

/// Common error type for cursor and text-encoding operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer: needed {needed} bytes but only {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// Character has no Windows-1252 representation.
    #[error("character {ch:?} cannot be encoded as Windows-1252")]
    Unencodable { ch: char },
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
