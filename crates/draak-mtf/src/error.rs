//! Error types for the MTF crate.

use thiserror::Error;

/// Errors that can occur when working with MTF archives.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error.
    #[error("{0}")]
    Common(#[from] draak_common::Error),

    /// The buffer ended before the declared number of index entries.
    #[error("archive index truncated at entry {entry} of {count}")]
    TruncatedIndex {
        entry: usize,
        count: usize,
        #[source]
        source: draak_common::Error,
    },

    /// An index entry declared a zero name length.
    ///
    /// `name_len` counts the NUL terminator, so it is always at least 1.
    #[error("entry {entry} has name length 0")]
    InvalidNameLength { entry: usize },

    /// A payload lies outside the archive buffer.
    #[error("payload at offset {offset} with size {size} exceeds archive length {len}")]
    PayloadOutOfBounds { offset: u32, size: u32, len: usize },

    /// A compressed payload did not start with the marker.
    #[error("expected compression marker {expected:#010x}, got {actual:#010x}")]
    BadMarker { expected: u32, actual: u32 },

    /// The token stream produced more bytes than the declared output size.
    #[error(
        "compressed/decompressed size mismatch: compressed {compressed_size}, \
         stored {stored_size}, decompressed {decompressed_size}"
    )]
    SizeMismatch {
        compressed_size: u32,
        stored_size: u32,
        decompressed_size: u32,
    },

    /// A match token referenced data before the start of the output.
    #[error("back-reference distance {distance} with only {produced} bytes produced")]
    BadBackReference { distance: usize, produced: usize },

    /// An entry name would escape the extraction directory.
    #[error("entry name {name:?} escapes the output directory")]
    UnsafeName { name: String },

    /// The archive would exceed the format's 32-bit offsets.
    #[error("archive size {total} exceeds the format's u32 limit")]
    ArchiveTooLarge { total: u64 },

    /// A source file's size changed between layout and copy.
    #[error("source file for {name:?} is {actual} bytes, expected {expected}")]
    SourceSizeMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },

    /// Failure while processing a specific entry.
    #[error("entry {name:?} at offset {offset}: {source}")]
    Entry {
        name: String,
        offset: u32,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap an error with the entry it occurred in.
    pub(crate) fn for_entry(self, name: &str, offset: u32) -> Self {
        Error::Entry {
            name: name.to_string(),
            offset,
            source: Box::new(self),
        }
    }
}

/// Result type for MTF operations.
pub type Result<T> = std::result::Result<T, Error>;
