//! MTF archive reader and writer for Darkstone game files.
//!
//! MTF is the flat container format Darkstone ships its assets in. An
//! archive is a `u32` entry count, an index of NUL-terminated
//! Windows-1252 names with absolute payload offsets and sizes, then the
//! payload bytes back to back. There is no magic, no alignment and no
//! directory tree; nesting lives in the `\`-separated entry names.
//!
//! Payloads are either raw or compressed with the format's own LZ
//! scheme, recognized by the `0x0BADBEAF` marker word in front of the
//! payload. Reading handles both transparently; written archives always
//! store raw payloads.
//!
//! # Example
//!
//! ```no_run
//! use draak_mtf::MtfArchive;
//!
//! let archive = MtfArchive::open("DATA.MTF")?;
//!
//! for entry in archive.entries() {
//!     println!("{}: {} bytes", entry.name(), entry.data_size());
//! }
//!
//! if let Some(entry) = archive.find("DATA/CRYPT.O3D") {
//!     let data = archive.read(entry)?;
//! }
//! # Ok::<(), draak_mtf::Error>(())
//! ```

mod archive;
mod builder;
mod decompress;
mod entry;
mod error;
mod index;

pub use archive::MtfArchive;
pub use builder::MtfBuilder;
pub use decompress::{decompress, is_compressed, unpack, CompressedHeader, COMPRESSED_MARKER};
pub use entry::{MtfEntry, Separator};
pub use error::{Error, Result};
pub use index::MtfIndex;
