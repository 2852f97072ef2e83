//! Draak - Darkstone game file extraction and creation library.
//!
//! This crate provides a unified interface to the Draak library crates
//! for working with Darkstone game files.
//!
//! # Crates
//!
//! - [`draak_common`] - Common utilities (binary reading and writing, Windows-1252 text)
//! - [`draak_mtf`] - MTF archive reading, extraction and creation
//!
//! # Example
//!
//! ```no_run
//! use draak::prelude::*;
//!
//! // Open an MTF archive
//! let archive = MtfArchive::open("DATA.MTF")?;
//!
//! // Find and read a file
//! if let Some(entry) = archive.find("DATA\\CRYPT.O3D") {
//!     let data = archive.read(entry)?;
//!     println!("{}: {} bytes", entry.name(), data.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use draak_common as common;
pub use draak_mtf as mtf;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use draak_common::{windows1252, BinaryReader, BinaryWriter};
    pub use draak_mtf::{MtfArchive, MtfBuilder, MtfEntry, Separator};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
