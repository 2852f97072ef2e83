//! Common utilities for Draak.
//!
//! This crate provides the foundational pieces shared across the Draak
//! crates:
//!
//! - [`BinaryReader`] - Zero-copy, bounds-checked reading from byte slices
//! - [`BinaryWriter`] - Little-endian writing into pre-sized buffers
//! - [`windows1252`] - The single-byte text encoding MTF uses for names

mod error;
mod reader;
mod writer;

pub mod windows1252;

pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use writer::BinaryWriter;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
