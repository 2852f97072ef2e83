//! MTF archive entry.

use std::borrow::Cow;

/// Path separator policy for names leaving the library.
///
/// MTF stores `\`-separated names. Conversion happens only when a name is
/// handed to the filesystem or a listing; the stored bytes are never
/// rewritten. Callers choose the policy explicitly instead of the library
/// probing the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Separator {
    /// Keep the stored backslash separators.
    #[default]
    Backslash,
    /// Convert separators to forward slashes.
    ForwardSlash,
}

/// An entry (file) within an MTF archive.
///
/// This holds metadata only; use [`MtfArchive::read`](crate::MtfArchive::read)
/// for the payload bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MtfEntry {
    /// Stored name, `\`-separated.
    name: String,
    /// Absolute payload offset from the start of the archive.
    data_offset: u32,
    /// Stored payload size in bytes.
    data_size: u32,
}

impl MtfEntry {
    pub(crate) fn new(name: String, data_offset: u32, data_size: u32) -> Self {
        Self {
            name,
            data_offset,
            data_size,
        }
    }

    /// Get the stored name, `\`-separated.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the absolute payload offset.
    #[inline]
    pub fn data_offset(&self) -> u32 {
        self.data_offset
    }

    /// Get the stored payload size.
    ///
    /// For compressed entries this is the on-disk size (sub-header plus
    /// token stream), not the decompressed size.
    #[inline]
    pub fn data_size(&self) -> u32 {
        self.data_size
    }

    /// On-disk length of the name field, including the NUL terminator.
    ///
    /// Windows-1252 is one byte per character, so this is the character
    /// count plus one.
    #[inline]
    pub fn name_len(&self) -> u32 {
        self.name.chars().count() as u32 + 1
    }

    /// The name under the given separator policy.
    ///
    /// Borrows unless a conversion is needed.
    pub fn display_name(&self, sep: Separator) -> Cow<'_, str> {
        match sep {
            Separator::Backslash => Cow::Borrowed(&self.name),
            Separator::ForwardSlash => {
                if self.name.contains('\\') {
                    Cow::Owned(self.name.replace('\\', "/"))
                } else {
                    Cow::Borrowed(&self.name)
                }
            }
        }
    }
}
