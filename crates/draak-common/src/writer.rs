//! Binary writer over a pre-sized byte buffer.
//!
//! Archive output is laid out by computing every size up front and then
//! filling an exactly-sized allocation, so the writer never grows its
//! destination.

use byteorder::{ByteOrder, LittleEndian};

use crate::{windows1252, Result};

/// A forward-only cursor that writes little-endian data into a fixed
/// buffer.
///
/// Writing past the end of the buffer is a bug in the caller's layout
/// computation, not an input condition, and panics.
///
/// # Example
///
/// ```
/// use draak_common::BinaryWriter;
///
/// let mut buf = [0u8; 6];
/// let mut writer = BinaryWriter::new(&mut buf);
/// writer.write_u32(2);
/// writer.write_bytes(b"\xaf\xbe");
/// assert_eq!(buf, [0x02, 0x00, 0x00, 0x00, 0xaf, 0xbe]);
/// ```
#[derive(Debug)]
pub struct BinaryWriter<'a> {
    data: &'a mut [u8],
    position: usize,
}

impl<'a> BinaryWriter<'a> {
    /// Create a new writer over a pre-sized buffer.
    #[inline]
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get the number of bytes remaining.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if the buffer has been filled completely.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Write a single byte. Panics if the buffer is full.
    #[inline]
    pub fn write_u8(&mut self, v: u8) {
        self.data[self.position] = v;
        self.position += 1;
    }

    /// Write a little-endian u16. Panics if fewer than 2 bytes remain.
    #[inline]
    pub fn write_u16(&mut self, v: u16) {
        LittleEndian::write_u16(&mut self.data[self.position..self.position + 2], v);
        self.position += 2;
    }

    /// Write a little-endian u32. Panics if fewer than 4 bytes remain.
    #[inline]
    pub fn write_u32(&mut self, v: u32) {
        LittleEndian::write_u32(&mut self.data[self.position..self.position + 4], v);
        self.position += 4;
    }

    /// Write a byte slice. Panics if the slice does not fit.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
    }

    /// Write `text` as Windows-1252 bytes followed by a NUL terminator.
    ///
    /// Fails if a character has no Windows-1252 representation. Panics
    /// if the encoded text does not fit, like every other write.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        let bytes = windows1252::encode(text)?;
        self.write_bytes(&bytes);
        self.write_u8(0);
        Ok(())
    }
}
