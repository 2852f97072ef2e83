//! Archive index parsing and encoding.

use draak_common::{BinaryReader, BinaryWriter};

use crate::{Error, MtfEntry, Result};

/// Smallest possible on-disk record: name length field, a lone NUL name
/// byte, then the offset and size fields.
const MIN_RECORD_LEN: usize = 13;

/// The index of an MTF archive.
///
/// The index leads the file: a `u32` entry count, then one record per
/// entry. Each record stores the name length (including the NUL
/// terminator), the Windows-1252 name bytes with their NUL, the absolute
/// payload offset and the payload size. Payload bytes follow the index.
#[derive(Debug, Clone)]
pub struct MtfIndex {
    entries: Vec<MtfEntry>,
}

impl MtfIndex {
    pub(crate) fn new(entries: Vec<MtfEntry>) -> Self {
        Self { entries }
    }

    /// Parse the index from the start of an archive.
    ///
    /// Only the index region is read here. Payload offsets are checked
    /// against the archive bounds when an entry is actually read, so an
    /// index whose offsets point nowhere still parses.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = BinaryReader::new(data);
        let count = reader.read_u32()? as usize;

        // Every record occupies at least MIN_RECORD_LEN bytes, so a count
        // exceeding the bytes available cannot be satisfied. Capping the
        // reservation keeps a corrupt count from allocating gigabytes
        // before the first record read fails.
        let capacity = count.min(data.len() / MIN_RECORD_LEN);
        let mut entries = Vec::with_capacity(capacity);

        for index in 0..count {
            let name_len = reader
                .read_u32()
                .map_err(|source| Error::TruncatedIndex { entry: index, count, source })?;
            if name_len == 0 {
                return Err(Error::InvalidNameLength { entry: index });
            }
            let name = reader
                .read_text(name_len as usize)
                .map_err(|source| Error::TruncatedIndex { entry: index, count, source })?;
            let data_offset = reader
                .read_u32()
                .map_err(|source| Error::TruncatedIndex { entry: index, count, source })?;
            let data_size = reader
                .read_u32()
                .map_err(|source| Error::TruncatedIndex { entry: index, count, source })?;

            entries.push(MtfEntry::new(name.into_owned(), data_offset, data_size));
        }

        Ok(Self { entries })
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in stored order.
    #[inline]
    pub fn entries(&self) -> &[MtfEntry] {
        &self.entries
    }

    /// Size in bytes of the encoded index.
    ///
    /// This is also where the first payload lands in a well-formed
    /// archive: four bytes for the count plus twelve fixed bytes and the
    /// NUL-terminated name per record.
    pub fn encoded_len(&self) -> u64 {
        let records: u64 = self
            .entries
            .iter()
            .map(|entry| 12 + u64::from(entry.name_len()))
            .sum();
        4 + records
    }

    /// Encode the index into `buf`.
    ///
    /// `buf` must be exactly [`encoded_len`](Self::encoded_len) bytes.
    pub fn encode(&self, buf: &mut [u8]) -> Result<()> {
        let mut writer = BinaryWriter::new(buf);
        writer.write_u32(self.entries.len() as u32);

        for entry in &self.entries {
            writer.write_u32(entry.name_len());
            writer.write_text(entry.name())?;
            writer.write_u32(entry.data_offset());
            writer.write_u32(entry.data_size());
        }

        debug_assert!(writer.is_full());
        Ok(())
    }
}
