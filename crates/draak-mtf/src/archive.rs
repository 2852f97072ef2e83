//! MTF archive reader.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::decompress;
use crate::{Error, MtfEntry, MtfIndex, Result};

/// Backing bytes of an open archive.
enum Source {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl Source {
    #[inline]
    fn data(&self) -> &[u8] {
        match self {
            Source::Mapped(mmap) => mmap,
            Source::Owned(vec) => vec,
        }
    }
}

/// An open MTF archive.
///
/// Opening parses the index up front; payload bytes stay untouched until
/// an entry is read. Offsets are validated against the archive bounds at
/// read time, so an index with dangling offsets still opens and lists.
pub struct MtfArchive {
    source: Source,
    name: String,
    index: MtfIndex,
}

impl MtfArchive {
    /// Open an archive file, memory-mapping its contents.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("unknown")
            .to_string();

        let index = MtfIndex::parse(&mmap)?;

        Ok(Self {
            source: Source::Mapped(mmap),
            name,
            index,
        })
    }

    /// Open an archive from bytes already in memory.
    pub fn from_vec(name: &str, data: Vec<u8>) -> Result<Self> {
        let index = MtfIndex::parse(&data)?;
        Ok(Self {
            source: Source::Owned(data),
            name: name.to_string(),
            index,
        })
    }

    /// Get the archive name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the number of entries.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.index.len()
    }

    /// All entries in stored order.
    #[inline]
    pub fn entries(&self) -> &[MtfEntry] {
        self.index.entries()
    }

    /// Find an entry by name (case-insensitive).
    ///
    /// Forward slashes in the query match the stored backslashes.
    pub fn find(&self, name: &str) -> Option<&MtfEntry> {
        let normalized = name.replace('/', "\\");
        self.index
            .entries()
            .iter()
            .find(|entry| entry.name().eq_ignore_ascii_case(&normalized))
    }

    /// Read an entry's contents, decompressing when the payload carries
    /// the compression marker.
    pub fn read(&self, entry: &MtfEntry) -> Result<Vec<u8>> {
        self.read_inner(entry)
            .map_err(|e| e.for_entry(entry.name(), entry.data_offset()))
    }

    /// Extract every entry under `output`, creating directories as
    /// needed. `on_entry` runs after each file lands, in stored order.
    pub fn extract_all<P, F>(&self, output: P, mut on_entry: F) -> Result<()>
    where
        P: AsRef<Path>,
        F: FnMut(&MtfEntry),
    {
        let output = output.as_ref();
        fs::create_dir_all(output)?;

        for entry in self.index.entries() {
            self.extract_entry(output, entry)
                .map_err(|e| e.for_entry(entry.name(), entry.data_offset()))?;
            on_entry(entry);
        }

        Ok(())
    }

    /// Parallel extraction across a rayon thread pool.
    ///
    /// Completion order is unspecified; `on_entry` may run concurrently.
    #[cfg(feature = "parallel")]
    pub fn extract_all_parallel<P, F>(&self, output: P, on_entry: F) -> Result<()>
    where
        P: AsRef<Path>,
        F: Fn(&MtfEntry) + Sync,
    {
        use rayon::prelude::*;

        let output = output.as_ref();
        fs::create_dir_all(output)?;

        self.index.entries().par_iter().try_for_each(|entry| {
            self.extract_entry(output, entry)
                .map_err(|e| e.for_entry(entry.name(), entry.data_offset()))?;
            on_entry(entry);
            Ok(())
        })
    }

    fn read_inner(&self, entry: &MtfEntry) -> Result<Vec<u8>> {
        let payload = self.stored(entry)?;
        if decompress::is_compressed(payload) {
            decompress::unpack(payload)
        } else {
            Ok(payload.to_vec())
        }
    }

    fn extract_entry(&self, output: &Path, entry: &MtfEntry) -> Result<()> {
        let data = self.read_inner(entry)?;
        let path = output.join(entry_relative_path(entry.name())?);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }

    /// The stored payload bytes of an entry, bounds-checked.
    fn stored(&self, entry: &MtfEntry) -> Result<&[u8]> {
        let data = self.source.data();
        let offset = entry.data_offset() as usize;
        let size = entry.data_size() as usize;

        match offset.checked_add(size) {
            Some(end) if end <= data.len() => Ok(&data[offset..end]),
            _ => Err(Error::PayloadOutOfBounds {
                offset: entry.data_offset(),
                size: entry.data_size(),
                len: data.len(),
            }),
        }
    }
}

impl std::fmt::Debug for MtfArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MtfArchive")
            .field("name", &self.name)
            .field("entries", &self.index.len())
            .finish()
    }
}

/// Turn a stored name into a path relative to the output directory.
///
/// Names are split on the stored `\` separators. Empty components, `.`,
/// `..`, drive letters and forward slashes are rejected so a hostile
/// index cannot place files outside the output directory.
fn entry_relative_path(name: &str) -> Result<PathBuf> {
    let mut path = PathBuf::new();
    for component in name.split('\\') {
        match component {
            "" | "." | ".." => {
                return Err(Error::UnsafeName {
                    name: name.to_string(),
                })
            }
            _ if component.contains(':') || component.contains('/') => {
                return Err(Error::UnsafeName {
                    name: name.to_string(),
                })
            }
            _ => path.push(component),
        }
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompress::{CompressedHeader, COMPRESSED_MARKER};
    use draak_common::IntoBytes;

    /// Three entries laid out back to back: a raw text file, a compressed
    /// file and a single raw byte.
    fn sample_archive() -> Vec<u8> {
        let tokens: &[u8] = &[0x03, 0xaa, 0xbb, 0x02, 0x1c];
        let header = CompressedHeader {
            marker: COMPRESSED_MARKER,
            compressed_size: tokens.len() as u32,
            decompressed_size: 12,
        };

        let index = MtfIndex::new(vec![
            MtfEntry::new(r"DATA\A.TXT".to_string(), 72, 5),
            MtfEntry::new(r"DATA\SUB\B.BIN".to_string(), 77, 17),
            MtfEntry::new("C.TXT".to_string(), 94, 1),
        ]);
        assert_eq!(index.encoded_len(), 72);

        let mut data = vec![0u8; 72];
        index.encode(&mut data).unwrap();
        data.extend_from_slice(b"hello");
        data.extend_from_slice(header.as_bytes());
        data.extend_from_slice(tokens);
        data.extend_from_slice(b"z");
        data
    }

    #[test]
    fn test_listing() {
        let archive = MtfArchive::from_vec("sample.mtf", sample_archive()).unwrap();

        assert_eq!(archive.name(), "sample.mtf");
        assert_eq!(archive.entry_count(), 3);
        assert_eq!(archive.entries()[1].name(), r"DATA\SUB\B.BIN");
        assert_eq!(archive.entries()[1].data_size(), 17);
    }

    #[test]
    fn test_find() {
        let archive = MtfArchive::from_vec("sample.mtf", sample_archive()).unwrap();

        assert!(archive.find(r"DATA\A.TXT").is_some());
        assert!(archive.find("data\\a.txt").is_some());
        assert!(archive.find("DATA/SUB/B.BIN").is_some());
        assert!(archive.find("MISSING.TXT").is_none());
    }

    #[test]
    fn test_read_raw_and_compressed() {
        let archive = MtfArchive::from_vec("sample.mtf", sample_archive()).unwrap();

        let raw = archive.read(&archive.entries()[0]).unwrap();
        assert_eq!(raw, b"hello");

        let decompressed = archive.read(&archive.entries()[1]).unwrap();
        assert_eq!(decompressed, [0xaa, 0xbb].repeat(6));

        let single = archive.read(&archive.entries()[2]).unwrap();
        assert_eq!(single, b"z");
    }

    #[test]
    fn test_read_out_of_bounds() {
        let mut data = sample_archive();
        // Sever the last payload byte so the final entry dangles.
        data.truncate(data.len() - 1);

        let archive = MtfArchive::from_vec("sample.mtf", data).unwrap();

        match archive.read(&archive.entries()[2]) {
            Err(Error::Entry { name, source, .. }) => {
                assert_eq!(name, "C.TXT");
                assert!(matches!(*source, Error::PayloadOutOfBounds { .. }));
            }
            other => panic!("expected out-of-bounds, got {:?}", other),
        }
    }

    #[test]
    fn test_marker_collision_fails_as_compressed() {
        // A raw payload that happens to open with the marker word gets
        // treated as compressed; with nothing behind the marker the read
        // fails instead of returning the raw bytes.
        let index = MtfIndex::new(vec![MtfEntry::new("ODD.BIN".to_string(), 24, 4)]);
        assert_eq!(index.encoded_len(), 24);

        let mut data = vec![0u8; 24];
        index.encode(&mut data).unwrap();
        data.extend_from_slice(&COMPRESSED_MARKER.to_le_bytes());

        let archive = MtfArchive::from_vec("odd.mtf", data).unwrap();
        assert!(archive.read(&archive.entries()[0]).is_err());
    }

    #[test]
    fn test_extract_all() {
        let archive = MtfArchive::from_vec("sample.mtf", sample_archive()).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let mut seen = Vec::new();
        archive
            .extract_all(dir.path(), |entry| seen.push(entry.name().to_string()))
            .unwrap();

        assert_eq!(seen.len(), 3);
        assert_eq!(
            fs::read(dir.path().join("DATA").join("A.TXT")).unwrap(),
            b"hello"
        );
        assert_eq!(
            fs::read(dir.path().join("DATA").join("SUB").join("B.BIN")).unwrap(),
            [0xaa, 0xbb].repeat(6)
        );
        assert_eq!(fs::read(dir.path().join("C.TXT")).unwrap(), b"z");
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_extract_all_parallel() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let archive = MtfArchive::from_vec("sample.mtf", sample_archive()).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let count = AtomicUsize::new(0);
        archive
            .extract_all_parallel(dir.path(), |_| {
                count.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();

        assert_eq!(count.load(Ordering::Relaxed), 3);
        assert_eq!(fs::read(dir.path().join("C.TXT")).unwrap(), b"z");
    }

    #[test]
    fn test_extract_rejects_traversal() {
        let index = MtfIndex::new(vec![MtfEntry::new(r"..\EVIL.TXT".to_string(), 28, 1)]);
        assert_eq!(index.encoded_len(), 28);

        let mut data = vec![0u8; 28];
        index.encode(&mut data).unwrap();
        data.push(b'x');

        let archive = MtfArchive::from_vec("evil.mtf", data).unwrap();
        let dir = tempfile::tempdir().unwrap();

        match archive.extract_all(dir.path(), |_| {}) {
            Err(Error::Entry { source, .. }) => {
                assert!(matches!(*source, Error::UnsafeName { .. }));
            }
            other => panic!("expected unsafe name, got {:?}", other),
        }
    }

    #[test]
    fn test_entry_relative_path() {
        assert_eq!(
            entry_relative_path(r"DATA\SUB\F.TXT").unwrap(),
            PathBuf::from("DATA").join("SUB").join("F.TXT")
        );
        assert!(entry_relative_path(r"\ABS.TXT").is_err());
        assert!(entry_relative_path(r"A\..\B").is_err());
        assert!(entry_relative_path("C:EVIL").is_err());
        assert!(entry_relative_path("A/B").is_err());
        assert!(entry_relative_path("").is_err());
    }
}
