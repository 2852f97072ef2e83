//! Builder for creating MTF archives.

use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, MtfEntry, MtfIndex, Result};

/// A file queued for the archive.
#[derive(Debug, Clone)]
struct SourceFile {
    /// Stored name, `\`-separated.
    name: String,
    /// Where the payload bytes come from.
    path: PathBuf,
    /// Size at queue time. The layout is fixed from this, so it is
    /// re-checked when the payload is copied.
    size: u64,
}

/// Builder for MTF archives.
///
/// Files are queued with [`add_file`](Self::add_file) and written out in
/// queue order. Payloads are always stored raw; compressed payloads only
/// occur in archives produced elsewhere.
///
/// # Example
///
/// ```no_run
/// use draak_mtf::MtfBuilder;
///
/// let mut builder = MtfBuilder::new();
/// builder.add_file(r"DATA\CRYPT.O3D", "assets/crypt.o3d")?;
/// builder.write_to("out.mtf")?;
/// # Ok::<(), draak_mtf::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct MtfBuilder {
    files: Vec<SourceFile>,
}

impl MtfBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Queue a file for the archive.
    ///
    /// `name` is the name to store; forward slashes are converted to the
    /// stored `\` separators. The file's current size fixes the archive
    /// layout.
    pub fn add_file(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        let size = fs::metadata(&path)?.len();
        self.files.push(SourceFile {
            name: name.into().replace('/', "\\"),
            path,
            size,
        });
        Ok(())
    }

    /// Number of files queued.
    #[inline]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no files are queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Build the archive bytes.
    pub fn build(&self) -> Result<Vec<u8>> {
        // Step 1: lay out the index to learn where payloads start.
        // Each record is 12 fixed bytes plus the NUL-terminated name,
        // behind the 4-byte count.
        let mut header_size: u64 = 4;
        for file in &self.files {
            header_size += 12 + file.name.chars().count() as u64 + 1;
        }

        let mut total = header_size;
        for file in &self.files {
            total += file.size;
        }
        if total > u64::from(u32::MAX) {
            return Err(Error::ArchiveTooLarge { total });
        }

        // Step 2: assign contiguous offsets in queue order.
        let mut entries = Vec::with_capacity(self.files.len());
        let mut offset = header_size;
        for file in &self.files {
            entries.push(MtfEntry::new(file.name.clone(), offset as u32, file.size as u32));
            offset += file.size;
        }

        let index = MtfIndex::new(entries);
        debug_assert_eq!(index.encoded_len(), header_size);

        // Step 3: encode the index, then copy the payloads behind it.
        let mut output = vec![0u8; header_size as usize];
        output.reserve_exact((total - header_size) as usize);
        index.encode(&mut output)?;

        for (file, entry) in self.files.iter().zip(index.entries()) {
            let data = fs::read(&file.path)
                .map_err(|e| Error::from(e).for_entry(entry.name(), entry.data_offset()))?;
            if data.len() as u64 != file.size {
                return Err(Error::SourceSizeMismatch {
                    name: file.name.clone(),
                    expected: file.size,
                    actual: data.len() as u64,
                });
            }
            output.extend_from_slice(&data);
        }

        Ok(output)
    }

    /// Build the archive and write it to `path`.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.build()?;
        fs::write(path, bytes)?;
        Ok(())
    }
}
