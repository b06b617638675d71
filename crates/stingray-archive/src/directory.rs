//! Archive directory: the FileID to section-location table.
//!
//! Loading is a one-time, append-only build: the installation is scanned
//! sequentially, every segment index is folded into one table, and from
//! then on the directory is immutable and safe for concurrent read-only
//! access by any number of extraction workers.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use stingray_hash::FileID;
use tracing::{debug, info, warn};

use crate::reader::{ChainReader, SectionReader};
use crate::segment::read_segment_index;
use crate::{ArchiveError, DATA_DIR, MARKER_FILE, Result, Section};

/// Location of one section: segment plus byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionLocation {
    /// Index into the directory's segment list.
    pub segment: usize,
    /// Byte offset within the segment file holding this section.
    pub offset: u64,
    /// Section length in bytes.
    pub len: u64,
}

/// Per-FileID record of which sections exist and where.
///
/// Owned exclusively by the directory; read-only after load completes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveEntry {
    locations: [Option<SectionLocation>; 3],
}

impl ArchiveEntry {
    /// Location of a section, or `None` when absent.
    pub fn section(&self, section: Section) -> Option<SectionLocation> {
        self.locations[section.index()]
    }

    /// Sections that exist for this entry, in canonical order.
    pub fn present_sections(&self) -> impl Iterator<Item = Section> + '_ {
        Section::ALL
            .into_iter()
            .filter(|s| self.locations[s.index()].is_some())
    }
}

/// Immutable FileID to section-location table over an installation.
#[derive(Debug)]
pub struct ArchiveDirectory {
    data_dir: PathBuf,
    segments: Vec<String>,
    entries: HashMap<FileID, ArchiveEntry>,
}

impl ArchiveDirectory {
    /// Scan an installation and build the directory.
    ///
    /// `root` must contain the marker settings file and a `data`
    /// subdirectory. `progress` is called after each segment with
    /// `(items_processed, items_total)`.
    pub fn load(root: &Path, progress: &mut dyn FnMut(u64, u64)) -> Result<Self> {
        if !root.join(MARKER_FILE).is_file() {
            return Err(ArchiveError::InvalidRoot(format!(
                "{} has no {MARKER_FILE}",
                root.display()
            )));
        }
        let data_dir = root.join(DATA_DIR);
        if !data_dir.is_dir() {
            return Err(ArchiveError::InvalidRoot(format!(
                "{} has no {DATA_DIR} directory",
                root.display()
            )));
        }

        // Segment main files are named by 16 hex digits, no extension.
        let mut segments = Vec::new();
        for entry in std::fs::read_dir(&data_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && name.len() == 16
                && name.bytes().all(|b| b.is_ascii_hexdigit())
            {
                segments.push(name.to_owned());
            }
        }
        // Deterministic load order regardless of filesystem enumeration
        segments.sort_unstable();

        let total = segments.len() as u64;
        let mut entries: HashMap<FileID, ArchiveEntry> = HashMap::new();
        for (segment_index, segment) in segments.iter().enumerate() {
            let path = data_dir.join(segment);
            let mut file = File::open(&path)?;
            let (header, records) = read_segment_index(&mut file)?;
            debug!(
                segment = %segment,
                files = header.file_count,
                "loaded segment index"
            );

            for record in records {
                if record.is_hollow() {
                    // A FileID with zero sections never materializes
                    warn!(id = %record.file_id(), "skipping hollow segment record");
                    continue;
                }
                let entry = entries.entry(record.file_id()).or_default();
                for section in Section::ALL {
                    if let Some((offset, len)) = record.section(section) {
                        entry.locations[section.index()] = Some(SectionLocation {
                            segment: segment_index,
                            offset,
                            len,
                        });
                    }
                }
            }
            progress(segment_index as u64 + 1, total);
        }

        info!(
            segments = segments.len(),
            files = entries.len(),
            "archive directory loaded"
        );
        Ok(Self {
            data_dir,
            segments,
            entries,
        })
    }

    /// Whether a section exists for the given file.
    pub fn exists(&self, id: FileID, section: Section) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|e| e.section(section).is_some())
    }

    /// Entry for a file, if the file is known.
    pub fn entry(&self, id: FileID) -> Option<&ArchiveEntry> {
        self.entries.get(&id)
    }

    /// Open one section as a bounded seekable reader.
    pub fn open(&self, id: FileID, section: Section) -> Result<SectionReader<File>> {
        let location = self
            .entries
            .get(&id)
            .and_then(|e| e.section(section))
            .ok_or(ArchiveError::NotFound { id, section })?;

        let path = self.section_path(location.segment, section);
        let file = File::open(path)?;
        Ok(SectionReader::new(file, location.offset, location.len))
    }

    /// Open several sections as one logical contiguous stream.
    ///
    /// Sections absent for this file are skipped; requesting a set where
    /// none exist is a not-found error on the first requested section.
    pub fn open_concatenated(
        &self,
        id: FileID,
        sections: &[Section],
    ) -> Result<ChainReader<File>> {
        let mut parts = Vec::new();
        for &section in sections {
            if self.exists(id, section) {
                parts.push(self.open(id, section)?);
            }
        }
        if parts.is_empty() {
            return Err(ArchiveError::NotFound {
                id,
                section: sections.first().copied().unwrap_or(Section::Main),
            });
        }
        Ok(ChainReader::new(parts))
    }

    /// All known file ids, in no particular order.
    pub fn file_ids(&self) -> impl Iterator<Item = FileID> + '_ {
        self.entries.keys().copied()
    }

    /// Number of known files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory holds no files.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the loaded segments, in load order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    fn section_path(&self, segment: usize, section: Section) -> PathBuf {
        self.data_dir
            .join(format!("{}{}", self.segments[segment], section.file_suffix()))
    }
}
