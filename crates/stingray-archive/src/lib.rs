//! Hash-addressed virtual archive directory for Stingray game data.
//!
//! A Stingray installation keeps its assets in archive segments under
//! `data/`, each segment a triad of physical files: the main file (with the
//! segment's index), an optional `.stream` companion and an optional
//! `.gpu_resources` companion. One logical asset may be split across up to
//! three sections, one per physical file.
//!
//! [`ArchiveDirectory`] scans the installation once, builds the immutable
//! FileID to section-location table and hands out bounded random-access
//! readers over individual sections (or several sections concatenated into
//! one logical stream).

#![warn(missing_docs)]

use std::fmt;

use stingray_hash::FileID;
use thiserror::Error;

pub mod directory;
pub mod locate;
pub mod reader;
pub mod segment;

pub use directory::{ArchiveDirectory, ArchiveEntry, SectionLocation};
pub use locate::{ExplicitPath, GameLocator};
pub use reader::{ChainReader, SectionReader};

/// Result type for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Marker file expected at the installation root.
pub const MARKER_FILE: &str = "settings.ini";

/// Subdirectory holding the archive segments.
pub const DATA_DIR: &str = "data";

/// Errors that can occur while opening or reading the archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Root directory is not a Stingray installation.
    #[error("invalid game root: {0}")]
    InvalidRoot(String),

    /// Segment index failed to parse.
    #[error("segment index error: {0}")]
    Parse(#[from] binrw::Error),

    /// Segment index is internally inconsistent.
    #[error("segment error: {0}")]
    Segment(String),

    /// Requested file or section does not exist in the directory.
    #[error("not found: {id} section {section}")]
    NotFound {
        /// Requested file id.
        id: FileID,
        /// Requested section.
        section: Section,
    },
}

/// One of the up-to-three physical sections composing an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Headers and self-contained payloads, stored in the main segment file.
    Main,
    /// Bulk streaming payload, stored in the `.stream` companion.
    Stream,
    /// GPU-resident payload, stored in the `.gpu_resources` companion.
    Gpu,
}

impl Section {
    /// All sections in canonical order.
    pub const ALL: [Self; 3] = [Self::Main, Self::Stream, Self::Gpu];

    /// Filename suffix of the physical file holding this section.
    pub fn file_suffix(self) -> &'static str {
        match self {
            Self::Main => "",
            Self::Stream => ".stream",
            Self::Gpu => ".gpu_resources",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Main => 0,
            Self::Stream => 1,
            Self::Gpu => 2,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Main => "main",
            Self::Stream => "stream",
            Self::Gpu => "gpu",
        };
        f.write_str(name)
    }
}
