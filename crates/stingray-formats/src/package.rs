//! Package index decoder
//!
//! A `package` asset lists the files a content package pulls in: a fixed
//! header followed by `file_count` pairs of (type hash, name hash). There
//! are no variable-length fields.

use std::io::{Read, Seek};

use binrw::BinRead;
use stingray_hash::{FileID, Hash};

use crate::Result;

/// Package index magic value.
pub const PACKAGE_MAGIC: u32 = 43;

/// Fixed package index header.
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct PackageHeader {
    /// Format magic, always 43.
    #[br(assert(magic == PACKAGE_MAGIC, "invalid package magic: expected 43, got {}", magic))]
    pub magic: u32,

    /// Reserved, observed as zero.
    pub reserved: [u32; 2],

    /// Number of (type, name) pairs that follow.
    pub file_count: u32,

    /// Reserved, observed as zero.
    pub reserved2: u32,
}

/// Decoded package index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIndex {
    /// Referenced files in input order.
    pub entries: Vec<FileID>,
}

impl PackageIndex {
    /// Decode a package index from the start of a section reader.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let header = PackageHeader::read(reader)?;
        let mut entries = Vec::with_capacity(header.file_count as usize);
        for _ in 0..header.file_count {
            let entry = RawEntry::read(reader)?;
            entries.push(FileID::new(Hash(entry.name), Hash(entry.ty)));
        }
        Ok(Self { entries })
    }

    /// Number of referenced files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the package references no files.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, BinRead)]
#[br(little)]
struct RawEntry {
    ty: u64,
    name: u64,
}
