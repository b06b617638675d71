//! Segment index parsing.
//!
//! Every segment's main file starts with a little-endian index: a fixed
//! header followed by one 52-byte record per logical asset, mapping the
//! asset's FileID to its per-section byte ranges. A section size of 0 marks
//! that section absent. Segment files are append-only; the index never
//! changes after the segment is written.

use std::io::{Read, Seek};

use binrw::BinRead;
use stingray_hash::{FileID, Hash};

use crate::{ArchiveError, Result, Section};

/// Segment index magic value.
pub const SEGMENT_MAGIC: u32 = 0xF000_0011;

/// Size of the fixed segment header in bytes.
pub const SEGMENT_HEADER_SIZE: u64 = 16;

/// Size of one index record in bytes.
pub const SEGMENT_RECORD_SIZE: u64 = 52;

/// Fixed segment index header.
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct SegmentHeader {
    /// Index magic, always `0xF0000011`.
    #[br(assert(magic == SEGMENT_MAGIC, "invalid segment magic: {:#010x}", magic))]
    pub magic: u32,

    /// Index format version.
    pub version: u32,

    /// Number of records that follow.
    pub file_count: u32,

    /// Reserved, observed as zero.
    pub reserved: u32,
}

/// One index record: FileID plus per-section byte ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct SegmentRecord {
    /// Asset name hash.
    pub name: u64,
    /// Asset type hash.
    pub ty: u64,
    /// Byte offset of the main section within the main segment file.
    pub main_offset: u64,
    /// Byte offset of the stream section within the `.stream` file.
    pub stream_offset: u64,
    /// Byte offset of the GPU section within the `.gpu_resources` file.
    pub gpu_offset: u64,
    /// Main section size; 0 means absent.
    pub main_size: u32,
    /// Stream section size; 0 means absent.
    pub stream_size: u32,
    /// GPU section size; 0 means absent.
    pub gpu_size: u32,
}

impl SegmentRecord {
    /// The record's file id.
    pub fn file_id(&self) -> FileID {
        FileID::new(Hash(self.name), Hash(self.ty))
    }

    /// Byte range of a section, or `None` when the section is absent.
    pub fn section(&self, section: Section) -> Option<(u64, u64)> {
        let (offset, size) = match section {
            Section::Main => (self.main_offset, self.main_size),
            Section::Stream => (self.stream_offset, self.stream_size),
            Section::Gpu => (self.gpu_offset, self.gpu_size),
        };
        (size != 0).then_some((offset, u64::from(size)))
    }

    /// Whether the record describes no sections at all.
    pub fn is_hollow(&self) -> bool {
        Section::ALL.iter().all(|s| self.section(*s).is_none())
    }
}

/// Parse a segment index from the start of a segment's main file.
pub fn read_segment_index<R: Read + Seek>(
    reader: &mut R,
) -> Result<(SegmentHeader, Vec<SegmentRecord>)> {
    let header = SegmentHeader::read(reader)?;
    let mut records = Vec::with_capacity(header.file_count as usize);
    for _ in 0..header.file_count {
        records.push(SegmentRecord::read(reader)?);
    }

    // Main offsets must land past the index itself
    let index_end = SEGMENT_HEADER_SIZE + u64::from(header.file_count) * SEGMENT_RECORD_SIZE;
    for record in &records {
        if let Some((offset, _)) = record.section(Section::Main)
            && offset < index_end
        {
            return Err(ArchiveError::Segment(format!(
                "record {} main section at {offset} overlaps the index (ends at {index_end})",
                record.file_id()
            )));
        }
    }

    Ok((header, records))
}
