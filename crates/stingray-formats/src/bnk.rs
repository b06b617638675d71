//! Audio bank (BNK) demuxer
//!
//! A `wwise_bank` asset wraps a Wwise soundbank in a 16-byte Stingray
//! envelope: 4-byte tag, declared body size and the bank's name hash. The
//! declared size must equal the total file size minus 16; a mismatch is a
//! fatal format error, not a warning.
//!
//! The body is the usual chunked soundbank layout, except the packaging
//! step obfuscates the identifying fields of the leading `BKHD` chunk: the
//! chunk id and the version field are stored XOR-masked against fixed
//! constants. The demuxer unmasks both before validating them.
//!
//! Embedded streams are listed in the `DIDX` chunk and live inside the
//! `DATA` chunk; they are demuxed lazily as byte ranges rather than
//! materialized up front.

use std::io::{Read, Seek, SeekFrom};

use binrw::BinRead;
use stingray_hash::Hash;

use crate::{FormatError, Result};

/// Envelope tag, `BNK\0`.
pub const BNK_TAG: [u8; 4] = *b"BNK\0";

/// Size of the Stingray envelope preceding the soundbank body.
pub const ENVELOPE_SIZE: u64 = 16;

/// XOR mask applied to the stored `BKHD` chunk id.
pub const CHUNK_ID_MASK: u32 = 0x9e37_79b9;

/// XOR mask applied to the stored soundbank version field.
pub const VERSION_MASK: u32 = 0x55aa_41ed;

const BKHD: u32 = u32::from_le_bytes(*b"BKHD");
const DIDX: u32 = u32::from_le_bytes(*b"DIDX");
const DATA: u32 = u32::from_le_bytes(*b"DATA");

/// Stingray envelope around the soundbank body.
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct BnkHeader {
    /// Envelope tag, always `BNK\0`.
    #[br(assert(tag == BNK_TAG, "invalid bank tag: {:?}", tag))]
    pub tag: [u8; 4],

    /// Declared body size; must equal total file size minus 16.
    pub size: u32,

    /// Bank name hash.
    pub name: u64,
}

/// Location of one embedded stream inside the `DATA` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct WemEntry {
    /// Wwise stream id.
    pub id: u32,
    /// Byte offset relative to the start of the `DATA` chunk payload.
    pub offset: u32,
    /// Stream size in bytes.
    pub size: u32,
}

/// Demuxed audio bank: header fields plus lazily-addressable streams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BnkFile {
    /// Bank name hash from the envelope.
    pub name: Hash,
    /// Unmasked soundbank version.
    pub version: u32,
    /// Soundbank id from the `BKHD` chunk.
    pub bank_id: u32,
    /// Embedded stream directory, in `DIDX` order.
    pub entries: Vec<WemEntry>,
    /// Absolute offset of the `DATA` chunk payload, if present.
    data_offset: Option<u64>,
}

impl BnkFile {
    /// Demux a bank from the start of a section reader.
    ///
    /// Walks the chunk chain once and records stream ranges; no stream
    /// payload is read here.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let total = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let header = BnkHeader::read(reader)?;
        if u64::from(header.size) != total.saturating_sub(ENVELOPE_SIZE) {
            return Err(FormatError::Structure(format!(
                "bank size mismatch: header declares {}, body is {}",
                header.size,
                total.saturating_sub(ENVELOPE_SIZE)
            )));
        }

        // Leading chunk: id and version are stored masked.
        let stored_id = read_u32(reader)?;
        if stored_id ^ CHUNK_ID_MASK != BKHD {
            return Err(FormatError::Structure(format!(
                "bank body does not start with BKHD (stored id {stored_id:#010x})"
            )));
        }
        let bkhd_size = read_u32(reader)?;
        if bkhd_size < 8 {
            return Err(FormatError::Structure(format!(
                "BKHD chunk too small: {bkhd_size} bytes"
            )));
        }
        let bkhd_end = reader.stream_position()? + u64::from(bkhd_size);
        let version = read_u32(reader)? ^ VERSION_MASK;
        let bank_id = read_u32(reader)?;
        reader.seek(SeekFrom::Start(bkhd_end))?;

        let mut entries = Vec::new();
        let mut data_offset = None;
        while reader.stream_position()? < total {
            let id = read_u32(reader)?;
            let size = read_u32(reader)?;
            let payload_start = reader.stream_position()?;
            let payload_end = payload_start + u64::from(size);
            if payload_end > total {
                return Err(FormatError::Structure(format!(
                    "chunk {:?} overruns the bank body",
                    id.to_le_bytes()
                )));
            }
            match id {
                DIDX => {
                    if size % 12 != 0 {
                        return Err(FormatError::Structure(format!(
                            "DIDX size {size} is not a multiple of 12"
                        )));
                    }
                    for _ in 0..size / 12 {
                        entries.push(WemEntry::read(reader)?);
                    }
                }
                DATA => {
                    data_offset = Some(payload_start);
                }
                // HIRC, STID and friends are passed over as opaque bytes
                _ => {}
            }
            reader.seek(SeekFrom::Start(payload_end))?;
        }

        if !entries.is_empty() && data_offset.is_none() {
            return Err(FormatError::Structure(
                "bank lists embedded streams but has no DATA chunk".into(),
            ));
        }
        for entry in &entries {
            if let Some(base) = data_offset {
                let end = base + u64::from(entry.offset) + u64::from(entry.size);
                if end > total {
                    return Err(FormatError::Structure(format!(
                        "stream {} overruns the DATA chunk",
                        entry.id
                    )));
                }
            }
        }

        Ok(Self {
            name: Hash(header.name),
            version,
            bank_id,
            entries,
            data_offset,
        })
    }

    /// Number of embedded streams.
    pub fn stream_count(&self) -> usize {
        self.entries.len()
    }

    /// Absolute byte range of an embedded stream, if the index is valid.
    pub fn stream_bounds(&self, index: usize) -> Option<(u64, u64)> {
        let entry = self.entries.get(index)?;
        let base = self.data_offset?;
        let start = base + u64::from(entry.offset);
        Some((start, u64::from(entry.size)))
    }

    /// Read one embedded stream's bytes from the same reader.
    pub fn read_stream<R: Read + Seek>(&self, reader: &mut R, index: usize) -> Result<Vec<u8>> {
        let (start, len) = self.stream_bounds(index).ok_or_else(|| {
            FormatError::Structure(format!("no embedded stream at index {index}"))
        })?;
        reader.seek(SeekFrom::Start(start))?;
        let mut buf = vec![0u8; len as usize];
        reader.read_exact(&mut buf)?;
        Ok(buf)
    }
}

fn read_u32<R: Read>(reader: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
