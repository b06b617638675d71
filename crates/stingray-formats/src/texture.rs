//! Texture header decoder
//!
//! Texture assets carry a Stingray header with up to 15 streaming-mip
//! descriptor slots, then the actual pixel container at a declared start
//! offset. The decoder sniffs a 4-byte magic at that offset: `DDS ` means
//! the payload is a standard container passed through (or handed to the
//! external transcoder); any other magic is an unrecognized-format error
//! with no silent fallback.

use std::io::{Read, Seek, SeekFrom};

use binrw::BinRead;

use crate::{FormatError, Result};

/// Number of streaming-mip descriptor slots in the header.
pub const MIP_SLOTS: usize = 15;

/// Magic of a standard DDS payload.
pub const DDS_MAGIC: [u8; 4] = *b"DDS ";

/// Size of the fixed texture header in bytes.
pub const HEADER_SIZE: u32 = 8 + MIP_SLOTS as u32 * 12;

/// One streaming-mip descriptor. Unused slots are all zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct MipSlot {
    /// Offset of the mip's bytes in the GPU section.
    pub offset: u32,
    /// Mip size in bytes.
    pub size: u32,
    /// Mip width in pixels.
    pub width: u16,
    /// Mip height in pixels.
    pub height: u16,
}

impl MipSlot {
    /// Whether this slot describes a mip.
    pub fn is_present(&self) -> bool {
        self.size != 0
    }
}

/// Fixed texture header.
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct TextureHeader {
    /// Header version.
    pub version: u32,

    /// Offset where the pixel container starts.
    pub data_offset: u32,

    /// Streaming-mip descriptor slots.
    pub mips: [MipSlot; MIP_SLOTS],
}

/// Decoded texture: header plus the location of a recognized payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    /// Parsed header.
    pub header: TextureHeader,
    /// Absolute offset of the DDS payload.
    pub payload_offset: u64,
}

impl Texture {
    /// Decode a texture from the start of a section reader.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let header = TextureHeader::read(reader)?;
        if header.data_offset < HEADER_SIZE {
            return Err(FormatError::Structure(format!(
                "texture data offset {} overlaps the header",
                header.data_offset
            )));
        }

        reader.seek(SeekFrom::Start(u64::from(header.data_offset)))?;
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != DDS_MAGIC {
            return Err(FormatError::Unrecognized(format!(
                "texture payload magic {} is not DDS",
                hex::encode(magic)
            )));
        }

        Ok(Self {
            payload_offset: u64::from(header.data_offset),
            header,
        })
    }

    /// Descriptors of the mips that stream from the GPU section.
    pub fn streaming_mips(&self) -> impl Iterator<Item = &MipSlot> {
        self.header.mips.iter().filter(|m| m.is_present())
    }

    /// Copy the DDS payload into `dest`, starting at the sniffed magic.
    pub fn copy_payload<R: Read + Seek, W: std::io::Write>(
        &self,
        reader: &mut R,
        dest: &mut W,
    ) -> Result<u64> {
        reader.seek(SeekFrom::Start(self.payload_offset))?;
        Ok(std::io::copy(reader, dest)?)
    }
}
