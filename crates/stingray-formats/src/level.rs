//! Level container decoder
//!
//! Levels are the largest fixed-layout container: a header carrying unit,
//! prefab and material counts plus the offsets of each region, a unit
//! array at a fixed position, an offset-indexed metadata region, then the
//! prefab and material arrays.
//!
//! Metadata entries are individually length-prefixed and 4-byte aligned.
//! A slot offset of 0 means "no entry". String-typed values are
//! length-prefixed and null-terminated; the trailing null is stripped on
//! decode. Entry kinds the decoder does not know are kept as opaque bytes.

use std::io::{Read, Seek, SeekFrom};

use binrw::BinRead;
use stingray_hash::{Hash, ThinHash};

use crate::{FormatError, Result};

/// Level container magic, `LVL\0`.
pub const LEVEL_MAGIC: [u8; 4] = *b"LVL\0";

/// Number of metadata slots per unit.
pub const UNIT_SLOTS: usize = 3;

/// Metadata entry kind: opaque bytes.
pub const KIND_BYTES: u32 = 0;
/// Metadata entry kind: null-terminated string.
pub const KIND_STRING: u32 = 1;
/// Metadata entry kind: packed f32 array.
pub const KIND_FLOATS: u32 = 2;
/// Metadata entry kind: 64-bit content hash.
pub const KIND_HASH: u32 = 3;

/// Fixed level container header.
#[derive(Debug, Clone, PartialEq, Eq, BinRead)]
#[br(little)]
pub struct LevelHeader {
    /// Format magic, always `LVL\0`.
    #[br(assert(magic == LEVEL_MAGIC, "invalid level magic: {:?}", magic))]
    pub magic: [u8; 4],

    /// Container version.
    pub version: u32,

    /// Number of unit records.
    pub unit_count: u32,

    /// Number of prefab records.
    pub prefab_count: u32,

    /// Number of material slot records.
    pub material_count: u32,

    /// Byte offset of the unit array.
    pub units_offset: u32,

    /// Base byte offset of the metadata region.
    pub metadata_offset: u32,

    /// Byte offset of the prefab array.
    pub prefabs_offset: u32,

    /// Byte offset of the material array.
    pub materials_offset: u32,
}

#[derive(Debug, BinRead)]
#[br(little)]
struct RawUnit {
    name: u64,
    slots: [u32; UNIT_SLOTS],
}

#[derive(Debug, BinRead)]
#[br(little)]
struct RawMaterial {
    slot: u32,
    material: u64,
}

/// One decoded metadata value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    /// Opaque payload (unknown kinds included).
    Bytes(Vec<u8>),
    /// UTF-8 string, trailing null stripped.
    String(String),
    /// Packed f32 values.
    Floats(Vec<f32>),
    /// 64-bit content hash.
    Hash(Hash),
}

/// A placed unit with its resolved metadata slots.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelUnit {
    /// Unit resource name hash.
    pub name: Hash,
    /// Metadata slot values; `None` where the slot offset was 0.
    pub metadata: [Option<MetadataValue>; UNIT_SLOTS],
}

/// Material assignment: thin slot hash to material resource hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialSlot {
    /// Slot identifier (32-bit thin hash).
    pub slot: ThinHash,
    /// Material resource name hash.
    pub material: Hash,
}

/// Fully materialized level container.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    /// Container version from the header.
    pub version: u32,
    /// Placed units in input order.
    pub units: Vec<LevelUnit>,
    /// Referenced prefab name hashes.
    pub prefabs: Vec<Hash>,
    /// Material slot assignments.
    pub materials: Vec<MaterialSlot>,
}

impl Level {
    /// Decode a level container from the start of a section reader.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let header = LevelHeader::read(reader)?;

        reader.seek(SeekFrom::Start(u64::from(header.units_offset)))?;
        let mut raw_units = Vec::with_capacity(header.unit_count as usize);
        for _ in 0..header.unit_count {
            raw_units.push(RawUnit::read(reader)?);
        }

        let mut units = Vec::with_capacity(raw_units.len());
        for raw in &raw_units {
            let mut metadata = [const { None }; UNIT_SLOTS];
            for (slot, value) in raw.slots.iter().zip(metadata.iter_mut()) {
                if *slot != 0 {
                    *value = Some(read_metadata_entry(
                        reader,
                        u64::from(header.metadata_offset) + u64::from(*slot),
                    )?);
                }
            }
            units.push(LevelUnit {
                name: Hash(raw.name),
                metadata,
            });
        }

        reader.seek(SeekFrom::Start(u64::from(header.prefabs_offset)))?;
        let mut prefabs = Vec::with_capacity(header.prefab_count as usize);
        for _ in 0..header.prefab_count {
            let mut buf = [0u8; 8];
            reader.read_exact(&mut buf)?;
            prefabs.push(Hash(u64::from_le_bytes(buf)));
        }

        reader.seek(SeekFrom::Start(u64::from(header.materials_offset)))?;
        let mut materials = Vec::with_capacity(header.material_count as usize);
        for _ in 0..header.material_count {
            let raw = RawMaterial::read(reader)?;
            materials.push(MaterialSlot {
                slot: ThinHash(raw.slot),
                material: Hash(raw.material),
            });
        }

        Ok(Self {
            version: header.version,
            units,
            prefabs,
            materials,
        })
    }
}

/// Read one metadata entry at an absolute offset.
///
/// Entries are `{kind: u32, len: u32, payload}`, written on 4-byte
/// boundaries. The offset itself must already be aligned.
fn read_metadata_entry<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<MetadataValue> {
    if offset % 4 != 0 {
        return Err(FormatError::Structure(format!(
            "metadata entry offset {offset} is not 4-byte aligned"
        )));
    }
    reader.seek(SeekFrom::Start(offset))?;

    let mut word = [0u8; 4];
    reader.read_exact(&mut word)?;
    let kind = u32::from_le_bytes(word);
    reader.read_exact(&mut word)?;
    let len = u32::from_le_bytes(word);

    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;

    match kind {
        KIND_STRING => {
            if payload.last() != Some(&0) {
                return Err(FormatError::Structure(
                    "string metadata value is not null-terminated".into(),
                ));
            }
            payload.pop();
            let value = String::from_utf8(payload).map_err(|e| {
                FormatError::Structure(format!("string metadata value is not UTF-8: {e}"))
            })?;
            Ok(MetadataValue::String(value))
        }
        KIND_FLOATS => {
            if len % 4 != 0 {
                return Err(FormatError::Structure(format!(
                    "float metadata length {len} is not a multiple of 4"
                )));
            }
            let floats = payload
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect();
            Ok(MetadataValue::Floats(floats))
        }
        KIND_HASH => {
            if len != 8 {
                return Err(FormatError::Structure(format!(
                    "hash metadata length {len}, expected 8"
                )));
            }
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&payload);
            Ok(MetadataValue::Hash(Hash(u64::from_le_bytes(buf))))
        }
        // KIND_BYTES and anything newer the engine may emit
        _ => Ok(MetadataValue::Bytes(payload)),
    }
}
