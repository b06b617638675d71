//! Murmur64A hash implementation for Stingray asset identifiers
//!
//! This is a port of Austin Appleby's MurmurHash64A as used by the Stingray
//! engine for content addressing. The engine hashes UTF-8 path strings with
//! seed 0 and stores the resulting 64-bit value; material slots and variable
//! names only keep the low 32 bits ([`ThinHash`]).

use std::fmt;

const M: u64 = 0xc6a4_a793_5bd1_e995;
const R: u32 = 47;

/// Compute the Murmur64A hash of `data` with the given seed.
///
/// Stingray always uses seed 0 for content hashing; the seed parameter
/// exists for completeness with the reference implementation.
///
/// # Examples
///
/// ```
/// use stingray_hash::murmur64a;
///
/// let hash = murmur64a(b"content/levels/hub", 0);
/// assert_ne!(hash, 0);
/// ```
pub fn murmur64a(data: &[u8], seed: u64) -> u64 {
    let mut h = seed ^ (data.len() as u64).wrapping_mul(M);

    let mut chunks = data.chunks_exact(8);
    for chunk in &mut chunks {
        // chunks_exact guarantees 8 bytes
        let mut k = u64::from_le_bytes([
            chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5], chunk[6], chunk[7],
        ]);
        k = k.wrapping_mul(M);
        k ^= k >> R;
        k = k.wrapping_mul(M);
        h ^= k;
        h = h.wrapping_mul(M);
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let mut last = [0u8; 8];
        last[..tail.len()].copy_from_slice(tail);
        h ^= u64::from_le_bytes(last);
        h = h.wrapping_mul(M);
    }

    h ^= h >> R;
    h = h.wrapping_mul(M);
    h ^= h >> R;
    h
}

/// 64-bit content hash identifying an asset name or type.
///
/// Equality is value equality. A hash has two canonical hexadecimal
/// renderings: little-endian byte order ([`Hash::to_hex_le`], the default
/// display form used when no plaintext is known) and big-endian byte order
/// ([`Hash::to_hex_be`]). Tool metadata in the wild uses either, so both are
/// accepted as matching candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash(pub u64);

impl Hash {
    /// Hash a plaintext string the way the engine does (seed 0).
    pub fn of(name: &str) -> Self {
        Self(murmur64a(name.as_bytes(), 0))
    }

    /// Raw 64-bit value.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Truncate to the 32-bit form used for material slots and variables.
    pub const fn thin(self) -> ThinHash {
        ThinHash(self.0 as u32)
    }

    /// Hexadecimal rendering in little-endian byte order.
    pub fn to_hex_le(self) -> String {
        hex::encode(self.0.to_le_bytes())
    }

    /// Hexadecimal rendering in big-endian byte order.
    pub fn to_hex_be(self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_le())
    }
}

/// 32-bit truncation of a [`Hash`] (low 32 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThinHash(pub u32);

impl ThinHash {
    /// Hash a plaintext string and truncate.
    pub fn of(name: &str) -> Self {
        Hash::of(name).thin()
    }

    /// Raw 32-bit value.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Hexadecimal rendering in little-endian byte order.
    pub fn to_hex_le(self) -> String {
        hex::encode(self.0.to_le_bytes())
    }

    /// Hexadecimal rendering in big-endian byte order.
    pub fn to_hex_be(self) -> String {
        format!("{:08x}", self.0)
    }
}

impl fmt::Display for ThinHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_le())
    }
}

/// Composite key identifying one logical asset: name hash plus type hash.
///
/// This is the map key throughout the archive directory and the extraction
/// pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileID {
    /// Hash of the asset path.
    pub name: Hash,
    /// Hash of the asset type (extension).
    pub ty: Hash,
}

impl FileID {
    /// Create a file id from raw hash values.
    pub const fn new(name: Hash, ty: Hash) -> Self {
        Self { name, ty }
    }

    /// Hash both components of a plaintext `name.type` pair.
    pub fn of(name: &str, ty: &str) -> Self {
        Self {
            name: Hash::of(name),
            ty: Hash::of(ty),
        }
    }
}

impl fmt::Display for FileID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.ty)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_murmur64a_empty() {
        // Seed 0 over empty input still runs the finalizer
        assert_eq!(murmur64a(b"", 0), 0);
        assert_ne!(murmur64a(b"", 1), murmur64a(b"", 2));
    }

    #[test]
    fn test_murmur64a_deterministic() {
        let data = b"content/audio/music_bank";
        assert_eq!(murmur64a(data, 0), murmur64a(data, 0));
        assert_ne!(murmur64a(data, 0), murmur64a(data, 1));
    }

    #[test]
    fn test_murmur64a_lengths() {
        // Exercise the tail handling around the 8-byte boundary
        let mut previous = Vec::new();
        for len in 0..=17usize {
            let data: Vec<u8> = (0..len as u8).collect();
            let hash = murmur64a(&data, 0);
            assert!(
                !previous.contains(&hash),
                "collision at length {len}: {hash:#018x}"
            );
            previous.push(hash);
        }
    }

    #[test]
    fn test_murmur64a_tail_is_zero_padded() {
        // A trailing zero byte must change the hash even though the tail
        // buffer is zero-initialized (length participates in the state).
        let a = murmur64a(b"abc", 0);
        let b = murmur64a(b"abc\0", 0);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hash_renderings() {
        let hash = Hash(0x1122_3344_5566_7788);
        assert_eq!(hash.to_hex_be(), "1122334455667788");
        assert_eq!(hash.to_hex_le(), "8877665544332211");
        assert_eq!(format!("{hash}"), "8877665544332211");
    }

    #[test]
    fn test_thin_hash() {
        let hash = Hash(0x1122_3344_5566_7788);
        let thin = hash.thin();
        assert_eq!(thin.raw(), 0x5566_7788);
        assert_eq!(thin.to_hex_be(), "55667788");
        assert_eq!(thin.to_hex_le(), "88776655");
    }

    #[test]
    fn test_file_id_equality() {
        let a = FileID::of("content/levels/hub", "level");
        let b = FileID::new(Hash::of("content/levels/hub"), Hash::of("level"));
        assert_eq!(a, b);
        assert_ne!(a, FileID::of("content/levels/hub", "texture"));
    }

    #[test]
    fn test_hash_round_trip_over_plaintext() {
        for name in ["texture", "level", "wwise_bank", "content/ui/hud"] {
            let hash = Hash::of(name);
            assert_eq!(Hash::of(name), hash);
            assert_eq!(hash.to_hex_le().len(), 16);
            assert_eq!(hash.to_hex_be().len(), 16);
        }
    }
}
