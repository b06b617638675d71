//! Bidirectional mapping between content hashes and known plaintext names.
//!
//! The archive never stores plaintext, so every human-readable name comes
//! from wordlists hashed at load time. The table is built once at startup
//! (static wordlist plus any user-supplied lists) and is read-only
//! afterwards; all insertions must happen before concurrent reads begin.

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::murmur::{FileID, Hash, ThinHash};

/// Errors raised while loading wordlists.
#[derive(Debug, Error)]
pub enum NameTableError {
    /// Wordlist file could not be read.
    #[error("failed to read wordlist {path}: {source}")]
    Io {
        /// Path of the offending wordlist.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Lookup table resolving [`Hash`] and [`ThinHash`] values to plaintext.
///
/// Lookups are total: a hash without a known plaintext resolves to its
/// canonical little-endian hexadecimal rendering.
#[derive(Debug, Default, Clone)]
pub struct NameTable {
    by_hash: HashMap<Hash, String>,
    by_thin: HashMap<ThinHash, String>,
}

impl NameTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plaintext name, deriving both hash forms.
    ///
    /// Returns the 64-bit hash of the name. Insertions are additive only;
    /// a name is never removed once registered.
    pub fn insert(&mut self, name: &str) -> Hash {
        let hash = Hash::of(name);
        self.by_hash.entry(hash).or_insert_with(|| name.to_owned());
        self.by_thin
            .entry(hash.thin())
            .or_insert_with(|| name.to_owned());
        hash
    }

    /// Load a wordlist: one plaintext name per line.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    pub fn load_wordlist(&mut self, content: &str) -> usize {
        let mut added = 0;
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.insert(line);
            added += 1;
        }
        added
    }

    /// Load a wordlist file from disk.
    pub fn load_wordlist_file(&mut self, path: &Path) -> crate::Result<usize> {
        let file = std::fs::File::open(path).map_err(|source| NameTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut added = 0;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| NameTableError::Io {
                path: path.display().to_string(),
                source,
            })?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            self.insert(line);
            added += 1;
        }
        debug!("loaded {} names from {}", added, path.display());
        Ok(added)
    }

    /// Known plaintext for a hash, if any.
    pub fn get(&self, hash: Hash) -> Option<&str> {
        self.by_hash.get(&hash).map(String::as_str)
    }

    /// Known plaintext for a thin hash, if any.
    pub fn get_thin(&self, thin: ThinHash) -> Option<&str> {
        self.by_thin.get(&thin).map(String::as_str)
    }

    /// Resolve a hash to a display name.
    ///
    /// Returns the known plaintext when present, otherwise the canonical
    /// little-endian hexadecimal rendering. Never empty.
    pub fn resolve(&self, hash: Hash) -> String {
        self.get(hash)
            .map_or_else(|| hash.to_hex_le(), str::to_owned)
    }

    /// Resolve a thin hash to a display name (8 hex digits as fallback).
    pub fn resolve_thin(&self, thin: ThinHash) -> String {
        self.get_thin(thin)
            .map_or_else(|| thin.to_hex_le(), str::to_owned)
    }

    /// Every renderable `name.type` combination for a file id.
    ///
    /// Produces the cross product of {plaintext, LE hex, BE hex} for the
    /// name and type components, plaintext included only when known. Tool
    /// metadata historically stored hashes in either byte order and user
    /// hash lists come without a declared encoding, so selection matches
    /// against all renderings. At most 3x3 = 9 combinations.
    pub fn match_candidates(&self, id: FileID) -> Vec<String> {
        let names = self.renderings(id.name);
        let types = self.renderings(id.ty);
        let mut out = Vec::with_capacity(names.len() * types.len());
        for name in &names {
            for ty in &types {
                out.push(format!("{name}.{ty}"));
            }
        }
        out
    }

    /// Number of known plaintext names.
    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    /// Whether the table holds no plaintext names.
    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }

    fn renderings(&self, hash: Hash) -> Vec<String> {
        let mut out = Vec::with_capacity(3);
        if let Some(name) = self.get(hash) {
            out.push(name.to_owned());
        }
        out.push(hash.to_hex_le());
        out.push(hash.to_hex_be());
        out
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_name() {
        let mut table = NameTable::new();
        let hash = table.insert("content/levels/hub");
        assert_eq!(table.resolve(hash), "content/levels/hub");
        assert_eq!(table.get(hash), Some("content/levels/hub"));
    }

    #[test]
    fn test_resolve_unknown_is_le_hex() {
        let table = NameTable::new();
        let hash = Hash(0x1122_3344_5566_7788);
        assert_eq!(table.resolve(hash), "8877665544332211");
    }

    #[test]
    fn test_resolve_never_empty() {
        let table = NameTable::new();
        for raw in [0u64, 1, u64::MAX, 0xdead_beef] {
            assert!(!table.resolve(Hash(raw)).is_empty());
        }
    }

    #[test]
    fn test_resolve_round_trip() {
        let mut table = NameTable::new();
        let names = ["texture", "level", "content/audio/bank_01"];
        for name in names {
            table.insert(name);
        }
        for name in names {
            let hash = Hash::of(name);
            let resolved = table.resolve(hash);
            assert_eq!(Hash::of(&resolved), hash);
        }
    }

    #[test]
    fn test_thin_resolution() {
        let mut table = NameTable::new();
        table.insert("base_color");
        assert_eq!(table.resolve_thin(ThinHash::of("base_color")), "base_color");
        assert_eq!(table.resolve_thin(ThinHash(0x11223344)).len(), 8);
    }

    #[test]
    fn test_match_candidates_full_cross_product() {
        let mut table = NameTable::new();
        table.insert("content/ui/hud");
        table.insert("texture");
        let id = FileID::of("content/ui/hud", "texture");

        let candidates = table.match_candidates(id);
        assert_eq!(candidates.len(), 9);
        assert!(candidates.contains(&"content/ui/hud.texture".to_string()));
        // hex-only combinations are present as well
        let hex_pair = format!("{}.{}", id.name.to_hex_be(), id.ty.to_hex_be());
        assert!(candidates.contains(&hex_pair));
    }

    #[test]
    fn test_match_candidates_without_plaintext() {
        let table = NameTable::new();
        let id = FileID::of("unknown/asset", "unknown_type");
        let candidates = table.match_candidates(id);
        // 2 name renderings x 2 type renderings
        assert_eq!(candidates.len(), 4);
        for candidate in &candidates {
            assert!(candidate.contains('.'));
        }
    }

    #[test]
    fn test_wordlist_loading() {
        let mut table = NameTable::new();
        let added = table.load_wordlist(
            "# common names\n\ncontent/levels/hub\ncontent/ui/hud\n  \n# end\n",
        );
        assert_eq!(added, 2);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.resolve(Hash::of("content/ui/hud")),
            "content/ui/hud"
        );
    }

    #[test]
    fn test_wordlist_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("names.txt");
        std::fs::write(&path, "alpha\nbeta\n").expect("write");

        let mut table = NameTable::new();
        let added = table.load_wordlist_file(&path).expect("load");
        assert_eq!(added, 2);
        assert_eq!(table.resolve(Hash::of("alpha")), "alpha");

        let missing = table.load_wordlist_file(&dir.path().join("absent.txt"));
        assert!(missing.is_err());
    }

    #[test]
    fn test_insert_is_additive() {
        let mut table = NameTable::new();
        table.insert("alpha");
        table.insert("alpha");
        assert_eq!(table.len(), 1);
    }
}
