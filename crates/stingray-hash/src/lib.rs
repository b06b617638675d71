//! Murmur64A hashing and name resolution for Stingray archives.
//!
//! Stingray archives address every asset by a pair of 64-bit Murmur64A
//! hashes (name and type). Plaintext names are not stored anywhere in the
//! archive; this crate carries the hash primitives plus the [`NameTable`]
//! that maps known plaintext strings back onto their hashes.
//!
//! # Example
//!
//! ```rust
//! use stingray_hash::{Hash, NameTable};
//!
//! let mut names = NameTable::new();
//! names.insert("content/textures/logo");
//!
//! let hash = Hash::of("content/textures/logo");
//! assert_eq!(names.resolve(hash), "content/textures/logo");
//! ```

#![warn(missing_docs)]

mod murmur;
mod name_table;

pub use murmur::{FileID, Hash, ThinHash, murmur64a};
pub use name_table::{NameTable, NameTableError};

/// Result type for name table operations.
pub type Result<T> = std::result::Result<T, NameTableError>;
