//! Binary container decoders for Stingray archive assets.
//!
//! Every decoder consumes a reader positioned at offset 0 of a section and
//! parses a fixed little-endian header, then either materializes a bounded
//! structured record (package index, build-info, level container) or
//! exposes lazily-opened sub-streams (audio banks).
//!
//! Structural inconsistencies abort a decode entirely; no decoder emits a
//! truncated best-effort result. Substructures the decoders do not
//! recognize are carried as opaque bytes.

#![warn(missing_docs)]

pub mod bnk;
pub mod build_info;
pub mod level;
pub mod package;
pub mod texture;
pub mod wem;

use thiserror::Error;

/// Result type for format decoding.
pub type Result<T> = std::result::Result<T, FormatError>;

/// Errors raised while decoding a container format.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Underlying read or seek failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Fixed header failed to parse (bad magic, short read).
    #[error("binary parse error: {0}")]
    Parse(#[from] binrw::Error),

    /// Header fields are internally inconsistent.
    #[error("structural error: {0}")]
    Structure(String),

    /// Payload carries a magic the decoder does not recognize.
    #[error("unrecognized payload format: {0}")]
    Unrecognized(String),
}
