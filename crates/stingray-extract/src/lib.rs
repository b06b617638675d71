//! File selection, configuration and extraction pipeline for Stingray
//! archives.
//!
//! The pipeline ties the other crates together: a declarative
//! [`ExtractorConfigTemplate`] describes the known asset types, the config
//! engine validates a compact user configuration string against it, the
//! selector combines glob patterns with the per-type enabled state to
//! produce a working set of file ids, and the dispatch table maps each id's
//! type to an extract-or-convert function.

#![warn(missing_docs)]

use thiserror::Error;

pub mod config;
pub mod dispatch;
pub mod extractors;
pub mod run;
pub mod selector;
pub mod template;
pub mod transcode;

pub use config::ResolvedConfig;
pub use dispatch::{ExtractContext, Extractor, ExtractorRegistry, SectionSet, dispatch};
pub use extractors::default_registry;
pub use run::{RunReport, run_extraction};
pub use selector::select;
pub use template::{ExtractorConfigTemplate, TypeDecl};
pub use transcode::{CommandTranscoder, NullTranscoder, Transcoder};

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors surfaced by the extraction pipeline.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Configuration token unrecognized, or an illegal option/value.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested file or section is absent from the archive.
    #[error(transparent)]
    Archive(#[from] stingray_archive::ArchiveError),

    /// A container decoder rejected the file.
    #[error(transparent)]
    Format(#[from] stingray_formats::FormatError),

    /// The external transcoding collaborator exited nonzero.
    #[error("external process failed (exit code {status}): {diagnostic}")]
    Process {
        /// Process exit code, or -1 when terminated by a signal.
        status: i32,
        /// Captured diagnostic output.
        diagnostic: String,
    },

    /// Structured output could not be serialized.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying read, write or spawn failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
