//! External transcoding boundary.
//!
//! Converters that need real media transcoding (Vorbis-in-WEM audio,
//! block-compressed textures) hand their payload to a [`Transcoder`]
//! instead of decoding it themselves. The shipped implementations shell
//! out to a user-supplied command line or copy the payload unchanged.

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use crate::{ExtractError, Result};

/// Converts a file on disk into another representation on disk.
pub trait Transcoder {
    /// Transcode `input` into `output`, with tool-specific extra `args`.
    fn transcode(&self, input: &Path, output: &Path, args: &[String]) -> Result<()>;
}

/// Transcoder that invokes an external command.
///
/// The command is invoked as `program <args...> <input> <output>`. A
/// nonzero exit status surfaces as [`ExtractError::Process`] carrying the
/// process's captured standard error.
#[derive(Debug, Clone)]
pub struct CommandTranscoder {
    program: String,
}

impl CommandTranscoder {
    /// Build a transcoder around an external program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Transcoder for CommandTranscoder {
    fn transcode(&self, input: &Path, output: &Path, args: &[String]) -> Result<()> {
        debug!(program = %self.program, input = %input.display(), "spawning transcoder");
        let result = Command::new(&self.program)
            .args(args)
            .arg(input)
            .arg(output)
            .output()?;
        if result.status.success() {
            return Ok(());
        }
        let diagnostic = String::from_utf8_lossy(&result.stderr).trim().to_owned();
        warn!(program = %self.program, %diagnostic, "transcoder failed");
        Err(ExtractError::Process {
            status: result.status.code().unwrap_or(-1),
            diagnostic,
        })
    }
}

/// Transcoder that copies the input byte-for-byte.
///
/// Stands in where no external tool is configured and in tests.
#[derive(Debug, Clone, Default)]
pub struct NullTranscoder;

impl Transcoder for NullTranscoder {
    fn transcode(&self, input: &Path, output: &Path, _args: &[String]) -> Result<()> {
        std::fs::copy(input, output)?;
        Ok(())
    }
}
