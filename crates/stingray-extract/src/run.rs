//! Full extraction run over a selected working set.

use std::collections::HashSet;
use std::path::Path;

use tracing::{error, info};

use stingray_archive::ArchiveDirectory;
use stingray_hash::{FileID, NameTable};

use crate::config::ResolvedConfig;
use crate::dispatch::{ExtractorRegistry, dispatch};
use crate::template::ExtractorConfigTemplate;
use crate::transcode::Transcoder;
use crate::Result;

/// Outcome of one extraction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Files in the working set.
    pub selected: usize,
    /// Files extracted without error.
    pub succeeded: usize,
}

impl RunReport {
    /// Whether every selected file was extracted.
    pub fn is_complete(&self) -> bool {
        self.succeeded == self.selected
    }
}

/// Dispatch every file in the working set.
///
/// A per-file failure is logged under the file's resolved name and
/// counted; the run always continues to the next file. Only the final
/// tally reports how much of the set succeeded.
#[allow(clippy::too_many_arguments)]
pub fn run_extraction(
    working_set: &HashSet<FileID>,
    dir: &ArchiveDirectory,
    names: &NameTable,
    registry: &ExtractorRegistry,
    template: &ExtractorConfigTemplate,
    config: &ResolvedConfig,
    transcoder: &dyn Transcoder,
    out_root: &Path,
) -> Result<RunReport> {
    std::fs::create_dir_all(out_root)?;

    let mut report = RunReport {
        selected: working_set.len(),
        succeeded: 0,
    };
    for &id in working_set {
        match dispatch(
            id, dir, names, registry, template, config, transcoder, out_root,
        ) {
            Ok(()) => report.succeeded += 1,
            Err(e) => {
                let name = names.resolve(id.name);
                let ty = names.resolve(id.ty);
                error!(file = %name, ty = %ty, "extraction failed: {e}");
            }
        }
    }

    info!(
        succeeded = report.succeeded,
        selected = report.selected,
        "extraction run finished"
    );
    Ok(report)
}
