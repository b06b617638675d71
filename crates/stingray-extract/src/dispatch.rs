//! Type-driven extraction dispatch.
//!
//! A registry maps type names to [`Extractor`] implementations. Dispatch
//! of one file id resolves its names, opens every section present in the
//! directory, assembles an [`ExtractContext`] and invokes either the
//! extractor's raw path or its conversion path depending on the type's
//! `format` option. Section readers live inside the context and are
//! dropped when dispatch returns, whatever the outcome.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use tracing::trace;

use stingray_archive::{ArchiveDirectory, ArchiveError, Section, SectionReader};
use stingray_hash::{FileID, NameTable};

use crate::config::ResolvedConfig;
use crate::template::{ExtractorConfigTemplate, FORMAT_OPTION, SOURCE_FORMAT};
use crate::transcode::Transcoder;
use crate::{ExtractError, Result};

/// The up-to-three opened section readers of one file.
pub struct SectionSet {
    /// Main section, when present.
    pub main: Option<SectionReader<File>>,
    /// Stream section, when present.
    pub stream: Option<SectionReader<File>>,
    /// GPU section, when present.
    pub gpu: Option<SectionReader<File>>,
}

impl SectionSet {
    /// Open every section the directory records for `id`.
    pub fn open(dir: &ArchiveDirectory, id: FileID) -> Result<Self> {
        let mut sections = [None, None, None];
        for (slot, section) in sections.iter_mut().zip(Section::ALL) {
            if dir.exists(id, section) {
                *slot = Some(dir.open(id, section)?);
            }
        }
        let [main, stream, gpu] = sections;
        Ok(Self { main, stream, gpu })
    }

    /// Mutable access to one section's reader.
    pub fn get_mut(&mut self, section: Section) -> Option<&mut SectionReader<File>> {
        match section {
            Section::Main => self.main.as_mut(),
            Section::Stream => self.stream.as_mut(),
            Section::Gpu => self.gpu.as_mut(),
        }
    }

    /// Whether no section is present.
    pub fn is_empty(&self) -> bool {
        self.main.is_none() && self.stream.is_none() && self.gpu.is_none()
    }
}

/// Everything an extractor needs to process one file.
pub struct ExtractContext<'a> {
    /// The file being processed.
    pub id: FileID,
    /// Resolved name (plaintext or hex rendering).
    pub name: String,
    /// Effective type name driving the dispatch.
    pub type_name: String,
    /// Opened section readers.
    pub sections: SectionSet,
    /// Effective options for the type.
    pub options: BTreeMap<String, String>,
    /// Shared name registry for rendering cross-references.
    pub names: &'a NameTable,
    /// External transcoding collaborator.
    pub transcoder: &'a dyn Transcoder,
    /// Opens a section of another file, for formats whose records point
    /// at sibling assets.
    pub sibling: &'a dyn Fn(FileID, Section) -> Option<SectionReader<File>>,
    /// Root of the output tree.
    pub out_root: &'a Path,
}

impl ExtractContext<'_> {
    /// Output path for this file with the given extension.
    pub fn output_path(&self, extension: &str) -> PathBuf {
        self.out_root.join(format!("{}.{extension}", self.name))
    }

    /// Create the output file for this id, including parent directories.
    ///
    /// Resolved names contain `/` separators that become real
    /// subdirectories of the output root.
    pub fn create_output(&self, extension: &str) -> Result<(PathBuf, BufWriter<File>)> {
        let path = self.output_path(extension);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(&path)?;
        Ok((path, BufWriter::new(file)))
    }

    /// The main section reader, or a structure error when absent.
    pub fn require_main(&mut self) -> Result<&mut SectionReader<File>> {
        self.sections.main.as_mut().ok_or_else(|| {
            ExtractError::Archive(ArchiveError::NotFound {
                id: self.id,
                section: Section::Main,
            })
        })
    }
}

/// One extractable type's processing logic.
pub trait Extractor {
    /// Write the file's bytes without interpretation.
    fn extract(&self, ctx: &mut ExtractContext<'_>) -> Result<()>;

    /// Decode the file and write a converted representation.
    ///
    /// Types without a conversion fall through to raw extraction.
    fn convert(&self, ctx: &mut ExtractContext<'_>) -> Result<()> {
        self.extract(ctx)
    }
}

/// Registration table from type name to extractor.
#[derive(Default)]
pub struct ExtractorRegistry {
    table: HashMap<String, Box<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extractor under a type name.
    pub fn register(&mut self, ty: &str, extractor: Box<dyn Extractor>) {
        self.table.insert(ty.to_owned(), extractor);
    }

    /// Extractor registered under a type name.
    pub fn get(&self, ty: &str) -> Option<&dyn Extractor> {
        self.table.get(ty).map(Box::as_ref)
    }
}

/// Process one file id.
///
/// Resolves names, opens the file's sections, picks the extractor for
/// the effective type (falling back to the template's fallback type for
/// unrecognized types) and runs its raw or conversion path per the
/// `format` option. A file that is absent from the directory, or present
/// with zero sections, is a hard error.
#[allow(clippy::too_many_arguments)]
pub fn dispatch(
    id: FileID,
    dir: &ArchiveDirectory,
    names: &NameTable,
    registry: &ExtractorRegistry,
    template: &ExtractorConfigTemplate,
    config: &ResolvedConfig,
    transcoder: &dyn Transcoder,
    out_root: &Path,
) -> Result<()> {
    if dir.entry(id).is_none() {
        return Err(ExtractError::Archive(ArchiveError::NotFound {
            id,
            section: Section::Main,
        }));
    }

    let rendered = names.resolve(id.ty);
    let effective = if template.is_type(&rendered) {
        rendered
    } else {
        template.fallback().to_owned()
    };
    let extractor = registry
        .get(&effective)
        .or_else(|| registry.get(template.fallback()))
        .ok_or_else(|| {
            ExtractError::Validation(format!("no extractor registered for '{effective}'"))
        })?;

    let sections = SectionSet::open(dir, id)?;
    if sections.is_empty() {
        return Err(ExtractError::Archive(ArchiveError::NotFound {
            id,
            section: Section::Main,
        }));
    }

    let options = config.options_for(&effective);
    let sibling = |sid: FileID, section: Section| dir.open(sid, section).ok();
    let mut ctx = ExtractContext {
        id,
        name: names.resolve(id.name),
        type_name: effective,
        sections,
        options,
        names,
        transcoder,
        sibling: &sibling,
        out_root,
    };

    trace!(id = %ctx.id.name, ty = %ctx.type_name, "dispatching");
    if ctx.options.get(FORMAT_OPTION).map(String::as_str) == Some(SOURCE_FORMAT) {
        extractor.extract(&mut ctx)
    } else {
        extractor.convert(&mut ctx)
    }
}
