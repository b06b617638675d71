//! Glob-based file selection.
//!
//! Patterns match `<name>.<type>` renderings of each file id; every
//! rendering produced by [`NameTable::match_candidates`] is tried, so a
//! pattern can target a plaintext name, a little-endian hex hash or a
//! big-endian hex hash interchangeably. A pattern with no literal `.`
//! matches the name part and accepts any type suffix.

use std::collections::HashSet;

use regex::Regex;
use tracing::debug;

use stingray_archive::ArchiveDirectory;
use stingray_hash::{FileID, NameTable};

use crate::config::ResolvedConfig;
use crate::template::ExtractorConfigTemplate;
use crate::{ExtractError, Result};

/// Compute the working set of file ids to process.
///
/// A file is selected iff it matches at least one include pattern (an
/// empty include list matches everything), matches no exclude pattern,
/// and its effective type resolves to enabled. The effective type is the
/// rendered type name when the template declares it, else the template's
/// fallback type.
pub fn select(
    include: &[String],
    exclude: &[String],
    template: &ExtractorConfigTemplate,
    config: &ResolvedConfig,
    names: &NameTable,
    dir: &ArchiveDirectory,
) -> Result<HashSet<FileID>> {
    let include = compile_patterns(include)?;
    let exclude = compile_patterns(exclude)?;

    let mut selected = HashSet::new();
    for id in dir.file_ids() {
        let rendered_type = names.resolve(id.ty);
        let effective = if template.is_type(&rendered_type) {
            rendered_type.as_str()
        } else {
            template.fallback()
        };
        if !config.enabled(effective, template) {
            continue;
        }

        let candidates = names.match_candidates(id);
        let included = include.is_empty()
            || candidates
                .iter()
                .any(|c| include.iter().any(|re| re.is_match(c)));
        if !included {
            continue;
        }
        let excluded = candidates
            .iter()
            .any(|c| exclude.iter().any(|re| re.is_match(c)));
        if excluded {
            continue;
        }
        selected.insert(id);
    }

    debug!(
        selected = selected.len(),
        total = dir.len(),
        "computed working set"
    );
    Ok(selected)
}

fn compile_patterns(globs: &[String]) -> Result<Vec<Regex>> {
    globs
        .iter()
        .map(|glob| {
            Regex::new(&glob_to_regex(glob)).map_err(|e| {
                ExtractError::Validation(format!("invalid pattern '{glob}': {e}"))
            })
        })
        .collect()
}

/// Convert a glob pattern to an anchored case-insensitive regex.
///
/// Supports `*`, `?`, `[...]` classes and `{a,b}` alternation. A pattern
/// without a literal `.` outside classes and alternations is extended
/// with `.*` so it matches any type suffix.
fn glob_to_regex(glob: &str) -> String {
    let glob = if has_literal_dot(glob) {
        glob.to_owned()
    } else {
        format!("{glob}.*")
    };

    let mut regex = String::new();
    let mut chars = glob.chars().peekable();

    regex.push('^');
    while let Some(ch) = chars.next() {
        match ch {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '[' => {
                regex.push('[');
                for ch in chars.by_ref() {
                    regex.push(ch);
                    if ch == ']' {
                        break;
                    }
                }
            }
            '{' => {
                // Convert {a,b,c} to (a|b|c)
                regex.push('(');
                for ch in chars.by_ref() {
                    if ch == '}' {
                        break;
                    } else if ch == ',' {
                        regex.push('|');
                    } else {
                        if "^$()[]{}|+.\\".contains(ch) {
                            regex.push('\\');
                        }
                        regex.push(ch);
                    }
                }
                regex.push(')');
            }
            ch if "^$()[]{}|+.\\".contains(ch) => {
                regex.push('\\');
                regex.push(ch);
            }
            ch => regex.push(ch),
        }
    }
    regex.push('$');

    format!("(?i){regex}")
}

/// Whether the pattern carries a literal `.` outside character classes
/// and brace alternations.
fn has_literal_dot(glob: &str) -> bool {
    let mut depth = 0usize;
    let mut in_class = false;
    for ch in glob.chars() {
        match ch {
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '{' if !in_class => depth += 1,
            '}' if !in_class => depth = depth.saturating_sub(1),
            '.' if !in_class && depth == 0 => return true,
            _ => {}
        }
    }
    false
}
