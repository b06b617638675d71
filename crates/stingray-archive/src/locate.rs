//! Game install location boundary.
//!
//! Discovery through a platform package manager's installed-app registry
//! lives outside this crate; callers plug their own [`GameLocator`]
//! implementations in. The only implementation shipped here resolves an
//! explicitly supplied path.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::MARKER_FILE;

/// A strategy for finding the installed game's root directory.
pub trait GameLocator {
    /// Return the install root, if this strategy can find one.
    fn locate(&self) -> Option<PathBuf>;
}

/// Locator for an explicitly supplied install path.
///
/// Yields the path only when it looks like a Stingray installation
/// (marker settings file present).
#[derive(Debug, Clone)]
pub struct ExplicitPath(pub PathBuf);

impl GameLocator for ExplicitPath {
    fn locate(&self) -> Option<PathBuf> {
        if self.0.join(MARKER_FILE).is_file() {
            Some(self.0.clone())
        } else {
            debug!("{} does not look like a game install", self.0.display());
            None
        }
    }
}

/// Try locators in order, returning the first hit.
pub fn locate_install(locators: &[&dyn GameLocator]) -> Option<PathBuf> {
    locators.iter().find_map(|l| l.locate())
}

/// Convenience check used by callers that accept arbitrary paths.
pub fn looks_like_install(path: &Path) -> bool {
    path.join(MARKER_FILE).is_file()
}
