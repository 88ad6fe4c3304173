//! File-system primitives: what currently occupies a link target, how real
//! content is relocated into a backup session, and how symlinks are made.
pub mod backup;
pub mod helpers;
pub mod symlink;

use std::io;
use std::path::{Path, PathBuf};

/// What currently occupies a target path, inspected without following a
/// final symlink.
///
/// # Examples
///
/// ```
/// use dotfiles_sync::resources::TargetState;
/// use std::path::Path;
///
/// let state = TargetState::inspect(Path::new("/nonexistent/dotfiles/target")).unwrap();
/// assert_eq!(state, TargetState::Absent);
/// assert!(!state.is_real());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetState {
    /// Nothing is there.
    Absent,
    /// A symlink (possibly dangling) with its link text.
    Symlink(PathBuf),
    /// A real file (or any non-directory, non-symlink node).
    File,
    /// A real directory.
    Directory,
}

impl TargetState {
    /// Inspect `path`.
    ///
    /// # Errors
    ///
    /// Returns an error for any failure other than the path not existing.
    pub fn inspect(path: &Path) -> io::Result<Self> {
        let meta = match std::fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::Absent),
            Err(e) => return Err(e),
        };
        if meta.file_type().is_symlink() {
            Ok(Self::Symlink(std::fs::read_link(path)?))
        } else if meta.is_dir() {
            Ok(Self::Directory)
        } else {
            Ok(Self::File)
        }
    }

    /// Whether the path holds real user content that a link would shadow.
    #[must_use]
    pub const fn is_real(&self) -> bool {
        matches!(self, Self::File | Self::Directory)
    }
}
