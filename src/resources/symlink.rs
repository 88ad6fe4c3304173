//! Symlink primitives used by the link engine and the backup vault.
use std::io;
use std::path::Path;

/// Create a symlink at `link` pointing to `target`.
///
/// Fails with [`io::ErrorKind::AlreadyExists`] when anything is already at
/// `link`; nothing is ever replaced.
///
/// # Errors
///
/// Returns the underlying I/O error.
pub fn create_symlink(target: &Path, link: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link)
    }

    #[cfg(windows)]
    {
        if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        }
    }
}

/// Remove the symlink at `path` without touching what it points to.
///
/// On Windows, directory symlinks must be removed with `remove_dir`; the raw
/// `FILE_ATTRIBUTE_DIRECTORY` bit identifies them.
///
/// # Errors
///
/// Returns [`io::ErrorKind::InvalidInput`] if `path` is not a symlink, or the
/// underlying I/O error.
pub fn remove_symlink(path: &Path) -> io::Result<()> {
    let meta = std::fs::symlink_metadata(path)?;
    if !meta.file_type().is_symlink() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("not a symlink: {}", path.display()),
        ));
    }
    if is_dir_like(&meta) {
        std::fs::remove_dir(path)
    } else {
        std::fs::remove_file(path)
    }
}

fn is_dir_like(meta: &std::fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0 // FILE_ATTRIBUTE_DIRECTORY
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}
