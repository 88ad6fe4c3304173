//! File-system helpers shared by the backup vault and the link engine.
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Recursively copy `src` to `dst`.
///
/// Unlike a plain recursive copy, symlinks inside the tree are recreated as
/// symlinks with the same link text rather than followed.
///
/// # Errors
///
/// Returns an error if any entry cannot be read, created, or copied.
pub fn copy_tree(src: &Path, dst: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(src)?;
    if meta.file_type().is_symlink() {
        let link = fs::read_link(src)?;
        crate::resources::symlink::create_symlink(&link, dst)
    } else if meta.is_dir() {
        fs::create_dir(dst)?;
        for entry in fs::read_dir(src)? {
            let entry = entry?;
            copy_tree(&entry.path(), &dst.join(entry.file_name()))?;
        }
        fs::set_permissions(dst, meta.permissions())
    } else {
        fs::copy(src, dst).map(|_| ())
    }
}

/// Remove `path` whatever it is: a file, a symlink (not its target), or a
/// directory tree.
///
/// # Errors
///
/// Returns an error if the path cannot be inspected or removed.
pub fn remove_tree(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Lowercase hex SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    use std::fmt::Write as _;

    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(64);
    for b in &digest {
        // write! to a String is infallible.
        write!(hex, "{b:02x}").unwrap_or(());
    }
    Ok(hex)
}

/// Whether `copy` is an exact replica of `original`: same tree shape, same
/// symlink text, and byte-identical file contents by SHA-256.
///
/// # Errors
///
/// Returns an error if either tree cannot be read.
pub fn trees_match(original: &Path, copy: &Path) -> io::Result<bool> {
    let a = fs::symlink_metadata(original)?;
    let b = match fs::symlink_metadata(copy) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };

    if a.file_type().is_symlink() || b.file_type().is_symlink() {
        return Ok(a.file_type().is_symlink()
            && b.file_type().is_symlink()
            && fs::read_link(original)? == fs::read_link(copy)?);
    }
    if a.is_dir() != b.is_dir() {
        return Ok(false);
    }
    if !a.is_dir() {
        return Ok(a.len() == b.len() && sha256_file(original)? == sha256_file(copy)?);
    }

    let mut left = entry_names(original)?;
    let mut right = entry_names(copy)?;
    left.sort();
    right.sort();
    if left != right {
        return Ok(false);
    }
    for name in &left {
        if !trees_match(&original.join(name), &copy.join(name))? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn entry_names(dir: &Path) -> io::Result<Vec<std::ffi::OsString>> {
    fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ensure_parent_dir_creates_missing_parents() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("file.txt");
        ensure_parent_dir(&nested).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
    }

    #[test]
    fn ensure_parent_dir_accepts_bare_name() {
        ensure_parent_dir(Path::new("file.txt")).unwrap();
    }

    #[test]
    fn copy_tree_copies_files_and_subdirectories() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        fs::write(src.path().join("a.txt"), b"aaa").unwrap();
        fs::create_dir(src.path().join("sub")).unwrap();
        fs::write(src.path().join("sub/b.txt"), b"bbb").unwrap();

        let target = dst.path().join("out");
        copy_tree(src.path(), &target).unwrap();

        assert_eq!(fs::read(target.join("a.txt")).unwrap(), b"aaa");
        assert_eq!(fs::read(target.join("sub/b.txt")).unwrap(), b"bbb");
        assert!(trees_match(src.path(), &target).unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn copy_tree_preserves_inner_symlinks() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        fs::write(src.path().join("real"), b"x").unwrap();
        std::os::unix::fs::symlink("real", src.path().join("alias")).unwrap();

        let target = dst.path().join("out");
        copy_tree(src.path(), &target).unwrap();

        let alias = target.join("alias");
        assert!(alias.symlink_metadata().unwrap().file_type().is_symlink());
        assert_eq!(fs::read_link(alias).unwrap(), Path::new("real"));
        assert!(trees_match(src.path(), &target).unwrap());
    }

    #[test]
    fn trees_match_detects_content_change() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a"), b"same-len-1").unwrap();
        fs::write(dir.path().join("b"), b"same-len-2").unwrap();
        assert!(!trees_match(&dir.path().join("a"), &dir.path().join("b")).unwrap());
    }

    #[test]
    fn trees_match_detects_missing_entry() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        fs::write(src.path().join("a"), b"a").unwrap();
        assert!(!trees_match(src.path(), dst.path()).unwrap());
        assert!(!trees_match(src.path(), &dst.path().join("absent")).unwrap());
    }

    #[test]
    fn remove_tree_handles_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, b"x").unwrap();
        let tree = dir.path().join("t");
        fs::create_dir_all(tree.join("inner")).unwrap();
        fs::write(tree.join("inner/g"), b"y").unwrap();

        remove_tree(&file).unwrap();
        remove_tree(&tree).unwrap();
        assert!(!file.exists());
        assert!(!tree.exists());
    }

    #[test]
    fn sha256_of_known_input() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("abc");
        fs::write(&file, b"abc").unwrap();
        assert_eq!(
            sha256_file(&file).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
