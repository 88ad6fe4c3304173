//! Backup vault: moves real user content out of the way before a link
//! replaces it, and moves it back on rollback.
//!
//! Each run that meets real content gets its own session directory,
//! `<base>/backup_<YYYYmmdd_HHMMSS>[_<label>]`, created lazily on the first
//! conflict. Sessions are never reused and never deleted by this crate.
use chrono::{DateTime, Local};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::TargetState;
use super::helpers::fs::{copy_tree, ensure_parent_dir, remove_tree, trees_match};
use super::symlink::remove_symlink;
use crate::config::catalog::Bundle;
use crate::error::BackupError;
use crate::logging::Log;
use crate::sync::report::{Outcome, SkipReason, SyncReport};

/// File-name prefix shared by every session directory.
pub const SESSION_PREFIX: &str = "backup_";

/// Upper bound on `-N` collision suffixes tried for one timestamp.
const MAX_COLLISION_SUFFIX: u32 = 1000;

/// One timestamped backup directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSession {
    timestamp: DateTime<Local>,
    root: PathBuf,
}

impl BackupSession {
    /// Create a fresh session directory under `base`.
    ///
    /// The directory is created with `create_dir`, so an existing session is
    /// never reused; on collision `-1`, `-2`, … is appended.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Session`] if `base` cannot be created or no
    /// free directory name is found.
    pub fn create(
        base: &Path,
        label: Option<&str>,
        timestamp: DateTime<Local>,
    ) -> Result<Self, BackupError> {
        let session_err = |source: io::Error| BackupError::Session {
            base: base.to_path_buf(),
            source,
        };
        fs::create_dir_all(base).map_err(session_err)?;

        let mut name = format!("{SESSION_PREFIX}{}", timestamp.format("%Y%m%d_%H%M%S"));
        if let Some(label) = label.filter(|l| !l.is_empty()) {
            name.push('_');
            name.push_str(label);
        }

        for attempt in 0..=MAX_COLLISION_SUFFIX {
            let candidate = if attempt == 0 {
                base.join(&name)
            } else {
                base.join(format!("{name}-{attempt}"))
            };
            match fs::create_dir(&candidate) {
                Ok(()) => {
                    return Ok(Self {
                        timestamp,
                        root: candidate,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
                Err(e) => return Err(session_err(e)),
            }
        }
        Err(session_err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free session name for {name}"),
        )))
    }

    /// Session directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// When the session was opened.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }
}

/// Relocates real content found at link targets into a backup session.
pub struct BackupVault<'a> {
    base: PathBuf,
    label: Option<String>,
    session: Option<BackupSession>,
    log: &'a dyn Log,
}

impl fmt::Debug for BackupVault<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackupVault")
            .field("base", &self.base)
            .field("label", &self.label)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl<'a> BackupVault<'a> {
    /// Vault writing sessions under `base`, suffixed with `label` (the distro).
    #[must_use]
    pub fn new(base: impl Into<PathBuf>, label: Option<&str>, log: &'a dyn Log) -> Self {
        Self {
            base: base.into(),
            label: label.map(String::from),
            session: None,
            log,
        }
    }

    /// The session opened by this vault, if any conflict has been met yet.
    #[must_use]
    pub const fn session(&self) -> Option<&BackupSession> {
        self.session.as_ref()
    }

    /// Move every real file or directory at `bundle`'s targets under
    /// `target_root` into the session. Absent targets and symlinks are left
    /// alone. A failed entry is recorded and the pass continues.
    pub fn protect(&mut self, bundle: &Bundle, target_root: &Path, report: &mut SyncReport) {
        for entry in bundle.entries() {
            let target = target_root.join(entry);
            let outcome = match TargetState::inspect(&target) {
                Ok(state) if !state.is_real() => continue,
                Ok(_) => match self.back_up(bundle.name(), entry.as_path(), &target) {
                    Ok(to) => Outcome::BackedUp { to },
                    Err(e) => Outcome::Failed(e.to_string()),
                },
                Err(e) => Outcome::Failed(format!("cannot inspect target: {e}")),
            };
            report.record(self.log, bundle.name(), &target, outcome);
        }
    }

    fn back_up(&mut self, bundle: &str, entry: &Path, target: &Path) -> Result<PathBuf, BackupError> {
        let dest = self.open_session()?.root().join(bundle).join(entry);
        relocate(target, &dest)?;
        Ok(dest)
    }

    fn open_session(&mut self) -> Result<&BackupSession, BackupError> {
        let session = match self.session.take() {
            Some(session) => session,
            None => {
                let session =
                    BackupSession::create(&self.base, self.label.as_deref(), Local::now())?;
                self.log.info(&format!(
                    "backup session opened {}: {}",
                    session.timestamp().format("%Y-%m-%d %H:%M:%S"),
                    session.root().display()
                ));
                session
            }
        };
        Ok(self.session.insert(session))
    }
}

/// Move `src` to `dest`.
///
/// Tries a rename first. When that fails (typically across devices) the tree
/// is copied with inner symlinks preserved, verified by SHA-256, and only
/// then is the original deleted. An existing `dest` is never overwritten.
///
/// # Errors
///
/// - [`BackupError::BackupExists`] if anything is already at `dest`.
/// - [`BackupError::Verification`] if the copy does not match; the partial
///   copy is removed and `src` is left intact.
/// - [`BackupError::Relocate`] for any other I/O failure.
pub fn relocate(src: &Path, dest: &Path) -> Result<(), BackupError> {
    relocate_with(src, dest, rename)
}

fn rename(from: &Path, to: &Path) -> io::Result<()> {
    fs::rename(from, to)
}

/// [`relocate`] with the in-place move supplied by the caller, so the
/// copy-and-verify fallback can be driven directly.
fn relocate_with(
    src: &Path,
    dest: &Path,
    rename: impl FnOnce(&Path, &Path) -> io::Result<()>,
) -> Result<(), BackupError> {
    if dest.symlink_metadata().is_ok() {
        return Err(BackupError::BackupExists(dest.to_path_buf()));
    }
    let io_err = |source: io::Error| BackupError::Relocate {
        path: src.to_path_buf(),
        source,
    };
    ensure_parent_dir(dest).map_err(io_err)?;

    if rename(src, dest).is_ok() {
        return Ok(());
    }

    if let Err(e) = copy_tree(src, dest) {
        remove_tree(dest).ok();
        return Err(io_err(e));
    }
    if !trees_match(src, dest).map_err(io_err)? {
        remove_tree(dest).ok();
        return Err(BackupError::Verification(src.to_path_buf()));
    }
    remove_tree(src).map_err(io_err)
}

/// Session directories under `base`, oldest first. A missing base yields an
/// empty list.
///
/// # Errors
///
/// Returns an error if `base` exists but cannot be read.
pub fn list_sessions(base: &Path) -> io::Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(base) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };
    let mut sessions = Vec::new();
    for entry in entries {
        let entry = entry?;
        let is_session = entry.file_name().to_string_lossy().starts_with(SESSION_PREFIX);
        if is_session && entry.file_type()?.is_dir() {
            sessions.push(entry.path());
        }
    }
    sessions.sort_by_cached_key(|path| session_order(path));
    Ok(sessions)
}

/// Sort key for a session directory: the name without its collision suffix,
/// then the suffix as a number, so `-10` follows `-9`.
fn session_order(path: &Path) -> (String, u32) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.rsplit_once('-') {
        Some((stem, suffix)) if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) => {
            suffix
                .parse()
                .map_or_else(|_| (name.clone(), 0), |n| (stem.to_string(), n))
        }
        _ => (name, 0),
    }
}

/// Move everything saved in `session` back to its target under `home`.
///
/// Only entries of `bundles` that the session holds are touched. A symlink
/// at the target is removed first; real content at the target is never
/// overwritten and the entry is skipped instead.
pub fn restore_session(
    session: &Path,
    bundles: &[&Bundle],
    home: &Path,
    log: &dyn Log,
) -> SyncReport {
    let mut report = SyncReport::new();
    for bundle in bundles {
        let target_root = bundle.resolve_target_root(home);
        for entry in bundle.entries() {
            let saved = session.join(bundle.name()).join(entry);
            if saved.symlink_metadata().is_err() {
                continue;
            }
            let target = target_root.join(entry);
            let outcome = restore_entry(&saved, &target);
            report.record(log, bundle.name(), &target, outcome);
        }
    }
    report
}

fn restore_entry(saved: &Path, target: &Path) -> Outcome {
    match TargetState::inspect(target) {
        Ok(TargetState::Absent) => {}
        Ok(TargetState::Symlink(_)) => {
            if let Err(e) = remove_symlink(target) {
                return Outcome::Failed(format!("cannot remove symlink: {e}"));
            }
        }
        Ok(TargetState::File | TargetState::Directory) => {
            return Outcome::Skipped(SkipReason::TargetExists);
        }
        Err(e) => return Outcome::Failed(format!("cannot inspect target: {e}")),
    }
    match relocate(saved, target) {
        Ok(()) => Outcome::Restored {
            from: saved.to_path_buf(),
        },
        Err(e) => Outcome::Failed(e.to_string()),
    }
}
