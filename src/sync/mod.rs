//! Link engine: makes every selected target a symlink into the repository.
//!
//! A sync pass runs three phases over the selected bundles, each in catalog
//! order with entries in declared order:
//!
//! 1. **protect**: real content at a target is moved into a backup session
//! 2. **unlink**: stale symlinks are removed (never what they point to)
//! 3. **link**: a symlink to `<repo>/<bundle>/<entry>` is created
//!
//! Every outcome lands in a [`SyncReport`]; nothing in a pass is fatal.
pub mod report;

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::catalog::Bundle;
use crate::logging::Log;
use crate::resources::TargetState;
use crate::resources::backup::BackupVault;
use crate::resources::helpers::fs::ensure_parent_dir;
use crate::resources::symlink::{create_symlink, remove_symlink};
use report::{Outcome, SkipReason, SyncReport};

/// Replaces targets in the home tree with symlinks into the repository.
pub struct LinkEngine<'a> {
    repo: PathBuf,
    home: PathBuf,
    allow_data_loss: bool,
    log: &'a dyn Log,
}

impl fmt::Debug for LinkEngine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkEngine")
            .field("repo", &self.repo)
            .field("home", &self.home)
            .field("allow_data_loss", &self.allow_data_loss)
            .finish_non_exhaustive()
    }
}

impl<'a> LinkEngine<'a> {
    /// Engine linking from `repo` (should be absolute) into `home`.
    #[must_use]
    pub fn new(repo: impl Into<PathBuf>, home: impl Into<PathBuf>, log: &'a dyn Log) -> Self {
        Self {
            repo: repo.into(),
            home: home.into(),
            allow_data_loss: false,
            log,
        }
    }

    /// Allow the unlink phase to recursively delete a real directory that
    /// sits where a directory bundle links.
    #[must_use]
    pub const fn allow_data_loss(mut self, allow: bool) -> Self {
        self.allow_data_loss = allow;
        self
    }

    /// Run protect, unlink, and link over `bundles`.
    pub fn sync(&self, bundles: &[&Bundle], vault: &mut BackupVault<'_>) -> SyncReport {
        let mut report = SyncReport::new();
        for bundle in bundles {
            vault.protect(bundle, &bundle.resolve_target_root(&self.home), &mut report);
        }
        self.unlink(bundles, &mut report);
        self.link(bundles, &mut report);
        report
    }

    /// Remove symlinks at every target. Real directories of directory
    /// bundles are removed only when data loss is allowed; any other real
    /// content is left for the link phase to report.
    pub fn unlink(&self, bundles: &[&Bundle], report: &mut SyncReport) {
        for bundle in bundles {
            let root = bundle.resolve_target_root(&self.home);
            for entry in bundle.entries() {
                let target = root.join(entry);
                let outcome = match TargetState::inspect(&target) {
                    Ok(TargetState::Symlink(_)) => match remove_symlink(&target) {
                        Ok(()) => Outcome::Unlinked,
                        Err(e) => Outcome::Failed(format!("cannot remove symlink: {e}")),
                    },
                    Ok(TargetState::Directory) if bundle.is_directory() && self.allow_data_loss => {
                        match std::fs::remove_dir_all(&target) {
                            Ok(()) => Outcome::Removed,
                            Err(e) => Outcome::Failed(format!("cannot remove directory: {e}")),
                        }
                    }
                    Ok(_) => continue,
                    Err(e) => Outcome::Failed(format!("cannot inspect target: {e}")),
                };
                report.record(self.log, bundle.name(), &target, outcome);
            }
        }
    }

    /// Create a symlink at every target whose source exists. An occupied
    /// target blocks only its own entry.
    pub fn link(&self, bundles: &[&Bundle], report: &mut SyncReport) {
        for bundle in bundles {
            let root = bundle.resolve_target_root(&self.home);
            let source_dir = bundle.source_dir(&self.repo);
            for entry in bundle.entries() {
                let target = root.join(entry);
                let source = source_dir.join(entry);
                let outcome = self.link_entry(bundle, &source, &target);
                report.record(self.log, bundle.name(), &target, outcome);
            }
        }
    }

    fn link_entry(&self, bundle: &Bundle, source: &Path, target: &Path) -> Outcome {
        if source.symlink_metadata().is_err() {
            return Outcome::Skipped(SkipReason::MissingSource);
        }
        if let Err(e) = ensure_parent_dir(target) {
            return Outcome::Failed(format!("cannot create parent directory: {e}"));
        }
        match create_symlink(source, target) {
            Ok(()) => Outcome::Linked {
                source: source.to_path_buf(),
            },
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Outcome::Skipped(self.occupied_reason(bundle, target))
            }
            Err(e) => Outcome::Failed(format!("cannot create symlink: {e}")),
        }
    }

    fn occupied_reason(&self, bundle: &Bundle, target: &Path) -> SkipReason {
        let real_dir = matches!(TargetState::inspect(target), Ok(TargetState::Directory));
        if real_dir && bundle.is_directory() && !self.allow_data_loss {
            SkipReason::RealContentPreserved
        } else {
            SkipReason::TargetExists
        }
    }
}
