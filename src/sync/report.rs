//! Per-entry outcomes of a sync or rollback pass.
use std::fmt;
use std::path::{Path, PathBuf};

use crate::logging::Log;

/// Why an entry was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The repository has no `<bundle>/<entry>` to link to.
    MissingSource,
    /// Something already occupies the target path.
    TargetExists,
    /// A real directory sits where a directory bundle links, and data-loss
    /// removal was not allowed.
    RealContentPreserved,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSource => write!(f, "source missing in repository"),
            Self::TargetExists => write!(f, "target already exists"),
            Self::RealContentPreserved => write!(
                f,
                "real directory left in place (pass --allow-data-loss to remove it)"
            ),
        }
    }
}

/// What happened to one target path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Real content was moved into the backup session.
    BackedUp {
        /// Location inside the session directory.
        to: PathBuf,
    },
    /// A stale symlink was removed.
    Unlinked,
    /// A real directory was removed recursively.
    Removed,
    /// A symlink to the repository was created.
    Linked {
        /// Absolute source inside the repository.
        source: PathBuf,
    },
    /// Backed-up content was moved back into place.
    Restored {
        /// Session path it came from.
        from: PathBuf,
    },
    /// The entry was left alone.
    Skipped(SkipReason),
    /// The entry could not be processed; the pass continued.
    Failed(String),
}

/// One line of a [`SyncReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    /// Bundle the entry belongs to.
    pub bundle: String,
    /// Target path in the home tree.
    pub path: PathBuf,
    /// What happened.
    pub outcome: Outcome,
}

/// Ordered record of every outcome in a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    entries: Vec<EntryReport>,
}

impl SyncReport {
    /// Empty report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an outcome and log it; skips and failures become tagged
    /// warnings of the form `[bundle] path: reason`.
    pub fn record(&mut self, log: &dyn Log, bundle: &str, path: &Path, outcome: Outcome) {
        let tag = format!("[{bundle}] {}", path.display());
        match &outcome {
            Outcome::BackedUp { to } => log.info(&format!("{tag}: backed up to {}", to.display())),
            Outcome::Unlinked => log.debug(&format!("{tag}: removed stale symlink")),
            Outcome::Removed => log.warn(&format!("{tag}: removed real directory")),
            Outcome::Linked { source } => log.debug(&format!("{tag} -> {}", source.display())),
            Outcome::Restored { from } => {
                log.info(&format!("{tag}: restored from {}", from.display()));
            }
            Outcome::Skipped(reason) => log.warn(&format!("{tag}: {reason}")),
            Outcome::Failed(error) => log.warn(&format!("{tag}: {error}")),
        }
        self.entries.push(EntryReport {
            bundle: bundle.to_string(),
            path: path.to_path_buf(),
            outcome,
        });
    }

    /// Every recorded outcome in order.
    #[must_use]
    pub fn entries(&self) -> &[EntryReport] {
        &self.entries
    }

    /// Outcomes recorded for `path`, in order.
    pub fn outcomes_for<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a Outcome> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.path == path)
            .map(|e| &e.outcome)
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }

    /// Number of links created.
    #[must_use]
    pub fn linked(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Linked { .. }))
    }

    /// Number of entries moved into the backup session.
    #[must_use]
    pub fn backed_up(&self) -> usize {
        self.count(|o| matches!(o, Outcome::BackedUp { .. }))
    }

    /// Number of entries restored from a backup session.
    #[must_use]
    pub fn restored(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Restored { .. }))
    }

    /// Number of skipped entries.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    /// Number of failed entries.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    /// Whether any entry failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// One-line count summary, e.g. `8 linked, 1 backed up, 0 skipped, 0 failed`.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} linked, {} backed up, {} skipped, {} failed",
            self.linked(),
            self.backed_up(),
            self.skipped(),
            self.failed()
        )
    }
}
