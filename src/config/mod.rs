//! Run configuration: where the repository, home tree, and backups live.
pub mod catalog;
pub mod toml_loader;

use anyhow::{Result, bail};
use std::path::PathBuf;

use crate::cli::GlobalOpts;

/// Clone URL used by `restore` when neither flag nor env var names one.
pub const DEFAULT_REPO_URL: &str = "https://github.com/danialrami/dotfiles";

/// Resolved locations for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Dotfiles repository root.
    pub repo: PathBuf,
    /// Home directory that `~` expands to.
    pub home: PathBuf,
    /// Directory holding `backup_*` session directories.
    pub backup_base: PathBuf,
}

impl Config {
    /// Resolve every location from flags, then the process environment,
    /// then defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn resolve(global: &GlobalOpts) -> Result<Self> {
        Self::resolve_with(global, |key| std::env::var(key).ok())
    }

    /// Like [`resolve`](Self::resolve) with an injectable environment lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn resolve_with(global: &GlobalOpts, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let home = match global.home.clone() {
            Some(home) => home,
            None => match env("HOME").filter(|h| !h.is_empty()) {
                Some(home) => PathBuf::from(home),
                None => bail!("HOME environment variable is not set; use --home"),
            },
        };

        let repo = global
            .root
            .clone()
            .or_else(|| env("DOTFILES_ROOT").map(PathBuf::from))
            .unwrap_or_else(|| home.join(".dotfiles"));

        let backup_base = global
            .backup_dir
            .clone()
            .or_else(|| env("DOTFILES_BACKUP_DIR").map(PathBuf::from))
            .unwrap_or_else(|| home.join("dotfiles-backup"));

        Ok(Self {
            repo,
            home,
            backup_base,
        })
    }

    /// Package-manager bundle manifest inside the repository.
    #[must_use]
    pub fn brewfile(&self) -> PathBuf {
        self.repo.join("brew").join("Brewfile")
    }

    /// Whether the repository directory exists.
    #[must_use]
    pub fn repo_exists(&self) -> bool {
        self.repo.is_dir()
    }

    /// Canonical repository path when it exists, so that link sources are
    /// absolute even when `--root` was relative.
    #[must_use]
    pub fn canonical_repo(&self) -> PathBuf {
        dunce::canonicalize(&self.repo).unwrap_or_else(|_| self.repo.clone())
    }
}

/// Resolve the clone URL from a flag, `DOTFILES_REPO`, or the default.
#[must_use]
pub fn resolve_repo_url(flag: Option<&str>, env: impl Fn(&str) -> Option<String>) -> String {
    flag.map(ToString::to_string)
        .or_else(|| env("DOTFILES_REPO"))
        .unwrap_or_else(|| DEFAULT_REPO_URL.to_string())
}
