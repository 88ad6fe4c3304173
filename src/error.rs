//! Domain-specific error types for the dotfiles engine.
//!
//! Library modules return typed errors built with [`thiserror`]; command
//! handlers at the CLI boundary convert them to [`anyhow::Error`] via `?`.
//!
//! # Error hierarchy
//!
//! ```text
//! SyncError
//! ├── Catalog(CatalogError)  : bundle table loading and validation
//! └── RepositoryUnavailable  : clone failed and nothing exists to sync
//!
//! BackupError                : per-entry relocation failure, recorded in
//!                              the sync report rather than aborting
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for a sync run.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Catalog could not be loaded or is inconsistent.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The repository does not exist and could not be cloned.
    #[error("repository unavailable at {path}: {reason}")]
    RepositoryUnavailable {
        /// Where the repository was expected.
        path: PathBuf,
        /// Why it could not be obtained.
        reason: String,
    },
}

/// Errors that arise while building or loading the bundle catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// An entry path is absolute, empty, or escapes the bundle root.
    #[error("invalid entry path '{path}': {reason}")]
    InvalidEntry {
        /// Offending path as written.
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A bundle name is empty or is not a single directory name.
    #[error("invalid bundle name '{name}': {reason}")]
    InvalidBundleName {
        /// Offending name as written.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A bundle declares no entries.
    #[error("bundle '{0}' has no entries")]
    EmptyBundle(String),

    /// Two bundles share a name.
    #[error("duplicate bundle '{0}'")]
    DuplicateBundle(String),

    /// The catalog override file exists but cannot be read or parsed.
    #[error("cannot load catalog from {path}: {message}")]
    Load {
        /// Path of the override file.
        path: PathBuf,
        /// Underlying reader or parser message.
        message: String,
    },
}

/// Errors that arise while relocating real content into a backup session.
#[derive(Error, Debug)]
pub enum BackupError {
    /// The relocation target already exists; earlier backups are never clobbered.
    #[error("backup path already exists: {0}")]
    BackupExists(PathBuf),

    /// The session directory could not be created.
    #[error("cannot create backup session under {base}: {source}")]
    Session {
        /// Backup base directory.
        base: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Copied content does not match the original.
    #[error("backup verification failed for {0}")]
    Verification(PathBuf),

    /// Moving or copying the content failed.
    #[error("cannot relocate {path}: {source}")]
    Relocate {
        /// Path that was being relocated.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
