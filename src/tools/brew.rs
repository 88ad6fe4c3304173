//! Homebrew bundle export and import.
use anyhow::{Context as _, Result};
use std::path::Path;

use crate::exec::Executor;

/// The `brew` package manager.
#[derive(Debug, Clone, Copy)]
pub struct Brew<'a> {
    executor: &'a dyn Executor,
}

impl<'a> Brew<'a> {
    /// Run `brew` through `executor`.
    ///
    /// ```
    /// use dotfiles_sync::exec::SystemExecutor;
    /// use dotfiles_sync::tools::brew::Brew;
    ///
    /// let brew = Brew::new(&SystemExecutor);
    /// let _on_path = brew.available();
    /// ```
    #[must_use]
    pub const fn new(executor: &'a dyn Executor) -> Self {
        Self { executor }
    }

    /// Whether `brew` is on `PATH`.
    #[must_use]
    pub fn available(&self) -> bool {
        self.executor.which("brew")
    }

    /// Write the installed package list to `brewfile`, replacing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or
    /// `brew bundle dump` fails.
    pub fn export(&self, brewfile: &Path) -> Result<()> {
        if let Some(parent) = brewfile.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        let file_arg = format!("--file={}", brewfile.display());
        self.executor
            .run("brew", &["bundle", "dump", "--force", &file_arg])?;
        Ok(())
    }

    /// Install everything listed in `brewfile`.
    ///
    /// # Errors
    ///
    /// Returns an error if `brew bundle` fails.
    pub fn import(&self, brewfile: &Path) -> Result<()> {
        let file_arg = format!("--file={}", brewfile.display());
        self.executor.run("brew", &["bundle", &file_arg])?;
        Ok(())
    }
}
