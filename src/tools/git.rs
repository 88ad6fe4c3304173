//! Version-control operations on the dotfiles repository.
use anyhow::Result;
use chrono::{DateTime, Local};
use std::path::Path;

use crate::exec::Executor;

/// Commit message used by `backup`, stamped with local time.
#[must_use]
pub fn commit_message(now: DateTime<Local>) -> String {
    format!("Update dotfiles: {}", now.format("%Y-%m-%d %H:%M:%S"))
}

/// Git commands run inside one repository.
#[derive(Debug, Clone, Copy)]
pub struct Git<'a> {
    executor: &'a dyn Executor,
    repo: &'a Path,
}

impl<'a> Git<'a> {
    /// Operate on the repository at `repo`.
    #[must_use]
    pub const fn new(executor: &'a dyn Executor, repo: &'a Path) -> Self {
        Self { executor, repo }
    }

    /// Clone `url` into this repository's path.
    ///
    /// # Errors
    ///
    /// Returns an error if `git clone` fails.
    pub fn clone_from(&self, url: &str) -> Result<()> {
        let dest = self.repo.to_string_lossy();
        self.executor.run("git", &["clone", url, &dest])?;
        Ok(())
    }

    /// Fetch and merge the upstream branch, returning git's output.
    ///
    /// # Errors
    ///
    /// Returns an error if `git pull` fails.
    pub fn pull(&self) -> Result<String> {
        let result = self.executor.run_in(self.repo, "git", &["pull"])?;
        Ok(result.stdout.trim().to_string())
    }

    /// Whether the working tree has anything to commit.
    ///
    /// # Errors
    ///
    /// Returns an error if `git status` fails.
    pub fn has_changes(&self) -> Result<bool> {
        let result = self
            .executor
            .run_in(self.repo, "git", &["status", "--porcelain"])?;
        Ok(!result.stdout.trim().is_empty())
    }

    /// Stage everything and commit with `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if `git add` or `git commit` fails.
    pub fn commit_all(&self, message: &str) -> Result<()> {
        self.executor.run_in(self.repo, "git", &["add", "."])?;
        self.executor
            .run_in(self.repo, "git", &["commit", "-m", message])?;
        Ok(())
    }

    /// Push the current branch to its upstream.
    ///
    /// # Errors
    ///
    /// Returns an error if `git push` fails.
    pub fn push(&self) -> Result<()> {
        self.executor.run_in(self.repo, "git", &["push"])?;
        Ok(())
    }
}
