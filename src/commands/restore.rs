//! Command: bring a fresh machine to the repository's state.
use anyhow::Result;

use super::{CommandContext, CommandSetup, finish, sync_bundles};
use crate::cli::RestoreOpts;
use crate::config::resolve_repo_url;
use crate::error::SyncError;
use crate::logging::{Log, Logger, StepStatus};
use crate::tools::brew::Brew;
use crate::tools::git::Git;

/// Run the restore command.
///
/// # Errors
///
/// Returns [`SyncError::RepositoryUnavailable`] if the repository is absent
/// and cannot be cloned; otherwise an error if the catalog cannot be loaded
/// or any step failed.
pub fn run(ctx: &CommandContext<'_>, opts: &RestoreOpts, log: &Logger) -> Result<()> {
    log.stage("Updating repository");
    obtain_repository(ctx, opts, log)?;

    let setup = CommandSetup::init(ctx, log)?;

    log.stage("Importing packages");
    import_packages(ctx, log);

    sync_bundles(ctx, &setup, &opts.link, log);

    finish(log)
}

/// Clone when missing (fatal on failure), otherwise pull (soft).
fn obtain_repository(ctx: &CommandContext<'_>, opts: &RestoreOpts, log: &Logger) -> Result<()> {
    let git = Git::new(ctx.executor, &ctx.config.repo);

    if !ctx.config.repo_exists() {
        let url = resolve_repo_url(opts.repo_url.as_deref(), |key| std::env::var(key).ok());
        log.info(&format!(
            "cloning {url} into {}",
            ctx.config.repo.display()
        ));
        if let Err(e) = git.clone_from(&url) {
            log.error(&format!("git clone failed: {e:#}"));
            log.record_step("clone repository", StepStatus::Failed, Some(&url));
            log.print_summary();
            return Err(SyncError::RepositoryUnavailable {
                path: ctx.config.repo.clone(),
                reason: format!("{e:#}"),
            }
            .into());
        }
        log.record_step("clone repository", StepStatus::Ok, None);
        return Ok(());
    }

    match git.pull() {
        Ok(output) => {
            log.debug(&format!("git pull output: {output}"));
            log.record_step("pull repository", StepStatus::Ok, None);
        }
        Err(e) => {
            log.warn(&format!("git pull failed: {e:#}"));
            log.record_step("pull repository", StepStatus::Failed, Some(&format!("{e:#}")));
        }
    }
    Ok(())
}

/// Import the Brewfile when `brew` is installed. Homebrew itself is never
/// installed from here.
fn import_packages(ctx: &CommandContext<'_>, log: &dyn Log) {
    let brew = Brew::new(ctx.executor);
    if !brew.available() {
        log.warn("brew not found; install Homebrew from https://brew.sh and rerun restore");
        log.record_step("import packages", StepStatus::Skipped, Some("brew not found"));
        return;
    }
    let brewfile = ctx.config.brewfile();
    if !brewfile.exists() {
        log.record_step(
            "import packages",
            StepStatus::NotApplicable,
            Some("no Brewfile in repository"),
        );
        return;
    }
    match brew.import(&brewfile) {
        Ok(()) => log.record_step("import packages", StepStatus::Ok, None),
        Err(e) => {
            log.warn(&format!("brew bundle failed: {e:#}"));
            log.record_step("import packages", StepStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}
