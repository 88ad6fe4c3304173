//! Command: capture the current machine into the repository and publish it.
use anyhow::Result;
use chrono::Local;

use super::{CommandContext, CommandSetup, finish, sync_bundles};
use crate::cli::BackupOpts;
use crate::error::SyncError;
use crate::logging::{Log, Logger, StepStatus};
use crate::tools::brew::Brew;
use crate::tools::git::{Git, commit_message};

/// Run the backup command.
///
/// # Errors
///
/// Returns an error if the repository does not exist, the catalog cannot be
/// loaded, or any step failed.
pub fn run(ctx: &CommandContext<'_>, opts: &BackupOpts, log: &Logger) -> Result<()> {
    if !ctx.config.repo_exists() {
        return Err(SyncError::RepositoryUnavailable {
            path: ctx.config.repo.clone(),
            reason: "directory does not exist; run `dotfiles restore` first".to_string(),
        }
        .into());
    }

    let setup = CommandSetup::init(ctx, log)?;

    log.stage("Exporting packages");
    export_packages(ctx, log);

    sync_bundles(ctx, &setup, &opts.link, log);

    log.stage("Publishing repository");
    publish(ctx, opts, log);

    finish(log)
}

fn export_packages(ctx: &CommandContext<'_>, log: &dyn Log) {
    let brew = Brew::new(ctx.executor);
    if !brew.available() {
        log.warn("brew not found; Brewfile not updated");
        log.record_step("export packages", StepStatus::Skipped, Some("brew not found"));
        return;
    }
    let brewfile = ctx.config.brewfile();
    match brew.export(&brewfile) {
        Ok(()) => {
            log.info(&format!("wrote {}", brewfile.display()));
            log.record_step("export packages", StepStatus::Ok, None);
        }
        Err(e) => {
            log.warn(&format!("brew bundle dump failed: {e:#}"));
            log.record_step("export packages", StepStatus::Failed, Some(&format!("{e:#}")));
        }
    }
}

/// Commit and push. A failed commit skips the push; a clean tree still
/// pushes so that earlier unpushed commits go out.
fn publish(ctx: &CommandContext<'_>, opts: &BackupOpts, log: &dyn Log) {
    let git = Git::new(ctx.executor, &ctx.config.repo);

    if opts.no_commit {
        log.record_step("commit", StepStatus::Skipped, Some("--no-commit"));
        log.record_step("push", StepStatus::Skipped, Some("--no-commit"));
        return;
    }

    let committed = match git.has_changes() {
        Ok(false) => {
            log.info("nothing to commit");
            log.record_step("commit", StepStatus::NotApplicable, Some("nothing to commit"));
            true
        }
        Ok(true) => {
            let message = commit_message(Local::now());
            match git.commit_all(&message) {
                Ok(()) => {
                    log.info(&format!("committed: {message}"));
                    log.record_step("commit", StepStatus::Ok, None);
                    true
                }
                Err(e) => {
                    log.warn(&format!("git commit failed: {e:#}"));
                    log.record_step("commit", StepStatus::Failed, Some(&format!("{e:#}")));
                    false
                }
            }
        }
        Err(e) => {
            log.warn(&format!("git status failed: {e:#}"));
            log.record_step("commit", StepStatus::Failed, Some(&format!("{e:#}")));
            false
        }
    };

    if opts.no_push {
        log.record_step("push", StepStatus::Skipped, Some("--no-push"));
    } else if !committed {
        log.record_step("push", StepStatus::Skipped, Some("commit failed"));
    } else {
        match git.push() {
            Ok(()) => {
                log.info("pushed");
                log.record_step("push", StepStatus::Ok, None);
            }
            Err(e) => {
                log.warn(&format!("git push failed: {e:#}"));
                log.record_step("push", StepStatus::Failed, Some(&format!("{e:#}")));
            }
        }
    }
}
