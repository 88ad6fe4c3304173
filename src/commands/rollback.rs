//! Command: undo links by moving a backup session's content back into place.
use anyhow::{Context as _, Result, bail};
use std::path::PathBuf;

use super::{CommandContext, finish, load_catalog};
use crate::cli::RollbackOpts;
use crate::config::catalog::Bundle;
use crate::logging::{Log, Logger, StepStatus};
use crate::resources::backup::{list_sessions, restore_session};

/// Run the rollback command.
///
/// # Errors
///
/// Returns an error if no session is found, the catalog cannot be loaded, or
/// any entry failed to restore.
pub fn run(ctx: &CommandContext<'_>, opts: &RollbackOpts, log: &Logger) -> Result<()> {
    let session = resolve_session(ctx, opts)?;
    log.stage(&format!("Rolling back from {}", session.display()));

    let catalog = load_catalog(ctx)?;
    let bundles: Vec<&Bundle> = catalog.bundles().iter().collect();
    let report = restore_session(&session, &bundles, &ctx.config.home, log);

    let summary = format!(
        "{} restored, {} skipped, {} failed",
        report.restored(),
        report.skipped(),
        report.failed()
    );
    log.info(&summary);
    let status = if report.has_failures() {
        StepStatus::Failed
    } else if report.restored() == 0 {
        StepStatus::NotApplicable
    } else {
        StepStatus::Ok
    };
    log.record_step("restore backup", status, Some(&summary));

    finish(log)
}

/// The explicit `--session`, or the newest session under the backup base.
fn resolve_session(ctx: &CommandContext<'_>, opts: &RollbackOpts) -> Result<PathBuf> {
    if let Some(session) = &opts.session {
        if !session.is_dir() {
            bail!("backup session not found: {}", session.display());
        }
        return Ok(session.clone());
    }
    let base = &ctx.config.backup_base;
    let sessions = list_sessions(base)
        .with_context(|| format!("reading backup sessions in {}", base.display()))?;
    match sessions.last() {
        Some(latest) => Ok(latest.clone()),
        None => bail!("no backup sessions under {}", base.display()),
    }
}
