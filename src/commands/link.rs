//! Command: relink the platform's bundles without git or package steps.
use anyhow::Result;

use super::{CommandContext, CommandSetup, finish, sync_bundles};
use crate::cli::LinkOpts;
use crate::logging::Logger;

/// Run the link command.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or any entry failed.
pub fn run(ctx: &CommandContext<'_>, opts: &LinkOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(ctx, log)?;
    sync_bundles(ctx, &setup, opts, log);
    finish(log)
}
