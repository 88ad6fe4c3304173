//! Command: list backup sessions.
use anyhow::{Context as _, Result};

use crate::config::Config;
use crate::logging::{Log, Logger};
use crate::resources::backup::list_sessions;

/// Print every session directory under the backup base, oldest first.
///
/// # Errors
///
/// Returns an error if the backup base exists but cannot be read.
pub fn run(config: &Config, log: &Logger) -> Result<()> {
    let base = &config.backup_base;
    let sessions = list_sessions(base)
        .with_context(|| format!("reading backup sessions in {}", base.display()))?;
    if sessions.is_empty() {
        log.info(&format!("no backup sessions under {}", base.display()));
        return Ok(());
    }
    for session in sessions {
        println!("{}", session.display());
    }
    Ok(())
}
