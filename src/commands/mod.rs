//! Top-level subcommand orchestration.
//!
//! Each subcommand is a linear pipeline of steps. Soft failures are recorded
//! in the [`Logger`] summary and the pipeline continues; the command fails
//! at the end if any step or entry failed.
pub mod backup;
pub mod backups;
pub mod detect;
pub mod link;
pub mod restore;
pub mod rollback;
pub mod version;

use anyhow::{Result, bail};

use crate::cli::LinkOpts;
use crate::config::Config;
use crate::config::catalog::{CATALOG_FILE, Catalog};
use crate::error::SyncError;
use crate::exec::Executor;
use crate::logging::{Log, Logger, StepStatus};
use crate::platform::{Classifier, Platform};
use crate::resources::backup::BackupVault;
use crate::sync::LinkEngine;
use crate::sync::report::SyncReport;

/// Everything a command needs from the outside world.
///
/// The executor and classifier are injectable so that integration tests can
/// run whole commands against a temporary tree without spawning processes.
#[derive(Debug)]
pub struct CommandContext<'a> {
    /// Resolved locations.
    pub config: Config,
    /// Runs `git`, `brew`, and `hostname`.
    pub executor: &'a dyn Executor,
    /// Produces the [`Platform`] for this run.
    pub classifier: Classifier<'a>,
}

impl<'a> CommandContext<'a> {
    /// Context classifying the running host through `executor`.
    #[must_use]
    pub fn new(config: Config, executor: &'a dyn Executor) -> Self {
        Self {
            config,
            executor,
            classifier: Classifier::new(executor),
        }
    }

    /// Replace the classifier (e.g. to pin the system name in tests).
    #[must_use]
    pub fn with_classifier(mut self, classifier: Classifier<'a>) -> Self {
        self.classifier = classifier;
        self
    }
}

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Classification of the running host.
    pub platform: Platform,
    /// Built-in catalog or the repository's override.
    pub catalog: Catalog,
}

impl CommandSetup {
    /// Classify the host and load the bundle catalog.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Catalog`] if the repository's catalog override
    /// file is invalid.
    pub fn init(ctx: &CommandContext<'_>, log: &dyn Log) -> Result<Self> {
        log.stage("Detecting platform");
        let platform = ctx.classifier.classify();
        log.info(&format!(
            "platform: {} ({}) on {}",
            platform.class, platform.distro, platform.hostname
        ));

        log.stage("Loading catalog");
        let catalog = load_catalog(ctx)?;
        if ctx.config.repo.join(CATALOG_FILE).exists() {
            log.info(&format!("using {CATALOG_FILE} from the repository"));
        }
        log.debug(&format!("{} bundles in catalog", catalog.bundles().len()));

        Ok(Self { platform, catalog })
    }
}

/// Load the repository's catalog override or the built-in table.
///
/// # Errors
///
/// Returns [`SyncError::Catalog`] if the override file is invalid.
pub fn load_catalog(ctx: &CommandContext<'_>) -> Result<Catalog, SyncError> {
    Catalog::load_or_builtin(&ctx.config.repo).map_err(SyncError::from)
}

/// Back up, unlink, and relink every bundle selected for the platform, and
/// record the result as one summary step.
pub fn sync_bundles(
    ctx: &CommandContext<'_>,
    setup: &CommandSetup,
    opts: &LinkOpts,
    log: &dyn Log,
) -> SyncReport {
    log.stage("Linking bundles");
    let bundles = setup.catalog.entries_for(&setup.platform.class);
    log.info(&format!(
        "{} bundles for {}: {}",
        bundles.len(),
        setup.platform.class,
        bundles
            .iter()
            .map(|b| b.name())
            .collect::<Vec<_>>()
            .join(", ")
    ));

    let mut vault = BackupVault::new(
        &ctx.config.backup_base,
        Some(setup.platform.distro.as_str()),
        log,
    );
    let engine = LinkEngine::new(ctx.config.canonical_repo(), &ctx.config.home, log)
        .allow_data_loss(opts.allow_data_loss);
    let report = engine.sync(&bundles, &mut vault);

    if let Some(session) = vault.session() {
        log.info(&format!(
            "replaced files saved in {}",
            session.root().display()
        ));
    }
    let summary = report.summary();
    log.info(&summary);
    let status = if report.has_failures() {
        StepStatus::Failed
    } else {
        StepStatus::Ok
    };
    log.record_step("link bundles", status, Some(&summary));
    report
}

/// Print the summary and turn any recorded failure into an error.
///
/// # Errors
///
/// Returns an error if one or more steps recorded a failure.
pub fn finish(log: &Logger) -> Result<()> {
    log.print_summary();
    let count = log.failure_count();
    if count > 0 {
        bail!("{count} step(s) failed");
    }
    Ok(())
}
