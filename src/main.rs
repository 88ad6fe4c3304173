use anyhow::Result;
use clap::Parser;

use dotfiles_sync::cli::{Cli, Command};
use dotfiles_sync::commands::{self, CommandContext};
use dotfiles_sync::config::Config;
use dotfiles_sync::exec::{Executor, SystemExecutor};
use dotfiles_sync::logging::{self, Logger};
use dotfiles_sync::platform::Classifier;

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let executor = SystemExecutor;

    match &args.command {
        Command::Version => {
            commands::version::run();
            Ok(())
        }
        Command::Detect(opts) => {
            let debug = args.verbose
                || commands::detect::debug_enabled(|key| std::env::var(key).ok());
            commands::detect::run(&Classifier::new(&executor), opts, debug);
            Ok(())
        }
        Command::Backup(opts) => with_context(&args, "backup", &executor, |ctx, log| {
            commands::backup::run(ctx, opts, log)
        }),
        Command::Restore(opts) => with_context(&args, "restore", &executor, |ctx, log| {
            commands::restore::run(ctx, opts, log)
        }),
        Command::Link(opts) => with_context(&args, "link", &executor, |ctx, log| {
            commands::link::run(ctx, opts, log)
        }),
        Command::Rollback(opts) => with_context(&args, "rollback", &executor, |ctx, log| {
            commands::rollback::run(ctx, opts, log)
        }),
        Command::Backups => with_context(&args, "backups", &executor, |ctx, log| {
            commands::backups::run(&ctx.config, log)
        }),
    }
}

/// Set up logging for `command`, resolve configuration, and run `f`.
fn with_context(
    args: &Cli,
    command: &str,
    executor: &dyn Executor,
    f: impl FnOnce(&CommandContext<'_>, &Logger) -> Result<()>,
) -> Result<()> {
    logging::init_subscriber(args.verbose, command);
    let log = Logger::new(command);
    let ctx = CommandContext::new(Config::resolve(&args.global)?, executor);
    f(&ctx, &log)
}
