use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Top-level CLI entry point for the dotfiles repository manager.
#[derive(Parser, Debug)]
#[command(
    name = "dotfiles",
    about = "Back up, restore, and link a per-platform dotfiles repository",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Override dotfiles repository root (default: ~/.dotfiles)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Override the home directory that targets are resolved against
    #[arg(long, global = true)]
    pub home: Option<PathBuf>,

    /// Override the directory holding backup sessions (default: ~/dotfiles-backup)
    #[arg(long = "backup-dir", global = true)]
    pub backup_dir: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export packages, relink bundles, commit and push the repository
    Backup(BackupOpts),
    /// Clone or update the repository, import packages, relink bundles
    Restore(RestoreOpts),
    /// Relink bundles for this platform without touching git or packages
    Link(LinkOpts),
    /// Move content from a backup session back into the home tree
    Rollback(RollbackOpts),
    /// List backup sessions
    Backups,
    /// Print the detected platform as environment exports
    Detect(DetectOpts),
    /// Print version information
    Version,
}

/// Options for the `backup` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct BackupOpts {
    /// Skip the commit step (and therefore the push)
    #[arg(long)]
    pub no_commit: bool,

    /// Commit but do not push
    #[arg(long)]
    pub no_push: bool,

    #[command(flatten)]
    pub link: LinkOpts,
}

/// Options for the `restore` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct RestoreOpts {
    /// Clone URL used when the repository is absent (env: `DOTFILES_REPO`)
    #[arg(long)]
    pub repo_url: Option<String>,

    #[command(flatten)]
    pub link: LinkOpts,
}

/// Options for any subcommand that relinks bundles.
#[derive(Parser, Debug, Clone, Default)]
pub struct LinkOpts {
    /// Recursively remove real directories that are in the way of directory
    /// bundles instead of skipping them
    #[arg(long)]
    pub allow_data_loss: bool,
}

/// Options for the `rollback` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RollbackOpts {
    /// Session directory to restore from (default: the most recent session)
    #[arg(long)]
    pub session: Option<PathBuf>,
}

/// Options for the `detect` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct DetectOpts {
    /// Output syntax
    #[arg(long, value_enum, default_value_t = ExportFormat::Posix)]
    pub format: ExportFormat,
}

/// Shell syntax for `detect` output.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportFormat {
    /// `export KEY="value"`
    #[default]
    Posix,
    /// `set -gx KEY "value"`
    Fish,
    /// `KEY=value`
    Env,
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_backup_defaults() {
        let cli = Cli::parse_from(["dotfiles", "backup"]);
        assert!(
            matches!(&cli.command, Command::Backup(_)),
            "Expected Backup command"
        );
        if let Command::Backup(opts) = cli.command {
            assert!(!opts.no_commit);
            assert!(!opts.no_push);
            assert!(!opts.link.allow_data_loss);
        }
    }

    #[test]
    fn parse_backup_flags() {
        let cli = Cli::parse_from(["dotfiles", "backup", "--no-push", "--allow-data-loss"]);
        if let Command::Backup(opts) = cli.command {
            assert!(opts.no_push);
            assert!(opts.link.allow_data_loss);
        } else {
            panic!("Expected Backup command");
        }
    }

    #[test]
    fn parse_restore_repo_url() {
        let cli = Cli::parse_from(["dotfiles", "restore", "--repo-url", "git@host:me/dots.git"]);
        if let Command::Restore(opts) = cli.command {
            assert_eq!(opts.repo_url.as_deref(), Some("git@host:me/dots.git"));
        } else {
            panic!("Expected Restore command");
        }
    }

    #[test]
    fn parse_link() {
        let cli = Cli::parse_from(["dotfiles", "link"]);
        assert!(matches!(cli.command, Command::Link(_)));
    }

    #[test]
    fn parse_rollback_session() {
        let cli = Cli::parse_from(["dotfiles", "rollback", "--session", "/b/backup_1"]);
        if let Command::Rollback(opts) = cli.command {
            assert_eq!(opts.session, Some(PathBuf::from("/b/backup_1")));
        } else {
            panic!("Expected Rollback command");
        }
    }

    #[test]
    fn parse_backups() {
        let cli = Cli::parse_from(["dotfiles", "backups"]);
        assert!(matches!(cli.command, Command::Backups));
    }

    #[test]
    fn detect_defaults_to_posix() {
        let cli = Cli::parse_from(["dotfiles", "detect"]);
        if let Command::Detect(opts) = cli.command {
            assert_eq!(opts.format, ExportFormat::Posix);
        } else {
            panic!("Expected Detect command");
        }
    }

    #[test]
    fn detect_fish_format() {
        let cli = Cli::parse_from(["dotfiles", "detect", "--format", "fish"]);
        if let Command::Detect(opts) = cli.command {
            assert_eq!(opts.format, ExportFormat::Fish);
        } else {
            panic!("Expected Detect command");
        }
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["dotfiles", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["dotfiles", "-v", "link"]);
        assert!(cli.verbose);
    }

    #[test]
    fn global_overrides_after_subcommand() {
        let cli = Cli::parse_from([
            "dotfiles",
            "link",
            "--root",
            "/tmp/dots",
            "--home",
            "/tmp/home",
            "--backup-dir",
            "/tmp/bk",
        ]);
        assert_eq!(cli.global.root, Some(PathBuf::from("/tmp/dots")));
        assert_eq!(cli.global.home, Some(PathBuf::from("/tmp/home")));
        assert_eq!(cli.global.backup_dir, Some(PathBuf::from("/tmp/bk")));
    }
}
