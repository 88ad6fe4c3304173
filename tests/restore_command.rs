#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for the `restore` command: clone or pull, package
//! import, and relinking.
#![cfg(unix)]

mod common;

use common::*;
use dotfiles_sync::cli::RestoreOpts;
use dotfiles_sync::commands;
use dotfiles_sync::error::SyncError;

fn opts_with_url(url: &str) -> RestoreOpts {
    RestoreOpts {
        repo_url: Some(url.to_string()),
        ..RestoreOpts::default()
    }
}

#[test]
fn clones_missing_repository_then_links() {
    let sandbox = Sandbox::without_repo();
    let executor = ScriptedExecutor::new().on_clone(seed_linux_repo);
    let log = quiet_logger();

    commands::restore::run(
        &sandbox.context(&executor, "Linux"),
        &opts_with_url("https://example.com/dots.git"),
        &log,
    )
    .unwrap();

    assert_eq!(
        executor.calls_to("git"),
        vec![format!(
            "git clone https://example.com/dots.git {}",
            sandbox.repo.display()
        )]
    );
    assert!(is_symlink(&sandbox.home.join(".config/starship.toml")));
}

#[test]
fn failed_clone_aborts_with_repository_unavailable() {
    let sandbox = Sandbox::without_repo();
    let executor = ScriptedExecutor::new().fail("git clone");
    let log = quiet_logger();

    let err = commands::restore::run(
        &sandbox.context(&executor, "Linux"),
        &opts_with_url("https://example.com/dots.git"),
        &log,
    )
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SyncError>(),
        Some(SyncError::RepositoryUnavailable { .. })
    ));
    assert!(
        std::fs::read_dir(&sandbox.home).unwrap().next().is_none(),
        "nothing was linked"
    );
}

#[test]
fn existing_repository_is_pulled() {
    let sandbox = Sandbox::new();
    sandbox.seed_linux_repo();
    let executor = ScriptedExecutor::new();
    let log = quiet_logger();

    commands::restore::run(
        &sandbox.context(&executor, "Linux"),
        &RestoreOpts::default(),
        &log,
    )
    .unwrap();

    assert_eq!(executor.calls_to("git"), vec!["git pull"]);
}

#[test]
fn failed_pull_still_links() {
    let sandbox = Sandbox::new();
    sandbox.seed_linux_repo();
    let executor = ScriptedExecutor::new().fail("git pull");
    let log = quiet_logger();

    let result = commands::restore::run(
        &sandbox.context(&executor, "Linux"),
        &RestoreOpts::default(),
        &log,
    );

    assert!(result.is_err());
    assert!(is_symlink(&sandbox.home.join(".bashrc")));
}

#[test]
fn brewfile_imported_when_brew_is_installed() {
    let sandbox = Sandbox::new();
    sandbox.seed_linux_repo();
    sandbox.repo_file("brew/Brewfile", "brew \"git\"\n");
    let executor = ScriptedExecutor::new().with_brew();
    let log = quiet_logger();

    commands::restore::run(
        &sandbox.context(&executor, "Darwin"),
        &RestoreOpts::default(),
        &log,
    )
    .unwrap();

    assert_eq!(
        executor.calls_to("brew"),
        vec![format!(
            "brew bundle --file={}",
            sandbox.repo.join("brew/Brewfile").display()
        )]
    );
    assert!(is_symlink(&sandbox.home.join("Brewfile")));
}

#[test]
fn missing_brew_is_only_a_warning() {
    let sandbox = Sandbox::new();
    sandbox.seed_linux_repo();
    sandbox.repo_file("brew/Brewfile", "brew \"git\"\n");
    let executor = ScriptedExecutor::new();
    let log = quiet_logger();

    commands::restore::run(
        &sandbox.context(&executor, "Darwin"),
        &RestoreOpts::default(),
        &log,
    )
    .unwrap();

    assert!(executor.calls_to("brew").is_empty());
    assert_eq!(log.failure_count(), 0);
}
