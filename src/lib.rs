//! Dotfiles repository manager.
//!
//! Detects the host platform, selects the configuration bundles that apply
//! to it, moves any real files that would be shadowed into a timestamped
//! backup session, and replaces them with symlinks into the repository.
//! Package-manager and version-control steps run as external commands.
//!
//! The public API is organised into layers:
//!
//! - **[`platform`]**: classify the host (OS, distribution, hostname)
//! - **[`config`]**: resolved locations and the bundle catalog
//! - **[`resources`]**: backup vault and symlink primitives
//! - **[`sync`]**: the link engine and its per-entry report
//! - **[`commands`]**: subcommand pipelines (`backup`, `restore`, `link`, …)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod resources;
pub mod sync;
pub mod tools;
