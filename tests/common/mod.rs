// Shared helpers for integration tests.
//
// Provides a temporary sandbox holding a repository, a home directory, a
// backup base, and an OS metadata file, plus a scripted executor so whole
// commands can run without spawning git, brew, or hostname.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code, clippy::expect_used, clippy::unwrap_used)]

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Result, bail};
use dotfiles_sync::cli::GlobalOpts;
use dotfiles_sync::commands::CommandContext;
use dotfiles_sync::config::Config;
use dotfiles_sync::exec::{ExecResult, Executor};
use dotfiles_sync::logging::Logger;
use dotfiles_sync::platform::Classifier;

type CloneSeed = Box<dyn Fn(&Path) + Send + Sync>;

/// Executor that records every command line and answers from a script.
///
/// Commands succeed with empty output unless a registered prefix says
/// otherwise. `git clone` runs the clone seed (if any) against the
/// destination so that restore sees a repository appear.
#[derive(Default)]
pub struct ScriptedExecutor {
    calls: Mutex<Vec<String>>,
    outputs: Vec<(String, String)>,
    failures: Vec<String>,
    brew_installed: bool,
    clone_seed: Option<CloneSeed>,
}

impl fmt::Debug for ScriptedExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedExecutor")
            .field("outputs", &self.outputs)
            .field("failures", &self.failures)
            .field("brew_installed", &self.brew_installed)
            .finish_non_exhaustive()
    }
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default().output("hostname -s", "testhost\n")
    }

    /// Answer commands starting with `prefix` with `stdout`.
    pub fn output(mut self, prefix: &str, stdout: &str) -> Self {
        self.outputs.push((prefix.to_string(), stdout.to_string()));
        self
    }

    /// Fail commands starting with `prefix`.
    pub fn fail(mut self, prefix: &str) -> Self {
        self.failures.push(prefix.to_string());
        self
    }

    /// Report `brew` as installed.
    pub const fn with_brew(mut self) -> Self {
        self.brew_installed = true;
        self
    }

    /// Populate the clone destination when `git clone` runs.
    pub fn on_clone(mut self, seed: impl Fn(&Path) + Send + Sync + 'static) -> Self {
        self.clone_seed = Some(Box::new(seed));
        self
    }

    /// Every command line issued so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Command lines for one program, e.g. `"git"`.
    pub fn calls_to(&self, program: &str) -> Vec<String> {
        let prefix = format!("{program} ");
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(&prefix))
            .collect()
    }

    fn answer(&self, program: &str, args: &[&str]) -> ExecResult {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().unwrap().push(line.clone());

        let failed = self.failures.iter().any(|p| line.starts_with(p.as_str()));
        if !failed && program == "git" && args.first() == Some(&"clone") {
            if let (Some(seed), Some(dest)) = (&self.clone_seed, args.last()) {
                seed(Path::new(dest));
            }
        }
        let stdout = self
            .outputs
            .iter()
            .find(|(p, _)| line.starts_with(p.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_default();
        ExecResult {
            stdout,
            stderr: if failed { "scripted failure".to_string() } else { String::new() },
            success: !failed,
            code: Some(i32::from(failed)),
        }
    }

    fn checked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let result = self.answer(program, args);
        if !result.success {
            bail!("{program} {} failed: {}", args.join(" "), result.stderr);
        }
        Ok(result)
    }
}

impl Executor for ScriptedExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        self.checked(program, args)
    }

    fn run_in(&self, _dir: &Path, program: &str, args: &[&str]) -> Result<ExecResult> {
        self.checked(program, args)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        Ok(self.answer(program, args))
    }

    fn which(&self, program: &str) -> bool {
        program == "brew" && self.brew_installed
    }
}

/// An isolated repository, home, and backup base under one temp directory.
pub struct Sandbox {
    _tmp: tempfile::TempDir,
    pub repo: PathBuf,
    pub home: PathBuf,
    pub backups: PathBuf,
    pub os_release: PathBuf,
}

impl Sandbox {
    /// Sandbox with an empty repository and home, classified as Arch Linux.
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        // Canonical so that link targets compare equal on hosts whose temp
        // dir sits behind a symlink.
        let root = tmp.path().canonicalize().expect("canonical temp dir");
        let sandbox = Self {
            repo: root.join("dotfiles"),
            home: root.join("home"),
            backups: root.join("home").join("dotfiles-backup"),
            os_release: root.join("os-release"),
            _tmp: tmp,
        };
        std::fs::create_dir_all(&sandbox.repo).expect("create repo");
        std::fs::create_dir_all(&sandbox.home).expect("create home");
        std::fs::write(&sandbox.os_release, "NAME=\"Arch Linux\"\nID=arch\n")
            .expect("write os-release");
        sandbox
    }

    /// Sandbox whose repository has not been cloned yet.
    pub fn without_repo() -> Self {
        let sandbox = Self::new();
        std::fs::remove_dir(&sandbox.repo).expect("remove repo");
        sandbox
    }

    /// Resolved configuration pointing at the sandbox.
    pub fn config(&self) -> Config {
        let global = GlobalOpts {
            root: Some(self.repo.clone()),
            home: Some(self.home.clone()),
            backup_dir: Some(self.backups.clone()),
        };
        Config::resolve_with(&global, |_| None).expect("resolve config")
    }

    /// Command context classifying the host as `system_name` with the
    /// sandbox's OS metadata file.
    pub fn context<'a>(&self, executor: &'a ScriptedExecutor, system_name: &str) -> CommandContext<'a> {
        let classifier = Classifier::new(executor)
            .with_system_name(system_name)
            .with_os_release(&self.os_release);
        CommandContext::new(self.config(), executor).with_classifier(classifier)
    }

    /// Write `<repo>/<bundle>/<entry>`.
    pub fn repo_file(&self, relative: &str, contents: &str) -> PathBuf {
        write_file(&self.repo.join(relative), contents)
    }

    /// Write a real file under the home directory.
    pub fn home_file(&self, relative: &str, contents: &str) -> PathBuf {
        write_file(&self.home.join(relative), contents)
    }

    /// Populate the repository with one source for every Linux bundle.
    pub fn seed_linux_repo(&self) {
        seed_linux_repo(&self.repo);
    }
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &str) -> PathBuf {
    std::fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
    std::fs::write(path, contents).expect("write file");
    path.to_path_buf()
}

/// One source for every bundle the Linux platform list selects.
pub fn seed_linux_repo(repo: &Path) {
    for (relative, contents) in [
        ("bash/.bashrc", "# bash"),
        ("zsh/.zshrc", "# zsh"),
        ("tmux/.tmux.conf", "# tmux"),
        ("starship/starship.toml", "format = '$all'"),
        ("neovim/.config/nvim/init.lua", "-- nvim"),
        ("opencode/.config/opencode/config.json", "{}"),
        ("fish/.config/fish/config.fish", "# fish"),
        ("nushell/.config/nushell/config.nu", "# nu"),
    ] {
        write_file(&repo.join(relative), contents);
    }
}

/// Logger with no file and no subscriber.
pub fn quiet_logger() -> Logger {
    Logger::with_log_file(None)
}

/// Whether `path` is a symlink.
pub fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .is_ok_and(|m| m.file_type().is_symlink())
}
