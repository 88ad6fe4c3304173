//! Command: print the platform classification as shell exports.
use std::io::{self, Write as _};

use crate::cli::{DetectOpts, ExportFormat};
use crate::platform::{Classifier, Platform};

/// Environment variable that turns on the stderr diagnostic line.
pub const DEBUG_ENV: &str = "DOTFILES_DEBUG";

/// Classify the host and print `DOTFILES_OS`, `DOTFILES_DISTRO`, and
/// `DOTFILES_HOSTNAME` in the requested syntax.
///
/// With `debug` set, a one-line summary also goes to stderr so that shell
/// startup files can source stdout untouched.
pub fn run(classifier: &Classifier<'_>, opts: &DetectOpts, debug: bool) {
    let platform = classifier.classify();
    if debug {
        let _ = writeln!(io::stderr().lock(), "{}", diagnostic(&platform));
    }
    print!("{}", render(&platform, opts.format));
}

/// Whether `DOTFILES_DEBUG=1` is set in `env`.
#[must_use]
pub fn debug_enabled(env: impl Fn(&str) -> Option<String>) -> bool {
    env(DEBUG_ENV).is_some_and(|v| v.trim() == "1")
}

/// `[dotfiles-env] OS: …, Distro: …, Hostname: …`
#[must_use]
pub fn diagnostic(platform: &Platform) -> String {
    format!(
        "[dotfiles-env] OS: {}, Distro: {}, Hostname: {}",
        platform.class, platform.distro, platform.hostname
    )
}

/// Render the three variables, one per line.
#[must_use]
pub fn render(platform: &Platform, format: ExportFormat) -> String {
    platform
        .env_vars()
        .iter()
        .map(|(key, value)| match format {
            ExportFormat::Posix => format!("export {key}=\"{}\"\n", escape(value)),
            ExportFormat::Fish => format!("set -gx {key} \"{}\"\n", escape(value)),
            ExportFormat::Env => format!("{key}={value}\n"),
        })
        .collect()
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
