//! Host classification: OS class, distribution, and hostname.
use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::exec::Executor;

/// Default location of the OS metadata file.
pub const OS_RELEASE_PATH: &str = "/etc/os-release";

/// Hostname reported when every lookup fails.
const UNKNOWN_HOSTNAME: &str = "unknown";

/// Distribution ids that normalise to themselves.
const KNOWN_DISTROS: [&str; 6] = ["arch", "ubuntu", "fedora", "debian", "centos", "rhel"];

/// Coarse operating-system category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlatformClass {
    /// macOS.
    Darwin,
    /// Any Linux distribution.
    Linux,
    /// Anything else, carrying the lower-cased system name.
    Other(String),
}

impl PlatformClass {
    /// Classify a system name as reported by the host (`Darwin`, `Linux`, ...).
    #[must_use]
    pub fn from_system_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "darwin" => Self::Darwin,
            "linux" => Self::Linux,
            other => Self::Other(other.to_string()),
        }
    }

    /// The lower-cased name used in environment exports and catalog lookups.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Darwin => "darwin",
            Self::Linux => "linux",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for PlatformClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalised distribution identifier (`macos`, `arch`, `ubuntu`, ..., `unknown`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DistroId(String);

impl DistroId {
    /// The identifier used when nothing better is known.
    pub const UNKNOWN: &'static str = "unknown";

    /// Wrap an already-normalised identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DistroId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of classifying the running host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    /// Coarse OS category.
    pub class: PlatformClass,
    /// Distribution within the class.
    pub distro: DistroId,
    /// Short hostname, or `unknown`.
    pub hostname: String,
}

impl Platform {
    /// Environment variables exported for shell integration.
    #[must_use]
    pub fn env_vars(&self) -> [(&'static str, String); 3] {
        [
            ("DOTFILES_OS", self.class.to_string()),
            ("DOTFILES_DISTRO", self.distro.to_string()),
            ("DOTFILES_HOSTNAME", self.hostname.clone()),
        ]
    }
}

/// Probes the host and produces a [`Platform`].
///
/// Every input is injectable: the reported system name, the OS metadata
/// file, and the executor used for hostname lookup.  Nothing is cached
/// between calls to [`classify`](Self::classify).
#[derive(Debug)]
pub struct Classifier<'a> {
    executor: &'a dyn Executor,
    system_name: String,
    os_release: PathBuf,
}

impl<'a> Classifier<'a> {
    /// Classifier for the running host.
    #[must_use]
    pub fn new(executor: &'a dyn Executor) -> Self {
        Self {
            executor,
            system_name: host_system_name().to_string(),
            os_release: PathBuf::from(OS_RELEASE_PATH),
        }
    }

    /// Override the reported system name.
    #[must_use]
    pub fn with_system_name(mut self, name: impl Into<String>) -> Self {
        self.system_name = name.into();
        self
    }

    /// Override the OS metadata file location.
    #[must_use]
    pub fn with_os_release(mut self, path: impl Into<PathBuf>) -> Self {
        self.os_release = path.into();
        self
    }

    /// Classify the host.
    #[must_use]
    pub fn classify(&self) -> Platform {
        let os_release = OnceCell::new();
        let class = self.detect_os();
        let distro = self.detect_distro(&class, &os_release);
        let hostname = self.detect_hostname();
        tracing::debug!("classified host: os={class} distro={distro} hostname={hostname}");
        Platform {
            class,
            distro,
            hostname,
        }
    }

    /// OS class from the reported system name.
    #[must_use]
    pub fn detect_os(&self) -> PlatformClass {
        PlatformClass::from_system_name(&self.system_name)
    }

    /// Distribution from the OS class and, on non-Darwin hosts, the
    /// `ID` key of the metadata file (read at most once per pass).
    fn detect_distro(
        &self,
        class: &PlatformClass,
        os_release: &OnceCell<HashMap<String, String>>,
    ) -> DistroId {
        if *class == PlatformClass::Darwin {
            return DistroId::new("macos");
        }
        let fields = os_release.get_or_init(|| read_os_release(&self.os_release));
        normalize_distro(fields.get("ID").map(String::as_str))
    }

    /// Short hostname, falling back to the long form, then to `unknown`.
    #[must_use]
    pub fn detect_hostname(&self) -> String {
        let attempts: [&[&str]; 2] = [&["-s"], &[]];
        attempts
            .iter()
            .find_map(|args| {
                self.executor
                    .run_unchecked("hostname", args)
                    .ok()
                    .filter(|r| r.success)
                    .map(|r| r.stdout.trim().to_string())
                    .filter(|h| !h.is_empty())
            })
            .unwrap_or_else(|| UNKNOWN_HOSTNAME.to_string())
    }
}

/// System name as the host reports it.
const fn host_system_name() -> &'static str {
    if cfg!(target_os = "macos") {
        "Darwin"
    } else {
        std::env::consts::OS
    }
}

/// Map an `ID` value to a distribution identifier.
///
/// Known ids map to themselves, unknown non-empty ids pass through verbatim,
/// and an absent or empty id yields `unknown`.
fn normalize_distro(id: Option<&str>) -> DistroId {
    match id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => {
            let known = KNOWN_DISTROS.iter().find(|known| **known == id).copied();
            DistroId::new(known.unwrap_or(id))
        }
        None => DistroId::new(DistroId::UNKNOWN),
    }
}

/// Read `KEY=VALUE` pairs; a missing or unreadable file yields an empty map.
fn read_os_release(path: &Path) -> HashMap<String, String> {
    std::fs::read_to_string(path)
        .map(|content| parse_os_release(&content))
        .unwrap_or_default()
}

fn parse_os_release(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::MockExecutor;

    fn write_os_release(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("os-release");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn detect_os_darwin() {
        let exec = MockExecutor::default();
        let c = Classifier::new(&exec).with_system_name("Darwin");
        assert_eq!(c.detect_os(), PlatformClass::Darwin);
    }

    #[test]
    fn detect_os_linux() {
        let exec = MockExecutor::default();
        let c = Classifier::new(&exec).with_system_name("Linux");
        assert_eq!(c.detect_os(), PlatformClass::Linux);
    }

    #[test]
    fn detect_os_other_is_lowercased() {
        let exec = MockExecutor::default();
        let c = Classifier::new(&exec).with_system_name("Windows");
        assert_eq!(c.detect_os(), PlatformClass::Other("windows".to_string()));
        assert_eq!(c.detect_os().to_string(), "windows");
    }

    #[test]
    fn distro_arch() {
        let (_dir, path) = write_os_release("ID=arch\nNAME=\"Arch Linux\"\n");
        let exec = MockExecutor::default();
        let p = Classifier::new(&exec)
            .with_system_name("Linux")
            .with_os_release(path)
            .classify();
        assert_eq!(p.distro.as_str(), "arch");
    }

    #[test]
    fn distro_ubuntu_quoted() {
        let (_dir, path) = write_os_release("# comment\nNAME=\"Ubuntu\"\nID=\"ubuntu\"\n");
        let exec = MockExecutor::default();
        let p = Classifier::new(&exec)
            .with_system_name("Linux")
            .with_os_release(path)
            .classify();
        assert_eq!(p.distro.as_str(), "ubuntu");
    }

    #[test]
    fn distro_unmapped_id_passes_through() {
        let (_dir, path) = write_os_release("ID=nixos\n");
        let exec = MockExecutor::default();
        let p = Classifier::new(&exec)
            .with_system_name("Linux")
            .with_os_release(path)
            .classify();
        assert_eq!(p.distro.as_str(), "nixos");
    }

    #[test]
    fn distro_missing_file_is_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let exec = MockExecutor::default();
        let p = Classifier::new(&exec)
            .with_system_name("Linux")
            .with_os_release(dir.path().join("absent"))
            .classify();
        assert_eq!(p.distro.as_str(), "unknown");
    }

    #[test]
    fn distro_file_without_id_is_unknown() {
        let (_dir, path) = write_os_release("NAME=Something\nID=\n");
        let exec = MockExecutor::default();
        let p = Classifier::new(&exec)
            .with_system_name("Linux")
            .with_os_release(path)
            .classify();
        assert_eq!(p.distro.as_str(), "unknown");
    }

    #[test]
    fn darwin_is_macos_regardless_of_file() {
        let (_dir, path) = write_os_release("ID=arch\n");
        let exec = MockExecutor::default();
        let p = Classifier::new(&exec)
            .with_system_name("Darwin")
            .with_os_release(path)
            .classify();
        assert_eq!(p.distro.as_str(), "macos");
    }

    #[test]
    fn hostname_short_form() {
        let exec = MockExecutor::with_responses(vec![(true, "my-computer\n")]);
        let c = Classifier::new(&exec);
        assert_eq!(c.detect_hostname(), "my-computer");
        assert_eq!(exec.calls(), vec!["hostname -s"]);
    }

    #[test]
    fn hostname_falls_back_to_long_form() {
        let exec = MockExecutor::with_responses(vec![(false, ""), (true, "box.local\n")]);
        let c = Classifier::new(&exec);
        assert_eq!(c.detect_hostname(), "box.local");
        assert_eq!(exec.calls(), vec!["hostname -s", "hostname"]);
    }

    #[test]
    fn hostname_blank_output_falls_through() {
        let exec = MockExecutor::with_responses(vec![(true, "  \n"), (true, "")]);
        let c = Classifier::new(&exec);
        assert_eq!(c.detect_hostname(), "unknown");
    }

    #[test]
    fn env_vars_use_fixed_names() {
        let p = Platform {
            class: PlatformClass::Linux,
            distro: DistroId::new("arch"),
            hostname: "box".to_string(),
        };
        let vars = p.env_vars();
        assert_eq!(vars[0], ("DOTFILES_OS", "linux".to_string()));
        assert_eq!(vars[1], ("DOTFILES_DISTRO", "arch".to_string()));
        assert_eq!(vars[2], ("DOTFILES_HOSTNAME", "box".to_string()));
    }

    #[test]
    fn parse_os_release_skips_malformed_lines() {
        let map = parse_os_release("garbage\nID='fedora'\n\n#ID=x\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("ID").map(String::as_str), Some("fedora"));
    }
}
