//! Bundle catalog: which configuration bundles exist and which apply where.
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use super::toml_loader;
use crate::error::CatalogError;
use crate::platform::PlatformClass;

/// Name of the optional catalog override file at the repository root.
pub const CATALOG_FILE: &str = "bundles.toml";

/// A path relative to a bundle's source directory and to its target root.
///
/// Never absolute, never contains `..`, and always names at least one
/// file or directory below the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelativePath(PathBuf);

impl RelativePath {
    /// Validate and wrap `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidEntry`] if the path is empty, absolute,
    /// contains a `..` component, or resolves to the root itself (`.`).
    pub fn new(path: &str) -> Result<Self, CatalogError> {
        let invalid = |reason| CatalogError::InvalidEntry {
            path: path.to_string(),
            reason,
        };
        if path.trim().is_empty() {
            return Err(invalid("must not be empty"));
        }
        let candidate = Path::new(path);
        let mut names_something = false;
        for component in candidate.components() {
            match component {
                Component::RootDir | Component::Prefix(_) => {
                    return Err(invalid("must be relative"));
                }
                Component::ParentDir => return Err(invalid("must not contain '..'")),
                Component::Normal(_) => names_something = true,
                Component::CurDir => {}
            }
        }
        if !names_something {
            return Err(invalid("must name a file or directory"));
        }
        Ok(Self(candidate.to_path_buf()))
    }

    /// Borrow as a [`Path`].
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A named group of entries sharing a target root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    name: String,
    entries: Vec<RelativePath>,
    target_root: String,
    is_directory: bool,
}

impl Bundle {
    /// Build a bundle, validating every entry.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a single path component, `entries`
    /// is empty, or any entry is not a valid [`RelativePath`].
    pub fn new(
        name: &str,
        entries: &[&str],
        target_root: &str,
        is_directory: bool,
    ) -> Result<Self, CatalogError> {
        validate_name(name)?;
        if entries.is_empty() {
            return Err(CatalogError::EmptyBundle(name.to_string()));
        }
        let entries = entries
            .iter()
            .map(|e| RelativePath::new(e))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.to_string(),
            entries,
            target_root: target_root.to_string(),
            is_directory,
        })
    }

    /// Unique bundle name; also the name of its directory in the repository.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Entries in declared order.
    #[must_use]
    pub fn entries(&self) -> &[RelativePath] {
        &self.entries
    }

    /// Target root expression as declared (may start with `~`).
    #[must_use]
    pub fn target_root(&self) -> &str {
        &self.target_root
    }

    /// Whether the entries are directories.
    #[must_use]
    pub const fn is_directory(&self) -> bool {
        self.is_directory
    }

    /// Target root with `~` expanded against `home`.
    #[must_use]
    pub fn resolve_target_root(&self, home: &Path) -> PathBuf {
        expand_home(&self.target_root, home)
    }

    /// Directory holding this bundle's sources inside `repo`.
    #[must_use]
    pub fn source_dir(&self, repo: &Path) -> PathBuf {
        repo.join(&self.name)
    }
}

/// A bundle name doubles as a directory name in the repository and in every
/// backup session, so it must be exactly one normal path component.
fn validate_name(name: &str) -> Result<(), CatalogError> {
    let invalid = |reason| CatalogError::InvalidBundleName {
        name: name.to_string(),
        reason,
    };
    if name.trim().is_empty() {
        return Err(invalid("must not be empty"));
    }
    if name.contains(['/', '\\']) {
        return Err(invalid("must not contain path separators"));
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid("must be a plain directory name")),
    }
}

/// Expand a leading `~` in `expr` to `home`.
#[must_use]
pub fn expand_home(expr: &str, home: &Path) -> PathBuf {
    if expr == "~" {
        home.to_path_buf()
    } else if let Some(rest) = expr.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(expr)
    }
}

/// `(name, entries, target root, is_directory)` rows of the built-in table.
type BundleRow = (&'static str, &'static [&'static str], &'static str, bool);

const BUILTIN_BUNDLES: &[BundleRow] = &[
    ("bash", &[".bashrc"], "~", false),
    ("zsh", &[".zshrc"], "~", false),
    ("tmux", &[".tmux.conf"], "~", false),
    ("wezterm", &[".wezterm.lua"], "~", false),
    ("brew", &["Brewfile"], "~", false),
    ("starship", &["starship.toml"], "~/.config", false),
    ("neovim", &[".config/nvim"], "~", true),
    ("opencode", &[".config/opencode"], "~", true),
    ("fish", &[".config/fish"], "~", true),
    ("ghostty", &[".config/ghostty"], "~", true),
    (
        "vscodium",
        &["settings.json", "keybindings.json"],
        "~/Library/Application Support/VSCodium/User",
        false,
    ),
    ("nushell", &[".config/nushell"], "~", true),
];

const DARWIN_BUNDLES: &[&str] = &[
    "bash", "zsh", "tmux", "wezterm", "brew", "starship", "neovim", "opencode", "fish", "ghostty",
    "vscodium",
];

const LINUX_BUNDLES: &[&str] = &[
    "bash", "zsh", "tmux", "starship", "neovim", "opencode", "fish", "nushell",
];

/// The bundle table plus the per-platform selection lists.
///
/// Built once per run and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Catalog {
    bundles: Vec<Bundle>,
    platforms: HashMap<String, Vec<String>>,
}

impl Catalog {
    /// Build a catalog from bundles (in table order) and platform lists keyed
    /// by platform class name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateBundle`] if two bundles share a name.
    pub fn new(
        bundles: Vec<Bundle>,
        platforms: HashMap<String, Vec<String>>,
    ) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for bundle in &bundles {
            if !seen.insert(bundle.name.as_str()) {
                return Err(CatalogError::DuplicateBundle(bundle.name.clone()));
            }
        }
        Ok(Self { bundles, platforms })
    }

    /// The built-in catalog.
    #[must_use]
    pub fn builtin() -> Self {
        let bundles = BUILTIN_BUNDLES
            .iter()
            .map(|&(name, entries, target_root, is_directory)| Bundle {
                name: name.to_string(),
                entries: entries
                    .iter()
                    .map(|e| RelativePath(PathBuf::from(e)))
                    .collect(),
                target_root: target_root.to_string(),
                is_directory,
            })
            .collect();
        let to_names = |names: &[&str]| names.iter().map(ToString::to_string).collect();
        let platforms = HashMap::from([
            ("darwin".to_string(), to_names(DARWIN_BUNDLES)),
            ("linux".to_string(), to_names(LINUX_BUNDLES)),
        ]);
        Self { bundles, platforms }
    }

    /// Load `<repo>/bundles.toml` if present, otherwise the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the override file exists but cannot be read,
    /// parsed, or validated.
    pub fn load_or_builtin(repo: &Path) -> Result<Self, CatalogError> {
        let path = repo.join(CATALOG_FILE);
        let Some(file) = toml_loader::load_optional::<CatalogFile>(&path)? else {
            return Ok(Self::builtin());
        };
        tracing::debug!("loaded catalog override from {}", path.display());
        let bundles = file
            .bundles
            .iter()
            .map(|b| {
                let entries: Vec<&str> = b.entries.iter().map(String::as_str).collect();
                Bundle::new(&b.name, &entries, &b.target, b.directory)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(bundles, file.platforms)
    }

    /// Every bundle in table order.
    #[must_use]
    pub fn bundles(&self) -> &[Bundle] {
        &self.bundles
    }

    /// Look up a bundle by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Bundle> {
        self.bundles.iter().find(|b| b.name == name)
    }

    /// Bundles applicable to `class`, in the platform list's order.
    ///
    /// A platform without a list gets every bundle in table order.  Names in
    /// a platform list that are missing from the table are skipped with a
    /// warning.
    #[must_use]
    pub fn entries_for(&self, class: &PlatformClass) -> Vec<&Bundle> {
        let Some(names) = self.platforms.get(class.as_str()) else {
            return self.bundles.iter().collect();
        };
        names
            .iter()
            .filter_map(|name| {
                let bundle = self.get(name);
                if bundle.is_none() {
                    tracing::warn!(
                        "[catalog] platform '{class}' lists unknown bundle '{name}', skipping"
                    );
                }
                bundle
            })
            .collect()
    }
}

/// On-disk shape of `bundles.toml`.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "bundle")]
    bundles: Vec<BundleSection>,
    #[serde(default)]
    platforms: HashMap<String, Vec<String>>,
}

/// One `[[bundle]]` table.
#[derive(Debug, Deserialize)]
struct BundleSection {
    name: String,
    entries: Vec<String>,
    #[serde(default = "default_target")]
    target: String,
    #[serde(default)]
    directory: bool,
}

fn default_target() -> String {
    "~".to_string()
}
