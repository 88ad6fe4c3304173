//! Log file location, ANSI stripping, and timestamp formatting.
use std::fs;
use std::path::PathBuf;

/// Strip ANSI CSI escape sequences (colours, cursor movement) from a string.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\x1b' {
            out.push(c);
            continue;
        }
        if chars.next() == Some('[') {
            for inner in chars.by_ref() {
                if ('@'..='~').contains(&inner) {
                    break;
                }
            }
        }
    }
    out
}

/// Resolve the cache directory from `XDG_CACHE_HOME`, falling back to
/// `$HOME/.cache` and finally the working directory.
fn cache_home(env: impl Fn(&str) -> Option<String>) -> PathBuf {
    env("XDG_CACHE_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| env("HOME").map(|h| PathBuf::from(h).join(".cache")))
        .unwrap_or_else(|| PathBuf::from(".cache"))
}

/// Return the log file path under the dotfiles cache directory, creating the
/// directory when needed.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    log_file_path_with(command, |key| std::env::var(key).ok())
}

fn log_file_path_with(command: &str, env: impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    let dir = cache_home(env).join("dotfiles");
    fs::create_dir_all(&dir).ok()?;
    Some(dir.join(format!("{command}.log")))
}

/// Format the current UTC time as `YYYY-MM-DD HH:MM:SS`.
pub(super) fn format_utc_datetime() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format the current UTC time as `HH:MM:SS`.
pub(super) fn format_utc_time() -> String {
    chrono::Utc::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn strip_ansi_removes_colors() {
        assert_eq!(strip_ansi("\x1b[31mERROR\x1b[0m hello"), "ERROR hello");
        assert_eq!(
            strip_ansi("\x1b[1;34m==>\x1b[0m \x1b[1mstage\x1b[0m"),
            "==> stage"
        );
        assert_eq!(strip_ansi("plain"), "plain");
        assert_eq!(strip_ansi(""), "");
    }

    #[test]
    fn cache_home_prefers_xdg() {
        let env = |key: &str| match key {
            "XDG_CACHE_HOME" => Some("/xdg".to_string()),
            "HOME" => Some("/home/u".to_string()),
            _ => None,
        };
        assert_eq!(cache_home(env), PathBuf::from("/xdg"));
    }

    #[test]
    fn cache_home_falls_back_to_home() {
        let env = |key: &str| (key == "HOME").then(|| "/home/u".to_string());
        assert_eq!(cache_home(env), PathBuf::from("/home/u/.cache"));
    }

    #[test]
    fn log_file_path_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().to_string_lossy().to_string();
        let env = move |key: &str| (key == "XDG_CACHE_HOME").then(|| root.clone());
        let path = log_file_path_with("backup", env).unwrap();
        assert_eq!(path, tmp.path().join("dotfiles").join("backup.log"));
        assert!(tmp.path().join("dotfiles").is_dir());
    }

    #[test]
    fn time_formats_have_fixed_width() {
        assert_eq!(format_utc_time().len(), 8);
        let datetime = format_utc_datetime();
        assert_eq!(datetime.len(), 19);
        assert_eq!(&datetime[10..11], " ");
    }
}
