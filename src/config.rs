//! Where notes live and how the binary behaves, read from the environment.
//!
//! - `POCKET_NOTES_DIR`: application directory (default `~/.pocket_notes`)
//! - `POCKET_NOTES_LOG`: tracing filter, logging is off when unset
//! - `NO_COLOR`: disable colored output

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const ENV_DIR: &str = "POCKET_NOTES_DIR";
const ENV_LOG: &str = "POCKET_NOTES_LOG";
const DEFAULT_DIR_NAME: &str = ".pocket_notes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub app_dir: PathBuf,
    pub log_filter: Option<String>,
    pub color: bool,
}

impl Config {
    pub fn from_env() -> io::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; used by tests.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> io::Result<Self> {
        let app_dir = match lookup(ENV_DIR) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => {
                let home = lookup("HOME").ok_or_else(|| {
                    io::Error::other(
                        "HOME not set; set POCKET_NOTES_DIR explicitly",
                    )
                })?;
                PathBuf::from(home).join(DEFAULT_DIR_NAME)
            }
        };
        Ok(Self {
            app_dir,
            log_filter: lookup(ENV_LOG).filter(|v| !v.is_empty()),
            color: lookup("NO_COLOR").is_none(),
        })
    }

    pub fn notes_dir(&self) -> PathBuf {
        self.app_dir.join("notes")
    }

    pub fn data_file(&self) -> PathBuf {
        self.app_dir.join("data.toml")
    }

    pub fn ensure_dirs(&self) -> io::Result<()> {
        ensure_dir(&self.app_dir)?;
        ensure_dir(&self.notes_dir())
    }
}

pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_dir_override_wins() {
        let env = vars(&[("POCKET_NOTES_DIR", "/tmp/pn"), ("HOME", "/home/u")]);
        let cfg = Config::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(cfg.app_dir, PathBuf::from("/tmp/pn"));
        assert_eq!(cfg.notes_dir(), PathBuf::from("/tmp/pn/notes"));
        assert_eq!(cfg.data_file(), PathBuf::from("/tmp/pn/data.toml"));
        assert!(cfg.color);
        assert_eq!(cfg.log_filter, None);
    }

    #[test]
    fn test_home_default_and_flags() {
        let env = vars(&[
            ("HOME", "/home/u"),
            ("NO_COLOR", "1"),
            ("POCKET_NOTES_LOG", "debug"),
        ]);
        let cfg = Config::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(cfg.app_dir, PathBuf::from("/home/u/.pocket_notes"));
        assert!(!cfg.color);
        assert_eq!(cfg.log_filter.as_deref(), Some("debug"));
    }

    #[test]
    fn test_missing_home_is_error() {
        assert!(Config::from_lookup(|_| None).is_err());
    }

    #[test]
    fn test_ensure_dirs_creates_tree() {
        let tmp = tempdir().unwrap();
        let cfg = Config {
            app_dir: tmp.path().join("app"),
            log_filter: None,
            color: false,
        };
        cfg.ensure_dirs().unwrap();
        assert!(cfg.notes_dir().is_dir());
        cfg.ensure_dirs().unwrap();
    }
}
