//! Configuration loading and the on-disk session state.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ledger_core::{ClientConfig, CookieJar, FileUserStore, UserCache};

/// Read when `--config` is not given and the file exists.
pub const DEFAULT_CONFIG_FILE: &str = "ledger.toml";
/// Used when the configuration names no storage directory.
pub const DEFAULT_STATE_DIR: &str = ".ledger";

const COOKIES_FILE: &str = "cookies.json";

/// File (TOML) first, then `LEDGER_*` variables on top.
pub fn load(path: Option<&Path>) -> Result<ClientConfig> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
    };
    let config = match path {
        Some(path) => parse(&path)?,
        None => ClientConfig::default(),
    };
    Ok(config.with_env())
}

fn parse(path: &Path) -> Result<ClientConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("failed to parse config {}", path.display()))
}

/// Cookies and the cached user, kept between invocations.
#[derive(Debug, Clone)]
pub struct StateDir {
    dir: PathBuf,
}

impl StateDir {
    pub fn new(config: &ClientConfig) -> Self {
        let dir = config
            .storage_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR));
        Self { dir }
    }

    pub fn user_cache(&self) -> UserCache {
        UserCache::with_store(Box::new(FileUserStore::new(&self.dir)))
    }

    pub fn load_cookies(&self) -> Result<CookieJar> {
        let path = self.dir.join(COOKIES_FILE);
        match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).or_else(|e| {
                tracing::warn!(error = %e, path = %path.display(), "ignoring corrupt cookie file");
                Ok(CookieJar::new())
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(CookieJar::new()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    /// An empty jar removes the file.
    pub fn save_cookies(&self, jar: &CookieJar) -> Result<()> {
        let path = self.dir.join(COOKIES_FILE);
        if jar.is_empty() {
            return match fs::remove_file(&path) {
                Err(e) if e.kind() != ErrorKind::NotFound => {
                    Err(e).with_context(|| format!("failed to remove {}", path.display()))
                }
                _ => Ok(()),
            };
        }
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let raw = serde_json::to_string_pretty(jar)?;
        fs::write(&path, raw).with_context(|| format!("failed to write {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.toml");
        fs::write(
            &path,
            "base_url = \"https://ksiegowosc.example.pl\"\nlist_policy = \"strict\"\n",
        )
        .unwrap();

        let config = parse(&path).unwrap();
        assert_eq!(config.base_url, "https://ksiegowosc.example.pl");
        assert_eq!(config.list_policy, ledger_core::ListPolicy::Strict);
        assert_eq!(config.csrf_path, "/sanctum/csrf-cookie");
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn cookies_survive_a_round_trip_and_empty_jar_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateDir {
            dir: dir.path().join("state"),
        };
        assert!(state.load_cookies().unwrap().is_empty());

        let mut jar = CookieJar::new();
        jar.insert("XSRF-TOKEN", "abc%3D");
        state.save_cookies(&jar).unwrap();
        assert_eq!(state.load_cookies().unwrap(), jar);

        state.save_cookies(&CookieJar::new()).unwrap();
        assert!(!state.dir.join(COOKIES_FILE).exists());
    }

    #[test]
    fn corrupt_cookie_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(COOKIES_FILE), "{not json").unwrap();
        let state = StateDir {
            dir: dir.path().to_path_buf(),
        };
        assert!(state.load_cookies().unwrap().is_empty());
    }
}
