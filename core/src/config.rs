//! Client configuration.
//!
//! Values come from serde (a TOML file in the CLI) and can be overridden by
//! `LEDGER_*` environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::envelope::ListPolicy;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CSRF_PATH: &str = "/sanctum/csrf-cookie";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub csrf_path: String,
    pub list_policy: ListPolicy,
    /// Directory of the persisted user cache; `None` keeps it in memory.
    pub storage_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            csrf_path: DEFAULT_CSRF_PATH.to_string(),
            list_policy: ListPolicy::default(),
            storage_dir: None,
        }
    }
}

impl ClientConfig {
    /// Overlay the process environment.
    pub fn with_env(self) -> Self {
        self.with_vars(|key| std::env::var(key).ok())
    }

    /// Overlay values looked up through `var`.
    ///
    /// `LEDGER_BASE_URL`, `LEDGER_CSRF_PATH`, `LEDGER_STORAGE_DIR`, and
    /// `LEDGER_STRICT_LISTS` (`1`/`true` selects the strict list policy).
    pub fn with_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = var("LEDGER_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        if let Some(path) = var("LEDGER_CSRF_PATH").filter(|v| !v.trim().is_empty()) {
            self.csrf_path = path.trim().to_string();
        }
        if let Some(dir) = var("LEDGER_STORAGE_DIR").filter(|v| !v.trim().is_empty()) {
            self.storage_dir = Some(PathBuf::from(dir.trim()));
        }
        if let Some(flag) = var("LEDGER_STRICT_LISTS") {
            let strict = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
            self.list_policy = if strict { ListPolicy::Strict } else { ListPolicy::Lenient };
        }
        self
    }
}
