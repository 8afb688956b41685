use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::Result;

pub const CONFIG_ENV: &str = "VENTBOARD_CONFIG";

const APP_DIR: &str = "ventboard";

fn default_api_base_url() -> String {
    "http://localhost:8000".into()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_collection() -> String {
    "users".into()
}

fn default_sync_debounce_ms() -> u64 {
    750
}

/// Identity provider and document store settings.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub enabled: bool,
    pub auth_url: String,
    pub store_url: String,
    pub collection: String,
    pub sync_debounce_ms: u64,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            auth_url: String::new(),
            store_url: String::new(),
            collection: default_collection(),
            sync_debounce_ms: default_sync_debounce_ms(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub debug_logging: bool,
    pub persistence: PersistenceConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            debug_logging: false,
            persistence: PersistenceConfig::default(),
        }
    }
}

impl AppConfig {
    /// Where the config file lives: `$VENTBOARD_CONFIG`, else the user config dir.
    pub fn default_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join(APP_DIR)
            .join("config.json")
    }

    /// Load the config, falling back to defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        let path = Self::default_path();
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Persistence is only usable when switched on and both endpoints are set.
    pub fn persistence_enabled(&self) -> bool {
        let p = &self.persistence;
        p.enabled && !p.auth_url.trim().is_empty() && !p.store_url.trim().is_empty()
    }

    pub fn data_dir(&self) -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join(APP_DIR)
    }

    pub fn session_path(&self) -> PathBuf {
        self.data_dir().join("authUser.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"api_base_url": "http://api.test", "persistence": {"enabled": true}}"#).unwrap();

        let cfg = AppConfig::load_from(&path).unwrap();
        assert_eq!(cfg.api_base_url, "http://api.test");
        assert_eq!(cfg.request_timeout_secs, 30);
        assert!(cfg.persistence.enabled);
        assert_eq!(cfg.persistence.collection, "users");
        assert_eq!(cfg.persistence.sync_debounce_ms, 750);
    }

    #[test]
    fn persistence_needs_both_endpoints() {
        let mut cfg = AppConfig::default();
        cfg.persistence.enabled = true;
        assert!(!cfg.persistence_enabled());

        cfg.persistence.auth_url = "https://auth.test".into();
        cfg.persistence.store_url = "https://store.test".into();
        assert!(cfg.persistence_enabled());

        cfg.persistence.enabled = false;
        assert!(!cfg.persistence_enabled());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut cfg = AppConfig::default();
        cfg.debug_logging = true;
        cfg.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(AppConfig::load_from(&path), Err(crate::Error::Decode(_))));
    }
}
