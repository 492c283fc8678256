use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub store: StoreConfig,

    pub backend: BackendConfig,

    pub identifiers: IdentifierConfig,

    pub account: AccountConfig,

    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Number of tokio worker threads (default: 1)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            log_format: "pretty".to_string(),
            worker_threads: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    /// Records live in the local record store.
    Local,
    /// Records live on the KBee backend; only the session stays local.
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    File,
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub mode: StoreMode,

    pub backend: StoreBackend,

    /// JSON document used by the file backend
    pub path: String,

    /// Used by the sqlite backend
    pub database_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            mode: StoreMode::Local,
            backend: StoreBackend::File,
            path: "data/hivekeep.json".to_string(),
            database_url: "sqlite:data/hivekeep.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,

    /// Request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,

    /// Page size used when walking paginated list endpoints
    pub page_size: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            request_timeout_seconds: 10,
            page_size: constants::limits::MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifierConfig {
    pub serial_prefix: String,

    pub serial_width: usize,

    /// Collisions tolerated before token allocation gives up
    pub max_token_attempts: u32,

    /// Base of the public page a QR code points at
    pub public_base_url: String,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            serial_prefix: constants::identifiers::SERIAL_PREFIX.to_string(),
            serial_width: constants::identifiers::SERIAL_WIDTH,
            max_token_attempts: constants::identifiers::MAX_TOKEN_ATTEMPTS,
            public_base_url: "http://localhost".to_string(),
        }
    }
}

/// The single account accepted by the local session gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub user_id: String,

    pub username: String,

    /// Argon2id PHC string. When unset the bootstrap password is accepted.
    pub password_hash: Option<String>,

    pub email: String,

    pub business_name: Option<String>,

    pub contact_info: Option<String>,

    pub created_at: String,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            user_id: "user-1".to_string(),
            username: constants::auth::DEFAULT_USERNAME.to_string(),
            password_hash: None,
            email: "admin@kbee.vn".to_string(),
            business_name: None,
            contact_info: None,
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Writes back to the file the config was loaded from, or `./config.toml`.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_paths()
            .into_iter()
            .find(|p| p.exists())
            .unwrap_or_else(Self::default_config_path);
        self.save_to_path(&path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("hivekeep").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".hivekeep").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.identifiers.serial_prefix.is_empty() {
            anyhow::bail!("Serial prefix cannot be empty");
        }

        if self
            .identifiers
            .serial_prefix
            .chars()
            .any(|c| c.is_ascii_digit())
        {
            anyhow::bail!("Serial prefix cannot contain digits");
        }

        if self.identifiers.serial_width == 0 {
            anyhow::bail!("Serial width must be > 0");
        }

        if self.identifiers.max_token_attempts == 0 {
            anyhow::bail!("max_token_attempts must be > 0");
        }

        if self.store.mode == StoreMode::Remote {
            url::Url::parse(&self.backend.base_url)
                .with_context(|| format!("Invalid backend URL: {}", self.backend.base_url))?;
        }

        if self.store.mode == StoreMode::Remote && self.store.backend == StoreBackend::Memory {
            anyhow::bail!("Remote mode needs a persistent store for the session");
        }

        if !matches!(self.general.log_format.as_str(), "pretty" | "json") {
            anyhow::bail!(
                "Unknown log_format '{}', expected 'pretty' or 'json'",
                self.general.log_format
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.store.mode, StoreMode::Local);
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.identifiers.serial_prefix, "TO");
        assert_eq!(config.identifiers.serial_width, 3);
        assert_eq!(config.backend.request_timeout_seconds, 10);
        assert!(config.account.password_hash.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[store]"));
        assert!(toml_str.contains("[identifiers]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [store]
            mode = "remote"
            backend = "sqlite"

            [backend]
            base_url = "https://kbee.example.com/api"

            [identifiers]
            serial_prefix = "HV"
            serial_width = 4
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.store.mode, StoreMode::Remote);
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.identifiers.serial_prefix, "HV");
        assert_eq!(config.identifiers.serial_width, 4);
        assert_eq!(config.general.log_level, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.identifiers.serial_prefix = "T0".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.store.mode = StoreMode::Remote;
        config.backend.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.general.log_format = "xml".to_string();
        assert!(config.validate().is_err());
    }
}
