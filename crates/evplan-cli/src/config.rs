//! Configuration file management for evplan.
//!
//! Provides a TOML-based config file at `~/.config/evplan/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use evplan_core::GeminiConfig;
use evplan_store::StoreConfig;
use evplan_store::config::default_data_dir;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ApiSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the evplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/evplan` or `~/.config/evplan`,
/// on macOS too.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("evplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("evplan")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since the file holds the API key.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct EvplanConfig {
    pub store: StoreConfig,
    /// `None` when no API key was found anywhere.
    api_key: Option<String>,
    pub base_url: String,
    pub model: String,
}

impl EvplanConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - API key: `cli_api_key` > `EVPLAN_API_KEY` > `api.key` > none
    /// - Base URL: `EVPLAN_API_BASE_URL` > `api.base_url` > public endpoint
    /// - Model: `EVPLAN_MODEL` > `api.model` > default model
    /// - Data dir: `cli_data_dir` > `EVPLAN_DATA_DIR` > `storage.data_dir` > XDG data dir
    ///
    /// A missing API key is not an error here; only commands that call the
    /// endpoint need one (see [`EvplanConfig::gemini`]).
    pub fn resolve(cli_api_key: Option<&str>, cli_data_dir: Option<&str>) -> Result<Self> {
        let file_config = match load_config() {
            Ok(cfg) => Some(cfg),
            Err(e) if config_path().exists() => return Err(e),
            Err(_) => None,
        };
        let file = file_config.unwrap_or_default();

        let api_key = cli_api_key
            .map(str::to_owned)
            .or_else(|| env_var("EVPLAN_API_KEY"))
            .or(file.api.key);

        let base_url = env_var("EVPLAN_API_BASE_URL")
            .or(file.api.base_url)
            .unwrap_or_else(|| GeminiConfig::DEFAULT_BASE_URL.to_string());

        let model = env_var("EVPLAN_MODEL")
            .or(file.api.model)
            .unwrap_or_else(|| GeminiConfig::DEFAULT_MODEL.to_string());

        let data_dir = cli_data_dir
            .map(PathBuf::from)
            .or_else(|| env_var("EVPLAN_DATA_DIR").map(PathBuf::from))
            .or(file.storage.data_dir)
            .unwrap_or_else(default_data_dir);

        Ok(Self {
            store: StoreConfig::new(data_dir),
            api_key,
            base_url,
            model,
        })
    }

    /// Endpoint settings, or an error pointing at `evplan init` when no key is set.
    pub fn gemini(&self) -> Result<GeminiConfig> {
        let Some(key) = self.api_key.as_deref() else {
            bail!(
                "API key not found; pass --api-key, set EVPLAN_API_KEY, or run `evplan init --api-key <KEY>`"
            );
        };
        Ok(GeminiConfig {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            api_key: key.to_string(),
        })
    }
}

/// Non-empty value of an env var.
fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{IsolatedEnv, lock_env};

    #[test]
    fn config_file_roundtrip() {
        let original = ConfigFile {
            api: ApiSection {
                key: Some("abc123".to_string()),
                base_url: None,
                model: Some("custom-model".to_string()),
            },
            storage: StorageSection {
                data_dir: Some(PathBuf::from("/tmp/evplan-data")),
            },
        };

        let contents = toml::to_string_pretty(&original).unwrap();
        assert!(!contents.contains("base_url"));
        let loaded: ConfigFile = toml::from_str(&contents).unwrap();

        assert_eq!(loaded.api.key.as_deref(), Some("abc123"));
        assert_eq!(loaded.api.model.as_deref(), Some("custom-model"));
        assert_eq!(
            loaded.storage.data_dir.as_deref(),
            Some(std::path::Path::new("/tmp/evplan-data"))
        );
    }

    #[test]
    fn partial_config_file_parses() {
        let loaded: ConfigFile = toml::from_str("[api]\nkey = \"k\"\n").unwrap();
        assert_eq!(loaded.api.key.as_deref(), Some("k"));
        assert!(loaded.storage.data_dir.is_none());

        let empty: ConfigFile = toml::from_str("").unwrap();
        assert!(empty.api.key.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn save_config_writes_owner_only_file() {
        use std::os::unix::fs::PermissionsExt;

        let _lock = lock_env();
        let env = IsolatedEnv::new();

        let cfg = ConfigFile {
            api: ApiSection {
                key: Some("secret".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        save_config(&cfg).unwrap();

        let path = config_path();
        assert!(path.starts_with(env.root()));
        let meta = std::fs::metadata(&path).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
        assert_eq!(load_config().unwrap().api.key.as_deref(), Some("secret"));
    }

    #[test]
    fn cli_flags_override_env_and_file() {
        let _lock = lock_env();
        let _env = IsolatedEnv::new();
        save_config(&ConfigFile {
            api: ApiSection {
                key: Some("file-key".to_string()),
                ..Default::default()
            },
            storage: StorageSection {
                data_dir: Some(PathBuf::from("/file/data")),
            },
        })
        .unwrap();
        unsafe { std::env::set_var("EVPLAN_API_KEY", "env-key") };
        unsafe { std::env::set_var("EVPLAN_DATA_DIR", "/env/data") };

        let cfg = EvplanConfig::resolve(Some("cli-key"), Some("/cli/data")).unwrap();
        assert_eq!(cfg.gemini().unwrap().api_key, "cli-key");
        assert_eq!(cfg.store.data_dir, PathBuf::from("/cli/data"));
    }

    #[test]
    fn env_overrides_config_file() {
        let _lock = lock_env();
        let _env = IsolatedEnv::new();
        save_config(&ConfigFile {
            api: ApiSection {
                key: Some("file-key".to_string()),
                base_url: Some("http://file".to_string()),
                model: Some("file-model".to_string()),
            },
            ..Default::default()
        })
        .unwrap();
        unsafe { std::env::set_var("EVPLAN_API_KEY", "env-key") };
        unsafe { std::env::set_var("EVPLAN_MODEL", "env-model") };

        let cfg = EvplanConfig::resolve(None, None).unwrap();
        let gemini = cfg.gemini().unwrap();
        assert_eq!(gemini.api_key, "env-key");
        assert_eq!(gemini.model, "env-model");
        assert_eq!(gemini.base_url, "http://file");
    }

    #[test]
    fn defaults_when_nothing_set() {
        let _lock = lock_env();
        let env = IsolatedEnv::new();

        let cfg = EvplanConfig::resolve(Some("k"), None).unwrap();
        assert_eq!(cfg.base_url, GeminiConfig::DEFAULT_BASE_URL);
        assert_eq!(cfg.model, GeminiConfig::DEFAULT_MODEL);
        assert!(cfg.store.data_dir.starts_with(env.root()));
        assert!(cfg.store.data_dir.ends_with("evplan"));
    }

    #[test]
    fn missing_api_key_points_at_init() {
        let _lock = lock_env();
        let _env = IsolatedEnv::new();

        let cfg = EvplanConfig::resolve(None, None).unwrap();
        let msg = cfg.gemini().unwrap_err().to_string();
        assert!(msg.contains("API key not found"), "unexpected error: {msg}");
        assert!(msg.contains("evplan init"), "unexpected error: {msg}");
    }

    #[test]
    fn unparseable_config_file_is_an_error() {
        let _lock = lock_env();
        let _env = IsolatedEnv::new();
        std::fs::create_dir_all(config_dir()).unwrap();
        std::fs::write(config_path(), "[api\nkey=").unwrap();

        let err = EvplanConfig::resolve(None, None).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse config file"));
    }

    #[test]
    fn config_path_ends_with_expected_filename() {
        let path = config_path();
        assert!(
            path.ends_with("evplan/config.toml"),
            "unexpected config path: {}",
            path.display()
        );
    }
}
