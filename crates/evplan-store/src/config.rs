use std::env;
use std::path::PathBuf;

/// Storage configuration.
///
/// The CLI resolves `data_dir` from its flag, `EVPLAN_DATA_DIR`, the config
/// file, and finally [`default_data_dir`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding the key-value file.
    pub data_dir: PathBuf,
    /// Slot name the event collection is serialized under.
    pub key: String,
}

impl StoreConfig {
    /// Slot name used when none is configured.
    pub const DEFAULT_KEY: &str = "eventPlans";

    /// File name of the key-value store inside `data_dir`.
    pub const STORE_FILE: &str = "store.json";

    /// Build a config from an explicit directory (useful for tests and CLI flags).
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            key: Self::DEFAULT_KEY.to_owned(),
        }
    }

    /// Full path of the key-value file.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(Self::STORE_FILE)
    }
}

/// Return the default data directory.
///
/// Uses XDG layout on every platform, mirroring where the config file lives.
pub fn default_data_dir() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg).join("evplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local")
        .join("share")
        .join("evplan")
}
