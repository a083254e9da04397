//! Helpers for unit tests that touch process-wide environment variables.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use tempfile::TempDir;

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Serialize tests that read or write env vars.
pub fn lock_env() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

const VARS: [&str; 7] = [
    "HOME",
    "XDG_CONFIG_HOME",
    "XDG_DATA_HOME",
    "EVPLAN_API_KEY",
    "EVPLAN_API_BASE_URL",
    "EVPLAN_MODEL",
    "EVPLAN_DATA_DIR",
];

/// Points `HOME` at a temp dir and clears evplan variables, restoring
/// everything on drop. Hold [`lock_env`] for as long as this lives.
pub struct IsolatedEnv {
    saved: Vec<(&'static str, Option<String>)>,
    dir: TempDir,
}

impl IsolatedEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let saved = VARS.iter().map(|v| (*v, std::env::var(v).ok())).collect();
        for var in VARS {
            unsafe { std::env::remove_var(var) };
        }
        unsafe { std::env::set_var("HOME", dir.path()) };
        Self { saved, dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

impl Drop for IsolatedEnv {
    fn drop(&mut self) {
        for (var, value) in &self.saved {
            match value {
                Some(v) => unsafe { std::env::set_var(var, v) },
                None => unsafe { std::env::remove_var(var) },
            }
        }
    }
}
