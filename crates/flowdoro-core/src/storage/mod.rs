mod config;
pub mod database;

pub use config::{AnnoyingLevel, Config, Theme};
pub use database::{Database, SessionRecord, Stats};

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/flowdoro[-dev]/` based on FLOWDORO_ENV.
///
/// Set FLOWDORO_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FLOWDORO_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("flowdoro-dev")
    } else {
        base_dir.join("flowdoro")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Narrow persistence interface the controller snapshots through.
///
/// Absent or corrupt blobs surface as `None`; callers fall back to
/// defaults. Writes are fire-and-forget from the controller's point of
/// view -- a failed save is logged and the in-memory state stays
/// authoritative.
pub trait StateStore {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, json: &str) -> Result<(), StorageError>;
}

/// In-memory store for tests and hosts without persistence.
#[derive(Default)]
pub struct MemoryStore {
    entries: std::cell::RefCell<std::collections::HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn save(&self, key: &str, json: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), json.to_string());
        Ok(())
    }
}

impl<S: StateStore + ?Sized> StateStore for std::rc::Rc<S> {
    fn load(&self, key: &str) -> Option<String> {
        (**self).load(key)
    }

    fn save(&self, key: &str, json: &str) -> Result<(), StorageError> {
        (**self).save(key, json)
    }
}
