//! Small key-value store for player preferences and progress.
//!
//! Values are typed (`int`, `float`, `string`) and addressed by string keys,
//! so stored layouts stay compatible with the key formats the game has always
//! used (`CurrentLevel`, `Level_3_Completed`, ...).
//!
//! Two backends are provided:
//! - [`MemoryPrefs`] for tests and for running without a writable disk
//! - [`JsonFilePrefs`] which keeps everything in one JSON file

mod file;

pub use file::JsonFilePrefs;

use {
    bevy::prelude::*,
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("prefs i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("prefs file is not valid json: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Int(i32),
    Float(f32),
    String(String),
}

/// Storage seam. Reads never fail: a missing key or a value of another type
/// reads as `None`.
pub trait KeyValueStore: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<&PrefValue>;
    fn set(&mut self, key: &str, value: PrefValue);
    fn delete(&mut self, key: &str) -> bool;
    /// Makes pending writes durable.
    fn flush(&mut self) -> Result<(), PrefsError>;

    fn has_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn get_int(&self, key: &str) -> Option<i32> {
        match self.get(key)? {
            PrefValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    fn get_float(&self, key: &str) -> Option<f32> {
        match self.get(key)? {
            PrefValue::Float(value) => Some(*value),
            PrefValue::Int(value) => Some(*value as f32),
            _ => None,
        }
    }

    fn get_string(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            PrefValue::String(value) => Some(value),
            _ => None,
        }
    }

    fn set_int(&mut self, key: &str, value: i32) {
        self.set(key, PrefValue::Int(value));
    }

    fn set_float(&mut self, key: &str, value: f32) {
        self.set(key, PrefValue::Float(value));
    }

    fn set_string(&mut self, key: &str, value: String) {
        self.set(key, PrefValue::String(value));
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryPrefs {
    values: BTreeMap<String, PrefValue>,
}

impl MemoryPrefs {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl KeyValueStore for MemoryPrefs {
    fn get(&self, key: &str) -> Option<&PrefValue> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: PrefValue) {
        self.values.insert(key.to_string(), value);
    }

    fn delete(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    fn flush(&mut self) -> Result<(), PrefsError> {
        Ok(())
    }
}

/// The store shared by every plugin that persists something.
#[derive(Resource, Deref, DerefMut)]
pub struct Prefs(pub Box<dyn KeyValueStore>);

impl Prefs {
    pub fn new(store: impl KeyValueStore) -> Self {
        Self(Box::new(store))
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryPrefs::default())
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        self.0.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn KeyValueStore {
        self.0.as_mut()
    }

    /// Flushes and logs instead of failing; persistence is best effort.
    pub fn flush_or_log(&mut self) {
        if let Err(e) = self.0.flush() {
            error!("Failed to flush prefs: {}", e);
        }
    }
}

impl Default for Prefs {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_reads() {
        let mut prefs = MemoryPrefs::default();
        prefs.set_int("CurrentLevel", 2);
        prefs.set_string("Level_1_Progress", "{}".to_string());
        prefs.set_float("volume", 0.5);

        assert_eq!(prefs.get_int("CurrentLevel"), Some(2));
        assert_eq!(prefs.get_string("CurrentLevel"), None);
        assert_eq!(prefs.get_string("Level_1_Progress"), Some("{}"));
        assert_eq!(prefs.get_float("volume"), Some(0.5));
        assert_eq!(prefs.get_float("CurrentLevel"), Some(2.0));
        assert_eq!(prefs.get_int("missing"), None);
    }

    #[test]
    fn test_delete() {
        let mut prefs = MemoryPrefs::default();
        prefs.set_int("Level_1_Completed", 1);
        assert!(prefs.has_key("Level_1_Completed"));
        assert!(prefs.delete("Level_1_Completed"));
        assert!(!prefs.delete("Level_1_Completed"));
        assert!(!prefs.has_key("Level_1_Completed"));
    }

    #[test]
    fn test_resource_derefs_to_store() {
        let mut prefs = Prefs::in_memory();
        prefs.set_int("CurrentLevel", 4);
        assert_eq!(prefs.get_int("CurrentLevel"), Some(4));
        prefs.flush_or_log();
    }
}
