use {
    crate::{KeyValueStore, PrefValue, PrefsError},
    bevy::prelude::*,
    std::{
        collections::BTreeMap,
        fs,
        io::Write,
        path::{Path, PathBuf},
    },
};

/// Prefs kept in a single JSON object on disk.
///
/// Writes are buffered in memory until [`KeyValueStore::flush`]. The file is
/// replaced through a temporary sibling so a crash mid-write leaves the
/// previous contents intact.
#[derive(Debug)]
pub struct JsonFilePrefs {
    path: PathBuf,
    values: BTreeMap<String, PrefValue>,
    dirty: bool,
}

impl JsonFilePrefs {
    /// Opens the file, starting empty when it is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match Self::read(&path) {
            Ok(values) => values,
            Err(PrefsError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No prefs file at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => {
                warn!("Discarding unreadable prefs file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self {
            path,
            values,
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(path: &Path) -> Result<BTreeMap<String, PrefValue>, PrefsError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn write(&self) -> Result<(), PrefsError> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let serialized = serde_json::to_string_pretty(&self.values)?;
        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = fs::File::options()
            .write(true)
            .truncate(true)
            .create(true)
            .open(&tmp_path)?;
        file.write_all(serialized.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFilePrefs {
    fn get(&self, key: &str) -> Option<&PrefValue> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: PrefValue) {
        self.values.insert(key.to_string(), value);
        self.dirty = true;
    }

    fn delete(&mut self, key: &str) -> bool {
        let removed = self.values.remove(key).is_some();
        self.dirty |= removed;
        removed
    }

    fn flush(&mut self) -> Result<(), PrefsError> {
        if !self.dirty {
            return Ok(());
        }
        self.write()?;
        self.dirty = false;
        trace!("Prefs written to {}", self.path.display());
        Ok(())
    }
}
