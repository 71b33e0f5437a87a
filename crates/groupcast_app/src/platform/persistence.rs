use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use groupcast_core::{KeyValueStore, StorageError};
use groupcast_engine::AtomicFileWriter;
use groupcast_logging::{cast_info, cast_warn};

const STORAGE_FILENAME: &str = "local_storage.ron";

/// Per-profile string map kept in `<state_dir>/local_storage.ron`.
/// Every `set` rewrites the whole file atomically.
pub struct LocalStorage {
    dir: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LocalStorage {
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        let path = dir.join(STORAGE_FILENAME);
        let entries = match fs::read_to_string(&path) {
            Ok(text) => ron::from_str(&text).map_err(|err| {
                cast_warn!("Failed to parse local storage {:?}: {}", path, err);
                StorageError::Corrupted(format!("{}: {err}", path.display()))
            })?,
            Err(err) if err.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(StorageError::Unavailable(format!(
                    "{}: {err}",
                    path.display()
                )))
            }
        };
        cast_info!("Opened local storage at {:?}", path);
        Ok(Self {
            dir: dir.to_path_buf(),
            entries,
        })
    }

    fn flush(&self) -> Result<(), StorageError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&self.entries, pretty)
            .map_err(|err| StorageError::Unavailable(err.to_string()))?;
        AtomicFileWriter::new(self.dir.clone())
            .write(STORAGE_FILENAME, content.as_bytes())
            .map_err(|err| StorageError::Unavailable(err.to_string()))?;
        Ok(())
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(err) = self.flush() {
            // Keep memory consistent with disk.
            match previous {
                Some(old) => self.entries.insert(key.to_string(), old),
                None => self.entries.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }
}
