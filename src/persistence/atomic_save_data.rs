//! Atomic Save Data - JSON file per key
//!
//! Each save writes `<key>.json.tmp` and renames it over `<key>.json`, so a
//! crash mid-write leaves the previous document intact.
use super::{PersistenceError, PersistenceResult, PluginStorage};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct AtomicSaveData {
    pub root: PathBuf,
}

impl AtomicSaveData {
    /// Open (and create if missing) a storage directory
    pub fn new(root: impl Into<PathBuf>) -> PersistenceResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json.tmp", key))
    }
}

fn validate_key(key: &str) -> PersistenceResult<()> {
    if key.is_empty() || key.contains(['/', '\\']) || Path::new(key).is_absolute() {
        return Err(PersistenceError::SaveFailed(format!(
            "invalid storage key '{}'",
            key
        )));
    }
    Ok(())
}

impl PluginStorage for AtomicSaveData {
    fn load(&self, key: &str) -> PersistenceResult<Option<serde_json::Value>> {
        validate_key(key)?;
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        let value = serde_json::from_slice(&bytes)
            .map_err(|e| PersistenceError::DeserializationError(format!("{}: {}", path.display(), e)))?;
        Ok(Some(value))
    }

    fn save(&mut self, key: &str, value: &serde_json::Value) -> PersistenceResult<()> {
        validate_key(key)?;
        let bytes = serde_json::to_vec_pretty(value)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;

        let temp_path = self.temp_path_for(key);
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, self.path_for(key))?;

        log::debug!("[Persistence] Saved '{}' ({} bytes)", key, bytes.len());
        Ok(())
    }
}
