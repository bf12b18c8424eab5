//! Memory Storage - volatile `PluginStorage`
use super::{PersistenceResult, PluginStorage};
use rustc_hash::FxHashMap;

/// In-memory storage, lost when dropped
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    pub documents: FxHashMap<String, serde_json::Value>,
    /// Number of saves performed
    pub saves: u64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PluginStorage for MemoryStorage {
    fn load(&self, key: &str) -> PersistenceResult<Option<serde_json::Value>> {
        Ok(self.documents.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &serde_json::Value) -> PersistenceResult<()> {
        self.documents.insert(key.to_string(), value.clone());
        self.saves += 1;
        Ok(())
    }
}
