//! Persistence Module
//!
//! Key-value storage scoped to this plugin. The host provides the real
//! backend; `MemoryStorage` and `AtomicSaveData` (JSON files written
//! atomically) are the in-crate implementations.

pub mod atomic_save_data;
pub mod memory_storage;

pub use atomic_save_data::AtomicSaveData;
pub use memory_storage::MemoryStorage;

pub type PersistenceResult<T> = Result<T, PersistenceError>;

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Save failed: {0}")]
    SaveFailed(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Deserialization error: {0}")]
    DeserializationError(String),
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Corrupted data: {0}")]
    CorruptedData(String),
}

/// Plugin-scoped key-value storage
///
/// Values are whole JSON documents; every `save` replaces the previous
/// document for that key.
pub trait PluginStorage {
    fn load(&self, key: &str) -> PersistenceResult<Option<serde_json::Value>>;

    fn save(&mut self, key: &str, value: &serde_json::Value) -> PersistenceResult<()>;
}
