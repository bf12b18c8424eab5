//! Explorable Registry
//!
//! Durable id → `Explorable` mapping. The whole snapshot (instances plus
//! free list) is written to plugin storage after every mutation.

use super::explorable_data::{Explorable, ExplorableId, ExplorableStorage};
use super::slot_operations;
use crate::constants::storage::FORMAT_VERSION;
use crate::error::{ExplorableError, ExplorableResult};
use crate::persistence::{PersistenceError, PluginStorage};

/// Repository over live explorables
pub trait ExplorableRepository {
    fn get(&self, id: ExplorableId) -> Option<&Explorable>;

    /// Store `explorable` in slot `id`, replacing any previous record
    fn put(&mut self, id: ExplorableId, explorable: Explorable) -> ExplorableResult<()>;

    /// Vacate slot `id` and return its record. Vacant slots yield `Ok(None)`.
    fn delete(&mut self, id: ExplorableId) -> ExplorableResult<Option<Explorable>>;
}

pub struct ExplorableRegistry {
    storage: Box<dyn PluginStorage + Send>,
    key: String,
    capacity: u32,
    data: ExplorableStorage,
}

impl ExplorableRegistry {
    /// Open the registry stored under `key`, starting empty if none exists
    pub fn open(
        storage: Box<dyn PluginStorage + Send>,
        key: impl Into<String>,
        capacity: u32,
    ) -> ExplorableResult<Self> {
        let key = key.into();
        let mut data = match storage.load(&key)? {
            Some(value) => {
                let data: ExplorableStorage = serde_json::from_value(value)
                    .map_err(|e| PersistenceError::DeserializationError(e.to_string()))?;
                if data.version > FORMAT_VERSION {
                    return Err(PersistenceError::VersionMismatch {
                        expected: FORMAT_VERSION,
                        found: data.version,
                    }
                    .into());
                }
                data
            }
            None => ExplorableStorage::default(),
        };

        if let Some(fault) = slot_operations::free_list_fault(&data) {
            return Err(PersistenceError::CorruptedData(format!("'{}': {}", key, fault)).into());
        }
        let reclaimed = slot_operations::reclaim_vacant_slots(&mut data);

        log::info!(
            "[Registry] Opened '{}': {} live, {} free",
            key,
            slot_operations::live_count(&data),
            data.unused.len()
        );

        let mut registry = Self {
            storage,
            key,
            capacity,
            data,
        };
        if !reclaimed.is_empty() {
            log::warn!(
                "[Registry] Reclaimed {} slots reserved before a restart: {:?}",
                reclaimed.len(),
                reclaimed
            );
            registry.persist()?;
        }
        Ok(registry)
    }

    /// Write the snapshot to plugin storage
    pub fn persist(&mut self) -> ExplorableResult<()> {
        let value = serde_json::to_value(&self.data)
            .map_err(|e| PersistenceError::SerializationError(e.to_string()))?;
        self.storage.save(&self.key, &value)?;
        Ok(())
    }

    /// Reserve a slot id for a new explorable
    pub fn allocate(&mut self) -> ExplorableResult<ExplorableId> {
        let id = slot_operations::allocate_slot(&mut self.data, self.capacity)?;
        self.persist()?;
        Ok(id)
    }

    /// Return a reserved slot that never received a record
    pub fn release(&mut self, id: ExplorableId) -> ExplorableResult<()> {
        if slot_operations::free_slot(&mut self.data, id) {
            self.persist()?;
        }
        Ok(())
    }

    /// Mutate a live record in place and persist
    pub fn update<F>(&mut self, id: ExplorableId, f: F) -> ExplorableResult<Explorable>
    where
        F: FnOnce(&mut Explorable),
    {
        let explorable = self
            .data
            .explorables
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or(ExplorableError::ExplorableNotFound { id })?;
        f(explorable);
        let updated = explorable.clone();
        self.persist()?;
        Ok(updated)
    }

    pub fn contains(&self, id: ExplorableId) -> bool {
        slot_operations::is_live(&self.data, id)
    }

    pub fn live_ids(&self) -> Vec<ExplorableId> {
        slot_operations::live_ids(&self.data)
    }

    pub fn live_count(&self) -> usize {
        slot_operations::live_count(&self.data)
    }

    pub fn free_slots(&self) -> &[ExplorableId] {
        &self.data.unused
    }

    pub fn data(&self) -> &ExplorableStorage {
        &self.data
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl ExplorableRepository for ExplorableRegistry {
    fn get(&self, id: ExplorableId) -> Option<&Explorable> {
        self.data.explorables.get(id.index()).and_then(Option::as_ref)
    }

    fn put(&mut self, id: ExplorableId, explorable: Explorable) -> ExplorableResult<()> {
        if id.0 >= self.capacity {
            return Err(ExplorableError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        if self.data.explorables.len() <= id.index() {
            self.data.explorables.resize(id.index() + 1, None);
        }
        self.data.unused.retain(|free| *free != id);
        self.data.explorables[id.index()] = Some(explorable);
        self.persist()
    }

    fn delete(&mut self, id: ExplorableId) -> ExplorableResult<Option<Explorable>> {
        let Some(explorable) = self.data.explorables.get_mut(id.index()).and_then(Option::take)
        else {
            return Ok(None);
        };
        slot_operations::free_slot(&mut self.data, id);
        self.persist()?;
        Ok(Some(explorable))
    }
}
