//! World Interfaces
//!
//! `ChunkStore` is the seam between this plugin and the host's chunk
//! storage. The host implements it over its own chunks; `WorldData` is the
//! in-memory implementation.

use super::core::{CellObject, CellPos, ChunkPos};
use super::data_types::WorldData;
use super::error::WorldResult;
use super::world_operations;

/// Host chunk storage
pub trait ChunkStore {
    /// Chunk side in cells
    fn chunk_size(&self) -> i32;

    /// Convert a cell position to its chunk
    fn to_chunk_coords(&self, pos: CellPos) -> ChunkPos {
        pos.to_chunk_pos(self.chunk_size())
    }

    fn is_chunk_loaded(&self, chunk: ChunkPos) -> bool;

    /// Load a chunk. Returns once the host has the chunk resident.
    fn load_chunk(&mut self, chunk: ChunkPos) -> WorldResult<()>;

    fn unload_chunk(&mut self, chunk: ChunkPos) -> WorldResult<()>;

    /// Object at a world position, if any
    fn get_object(&self, pos: CellPos) -> Option<&CellObject>;

    /// Mutable object at a world position. The chunk must be loaded.
    fn get_object_mut(&mut self, pos: CellPos) -> WorldResult<Option<&mut CellObject>>;

    /// Write a cell. The chunk must be loaded.
    fn set_object(&mut self, pos: CellPos, object: CellObject) -> WorldResult<Option<CellObject>>;

    /// Empty a cell. The chunk must be loaded.
    fn clear_cell(&mut self, pos: CellPos) -> WorldResult<Option<CellObject>>;
}

/// Load `chunk` unless it is already resident. Returns whether a load happened.
pub fn ensure_chunk_loaded(store: &mut dyn ChunkStore, chunk: ChunkPos) -> WorldResult<bool> {
    if store.is_chunk_loaded(chunk) {
        return Ok(false);
    }
    store.load_chunk(chunk)?;
    Ok(true)
}

impl ChunkStore for WorldData {
    fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    fn is_chunk_loaded(&self, chunk: ChunkPos) -> bool {
        world_operations::is_chunk_loaded(self, chunk)
    }

    fn load_chunk(&mut self, chunk: ChunkPos) -> WorldResult<()> {
        world_operations::load_chunk(self, chunk)
    }

    fn unload_chunk(&mut self, chunk: ChunkPos) -> WorldResult<()> {
        world_operations::unload_chunk(self, chunk)
    }

    fn get_object(&self, pos: CellPos) -> Option<&CellObject> {
        world_operations::get_object(self, pos)
    }

    fn get_object_mut(&mut self, pos: CellPos) -> WorldResult<Option<&mut CellObject>> {
        world_operations::get_object_mut(self, pos)
    }

    fn set_object(&mut self, pos: CellPos, object: CellObject) -> WorldResult<Option<CellObject>> {
        world_operations::set_object(self, pos, object)
    }

    fn clear_cell(&mut self, pos: CellPos) -> WorldResult<Option<CellObject>> {
        world_operations::clear_cell(self, pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_chunk_loaded_reports_load() {
        let mut world = WorldData::new(32);
        let chunk = ChunkPos::new(4, -2);

        assert!(ensure_chunk_loaded(&mut world, chunk).expect("first load"));
        assert!(!ensure_chunk_loaded(&mut world, chunk).expect("second load"));
        assert_eq!(world.loads, 1);
    }
}
