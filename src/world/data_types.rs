//! World Data Types - Pure DOP Structures
//!
//! These are the data structures that world_operations functions operate on.
//! NO METHODS beyond constructors - just pure data.

use super::core::{CellObject, CellPos, ChunkPos};
use rustc_hash::{FxHashMap, FxHashSet};

/// In-memory chunk storage
///
/// Reference implementation of the host's chunk store. Chunks stay in
/// `chunks` after unloading; only `active_chunks` tracks what is loaded.
#[derive(Clone, Debug, Default)]
pub struct WorldData {
    /// All chunks ever created
    pub chunks: FxHashMap<ChunkPos, ChunkData>,

    /// Currently loaded chunk positions
    pub active_chunks: FxHashSet<ChunkPos>,

    /// Chunk side in cells
    pub chunk_size: i32,

    /// Number of load requests that actually loaded a chunk
    pub loads: u64,

    /// Number of unload requests that actually unloaded a chunk
    pub unloads: u64,
}

/// Single chunk's cells
#[derive(Clone, Debug)]
pub struct ChunkData {
    /// Chunk position in chunk coordinates
    pub position: ChunkPos,

    /// Occupied cells, keyed by world position
    pub cells: FxHashMap<CellPos, CellObject>,
}

impl WorldData {
    /// Create new empty world data
    pub fn new(chunk_size: i32) -> Self {
        Self {
            chunk_size,
            ..Default::default()
        }
    }
}

impl ChunkData {
    pub fn new(position: ChunkPos) -> Self {
        Self {
            position,
            cells: FxHashMap::default(),
        }
    }
}
