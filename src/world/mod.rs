//! World Module
//!
//! Host world access for the explorables plugin.
//!
//! # Architecture Overview
//!
//! - **Core**: positions and cell objects
//! - **Interfaces**: the `ChunkStore` seam the host implements
//! - **Data/Operations**: in-memory chunk storage (`WorldData`) and the pure
//!   functions over it
//!
//! The plugin only ever writes into chunks it has loaded, and only through
//! `ChunkStore`.

pub mod core;
pub mod data_types;
pub mod error;
pub mod interfaces;
pub mod world_operations;

pub use self::core::{CellObject, CellPos, ChunkPos, StructureId};
pub use data_types::{ChunkData, WorldData};
pub use error::{WorldError, WorldResult};
pub use interfaces::{ensure_chunk_loaded, ChunkStore};
pub use world_operations::{
    chunks_covering, get_loaded_chunks, log_world_stats, objects_in_region, total_objects,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::core::CHUNK_SIZE;

    #[test]
    fn test_cell_to_chunk_conversion() {
        let pos = CellPos { x: 65, y: -15 };
        let chunk = pos.to_chunk_pos(32);

        // 65 / 32 = 2, -15 / 32 = -1
        assert_eq!(chunk.x, 2);
        assert_eq!(chunk.y, -1);
    }

    #[test]
    fn test_cell_to_chunk_conversion_with_constant() {
        let pos = CellPos { x: 250, y: -25 };
        let chunk = pos.to_chunk_pos(CHUNK_SIZE);

        // With CHUNK_SIZE=100: 250/100=2, -25/100=-1
        assert_eq!(chunk, ChunkPos::new(2, -1));
        assert_eq!(chunk.origin(CHUNK_SIZE), CellPos::new(200, -100));
    }
}
