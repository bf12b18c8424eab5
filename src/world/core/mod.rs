//! Core world data types
//!
//! Positions and the objects stored in world cells. Independent of how the
//! host actually stores its chunks.

mod position;
mod structure;

pub use position::{CellPos, ChunkPos};
pub use structure::{CellObject, StructureId};
