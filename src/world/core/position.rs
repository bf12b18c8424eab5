use serde::{Deserialize, Serialize};
use std::fmt;

/// World cell position (one tile of the 2D host grid)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub x: i32,
    pub y: i32,
}

/// Chunk position in chunk coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkPos {
    pub x: i32,
    pub y: i32,
}

impl CellPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by a delta on each axis
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Chunk containing this cell. Floors toward negative infinity.
    pub fn to_chunk_pos(self, chunk_size: i32) -> ChunkPos {
        ChunkPos {
            x: self.x.div_euclid(chunk_size),
            y: self.y.div_euclid(chunk_size),
        }
    }
}

impl ChunkPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Lower-left cell of this chunk
    pub fn origin(self, chunk_size: i32) -> CellPos {
        CellPos {
            x: self.x * chunk_size,
            y: self.y * chunk_size,
        }
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.x, self.y)
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for CellPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}
