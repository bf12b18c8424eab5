/// World Error Handling
///
/// Errors raised by chunk storage operations.
use super::core::ChunkPos;

/// World-specific result type
pub type WorldResult<T> = Result<T, WorldError>;

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("Chunk not loaded: {chunk}")]
    ChunkNotLoaded { chunk: ChunkPos },
}
