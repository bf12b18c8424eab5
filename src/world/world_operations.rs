//! World Operations - Pure DOP Functions
//!
//! Functions over `WorldData`. This is the in-memory stand-in for the host's
//! chunk storage and backs the `ChunkStore` implementation in `interfaces`.

use super::core::{CellObject, CellPos, ChunkPos};
use super::data_types::{ChunkData, WorldData};
use super::error::{WorldError, WorldResult};

// ============================================================================
// CHUNK OPERATIONS
// ============================================================================

/// Convert a cell position to the chunk that holds it
pub fn to_chunk_coords(world: &WorldData, pos: CellPos) -> ChunkPos {
    pos.to_chunk_pos(world.chunk_size)
}

/// Check if chunk is loaded
pub fn is_chunk_loaded(world: &WorldData, chunk_pos: ChunkPos) -> bool {
    world.active_chunks.contains(&chunk_pos)
}

/// Load a chunk (mark as active and create if needed)
pub fn load_chunk(world: &mut WorldData, chunk_pos: ChunkPos) -> WorldResult<()> {
    if world.active_chunks.contains(&chunk_pos) {
        return Ok(());
    }

    world
        .chunks
        .entry(chunk_pos)
        .or_insert_with(|| ChunkData::new(chunk_pos));
    world.active_chunks.insert(chunk_pos);
    world.loads += 1;

    Ok(())
}

/// Unload a chunk (mark as inactive, cells are kept)
pub fn unload_chunk(world: &mut WorldData, chunk_pos: ChunkPos) -> WorldResult<()> {
    if world.active_chunks.remove(&chunk_pos) {
        world.unloads += 1;
    }
    Ok(())
}

/// Get all loaded chunks
pub fn get_loaded_chunks(world: &WorldData) -> Vec<ChunkPos> {
    world.active_chunks.iter().copied().collect()
}

/// Every chunk touched by the inclusive cell rectangle `min..=max`
pub fn chunks_covering(min: CellPos, max: CellPos, chunk_size: i32) -> Vec<ChunkPos> {
    let low = min.to_chunk_pos(chunk_size);
    let high = max.to_chunk_pos(chunk_size);

    let mut chunks = Vec::new();
    for x in low.x..=high.x {
        for y in low.y..=high.y {
            chunks.push(ChunkPos { x, y });
        }
    }
    chunks
}

// ============================================================================
// CELL OPERATIONS
// ============================================================================

/// Get the object at a world position
///
/// Reads stored cells whether or not their chunk is currently loaded.
pub fn get_object(world: &WorldData, pos: CellPos) -> Option<&CellObject> {
    let chunk_pos = to_chunk_coords(world, pos);
    world
        .chunks
        .get(&chunk_pos)
        .and_then(|chunk| chunk.cells.get(&pos))
}

/// Mutable access to the object at a world position. The chunk must be loaded.
pub fn get_object_mut(world: &mut WorldData, pos: CellPos) -> WorldResult<Option<&mut CellObject>> {
    let chunk = loaded_chunk_mut(world, pos)?;
    Ok(chunk.cells.get_mut(&pos))
}

/// Write an object into a cell, returning the previous occupant
pub fn set_object(
    world: &mut WorldData,
    pos: CellPos,
    object: CellObject,
) -> WorldResult<Option<CellObject>> {
    let chunk = loaded_chunk_mut(world, pos)?;
    Ok(chunk.cells.insert(pos, object))
}

/// Remove whatever occupies a cell
pub fn clear_cell(world: &mut WorldData, pos: CellPos) -> WorldResult<Option<CellObject>> {
    let chunk = loaded_chunk_mut(world, pos)?;
    Ok(chunk.cells.remove(&pos))
}

fn loaded_chunk_mut(world: &mut WorldData, pos: CellPos) -> WorldResult<&mut ChunkData> {
    let chunk_pos = to_chunk_coords(world, pos);
    if !world.active_chunks.contains(&chunk_pos) {
        return Err(WorldError::ChunkNotLoaded { chunk: chunk_pos });
    }
    world
        .chunks
        .get_mut(&chunk_pos)
        .ok_or(WorldError::ChunkNotLoaded { chunk: chunk_pos })
}

// ============================================================================
// QUERIES
// ============================================================================

/// All occupied cells inside the inclusive rectangle `min..=max`
pub fn objects_in_region(
    world: &WorldData,
    min: CellPos,
    max: CellPos,
) -> Vec<(CellPos, &CellObject)> {
    let mut found: Vec<(CellPos, &CellObject)> = chunks_covering(min, max, world.chunk_size)
        .into_iter()
        .filter_map(|chunk_pos| world.chunks.get(&chunk_pos))
        .flat_map(|chunk| chunk.cells.iter())
        .filter(|(pos, _)| pos.x >= min.x && pos.x <= max.x && pos.y >= min.y && pos.y <= max.y)
        .map(|(pos, object)| (*pos, object))
        .collect();
    found.sort_by_key(|(pos, _)| *pos);
    found
}

/// Total occupied cells across all chunks
pub fn total_objects(world: &WorldData) -> usize {
    world.chunks.values().map(|chunk| chunk.cells.len()).sum()
}

/// Log world statistics
pub fn log_world_stats(world: &WorldData) {
    log::info!("[World] Statistics:");
    log::info!("  Chunk size: {}", world.chunk_size);
    log::info!("  Stored chunks: {}", world.chunks.len());
    log::info!("  Active chunks: {}", world.active_chunks.len());
    log::info!("  Occupied cells: {}", total_objects(world));
    log::info!("  Loads/unloads: {}/{}", world.loads, world.unloads);
}
