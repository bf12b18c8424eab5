//! Placement Operations - stamping explorables into the world
//!
//! Every slot owns a fixed square of the world far past the playable edge:
//!
//! ```text
//! origin.x = -world_edge + slot_spacing * grid_x
//! origin.y =  world_edge + slot_spacing * grid_y
//! ```
//!
//! A stamped explorable occupies `(width + 2) x (height + 2)` cells from the
//! origin: a barrier ring around the blueprint's interior.

use super::blueprint::ResolvedLayout;
use super::explorable_data::ExplorableId;
use super::slot_operations::grid_coords;
use crate::error::ExplorableResult;
use crate::world::{
    chunks_covering, ensure_chunk_loaded, CellObject, CellPos, ChunkPos, ChunkStore, StructureId,
};
use crate::ExplorablesConfig;

/// Rectangle covered by one stamped explorable, barrier included
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footprint {
    pub origin: CellPos,
    pub width: u32,
    pub height: u32,
}

impl Footprint {
    pub fn new(origin: CellPos, width: u32, height: u32) -> Self {
        Self {
            origin,
            width,
            height,
        }
    }

    pub fn min(&self) -> CellPos {
        self.origin
    }

    /// Top-right barrier corner
    pub fn max(&self) -> CellPos {
        self.origin
            .offset(self.width as i32 + 1, self.height as i32 + 1)
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        let max = self.max();
        pos.x >= self.origin.x && pos.x <= max.x && pos.y >= self.origin.y && pos.y <= max.y
    }

    pub fn is_perimeter(&self, pos: CellPos) -> bool {
        let max = self.max();
        self.contains(pos)
            && (pos.x == self.origin.x || pos.x == max.x || pos.y == self.origin.y || pos.y == max.y)
    }

    /// Every barrier cell, corners included
    pub fn perimeter(&self) -> Vec<CellPos> {
        let max = self.max();
        let mut cells = Vec::with_capacity(2 * (self.width as usize + self.height as usize) + 4);
        for x in self.origin.x..=max.x {
            for y in self.origin.y..=max.y {
                let pos = CellPos::new(x, y);
                if self.is_perimeter(pos) {
                    cells.push(pos);
                }
            }
        }
        cells
    }
}

/// Outcome of stamping a layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampResult {
    pub footprint: Footprint,
    /// Position of the exit cell, where entering players land
    pub entrance: Option<CellPos>,
    pub cells_written: usize,
}

/// World origin of a slot
pub fn slot_origin(id: ExplorableId, config: &ExplorablesConfig) -> CellPos {
    let (grid_x, grid_y) = grid_coords(id, config.grid_width);
    grid_origin(grid_x, grid_y, config)
}

/// World origin of a grid position
pub fn grid_origin(grid_x: u32, grid_y: u32, config: &ExplorablesConfig) -> CellPos {
    CellPos::new(
        -config.world_edge + config.slot_spacing * grid_x as i32,
        config.world_edge + config.slot_spacing * grid_y as i32,
    )
}

/// World cell of layout index `index`
///
/// Rows are stored top-first, so row 0 lands on `origin.y + height`.
pub fn layout_cell(origin: CellPos, width: u32, height: u32, index: usize) -> CellPos {
    let width = width as usize;
    CellPos::new(
        origin.x + 1 + (index % width) as i32,
        origin.y + height as i32 - (index / width) as i32,
    )
}

/// Run `f` with every chunk of the rectangle loaded
///
/// Chunks loaded here are unloaded again afterwards, whether `f` succeeds or
/// not. Chunks that were already resident are left alone.
pub fn with_region_loaded<T>(
    store: &mut dyn ChunkStore,
    min: CellPos,
    max: CellPos,
    f: impl FnOnce(&mut dyn ChunkStore) -> ExplorableResult<T>,
) -> ExplorableResult<T> {
    let mut loaded: Vec<ChunkPos> = Vec::new();
    let mut result = Ok(());
    for chunk in chunks_covering(min, max, store.chunk_size()) {
        match ensure_chunk_loaded(store, chunk) {
            Ok(true) => loaded.push(chunk),
            Ok(false) => {}
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }

    let outcome = match result {
        Ok(()) => f(&mut *store),
        Err(e) => Err(e.into()),
    };

    for chunk in loaded {
        if let Err(e) = store.unload_chunk(chunk) {
            log::warn!("[Placer] Failed to unload {}: {}", chunk, e);
        }
    }

    outcome
}

/// Stamp a resolved layout for slot `id` at `origin`
///
/// Writes the barrier ring, then every non-negative palette entry. Exit
/// cells are tagged with `id` so the router treats them as portals.
pub fn stamp_layout(
    store: &mut dyn ChunkStore,
    id: ExplorableId,
    origin: CellPos,
    resolved: &ResolvedLayout,
) -> ExplorableResult<StampResult> {
    let footprint = Footprint::new(origin, resolved.width, resolved.height);

    with_region_loaded(store, footprint.min(), footprint.max(), |store| {
        let mut cells_written = 0;
        for pos in footprint.perimeter() {
            store.set_object(pos, CellObject::new(StructureId::barrier()))?;
            cells_written += 1;
        }

        let mut entrance = None;
        for (index, &palette_index) in resolved.layout.iter().enumerate() {
            if palette_index < 0 {
                continue;
            }
            let structure_id = resolved.palette[palette_index as usize].clone();
            let pos = layout_cell(origin, resolved.width, resolved.height, index);

            let object = if structure_id.is_exit() {
                entrance = Some(pos);
                CellObject::portal(structure_id, id)
            } else {
                CellObject::new(structure_id)
            };
            store.set_object(pos, object)?;
            cells_written += 1;
        }

        log::debug!(
            "[Placer] Stamped explorable {} at {}: {} cells",
            id,
            origin,
            cells_written
        );

        Ok(StampResult {
            footprint,
            entrance,
            cells_written,
        })
    })
}

/// Empty the fixed `clear_bound` square of a slot starting at `origin`
///
/// Returns the number of cells that held an object.
pub fn clear_region(
    store: &mut dyn ChunkStore,
    origin: CellPos,
    clear_bound: i32,
) -> ExplorableResult<usize> {
    let max = origin.offset(clear_bound - 1, clear_bound - 1);

    with_region_loaded(store, origin, max, |store| {
        let mut cleared = 0;
        for x in origin.x..=max.x {
            for y in origin.y..=max.y {
                if store.clear_cell(CellPos::new(x, y))?.is_some() {
                    cleared += 1;
                }
            }
        }
        Ok(cleared)
    })
}
