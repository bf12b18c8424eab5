//! Lifecycle Operations - create and delete explorables
//!
//! Ties the slot allocator, the placer and the registry together. Cells are
//! always cleared before a slot returns to the free list.

use super::blueprint::{resolve_layout, Blueprint};
use super::explorable_data::{Explorable, ExplorableId};
use super::placement_operations::{clear_region, grid_origin, slot_origin, stamp_layout, StampResult};
use super::registry::{ExplorableRegistry, ExplorableRepository};
use super::slot_operations::grid_coords;
use crate::error::{ExplorableError, ExplorableResult};
use crate::world::{CellPos, ChunkStore};
use crate::ExplorablesConfig;

/// Generate a new explorable from `blueprint`
///
/// `exit_to` is where players return when they leave: the position of the
/// structure that spawned it. On failure the slot is released and whatever
/// was stamped is cleared again.
pub fn create_explorable(
    registry: &mut ExplorableRegistry,
    store: &mut dyn ChunkStore,
    blueprint: &Blueprint,
    exit_to: CellPos,
    config: &ExplorablesConfig,
) -> ExplorableResult<ExplorableId> {
    let id = registry.allocate()?;
    let origin = slot_origin(id, config);

    let entrance = match stamp_blueprint(store, blueprint, id, origin, config.clear_bound) {
        Ok(entrance) => entrance,
        Err(e) => {
            log::error!(
                "[Placer] Failed to stamp '{}' into slot {}: {}",
                blueprint.explorable_type,
                id,
                e
            );
            if let Err(clear_err) = clear_region(store, origin, config.clear_bound) {
                log::error!("[Placer] Slot {} left partially stamped: {}", id, clear_err);
            }
            registry.release(id)?;
            return Err(e);
        }
    };

    let (grid_x, grid_y) = grid_coords(id, config.grid_width);
    registry.put(
        id,
        Explorable {
            explorable_type: blueprint.explorable_type.clone(),
            grid_x,
            grid_y,
            entrance_x: entrance.x,
            entrance_y: entrance.y,
            exit_to_x: exit_to.x,
            exit_to_y: exit_to.y,
            player_count: 0,
            reset_at: None,
        },
    )?;

    log::info!(
        "[Registry] Created explorable {} ('{}') at grid ({}, {}), exit to {}",
        id,
        blueprint.explorable_type,
        grid_x,
        grid_y,
        exit_to
    );
    Ok(id)
}

/// Resolve and stamp the layout, returning the entrance cell
fn stamp_blueprint(
    store: &mut dyn ChunkStore,
    blueprint: &Blueprint,
    id: ExplorableId,
    origin: CellPos,
    clear_bound: i32,
) -> ExplorableResult<CellPos> {
    let resolved = resolve_layout(blueprint, origin, clear_bound)?;
    let stamp: StampResult = stamp_layout(store, id, origin, &resolved)?;
    stamp.entrance.ok_or_else(|| ExplorableError::InvalidBlueprint {
        explorable_type: blueprint.explorable_type.clone(),
        reason: "layout has no exit cell".to_string(),
    })
}

/// Delete explorable `id`, clearing its whole slot region
///
/// A vacant slot is a no-op and yields `Ok(None)`.
pub fn delete_explorable(
    registry: &mut ExplorableRegistry,
    store: &mut dyn ChunkStore,
    id: ExplorableId,
    config: &ExplorablesConfig,
) -> ExplorableResult<Option<Explorable>> {
    let Some(existing) = registry.get(id).cloned() else {
        log::debug!("[Registry] Delete of vacant slot {} ignored", id);
        return Ok(None);
    };

    let origin = grid_origin(existing.grid_x, existing.grid_y, config);
    let cleared = clear_region(store, origin, config.clear_bound)?;
    let removed = registry.delete(id)?;

    log::info!(
        "[Registry] Deleted explorable {} ('{}'), cleared {} cells",
        id,
        existing.explorable_type,
        cleared
    );
    Ok(removed)
}
