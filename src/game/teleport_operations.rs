//! Teleport Operations - routing players through portal cells
//!
//! A step that ends on a portal moves the player instead: exit cells send
//! them back to where the explorable was spawned, any other portal sends
//! them to the explorable's entrance. Entering an empty explorable whose
//! reset deadline has passed regenerates it first.

use super::player_data::{queue_sync, PlayerData, SyncProp};
use crate::error::{ExplorableError, ExplorableResult};
use crate::explorable::{
    create_explorable, delete_explorable, Blueprint, Explorable, ExplorableId, ExplorableRegistry,
    ExplorableRepository,
};
use crate::world::{ensure_chunk_loaded, CellPos, ChunkStore};
use crate::ExplorablesConfig;
use rustc_hash::FxHashMap;

/// Everything the router touches for one step
pub struct RouterContext<'a> {
    pub registry: &'a mut ExplorableRegistry,
    pub store: &'a mut dyn ChunkStore,
    pub blueprints: &'a FxHashMap<String, Blueprint>,
    pub config: &'a ExplorablesConfig,
    pub now_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Player went in. `explorable` is the record before their arrival was counted.
    Entered {
        id: ExplorableId,
        explorable: Explorable,
        /// Stale explorable replaced on the way in
        reset_from: Option<ExplorableId>,
    },
    /// Player came out. `explorable` is the record after they left.
    Exited {
        id: ExplorableId,
        explorable: Explorable,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeleportOutcome {
    pub transition: Transition,
    pub target: CellPos,
}

/// Route one player step
///
/// Returns `Ok(None)` when the step is not onto a portal and the host should
/// handle it normally.
pub fn route_player_step(
    ctx: &mut RouterContext<'_>,
    player: &mut PlayerData,
) -> ExplorableResult<Option<TeleportOutcome>> {
    if player.travel_direction.is_none() {
        return Ok(None);
    }

    let pos = player.position;
    let Some(object) = ctx.store.get_object(pos) else {
        return Ok(None);
    };
    let Some(id) = object.explorable_id else {
        return Ok(None);
    };
    let is_exit = object.structure_id.is_exit();

    let (transition, target) = if is_exit {
        exit_explorable(ctx, player, id)?
    } else {
        enter_explorable(ctx, player, id, pos)?
    };

    let target_chunk = ctx.store.to_chunk_coords(target);
    ensure_chunk_loaded(&mut *ctx.store, target_chunk)?;
    player.position = target;
    queue_sync(player, &[SyncProp::X, SyncProp::Y]);

    log::debug!(
        "[Router] Player {} moved {} -> {}",
        player.player_id,
        pos,
        target
    );

    Ok(Some(TeleportOutcome { transition, target }))
}

fn exit_explorable(
    ctx: &mut RouterContext<'_>,
    player: &mut PlayerData,
    id: ExplorableId,
) -> ExplorableResult<(Transition, CellPos)> {
    let explorable = ctx
        .registry
        .update(id, |e| e.player_count = e.player_count.saturating_sub(1))?;
    player.explorable_id = None;

    let target = explorable.exit_to();
    Ok((Transition::Exited { id, explorable }, target))
}

fn enter_explorable(
    ctx: &mut RouterContext<'_>,
    player: &mut PlayerData,
    id: ExplorableId,
    portal: CellPos,
) -> ExplorableResult<(Transition, CellPos)> {
    let mut current = ctx
        .registry
        .get(id)
        .cloned()
        .ok_or(ExplorableError::ExplorableNotFound { id })?;

    let blueprints = ctx.blueprints;
    let blueprint = blueprints.get(&current.explorable_type);
    let reset_timer = blueprint.and_then(Blueprint::reset_timer_ms);

    let mut entered = id;
    let mut reset_from = None;

    if let (Some(blueprint), Some(timer)) = (blueprint, reset_timer) {
        if current.reset_at.is_none() {
            let deadline = ctx.now_ms.saturating_add(timer);
            current = ctx.registry.update(id, |e| e.reset_at = Some(deadline))?;
        }

        if current.player_count == 0 && current.reset_elapsed(ctx.now_ms) {
            entered = reset_explorable(ctx, blueprint, &current, id, portal)?;
            reset_from = Some(id);

            let deadline = ctx.now_ms.saturating_add(timer);
            ctx.registry.update(entered, |e| e.reset_at = Some(deadline))?;
        }
    }

    player.explorable_id = Some(entered);
    let explorable = ctx
        .registry
        .get(entered)
        .cloned()
        .ok_or(ExplorableError::ExplorableNotFound { id: entered })?;
    ctx.registry
        .update(entered, |e| e.player_count = e.player_count.saturating_add(1))?;

    let target = explorable.entrance();
    Ok((
        Transition::Entered {
            id: entered,
            explorable,
            reset_from,
        },
        target,
    ))
}

/// Replace stale explorable `stale_id` with a fresh one and repoint the portal
fn reset_explorable(
    ctx: &mut RouterContext<'_>,
    blueprint: &Blueprint,
    stale: &Explorable,
    stale_id: ExplorableId,
    portal: CellPos,
) -> ExplorableResult<ExplorableId> {
    let fresh_id = create_explorable(
        ctx.registry,
        &mut *ctx.store,
        blueprint,
        stale.exit_to(),
        ctx.config,
    )?;

    let portal_chunk = ctx.store.to_chunk_coords(portal);
    ensure_chunk_loaded(&mut *ctx.store, portal_chunk)?;
    if let Some(object) = ctx.store.get_object_mut(portal)? {
        object.explorable_id = Some(fresh_id);
    }

    delete_explorable(ctx.registry, &mut *ctx.store, stale_id, ctx.config)?;

    log::info!(
        "[Router] Reset explorable {} ('{}') as {}",
        stale_id,
        stale.explorable_type,
        fresh_id
    );
    Ok(fresh_id)
}

/// Whether a player may use a teleporter item
///
/// Teleporters are disabled inside explorables so the only way out is the
/// exit cell.
pub fn teleporter_allowed(player: &PlayerData) -> bool {
    !player.is_inside_explorable()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::player_data::{Direction, PlayerState};
    use crate::persistence::MemoryStorage;
    use crate::world::{objects_in_region, CellObject, StructureId, WorldData};
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::time::Duration;

    struct Fixture {
        registry: ExplorableRegistry,
        world: WorldData,
        blueprints: FxHashMap<String, Blueprint>,
        config: ExplorablesConfig,
        now_ms: i64,
    }

    impl Fixture {
        fn new(blueprint: Blueprint) -> Self {
            let config = ExplorablesConfig::default();
            let mut blueprints = FxHashMap::default();
            blueprints.insert(blueprint.explorable_type.clone(), blueprint);
            Self {
                registry: ExplorableRegistry::open(Box::new(MemoryStorage::new()), "explorables", 1000)
                    .expect("open"),
                world: WorldData::new(config.chunk_size),
                blueprints,
                config,
                now_ms: 0,
            }
        }

        /// Spawn an explorable behind an entrance structure at `at`
        fn place(&mut self, explorable_type: &str, at: CellPos) -> ExplorableId {
            let blueprint = self.blueprints[explorable_type].clone();
            let id = create_explorable(&mut self.registry, &mut self.world, &blueprint, at, &self.config)
                .expect("create");
            let chunk = self.world.to_chunk_coords(at);
            self.world.load_chunk(chunk).expect("load");
            self.world
                .set_object(at, CellObject::portal(StructureId::new("cave_mouth"), id))
                .expect("tag entrance");
            id
        }

        fn step(&mut self, player: &mut PlayerData, onto: CellPos) -> Option<TeleportOutcome> {
            player.position = onto;
            player.travel_direction = Some(Direction::North);
            let mut ctx = RouterContext {
                registry: &mut self.registry,
                store: &mut self.world,
                blueprints: &self.blueprints,
                config: &self.config,
                now_ms: self.now_ms,
            };
            route_player_step(&mut ctx, player).expect("route")
        }
    }

    fn cave() -> Blueprint {
        Blueprint::new(
            "cave",
            3,
            3,
            vec![-1, -1, -1, -1, 0, -1, -1, -1, -1],
            vec![StructureId::exit()],
        )
    }

    #[test]
    fn test_enter_then_exit_round_trip() {
        let mut fx = Fixture::new(cave());
        let mouth = CellPos::new(10, 20);
        let id = fx.place("cave", mouth);
        let mut player = PlayerData::new(1, "ana", CellPos::new(10, 19));

        let outcome = fx.step(&mut player, mouth).expect("entered");
        let entrance = fx.registry.get(id).expect("live").entrance();
        assert_eq!(outcome.target, entrance);
        assert_eq!(player.position, entrance);
        assert_eq!(player.explorable_id, Some(id));
        assert_eq!(fx.registry.get(id).map(|e| e.player_count), Some(1));
        assert_eq!(player.sync_queue, vec![SyncProp::X, SyncProp::Y]);

        // Standing on the exit cell and stepping again leaves
        let outcome = fx.step(&mut player, entrance).expect("exited");
        assert!(matches!(outcome.transition, Transition::Exited { .. }));
        assert_eq!(player.position, mouth);
        assert_eq!(player.explorable_id, None);
        assert_eq!(fx.registry.get(id).map(|e| e.player_count), Some(0));
    }

    #[test]
    fn test_no_direction_or_plain_cell_is_ignored() {
        let mut fx = Fixture::new(cave());
        let mouth = CellPos::new(0, 0);
        fx.place("cave", mouth);

        let mut player = PlayerData::new(1, "ana", mouth);
        let mut ctx = RouterContext {
            registry: &mut fx.registry,
            store: &mut fx.world,
            blueprints: &fx.blueprints,
            config: &fx.config,
            now_ms: 0,
        };
        assert!(route_player_step(&mut ctx, &mut player).expect("route").is_none());

        fx.world
            .set_object(CellPos::new(1, 0), CellObject::new(StructureId::new("tree")))
            .expect("set");
        assert!(fx.step(&mut player, CellPos::new(1, 0)).is_none());
        assert!(fx.step(&mut player, CellPos::new(2, 0)).is_none());
        assert_eq!(player.state, PlayerState::Idle);
    }

    #[test]
    fn test_exit_count_never_negative() {
        let mut fx = Fixture::new(cave());
        let id = fx.place("cave", CellPos::new(0, 0));
        let exit = fx.registry.get(id).expect("live").entrance();

        let mut player = PlayerData::new(1, "ana", exit);
        fx.step(&mut player, exit).expect("exit");
        fx.step(&mut player, exit).expect("exit again");
        assert_eq!(fx.registry.get(id).map(|e| e.player_count), Some(0));
    }

    #[test]
    fn test_random_traffic_keeps_counts_consistent() {
        let mut fx = Fixture::new(cave());
        let mouth = CellPos::new(5, 5);
        let id = fx.place("cave", mouth);
        let exit = fx.registry.get(id).expect("live").entrance();
        let mut players: Vec<PlayerData> = (0..6)
            .map(|n| PlayerData::new(n, format!("p{}", n), mouth.offset(0, -1)))
            .collect();
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..500 {
            let player = &mut players[rng.gen_range(0..6)];
            let onto = if player.explorable_id.is_some() { exit } else { mouth };
            fx.step(player, onto).expect("portal step");

            let inside = players.iter().filter(|p| p.explorable_id.is_some()).count() as u32;
            assert_eq!(fx.registry.get(id).map(|e| e.player_count), Some(inside));
        }
    }

    #[test]
    fn test_reset_on_entry_regenerates() {
        let mut fx = Fixture::new(cave().with_reset_timer(Duration::from_secs(60)));
        let mouth = CellPos::new(0, 0);
        let stale = fx.place("cave", mouth);
        let stale_origin = crate::explorable::slot_origin(stale, &fx.config);
        let mut player = PlayerData::new(1, "ana", mouth);

        // First entry arms the timer
        fx.now_ms = 1_000;
        fx.step(&mut player, mouth).expect("enter");
        assert_eq!(fx.registry.get(stale).and_then(|e| e.reset_at), Some(61_000));
        let exit = fx.registry.get(stale).expect("live").entrance();
        fx.step(&mut player, exit).expect("exit");

        // Past the deadline with nobody inside
        fx.now_ms = 61_000;
        let outcome = fx.step(&mut player, mouth).expect("enter after reset");
        let Transition::Entered { id: fresh, reset_from, explorable } = outcome.transition else {
            panic!("expected entry");
        };

        assert_ne!(fresh, stale);
        assert_eq!(reset_from, Some(stale));
        assert_eq!(explorable.player_count, 0);
        assert!(fx.registry.get(stale).is_none());
        assert!(objects_in_region(&fx.world, stale_origin, stale_origin.offset(99, 99)).is_empty());

        assert_eq!(player.explorable_id, Some(fresh));
        let record = fx.registry.get(fresh).expect("fresh live");
        assert_eq!(record.player_count, 1);
        assert_eq!(record.exit_to(), mouth);
        assert_eq!(record.reset_at, Some(121_000));
        assert_eq!(player.position, record.entrance());
        assert_eq!(fx.world.get_object(mouth).and_then(|o| o.explorable_id), Some(fresh));
    }

    #[test]
    fn test_occupied_explorable_is_not_reset() {
        let mut fx = Fixture::new(cave().with_reset_timer(Duration::from_secs(1)));
        let mouth = CellPos::new(0, 0);
        let id = fx.place("cave", mouth);
        let mut first = PlayerData::new(1, "ana", mouth);
        let mut second = PlayerData::new(2, "bo", mouth);

        fx.step(&mut first, mouth).expect("enter");
        fx.now_ms = 10_000;
        fx.step(&mut second, mouth).expect("enter");

        assert_eq!(second.explorable_id, Some(id));
        assert_eq!(fx.registry.get(id).map(|e| e.player_count), Some(2));
    }

    #[test]
    fn test_exit_target_survives_other_resets() {
        let mut fx = Fixture::new(cave().with_reset_timer(Duration::from_secs(1)));
        let a_mouth = CellPos::new(0, 0);
        let b_mouth = CellPos::new(50, 50);
        let a = fx.place("cave", a_mouth);
        let _b = fx.place("cave", b_mouth);

        let mut inside_a = PlayerData::new(1, "ana", a_mouth);
        fx.step(&mut inside_a, a_mouth).expect("enter a");

        let mut visitor = PlayerData::new(2, "bo", b_mouth);
        fx.step(&mut visitor, b_mouth).expect("enter b");
        let b_exit = fx.registry.get(visitor.explorable_id.expect("inside b")).expect("b").entrance();
        fx.step(&mut visitor, b_exit).expect("exit b");
        fx.now_ms = 5_000;
        fx.step(&mut visitor, b_mouth).expect("enter b after reset");

        let a_exit = fx.registry.get(a).expect("a").entrance();
        fx.step(&mut inside_a, a_exit).expect("exit a");
        assert_eq!(inside_a.position, a_mouth);
    }

    #[test]
    fn test_dangling_portal_is_an_error() {
        let mut fx = Fixture::new(cave());
        let pos = CellPos::new(3, 3);
        fx.world.load_chunk(fx.world.to_chunk_coords(pos)).expect("load");
        fx.world
            .set_object(pos, CellObject::portal(StructureId::new("cave_mouth"), ExplorableId(77)))
            .expect("set");

        let mut player = PlayerData::new(1, "ana", pos);
        player.travel_direction = Some(Direction::East);
        let mut ctx = RouterContext {
            registry: &mut fx.registry,
            store: &mut fx.world,
            blueprints: &fx.blueprints,
            config: &fx.config,
            now_ms: 0,
        };
        let err = route_player_step(&mut ctx, &mut player).expect_err("slot 77 is vacant");
        assert!(matches!(err, ExplorableError::ExplorableNotFound { .. }));
        assert_eq!(player.position, pos);
    }

    #[test]
    fn test_teleporter_allowed_only_outside() {
        let mut player = PlayerData::new(1, "ana", CellPos::new(0, 0));
        assert!(teleporter_allowed(&player));
        player.explorable_id = Some(ExplorableId(0));
        assert!(!teleporter_allowed(&player));
    }
}
