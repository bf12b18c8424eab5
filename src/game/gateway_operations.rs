//! Explorables Gateway Operations - Pure DOP Functions
//!
//! Functions that operate on ExplorablesGateway. The host hands every event
//! to `handle_event`; the dispatch table decides which handlers run.
//! Hosts that don't want the table can call the handlers directly.

use super::gateway_data::{
    EventResponse, ExplorableNotification, ExplorablesGateway, GatewayMetrics, HostCommand,
    HostEvent, PlacedStructure, SharedExplorables, StructureRegistration,
};
use super::player_data::{Direction, PlayerData, PlayerState, TeleporterTier};
use super::teleport_operations::{route_player_step, teleporter_allowed, RouterContext, Transition};
use crate::clock::Clock;
use crate::constants::dispatch::{DEFAULT_PRIORITY, VETO_PRIORITY};
use crate::constants::structures::{BARRIER_GLYPH, EXIT_GLYPH};
use crate::error::{ExplorableError, ExplorableResult, OptionExt};
use crate::event_system_data::{EventBusData, EventKey, HandlerKind};
use crate::event_system_operations::{subscribe, subscriptions_for};
use crate::explorable::blueprint::validate_blueprint;
use crate::explorable::{
    create_explorable, delete_explorable, execute_query, Blueprint, ExplorableQuery,
    ExplorableRegistry, ExplorableRepository,
};
use crate::persistence::PluginStorage;
use crate::world::{ensure_chunk_loaded, CellObject, ChunkStore, StructureId};
use crate::ExplorablesConfig;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::sync::Arc;

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Create a gateway with the base handlers subscribed
pub fn create_gateway<W: ChunkStore>(
    config: ExplorablesConfig,
    storage: Box<dyn PluginStorage + Send>,
    world: W,
    clock: Box<dyn Clock + Send>,
) -> ExplorableResult<ExplorablesGateway<W>> {
    config
        .validate()
        .map_err(|e| ExplorableError::InvalidConfig {
            field: "explorables".to_string(),
            reason: e.to_string(),
        })?;

    let registry = ExplorableRegistry::open(storage, config.storage_key.clone(), config.capacity())?;

    let mut bus = EventBusData::default();
    subscribe(&mut bus, EventKey::BlueprintLoad, DEFAULT_PRIORITY, HandlerKind::RegisterBlueprint);
    subscribe(&mut bus, EventKey::PlayerStep, DEFAULT_PRIORITY, HandlerKind::RouteStep);
    subscribe(&mut bus, EventKey::Ready, DEFAULT_PRIORITY, HandlerKind::RegisterStructures);
    for tier in TeleporterTier::ALL {
        for direction in Direction::CARDINAL {
            subscribe(
                &mut bus,
                EventKey::TeleporterUse(tier, direction),
                VETO_PRIORITY,
                HandlerKind::VetoTeleporter,
            );
        }
    }

    log::info!(
        "[Gateway] Initialized with {} live explorables",
        registry.live_count()
    );

    Ok(ExplorablesGateway {
        config,
        registry,
        world,
        clock,
        blueprints: FxHashMap::default(),
        bus,
        pending_commands: VecDeque::new(),
        notifications: VecDeque::new(),
        metrics: GatewayMetrics::default(),
        ready: false,
    })
}

/// Wrap a gateway for hosts that dispatch from several threads
pub fn create_shared_gateway<W: ChunkStore>(gateway: ExplorablesGateway<W>) -> SharedExplorables<W> {
    Arc::new(parking_lot::Mutex::new(gateway))
}

// ============================================================================
// DISPATCH
// ============================================================================

/// Run every handler subscribed to `event`, highest priority first
///
/// The first failing handler stops dispatch and its error is returned. A
/// veto also stops dispatch.
pub fn handle_event<W: ChunkStore>(
    gateway: &mut ExplorablesGateway<W>,
    event: &mut HostEvent,
) -> ExplorableResult<EventResponse> {
    let key = event.key();
    let subscriptions = subscriptions_for(&gateway.bus, &key);
    gateway.metrics.events_dispatched += 1;

    let mut response = EventResponse::default();
    for subscription in subscriptions {
        if let Err(e) = run_handler(gateway, &subscription.handler, event) {
            log::error!(
                "[Gateway] {:?} failed on {:?}: {}",
                subscription.handler,
                key,
                e
            );
            gateway.metrics.handlers_failed += 1;
            return Err(e);
        }
        response.handlers_run += 1;

        if let HostEvent::TeleporterUse { vetoed: true, .. } = event {
            break;
        }
    }

    match event {
        HostEvent::PlayerStep { cancel, .. } => response.cancelled = *cancel,
        HostEvent::TeleporterUse { vetoed, .. } => response.vetoed = *vetoed,
        _ => {}
    }
    Ok(response)
}

fn run_handler<W: ChunkStore>(
    gateway: &mut ExplorablesGateway<W>,
    handler: &HandlerKind,
    event: &mut HostEvent,
) -> ExplorableResult<()> {
    match (handler, event) {
        (HandlerKind::RegisterBlueprint, HostEvent::BlueprintLoad { structure_id, blueprint }) => {
            register_blueprint(gateway, structure_id.clone(), blueprint.clone())
        }
        (
            HandlerKind::CreateExplorable { explorable_type },
            HostEvent::StructurePlaced { structure },
        ) => on_structure_placed(gateway, explorable_type, structure),
        (HandlerKind::DeleteExplorable, HostEvent::StructureBroke { structure }) => {
            on_structure_broke(gateway, structure)
        }
        (HandlerKind::RouteStep, HostEvent::PlayerStep { player, cancel }) => {
            on_player_step(gateway, player, cancel)
        }
        (HandlerKind::VetoTeleporter, HostEvent::TeleporterUse { player, vetoed, .. }) => {
            on_teleporter_use(gateway, player, vetoed);
            Ok(())
        }
        (HandlerKind::RegisterStructures, HostEvent::Ready) => {
            on_ready(gateway);
            Ok(())
        }
        (handler, event) => {
            log::warn!("[Gateway] {:?} cannot handle {:?}", handler, event.key());
            Ok(())
        }
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Register `blueprint` and hook placing/breaking `structure_id` to it
pub fn register_blueprint<W: ChunkStore>(
    gateway: &mut ExplorablesGateway<W>,
    structure_id: Option<StructureId>,
    blueprint: Option<Blueprint>,
) -> ExplorableResult<()> {
    let (structure_id, blueprint) = match (structure_id, blueprint) {
        (Some(structure_id), Some(blueprint)) => (structure_id, blueprint),
        (structure_id, _) => {
            let missing = if structure_id.is_none() {
                "structure id"
            } else {
                "blueprint"
            };
            log::error!(
                "[Gateway] Blueprint registration aborted: no {} given",
                missing
            );
            return Err(ExplorableError::InvalidRegistration(format!(
                "missing {}",
                missing
            )));
        }
    };

    validate_blueprint(&blueprint, gateway.config.clear_bound)?;

    let explorable_type = blueprint.explorable_type.clone();
    if gateway
        .blueprints
        .insert(explorable_type.clone(), blueprint)
        .is_some()
    {
        log::warn!("[Gateway] Blueprint '{}' replaced", explorable_type);
    }

    subscribe(
        &mut gateway.bus,
        EventKey::StructurePlaced(structure_id.clone()),
        DEFAULT_PRIORITY,
        HandlerKind::CreateExplorable {
            explorable_type: explorable_type.clone(),
        },
    );
    subscribe(
        &mut gateway.bus,
        EventKey::StructureBroke(structure_id.clone()),
        DEFAULT_PRIORITY,
        HandlerKind::DeleteExplorable,
    );

    log::info!(
        "[Gateway] Registered blueprint '{}' for structure '{}'",
        explorable_type,
        structure_id
    );
    Ok(())
}

/// Spawn an explorable behind a freshly placed entrance structure
pub fn on_structure_placed<W: ChunkStore>(
    gateway: &mut ExplorablesGateway<W>,
    explorable_type: &str,
    structure: &mut PlacedStructure,
) -> ExplorableResult<()> {
    let blueprint = gateway
        .blueprints
        .get(explorable_type)
        .ok_or_explorable(|| ExplorableError::BlueprintNotFound {
            explorable_type: explorable_type.to_string(),
        })?
        .clone();

    let id = create_explorable(
        &mut gateway.registry,
        &mut gateway.world,
        &blueprint,
        structure.position,
        &gateway.config,
    )?;
    structure.explorable_id = Some(id);

    let chunk = gateway.world.to_chunk_coords(structure.position);
    ensure_chunk_loaded(&mut gateway.world, chunk)?;
    if let Some(object) = gateway.world.get_object_mut(structure.position)? {
        object.explorable_id = Some(id);
    } else {
        gateway.world.set_object(
            structure.position,
            CellObject::portal(structure.structure_id.clone(), id),
        )?;
    }

    gateway.metrics.explorables_created += 1;
    Ok(())
}

/// Delete the explorable behind a broken entrance structure
///
/// The world cell's tag wins over the id the host carried since placement:
/// a reset repoints the cell, so the host's copy may name a freed slot.
/// Structures that never got an explorable are ignored.
pub fn on_structure_broke<W: ChunkStore>(
    gateway: &mut ExplorablesGateway<W>,
    structure: &PlacedStructure,
) -> ExplorableResult<()> {
    let id = gateway
        .world
        .get_object(structure.position)
        .and_then(|object| object.explorable_id)
        .or(structure.explorable_id);
    let Some(id) = id else {
        log::warn!(
            "[Gateway] Broken '{}' at {} has no explorable",
            structure.structure_id,
            structure.position
        );
        return Ok(());
    };

    // A slot reused by another entrance is not ours to delete
    if let Some(existing) = gateway.registry.get(id) {
        if existing.exit_to() != structure.position {
            log::warn!(
                "[Gateway] Broken '{}' at {} points at explorable {} owned by {}",
                structure.structure_id,
                structure.position,
                id,
                existing.exit_to()
            );
            return Ok(());
        }
    }

    if delete_explorable(&mut gateway.registry, &mut gateway.world, id, &gateway.config)?.is_some() {
        gateway.metrics.explorables_deleted += 1;
    }
    Ok(())
}

/// Route a player step through the portal cells
pub fn on_player_step<W: ChunkStore>(
    gateway: &mut ExplorablesGateway<W>,
    player: &mut PlayerData,
    cancel: &mut bool,
) -> ExplorableResult<()> {
    let now_ms = gateway.clock.now_ms();
    let mut ctx = RouterContext {
        registry: &mut gateway.registry,
        store: &mut gateway.world,
        blueprints: &gateway.blueprints,
        config: &gateway.config,
        now_ms,
    };
    let Some(outcome) = route_player_step(&mut ctx, player)? else {
        return Ok(());
    };

    *cancel = true;
    if player.state == PlayerState::Travel {
        gateway.pending_commands.push_back(HostCommand::StopPlayerMovement {
            player_id: player.player_id,
        });
    }

    let notification = match outcome.transition {
        Transition::Entered {
            id,
            explorable,
            reset_from,
        } => {
            gateway.metrics.players_entered += 1;
            if reset_from.is_some() {
                gateway.metrics.explorables_reset += 1;
            }
            ExplorableNotification::Entering {
                player_id: player.player_id,
                explorable_id: id,
                explorable,
            }
        }
        Transition::Exited { id, explorable } => {
            gateway.metrics.players_exited += 1;
            ExplorableNotification::Exiting {
                player_id: player.player_id,
                explorable_id: id,
                explorable,
            }
        }
    };
    gateway.notifications.push_back(notification);
    Ok(())
}

/// Refuse teleporters inside explorables
pub fn on_teleporter_use<W: ChunkStore>(
    gateway: &mut ExplorablesGateway<W>,
    player: &PlayerData,
    vetoed: &mut bool,
) {
    if teleporter_allowed(player) {
        return;
    }
    *vetoed = true;
    gateway.metrics.teleporters_vetoed += 1;
    log::warn!(
        "[Gateway] Teleporter vetoed for player {} inside explorable {:?}",
        player.player_id,
        player.explorable_id
    );
}

/// Register the plugin's own structure kinds with the host
pub fn on_ready<W: ChunkStore>(gateway: &mut ExplorablesGateway<W>) {
    if gateway.ready {
        return;
    }
    gateway.ready = true;

    gateway
        .pending_commands
        .push_back(HostCommand::AddStructureData(StructureRegistration {
            id: StructureId::exit(),
            placing_item: None,
            glyph: EXIT_GLYPH.to_string(),
            walk_over: true,
        }));
    gateway
        .pending_commands
        .push_back(HostCommand::AddStructureData(StructureRegistration {
            id: StructureId::barrier(),
            placing_item: None,
            glyph: BARRIER_GLYPH.to_string(),
            walk_over: false,
        }));

    log::info!("[Gateway] Registered exit and barrier structures");
}

// ============================================================================
// OUTPUT QUEUES & METRICS
// ============================================================================

/// Get and clear all pending host commands
pub fn drain_commands<W: ChunkStore>(gateway: &mut ExplorablesGateway<W>) -> Vec<HostCommand> {
    gateway.pending_commands.drain(..).collect()
}

/// Get and clear all pending notifications
pub fn drain_notifications<W: ChunkStore>(
    gateway: &mut ExplorablesGateway<W>,
) -> Vec<ExplorableNotification> {
    gateway.notifications.drain(..).collect()
}

pub fn get_metrics<W: ChunkStore>(gateway: &ExplorablesGateway<W>) -> GatewayMetrics {
    gateway.metrics
}

/// Log gateway status
pub fn log_gateway_status<W: ChunkStore>(gateway: &ExplorablesGateway<W>) {
    let metrics = &gateway.metrics;
    let reset_due = ExplorableQuery::new()
        .empty()
        .reset_due(gateway.clock.now_ms())
        .build();
    let due = execute_query(gateway.registry.data(), reset_due.as_ref());

    log::info!("[Gateway] Status:");
    log::info!("  Live explorables: {}", gateway.registry.live_count());
    log::info!("  Awaiting reset: {}", due.ids.len());
    log::info!("  Free slots: {}", gateway.registry.free_slots().len());
    log::info!("  Blueprints: {}", gateway.blueprints.len());
    log::info!("  Events dispatched: {}", metrics.events_dispatched);
    log::info!("  Handlers failed: {}", metrics.handlers_failed);
    log::info!(
        "  Created/deleted/reset: {}/{}/{}",
        metrics.explorables_created,
        metrics.explorables_deleted,
        metrics.explorables_reset
    );
    log::info!(
        "  Entered/exited: {}/{}",
        metrics.players_entered,
        metrics.players_exited
    );
    log::info!("  Teleporters vetoed: {}", metrics.teleporters_vetoed);
}
