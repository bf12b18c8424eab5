//! Event System Data - Pure DOP
//!
//! The dispatch table: which handler runs for which host event, in what
//! order. Handlers are plain enum values so the table can be inspected and
//! cloned; event_system_operations edits it.

use crate::game::player_data::{Direction, TeleporterTier};
use crate::world::StructureId;
use rustc_hash::FxHashMap;

/// Host events the plugin can subscribe to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKey {
    /// Another plugin offers a blueprint
    BlueprintLoad,
    /// A structure of the given kind was placed
    StructurePlaced(StructureId),
    /// A structure of the given kind was broken
    StructureBroke(StructureId),
    /// A player is about to take a step
    PlayerStep,
    /// A teleporter item was used
    TeleporterUse(TeleporterTier, Direction),
    /// Host finished starting up
    Ready,
}

/// What to run when an event fires
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerKind {
    RegisterBlueprint,
    CreateExplorable { explorable_type: String },
    DeleteExplorable,
    RouteStep,
    VetoTeleporter,
    RegisterStructures,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub priority: i32,
    pub handler: HandlerKind,
}

/// Subscriptions per event, each list ordered highest priority first
#[derive(Debug, Clone, Default)]
pub struct EventBusData {
    pub subscriptions: FxHashMap<EventKey, Vec<Subscription>>,
}
