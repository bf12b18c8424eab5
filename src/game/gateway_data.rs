//! Explorables Gateway Data - Host Event Interface
//!
//! What the host feeds in (events), what the plugin hands back (commands
//! and notifications) and the gateway state tying them together.
//!
//! Pure DOP: No behaviour, just data structures.

use super::player_data::{Direction, PlayerData, TeleporterTier};
use crate::clock::Clock;
use crate::event_system_data::{EventBusData, EventKey};
use crate::explorable::{Blueprint, Explorable, ExplorableId, ExplorableRegistry};
use crate::world::{CellPos, ChunkStore, StructureId, WorldData};
use crate::ExplorablesConfig;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::sync::Arc;

/// Host event - things that happen on the server
///
/// Events are passed by mutable reference so handlers can write results
/// back (`cancel`, `vetoed`, the structure's explorable id, player state).
#[derive(Clone, Debug)]
pub enum HostEvent {
    /// A blueprint offered by another plugin
    BlueprintLoad {
        structure_id: Option<StructureId>,
        blueprint: Option<Blueprint>,
    },

    /// Structure placed in the world
    StructurePlaced { structure: PlacedStructure },

    /// Structure broken
    StructureBroke { structure: PlacedStructure },

    /// Player about to step; set `cancel` to suppress the host's move
    PlayerStep { player: PlayerData, cancel: bool },

    /// Teleporter item used; set `vetoed` to refuse it
    TeleporterUse {
        tier: TeleporterTier,
        direction: Direction,
        player: PlayerData,
        vetoed: bool,
    },

    /// Server start-up finished
    Ready,
}

impl HostEvent {
    pub fn key(&self) -> EventKey {
        match self {
            HostEvent::BlueprintLoad { .. } => EventKey::BlueprintLoad,
            HostEvent::StructurePlaced { structure } => {
                EventKey::StructurePlaced(structure.structure_id.clone())
            }
            HostEvent::StructureBroke { structure } => {
                EventKey::StructureBroke(structure.structure_id.clone())
            }
            HostEvent::PlayerStep { .. } => EventKey::PlayerStep,
            HostEvent::TeleporterUse {
                tier, direction, ..
            } => EventKey::TeleporterUse(*tier, *direction),
            HostEvent::Ready => EventKey::Ready,
        }
    }
}

/// A structure instance as the host reports it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedStructure {
    pub structure_id: StructureId,
    pub position: CellPos,
    /// Explorable this structure leads into
    pub explorable_id: Option<ExplorableId>,
}

impl PlacedStructure {
    pub fn new(structure_id: impl Into<StructureId>, position: CellPos) -> Self {
        Self {
            structure_id: structure_id.into(),
            position,
            explorable_id: None,
        }
    }
}

/// Host command - instructions from plugin to host
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostCommand {
    /// Stop a travelling player
    StopPlayerMovement { player_id: u32 },

    /// Register a structure kind
    AddStructureData(StructureRegistration),
}

/// Structure kind registration data
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructureRegistration {
    pub id: StructureId,
    /// Item that places it; plugin-owned kinds have none
    pub placing_item: Option<String>,
    pub glyph: String,
    pub walk_over: bool,
}

/// Outbound notifications for other plugins
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExplorableNotification {
    Entering {
        player_id: u32,
        explorable_id: ExplorableId,
        explorable: Explorable,
    },
    Exiting {
        player_id: u32,
        explorable_id: ExplorableId,
        explorable: Explorable,
    },
}

/// Gateway metrics for monitoring
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GatewayMetrics {
    /// Events dispatched through the table
    pub events_dispatched: u64,

    /// Handlers that returned an error
    pub handlers_failed: u64,

    pub explorables_created: u64,
    pub explorables_deleted: u64,

    /// Explorables regenerated on entry
    pub explorables_reset: u64,

    pub players_entered: u64,
    pub players_exited: u64,
    pub teleporters_vetoed: u64,
}

/// Result of dispatching one event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventResponse {
    pub handlers_run: usize,
    /// Host should skip its default handling
    pub cancelled: bool,
    /// Host should refuse the action
    pub vetoed: bool,
}

/// Explorables gateway - the plugin's whole state
pub struct ExplorablesGateway<W: ChunkStore = WorldData> {
    pub config: ExplorablesConfig,

    pub registry: ExplorableRegistry,

    /// Host world the explorables are stamped into
    pub world: W,

    pub clock: Box<dyn Clock + Send>,

    /// Registered blueprints by explorable type
    pub blueprints: FxHashMap<String, Blueprint>,

    /// Dispatch table
    pub bus: EventBusData,

    /// Commands for the host to execute
    pub pending_commands: VecDeque<HostCommand>,

    /// Notifications for other plugins
    pub notifications: VecDeque<ExplorableNotification>,

    pub metrics: GatewayMetrics,

    /// Ready event seen
    pub ready: bool,
}

/// Gateway shared between host threads
pub type SharedExplorables<W = WorldData> = Arc<parking_lot::Mutex<ExplorablesGateway<W>>>;
