//! Game Module - Host Interface
//!
//! The plugin's face towards the game server: host events in, host commands
//! and notifications out, with the teleport router in between.

pub mod gateway_data;
pub mod gateway_operations;
pub mod player_data;
pub mod teleport_operations;


pub use gateway_data::{
    EventResponse, ExplorableNotification, ExplorablesGateway, GatewayMetrics, HostCommand,
    HostEvent, PlacedStructure, SharedExplorables, StructureRegistration,
};

pub use gateway_operations::{
    create_gateway, create_shared_gateway, drain_commands, drain_notifications, get_metrics,
    handle_event, log_gateway_status, on_player_step, on_ready, on_structure_broke,
    on_structure_placed, on_teleporter_use, register_blueprint,
};

pub use player_data::{queue_sync, Direction, PlayerData, PlayerState, SyncProp, TeleporterTier};
pub use teleport_operations::{
    route_player_step, teleporter_allowed, RouterContext, TeleportOutcome, Transition,
};
