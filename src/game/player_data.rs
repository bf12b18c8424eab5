//! Player Data - Pure DOP
//!
//! The slice of host player state the router reads and writes.

use crate::explorable::ExplorableId;
use crate::world::CellPos;
use std::fmt;

/// Movement state as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Idle,
    /// Auto-travelling in `travel_direction`
    Travel,
}

/// Compass direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    pub const CARDINAL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::NorthEast => "northeast",
            Direction::East => "east",
            Direction::SouthEast => "southeast",
            Direction::South => "south",
            Direction::SouthWest => "southwest",
            Direction::West => "west",
            Direction::NorthWest => "northwest",
        };
        f.write_str(name)
    }
}

/// Teleporter item tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeleporterTier {
    High,
    Low,
}

impl TeleporterTier {
    pub const ALL: [TeleporterTier; 2] = [TeleporterTier::High, TeleporterTier::Low];
}

/// Player fields the host must resend after a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncProp {
    X,
    Y,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerData {
    pub player_id: u32,
    pub player_name: String,
    pub position: CellPos,
    pub state: PlayerState,
    /// Direction of the pending step; `None` when standing still
    pub travel_direction: Option<Direction>,
    /// Explorable the player is inside, if any
    pub explorable_id: Option<ExplorableId>,
    /// Fields queued for network sync
    pub sync_queue: Vec<SyncProp>,
}

impl PlayerData {
    pub fn new(player_id: u32, player_name: impl Into<String>, position: CellPos) -> Self {
        Self {
            player_id,
            player_name: player_name.into(),
            position,
            state: PlayerState::Idle,
            travel_direction: None,
            explorable_id: None,
            sync_queue: Vec::new(),
        }
    }

    pub fn is_inside_explorable(&self) -> bool {
        self.explorable_id.is_some()
    }
}

/// Queue fields for sync, skipping ones already queued
pub fn queue_sync(player: &mut PlayerData, props: &[SyncProp]) {
    for prop in props {
        if !player.sync_queue.contains(prop) {
            player.sync_queue.push(*prop);
        }
    }
}
