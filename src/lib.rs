// Hearth Explorables - Data-Oriented Programming (DOP) Architecture
//
// Instanced explorable areas for a tile-based world server. Each explorable
// is stamped into its own slot of a grid far beyond the world edge; players
// step onto an entrance structure to be moved inside and onto the exit cell
// to be moved back.
//
// Data lives in *_data modules, behaviour in *_operations modules:
// - explorable::* for slots, placement and the durable registry
// - game::* for the host event gateway and the teleport router
// - world::* for the chunk storage seam the host implements

// Constants module
pub mod constants;

// Core modules
pub mod clock;
pub mod error;

// Essential systems
pub mod explorable;
pub mod game;
pub mod persistence;
pub mod world;

// Utilities
pub mod event_system_data;
pub mod event_system_operations;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ExplorableError, ExplorableResult, OptionExt};
pub use event_system_data::{EventBusData, EventKey, HandlerKind, Subscription};
pub use explorable::{
    Blueprint, Explorable, ExplorableId, ExplorableRegistry, ExplorableRepository, GeneratedLayout,
};
pub use game::{
    create_gateway, create_shared_gateway, handle_event, ExplorableNotification, ExplorablesGateway,
    HostCommand, HostEvent, PlacedStructure, PlayerData, SharedExplorables,
};
pub use persistence::{AtomicSaveData, MemoryStorage, PluginStorage};
// === Core World Types ===
pub use world::{CellObject, CellPos, ChunkPos, ChunkStore, StructureId, WorldData};

use constants::core::CHUNK_SIZE;
use constants::grid::{CLEAR_BOUND, GRID_WIDTH, SLOT_SPACING, WORLD_EDGE};
use constants::storage::DEFAULT_KEY;

/// Plugin configuration
///
/// Read from TOML; missing fields fall back to the defaults in `constants`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorablesConfig {
    /// Distance from the origin to the explorable region on each axis
    pub world_edge: i32,
    /// Cells between neighbouring slot origins
    pub slot_spacing: i32,
    /// Slots per grid row
    pub grid_width: u32,
    /// Side of the square cleared on delete
    pub clear_bound: i32,
    /// Host chunk side in cells
    pub chunk_size: i32,
    /// Plugin storage key for the registry
    pub storage_key: String,
}

impl ExplorablesConfig {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size <= 0 {
            return Err(anyhow::anyhow!(
                "ExplorablesConfig: chunk_size must be positive, got {}",
                self.chunk_size
            ));
        }

        if self.world_edge <= 0 {
            return Err(anyhow::anyhow!(
                "ExplorablesConfig: world_edge must be positive, got {}",
                self.world_edge
            ));
        }

        if self.grid_width == 0 {
            return Err(anyhow::anyhow!("ExplorablesConfig: grid_width cannot be 0"));
        }

        // Barrier ring plus at least one interior cell
        if self.clear_bound < 3 {
            return Err(anyhow::anyhow!(
                "ExplorablesConfig: clear_bound {} is too small (min 3)",
                self.clear_bound
            ));
        }

        if self.clear_bound > self.slot_spacing {
            return Err(anyhow::anyhow!(
                "ExplorablesConfig: clear_bound {} exceeds slot_spacing {}; neighbouring slots would overlap",
                self.clear_bound,
                self.slot_spacing
            ));
        }

        // The far corner of the grid must stay inside i32
        let span = i64::from(self.slot_spacing) * i64::from(self.grid_width);
        if i64::from(self.world_edge) + span > i64::from(i32::MAX) {
            return Err(anyhow::anyhow!(
                "ExplorablesConfig: grid of {} slots at spacing {} overflows past world_edge {}",
                self.grid_width,
                self.slot_spacing,
                self.world_edge
            ));
        }

        if self.storage_key.is_empty() {
            return Err(anyhow::anyhow!("ExplorablesConfig: storage_key cannot be empty"));
        }

        log::info!(
            "[ExplorablesConfig] Validation: edge={}, spacing={}, grid={}x{}, clear_bound={}, chunk_size={}",
            self.world_edge,
            self.slot_spacing,
            self.grid_width,
            self.grid_width,
            self.clear_bound,
            self.chunk_size
        );
        Ok(())
    }

    /// Maximum concurrently live explorables
    pub fn capacity(&self) -> u32 {
        self.grid_width.saturating_mul(self.grid_width)
    }
}

impl Default for ExplorablesConfig {
    fn default() -> Self {
        Self {
            world_edge: WORLD_EDGE,
            slot_spacing: SLOT_SPACING,
            grid_width: GRID_WIDTH,
            clear_bound: CLEAR_BOUND,
            chunk_size: CHUNK_SIZE,
            storage_key: DEFAULT_KEY.to_string(),
        }
    }
}

/// Parse and validate a TOML configuration
pub fn parse_config(source: &str) -> Result<ExplorablesConfig> {
    let config: ExplorablesConfig = toml::from_str(source)?;
    config.validate()?;
    Ok(config)
}

/// Load and validate a TOML configuration file
pub fn load_config(path: impl AsRef<Path>) -> Result<ExplorablesConfig> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    parse_config(&source)
}

/// Initialize env_logger for hosts that don't install their own logger
///
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExplorablesConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.capacity(), 1_000_000);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = parse_config("clear_bound = 50\nstorage_key = \"caves\"\n").expect("parse");
        assert_eq!(config.clear_bound, 50);
        assert_eq!(config.storage_key, "caves");
        assert_eq!(config.world_edge, WORLD_EDGE);
        assert_eq!(config.chunk_size, CHUNK_SIZE);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(parse_config("chunk_size = 0").is_err());
        assert!(parse_config("clear_bound = 300").is_err());
        assert!(parse_config("clear_bound = 2").is_err());
        assert!(parse_config("grid_width = 0").is_err());
        assert!(parse_config("world_edge = -1").is_err());
        assert!(parse_config("world_edge = 2147300000").is_err());
        assert!(parse_config("chunk_size = \"big\"").is_err());
    }

    #[test]
    fn test_grid_must_fit_past_world_edge() {
        // 200 * 1000 cells of grid past the edge must stay inside i32
        let largest = i32::MAX - SLOT_SPACING * GRID_WIDTH as i32;
        assert!(parse_config(&format!("world_edge = {}", largest)).is_ok());
        assert!(parse_config(&format!("world_edge = {}", largest + 1)).is_err());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().expect("Failed to create temporary file for test");
        writeln!(file, "grid_width = 10").expect("write");
        let config = load_config(file.path()).expect("load");
        assert_eq!(config.capacity(), 100);

        assert!(load_config(file.path().with_extension("missing")).is_err());
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
    }
}
