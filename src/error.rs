//! Error handling for Hearth Explorables
//!
//! One crate-level error type wrapping the world and persistence errors.
//! Handlers return these instead of failing silently; the gateway decides
//! what gets logged and what reaches the host.

use crate::explorable::ExplorableId;
use crate::persistence::PersistenceError;
use crate::world::WorldError;

/// Main error type for Hearth Explorables
#[derive(Debug, thiserror::Error)]
pub enum ExplorableError {
    #[error("World error: {0}")]
    World(#[from] WorldError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Explorable {id} not found")]
    ExplorableNotFound { id: ExplorableId },

    #[error("No blueprint registered for type '{explorable_type}'")]
    BlueprintNotFound { explorable_type: String },

    #[error("Invalid blueprint '{explorable_type}': {reason}")]
    InvalidBlueprint {
        explorable_type: String,
        reason: String,
    },

    #[error("Invalid registration: {0}")]
    InvalidRegistration(String),

    #[error("All {capacity} explorable slots are in use")]
    CapacityExceeded { capacity: u32 },

    #[error("Invalid config: {field} ({reason})")]
    InvalidConfig { field: String, reason: String },
}

/// Type alias for Results in Hearth Explorables
pub type ExplorableResult<T> = Result<T, ExplorableError>;

/// Convert Option to Result with context
pub trait OptionExt<T> {
    fn ok_or_explorable<F>(self, f: F) -> ExplorableResult<T>
    where
        F: FnOnce() -> ExplorableError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_explorable<F>(self, f: F) -> ExplorableResult<T>
    where
        F: FnOnce() -> ExplorableError,
    {
        self.ok_or_else(f)
    }
}
