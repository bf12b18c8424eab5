//! Explorable Data - Pure DOP
//!
//! The registry's persisted state. NO behaviour beyond small accessors;
//! slot_operations and the registry transform it.

use crate::constants::storage::FORMAT_VERSION;
use crate::world::CellPos;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Slot identifier of a live explorable
///
/// Packed and reused: freed ids go back on the free list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExplorableId(pub u32);

impl ExplorableId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ExplorableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One generated explorable area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Explorable {
    /// Blueprint type it was generated from
    #[serde(rename = "type")]
    pub explorable_type: String,

    /// Slot coordinates on the placement grid
    #[serde(rename = "x")]
    pub grid_x: u32,
    #[serde(rename = "y")]
    pub grid_y: u32,

    /// Cell a player lands on when entering
    pub entrance_x: i32,
    pub entrance_y: i32,

    /// Cell a player returns to when leaving
    pub exit_to_x: i32,
    pub exit_to_y: i32,

    /// Players currently inside
    #[serde(default)]
    pub player_count: u32,

    /// Epoch milliseconds after which an empty explorable regenerates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<i64>,
}

impl Explorable {
    pub fn entrance(&self) -> CellPos {
        CellPos::new(self.entrance_x, self.entrance_y)
    }

    pub fn exit_to(&self) -> CellPos {
        CellPos::new(self.exit_to_x, self.exit_to_y)
    }

    pub fn is_occupied(&self) -> bool {
        self.player_count > 0
    }

    /// Whether the reset deadline has passed at `now_ms`
    pub fn reset_elapsed(&self, now_ms: i64) -> bool {
        self.reset_at.is_some_and(|at| at <= now_ms)
    }
}

/// Persisted registry snapshot
///
/// `explorables[id]` is `None` for vacant slots; `unused` is the free list,
/// popped from the back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorableStorage {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub explorables: Vec<Option<Explorable>>,

    #[serde(default)]
    pub unused: Vec<ExplorableId>,
}

fn default_version() -> u32 {
    FORMAT_VERSION
}

impl Default for ExplorableStorage {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            explorables: Vec::new(),
            unused: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_explorable_json_shape() {
        let explorable = Explorable {
            explorable_type: "cave".to_string(),
            grid_x: 3,
            grid_y: 1,
            entrance_x: 10,
            entrance_y: 20,
            exit_to_x: -4,
            exit_to_y: 9,
            player_count: 0,
            reset_at: None,
        };

        let value = serde_json::to_value(&explorable).expect("serialize");
        assert_eq!(
            value,
            json!({
                "type": "cave",
                "x": 3,
                "y": 1,
                "entranceX": 10,
                "entranceY": 20,
                "exitToX": -4,
                "exitToY": 9,
                "playerCount": 0
            })
        );
    }

    #[test]
    fn test_storage_tolerates_missing_fields() {
        // Older saves had no version or occupancy data
        let storage: ExplorableStorage = serde_json::from_value(json!({
            "explorables": [null, {
                "type": "cave", "x": 1, "y": 0,
                "entranceX": 0, "entranceY": 0, "exitToX": 0, "exitToY": 0
            }],
            "unused": [0]
        }))
        .expect("deserialize");

        assert_eq!(storage.version, FORMAT_VERSION);
        assert_eq!(storage.unused, vec![ExplorableId(0)]);
        let live = storage.explorables[1].as_ref().expect("slot 1 live");
        assert_eq!(live.player_count, 0);
        assert!(live.reset_at.is_none());
    }

    #[test]
    fn test_reset_elapsed() {
        let mut explorable: Explorable = serde_json::from_value(json!({
            "type": "cave", "x": 0, "y": 0,
            "entranceX": 0, "entranceY": 0, "exitToX": 0, "exitToY": 0
        }))
        .expect("deserialize");

        assert!(!explorable.reset_elapsed(1_000));
        explorable.reset_at = Some(1_000);
        assert!(explorable.reset_elapsed(1_000));
        assert!(!explorable.reset_elapsed(999));
    }
}
