use crate::constants::structures;
use crate::explorable::ExplorableId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Host structure kind identifier ("exit", "barrier", "wall", ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructureId(pub String);

impl StructureId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn exit() -> Self {
        Self(structures::EXIT.to_string())
    }

    pub fn barrier() -> Self {
        Self(structures::BARRIER.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_exit(&self) -> bool {
        self.0 == structures::EXIT
    }

    pub fn is_barrier(&self) -> bool {
        self.0 == structures::BARRIER
    }
}

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StructureId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Object occupying a world cell
///
/// Cells tagged with an `explorable_id` are portals: an exit when the
/// structure is `exit`, an entrance otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellObject {
    pub structure_id: StructureId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explorable_id: Option<ExplorableId>,
}

impl CellObject {
    pub fn new(structure_id: StructureId) -> Self {
        Self {
            structure_id,
            explorable_id: None,
        }
    }

    pub fn portal(structure_id: StructureId, explorable_id: ExplorableId) -> Self {
        Self {
            structure_id,
            explorable_id: Some(explorable_id),
        }
    }
}
