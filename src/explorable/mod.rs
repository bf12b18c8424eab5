/// Explorable Instance System
///
/// Pocket areas stamped far past the world edge, one per slot of a packed
/// 1000x1000 grid. Purely data-oriented: the registry holds a table of
/// records, the *_operations modules transform it and the world.

// Data structures
pub mod blueprint;
pub mod explorable_data;
// Pure functions
pub mod display_operations;
pub mod lifecycle_operations;
pub mod placement_operations;
pub mod slot_operations;

pub mod query;
pub mod registry;

// Re-export data structures
pub use blueprint::{Blueprint, GeneratedLayout, LayoutGenerator, ResolvedLayout};
pub use explorable_data::{Explorable, ExplorableId, ExplorableStorage};
// Re-export operations
pub use display_operations::{format_coordinates, is_in_explorable_region, is_void_row};
pub use lifecycle_operations::{create_explorable, delete_explorable};
pub use placement_operations::{grid_origin, slot_origin, Footprint, StampResult};
pub use slot_operations::{allocate_slot, free_slot, grid_coords};

pub use query::{execute_query, ExplorableQuery, QueryFilter, QueryResult};
pub use registry::{ExplorableRegistry, ExplorableRepository};
