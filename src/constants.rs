//! Constants shared across the explorables plugin
//!
//! Grouped by concern. Everything here is a default; the runtime values
//! live in `ExplorablesConfig`.

/// Placement grid constants
pub mod grid {
    /// Distance from the world origin to the explorable region
    pub const WORLD_EDGE: i32 = 5_000_000;

    /// World cells between neighbouring slot origins on each axis
    pub const SLOT_SPACING: i32 = 200;

    /// Slots per grid row (and number of rows)
    pub const GRID_WIDTH: u32 = 1000;

    /// Side of the square cleared when an explorable is deleted
    pub const CLEAR_BOUND: i32 = 100;
}

/// Host world constants
pub mod core {
    /// Side of a host chunk in cells
    pub const CHUNK_SIZE: i32 = 100;
}

/// Handler priorities on the dispatch table; higher runs first
pub mod dispatch {
    pub const DEFAULT_PRIORITY: i32 = 0;

    /// Vetoes must see an event before anything acts on it
    pub const VETO_PRIORITY: i32 = 10;
}

/// Structure kinds owned by this plugin
pub mod structures {
    pub const EXIT: &str = "exit";
    pub const BARRIER: &str = "barrier";

    pub const EXIT_GLYPH: &str = "X";
    pub const BARRIER_GLYPH: &str = "&nbsp";
}

/// Persistence constants
pub mod storage {
    /// Default key under which registry state is stored
    pub const DEFAULT_KEY: &str = "explorables";

    /// Registry format version written with every save
    pub const FORMAT_VERSION: u32 = 1;
}
