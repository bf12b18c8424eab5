//! Blueprints
//!
//! A blueprint describes what gets stamped for one explorable type: a
//! width×height grid of palette indices plus the palette itself. Negative
//! indices leave the cell empty. Blueprints may carry a generator that
//! produces a fresh layout per instance from its world origin.

use crate::error::{ExplorableError, ExplorableResult};
use crate::world::{CellPos, StructureId};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Procedural layout produced by a blueprint generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLayout {
    pub width: u32,
    pub height: u32,
    pub layout: Vec<i32>,
}

/// Generator invoked with the world origin of the slot being stamped
pub type LayoutGenerator = Arc<dyn Fn(CellPos) -> GeneratedLayout + Send + Sync>;

#[derive(Clone)]
pub struct Blueprint {
    pub explorable_type: String,
    pub width: u32,
    pub height: u32,
    /// Row-major palette indices, top row first
    pub layout: Vec<i32>,
    pub palette: Vec<StructureId>,
    /// Time after first entry at which an empty instance regenerates
    pub reset_timer: Option<Duration>,
    pub generate: Option<LayoutGenerator>,
}

/// Layout ready to stamp: dimensions and indices already checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLayout {
    pub width: u32,
    pub height: u32,
    pub layout: Vec<i32>,
    pub palette: Vec<StructureId>,
}

impl Blueprint {
    pub fn new(
        explorable_type: impl Into<String>,
        width: u32,
        height: u32,
        layout: Vec<i32>,
        palette: Vec<StructureId>,
    ) -> Self {
        Self {
            explorable_type: explorable_type.into(),
            width,
            height,
            layout,
            palette,
            reset_timer: None,
            generate: None,
        }
    }

    pub fn with_reset_timer(mut self, timer: Duration) -> Self {
        self.reset_timer = Some(timer);
        self
    }

    pub fn with_generator<F>(mut self, generator: F) -> Self
    where
        F: Fn(CellPos) -> GeneratedLayout + Send + Sync + 'static,
    {
        self.generate = Some(Arc::new(generator));
        self
    }

    /// Reset interval in milliseconds, if any
    pub fn reset_timer_ms(&self) -> Option<i64> {
        self.reset_timer
            .map(|timer| i64::try_from(timer.as_millis()).unwrap_or(i64::MAX))
    }
}

impl fmt::Debug for Blueprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blueprint")
            .field("explorable_type", &self.explorable_type)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("layout", &self.layout)
            .field("palette", &self.palette)
            .field("reset_timer", &self.reset_timer)
            .field("generate", &self.generate.as_ref().map(|_| "<LayoutGenerator>"))
            .finish()
    }
}

/// Produce the layout to stamp at `origin`
///
/// Runs the generator if the blueprint has one, then validates the result
/// against the palette and the largest footprint a slot can clear.
pub fn resolve_layout(
    blueprint: &Blueprint,
    origin: CellPos,
    clear_bound: i32,
) -> ExplorableResult<ResolvedLayout> {
    let (width, height, layout) = match &blueprint.generate {
        Some(generate) => {
            let generated = generate(origin);
            (generated.width, generated.height, generated.layout)
        }
        None => (blueprint.width, blueprint.height, blueprint.layout.clone()),
    };

    let resolved = ResolvedLayout {
        width,
        height,
        layout,
        palette: blueprint.palette.clone(),
    };
    validate_layout(&blueprint.explorable_type, &resolved, clear_bound)?;
    Ok(resolved)
}

/// Check a static blueprint at registration time
///
/// Generated layouts are checked again each time they are produced.
pub fn validate_blueprint(blueprint: &Blueprint, clear_bound: i32) -> ExplorableResult<()> {
    if blueprint.explorable_type.is_empty() {
        return Err(ExplorableError::InvalidRegistration(
            "blueprint type must not be empty".to_string(),
        ));
    }
    if blueprint.generate.is_some() {
        return Ok(());
    }
    validate_layout(
        &blueprint.explorable_type,
        &ResolvedLayout {
            width: blueprint.width,
            height: blueprint.height,
            layout: blueprint.layout.clone(),
            palette: blueprint.palette.clone(),
        },
        clear_bound,
    )
}

fn validate_layout(
    explorable_type: &str,
    resolved: &ResolvedLayout,
    clear_bound: i32,
) -> ExplorableResult<()> {
    let invalid = |reason: String| ExplorableError::InvalidBlueprint {
        explorable_type: explorable_type.to_string(),
        reason,
    };

    if resolved.width == 0 || resolved.height == 0 {
        return Err(invalid(format!(
            "dimensions {}x{} must be non-zero",
            resolved.width, resolved.height
        )));
    }

    // Barrier ring adds one cell on each side
    let max_interior = (clear_bound - 2).max(0) as u32;
    if resolved.width > max_interior || resolved.height > max_interior {
        return Err(invalid(format!(
            "dimensions {}x{} exceed the {}x{} slot footprint",
            resolved.width, resolved.height, max_interior, max_interior
        )));
    }

    let expected = (resolved.width * resolved.height) as usize;
    if resolved.layout.len() != expected {
        return Err(invalid(format!(
            "layout has {} cells, expected {}",
            resolved.layout.len(),
            expected
        )));
    }

    if let Some(index) = resolved
        .layout
        .iter()
        .copied()
        .find(|&index| index >= 0 && index as usize >= resolved.palette.len())
    {
        return Err(invalid(format!(
            "palette index {} out of range (palette has {} entries)",
            index,
            resolved.palette.len()
        )));
    }

    Ok(())
}
