//! Display Operations - region hooks for the host
//!
//! The host asks these when it formats a player's coordinates and when its
//! terrain generator draws ground near the world edge. Positions inside the
//! explorable region must not leak their real coordinates.

use crate::world::CellPos;
use crate::ExplorablesConfig;

/// Text shown for a player's position
///
/// Inside the explorable region this is `"- -"`; elsewhere it is
/// `"x, y"` with a `+` in front of positive values.
pub fn format_coordinates(pos: CellPos, config: &ExplorablesConfig) -> String {
    if is_in_explorable_region(pos, config) {
        return "- -".to_string();
    }
    format!("{}, {}", signed(pos.x), signed(pos.y))
}

fn signed(value: i32) -> String {
    if value > 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

/// Whether a position lies in the band reserved for explorables
pub fn is_in_explorable_region(pos: CellPos, config: &ExplorablesConfig) -> bool {
    pos.y >= config.world_edge
}

/// Whether the generator should draw blank ground on row `y`
///
/// True on and past the world edge, where explorables are stamped onto
/// otherwise empty terrain.
pub fn is_void_row(y: i32, config: &ExplorablesConfig) -> bool {
    config.world_edge - y.saturating_abs() < 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_regular_coordinates() {
        let config = ExplorablesConfig::default();
        assert_eq!(format_coordinates(CellPos::new(12, -3), &config), "+12, -3");
        assert_eq!(format_coordinates(CellPos::new(0, 0), &config), "0, 0");
        assert_eq!(format_coordinates(CellPos::new(-7, 4_999_999), &config), "-7, +4999999");
    }

    #[test]
    fn test_format_hides_explorable_region() {
        let config = ExplorablesConfig::default();
        assert_eq!(format_coordinates(CellPos::new(-5_000_000, 5_000_000), &config), "- -");
        assert_eq!(format_coordinates(CellPos::new(3, 5_100_000), &config), "- -");
    }

    #[test]
    fn test_void_rows() {
        let config = ExplorablesConfig::default();
        assert!(!is_void_row(4_999_999, &config));
        assert!(is_void_row(5_000_000, &config));
        assert!(is_void_row(-5_000_000, &config));
        assert!(is_void_row(5_150_000, &config));
        assert!(!is_void_row(0, &config));
    }
}
