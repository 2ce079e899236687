//! Presentation helpers that still belong to the model: how tall a task is
//! drawn and which colour an assignee gets.

pub const BASE_HEIGHT: f64 = 12.0;
pub const HEIGHT_PER_POINT: f64 = 8.0;

/// Colour used when a task has no assignee.
pub const UNASSIGNED_COLOR: &str = "slate";

pub const ASSIGNEE_COLORS: [&str; 8] = [
    "blue", "emerald", "violet", "rose", "amber", "cyan", "fuchsia", "lime",
];

/// Height in pixels a task card is drawn at, linear in its points.
pub fn visual_height(points: f64) -> f64 {
    BASE_HEIGHT + points.max(0.0) * HEIGHT_PER_POINT
}

/// Stable colour for an assignee name.
pub fn assignee_color(name: &str) -> &'static str {
    if name.is_empty() {
        return UNASSIGNED_COLOR;
    }
    let hash = name
        .encode_utf16()
        .fold(0i32, |h, unit| i32::from(unit).wrapping_add(h.wrapping_shl(5).wrapping_sub(h)));
    ASSIGNEE_COLORS[hash.unsigned_abs() as usize % ASSIGNEE_COLORS.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_height() {
        assert_eq!(visual_height(0.0), 12.0);
        assert_eq!(visual_height(0.5), 16.0);
        assert_eq!(visual_height(5.0), 52.0);
    }

    #[test]
    fn test_assignee_color_is_stable_and_in_palette() {
        for name in ["Alice", "Bob", "Charlie", "Zoë", "a very long assignee name"] {
            let color = assignee_color(name);
            assert!(ASSIGNEE_COLORS.contains(&color));
            assert_eq!(color, assignee_color(name));
        }
    }

    #[test]
    fn test_unassigned_color() {
        assert_eq!(assignee_color(""), UNASSIGNED_COLOR);
    }

    #[test]
    fn test_single_letter_hash() {
        // 'A' is 65, 65 % 8 == 1
        assert_eq!(assignee_color("A"), "emerald");
    }
}
