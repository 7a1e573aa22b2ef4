//! Turret formations - rectangles centred at the origin with turret slots
//! spaced evenly along the perimeter.
//!
//! Slots start at the top-centre and walk clockwise: right along the top
//! edge, down the right edge, left along the bottom, and up the left edge.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::formation::{MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH};
use crate::geometry::Vec2;

/// Rectangle the turrets are arranged around.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FormationArea {
    pub width: f32,
    pub height: f32,
}

impl Default for FormationArea {
    fn default() -> Self {
        Self {
            width: 4.0,
            height: 4.0,
        }
    }
}

impl FormationArea {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.abs(),
            height: height.abs(),
        }
    }

    /// Roll a new area: integer height in [3, 8), and a width that either
    /// matches it (square) or is an integer in [3, 14).
    pub fn random(rng: &mut impl Rng, square: bool) -> Self {
        let height = rng.gen_range(MIN_HEIGHT..MAX_HEIGHT) as f32;
        let width = if square {
            height
        } else {
            rng.gen_range(MIN_WIDTH..MAX_WIDTH) as f32
        };
        Self { width, height }
    }

    pub fn perimeter(&self) -> f32 {
        2.0 * (self.width + self.height)
    }

    pub fn top_centre(&self) -> Vec2 {
        Vec2::new(0.0, self.height * 0.5)
    }

    /// Arc length between neighbouring slots, `None` for zero turrets.
    pub fn slot_spacing(&self, count: usize) -> Option<f32> {
        if count == 0 {
            None
        } else {
            Some(self.perimeter() / count as f32)
        }
    }

    /// Walk `distance` clockwise along the perimeter from `from`, clamping at
    /// each corner and carrying the leftover onto the next edge.
    ///
    /// `from` must lie on the perimeter.
    pub fn advance_clockwise(&self, from: Vec2, distance: f32) -> Vec2 {
        let hw = self.width * 0.5;
        let hh = self.height * 0.5;
        let mut pos = from;
        let mut remaining = distance;

        if self.perimeter() <= 0.0 {
            return pos;
        }

        // Five edge visits cover a full lap from any starting edge
        for _ in 0..5 {
            if remaining <= 0.0 {
                break;
            }
            if pos.y == hh && pos.x < hw {
                let new_x = (pos.x + remaining).min(hw);
                remaining -= (new_x - pos.x).abs();
                pos.x = new_x;
            } else if pos.x == hw && pos.y > -hh {
                let new_y = (pos.y - remaining).max(-hh);
                remaining -= (new_y - pos.y).abs();
                pos.y = new_y;
            } else if pos.y == -hh && pos.x > -hw {
                let new_x = (pos.x - remaining).max(-hw);
                remaining -= (new_x - pos.x).abs();
                pos.x = new_x;
            } else if pos.x == -hw && pos.y < hh {
                let new_y = (pos.y + remaining).min(hh);
                remaining -= (new_y - pos.y).abs();
                pos.y = new_y;
            } else {
                break;
            }
        }
        pos
    }

    /// Clockwise arc length from the top-centre to a perimeter point.
    pub fn arc_position(&self, point: Vec2) -> f32 {
        let hw = self.width * 0.5;
        let hh = self.height * 0.5;
        let eps = 1e-4;

        if (point.y - hh).abs() < eps && point.x >= 0.0 {
            point.x
        } else if (point.x - hw).abs() < eps {
            hw + (hh - point.y)
        } else if (point.y + hh).abs() < eps {
            hw + self.height + (hw - point.x)
        } else if (point.x + hw).abs() < eps {
            hw + self.height + self.width + (point.y + hh)
        } else {
            // Top edge, left of centre
            self.perimeter() - hw + (point.x + hw)
        }
    }

    /// Slot positions for `count` turrets, first at the top-centre.
    pub fn slots(&self, count: usize) -> Vec<Vec2> {
        let Some(spacing) = self.slot_spacing(count) else {
            return Vec::new();
        };

        let mut slots = Vec::with_capacity(count);
        let mut current = self.top_centre();
        slots.push(current);
        for _ in 1..count {
            current = self.advance_clockwise(current, spacing);
            slots.push(current);
        }
        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn test_four_turrets_on_square() {
        let area = FormationArea::new(4.0, 4.0);
        let slots = area.slots(4);
        assert_eq!(slots.len(), 4);
        assert!(approx(slots[0], Vec2::new(0.0, 2.0)));
        assert!(approx(slots[1], Vec2::new(2.0, 0.0)));
        assert!(approx(slots[2], Vec2::new(0.0, -2.0)));
        assert!(approx(slots[3], Vec2::new(-2.0, 0.0)));
    }

    #[test]
    fn test_corner_carry_over() {
        // Spacing 5 on a 6x4 rectangle: 3 along the top, 2 down the right
        let area = FormationArea::new(6.0, 4.0);
        let p = area.advance_clockwise(area.top_centre(), 5.0);
        assert!(approx(p, Vec2::new(3.0, 0.0)));
    }

    #[test]
    fn test_walk_wraps_past_top_left_corner() {
        let area = FormationArea::new(4.0, 2.0);
        // Start on the left edge just below the top-left corner
        let p = area.advance_clockwise(Vec2::new(-2.0, 0.5), 1.5);
        assert!(approx(p, Vec2::new(-1.0, 1.0)));
    }

    #[test]
    fn test_single_turret() {
        let area = FormationArea::new(5.0, 3.0);
        assert_eq!(area.slots(1), vec![Vec2::new(0.0, 1.5)]);
    }

    #[test]
    fn test_zero_turrets() {
        let area = FormationArea::new(5.0, 3.0);
        assert!(area.slots(0).is_empty());
        assert_eq!(area.slot_spacing(0), None);
    }

    #[test]
    fn test_arc_positions_are_evenly_spaced() {
        let area = FormationArea::new(7.0, 3.0);
        let slots = area.slots(6);
        let spacing = area.perimeter() / 6.0;
        for (i, s) in slots.iter().enumerate() {
            assert!((area.arc_position(*s) - spacing * i as f32).abs() < 1e-3);
        }
    }

    #[test]
    fn test_random_area_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let area = FormationArea::random(&mut rng, false);
            assert!((3.0..8.0).contains(&area.height));
            assert!((3.0..14.0).contains(&area.width));
            assert_eq!(area.height.fract(), 0.0);

            let square = FormationArea::random(&mut rng, true);
            assert_eq!(square.width, square.height);
        }
    }
}
