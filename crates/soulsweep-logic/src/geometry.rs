//! 2D geometry - vectors, degree rotations, and arena bounds.
//!
//! All angles are in degrees, counter-clockwise positive, with +y pointing up.

use serde::{Deserialize, Serialize};

/// 2D vector used for positions, offsets and velocities.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const UP: Self = Self { x: 0.0, y: 1.0 };
    pub const RIGHT: Self = Self { x: 1.0, y: 0.0 };
    pub const LEFT: Self = Self { x: -1.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector pointing at `degrees` from +x.
    pub fn from_angle(degrees: f32) -> Self {
        let r = degrees.to_radians();
        Self::new(r.cos(), r.sin())
    }

    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn distance(&self, other: &Self) -> f32 {
        (*self - *other).length()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self::ZERO
        }
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3D cross product.
    pub fn cross(&self, other: &Self) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Angle of this vector from +x, in degrees (-180, 180].
    pub fn angle(&self) -> f32 {
        self.y.atan2(self.x).to_degrees()
    }

    /// Rotate counter-clockwise around the origin.
    pub fn rotate(&self, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    /// Signed angle in degrees that rotates `self` onto `to`.
    pub fn signed_angle_to(&self, to: &Self) -> f32 {
        self.cross(to).atan2(self.dot(to)).to_degrees()
    }

    /// Scale down to `max` length if longer.
    pub fn clamp_length(&self, max: f32) -> Self {
        let len = self.length();
        if len > max && len > 0.0 {
            *self * (max / len)
        } else {
            *self
        }
    }

    /// Move toward `target` by at most `max_delta`, landing exactly on it.
    pub fn move_towards(&self, target: Self, max_delta: f32) -> Self {
        let diff = target - *self;
        let dist = diff.length();
        if dist <= max_delta || dist == 0.0 {
            target
        } else {
            *self + diff * (max_delta / dist)
        }
    }

    /// Linear interpolation with `t` clamped to [0, 1].
    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        a + (b - a) * t
    }

    /// Quadrant signs, treating zero as positive.
    pub fn quadrant(&self) -> (bool, bool) {
        (self.x >= 0.0, self.y >= 0.0)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

/// Scalar lerp with `t` clamped to [0, 1].
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Wrap an angle into (-180, 180].
pub fn wrap_degrees(degrees: f32) -> f32 {
    let mut d = degrees % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d <= -180.0 {
        d += 360.0;
    }
    d
}

/// The visible arena, centred at the origin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ArenaBounds {
    pub half_extents: Vec2,
}

impl ArenaBounds {
    pub fn new(half_width: f32, half_height: f32) -> Self {
        Self {
            half_extents: Vec2::new(half_width.abs(), half_height.abs()),
        }
    }

    /// Clamp a point so a body with `half_size` stays fully inside.
    pub fn clamp(&self, point: Vec2, half_size: Vec2) -> Vec2 {
        let max_x = (self.half_extents.x - half_size.x).max(0.0);
        let max_y = (self.half_extents.y - half_size.y).max(0.0);
        Vec2::new(point.x.clamp(-max_x, max_x), point.y.clamp(-max_y, max_y))
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x.abs() <= self.half_extents.x && point.y.abs() <= self.half_extents.y
    }

    /// Whether a point lies outside the arena grown by `margin`.
    pub fn is_outside(&self, point: Vec2, margin: f32) -> bool {
        point.x.abs() > self.half_extents.x + margin || point.y.abs() > self.half_extents.y + margin
    }
}

impl Default for ArenaBounds {
    fn default() -> Self {
        // 16:9 view with an orthographic half-height of 5
        Self::new(5.0 * 16.0 / 9.0, 5.0)
    }
}
