//! Vacuum charge, nozzle geometry and the suction cone test.
//!
//! The charge drains while suction is held and refills otherwise. Draining to
//! zero locks suction out until the charge has refilled to the integer floor
//! of its maximum.

use serde::{Deserialize, Serialize};

use crate::constants::vacuum::{
    BASE_DAMAGE, BASE_MAX_CHARGE, CONTAINER_DEPTH, DRAIN_RATE, MOUNT_OFFSET_Y, NOZZLE_LENGTH,
    REFILL_RATE,
};
use crate::geometry::{wrap_degrees, Vec2};

/// Maximum charge for a capacity multiplier, never below 1.
pub fn effective_max_charge(base: f32, capacity_multiplier: f32) -> f32 {
    (base * capacity_multiplier).max(1.0)
}

/// Damage of one suction tick, never below 1.
pub fn suction_damage(base: f32, power_multiplier: f32) -> f32 {
    (base * power_multiplier).max(1.0)
}

/// Player movement speed, clamped to `[min, max]`.
pub fn movement_speed(base: f32, speed_multiplier: f32, min: f32, max: f32) -> f32 {
    (base * speed_multiplier).clamp(min, max)
}

/// Player starting stamina, rounded up and never below 1.
pub fn starting_stamina(base: f32, stamina_multiplier: f32) -> f32 {
    (base * stamina_multiplier).ceil().max(1.0)
}

/// The vacuum's charge resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VacuumCharge {
    pub current: f32,
    pub maximum: f32,
    pub drain_rate: f32,
    pub refill_rate: f32,
    /// Set when the charge hits zero; suction stays locked until cleared.
    pub recharging_from_empty: bool,
}

impl Default for VacuumCharge {
    fn default() -> Self {
        Self::new(BASE_MAX_CHARGE, DRAIN_RATE, REFILL_RATE)
    }
}

impl VacuumCharge {
    /// A full charge.
    pub fn new(maximum: f32, drain_rate: f32, refill_rate: f32) -> Self {
        let maximum = maximum.max(1.0);
        Self {
            current: maximum,
            maximum,
            drain_rate,
            refill_rate,
            recharging_from_empty: false,
        }
    }

    /// Refill to a new maximum and clear the lockout.
    pub fn reset(&mut self, maximum: f32) {
        self.maximum = maximum.max(1.0);
        self.current = self.maximum;
        self.recharging_from_empty = false;
    }

    pub fn can_suction(&self) -> bool {
        self.current > 0.0 && !self.recharging_from_empty
    }

    /// Drain for one tick of suction. Returns true when this tick emptied it.
    pub fn drain(&mut self, delta: f32) -> bool {
        self.current = (self.current - delta * self.drain_rate).max(0.0);
        if self.current == 0.0 && !self.recharging_from_empty {
            self.recharging_from_empty = true;
            return true;
        }
        false
    }

    /// Refill for one idle tick. Returns true when this tick lifted the lockout.
    pub fn refill(&mut self, delta: f32) -> bool {
        self.current = (self.current + delta * self.refill_rate).min(self.maximum);
        if self.recharging_from_empty && self.current.floor() == self.maximum.floor() {
            self.recharging_from_empty = false;
            return true;
        }
        false
    }

    /// Add charge from a captured projectile, clamped to the maximum.
    pub fn add(&mut self, amount: f32) {
        self.current = (self.current + amount).clamp(0.0, self.maximum);
    }

    /// Fill fraction in [0, 1].
    pub fn fraction(&self) -> f32 {
        if self.maximum <= 0.0 {
            0.0
        } else {
            self.current / self.maximum
        }
    }
}

/// Where the hose attaches, where it ends, and where captured things go.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Nozzle {
    pub mount: Vec2,
    pub tip: Vec2,
    /// Unit direction from mount to tip.
    pub facing: Vec2,
    pub facing_left: bool,
}

impl Nozzle {
    /// Point the hose of a player at `player` toward `aim`.
    ///
    /// When the aim point sits on the mount, `previous` facing is kept.
    pub fn aimed(player: Vec2, aim: Vec2, previous: Vec2) -> Self {
        let mount = player + Vec2::new(0.0, MOUNT_OFFSET_Y);
        let mut facing = (aim - mount).normalize();
        if facing == Vec2::ZERO {
            facing = if previous == Vec2::ZERO {
                Vec2::RIGHT
            } else {
                previous.normalize()
            };
        }
        Self {
            mount,
            tip: mount + facing * NOZZLE_LENGTH,
            facing,
            facing_left: aim.x < player.x,
        }
    }

    /// Facing angle in degrees.
    pub fn angle(&self) -> f32 {
        self.facing.angle()
    }

    /// Point inside the vacuum body that captured things slide into.
    pub fn container(&self) -> Vec2 {
        self.tip - self.facing * CONTAINER_DEPTH
    }

    pub fn in_range(&self, target: Vec2, range: f32) -> bool {
        self.tip.distance(&target) <= range
    }

    /// Whether `target` lies inside the cone of full width `cone_degrees`.
    pub fn within_cone(&self, target: Vec2, cone_degrees: f32) -> bool {
        within_cone(self.mount, self.tip, target, cone_degrees)
    }
}

impl Default for Nozzle {
    fn default() -> Self {
        Self::aimed(Vec2::ZERO, Vec2::RIGHT * 10.0, Vec2::RIGHT)
    }
}

/// Cone test around the direction `base → tip`, opening at the tip.
///
/// Uses the wrapped angle difference so targets straddling ±180° count.
pub fn within_cone(base: Vec2, tip: Vec2, target: Vec2, cone_degrees: f32) -> bool {
    let facing = (tip - base).angle();
    let to_target = target - tip;
    if to_target == Vec2::ZERO {
        return true;
    }
    let diff = wrap_degrees(to_target.angle() - facing);
    diff.abs() < cone_degrees * 0.5
}

/// Final roll of a captured soul: a quarter turn toward the side it came
/// from, on top of the nozzle's own rotation.
pub fn capture_rotation(soul: Vec2, nozzle: &Nozzle) -> f32 {
    let rotation = nozzle.angle();
    let below_right = soul.y <= nozzle.tip.y && soul.x >= nozzle.tip.x;
    let above_left = soul.y >= nozzle.tip.y && soul.x <= nozzle.tip.x;
    if below_right || above_left {
        90.0 + rotation
    } else {
        -90.0 + rotation
    }
}

/// Default suction damage.
pub fn base_suction_damage(power_multiplier: f32) -> f32 {
    suction_damage(BASE_DAMAGE, power_multiplier)
}
