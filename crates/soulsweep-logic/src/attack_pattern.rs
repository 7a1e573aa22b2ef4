//! Turret attack patterns - spawn-point geometry and projectile kinds.
//!
//! An [`AttackPattern`] is authored data. A turret derives from it the set
//! of projectile offsets fired by one attack, and which of those projectiles
//! can be vacuumed up by the player.

use serde::{Deserialize, Serialize};

use crate::constants::turret::MUZZLE_OFFSET_X;
use crate::geometry::Vec2;

/// Base aim offset of every turret, before any rotation.
pub const MUZZLE_OFFSET: Vec2 = Vec2::new(MUZZLE_OFFSET_X, 0.0);

/// One authored attack of a turret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackPattern {
    /// Seconds between attacks within a burst.
    pub time_between_attacks: f32,
    /// Seconds between the last attack of a burst and the next burst.
    pub time_between_bursts: f32,
    pub attacks_per_burst: u32,
    /// Re-aim at the player at the start of every burst.
    pub track_player: bool,
    /// Degrees the spawn set turns after each burst when not tracking.
    pub attack_rotation: f32,
    pub attack_groups: u32,
    /// Degrees between consecutive groups.
    pub group_interval: f32,
    pub projectiles_per_group: u32,
    /// Half-width in degrees of the fan within one group.
    pub group_range: f32,
    /// Normal projectiles between destructible runs.
    pub destructible_spacing: u32,
    /// Length of each destructible run; 0 disables destructibles.
    pub destructible_group_size: u32,
    pub reset_between_groups: bool,
    pub start_with_destructible: bool,
    pub projectile_speed: f32,
    pub damage: f32,
    /// Bursts fired before the turret moves on to its next pattern.
    pub attacks_before_change: u32,
}

impl Default for AttackPattern {
    fn default() -> Self {
        Self {
            time_between_attacks: 0.05,
            time_between_bursts: 0.5,
            attacks_per_burst: 6,
            track_player: true,
            attack_rotation: 0.0,
            attack_groups: 1,
            group_interval: 0.0,
            projectiles_per_group: 1,
            group_range: 0.0,
            destructible_spacing: 0,
            destructible_group_size: 0,
            reset_between_groups: true,
            start_with_destructible: false,
            projectile_speed: 2.0,
            damage: 1.0,
            attacks_before_change: 1,
        }
    }
}

/// Whether a projectile can be vacuumed up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    Normal,
    Destructible,
}

impl ProjectileKind {
    pub fn is_destructible(self) -> bool {
        self == Self::Destructible
    }
}

impl AttackPattern {
    /// Total projectiles fired by one attack.
    pub fn projectile_count(&self) -> usize {
        self.attack_groups as usize * self.projectiles_per_group as usize
    }

    /// A pattern that can never fire anything.
    pub fn is_empty(&self) -> bool {
        self.projectile_count() == 0 || self.attacks_per_burst == 0
    }

    /// Angular spacing between projectiles of one group, in degrees.
    pub fn spacing(&self) -> f32 {
        if self.projectiles_per_group <= 1 {
            0.0
        } else {
            2.0 * self.group_range / (self.projectiles_per_group - 1) as f32
        }
    }

    /// Bursts before changing pattern, never less than one.
    pub fn bursts_before_change(&self) -> u32 {
        self.attacks_before_change.max(1)
    }

    /// Spawn offsets of one attack aimed along `aim`.
    ///
    /// Group `i` is `aim` rotated by `group_interval * i`; projectile `j` of a
    /// group is the group midpoint rotated by `group_range - spacing * j`.
    pub fn spawn_points(&self, aim: Vec2) -> Vec<Vec2> {
        let mut points = Vec::with_capacity(self.projectile_count());
        if self.projectiles_per_group == 0 {
            return points;
        }

        let spacing = self.spacing();
        for i in 0..self.attack_groups {
            let midpoint = aim.rotate(self.group_interval * i as f32);
            if self.projectiles_per_group == 1 {
                points.push(midpoint);
            } else {
                for j in 0..self.projectiles_per_group {
                    points.push(midpoint.rotate(self.group_range - spacing * j as f32));
                }
            }
        }
        points
    }

    /// Kind of every projectile of one attack, in spawn order.
    pub fn projectile_kinds(&self) -> Vec<ProjectileKind> {
        let count = self.projectile_count();
        let mut kinds = vec![ProjectileKind::Normal; count];
        if self.destructible_group_size == 0 {
            return kinds;
        }

        let mut normal = if self.start_with_destructible {
            self.destructible_spacing
        } else {
            0
        };
        let mut destructible = 0;

        for (i, kind) in kinds.iter_mut().enumerate() {
            if normal < self.destructible_spacing {
                normal += 1;
            } else {
                *kind = ProjectileKind::Destructible;
                destructible += 1;
                if destructible == self.destructible_group_size {
                    destructible = 0;
                    normal = 0;
                }
            }

            let end_of_group = (i + 1) % self.projectiles_per_group as usize == 0;
            if end_of_group && self.reset_between_groups {
                destructible = 0;
                normal = 0;
            }
        }
        kinds
    }
}

/// Muzzle offset rotated to point from `turret` toward `target`.
///
/// Falls back to the unrotated offset when both positions coincide.
pub fn aim_towards(turret: Vec2, target: Vec2) -> Vec2 {
    let direction = (target - turret).normalize();
    if direction == Vec2::ZERO {
        return MUZZLE_OFFSET;
    }
    MUZZLE_OFFSET.rotate(MUZZLE_OFFSET.signed_angle_to(&direction))
}
