//! Projectile components.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use soulsweep_logic::geometry::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProjectileState {
    Flying,
    /// Pulled toward the nozzle tip at native speed.
    BeingCaptured,
    /// Sliding from the tip into the vacuum container.
    EnteringContainer { timer: f32 },
}

/// Why a projectile was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileFate {
    /// Left the arena.
    Expired,
    HitPlayer,
    Captured,
    /// Removed when the encounter ended.
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub velocity: Vec2,
    /// Native speed; redirection never exceeds it.
    pub speed: f32,
    pub damage: f32,
    pub destructible: bool,
    pub state: ProjectileState,
}

impl Projectile {
    pub fn new(direction: Vec2, speed: f32, damage: f32, destructible: bool) -> Self {
        Self {
            velocity: direction.normalize() * speed,
            speed,
            damage,
            destructible,
            state: ProjectileState::Flying,
        }
    }

    pub fn is_flying(&self) -> bool {
        self.state == ProjectileState::Flying
    }

    /// Steer toward `direction` with force `pull`.
    pub fn redirect(&mut self, direction: Vec2, pull: f32, delta: f32) {
        let difference = (direction * self.speed - self.velocity).normalize();
        self.velocity = (self.velocity + difference * pull * delta).clamp_length(self.speed);
    }
}

pub type OnDestroy = Arc<dyn Fn(ProjectileFate) + Send + Sync>;

/// Callback fired once when the projectile is removed.
#[derive(Clone)]
pub struct DestroyHook(pub OnDestroy);

impl DestroyHook {
    pub fn new(callback: impl Fn(ProjectileFate) + Send + Sync + 'static) -> Self {
        Self(Arc::new(callback))
    }
}

impl fmt::Debug for DestroyHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DestroyHook")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_never_exceeds_native_speed() {
        let mut projectile = Projectile::new(Vec2::LEFT, 2.0, 1.0, true);
        for _ in 0..200 {
            projectile.redirect(Vec2::UP, 10.0, 0.01);
            assert!(projectile.velocity.length() <= 2.0 + 1e-4);
        }
        // Eventually heading up
        assert!(projectile.velocity.y > 1.9);
    }

    #[test]
    fn test_redirect_toward_current_heading_is_stable() {
        let mut projectile = Projectile::new(Vec2::RIGHT, 3.0, 1.0, false);
        projectile.redirect(Vec2::RIGHT, 10.0, 0.1);
        assert_eq!(projectile.velocity, Vec2::new(3.0, 0.0));
    }
}
