//! Common components used across multiple entity types.

use serde::{Deserialize, Serialize};
use soulsweep_logic::geometry::Vec2;

/// World-space position of an entity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position(pub Vec2);

/// Sprite opacity in [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Opacity(pub f32);

impl Default for Opacity {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Uniform scale factor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Scale(pub f32);

impl Default for Scale {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Rotation in degrees, counter-clockwise.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Rotation(pub f32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FadePhase {
    Out,
    In,
}

/// Fade out in place, jump to `destination`, fade back in.
///
/// Both halves last `duration` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FadeTeleport {
    pub destination: Vec2,
    pub phase: FadePhase,
    pub timer: f32,
    pub duration: f32,
}

impl FadeTeleport {
    pub fn new(destination: Vec2, duration: f32) -> Self {
        Self {
            destination,
            phase: FadePhase::Out,
            timer: 0.0,
            duration,
        }
    }

    /// Advance the fade. Returns true once the entity is fully visible at
    /// its destination.
    pub fn advance(&mut self, delta: f32, position: &mut Vec2, opacity: &mut f32) -> bool {
        self.timer += delta;
        let progress = if self.duration > 0.0 {
            (self.timer / self.duration).min(1.0)
        } else {
            1.0
        };

        match self.phase {
            FadePhase::Out => {
                *opacity = 1.0 - progress;
                if progress >= 1.0 {
                    *position = self.destination;
                    self.phase = FadePhase::In;
                    self.timer = 0.0;
                }
                false
            }
            FadePhase::In => {
                *opacity = progress;
                progress >= 1.0
            }
        }
    }
}
