//! Soul components - the enemy being vacuumed.

use serde::{Deserialize, Serialize};
use soulsweep_logic::geometry::Vec2;

use super::FadeTeleport;

/// Result of a suction hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageOutcome {
    /// Cooldown running or already captured.
    Ignored,
    Damaged,
    /// Stamina reached zero. Reported exactly once.
    Depleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wander {
    pub direction: Vec2,
    pub duration: f32,
    pub timer: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SoulTeleport {
    Idle,
    /// Winding up before the fade starts.
    WindUp { timer: f32, destination: Vec2 },
    Fading(FadeTeleport),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Soul {
    pub name: String,
    pub stamina: f32,
    pub max_stamina: f32,
    /// Seconds left before the soul can be hurt again.
    pub damage_cooldown: f32,
    pub cooldown_duration: f32,
    pub wander: Option<Wander>,
    pub flee_decay: f32,
    pub teleport: SoulTeleport,
    pub captured: bool,
    /// Set when the entrance transition finishes.
    pub setup_complete: bool,
    pub bounty: u32,
    pub time_bonus: f32,
}

impl Soul {
    pub fn new(name: impl Into<String>, stamina: f32, cooldown_duration: f32) -> Self {
        let stamina = stamina.max(1.0);
        Self {
            name: name.into(),
            stamina,
            max_stamina: stamina,
            damage_cooldown: 0.0,
            cooldown_duration,
            wander: None,
            flee_decay: 0.0,
            teleport: SoulTeleport::Idle,
            captured: false,
            setup_complete: false,
            bounty: 0,
            time_bonus: 0.0,
        }
    }

    /// Suction cannot touch the soul while it is fading.
    pub fn is_immune(&self) -> bool {
        matches!(self.teleport, SoulTeleport::Fading(_))
    }

    pub fn is_teleporting(&self) -> bool {
        !matches!(self.teleport, SoulTeleport::Idle)
    }

    pub fn stamina_fraction(&self) -> f32 {
        if self.max_stamina <= 0.0 {
            0.0
        } else {
            self.stamina / self.max_stamina
        }
    }

    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.captured || self.damage_cooldown > 0.0 {
            return DamageOutcome::Ignored;
        }

        self.stamina = (self.stamina - amount.max(0.0)).max(0.0);
        self.damage_cooldown = self.cooldown_duration;

        if self.stamina == 0.0 {
            self.captured = true;
            DamageOutcome::Depleted
        } else {
            DamageOutcome::Damaged
        }
    }

    pub fn tick_cooldown(&mut self, delta: f32) {
        self.damage_cooldown = (self.damage_cooldown - delta).max(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cooldown_blocks_rapid_hits() {
        let mut soul = Soul::new("Wisp", 10.0, 0.1);
        assert_eq!(soul.take_damage(1.0), DamageOutcome::Damaged);
        assert_eq!(soul.take_damage(1.0), DamageOutcome::Ignored);
        assert_eq!(soul.stamina, 9.0);

        soul.tick_cooldown(0.1);
        assert_eq!(soul.take_damage(1.0), DamageOutcome::Damaged);
        assert_eq!(soul.stamina, 8.0);
    }

    #[test]
    fn test_depletion_reported_once() {
        let mut soul = Soul::new("Wisp", 2.0, 0.0);
        assert_eq!(soul.take_damage(5.0), DamageOutcome::Depleted);
        assert_eq!(soul.stamina, 0.0);
        assert!(soul.captured);
        assert_eq!(soul.take_damage(5.0), DamageOutcome::Ignored);
        assert_eq!(soul.stamina, 0.0);
    }

    #[test]
    fn test_only_the_fade_is_immune() {
        let mut soul = Soul::new("Wisp", 2.0, 0.1);
        soul.teleport = SoulTeleport::WindUp {
            timer: 0.0,
            destination: Vec2::ZERO,
        };
        assert!(soul.is_teleporting());
        assert!(!soul.is_immune());

        soul.teleport = SoulTeleport::Fading(FadeTeleport::new(Vec2::ZERO, 1.0));
        assert!(soul.is_immune());
    }
}
