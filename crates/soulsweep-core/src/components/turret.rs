//! Turret components: the soul's orbiting guns.

use serde::{Deserialize, Serialize};
use soulsweep_logic::attack_pattern::{AttackPattern, ProjectileKind, MUZZLE_OFFSET};
use soulsweep_logic::geometry::Vec2;
use soulsweep_logic::roster::TurretTemplate;

use super::FadeTeleport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurretState {
    Attacking,
    BurstCooldown,
    Teleporting,
    /// Terminal: fading out before despawn.
    Deactivating,
}

/// A turret cycling through its attack patterns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turret {
    pub attacks: Vec<AttackPattern>,
    pub current_attack: usize,
    /// Spawn offsets per pattern. Re-aimed or rotated as the turret fires.
    pub spawn_sets: Vec<Vec<Vec2>>,
    pub kinds: Vec<Vec<ProjectileKind>>,
    /// Attacks fired in the current burst
    pub attacks_launched: u32,
    /// Bursts since the pattern last changed
    pub bursts: u32,
    pub teleport_countdown: u32,
    pub attacks_before_teleport: u32,
    pub state: TurretState,
    pub timer: f32,
    /// Flat damage added to every projectile.
    pub damage_bonus: f32,
    pub teleport: Option<FadeTeleport>,
}

impl Turret {
    /// Build a turret from a template. `None` when no pattern can fire.
    pub fn from_template(
        template: &TurretTemplate,
        attacks_before_teleport: u32,
        damage_bonus: f32,
    ) -> Option<Self> {
        let attacks = template.usable_attacks();
        if attacks.is_empty() {
            return None;
        }
        Some(Self::new(attacks, attacks_before_teleport, damage_bonus))
    }

    pub fn new(attacks: Vec<AttackPattern>, attacks_before_teleport: u32, damage_bonus: f32) -> Self {
        let spawn_sets = attacks.iter().map(|a| a.spawn_points(MUZZLE_OFFSET)).collect();
        let kinds = attacks.iter().map(AttackPattern::projectile_kinds).collect();
        Self {
            attacks,
            current_attack: 0,
            spawn_sets,
            kinds,
            attacks_launched: 0,
            bursts: 0,
            teleport_countdown: attacks_before_teleport,
            attacks_before_teleport,
            state: TurretState::Attacking,
            timer: 0.0,
            damage_bonus,
            teleport: None,
        }
    }

    pub fn pattern(&self) -> Option<&AttackPattern> {
        self.attacks.get(self.current_attack)
    }

    /// Ready to move to a new formation slot.
    pub fn can_teleport(&self) -> bool {
        self.teleport_countdown == 0
            && !matches!(self.state, TurretState::Teleporting | TurretState::Deactivating)
    }

    /// Begin a fade teleport to `destination`, resetting the countdown.
    pub fn start_teleport(&mut self, destination: Vec2, fade: f32) {
        if self.state == TurretState::Deactivating {
            return;
        }
        self.state = TurretState::Teleporting;
        self.teleport = Some(FadeTeleport::new(destination, fade));
        self.teleport_countdown = self.attacks_before_teleport;
    }

    pub fn deactivate(&mut self) {
        self.state = TurretState::Deactivating;
        self.teleport = None;
        self.timer = 0.0;
    }

    pub fn is_deactivating(&self) -> bool {
        self.state == TurretState::Deactivating
    }
}
