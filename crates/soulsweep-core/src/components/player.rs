//! Player and vacuum components.

use hecs::Entity;
use serde::{Deserialize, Serialize};
use soulsweep_logic::geometry::Vec2;
use soulsweep_logic::vacuum::{Nozzle, VacuumCharge};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitOutcome {
    /// Invincible or already defeated.
    Ignored,
    Hurt,
    Defeated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub stamina: f32,
    pub max_stamina: f32,
    /// Seconds of invincibility left.
    pub invincible: f32,
    pub defeated: bool,
}

impl Player {
    pub fn new(stamina: f32) -> Self {
        Self {
            stamina,
            max_stamina: stamina,
            invincible: 0.0,
            defeated: false,
        }
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible > 0.0
    }

    pub fn stamina_fraction(&self) -> f32 {
        if self.max_stamina <= 0.0 {
            0.0
        } else {
            self.stamina / self.max_stamina
        }
    }

    pub fn take_hit(&mut self, damage: f32, invincibility: f32) -> HitOutcome {
        if self.defeated || self.is_invincible() {
            return HitOutcome::Ignored;
        }
        self.stamina = (self.stamina - damage).max(0.0);
        self.invincible = invincibility;
        if self.stamina == 0.0 {
            self.defeated = true;
            HitOutcome::Defeated
        } else {
            HitOutcome::Hurt
        }
    }

    pub fn tick_invincibility(&mut self, delta: f32) {
        self.invincible = (self.invincible - delta).max(0.0);
    }
}

/// Beam effects drawn from the nozzle to each suction target.
///
/// The allocation grows to the largest target count seen and is reused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectPool {
    pub allocated: usize,
    pub active: usize,
}

impl EffectPool {
    pub fn with_capacity(allocated: usize) -> Self {
        Self { allocated, active: 0 }
    }

    pub fn resize(&mut self, count: usize) {
        self.allocated = self.allocated.max(count);
        self.active = count;
    }

    pub fn clear(&mut self) {
        self.active = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vacuum {
    pub charge: VacuumCharge,
    pub nozzle: Nozzle,
    pub suction_active: bool,
    pub effects: EffectPool,
}

impl Vacuum {
    pub fn new(charge: VacuumCharge, effect_pool: usize) -> Self {
        Self {
            charge,
            nozzle: Nozzle::default(),
            suction_active: false,
            effects: EffectPool::with_capacity(effect_pool),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CapturePhase {
    /// Drifting onto the nozzle tip, shrinking.
    ToCentre { t: f32 },
    /// Sliding from the tip into the container.
    ToInside { timer: f32 },
}

/// Attached to a soul once its stamina is depleted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureAnimation {
    pub player: Entity,
    pub start: Vec2,
    pub target_rotation: f32,
    pub phase: CapturePhase,
    /// Opacity of the soul's stamina label.
    pub label_opacity: f32,
}
