//! Combat events - what happened this tick, for audio and UI hosts.
//!
//! Systems push events as they resolve; the engine acts on the few that end
//! an encounter and keeps the rest until the host drains them.

use serde::{Deserialize, Serialize};
use soulsweep_logic::roster::EnemyToken;

use crate::components::ProjectileFate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatResult {
    Win,
    Lose,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    CombatStarted { token: EnemyToken },
    ProjectileFired { count: usize },
    ProjectileRemoved(ProjectileFate),
    /// A captured projectile reached the nozzle.
    ProjectileSucked,
    PlayerHit { damage: f32, stamina: f32 },
    PlayerDefeated,
    SoulDamaged { stamina: f32 },
    SoulTeleportStarted,
    /// The soul's stamina ran out and the capture animation began.
    CaptureStarted,
    SoulCaptured,
    ChargeDepleted,
    ChargeRestored,
    Reformed { turrets: usize },
    CombatEnded(CombatResult),
    GameOver,
}
