//! Combat tuning loaded from JSON.
//!
//! Every section defaults to the shipped game values in [`crate::constants`],
//! so a tuning file only lists what it overrides:
//!
//! ```
//! use soulsweep_logic::config::CombatConfig;
//!
//! let config = CombatConfig::from_json(r#"{ "vacuum": { "range": 5.0 } }"#).unwrap();
//! assert_eq!(config.vacuum.range, 5.0);
//! assert_eq!(config.vacuum.cone_degrees, 60.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{player, session, soul, turret, vacuum};
use crate::geometry::{ArenaBounds, Vec2};
pub use crate::upgrades::UpgradeRules;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub base_stamina: f32,
    pub base_speed: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub invincibility: f32,
    pub hit_radius: f32,
    pub half_size: Vec2,
    pub start_x: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            base_stamina: player::BASE_STAMINA,
            base_speed: player::BASE_SPEED,
            min_speed: player::MIN_SPEED,
            max_speed: player::MAX_SPEED,
            invincibility: player::INVINCIBILITY,
            hit_radius: player::HIT_RADIUS,
            half_size: Vec2::new(player::HALF_WIDTH, player::HALF_HEIGHT),
            start_x: player::START_X,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VacuumTuning {
    pub base_damage: f32,
    pub base_max_charge: f32,
    pub drain_rate: f32,
    pub refill_rate: f32,
    /// Full cone width in degrees.
    pub cone_degrees: f32,
    pub range: f32,
    pub strength: f32,
    pub pull_factor: f32,
    pub capture_radius: f32,
    pub charge_per_projectile: f32,
    pub effect_pool_size: usize,
    pub capture_speed: f32,
    pub capture_inside_duration: f32,
    pub projectile_inside_duration: f32,
}

impl Default for VacuumTuning {
    fn default() -> Self {
        Self {
            base_damage: vacuum::BASE_DAMAGE,
            base_max_charge: vacuum::BASE_MAX_CHARGE,
            drain_rate: vacuum::DRAIN_RATE,
            refill_rate: vacuum::REFILL_RATE,
            cone_degrees: vacuum::CONE_DEGREES,
            range: vacuum::RANGE,
            strength: vacuum::STRENGTH,
            pull_factor: vacuum::PULL_FACTOR,
            capture_radius: vacuum::CAPTURE_RADIUS,
            charge_per_projectile: vacuum::CHARGE_PER_PROJECTILE,
            effect_pool_size: vacuum::EFFECT_POOL_SIZE,
            capture_speed: vacuum::CAPTURE_SPEED,
            capture_inside_duration: vacuum::CAPTURE_INSIDE_DURATION,
            projectile_inside_duration: vacuum::PROJECTILE_INSIDE_DURATION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoulTuning {
    pub damage_cooldown: f32,
    pub flee_distance: f32,
    pub speed: f32,
    pub min_wander: f32,
    pub max_wander: f32,
    pub teleport_delay: f32,
    pub teleport_fade: f32,
    pub min_teleport_distance: f32,
    pub max_teleport_distance: f32,
    pub half_size: Vec2,
    pub start_x: f32,
}

impl Default for SoulTuning {
    fn default() -> Self {
        Self {
            damage_cooldown: soul::DAMAGE_COOLDOWN,
            flee_distance: soul::FLEE_DISTANCE,
            speed: soul::SPEED,
            min_wander: soul::MIN_WANDER,
            max_wander: soul::MAX_WANDER,
            teleport_delay: soul::TELEPORT_DELAY,
            teleport_fade: soul::TELEPORT_FADE,
            min_teleport_distance: soul::MIN_TELEPORT_DISTANCE,
            max_teleport_distance: soul::MAX_TELEPORT_DISTANCE,
            half_size: Vec2::new(soul::HALF_WIDTH, soul::HALF_HEIGHT),
            start_x: soul::START_X,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TurretTuning {
    pub teleport_fade: f32,
    pub fade_out: f32,
    pub offscreen_margin: f32,
}

impl Default for TurretTuning {
    fn default() -> Self {
        Self {
            teleport_fade: turret::TELEPORT_FADE,
            fade_out: turret::FADE_OUT,
            offscreen_margin: turret::OFFSCREEN_MARGIN,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionTuning {
    pub run_time: f32,
    pub starting_quota: u32,
    pub max_quota: u32,
    pub stun_duration: f32,
    pub transition_in: f32,
    pub transition_out: f32,
    pub health_scale_rate: f32,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            run_time: session::RUN_TIME,
            starting_quota: session::STARTING_QUOTA,
            max_quota: session::MAX_QUOTA,
            stun_duration: session::STUN_DURATION,
            transition_in: session::TRANSITION_IN,
            transition_out: session::TRANSITION_OUT,
            health_scale_rate: session::HEALTH_SCALE_RATE,
        }
    }
}

/// All combat tuning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub arena: ArenaBounds,
    pub player: PlayerTuning,
    pub vacuum: VacuumTuning,
    pub soul: SoulTuning,
    pub turret: TurretTuning,
    pub session: SessionTuning,
    pub upgrades: UpgradeRules,
}

/// Tuning or roster data that could not be used.
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
    Invalid(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Json(e) => write!(f, "JSON error: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl CombatConfig {
    /// Parse and validate a tuning file.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CombatConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        if self.arena.half_extents.x <= 0.0 || self.arena.half_extents.y <= 0.0 {
            problems.push("arena must have a positive size".to_string());
        }
        if self.player.min_speed > self.player.max_speed {
            problems.push(format!(
                "player min_speed {} exceeds max_speed {}",
                self.player.min_speed, self.player.max_speed
            ));
        }
        if self.vacuum.drain_rate < 0.0 || self.vacuum.refill_rate < 0.0 {
            problems.push("vacuum drain and refill rates must not be negative".to_string());
        }
        if !(0.0..=360.0).contains(&self.vacuum.cone_degrees) {
            problems.push(format!("vacuum cone {} is not a valid angle", self.vacuum.cone_degrees));
        }
        if self.soul.min_wander > self.soul.max_wander {
            problems.push("soul min_wander exceeds max_wander".to_string());
        }
        if self.soul.min_teleport_distance > self.soul.max_teleport_distance {
            problems.push("soul min_teleport_distance exceeds max_teleport_distance".to_string());
        }
        if self.session.starting_quota == 0 || self.session.starting_quota > self.session.max_quota {
            problems.push(format!(
                "starting quota {} must be within 1..={}",
                self.session.starting_quota, self.session.max_quota
            ));
        }
        if !(0.0..=1.0).contains(&self.upgrades.conditional_weight) {
            problems.push("conditional_weight must be a probability".to_string());
        }
        if self.upgrades.slots == 0 {
            problems.push("upgrade board needs at least one slot".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(problems.join("; ")))
        }
    }
}
