//! Game constants - tuned values for the player, vacuum, souls, turrets and
//! the session.
//!
//! These are plain constants with no engine dependency. [`crate::config`]
//! uses them as defaults, so a JSON tuning file only needs to list overrides.

pub mod player {
    pub const BASE_STAMINA: f32 = 50.0;
    pub const BASE_SPEED: f32 = 3.0;
    pub const MIN_SPEED: f32 = 1.5;
    pub const MAX_SPEED: f32 = 5.0;
    /// Seconds of invulnerability after a projectile hit.
    pub const INVINCIBILITY: f32 = 0.5;
    /// Collision radius against projectiles.
    pub const HIT_RADIUS: f32 = 0.3;
    pub const HALF_WIDTH: f32 = 0.4;
    pub const HALF_HEIGHT: f32 = 0.5;
    pub const START_X: f32 = -3.0;
}

pub mod vacuum {
    pub const BASE_DAMAGE: f32 = 1.0;
    pub const BASE_MAX_CHARGE: f32 = 5.0;
    pub const DRAIN_RATE: f32 = 1.0;
    pub const REFILL_RATE: f32 = 0.8;
    /// Full cone width in degrees.
    pub const CONE_DEGREES: f32 = 60.0;
    pub const RANGE: f32 = 4.0;
    pub const STRENGTH: f32 = 1.0;
    /// Projectile pull force is the suction strength times this factor.
    pub const PULL_FACTOR: f32 = 10.0;
    /// Offset of the hose mount from the player's centre.
    pub const MOUNT_OFFSET_Y: f32 = -0.1;
    /// Distance from the hose mount to the nozzle tip.
    pub const NOZZLE_LENGTH: f32 = 0.6;
    /// Depth of the container point behind the nozzle tip.
    pub const CONTAINER_DEPTH: f32 = 0.35;
    /// Destructible projectiles this close to the nozzle get sucked in.
    pub const CAPTURE_RADIUS: f32 = 0.3;
    pub const CHARGE_PER_PROJECTILE: f32 = 1.0;
    /// Initial size of the beam-effect pool.
    pub const EFFECT_POOL_SIZE: usize = 10;
    /// Speed factor of the soul's drift toward the nozzle during capture.
    pub const CAPTURE_SPEED: f32 = 3.0;
    /// Seconds for the captured soul to slide into the container.
    pub const CAPTURE_INSIDE_DURATION: f32 = 1.0;
    pub const CAPTURE_END_SCALE: f32 = 0.2;
    /// Seconds for a captured projectile to slide into the container.
    pub const PROJECTILE_INSIDE_DURATION: f32 = 0.25;
    pub const PROJECTILE_END_SCALE: f32 = 0.5;
}

pub mod soul {
    pub const BASE_STAMINA: f32 = 100.0;
    pub const DAMAGE_COOLDOWN: f32 = 0.1;
    pub const FLEE_DISTANCE: f32 = 3.0;
    pub const SPEED: f32 = 2.0;
    pub const MIN_WANDER: f32 = 2.0;
    pub const MAX_WANDER: f32 = 5.0;
    /// Wind-up before a teleport starts fading.
    pub const TELEPORT_DELAY: f32 = 2.0;
    pub const TELEPORT_FADE: f32 = 1.0;
    pub const MIN_TELEPORT_DISTANCE: f32 = 4.0;
    pub const MAX_TELEPORT_DISTANCE: f32 = 6.0;
    pub const BOUNTY: u32 = 100;
    pub const TIME_BONUS: f32 = 10.0;
    pub const HALF_WIDTH: f32 = 0.5;
    pub const HALF_HEIGHT: f32 = 0.5;
    pub const START_X: f32 = 3.0;
}

pub mod turret {
    pub const ATTACKS_BEFORE_TELEPORT: u32 = 6;
    pub const TELEPORT_FADE: f32 = 2.0;
    pub const FADE_OUT: f32 = 0.5;
    /// Base aim offset: a quarter unit to the left of the turret.
    pub const MUZZLE_OFFSET_X: f32 = -0.25;
    /// Projectiles further than this outside the arena are removed.
    pub const OFFSCREEN_MARGIN: f32 = 0.5;
}

pub mod formation {
    /// Integer height range, upper bound exclusive.
    pub const MIN_HEIGHT: u32 = 3;
    pub const MAX_HEIGHT: u32 = 8;
    /// Integer width range, upper bound exclusive.
    pub const MIN_WIDTH: u32 = 3;
    pub const MAX_WIDTH: u32 = 14;
}

pub mod session {
    pub const RUN_TIME: f32 = 60.0;
    pub const STARTING_QUOTA: u32 = 2;
    pub const MAX_QUOTA: u32 = 6;
    pub const STUN_DURATION: f32 = 3.0;
    pub const TRANSITION_IN: f32 = 3.0;
    pub const TRANSITION_OUT: f32 = 2.0;
    /// Soul health grows by this fraction per level of difference.
    pub const HEALTH_SCALE_RATE: f32 = 0.5;
}

pub mod upgrades {
    pub const CONDITIONAL_WEIGHT: f64 = 0.25;
    pub const BONUS_CAP: u32 = 20;
    pub const REROLL_COST: u32 = 25;
    pub const SLOTS: usize = 3;
    /// Bonus magnitudes are rolled in steps of this many percent.
    pub const BONUS_STEP: f32 = 5.0;
    pub const MIN_BONUS_STEPS: u32 = 2;
    pub const MAX_SPEED_STEPS: u32 = 4;
    pub const DRAWBACK_THRESHOLD: f32 = 50.0;
    pub const CONDITIONAL_COST_FACTOR: f32 = 2.5;
    pub const UNCONDITIONAL_COST_FACTOR: u32 = 5;
}
