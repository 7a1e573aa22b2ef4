//! Level-based difficulty - soul health scaling, turret damage bonus, and
//! capture quota progression.

/// Current level clamped to the number of authored levels.
pub fn clamped_level(level: u32, total_levels: u32) -> u32 {
    level.min(total_levels).max(1)
}

/// Soul health multiplier for a player at `level` fighting a soul authored
/// at `soul_level`, growing by `rate` per level of difference. Never below
/// 1.0, so easy souls are not weakened.
pub fn health_multiplier(level: u32, soul_level: u32, rate: f32) -> f32 {
    let difference = level as f32 - soul_level as f32;
    (1.0 + rate * difference).max(1.0)
}

/// Flat damage added to every turret projectile.
pub fn turret_damage_bonus(level: u32) -> f32 {
    level.saturating_sub(1) as f32
}

/// Quota after closing an upgrade screen.
pub fn next_quota(quota: u32, cap: u32) -> u32 {
    (quota + 1).min(cap)
}

/// Largest bonus roll, in 5% steps, unlocked at this point of the run.
pub fn max_bonus_steps(bonus_cap: u32, level: u32, total_levels: u32) -> u32 {
    if total_levels == 0 {
        return 0;
    }
    (bonus_cap / total_levels) * clamped_level(level, total_levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::session::{HEALTH_SCALE_RATE, MAX_QUOTA};

    #[test]
    fn test_level_difference_two_doubles_health() {
        assert_eq!(health_multiplier(3, 1, HEALTH_SCALE_RATE), 2.0);
    }

    #[test]
    fn test_health_never_scales_down() {
        assert_eq!(health_multiplier(1, 3, HEALTH_SCALE_RATE), 1.0);
        assert_eq!(health_multiplier(2, 2, HEALTH_SCALE_RATE), 1.0);
    }

    #[test]
    fn test_turret_damage_bonus() {
        assert_eq!(turret_damage_bonus(1), 0.0);
        assert_eq!(turret_damage_bonus(4), 3.0);
        assert_eq!(turret_damage_bonus(0), 0.0);
    }

    #[test]
    fn test_quota_caps_at_six() {
        assert_eq!(next_quota(2, MAX_QUOTA), 3);
        assert_eq!(next_quota(6, MAX_QUOTA), 6);
    }

    #[test]
    fn test_clamped_level() {
        assert_eq!(clamped_level(7, 3), 3);
        assert_eq!(clamped_level(2, 3), 2);
        assert_eq!(clamped_level(0, 3), 1);
    }

    #[test]
    fn test_max_bonus_steps() {
        // 20 / 3 = 6 steps per level
        assert_eq!(max_bonus_steps(20, 1, 3), 6);
        assert_eq!(max_bonus_steps(20, 5, 3), 18);
        assert_eq!(max_bonus_steps(20, 1, 0), 0);
    }
}
