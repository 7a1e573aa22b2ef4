//! Soul roster - the souls that can be fought, grouped by difficulty level.
//!
//! The built-in roster is embedded from `data/soul_roster.json` via
//! `include_str!()`. To add or tune a soul, edit the JSON file; no code
//! changes are needed. Each soul lists its turrets, and each turret an
//! ordered list of attack patterns it cycles through.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::attack_pattern::AttackPattern;
use crate::config::ConfigError;
use crate::constants::{soul, turret};
use crate::difficulty;

const ROSTER_JSON: &str = include_str!("../../../data/soul_roster.json");

/// One turret of a soul's formation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurretTemplate {
    pub attacks: Vec<AttackPattern>,
}

impl TurretTemplate {
    /// Patterns that can actually fire.
    pub fn usable_attacks(&self) -> Vec<AttackPattern> {
        self.attacks.iter().filter(|a| !a.is_empty()).cloned().collect()
    }
}

fn default_stamina() -> f32 {
    soul::BASE_STAMINA
}

fn default_bounty() -> u32 {
    soul::BOUNTY
}

fn default_time_bonus() -> f32 {
    soul::TIME_BONUS
}

fn default_attacks_before_teleport() -> u32 {
    turret::ATTACKS_BEFORE_TELEPORT
}

/// An authored soul.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoulTemplate {
    pub name: String,
    #[serde(default = "default_stamina")]
    pub stamina: f32,
    #[serde(default = "default_bounty")]
    pub bounty: u32,
    /// Seconds added to the run clock when captured.
    #[serde(default = "default_time_bonus")]
    pub time_bonus: f32,
    #[serde(default)]
    pub square_formation: bool,
    /// Pattern changes each turret makes before the formation may move.
    #[serde(default = "default_attacks_before_teleport")]
    pub attacks_before_teleport: u32,
    #[serde(default)]
    pub turrets: Vec<TurretTemplate>,
}

/// Reference to a soul in the roster. `level` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyToken {
    pub level: u32,
    pub index: usize,
}

impl EnemyToken {
    pub fn new(level: u32, index: usize) -> Self {
        Self { level, index }
    }
}

/// All souls, one list per difficulty level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub levels: Vec<Vec<SoulTemplate>>,
}

impl Roster {
    /// The roster shipped with the game.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json(ROSTER_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let roster: Roster = serde_json::from_str(json)?;
        roster.validate()?;
        log::debug!(
            "Loaded roster: {} levels, {} souls",
            roster.total_levels(),
            roster.soul_count()
        );
        Ok(roster)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::Invalid("roster has no levels".to_string()));
        }
        for (i, level) in self.levels.iter().enumerate() {
            if level.is_empty() {
                return Err(ConfigError::Invalid(format!("roster level {} has no souls", i + 1)));
            }
            for template in level {
                if template.stamina <= 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "soul '{}' has no stamina",
                        template.name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn total_levels(&self) -> u32 {
        self.levels.len() as u32
    }

    pub fn soul_count(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    pub fn get(&self, token: EnemyToken) -> Option<&SoulTemplate> {
        let level = token.level.checked_sub(1)? as usize;
        self.levels.get(level)?.get(token.index)
    }

    pub fn contains(&self, token: EnemyToken) -> bool {
        self.get(token).is_some()
    }

    /// Level a soul was authored at, 1 for unknown tokens.
    pub fn level_of(&self, token: EnemyToken) -> u32 {
        if self.contains(token) {
            token.level
        } else {
            1
        }
    }

    pub fn find(&self, name: &str) -> Option<EnemyToken> {
        self.tokens().find(|t| self.get(*t).is_some_and(|s| s.name == name))
    }

    pub fn tokens(&self) -> impl Iterator<Item = EnemyToken> + '_ {
        self.levels.iter().enumerate().flat_map(|(l, souls)| {
            (0..souls.len()).map(move |i| EnemyToken::new(l as u32 + 1, i))
        })
    }

    /// Pick a random soul from any level up to the player's clamped level.
    pub fn random_token(&self, rng: &mut impl Rng, player_level: u32) -> Option<EnemyToken> {
        if self.levels.is_empty() {
            return None;
        }
        let max_level = difficulty::clamped_level(player_level, self.total_levels());
        let level = rng.gen_range(1..=max_level);
        let souls = self.levels.get(level as usize - 1)?;
        if souls.is_empty() {
            return None;
        }
        Some(EnemyToken::new(level, rng.gen_range(0..souls.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_builtin_roster_loads() {
        let roster = Roster::builtin().unwrap();
        assert!(roster.total_levels() >= 3);
        for token in roster.tokens() {
            let soul = roster.get(token).unwrap();
            assert!(!soul.turrets.is_empty(), "{} has no turrets", soul.name);
        }
    }

    #[test]
    fn test_lookup_by_token() {
        let roster = Roster::builtin().unwrap();
        let token = EnemyToken::new(1, 0);
        assert_eq!(roster.level_of(token), 1);
        assert!(roster.get(EnemyToken::new(0, 0)).is_none());
        assert!(roster.get(EnemyToken::new(99, 0)).is_none());
        assert_eq!(roster.level_of(EnemyToken::new(99, 0)), 1);

        let name = roster.get(token).unwrap().name.clone();
        assert_eq!(roster.find(&name), Some(token));
    }

    #[test]
    fn test_random_token_respects_level() {
        let roster = Roster::builtin().unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let token = roster.random_token(&mut rng, 1).unwrap();
            assert_eq!(token.level, 1);
            assert!(roster.contains(token));
        }
        for _ in 0..100 {
            let token = roster.random_token(&mut rng, 50).unwrap();
            assert!(token.level <= roster.total_levels());
        }
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let roster = Roster::from_json(
            r#"{ "levels": [[ { "name": "Wisp", "turrets": [ { "attacks": [ {} ] } ] } ]] }"#,
        )
        .unwrap();
        let soul = &roster.levels[0][0];
        assert_eq!(soul.stamina, 100.0);
        assert_eq!(soul.bounty, 100);
        assert_eq!(soul.attacks_before_teleport, 6);
        assert_eq!(soul.turrets[0].attacks[0], AttackPattern::default());
    }

    #[test]
    fn test_empty_level_rejected() {
        let err = Roster::from_json(r#"{ "levels": [[]] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_usable_attacks_skip_empty_patterns() {
        let template = TurretTemplate {
            attacks: vec![
                AttackPattern {
                    projectiles_per_group: 0,
                    ..Default::default()
                },
                AttackPattern::default(),
            ],
        };
        assert_eq!(template.usable_attacks().len(), 1);
    }
}
