//! Pure combat logic for SoulSweep.
//!
//! This crate contains all game logic that is independent of any ECS,
//! engine, or runtime. Functions take plain data and return results, making
//! them unit-testable and portable across the native engine, the headless
//! simtest harness, and any future host.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`attack_pattern`] | Turret attack patterns, spawn-point geometry, destructible spacing |
//! | [`config`] | Tuning sections loaded from JSON with original-game defaults |
//! | [`constants`] | Tuned constants for player, vacuum, souls, turrets and the session |
//! | [`difficulty`] | Level-based health and damage scaling, quota progression |
//! | [`formation`] | Rectangular turret formations and clockwise perimeter slots |
//! | [`geometry`] | 2D vectors, degree rotations, arena bounds |
//! | [`roster`] | Soul templates per difficulty level |
//! | [`upgrades`] | Upgrade offers, conditions, pricing and stat multipliers |
//! | [`vacuum`] | Vacuum charge resource, suction cone test, damage floor |

pub mod attack_pattern;
pub mod config;
pub mod constants;
pub mod difficulty;
pub mod formation;
pub mod geometry;
pub mod roster;
pub mod upgrades;
pub mod vacuum;
