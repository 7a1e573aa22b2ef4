//! SoulSweep Core - Vacuum Combat Engine
//!
//! An ECS-based simulation of SoulSweep's combat encounters: a soul guarded
//! by a ring of turrets, and a player who drains it with a vacuum cleaner
//! while dodging and swallowing the turrets' projectiles.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: the player, the soul, turrets and projectiles
//! - **Components**: Pure data attached to entities (Position, Soul, Turret, etc.)
//! - **Systems**: Logic that queries and updates components once per tick
//!
//! Pure rules (spawn geometry, pricing, charge maths) live in
//! `soulsweep-logic`; this crate wires them into a running encounter.
//!
//! # Example
//!
//! ```rust,no_run
//! use soulsweep_core::prelude::*;
//!
//! let mut engine = CombatEngine::with_seed(42);
//! if let Some(token) = engine.roll_encounter() {
//!     engine.start_combat(token);
//! }
//!
//! loop {
//!     engine.update(1.0 / 60.0, &PlayerInput::idle()); // 60 FPS
//!     for event in engine.drain_events() {
//!         println!("{:?}", event);
//!     }
//! }
//! ```

pub mod components;
pub mod engine;
pub mod events;
pub mod host;
pub mod persistence;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{CombatEngine, RunState};
    pub use crate::events::{CombatEvent, CombatResult};
    pub use crate::host::{DialogueEvent, DialogueLog, DialogueSink, HostState, PlayerInput, Transition};
}
