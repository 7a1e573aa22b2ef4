//! Component definitions for the combat simulation.
//!
//! Components are plain data attached to entities. State machines that are
//! easiest to test in isolation carry small helper methods; everything that
//! touches more than one entity lives in systems.

mod common;
mod player;
mod projectile;
mod soul;
mod turret;

pub use common::*;
pub use player::*;
pub use projectile::*;
pub use soul::*;
pub use turret::*;
