//! Systems - per-tick logic that queries and updates components

mod formation;
mod projectile;
mod soul;
mod turret;
mod upgrades;
mod vacuum;

pub use formation::*;
pub use projectile::*;
pub use soul::*;
pub use turret::*;
pub use upgrades::*;
pub use vacuum::*;
