// Domain layer: core arena types and rules.

pub mod registry;
pub mod state;
pub mod systems;
pub mod tuning;
pub mod world;

pub use registry::{AdmitError, PlayerRegistry};
pub use state::{
    ConnId, Intent, Player, PlayerId, PlayerSnapshot, Projectile, ProjectileSnapshot,
};
pub use world::{Cell, TileWorld};
