// Gameplay tuning, kept apart from runtime/server configuration.

pub mod player;
pub mod projectile;
