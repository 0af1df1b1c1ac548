use std::time::Duration;

/// Gameplay tuning for players: spawns and the dash move.
#[derive(Debug, Clone, Copy)]
pub struct PlayerTuning {
    /// Fixed spawn coordinate per slot, index 0 is slot 1.
    pub spawn_points: [(f32, f32); 2],

    /// Distance in pixels covered by a full dash.
    pub dash_power: f32,

    /// Minimum time between two accepted dashes of the same player.
    pub dash_cooldown: Duration,

    /// Number of points sampled along the dash path.
    pub dash_steps: u32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            spawn_points: [(100.0, 100.0), (400.0, 300.0)],
            dash_power: 80.0,
            dash_cooldown: Duration::from_millis(1000),
            dash_steps: 8,
        }
    }
}
