/// Gameplay tuning for projectiles.

#[derive(Debug, Clone, Copy)]
pub struct ProjectileTuning {
    /// Distance travelled per simulation tick, in pixels.
    pub speed: f32,

    /// Lifetime in ticks before the projectile is despawned.
    pub life_ticks: u32,

    /// Upper bound on simultaneously live projectiles.
    pub max_live: usize,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: 10.0,
            // 6 s; a moving projectile leaves the 800x600 arena within 100 ticks.
            life_ticks: 200,
            max_live: 256,
        }
    }
}
