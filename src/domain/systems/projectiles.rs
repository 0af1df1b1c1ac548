use super::unit_direction;
use crate::domain::state::{PlayerId, Projectile, ProjectileSnapshot};
use crate::domain::tuning::projectile::ProjectileTuning;
use crate::domain::world::TileWorld;
use tracing::debug;

/// Owns the live projectile set and advances it one fixed step per tick.
///
/// Projectiles only collide with the tile world; there is no player hit check.
#[derive(Debug)]
pub struct ProjectileSimulator {
    live: Vec<Projectile>,
    next_id: u64,
    tuning: ProjectileTuning,
}

impl ProjectileSimulator {
    pub fn new(tuning: ProjectileTuning) -> Self {
        Self {
            live: Vec::new(),
            next_id: 1,
            tuning,
        }
    }

    /// Spawns a projectile and returns its id.
    ///
    /// Returns `None` when the origin is blocked. At the live cap the oldest
    /// projectile is evicted to make room.
    pub fn spawn(
        &mut self,
        world: &TileWorld,
        owner: PlayerId,
        x: f32,
        y: f32,
        dx: f32,
        dy: f32,
    ) -> Option<u64> {
        if world.is_blocked(x, y) {
            return None;
        }
        if self.tuning.max_live == 0 {
            return None;
        }
        if self.live.len() >= self.tuning.max_live {
            let evicted = self.live.remove(0);
            debug!(owner, evicted = evicted.id, "projectile cap reached; evicting oldest");
        }

        let (dx, dy) = unit_direction(dx, dy);
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.live.push(Projectile {
            id,
            owner,
            x,
            y,
            dx,
            dy,
            ttl: self.tuning.life_ticks,
        });
        Some(id)
    }

    /// Advances every projectile and drops those that left the world, hit a wall
    /// or ran out of lifetime.
    ///
    /// Returns the number of projectiles removed.
    pub fn tick(&mut self, world: &TileWorld) -> usize {
        let speed = self.tuning.speed;
        for p in self.live.iter_mut() {
            p.x += p.dx * speed;
            p.y += p.dy * speed;
            p.ttl = p.ttl.saturating_sub(1);
        }

        let before = self.live.len();
        self.live.retain(|p| {
            p.ttl > 0 && world.in_bounds(p.x, p.y) && !world.is_blocked(p.x, p.y)
        });
        before - self.live.len()
    }

    /// Live projectiles in spawn order.
    pub fn snapshot(&self) -> Vec<ProjectileSnapshot> {
        self.live.iter().map(ProjectileSnapshot::from).collect()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}
