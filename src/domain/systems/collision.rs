use crate::domain::state::Player;
use crate::domain::world::TileWorld;

/// Dash parameters shared by every player.
#[derive(Debug, Clone, Copy)]
pub struct DashConfig {
    pub power: f32,
    pub steps: u32,
}

/// Resolves a plain move request.
///
/// The target is clamped to the world bounds. A clamped target on a blocked
/// cell rejects the move and the player's current position is returned.
pub fn validate_move(world: &TileWorld, player: &Player, x: f32, y: f32) -> (f32, f32) {
    let (x, y) = world.clamp(x, y);
    if world.is_blocked(x, y) {
        return (player.x, player.y);
    }
    (x, y)
}

/// Resolves a dash along `(dir_x, dir_y) * power` with a discrete sweep.
///
/// `steps` points are sampled from the start (exclusive) to the target
/// (inclusive). With no blocked sample the dash lands on the target;
/// otherwise it lands on the open sample closest to the target, or stays
/// put if every sample is blocked. Walls thinner than `power / steps` can
/// be skipped over.
pub fn validate_dash(
    world: &TileWorld,
    player: &Player,
    dir_x: f32,
    dir_y: f32,
    cfg: DashConfig,
) -> (f32, f32) {
    let steps = cfg.steps.max(1);
    let (start_x, start_y) = (player.x, player.y);
    let (target_x, target_y) = (start_x + dir_x * cfg.power, start_y + dir_y * cfg.power);

    let sample = |i: u32| {
        let t = i as f32 / steps as f32;
        (
            start_x + (target_x - start_x) * t,
            start_y + (target_y - start_y) * t,
        )
    };

    let any_blocked = (1..=steps).any(|i| {
        let (x, y) = sample(i);
        world.is_blocked(x, y)
    });
    if !any_blocked {
        return world.clamp(target_x, target_y);
    }

    (1..=steps)
        .rev()
        .map(sample)
        .find(|&(x, y)| !world.is_blocked(x, y))
        .map(|(x, y)| world.clamp(x, y))
        .unwrap_or((start_x, start_y))
}
