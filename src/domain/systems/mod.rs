// Per-tick and per-intent rules applied against the tile world.

pub mod collision;
pub mod projectiles;

/// Normalizes a vector, dividing by 1 instead when its length is zero.
pub fn unit_direction(dx: f32, dy: f32) -> (f32, f32) {
    let len = (dx * dx + dy * dy).sqrt();
    let len = if len > 0.0 { len } else { 1.0 };
    (dx / len, dy / len)
}
