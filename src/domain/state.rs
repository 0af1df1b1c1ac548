// Domain-level arena entities, intents and snapshot types.

use std::time::Instant;

/// Slot identity of a player (1 or 2).
pub type PlayerId = u8;

/// Identifier of a transport connection.
pub type ConnId = u64;

#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    // Cooldown anchor, not sent to clients.
    pub last_dash: Option<Instant>,
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u64,
    pub owner: PlayerId,
    pub x: f32,
    pub y: f32,
    // Unit direction (or the raw vector when it was degenerate).
    pub dx: f32,
    pub dy: f32,
    // Remaining ticks before despawn.
    pub ttl: u32,
}

/// Decoded client request, already stripped of wire concerns.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Move {
        x: f32,
        y: f32,
    },
    Shoot {
        x: f32,
        y: f32,
        dx: f32,
        dy: f32,
        // Advisory only; the sender's slot wins.
        owner: Option<PlayerId>,
    },
    Dash {
        dx: f32,
        dy: f32,
    },
}

impl Intent {
    /// True when every numeric field is finite.
    pub fn is_finite(&self) -> bool {
        match *self {
            Intent::Move { x, y } => x.is_finite() && y.is_finite(),
            Intent::Shoot { x, y, dx, dy, .. } => {
                x.is_finite() && y.is_finite() && dx.is_finite() && dy.is_finite()
            }
            Intent::Dash { dx, dy } => dx.is_finite() && dy.is_finite(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectileSnapshot {
    pub id: u64,
    pub owner: PlayerId,
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
}

impl From<&Player> for PlayerSnapshot {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id,
            x: p.x,
            y: p.y,
        }
    }
}

impl From<&Projectile> for ProjectileSnapshot {
    fn from(p: &Projectile) -> Self {
        Self {
            id: p.id,
            owner: p.owner,
            x: p.x,
            y: p.y,
            dx: p.dx,
            dy: p.dy,
        }
    }
}
