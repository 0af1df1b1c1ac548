// Use-case level inputs/outputs for the arena loop.

use crate::domain::{
    Cell, ConnId, Intent, PlayerId, PlayerSnapshot, ProjectileSnapshot, TileWorld,
};
use axum::extract::ws::Utf8Bytes;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Serialized frame shared by every recipient of a broadcast.
pub type Frame = Utf8Bytes;

/// Encoder injected at bootstrap so the loop stays agnostic of the wire format.
pub type EncodeFn = fn(&ServerEvent) -> Option<Frame>;

#[derive(Debug)]
pub enum GameEvent {
    /// A new transport connection asks for a slot.
    Connect {
        conn_id: ConnId,
        outbound: mpsc::Sender<Frame>,
        reply: oneshot::Sender<Admission>,
    },
    /// The connection is gone, whoever closed it.
    Disconnect { conn_id: ConnId },
    /// Decoded request from an admitted connection.
    Intent { conn_id: ConnId, intent: Intent },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted { player_id: PlayerId },
    Full,
}

/// Static description of the tile world sent to every new player.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSnapshot {
    pub cols: u32,
    pub rows: u32,
    pub tile: u32,
    pub grid: Vec<Vec<Cell>>,
}

impl From<&TileWorld> for MapSnapshot {
    fn from(world: &TileWorld) -> Self {
        Self {
            cols: world.cols(),
            rows: world.rows(),
            tile: world.tile_size(),
            grid: world.grid_rows().map(<[Cell]>::to_vec).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Welcome {
        player_id: PlayerId,
        x: f32,
        y: f32,
        map: Arc<MapSnapshot>,
    },
    State {
        players: Vec<PlayerSnapshot>,
    },
    Bullets {
        bullets: Vec<ProjectileSnapshot>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every admitted connection.
    All,
    One(ConnId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub recipient: Recipient,
    pub event: ServerEvent,
}
