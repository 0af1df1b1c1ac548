// Wire protocol DTOs and conversions for the arena WebSocket.
// Every frame is a JSON object discriminated by its `type` field.

use crate::domain::{Cell, Intent, PlayerId, PlayerSnapshot, ProjectileSnapshot};
use crate::use_cases::{Frame, MapSnapshot, ServerEvent};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Messages the server sends to connected clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    // Sent once right after admission.
    Welcome {
        id: PlayerId,
        x: f32,
        y: f32,
        map: MapDto,
    },
    // Authoritative player positions.
    State { players: Vec<PlayerStateDto> },
    // Authoritative projectile set, once per tick.
    Bullets { bullets: Vec<BulletDto> },
    // Both slots are taken; the server closes right after.
    Full,
}

/// Messages clients send to the server.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Move {
        x: f32,
        y: f32,
    },
    Shoot {
        x: f32,
        y: f32,
        dx: f32,
        dy: f32,
        #[serde(default)]
        owner: Option<u64>,
    },
    Dash {
        dx: f32,
        dy: f32,
    },
}

impl From<ClientMessage> for Intent {
    fn from(msg: ClientMessage) -> Self {
        match msg {
            ClientMessage::Move { x, y } => Intent::Move { x, y },
            ClientMessage::Shoot {
                x,
                y,
                dx,
                dy,
                owner,
            } => Intent::Shoot {
                x,
                y,
                dx,
                dy,
                // Out-of-range claims are dropped; the sender's slot is used anyway.
                owner: owner.and_then(|o| PlayerId::try_from(o).ok()),
            },
            ClientMessage::Dash { dx, dy } => Intent::Dash { dx, dy },
        }
    }
}

/// Static world description; `grid[row][col]` is 1 for blocked, 0 for open.
#[derive(Debug, Clone, Serialize)]
pub struct MapDto {
    pub cols: u32,
    pub rows: u32,
    pub tile: u32,
    pub grid: Vec<Vec<u8>>,
}

impl From<&MapSnapshot> for MapDto {
    fn from(map: &MapSnapshot) -> Self {
        Self {
            cols: map.cols,
            rows: map.rows,
            tile: map.tile,
            grid: map
                .grid
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| match cell {
                            Cell::Open => 0,
                            Cell::Blocked => 1,
                        })
                        .collect()
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayerStateDto {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
}

impl From<&PlayerSnapshot> for PlayerStateDto {
    fn from(p: &PlayerSnapshot) -> Self {
        Self {
            id: p.id,
            x: p.x,
            y: p.y,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulletDto {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub owner: PlayerId,
}

impl From<&ProjectileSnapshot> for BulletDto {
    fn from(p: &ProjectileSnapshot) -> Self {
        Self {
            id: p.id,
            x: p.x,
            y: p.y,
            dx: p.dx,
            dy: p.dy,
            owner: p.owner,
        }
    }
}

impl From<&ServerEvent> for ServerMessage {
    fn from(event: &ServerEvent) -> Self {
        match event {
            ServerEvent::Welcome {
                player_id,
                x,
                y,
                map,
            } => ServerMessage::Welcome {
                id: *player_id,
                x: *x,
                y: *y,
                map: MapDto::from(&**map),
            },
            ServerEvent::State { players } => ServerMessage::State {
                players: players.iter().map(PlayerStateDto::from).collect(),
            },
            ServerEvent::Bullets { bullets } => ServerMessage::Bullets {
                bullets: bullets.iter().map(BulletDto::from).collect(),
            },
        }
    }
}

/// Decodes a client text frame into an intent.
pub fn decode_client_message(text: &str) -> Result<Intent, serde_json::Error> {
    serde_json::from_str::<ClientMessage>(text).map(Intent::from)
}

/// Serializes a loop event to a shareable text frame.
pub fn encode_event(event: &ServerEvent) -> Option<Frame> {
    match serde_json::to_string(&ServerMessage::from(event)) {
        Ok(txt) => Some(Frame::from(txt)),
        Err(e) => {
            error!(error = ?e, "failed to serialize server event");
            None
        }
    }
}
