// Slot bookkeeping for the (at most) two live players.

use super::state::{ConnId, Player, PlayerId};

/// Hard cap on simultaneously registered players.
pub const MAX_PLAYERS: usize = 2;

#[derive(Debug, PartialEq, Eq)]
pub enum AdmitError {
    /// Both slots are taken.
    Full,
}

/// Players keyed by connection, kept ordered by slot id.
#[derive(Debug)]
pub struct PlayerRegistry {
    spawn_points: [(f32, f32); MAX_PLAYERS],
    players: Vec<(ConnId, Player)>,
}

impl PlayerRegistry {
    pub fn new(spawn_points: [(f32, f32); MAX_PLAYERS]) -> Self {
        Self {
            spawn_points,
            players: Vec::with_capacity(MAX_PLAYERS),
        }
    }

    /// Registers a player for the connection in the lowest free slot.
    ///
    /// Admitting an already registered connection returns its existing player.
    pub fn admit(&mut self, conn_id: ConnId) -> Result<&Player, AdmitError> {
        if let Some(idx) = self.index_of(conn_id) {
            return Ok(&self.players[idx].1);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(AdmitError::Full);
        }

        // Slots are 1-based; the vec is sorted, so the first gap is the lowest free id.
        let slot = self
            .players
            .iter()
            .enumerate()
            .find(|(idx, (_, p))| p.id as usize != idx + 1)
            .map(|(idx, _)| idx)
            .unwrap_or(self.players.len());

        let (x, y) = self.spawn_points[slot];
        let player = Player {
            id: (slot + 1) as PlayerId,
            x,
            y,
            last_dash: None,
        };
        self.players.insert(slot, (conn_id, player));
        Ok(&self.players[slot].1)
    }

    /// Removes the connection's player, freeing its slot.
    pub fn remove(&mut self, conn_id: ConnId) -> Option<Player> {
        let idx = self.index_of(conn_id)?;
        Some(self.players.remove(idx).1)
    }

    pub fn get(&self, conn_id: ConnId) -> Option<&Player> {
        self.players
            .iter()
            .find(|(c, _)| *c == conn_id)
            .map(|(_, p)| p)
    }

    pub fn get_mut(&mut self, conn_id: ConnId) -> Option<&mut Player> {
        self.players
            .iter_mut()
            .find(|(c, _)| *c == conn_id)
            .map(|(_, p)| p)
    }

    /// Players ordered by slot id.
    pub fn all(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().map(|(_, p)| p)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn index_of(&self, conn_id: ConnId) -> Option<usize> {
        self.players.iter().position(|(c, _)| *c == conn_id)
    }
}
