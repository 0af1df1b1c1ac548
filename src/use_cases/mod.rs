// Use cases layer: the authoritative arena loop.

pub mod arena;
pub mod game;
pub mod types;

pub use arena::Arena;
pub use game::world_task;
pub use types::{
    Admission, EncodeFn, Frame, GameEvent, MapSnapshot, Outgoing, Recipient, ServerEvent,
};
