use super::arena::Arena;
use super::types::{Admission, EncodeFn, Frame, GameEvent, Outgoing, Recipient};
use crate::domain::ConnId;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

const LOG_THROTTLE: Duration = Duration::from_secs(2);

// Outbound channels of admitted connections.
struct Connections {
    senders: HashMap<ConnId, mpsc::Sender<Frame>>,
    last_full_log: Instant,
}

impl Connections {
    fn deliver(&mut self, encode: EncodeFn, out: Outgoing) {
        if self.senders.is_empty() {
            return;
        }
        // Serialize once; every recipient gets a clone of the same bytes.
        let Some(frame) = encode(&out.event) else {
            return;
        };

        match out.recipient {
            Recipient::One(conn_id) => {
                if let Some(tx) = self.senders.get(&conn_id) {
                    let tx = tx.clone();
                    self.push(conn_id, &tx, frame);
                }
            }
            Recipient::All => {
                let targets: Vec<_> = self
                    .senders
                    .iter()
                    .map(|(id, tx)| (*id, tx.clone()))
                    .collect();
                for (conn_id, tx) in targets {
                    self.push(conn_id, &tx, frame.clone());
                }
            }
        }
    }

    fn push(&mut self, conn_id: ConnId, tx: &mpsc::Sender<Frame>, frame: Frame) {
        match tx.try_send(frame) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                if self.last_full_log.elapsed() >= LOG_THROTTLE {
                    self.last_full_log = Instant::now();
                    warn!(conn_id, "outbound queue full; dropping frame");
                }
            }
            // The connection task is gone; its Disconnect event is on the way.
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}

/// The single authoritative loop.
///
/// Connection events and the fixed projectile tick are serialized here, so
/// the arena is never touched concurrently.
pub async fn world_task(
    mut input_rx: mpsc::Receiver<GameEvent>,
    mut arena: Arena,
    tick_interval: Duration,
    encode: EncodeFn,
) {
    let mut connections = Connections {
        senders: HashMap::new(),
        last_full_log: Instant::now() - LOG_THROTTLE,
    };

    let mut interval = tokio::time::interval(tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            ev = input_rx.recv() => {
                let Some(ev) = ev else {
                    info!("input channel closed; world task exiting");
                    break;
                };
                handle_event(&mut arena, &mut connections, encode, ev);
            }
            _ = interval.tick() => {
                let out = arena.tick();
                connections.deliver(encode, out);
            }
        }
    }
}

fn handle_event(
    arena: &mut Arena,
    connections: &mut Connections,
    encode: EncodeFn,
    ev: GameEvent,
) {
    match ev {
        GameEvent::Connect {
            conn_id,
            outbound,
            reply,
        } => match arena.connect(conn_id) {
            Ok(admitted) => {
                connections.senders.insert(conn_id, outbound);
                if reply
                    .send(Admission::Admitted {
                        player_id: admitted.player_id,
                    })
                    .is_err()
                {
                    // Caller vanished mid-handshake; undo the admission.
                    connections.senders.remove(&conn_id);
                    for out in arena.disconnect(conn_id) {
                        connections.deliver(encode, out);
                    }
                    return;
                }
                for out in admitted.outgoing {
                    connections.deliver(encode, out);
                }
            }
            Err(_) => {
                info!(conn_id, "arena full; rejecting connection");
                let _ = reply.send(Admission::Full);
            }
        },
        GameEvent::Disconnect { conn_id } => {
            connections.senders.remove(&conn_id);
            for out in arena.disconnect(conn_id) {
                connections.deliver(encode, out);
            }
        }
        GameEvent::Intent { conn_id, intent } => {
            for out in arena.handle_intent(conn_id, intent, Instant::now()) {
                connections.deliver(encode, out);
            }
        }
    }
}
