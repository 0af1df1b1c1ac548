// Authoritative arena state and the per-event dispatch rules.
//
// Everything here is synchronous: the world task feeds events in one at a
// time and delivers the returned messages.

use super::types::{MapSnapshot, Outgoing, Recipient, ServerEvent};
use crate::domain::systems::collision::{self, DashConfig};
use crate::domain::systems::projectiles::ProjectileSimulator;
use crate::domain::systems::unit_direction;
use crate::domain::tuning::player::PlayerTuning;
use crate::domain::tuning::projectile::ProjectileTuning;
use crate::domain::{
    AdmitError, ConnId, Intent, PlayerId, PlayerRegistry, PlayerSnapshot, TileWorld,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Result of admitting a connection.
#[derive(Debug)]
pub struct Admitted {
    pub player_id: PlayerId,
    pub outgoing: Vec<Outgoing>,
}

pub struct Arena {
    world: TileWorld,
    map: Arc<MapSnapshot>,
    registry: PlayerRegistry,
    projectiles: ProjectileSimulator,
    player_tuning: PlayerTuning,
}

impl Arena {
    pub fn new(
        world: TileWorld,
        player_tuning: PlayerTuning,
        projectile_tuning: ProjectileTuning,
    ) -> Self {
        let map = Arc::new(MapSnapshot::from(&world));
        Self {
            world,
            map,
            registry: PlayerRegistry::new(player_tuning.spawn_points),
            projectiles: ProjectileSimulator::new(projectile_tuning),
            player_tuning,
        }
    }

    /// Admits the connection: welcome to it, then a state snapshot to everyone.
    pub fn connect(&mut self, conn_id: ConnId) -> Result<Admitted, AdmitError> {
        let player = self.registry.admit(conn_id)?;
        let player_id = player.id;
        let welcome = ServerEvent::Welcome {
            player_id,
            x: player.x,
            y: player.y,
            map: self.map.clone(),
        };
        info!(conn_id, player_id, "player admitted");

        Ok(Admitted {
            player_id,
            outgoing: vec![
                Outgoing {
                    recipient: Recipient::One(conn_id),
                    event: welcome,
                },
                self.state_broadcast(),
            ],
        })
    }

    /// Frees the connection's slot; survivors get a fresh snapshot.
    pub fn disconnect(&mut self, conn_id: ConnId) -> Vec<Outgoing> {
        match self.registry.remove(conn_id) {
            Some(player) => {
                info!(conn_id, player_id = player.id, "player removed");
                vec![self.state_broadcast()]
            }
            None => Vec::new(),
        }
    }

    /// Applies one decoded intent from `conn_id` at time `now`.
    pub fn handle_intent(
        &mut self,
        conn_id: ConnId,
        intent: Intent,
        now: Instant,
    ) -> Vec<Outgoing> {
        if !intent.is_finite() {
            debug!(conn_id, ?intent, "non-finite intent dropped");
            return Vec::new();
        }

        let world = &self.world;
        let Some(player) = self.registry.get_mut(conn_id) else {
            debug!(conn_id, "intent from unadmitted connection ignored");
            return Vec::new();
        };

        match intent {
            Intent::Move { x, y } => {
                let (nx, ny) = collision::validate_move(world, player, x, y);
                if (nx, ny) == (player.x, player.y) && (x, y) != (nx, ny) {
                    debug!(player_id = player.id, x, y, "move rejected");
                }
                player.x = nx;
                player.y = ny;
                vec![self.state_broadcast()]
            }
            Intent::Shoot {
                x,
                y,
                dx,
                dy,
                owner,
            } => {
                let shooter = player.id;
                if owner.is_some_and(|claimed| claimed != shooter) {
                    debug!(player_id = shooter, ?owner, "declared owner overridden");
                }
                match self.projectiles.spawn(world, shooter, x, y, dx, dy) {
                    Some(projectile_id) => {
                        debug!(player_id = shooter, projectile_id, "projectile spawned");
                    }
                    None => debug!(player_id = shooter, x, y, "projectile spawn rejected"),
                }
                Vec::new()
            }
            Intent::Dash { dx, dy } => {
                let cooldown = self.player_tuning.dash_cooldown;
                if player
                    .last_dash
                    .is_some_and(|last| now.saturating_duration_since(last) < cooldown)
                {
                    debug!(player_id = player.id, "dash on cooldown ignored");
                    return Vec::new();
                }

                let (dir_x, dir_y) = unit_direction(dx, dy);
                let cfg = DashConfig {
                    power: self.player_tuning.dash_power,
                    steps: self.player_tuning.dash_steps,
                };
                let (nx, ny) = collision::validate_dash(world, player, dir_x, dir_y, cfg);
                player.x = nx;
                player.y = ny;
                player.last_dash = Some(now);
                vec![self.state_broadcast()]
            }
        }
    }

    /// One fixed simulation step: advance projectiles, then publish them.
    pub fn tick(&mut self) -> Outgoing {
        let removed = self.projectiles.tick(&self.world);
        if removed > 0 {
            debug!(removed, live = self.projectiles.len(), "projectiles expired");
        }
        Outgoing {
            recipient: Recipient::All,
            event: ServerEvent::Bullets {
                bullets: self.projectiles.snapshot(),
            },
        }
    }

    pub fn players(&self) -> Vec<PlayerSnapshot> {
        self.registry.all().map(PlayerSnapshot::from).collect()
    }

    pub fn projectile_count(&self) -> usize {
        self.projectiles.len()
    }

    fn state_broadcast(&self) -> Outgoing {
        Outgoing {
            recipient: Recipient::All,
            event: ServerEvent::State {
                players: self.players(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Cell;
    use std::time::Duration;

    fn arena() -> Arena {
        Arena::new(
            TileWorld::arena().expect("arena layout"),
            PlayerTuning::default(),
            ProjectileTuning::default(),
        )
    }

    fn state_of(out: &[Outgoing]) -> Vec<(PlayerId, f32, f32)> {
        match out {
            [
                Outgoing {
                    recipient: Recipient::All,
                    event: ServerEvent::State { players },
                },
            ] => players.iter().map(|p| (p.id, p.x, p.y)).collect(),
            other => panic!("expected a single state broadcast, got {other:?}"),
        }
    }

    #[test]
    fn when_player_connects_then_welcome_goes_to_it_before_state_broadcast() {
        let mut arena = arena();

        let admitted = arena.connect(7).expect("admitted");

        assert_eq!(admitted.player_id, 1);
        match &admitted.outgoing[..] {
            [
                Outgoing {
                    recipient: Recipient::One(7),
                    event: ServerEvent::Welcome { player_id, x, y, map },
                },
                Outgoing {
                    recipient: Recipient::All,
                    event: ServerEvent::State { players },
                },
            ] => {
                assert_eq!((*player_id, *x, *y), (1, 100.0, 100.0));
                assert_eq!((map.cols, map.rows, map.tile), (20, 15, 40));
                assert_eq!(map.grid[0][0], Cell::Blocked);
                assert_eq!(map.grid[2][2], Cell::Open);
                assert_eq!(players.len(), 1);
            }
            other => panic!("unexpected outgoing: {other:?}"),
        }
    }

    #[test]
    fn when_third_player_connects_then_it_is_rejected_and_state_is_untouched() {
        let mut arena = arena();
        arena.connect(1).expect("first");
        arena.connect(2).expect("second");
        let before = arena.players();

        assert!(matches!(arena.connect(3), Err(AdmitError::Full)));
        assert_eq!(arena.players(), before);
    }

    #[test]
    fn when_player_disconnects_then_survivors_get_state_without_it() {
        let mut arena = arena();
        arena.connect(1).expect("first");
        arena.connect(2).expect("second");

        let out = arena.disconnect(1);

        assert_eq!(state_of(&out), vec![(2, 400.0, 300.0)]);
        assert!(arena.disconnect(1).is_empty());
    }

    #[test]
    fn when_move_is_valid_then_position_updates_and_state_is_broadcast() {
        let mut arena = arena();
        arena.connect(1).expect("first");

        let out = arena.handle_intent(1, Intent::Move { x: 120.0, y: 110.0 }, Instant::now());

        assert_eq!(state_of(&out), vec![(1, 120.0, 110.0)]);
    }

    #[test]
    fn when_move_hits_a_wall_then_state_is_still_broadcast_with_old_position() {
        let mut arena = arena();
        arena.connect(1).expect("first");

        let out = arena.handle_intent(1, Intent::Move { x: 10.0, y: 10.0 }, Instant::now());

        assert_eq!(state_of(&out), vec![(1, 100.0, 100.0)]);
    }

    #[test]
    fn when_move_has_non_finite_coordinates_then_it_is_dropped() {
        let mut arena = arena();
        arena.connect(1).expect("first");

        let out = arena.handle_intent(
            1,
            Intent::Move {
                x: f32::NAN,
                y: 10.0,
            },
            Instant::now(),
        );

        assert!(out.is_empty());
        assert_eq!(arena.players()[0].x, 100.0);
    }

    #[test]
    fn when_intent_comes_from_unadmitted_connection_then_it_is_ignored() {
        let mut arena = arena();
        arena.connect(1).expect("first");

        let out = arena.handle_intent(9, Intent::Move { x: 120.0, y: 110.0 }, Instant::now());

        assert!(out.is_empty());
    }

    #[test]
    fn when_dash_is_within_cooldown_then_it_is_ignored_without_broadcast() {
        let mut arena = arena();
        arena.connect(1).expect("first");
        let t0 = Instant::now();

        let first = arena.handle_intent(1, Intent::Dash { dx: 1.0, dy: 0.0 }, t0);
        assert_eq!(state_of(&first), vec![(1, 180.0, 100.0)]);

        let early = arena.handle_intent(
            1,
            Intent::Dash { dx: 1.0, dy: 0.0 },
            t0 + Duration::from_millis(999),
        );
        assert!(early.is_empty());
        assert_eq!(arena.players()[0].x, 180.0);

        let later = arena.handle_intent(
            1,
            Intent::Dash { dx: 1.0, dy: 0.0 },
            t0 + Duration::from_millis(1000),
        );
        assert_eq!(state_of(&later), vec![(1, 260.0, 100.0)]);
    }

    #[test]
    fn when_dash_direction_is_long_then_it_is_normalized_to_dash_power() {
        let mut arena = arena();
        arena.connect(1).expect("first");

        let out = arena.handle_intent(1, Intent::Dash { dx: 0.0, dy: 50.0 }, Instant::now());

        assert_eq!(state_of(&out), vec![(1, 100.0, 180.0)]);
    }

    #[test]
    fn when_dash_is_non_finite_then_cooldown_is_not_consumed() {
        let mut arena = arena();
        arena.connect(1).expect("first");
        let t0 = Instant::now();

        let bad = arena.handle_intent(
            1,
            Intent::Dash {
                dx: f32::INFINITY,
                dy: 0.0,
            },
            t0,
        );
        assert!(bad.is_empty());

        let good = arena.handle_intent(1, Intent::Dash { dx: 1.0, dy: 0.0 }, t0);
        assert_eq!(state_of(&good), vec![(1, 180.0, 100.0)]);
    }

    #[test]
    fn when_players_dash_then_cooldowns_are_tracked_per_player() {
        let mut arena = arena();
        arena.connect(1).expect("first");
        arena.connect(2).expect("second");
        let t0 = Instant::now();

        arena.handle_intent(1, Intent::Dash { dx: 1.0, dy: 0.0 }, t0);
        let other = arena.handle_intent(2, Intent::Dash { dx: -1.0, dy: 0.0 }, t0);

        assert_eq!(state_of(&other), vec![(1, 180.0, 100.0), (2, 320.0, 300.0)]);
    }

    #[test]
    fn when_shoot_declares_another_owner_then_sender_slot_owns_the_projectile() {
        let mut arena = arena();
        arena.connect(1).expect("first");
        arena.connect(2).expect("second");

        let out = arena.handle_intent(
            2,
            Intent::Shoot {
                x: 400.0,
                y: 300.0,
                dx: 1.0,
                dy: 0.0,
                owner: Some(1),
            },
            Instant::now(),
        );
        assert!(out.is_empty());

        match arena.tick() {
            Outgoing {
                recipient: Recipient::All,
                event: ServerEvent::Bullets { bullets },
            } => {
                assert_eq!(bullets.len(), 1);
                assert_eq!(bullets[0].owner, 2);
                assert_eq!((bullets[0].x, bullets[0].y), (410.0, 300.0));
            }
            other => panic!("unexpected tick output: {other:?}"),
        }
    }

    #[test]
    fn when_shoot_origin_is_a_wall_then_no_projectile_is_created() {
        let mut arena = arena();
        arena.connect(1).expect("first");

        arena.handle_intent(
            1,
            Intent::Shoot {
                x: 0.0,
                y: 0.0,
                dx: 1.0,
                dy: 0.0,
                owner: None,
            },
            Instant::now(),
        );

        assert_eq!(arena.projectile_count(), 0);
    }

    #[test]
    fn when_no_projectiles_are_live_then_tick_still_publishes_an_empty_set() {
        let mut arena = arena();

        let out = arena.tick();

        assert_eq!(
            out,
            Outgoing {
                recipient: Recipient::All,
                event: ServerEvent::Bullets {
                    bullets: Vec::new()
                },
            }
        );
    }

    #[test]
    fn when_stationary_shots_flood_the_cap_then_later_shots_still_spawn_and_flood_expires() {
        let mut arena = arena();
        arena.connect(1).expect("first");
        arena.connect(2).expect("second");
        let zero_shot = Intent::Shoot {
            x: 100.0,
            y: 100.0,
            dx: 0.0,
            dy: 0.0,
            owner: None,
        };
        for _ in 0..ProjectileTuning::default().max_live {
            arena.handle_intent(1, zero_shot.clone(), Instant::now());
        }
        arena.disconnect(1);

        arena.handle_intent(
            2,
            Intent::Shoot {
                x: 400.0,
                y: 300.0,
                dx: 1.0,
                dy: 0.0,
                owner: None,
            },
            Instant::now(),
        );

        match arena.tick().event {
            ServerEvent::Bullets { bullets } => {
                assert_eq!(bullets.len(), ProjectileTuning::default().max_live);
                assert!(
                    bullets
                        .iter()
                        .any(|b| b.owner == 2 && (b.x, b.y) == (410.0, 300.0))
                );
            }
            other => panic!("unexpected tick output: {other:?}"),
        }

        for _ in 0..ProjectileTuning::default().life_ticks {
            arena.tick();
        }
        assert_eq!(arena.projectile_count(), 0);
    }
}
