//! Simulation tick
//!
//! `advance(dt)` runs one frame in a fixed order:
//!   1. Players: timers, queued move, queued action, curse auto-action
//!   2. Power-up pickup
//!   3. Power-up immunity countdown
//!   4. Explosion tile expiry
//!   5. Bombs: fuse, then kick/flight steps (explosions resolve inline)
//!   6. Round outcome
//!
//! Every timer is a countdown field decremented here; nothing is scheduled
//! outside this call.

use super::bomb::{self, FlightStep, FuseState, KickStep, Motion};
use super::grid::{BombId, Cell, Direction, PlayerId};
use super::state::{Arena, EntityKind, GameEvent, Outcome, RoundPhase};

impl Arena {
    /// Advance the simulation by `dt` seconds and return the events emitted
    /// since the last drain, in order.
    pub fn advance(&mut self, dt: f32) -> Vec<GameEvent> {
        if self.phase == RoundPhase::Over {
            self.intents.iter_mut().for_each(|i| *i = Default::default());
            return self.drain_events();
        }

        self.elapsed += dt;
        self.sync_player_index();

        self.resolve_players(dt);
        self.resolve_pickups();
        self.resolve_powerup_immunity(dt);
        self.resolve_explosion_tiles(dt);
        self.resolve_bombs(dt);
        self.resolve_outcome();

        self.drain_events()
    }

    // ══════════════════════════════════════════════════════════════
    // Players
    // ══════════════════════════════════════════════════════════════

    fn resolve_players(&mut self, dt: f32) {
        for id in 0..self.players.len() {
            let pending = std::mem::take(&mut self.intents[id]);
            if !self.players[id].alive {
                continue;
            }

            let timers = self.players[id].tick(dt, &self.config);
            if let Some(curse) = timers.curse_expired {
                log::debug!("Player {} curse {:?} expired", id, curse);
                self.emit(GameEvent::CurseExpired { player_id: id, curse });
            }

            if let Some(dir) = pending.movement {
                self.player_move(id, dir);
            }
            if pending.act {
                self.player_act(id);
            }
            if timers.auto_act {
                self.player_act(id);
            }
        }
    }

    /// Step, or kick the bomb in the way
    fn player_move(&mut self, id: PlayerId, requested: Direction) {
        let player = &self.players[id];
        if player.move_cooldown > 0.0 {
            return;
        }
        let dir = player.decode_direction(requested);
        let from = player.position;
        let target = from.step(dir);
        let interval = player.move_interval(&self.config);
        let has_kick = player.has_kick;

        self.players[id].facing = dir;

        if self.grid.get_cell(target) == Cell::Bomb {
            let kickable = self
                .bomb_at(target)
                .is_some_and(|b| b.is_stationary() && !b.has_exploded);
            match self.grid.bomb_at(target) {
                Some(bomb_id) if has_kick && kickable => {
                    if self.kick_bomb(bomb_id, dir) {
                        self.players[id].move_cooldown = interval;
                    }
                }
                _ => log::debug!("Player {} blocked by bomb at {:?}", id, target),
            }
            return;
        }

        if !self.grid.is_walkable(target) {
            log::debug!(
                "Player {} move {:?} into {:?} rejected",
                id,
                dir,
                self.grid.get_cell(target)
            );
            return;
        }

        let player = &mut self.players[id];
        player.position = target;
        player.move_cooldown = interval;
        self.sync_player_index();
        self.emit(GameEvent::PlayerMoved {
            player_id: id,
            old: from,
            new: target,
        });
    }

    /// Throw the bomb underfoot if possible, otherwise place one
    fn player_act(&mut self, id: PlayerId) {
        let player = &self.players[id];
        if player.action_cooldown > 0.0 {
            return;
        }
        let (pos, facing, range) = (player.position, player.facing, player.bomb_range);
        let interval = player.move_interval(&self.config);
        let (has_throw, can_place) = (player.has_throw, player.can_place_more());

        if has_throw {
            if let Some(bomb_id) = self.grid.bomb_at(pos) {
                if self.throw_bomb(bomb_id, facing) {
                    self.players[id].action_cooldown = interval;
                }
                return;
            }
        }

        if !can_place {
            log::debug!("Player {} at bomb cap", id);
            return;
        }
        if let Some(bomb_id) = self.place_bomb(pos, range, id) {
            let player = &mut self.players[id];
            player.current_bombs += 1;
            player.action_cooldown = interval;
            self.emit(GameEvent::BombPlaced {
                bomb_id,
                player_id: id,
                pos,
            });
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Power-ups and explosion tiles
    // ══════════════════════════════════════════════════════════════

    fn resolve_pickups(&mut self) {
        for id in 0..self.players.len() {
            self.collect_powerup(id);
        }
    }

    fn resolve_powerup_immunity(&mut self, dt: f32) {
        for powerup in self.powerups.values_mut() {
            powerup.tick(dt);
        }
    }

    fn resolve_explosion_tiles(&mut self, dt: f32) {
        let mut expired = Vec::new();
        self.explosions.retain_mut(|tile| {
            let done = tile.tick(dt);
            if done {
                expired.push(tile.position);
            }
            !done
        });
        for pos in expired {
            self.emit(GameEvent::EntityDestroyed {
                kind: EntityKind::Explosion,
                pos,
            });
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Bombs
    // ══════════════════════════════════════════════════════════════

    fn resolve_bombs(&mut self, dt: f32) {
        let ids: Vec<BombId> = self.bombs.keys().copied().collect();
        for id in ids {
            // Gone already: chained by an earlier bomb this tick
            let Some(bomb) = self.bombs.get_mut(&id) else {
                continue;
            };
            if bomb.has_exploded {
                continue;
            }
            match bomb.tick_fuse(dt) {
                FuseState::Expired => {
                    self.trigger_explosion(id);
                    continue;
                }
                FuseState::Deferred | FuseState::Burning => {}
            }
            self.resolve_bomb_motion(id, dt);
        }
    }

    /// Run every kick/flight step whose countdown has elapsed
    fn resolve_bomb_motion(&mut self, id: BombId, dt: f32) {
        match self.bombs.get_mut(&id) {
            Some(bomb) if !bomb.is_stationary() => bomb.step_timer -= dt,
            _ => return,
        }

        while let Some(bomb) = self.bombs.get(&id) {
            if bomb.has_exploded || bomb.step_timer > 0.0 {
                break;
            }
            match bomb.motion {
                Motion::Stationary => break,
                Motion::Kicked(dir) => self.kick_step(id, dir),
                Motion::Thrown { .. } => self.flight_step(id),
            }
        }
    }

    fn kick_step(&mut self, id: BombId, dir: Direction) {
        let delay = self.config.kick_step_delay;
        let Some(from) = self.bombs.get(&id).map(|b| b.position) else {
            return;
        };
        let step = bomb::kick_step(&self.grid, from, dir);
        let Some(bomb) = self.bombs.get_mut(&id) else {
            return;
        };
        match step {
            KickStep::Slide(to) => {
                bomb.position = to;
                bomb.step_timer += delay;
                self.grid.move_bomb(id, from, to);
                log::trace!("Bomb {} slid {:?} -> {:?}", id, from, to);
                self.emit(GameEvent::EntityMoved {
                    kind: EntityKind::Bomb,
                    old: from,
                    new: to,
                });
            }
            KickStep::Stop => {
                bomb.motion = Motion::Stationary;
                bomb.step_timer = 0.0;
                log::debug!("Bomb {} stopped at {:?}", id, from);
            }
        }
    }

    fn flight_step(&mut self, id: BombId) {
        let delay = self.config.fly_step_delay;
        let Some(bomb) = self.bombs.get(&id) else {
            return;
        };
        let Motion::Thrown {
            direction,
            tiles_remaining,
            land_next,
        } = bomb.motion
        else {
            return;
        };
        let from = bomb.position;
        let step = if land_next {
            FlightStep::Land
        } else {
            bomb::flight_step(&self.grid, from, direction, tiles_remaining)
        };

        let (to, remaining, land_next) = match step {
            FlightStep::Land => {
                self.land_bomb(id);
                return;
            }
            FlightStep::Fly { to, consume } => {
                let remaining = if consume { tiles_remaining - 1 } else { tiles_remaining };
                (to, remaining, false)
            }
            FlightStep::Stack(to) => (to, tiles_remaining, true),
        };

        if let Some(bomb) = self.bombs.get_mut(&id) {
            bomb.position = to;
            bomb.step_timer += delay;
            bomb.motion = Motion::Thrown {
                direction,
                tiles_remaining: remaining,
                land_next,
            };
        }
        log::trace!("Bomb {} flew {:?} -> {:?} ({} left)", id, from, to, remaining);
        self.emit(GameEvent::EntityMoved {
            kind: EntityKind::Bomb,
            old: from,
            new: to,
        });
    }

    /// Put an airborne bomb back on the grid where it is, then honour a
    /// fuse that ran out mid-flight.
    fn land_bomb(&mut self, id: BombId) {
        let Some(bomb) = self.bombs.get_mut(&id) else {
            return;
        };
        bomb.motion = Motion::Stationary;
        bomb.step_timer = 0.0;
        let (pos, explode) = (bomb.position, bomb.explode_on_landing);

        if self.grid.get_cell(pos) == Cell::SoftBlock {
            log::debug!("Bomb {} crushed soft block at {:?}", id, pos);
            self.grid.set_cell(pos, Cell::Empty);
            self.emit(GameEvent::EntityDestroyed {
                kind: EntityKind::SoftBlock,
                pos,
            });
        }
        self.grid.register_bomb(pos, id);
        self.emit(GameEvent::BombLanded { bomb_id: id, pos });

        if explode {
            self.trigger_explosion(id);
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Outcome
    // ══════════════════════════════════════════════════════════════

    fn resolve_outcome(&mut self) {
        let winner = match self.outcome() {
            Outcome::Ongoing => return,
            Outcome::Winner(id) => Some(id),
            Outcome::Draw => None,
        };
        self.phase = RoundPhase::Over;
        log::info!("Round over after {:.2}s, winner: {:?}", self.elapsed, winner);
        self.emit(GameEvent::RoundOver { winner });
    }
}
