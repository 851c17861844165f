//! Explosion propagation
//!
//! A blast detonates its own cell, then walks each cardinal ray outward up
//! to the bomb's range:
//!
//! | Cell       | Action                                   | Ray      |
//! |------------|------------------------------------------|----------|
//! | off-grid   | -                                        | stop     |
//! | HardBlock  | -                                        | stop     |
//! | SoftBlock  | detonate (block breaks, may drop)        | stop     |
//! | Powerup    | force-destroy, then detonate             | continue |
//! | Empty/Bomb | detonate (chained bombs explode now)     | continue |
//!
//! Chain reactions are resolved synchronously: a bomb reached by a ray
//! explodes completely before the ray moves on. Each bomb explodes at most
//! once (`has_exploded`), which bounds the recursion.

use serde::{Deserialize, Serialize};

use super::grid::{BombId, Cell, Coord, Direction, GridState};
use super::powerup::roll_drop;
use super::state::{Arena, EntityKind, GameEvent};

/// Transient blast tile, visible for a fixed lifetime. It acts once, when
/// spawned, and is purely cosmetic afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplosionTile {
    pub position: Coord,
    pub remaining: f32,
}

impl ExplosionTile {
    pub fn new(position: Coord, lifetime: f32) -> Self {
        Self {
            position,
            remaining: lifetime,
        }
    }

    /// Returns true once the tile has expired
    pub fn tick(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}

/// What a ray does at one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayStep {
    Stop,
    DetonateAndStop,
    ForceDestroyAndContinue,
    DetonateAndContinue,
}

/// Ray rule for a cell. Off-grid cells read as `HardBlock`.
pub fn classify(cell: Cell) -> RayStep {
    match cell {
        Cell::HardBlock => RayStep::Stop,
        Cell::SoftBlock => RayStep::DetonateAndStop,
        Cell::Powerup => RayStep::ForceDestroyAndContinue,
        Cell::Empty | Cell::Bomb => RayStep::DetonateAndContinue,
    }
}

/// Cells a blast at `center` would detonate on the current grid, ignoring
/// the changes chain reactions would make along the way. Center first,
/// then each ray in [`Direction::ALL`] order.
pub fn blast_footprint(grid: &GridState, center: Coord, range: u32) -> Vec<Coord> {
    let mut cells = vec![center];
    for dir in Direction::ALL {
        for i in 1..=range as i32 {
            let pos = center.offset(dir, i);
            match classify(grid.get_cell(pos)) {
                RayStep::Stop => break,
                RayStep::DetonateAndStop => {
                    cells.push(pos);
                    break;
                }
                RayStep::ForceDestroyAndContinue | RayStep::DetonateAndContinue => cells.push(pos),
            }
        }
    }
    cells
}

impl Arena {
    /// Explode a bomb now. Safe to call any number of times: only the first
    /// call on a grounded bomb does anything. An airborne bomb is marked to
    /// explode when it lands instead.
    ///
    /// Returns true if this call exploded the bomb.
    pub fn trigger_explosion(&mut self, id: BombId) -> bool {
        let Some(bomb) = self.bombs.get_mut(&id) else {
            return false;
        };
        if bomb.has_exploded {
            return false;
        }
        if bomb.is_airborne() {
            bomb.explode_on_landing = true;
            return false;
        }

        bomb.has_exploded = true;
        let (center, range, owner) = (bomb.position, bomb.range, bomb.owner);

        self.grid.unregister_bomb(center, id);
        if let Some(player) = self.players.get_mut(owner) {
            player.current_bombs = player.current_bombs.saturating_sub(1);
        }
        log::debug!("Bomb {} exploded at {:?} (range {})", id, center, range);
        self.emit(GameEvent::BombExploded { bomb_id: id, pos: center });

        self.propagate(center, range);

        self.bombs.remove(&id);
        true
    }

    fn propagate(&mut self, center: Coord, range: u32) {
        self.detonate(center);

        for dir in Direction::ALL {
            for i in 1..=range as i32 {
                let pos = center.offset(dir, i);
                if !self.grid.in_bounds(pos) {
                    break;
                }
                match classify(self.grid.get_cell(pos)) {
                    RayStep::Stop => break,
                    RayStep::DetonateAndStop => {
                        self.detonate(pos);
                        break;
                    }
                    RayStep::ForceDestroyAndContinue => {
                        self.destroy_powerup_at(pos, true);
                        self.detonate(pos);
                    }
                    RayStep::DetonateAndContinue => self.detonate(pos),
                }
            }
        }
    }

    /// Spawn an explosion tile at `pos` and apply its one-shot effects:
    /// break a soft block, kill players, destroy a non-immune power-up,
    /// chain any grounded bombs.
    fn detonate(&mut self, pos: Coord) {
        if self.grid.get_cell(pos) == Cell::SoftBlock {
            self.grid.set_cell(pos, Cell::Empty);
            self.emit(GameEvent::EntityDestroyed {
                kind: EntityKind::SoftBlock,
                pos,
            });
            if let Some(kind) = roll_drop(&mut self.rng, &self.config) {
                self.spawn_powerup(pos, kind);
            }
        }

        let lifetime = self.config.explosion_lifetime;
        self.explosions.push(ExplosionTile::new(pos, lifetime));
        self.emit(GameEvent::ExplosionTile { pos });

        self.kill_players_at(pos);
        self.destroy_powerup_at(pos, false);

        let chained = self.grid.bombs_at(pos).to_vec();
        for bomb_id in chained {
            log::debug!("Chain reaction: bomb {} at {:?}", bomb_id, pos);
            self.trigger_explosion(bomb_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArenaConfig;
    use crate::sim::powerup::PowerupKind;

    fn config() -> ArenaConfig {
        ArenaConfig {
            powerup_drop_chance: 0.0,
            ..Default::default()
        }
    }

    fn arena(rows: &[&str], spawns: &[Coord]) -> Arena {
        Arena::from_grid(config(), GridState::from_rows(rows), spawns, 7).expect("valid arena")
    }

    fn tiles(events: &[GameEvent]) -> Vec<Coord> {
        events
            .iter()
            .filter_map(|e| match e {
                GameEvent::ExplosionTile { pos } => Some(*pos),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn east_ray_stops_at_soft_block() {
        // Bomb at (5,5), soft block at (7,5), hard block at (9,5)
        let rows = [
            "###########",
            "#.........#",
            "#.........#",
            "#.........#",
            "#.........#",
            "#......+.##",
            "#.........#",
            "###########",
        ];
        let mut a = arena(&rows, &[Coord::new(1, 1)]);
        let id = a.place_bomb(Coord::new(5, 5), 4, 0).expect("placed");
        a.drain_events();
        assert!(a.trigger_explosion(id));
        let hit = tiles(&a.drain_events());

        assert!(hit.contains(&Coord::new(6, 5)));
        assert!(hit.contains(&Coord::new(7, 5)));
        assert!(!hit.contains(&Coord::new(8, 5)));
        assert!(!hit.contains(&Coord::new(9, 5)));
        assert_eq!(a.grid().get_cell(Coord::new(7, 5)), Cell::Empty);
    }

    #[test]
    fn range_two_scenario_detonates_exactly_two_east() {
        let rows = [
            "###########",
            "#.........#",
            "#.........#",
            "#.........#",
            "#.........#",
            "#......+.##",
            "#.........#",
            "###########",
        ];
        let mut a = arena(&rows, &[Coord::new(1, 1)]);
        let id = a.place_bomb(Coord::new(5, 5), 2, 0).expect("placed");
        a.drain_events();
        a.trigger_explosion(id);
        let east: Vec<Coord> = tiles(&a.drain_events())
            .into_iter()
            .filter(|p| p.y == 5 && p.x > 5)
            .collect();
        assert_eq!(east, vec![Coord::new(6, 5), Coord::new(7, 5)]);
    }

    #[test]
    fn hard_block_stops_ray_without_detonating() {
        let mut a = arena(
            &[
                "#######",
                "#.....#",
                "#.#.#.#",
                "#.....#",
                "#######",
            ],
            &[Coord::new(5, 3)],
        );
        let id = a.place_bomb(Coord::new(1, 1), 5, 0).expect("placed");
        a.drain_events();
        a.trigger_explosion(id);
        let hit = tiles(&a.drain_events());
        // Up and left are walls; down passes (1,2) and (1,3) then hits the border
        assert!(!hit.iter().any(|p| p.x == 0 || p.y == 0 || p.y == 4));
        assert!(hit.contains(&Coord::new(1, 3)));
        assert!(hit.contains(&Coord::new(5, 1)));
    }

    #[test]
    fn explode_is_idempotent() {
        let mut a = arena(&["#######", "#.....#", "#######"], &[Coord::new(5, 1)]);
        let id = a.place_bomb(Coord::new(1, 1), 1, 0).expect("placed");
        assert!(a.trigger_explosion(id));
        assert!(!a.trigger_explosion(id));
        assert!(!a.trigger_explosion(id));
        let exploded = a
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::BombExploded { .. }))
            .count();
        assert_eq!(exploded, 1);
        assert!(a.bomb(id).is_none());
        assert_eq!(a.grid().get_cell(Coord::new(1, 1)), Cell::Empty);
    }

    #[test]
    fn chain_reaction_resolves_inside_first_blast() {
        // Bomb A at (3,3), bomb B at (3,4)
        let rows = [
            "#######",
            "#.....#",
            "#.....#",
            "#.....#",
            "#.....#",
            "#.....#",
            "#######",
        ];
        let mut a = arena(&rows, &[Coord::new(1, 1)]);
        let bomb_a = a.place_bomb(Coord::new(3, 3), 1, 0).expect("placed");
        let bomb_b = a.place_bomb(Coord::new(3, 4), 1, 0).expect("placed");
        a.drain_events();

        assert!(a.trigger_explosion(bomb_a));
        let events = a.drain_events();

        let idx = |target: &GameEvent| events.iter().position(|e| e == target);
        let a_exploded = idx(&GameEvent::BombExploded { bomb_id: bomb_a, pos: Coord::new(3, 3) })
            .expect("A exploded");
        let b_exploded = idx(&GameEvent::BombExploded { bomb_id: bomb_b, pos: Coord::new(3, 4) })
            .expect("B exploded");
        assert!(a_exploded < b_exploded);

        // B's own downward tile lands before A's remaining rays (left/right)
        let b_down = idx(&GameEvent::ExplosionTile { pos: Coord::new(3, 5) }).expect("B ray");
        let a_left = idx(&GameEvent::ExplosionTile { pos: Coord::new(2, 3) }).expect("A ray");
        assert!(b_exploded < b_down);
        assert!(b_down < a_left);

        assert!(a.bomb(bomb_b).is_none());
        assert_eq!(a.grid().bomb_count(), 0);
    }

    #[test]
    fn mutual_chain_terminates() {
        let mut a = arena(&["#######", "#.....#", "#######"], &[Coord::new(5, 1)]);
        let first = a.place_bomb(Coord::new(1, 1), 4, 0).expect("placed");
        a.place_bomb(Coord::new(2, 1), 4, 0).expect("placed");
        a.place_bomb(Coord::new(3, 1), 4, 0).expect("placed");
        a.drain_events();
        a.trigger_explosion(first);
        let exploded = a
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::BombExploded { .. }))
            .count();
        assert_eq!(exploded, 3);
        assert_eq!(a.bombs().count(), 0);
    }

    #[test]
    fn ray_force_destroys_immune_powerup_and_continues() {
        let mut a = arena(&["#######", "#.....#", "#######"], &[Coord::new(5, 1)]);
        a.spawn_powerup(Coord::new(2, 1), PowerupKind::Kick);
        let id = a.place_bomb(Coord::new(1, 1), 3, 0).expect("placed");
        a.drain_events();
        a.trigger_explosion(id);
        let events = a.drain_events();
        assert!(a.powerup_at(Coord::new(2, 1)).is_none());
        assert!(tiles(&events).contains(&Coord::new(4, 1)));
        assert!(events.contains(&GameEvent::EntityDestroyed {
            kind: EntityKind::Powerup(PowerupKind::Kick),
            pos: Coord::new(2, 1),
        }));
    }

    #[test]
    fn explosion_tile_respects_immunity_at_center() {
        // A bomb sitting on top of a fresh power-up: the center tile only
        // asks politely, so the power-up survives.
        let mut a = arena(&["#######", "#.....#", "#######"], &[Coord::new(5, 1)]);
        let pos = Coord::new(2, 1);
        a.spawn_powerup(pos, PowerupKind::FireRange);
        let id = a.place_bomb(Coord::new(1, 1), 1, 0).expect("placed");
        // Slide it onto the power-up by hand
        a.grid.move_bomb(id, Coord::new(1, 1), pos);
        if let Some(b) = a.bombs.get_mut(&id) {
            b.position = pos;
        }
        assert_eq!(a.grid().get_cell(pos), Cell::Bomb);

        a.trigger_explosion(id);
        assert!(a.powerup_at(pos).is_some());
        assert_eq!(a.grid().get_cell(pos), Cell::Powerup);
    }

    #[test]
    fn blast_kills_players_on_detonated_cells() {
        let mut a = arena(
            &["#######", "#.....#", "#######"],
            &[Coord::new(3, 1), Coord::new(5, 1)],
        );
        let id = a.place_bomb(Coord::new(1, 1), 2, 0).expect("placed");
        a.drain_events();
        a.trigger_explosion(id);
        let events = a.drain_events();
        assert!(events.contains(&GameEvent::PlayerDied { player_id: 0 }));
        assert!(!events.contains(&GameEvent::PlayerDied { player_id: 1 }));
        assert!(!a.players()[0].alive);
        assert!(a.players()[1].alive);
    }

    #[test]
    fn soft_block_drop_survives_its_own_blast() {
        let cfg = ArenaConfig {
            powerup_drop_chance: 1.0,
            ..Default::default()
        };
        let grid = GridState::from_rows(&["#######", "#..+..#", "#######"]);
        let mut a = Arena::from_grid(cfg, grid, &[Coord::new(5, 1)], 3).expect("valid arena");
        let id = a.place_bomb(Coord::new(1, 1), 3, 0).expect("placed");
        a.trigger_explosion(id);
        assert!(a.powerup_at(Coord::new(3, 1)).is_some());
        assert_eq!(a.grid().get_cell(Coord::new(3, 1)), Cell::Powerup);
    }

    #[test]
    fn owner_gets_bomb_back() {
        let mut a = arena(&["#######", "#.....#", "#######"], &[Coord::new(5, 1)]);
        let id = a.place_bomb(Coord::new(1, 1), 1, 0).expect("placed");
        a.players[0].current_bombs = 1;
        a.trigger_explosion(id);
        assert_eq!(a.players()[0].current_bombs, 0);
    }

    #[test]
    fn footprint_matches_ray_rules() {
        let g = GridState::from_rows(&[
            "#########",
            "#...+...#",
            "#########",
        ]);
        let cells = blast_footprint(&g, Coord::new(2, 1), 5);
        assert_eq!(
            cells,
            vec![
                Coord::new(2, 1),
                Coord::new(1, 1),
                Coord::new(3, 1),
                Coord::new(4, 1),
            ]
        );
    }
}
