//! Arena state and core simulation types
//!
//! `Arena` owns everything a round needs: the grid, the bomb and power-up
//! tables, the players, live explosion tiles, the seeded RNG and the
//! outgoing event queue. Entities are stored in id-keyed tables and found
//! through the grid's coordinate registries, so recursive explosion
//! handlers can look them up and mutate them without holding references.

use std::collections::BTreeMap;

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::arena::{generate_grid, spawn_point};
use super::bomb::{Bomb, Motion};
use super::explosion::ExplosionTile;
use super::grid::{BombId, Cell, Coord, Direction, GridState, PlayerId, PowerupId};
use super::player::{Curse, Player};
use super::powerup::{Powerup, PowerupKind};
use crate::config::ArenaConfig;
use crate::error::ConfigError;

/// Something a renderer can draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Bomb,
    Powerup(PowerupKind),
    SoftBlock,
    Explosion,
}

/// Events emitted during simulation, in the order the operations happened.
/// The presentation layer consumes these for animation/sound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    EntitySpawned { kind: EntityKind, pos: Coord },
    EntityMoved { kind: EntityKind, old: Coord, new: Coord },
    EntityDestroyed { kind: EntityKind, pos: Coord },
    ExplosionTile { pos: Coord },
    BombPlaced { bomb_id: BombId, player_id: PlayerId, pos: Coord },
    BombKicked { bomb_id: BombId, direction: Direction },
    BombThrown { bomb_id: BombId, direction: Direction },
    BombLanded { bomb_id: BombId, pos: Coord },
    BombExploded { bomb_id: BombId, pos: Coord },
    PlayerMoved { player_id: PlayerId, old: Coord, new: Coord },
    PlayerDied { player_id: PlayerId },
    PowerupApplied { player_id: PlayerId, kind: PowerupKind },
    CurseExpired { player_id: PlayerId, curse: Curse },
    RoundOver { winner: Option<PlayerId> },
}

/// One decoded player input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    Move(Direction),
    /// Place a bomb, or throw the one underfoot
    Act,
}

/// Inputs queued for one player until the next `advance`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PendingIntent {
    pub movement: Option<Direction>,
    pub act: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    Playing,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Ongoing,
    Winner(PlayerId),
    Draw,
}

/// Simulation root
#[derive(Debug, Clone)]
pub struct Arena {
    pub(crate) config: ArenaConfig,
    pub(crate) seed: u64,
    pub(crate) rng: Pcg32,
    pub(crate) grid: GridState,
    /// Live bombs by id (ascending id = placement order)
    pub(crate) bombs: BTreeMap<BombId, Bomb>,
    pub(crate) powerups: BTreeMap<PowerupId, Powerup>,
    pub(crate) players: Vec<Player>,
    pub(crate) explosions: Vec<ExplosionTile>,
    pub(crate) intents: Vec<PendingIntent>,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) phase: RoundPhase,
    /// Seconds simulated so far
    pub(crate) elapsed: f32,
    next_id: u32,
}

impl Arena {
    /// Generate a fresh arena from `config` and `seed`, with one player per
    /// spawn corner up to `config.player_count`.
    pub fn new(config: ArenaConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = Pcg32::seed_from_u64(seed);
        let grid = generate_grid(&config, &mut rng)?;
        let spawns: Vec<Coord> = (0..config.player_count)
            .map(|i| spawn_point(i, config.width, config.height))
            .collect();
        log::info!("Arena created with seed: {}", seed);
        Ok(Self::assemble(config, seed, rng, grid, &spawns))
    }

    /// Build an arena around a hand-made grid. The config's dimensions and
    /// player count are taken from `grid` and `spawns`.
    pub fn from_grid(
        config: ArenaConfig,
        grid: GridState,
        spawns: &[Coord],
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let config = ArenaConfig {
            width: grid.width(),
            height: grid.height(),
            player_count: spawns.len(),
            ..config
        };
        config.validate()?;
        let rng = Pcg32::seed_from_u64(seed);
        Ok(Self::assemble(config, seed, rng, grid, spawns))
    }

    fn assemble(
        config: ArenaConfig,
        seed: u64,
        rng: Pcg32,
        grid: GridState,
        spawns: &[Coord],
    ) -> Self {
        let players: Vec<Player> = spawns
            .iter()
            .enumerate()
            .map(|(id, &pos)| Player::new(id, pos, &config))
            .collect();
        let mut arena = Self {
            intents: vec![PendingIntent::default(); players.len()],
            config,
            seed,
            rng,
            grid,
            bombs: BTreeMap::new(),
            powerups: BTreeMap::new(),
            players,
            explosions: Vec::new(),
            events: Vec::new(),
            phase: RoundPhase::Playing,
            elapsed: 0.0,
            next_id: 1,
        };
        arena.sync_player_index();
        arena
    }

    /// Allocate a new entity ID
    pub(crate) fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take every event emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Rebuild the grid's living-player position index
    pub(crate) fn sync_player_index(&mut self) {
        let positions = self
            .players
            .iter()
            .filter(|p| p.alive)
            .map(|p| (p.id, p.position))
            .collect();
        self.grid.set_player_positions(positions);
    }

    // ── Queries ──

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.alive)
    }

    pub fn bomb(&self, id: BombId) -> Option<&Bomb> {
        self.bombs.get(&id)
    }

    pub fn bombs(&self) -> impl Iterator<Item = &Bomb> {
        self.bombs.values()
    }

    /// Topmost grounded bomb at `pos`
    pub fn bomb_at(&self, pos: Coord) -> Option<&Bomb> {
        self.grid.bomb_at(pos).and_then(|id| self.bombs.get(&id))
    }

    pub fn powerup(&self, id: PowerupId) -> Option<&Powerup> {
        self.powerups.get(&id)
    }

    pub fn powerup_at(&self, pos: Coord) -> Option<&Powerup> {
        self.grid.powerup_at(pos).and_then(|id| self.powerups.get(&id))
    }

    pub fn explosions(&self) -> &[ExplosionTile] {
        &self.explosions
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Who is left standing. Single-player arenas are ongoing until that
    /// player dies.
    pub fn outcome(&self) -> Outcome {
        let mut alive = self.alive_players();
        match (alive.next(), alive.next()) {
            (None, _) => Outcome::Draw,
            (Some(p), None) if self.players.len() > 1 => Outcome::Winner(p.id),
            _ => Outcome::Ongoing,
        }
    }

    // ── Input ──

    /// Queue one decoded input for `player_id`. A later move in the same
    /// tick replaces an earlier one.
    pub fn submit_intent(&mut self, player_id: PlayerId, intent: Intent) {
        let Some(pending) = self.intents.get_mut(player_id) else {
            log::debug!("Intent for unknown player {} ignored", player_id);
            return;
        };
        match intent {
            Intent::Move(dir) => pending.movement = Some(dir),
            Intent::Act => pending.act = true,
        }
    }

    // ── Bomb lifecycle ──

    /// Create a grounded bomb at `pos`. Rejected (logged, no state change)
    /// unless the cell is empty with no bomb registered.
    pub fn place_bomb(&mut self, pos: Coord, range: u32, owner: PlayerId) -> Option<BombId> {
        if !self.grid.can_place_bomb(pos) {
            log::debug!("Bomb placement at {:?} rejected: cell {:?}", pos, self.grid.get_cell(pos));
            return None;
        }
        let id = self.next_entity_id();
        let bomb = Bomb::new(id, pos, owner, range, self.config.fuse_duration);
        self.bombs.insert(id, bomb);
        self.grid.register_bomb(pos, id);
        self.emit(GameEvent::EntitySpawned { kind: EntityKind::Bomb, pos });
        Some(id)
    }

    /// Set a grounded, stationary bomb sliding in `dir`
    pub fn kick_bomb(&mut self, id: BombId, dir: Direction) -> bool {
        let delay = self.config.kick_step_delay;
        let Some(bomb) = self.bombs.get_mut(&id) else {
            log::debug!("Kick rejected: no bomb {}", id);
            return false;
        };
        if bomb.has_exploded || !bomb.is_stationary() {
            log::debug!("Kick rejected: bomb {} is {:?}", id, bomb.motion);
            return false;
        }
        bomb.motion = Motion::Kicked(dir);
        bomb.step_timer = delay;
        self.emit(GameEvent::BombKicked { bomb_id: id, direction: dir });
        true
    }

    /// Lift a grounded, stationary bomb off the grid and launch it
    pub fn throw_bomb(&mut self, id: BombId, dir: Direction) -> bool {
        let (delay, distance) = (self.config.fly_step_delay, self.config.throw_distance);
        let Some(bomb) = self.bombs.get_mut(&id) else {
            log::debug!("Throw rejected: no bomb {}", id);
            return false;
        };
        if bomb.has_exploded || !bomb.is_stationary() {
            log::debug!("Throw rejected: bomb {} is {:?}", id, bomb.motion);
            return false;
        }
        bomb.motion = Motion::Thrown {
            direction: dir,
            tiles_remaining: distance,
            land_next: false,
        };
        bomb.step_timer = delay;
        let pos = bomb.position;
        self.grid.unregister_bomb(pos, id);
        self.emit(GameEvent::BombThrown { bomb_id: id, direction: dir });
        true
    }

    // ── Power-up lifecycle ──

    /// Drop a power-up at `pos` with a fresh immunity window
    pub fn spawn_powerup(&mut self, pos: Coord, kind: PowerupKind) -> PowerupId {
        let id = self.next_entity_id();
        let powerup = Powerup::new(id, pos, kind, self.config.powerup_immunity);
        self.powerups.insert(id, powerup);
        self.grid.register_powerup(pos, id);
        log::debug!("Power-up {:?} spawned at {:?}", kind, pos);
        self.emit(GameEvent::EntitySpawned {
            kind: EntityKind::Powerup(kind),
            pos,
        });
        id
    }

    /// Destroy the power-up at `pos`. `forced` bypasses immunity.
    /// Returns true if a power-up left play.
    pub(crate) fn destroy_powerup_at(&mut self, pos: Coord, forced: bool) -> bool {
        let Some(id) = self.grid.powerup_at(pos) else {
            return false;
        };
        let Some(powerup) = self.powerups.get_mut(&id) else {
            return false;
        };
        let destroyed = if forced {
            powerup.force_destroy()
        } else {
            powerup.destroy()
        };
        if !destroyed {
            log::debug!("Power-up at {:?} survived (immune)", pos);
            return false;
        }
        let kind = powerup.kind;
        self.powerups.remove(&id);
        self.grid.unregister_powerup(pos);
        self.emit(GameEvent::EntityDestroyed {
            kind: EntityKind::Powerup(kind),
            pos,
        });
        true
    }

    /// Player contact with the power-up at their cell. Bomb-covered
    /// power-ups cannot be reached.
    pub(crate) fn collect_powerup(&mut self, player_id: PlayerId) -> bool {
        let Some(pos) = self.players.get(player_id).filter(|p| p.alive).map(|p| p.position) else {
            return false;
        };
        if self.grid.get_cell(pos) != Cell::Powerup {
            return false;
        }
        let Some(id) = self.grid.powerup_at(pos) else {
            return false;
        };
        let Some(powerup) = self.powerups.get_mut(&id) else {
            return false;
        };
        if !powerup.collect() {
            return false;
        }
        let kind = powerup.kind;
        self.powerups.remove(&id);
        self.grid.unregister_powerup(pos);
        kind.apply(&mut self.players[player_id], &self.config);
        log::debug!("Player {} collected {:?}", player_id, kind);
        self.emit(GameEvent::PowerupApplied { player_id, kind });
        self.emit(GameEvent::EntityDestroyed {
            kind: EntityKind::Powerup(kind),
            pos,
        });
        true
    }

    /// Kill every living player at `pos`
    pub(crate) fn kill_players_at(&mut self, pos: Coord) {
        let mut killed = Vec::new();
        for player in self.players.iter_mut().filter(|p| p.alive && p.position == pos) {
            player.alive = false;
            killed.push(player.id);
        }
        if killed.is_empty() {
            return;
        }
        for player_id in killed {
            log::debug!("Player {} caught in blast at {:?}", player_id, pos);
            self.emit(GameEvent::PlayerDied { player_id });
        }
        self.sync_player_index();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_arena() -> Arena {
        let grid = GridState::from_rows(&[
            "#######",
            "#.....#",
            "#.#.#.#",
            "#.....#",
            "#######",
        ]);
        Arena::from_grid(
            ArenaConfig::default(),
            grid,
            &[Coord::new(1, 1), Coord::new(5, 3)],
            1,
        )
        .expect("valid arena")
    }

    #[test]
    fn new_arena_places_players_on_spawns() {
        let arena = Arena::new(ArenaConfig::default(), 99).expect("valid config");
        assert_eq!(arena.players().len(), 4);
        assert_eq!(arena.players()[0].position, Coord::new(1, 1));
        assert_eq!(arena.players()[3].position, Coord::new(13, 11));
        for p in arena.players() {
            assert!(arena.grid().is_walkable(p.position));
        }
    }

    #[test]
    fn new_arena_rejects_bad_config_before_building() {
        let config = ArenaConfig {
            height: 2,
            ..Default::default()
        };
        assert!(matches!(
            Arena::new(config, 0),
            Err(ConfigError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn new_arena_rejects_oversized_grid() {
        let config = ArenaConfig {
            width: 100_000,
            height: 100_000,
            ..Default::default()
        };
        assert!(matches!(
            Arena::new(config, 0),
            Err(ConfigError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn place_bomb_rejects_occupied_cells() {
        let mut arena = open_arena();
        let pos = Coord::new(3, 1);
        assert!(arena.place_bomb(pos, 2, 0).is_some());
        assert!(arena.place_bomb(pos, 2, 0).is_none());
        assert!(arena.place_bomb(Coord::new(2, 2), 2, 0).is_none());
        assert!(arena.place_bomb(Coord::new(-1, 0), 2, 0).is_none());
        assert_eq!(arena.bombs().count(), 1);
    }

    #[test]
    fn throw_lifts_bomb_off_grid() {
        let mut arena = open_arena();
        let pos = Coord::new(3, 1);
        let id = arena.place_bomb(pos, 2, 0).expect("placed");
        assert!(arena.throw_bomb(id, Direction::Right));
        assert_eq!(arena.grid().get_cell(pos), Cell::Empty);
        assert!(arena.bomb(id).is_some_and(|b| b.is_airborne()));
        // Already airborne: neither kick nor throw again
        assert!(!arena.kick_bomb(id, Direction::Left));
        assert!(!arena.throw_bomb(id, Direction::Left));
    }

    #[test]
    fn collect_applies_effect_once() {
        let mut arena = open_arena();
        let pos = arena.players()[0].position;
        arena.spawn_powerup(pos, PowerupKind::ExtraBomb);
        assert!(arena.collect_powerup(0));
        assert!(!arena.collect_powerup(0));
        assert_eq!(arena.players()[0].max_bombs, arena.config().initial_max_bombs + 1);
        assert_eq!(arena.grid().get_cell(pos), Cell::Empty);
        assert!(arena.powerup_at(pos).is_none());
    }

    #[test]
    fn immune_powerup_survives_plain_destroy() {
        let mut arena = open_arena();
        let pos = Coord::new(3, 3);
        arena.spawn_powerup(pos, PowerupKind::Kick);
        assert!(!arena.destroy_powerup_at(pos, false));
        assert!(arena.powerup_at(pos).is_some());
        assert!(arena.destroy_powerup_at(pos, true));
        assert!(arena.powerup_at(pos).is_none());
        assert_eq!(arena.grid().get_cell(pos), Cell::Empty);
    }

    #[test]
    fn outcome_tracks_survivors() {
        let mut arena = open_arena();
        assert_eq!(arena.outcome(), Outcome::Ongoing);
        arena.kill_players_at(Coord::new(5, 3));
        assert_eq!(arena.outcome(), Outcome::Winner(0));
        arena.kill_players_at(Coord::new(1, 1));
        assert_eq!(arena.outcome(), Outcome::Draw);
    }

    #[test]
    fn intents_for_unknown_players_are_ignored() {
        let mut arena = open_arena();
        arena.submit_intent(17, Intent::Act);
        assert!(arena.intents.iter().all(|i| !i.act));
    }
}
