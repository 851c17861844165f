//! Blast Arena - a grid-based bomb arena simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, bombs, explosions, power-ups, players)
//! - `config`: Read-only tunables for one arena
//! - `error`: Configuration errors
//!
//! Rendering, input polling and window lifecycle live outside this crate.
//! The simulation only consumes a time delta and decoded player intents,
//! and produces a stream of [`sim::GameEvent`]s.

pub mod config;
pub mod error;
pub mod sim;

pub use config::{ArenaConfig, SpawnWeights};
pub use error::ConfigError;

use glam::Vec2;

use sim::Coord;

/// Default tunables
pub mod consts {
    /// Arena dimensions in tiles (odd sizes give a symmetric pillar grid)
    pub const GRID_WIDTH: i32 = 15;
    pub const GRID_HEIGHT: i32 = 13;
    /// Accepted range for either dimension
    pub const MIN_GRID_DIMENSION: i32 = 5;
    pub const MAX_GRID_DIMENSION: i32 = 1024;
    /// Tile edge length in world units (presentation conversion only)
    pub const TILE_SIZE: f32 = 32.0;
    pub const PLAYER_COUNT: usize = 4;

    /// Bomb timings (seconds)
    pub const FUSE_DURATION: f32 = 3.0;
    pub const KICK_STEP_DELAY: f32 = 0.1;
    pub const FLY_STEP_DELAY: f32 = 0.05;
    /// Tiles a thrown bomb travels before landing
    pub const THROW_DISTANCE: u32 = 4;

    /// How long a freshly dropped power-up ignores explosion tiles
    pub const POWERUP_IMMUNITY: f32 = 1.0;
    /// How long an explosion tile stays visible
    pub const EXPLOSION_LIFETIME: f32 = 0.5;

    /// Player movement
    pub const MOVE_COOLDOWN_BASE: f32 = 0.15;
    /// Speed power-up multiplier (lower = faster)
    pub const SPEED_BOOST: f32 = 0.85;
    pub const MIN_SPEED_MULTIPLIER: f32 = 0.4;

    /// Arena fill and drop probabilities
    pub const SOFT_BLOCK_CHANCE: f32 = 0.7;
    pub const POWERUP_DROP_CHANCE: f32 = 0.3;

    /// Drop weights, in declared kind order. CurseBombs takes the remainder.
    pub const WEIGHT_EXTRA_BOMB: f32 = 0.2;
    pub const WEIGHT_FIRE_RANGE: f32 = 0.2;
    pub const WEIGHT_SPEED: f32 = 0.15;
    pub const WEIGHT_THROW: f32 = 0.1;
    pub const WEIGHT_KICK: f32 = 0.1;
    pub const WEIGHT_CURSE_SPEED: f32 = 0.08;
    pub const WEIGHT_CURSE_INVERT: f32 = 0.08;

    /// Curses
    pub const CURSE_DURATION: f32 = 10.0;
    /// Move cooldown multiplier while CurseSpeed is active (forced overspeed)
    pub const CURSE_SPEED_MULTIPLIER: f32 = 0.3;
    /// Auto-action interval while CurseBombs is active
    pub const CURSE_BOMB_INTERVAL: f32 = 1.0;

    /// Starting player stats
    pub const INITIAL_MAX_BOMBS: u32 = 1;
    pub const INITIAL_BOMB_RANGE: u32 = 2;
    pub const INITIAL_SPEED_MULTIPLIER: f32 = 1.0;
}

/// Convert a grid coordinate to the world-space center of its tile
#[inline]
pub fn grid_to_world(pos: Coord, tile_size: f32) -> Vec2 {
    Vec2::new(
        (pos.x as f32 + 0.5) * tile_size,
        (pos.y as f32 + 0.5) * tile_size,
    )
}

/// Convert a world-space point to the grid coordinate of the tile containing it
#[inline]
pub fn world_to_grid(point: Vec2, tile_size: f32) -> Coord {
    Coord::new(
        (point.x / tile_size).floor() as i32,
        (point.y / tile_size).floor() as i32,
    )
}
