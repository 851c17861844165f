//! Arena tunables
//!
//! One immutable `ArenaConfig` is handed to the simulation root at
//! construction. All fields have defaults (see [`crate::consts`]), so a
//! partial JSON object only overrides what it names.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Power-up drop weights, in declared kind order.
///
/// CurseBombs has no weight of its own: it absorbs whatever probability
/// the other seven leave over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnWeights {
    pub extra_bomb: f32,
    pub fire_range: f32,
    pub speed: f32,
    pub throw: f32,
    pub kick: f32,
    pub curse_speed: f32,
    pub curse_invert: f32,
}

impl Default for SpawnWeights {
    fn default() -> Self {
        Self {
            extra_bomb: WEIGHT_EXTRA_BOMB,
            fire_range: WEIGHT_FIRE_RANGE,
            speed: WEIGHT_SPEED,
            throw: WEIGHT_THROW,
            kick: WEIGHT_KICK,
            curse_speed: WEIGHT_CURSE_SPEED,
            curse_invert: WEIGHT_CURSE_INVERT,
        }
    }
}

impl SpawnWeights {
    /// Weights in declared order (ExtraBomb, FireRange, Speed, Throw, Kick,
    /// CurseSpeed, CurseInvert)
    pub fn ordered(&self) -> [f32; 7] {
        [
            self.extra_bomb,
            self.fire_range,
            self.speed,
            self.throw,
            self.kick,
            self.curse_speed,
            self.curse_invert,
        ]
    }
}

/// Read-only tunables for one arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    // === Layout ===
    pub width: i32,
    pub height: i32,
    /// World units per tile, used only by coordinate conversion
    pub tile_size: f32,
    pub player_count: usize,

    // === Bombs ===
    pub fuse_duration: f32,
    pub kick_step_delay: f32,
    pub fly_step_delay: f32,
    pub throw_distance: u32,
    pub explosion_lifetime: f32,

    // === Power-ups ===
    pub powerup_immunity: f32,
    pub soft_block_chance: f32,
    pub powerup_drop_chance: f32,
    pub spawn_weights: SpawnWeights,
    pub speed_boost: f32,
    pub min_speed_multiplier: f32,

    // === Curses ===
    pub curse_duration: f32,
    pub curse_speed_multiplier: f32,
    pub curse_bomb_interval: f32,

    // === Players ===
    pub move_cooldown_base: f32,
    pub initial_max_bombs: u32,
    pub initial_bomb_range: u32,
    pub initial_speed_multiplier: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            tile_size: TILE_SIZE,
            player_count: PLAYER_COUNT,

            fuse_duration: FUSE_DURATION,
            kick_step_delay: KICK_STEP_DELAY,
            fly_step_delay: FLY_STEP_DELAY,
            throw_distance: THROW_DISTANCE,
            explosion_lifetime: EXPLOSION_LIFETIME,

            powerup_immunity: POWERUP_IMMUNITY,
            soft_block_chance: SOFT_BLOCK_CHANCE,
            powerup_drop_chance: POWERUP_DROP_CHANCE,
            spawn_weights: SpawnWeights::default(),
            speed_boost: SPEED_BOOST,
            min_speed_multiplier: MIN_SPEED_MULTIPLIER,

            curse_duration: CURSE_DURATION,
            curse_speed_multiplier: CURSE_SPEED_MULTIPLIER,
            curse_bomb_interval: CURSE_BOMB_INTERVAL,

            move_cooldown_base: MOVE_COOLDOWN_BASE,
            initial_max_bombs: INITIAL_MAX_BOMBS,
            initial_bomb_range: INITIAL_BOMB_RANGE,
            initial_speed_multiplier: INITIAL_SPEED_MULTIPLIER,
        }
    }
}

impl ArenaConfig {
    /// Parse a (possibly partial) JSON override on top of the defaults.
    /// The result is validated before it is returned.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ArenaConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every tunable. Called before any entity is created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dimensions = MIN_GRID_DIMENSION..=MAX_GRID_DIMENSION;
        if !dimensions.contains(&self.width) || !dimensions.contains(&self.height) {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.tile_size > 0.0) {
            return Err(ConfigError::InvalidTileSize(self.tile_size));
        }
        if !(1..=4).contains(&self.player_count) {
            return Err(ConfigError::InvalidPlayerCount(self.player_count));
        }
        if self.throw_distance == 0 {
            return Err(ConfigError::InvalidThrowDistance(self.throw_distance));
        }

        let durations = [
            ("fuse_duration", self.fuse_duration),
            ("kick_step_delay", self.kick_step_delay),
            ("fly_step_delay", self.fly_step_delay),
            ("explosion_lifetime", self.explosion_lifetime),
            ("powerup_immunity", self.powerup_immunity),
            ("curse_duration", self.curse_duration),
            ("curse_bomb_interval", self.curse_bomb_interval),
            ("move_cooldown_base", self.move_cooldown_base),
        ];
        for (name, value) in durations {
            if !(value > 0.0) {
                return Err(ConfigError::InvalidDuration { name, value });
            }
        }

        let weights = self.spawn_weights;
        let probabilities = [
            ("soft_block_chance", self.soft_block_chance),
            ("powerup_drop_chance", self.powerup_drop_chance),
            ("spawn_weights.extra_bomb", weights.extra_bomb),
            ("spawn_weights.fire_range", weights.fire_range),
            ("spawn_weights.speed", weights.speed),
            ("spawn_weights.throw", weights.throw),
            ("spawn_weights.kick", weights.kick),
            ("spawn_weights.curse_speed", weights.curse_speed),
            ("spawn_weights.curse_invert", weights.curse_invert),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidProbability { name, value });
            }
        }

        if self.initial_max_bombs == 0 {
            return Err(ConfigError::InvalidStat { name: "initial_max_bombs" });
        }
        if self.initial_bomb_range == 0 {
            return Err(ConfigError::InvalidStat { name: "initial_bomb_range" });
        }
        let multipliers = [
            ("initial_speed_multiplier", self.initial_speed_multiplier),
            ("speed_boost", self.speed_boost),
            ("min_speed_multiplier", self.min_speed_multiplier),
            ("curse_speed_multiplier", self.curse_speed_multiplier),
        ];
        for (name, value) in multipliers {
            if !(value > 0.0) {
                return Err(ConfigError::InvalidStat { name });
            }
        }

        Ok(())
    }
}
