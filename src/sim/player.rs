//! Player simulation state
//!
//! Only what the simulation needs: grid position, stats, the active curse
//! and the cooldowns that gate movement and actions. Input decoding
//! (key mapping, gamepads) happens outside the crate.

use serde::{Deserialize, Serialize};

use super::grid::{Coord, Direction, PlayerId};
use crate::config::ArenaConfig;

/// Timed negative effect picked up like a power-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Curse {
    /// Forced overspeed: move cooldown scaled by `curse_speed_multiplier`
    Speed,
    /// Movement directions are reversed
    Invert,
    /// A bomb action fires automatically every `curse_bomb_interval`
    Bombs,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveCurse {
    pub kind: Curse,
    pub remaining: f32,
    /// Countdown to the next automatic action (Bombs only)
    pub auto_timer: f32,
}

/// What happened to a player's timers during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerTick {
    pub curse_expired: Option<Curse>,
    pub auto_act: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub position: Coord,
    pub alive: bool,
    pub max_bombs: u32,
    /// Bombs owned by this player that have not exploded yet
    pub current_bombs: u32,
    pub bomb_range: u32,
    pub has_kick: bool,
    pub has_throw: bool,
    /// Scales the move cooldown (lower = faster)
    pub speed_multiplier: f32,
    pub facing: Direction,
    pub curse: Option<ActiveCurse>,
    /// Seconds until the next move is allowed
    pub move_cooldown: f32,
    /// Seconds until the next bomb action is allowed
    pub action_cooldown: f32,
}

impl Player {
    pub fn new(id: PlayerId, position: Coord, config: &ArenaConfig) -> Self {
        Self {
            id,
            position,
            alive: true,
            max_bombs: config.initial_max_bombs,
            current_bombs: 0,
            bomb_range: config.initial_bomb_range,
            has_kick: false,
            has_throw: false,
            speed_multiplier: config.initial_speed_multiplier,
            facing: Direction::Down,
            curse: None,
            move_cooldown: 0.0,
            action_cooldown: 0.0,
        }
    }

    pub fn active_curse(&self) -> Option<Curse> {
        self.curse.map(|c| c.kind)
    }

    /// Replace any active curse with `kind`, restarting its duration
    pub fn apply_curse(&mut self, kind: Curse, config: &ArenaConfig) {
        self.curse = Some(ActiveCurse {
            kind,
            remaining: config.curse_duration,
            auto_timer: config.curse_bomb_interval,
        });
    }

    /// Cooldown between moves and between bomb actions
    pub fn move_interval(&self, config: &ArenaConfig) -> f32 {
        let base = config.move_cooldown_base * self.speed_multiplier;
        match self.active_curse() {
            Some(Curse::Speed) => base * config.curse_speed_multiplier,
            _ => base,
        }
    }

    /// Map a requested direction through the active curse
    pub fn decode_direction(&self, dir: Direction) -> Direction {
        match self.active_curse() {
            Some(Curse::Invert) => dir.opposite(),
            _ => dir,
        }
    }

    pub fn can_place_more(&self) -> bool {
        self.current_bombs < self.max_bombs
    }

    /// Advance cooldowns and the curse timers by `dt`.
    pub fn tick(&mut self, dt: f32, config: &ArenaConfig) -> PlayerTick {
        self.move_cooldown = (self.move_cooldown - dt).max(0.0);
        self.action_cooldown = (self.action_cooldown - dt).max(0.0);

        let mut result = PlayerTick::default();
        let Some(curse) = self.curse.as_mut() else {
            return result;
        };

        curse.remaining -= dt;
        if curse.remaining <= 0.0 {
            result.curse_expired = Some(curse.kind);
            self.curse = None;
            return result;
        }

        if curse.kind == Curse::Bombs {
            curse.auto_timer -= dt;
            if curse.auto_timer <= 0.0 {
                curse.auto_timer += config.curse_bomb_interval;
                result.auto_act = true;
            }
        }
        result
    }
}
