//! Power-ups and curses
//!
//! A power-up is dropped when a soft block is destroyed. It starts with an
//! immunity window during which ordinary `destroy()` requests are ignored.
//! `force_destroy()` (explosion rays passing through) always wins.
//!
//! `collected` and `destroyed` are first-writer-wins: once either is set,
//! every later collect/destroy request is a no-op.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::{Coord, PowerupId};
use super::player::{Curse, Player};
use crate::config::{ArenaConfig, SpawnWeights};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    ExtraBomb,
    FireRange,
    Speed,
    Throw,
    Kick,
    CurseSpeed,
    CurseInvert,
    CurseBombs,
}

impl PowerupKind {
    /// Cumulative-weight lookup order for drops
    pub const DROP_ORDER: [PowerupKind; 8] = [
        PowerupKind::ExtraBomb,
        PowerupKind::FireRange,
        PowerupKind::Speed,
        PowerupKind::Throw,
        PowerupKind::Kick,
        PowerupKind::CurseSpeed,
        PowerupKind::CurseInvert,
        PowerupKind::CurseBombs,
    ];

    /// The curse this kind inflicts, if any
    pub fn curse(self) -> Option<Curse> {
        match self {
            PowerupKind::CurseSpeed => Some(Curse::Speed),
            PowerupKind::CurseInvert => Some(Curse::Invert),
            PowerupKind::CurseBombs => Some(Curse::Bombs),
            _ => None,
        }
    }

    pub fn is_curse(self) -> bool {
        self.curse().is_some()
    }

    /// Pick a kind for a uniform roll in `[0, 1)`.
    ///
    /// Walks the weighted kinds in declared order; anything past the last
    /// weighted bucket falls through to CurseBombs, even when the weights
    /// sum to less than one.
    pub fn from_roll(roll: f32, weights: &SpawnWeights) -> Self {
        let mut cumulative = 0.0;
        for (kind, weight) in Self::DROP_ORDER.iter().zip(weights.ordered()) {
            cumulative += weight;
            if roll < cumulative {
                return *kind;
            }
        }
        PowerupKind::CurseBombs
    }

    /// Apply this kind's effect to `player`
    pub fn apply(self, player: &mut Player, config: &ArenaConfig) {
        match self {
            PowerupKind::ExtraBomb => player.max_bombs += 1,
            PowerupKind::Kick => player.has_kick = true,
            PowerupKind::FireRange => player.bomb_range += 1,
            PowerupKind::Speed => {
                player.speed_multiplier =
                    (player.speed_multiplier * config.speed_boost).max(config.min_speed_multiplier);
            }
            PowerupKind::Throw => player.has_throw = true,
            PowerupKind::CurseSpeed | PowerupKind::CurseInvert | PowerupKind::CurseBombs => {
                if let Some(curse) = self.curse() {
                    player.apply_curse(curse, config);
                }
            }
        }
    }
}

/// Roll for a drop when a soft block breaks: first the drop chance, then
/// the kind. Always draws the kind roll only after a successful drop roll.
pub fn roll_drop<R: Rng + ?Sized>(rng: &mut R, config: &ArenaConfig) -> Option<PowerupKind> {
    if rng.random::<f32>() >= config.powerup_drop_chance {
        return None;
    }
    let roll = rng.random::<f32>();
    Some(PowerupKind::from_roll(roll, &config.spawn_weights))
}

/// A collectible on the grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Powerup {
    pub id: PowerupId,
    pub position: Coord,
    pub kind: PowerupKind,
    /// Seconds of immunity left; immune while > 0
    pub immunity_remaining: f32,
    pub collected: bool,
    pub destroyed: bool,
}

impl Powerup {
    pub fn new(id: PowerupId, position: Coord, kind: PowerupKind, immunity: f32) -> Self {
        Self {
            id,
            position,
            kind,
            immunity_remaining: immunity,
            collected: false,
            destroyed: false,
        }
    }

    pub fn is_immune(&self) -> bool {
        self.immunity_remaining > 0.0
    }

    /// Still in play (neither collected nor destroyed)
    pub fn is_live(&self) -> bool {
        !self.collected && !self.destroyed
    }

    pub fn tick(&mut self, dt: f32) {
        if self.immunity_remaining > 0.0 {
            self.immunity_remaining = (self.immunity_remaining - dt).max(0.0);
        }
    }

    /// Explosion-tile contact. Rejected while immune.
    /// Returns true if this call destroyed the power-up.
    pub fn destroy(&mut self) -> bool {
        if self.is_immune() {
            return false;
        }
        self.force_destroy()
    }

    /// Destroy regardless of immunity. Returns true if this call destroyed it.
    pub fn force_destroy(&mut self) -> bool {
        if !self.is_live() {
            return false;
        }
        self.destroyed = true;
        true
    }

    /// Player contact. Returns true if this call collected it.
    pub fn collect(&mut self) -> bool {
        if !self.is_live() {
            return false;
        }
        self.collected = true;
        true
    }
}
