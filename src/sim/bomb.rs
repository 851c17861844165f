//! Bomb entity and motion rules
//!
//! State machine:
//!
//! ```text
//!   Stationary ──kick──▶ Kicked ──blocked──▶ Stationary
//!   Stationary ──throw─▶ Thrown ──land────▶ Stationary
//!   (any non-terminal) ──explode──▶ Exploded (terminal)
//! ```
//!
//! A thrown bomb is airborne: it is not registered in the grid until it
//! lands. If the fuse runs out mid-flight the explosion is deferred until
//! landing.
//!
//! The step rules here are pure functions over `&GridState`. Applying
//! them (grid registry updates, events) is the arena's job.

use serde::{Deserialize, Serialize};

use super::grid::{BombId, Cell, Coord, Direction, GridState, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motion {
    Stationary,
    Kicked(Direction),
    Thrown {
        direction: Direction,
        /// Distance budget left; spent only on real progress
        tiles_remaining: u32,
        /// Set after hopping onto a bomb that cannot be cleared
        land_next: bool,
    },
}

/// Result of counting down the fuse for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuseState {
    Burning,
    /// Fuse expired while airborne; explode on landing
    Deferred,
    Expired,
}

/// Next move of a kicked bomb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KickStep {
    Slide(Coord),
    Stop,
}

/// Next move of a thrown bomb
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightStep {
    /// Fly into `to`, spending one tile of distance if `consume`
    Fly { to: Coord, consume: bool },
    /// Move onto a blocking bomb's cell and land there on the next step
    Stack(Coord),
    /// Land at the current cell
    Land,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bomb {
    pub id: BombId,
    pub position: Coord,
    pub owner: PlayerId,
    pub range: u32,
    pub fuse_remaining: f32,
    pub motion: Motion,
    /// Countdown to the next kick/flight step
    pub step_timer: f32,
    pub has_exploded: bool,
    pub explode_on_landing: bool,
}

impl Bomb {
    pub fn new(id: BombId, position: Coord, owner: PlayerId, range: u32, fuse: f32) -> Self {
        Self {
            id,
            position,
            owner,
            range,
            fuse_remaining: fuse,
            motion: Motion::Stationary,
            step_timer: 0.0,
            has_exploded: false,
            explode_on_landing: false,
        }
    }

    pub fn is_airborne(&self) -> bool {
        matches!(self.motion, Motion::Thrown { .. })
    }

    pub fn is_stationary(&self) -> bool {
        self.motion == Motion::Stationary
    }

    /// Count the fuse down by `dt`.
    pub fn tick_fuse(&mut self, dt: f32) -> FuseState {
        if self.has_exploded {
            return FuseState::Burning;
        }
        self.fuse_remaining -= dt;
        if self.fuse_remaining > 0.0 {
            return FuseState::Burning;
        }
        if self.is_airborne() {
            self.explode_on_landing = true;
            FuseState::Deferred
        } else {
            FuseState::Expired
        }
    }
}

/// Where a kicked bomb at `pos` goes next
pub fn kick_step(grid: &GridState, pos: Coord, dir: Direction) -> KickStep {
    let next = pos.step(dir);
    if grid.can_bomb_move_to(next) {
        KickStep::Slide(next)
    } else {
        KickStep::Stop
    }
}

/// Where a thrown bomb above `pos` goes next.
///
/// - hard block or arena edge ahead: land here
/// - bomb ahead with open ground behind it: hop onto it for free
/// - bomb ahead with a wall behind it: stack onto it
/// - anything else: fly in, spending one tile
///
/// With no distance left the bomb lands where it is, soft block or not.
pub fn flight_step(
    grid: &GridState,
    pos: Coord,
    dir: Direction,
    tiles_remaining: u32,
) -> FlightStep {
    if tiles_remaining == 0 {
        return FlightStep::Land;
    }

    let next = pos.step(dir);
    match grid.get_cell(next) {
        Cell::HardBlock => FlightStep::Land,
        Cell::Bomb => {
            let beyond = next.step(dir);
            if grid.in_bounds(beyond) && grid.get_cell(beyond) != Cell::HardBlock {
                FlightStep::Fly { to: next, consume: false }
            } else {
                FlightStep::Stack(next)
            }
        }
        Cell::Empty | Cell::SoftBlock | Cell::Powerup => FlightStep::Fly {
            to: next,
            consume: true,
        },
    }
}
