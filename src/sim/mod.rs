//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time advances only through `Arena::advance(dt)`
//! - Seeded RNG only
//! - Stable iteration order (by entity ID, players by index)
//! - No rendering or platform dependencies

pub mod arena;
pub mod bomb;
pub mod explosion;
pub mod grid;
pub mod player;
pub mod powerup;
pub mod state;
pub mod tick;

pub use arena::{SPAWN_SLOTS, generate_grid, spawn_point, spawn_zone};
pub use bomb::{Bomb, FlightStep, FuseState, KickStep, Motion, flight_step, kick_step};
pub use explosion::{ExplosionTile, RayStep, blast_footprint, classify};
pub use grid::{BombId, Cell, Coord, Direction, GridState, PlayerId, PowerupId};
pub use player::{ActiveCurse, Curse, Player, PlayerTick};
pub use powerup::{Powerup, PowerupKind, roll_drop};
pub use state::{Arena, EntityKind, GameEvent, Intent, Outcome, RoundPhase};
