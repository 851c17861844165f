//! Arena generation
//!
//! Deterministic template plus seeded random fill:
//!   1. border ring → HardBlock
//!   2. interior cells with even x and even y → HardBlock (pillar grid)
//!   3. L-shaped spawn zones at the four corners stay clear
//!   4. every other cell → SoftBlock with `soft_block_chance`, else Empty
//!
//! Cells are visited row by row, so one seed always yields one layout.

use rand::Rng;

use super::grid::{Cell, Coord, GridState};
use crate::config::ArenaConfig;
use crate::error::ConfigError;

/// Number of spawn corners
pub const SPAWN_SLOTS: usize = 4;

/// Spawn point for a player index: the four corners inset by one tile.
/// Indices past the last slot clamp to the last slot.
pub fn spawn_point(index: usize, width: i32, height: i32) -> Coord {
    let corners = [
        Coord::new(1, 1),
        Coord::new(width - 2, 1),
        Coord::new(1, height - 2),
        Coord::new(width - 2, height - 2),
    ];
    corners[index.min(SPAWN_SLOTS - 1)]
}

/// The three protected cells around a spawn point: the point itself plus
/// one horizontal and one vertical neighbor toward the arena interior.
pub fn spawn_zone(index: usize, width: i32, height: i32) -> [Coord; 3] {
    let corner = spawn_point(index, width, height);
    let dx = if corner.x == 1 { 1 } else { -1 };
    let dy = if corner.y == 1 { 1 } else { -1 };
    [
        corner,
        Coord::new(corner.x + dx, corner.y),
        Coord::new(corner.x, corner.y + dy),
    ]
}

#[inline]
fn is_border(pos: Coord, width: i32, height: i32) -> bool {
    pos.x == 0 || pos.y == 0 || pos.x == width - 1 || pos.y == height - 1
}

#[inline]
fn is_pillar(pos: Coord) -> bool {
    pos.x % 2 == 0 && pos.y % 2 == 0
}

/// Build the initial grid for `config`. Fails before touching the RNG if
/// the configuration is malformed.
pub fn generate_grid<R: Rng + ?Sized>(
    config: &ArenaConfig,
    rng: &mut R,
) -> Result<GridState, ConfigError> {
    config.validate()?;

    let (width, height) = (config.width, config.height);
    let mut grid = GridState::new(width, height);

    for slot in 0..SPAWN_SLOTS {
        for pos in spawn_zone(slot, width, height) {
            grid.mark_spawn_zone(pos);
        }
    }

    for y in 0..height {
        for x in 0..width {
            let pos = Coord::new(x, y);
            let cell = if is_border(pos, width, height) || is_pillar(pos) {
                Cell::HardBlock
            } else if grid.is_spawn_zone(pos) {
                Cell::Empty
            } else if rng.random::<f32>() < config.soft_block_chance {
                Cell::SoftBlock
            } else {
                Cell::Empty
            };
            grid.set_cell(pos, cell);
        }
    }

    log::info!(
        "Generated {}x{} arena: {} soft blocks, {} hard blocks",
        width,
        height,
        grid.count_cells(Cell::SoftBlock),
        grid.count_cells(Cell::HardBlock)
    );

    Ok(grid)
}
