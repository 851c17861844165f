//! Authoritative arena grid
//!
//! `cells` is the single source of truth for occupancy. The bomb and
//! power-up registries are indexed by coordinate and must always agree
//! with it:
//!   - a cell is `Bomb` iff at least one grounded bomb is registered there
//!   - a cell is `Powerup` iff a live power-up is registered there and no
//!     bomb covers it
//!
//! Airborne bombs are never registered. All mutations that touch both a
//! cell and a registry happen inside one method call.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Bomb table key
pub type BombId = u32;
/// Power-up table key
pub type PowerupId = u32;
/// Index into the arena's player list
pub type PlayerId = usize;

/// Integer tile coordinate. `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Neighbor one tile away in `dir`
    #[inline]
    pub fn step(self, dir: Direction) -> Self {
        self.offset(dir, 1)
    }

    /// Tile `n` steps away in `dir`
    #[inline]
    pub fn offset(self, dir: Direction, n: i32) -> Self {
        let (dx, dy) = dir.delta();
        Self::new(self.x + dx * n, self.y + dy * n)
    }
}

/// Cardinal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Ray order used by explosion propagation
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Occupancy of one grid coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    HardBlock,
    SoftBlock,
    Bomb,
    Powerup,
}

impl Cell {
    /// Players and sliding bombs may enter this cell
    pub fn is_passable(self) -> bool {
        matches!(self, Cell::Empty | Cell::Powerup)
    }

    /// Parse one map character.
    /// Legend: `#`=HardBlock `+`=SoftBlock anything else=Empty
    pub fn from_char(ch: char) -> Self {
        match ch {
            '#' => Cell::HardBlock,
            '+' => Cell::SoftBlock,
            _ => Cell::Empty,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GridState {
    width: i32,
    height: i32,
    /// Row-major, `cells[y * width + x]`
    cells: Vec<Cell>,
    /// Grounded bombs per coordinate. More than one entry means a thrown
    /// bomb landed on top of another.
    bombs: BTreeMap<Coord, Vec<BombId>>,
    powerups: BTreeMap<Coord, PowerupId>,
    /// Living player positions, rebuilt by the arena before each phase
    /// that queries them. Read-only index, never ownership.
    players: Vec<(PlayerId, Coord)>,
    /// Cells excluded from random soft-block fill
    spawn_zones: BTreeSet<Coord>,
}

impl GridState {
    /// An all-empty grid. Dimensions are validated by the caller.
    pub fn new(width: i32, height: i32) -> Self {
        let len = width.max(0) as usize * height.max(0) as usize;
        Self {
            width,
            height,
            cells: vec![Cell::Empty; len],
            bombs: BTreeMap::new(),
            powerups: BTreeMap::new(),
            players: Vec::new(),
            spawn_zones: BTreeSet::new(),
        }
    }

    /// Build a grid from a text diagram, one string per row.
    /// Short rows are padded with `Empty`.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as i32;
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as i32;
        let mut grid = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                grid.set_cell(Coord::new(x as i32, y as i32), Cell::from_char(ch));
            }
        }
        grid
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn in_bounds(&self, pos: Coord) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    #[inline]
    fn index(&self, pos: Coord) -> usize {
        (pos.y * self.width + pos.x) as usize
    }

    /// Cell at `pos`. Out-of-bounds reads as `HardBlock`.
    pub fn get_cell(&self, pos: Coord) -> Cell {
        if self.in_bounds(pos) {
            self.cells[self.index(pos)]
        } else {
            Cell::HardBlock
        }
    }

    /// Raw terrain write. Out-of-bounds writes are ignored.
    pub(crate) fn set_cell(&mut self, pos: Coord, cell: Cell) {
        if self.in_bounds(pos) {
            let idx = self.index(pos);
            self.cells[idx] = cell;
        }
    }

    pub fn is_walkable(&self, pos: Coord) -> bool {
        self.in_bounds(pos) && self.get_cell(pos).is_passable()
    }

    pub fn can_place_bomb(&self, pos: Coord) -> bool {
        self.in_bounds(pos) && self.get_cell(pos) == Cell::Empty && !self.bombs.contains_key(&pos)
    }

    /// A sliding bomb may enter `pos`: passable terrain and no living player.
    pub fn can_bomb_move_to(&self, pos: Coord) -> bool {
        self.is_walkable(pos) && self.living_player_at(pos).is_none()
    }

    // ── Bomb registry ──

    /// Topmost grounded bomb at `pos`
    pub fn bomb_at(&self, pos: Coord) -> Option<BombId> {
        self.bombs.get(&pos).and_then(|stack| stack.last().copied())
    }

    /// Every grounded bomb at `pos`, bottom first
    pub fn bombs_at(&self, pos: Coord) -> &[BombId] {
        self.bombs.get(&pos).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn bomb_count(&self) -> usize {
        self.bombs.values().map(Vec::len).sum()
    }

    /// Ground a bomb at `pos` and mark the cell.
    pub(crate) fn register_bomb(&mut self, pos: Coord, id: BombId) {
        self.bombs.entry(pos).or_default().push(id);
        self.set_cell(pos, Cell::Bomb);
    }

    /// Remove a bomb from `pos`. When the last bomb leaves, the cell reverts
    /// to whatever is underneath (a covered power-up, or empty floor), but
    /// only if it still reads `Bomb`.
    pub(crate) fn unregister_bomb(&mut self, pos: Coord, id: BombId) -> bool {
        let Some(stack) = self.bombs.get_mut(&pos) else {
            return false;
        };
        let Some(idx) = stack.iter().position(|&b| b == id) else {
            return false;
        };
        stack.remove(idx);
        if stack.is_empty() {
            self.bombs.remove(&pos);
            if self.get_cell(pos) == Cell::Bomb {
                let under = if self.powerups.contains_key(&pos) {
                    Cell::Powerup
                } else {
                    Cell::Empty
                };
                self.set_cell(pos, under);
            }
        }
        true
    }

    /// Move a grounded bomb one registry key to another
    pub(crate) fn move_bomb(&mut self, id: BombId, old: Coord, new: Coord) {
        self.unregister_bomb(old, id);
        self.register_bomb(new, id);
    }

    // ── Power-up registry ──

    pub fn powerup_at(&self, pos: Coord) -> Option<PowerupId> {
        self.powerups.get(&pos).copied()
    }

    pub fn powerup_count(&self) -> usize {
        self.powerups.len()
    }

    /// Register a power-up. A bomb already on the cell keeps it covered.
    pub(crate) fn register_powerup(&mut self, pos: Coord, id: PowerupId) {
        self.powerups.insert(pos, id);
        if self.get_cell(pos) != Cell::Bomb {
            self.set_cell(pos, Cell::Powerup);
        }
    }

    pub(crate) fn unregister_powerup(&mut self, pos: Coord) -> Option<PowerupId> {
        let id = self.powerups.remove(&pos)?;
        if self.get_cell(pos) == Cell::Powerup {
            self.set_cell(pos, Cell::Empty);
        }
        Some(id)
    }

    // ── Player position index ──

    pub(crate) fn set_player_positions(&mut self, positions: Vec<(PlayerId, Coord)>) {
        self.players = positions;
    }

    /// First living player standing at `pos`
    pub fn living_player_at(&self, pos: Coord) -> Option<PlayerId> {
        self.players.iter().find(|(_, p)| *p == pos).map(|(id, _)| *id)
    }

    // ── Spawn zones ──

    pub(crate) fn mark_spawn_zone(&mut self, pos: Coord) {
        if self.in_bounds(pos) {
            self.spawn_zones.insert(pos);
        }
    }

    pub fn is_spawn_zone(&self, pos: Coord) -> bool {
        self.spawn_zones.contains(&pos)
    }

    pub fn count_cells(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }
}
