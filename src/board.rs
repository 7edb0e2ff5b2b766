//! Board state: a 10×10 grid of cell states plus the ships placed on it.

use rand::Rng;

use crate::common::GameError;
use crate::config::BOARD_SIZE;
use crate::ship::{Point, Ship};

const N: usize = BOARD_SIZE as usize;

/// State of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Empty,
    Ship,
    Hit,
    Miss,
}

/// One player's board. Owns its ships; cells are addressed `(x, y)` with
/// x across and y down.
#[derive(Debug, Clone)]
pub struct Board {
    cells: [[CellState; N]; N],
    ships: Vec<Ship>,
}

impl Board {
    /// Create an empty board with no ships placed.
    pub fn new() -> Self {
        Self {
            cells: [[CellState::Empty; N]; N],
            ships: Vec::new(),
        }
    }

    /// A board is ready once its ship list is non-empty.
    pub fn is_ready(&self) -> bool {
        !self.ships.is_empty()
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    pub fn cell(&self, x: u8, y: u8) -> CellState {
        self.cells[y as usize][x as usize]
    }

    /// Set one cell's state. The engine owns all transitions; boards do
    /// not police them.
    pub fn mark(&mut self, x: u8, y: u8, state: CellState) {
        self.cells[y as usize][x as usize] = state;
    }

    /// Replace the ship list and rasterize every ship's occupied cells.
    ///
    /// Validates shape only: each ship's length must match its kind and
    /// every occupied cell must lie within the board. On failure the board
    /// is left unchanged.
    pub fn place_ships(&mut self, mut ships: Vec<Ship>) -> Result<(), GameError> {
        for ship in &ships {
            if !ship.shape_consistent() {
                return Err(GameError::InvalidPlacement);
            }
            for p in ship.cells() {
                if p.x >= BOARD_SIZE || p.y >= BOARD_SIZE {
                    return Err(GameError::InvalidPlacement);
                }
            }
        }
        for ship in &mut ships {
            ship.reset_hits();
        }
        self.cells = [[CellState::Empty; N]; N];
        for ship in &ships {
            for p in ship.cells() {
                self.cells[p.y as usize][p.x as usize] = CellState::Ship;
            }
        }
        self.ships = ships;
        Ok(())
    }

    /// Index of the ship occupying `(x, y)`, if any.
    pub fn ship_index_at(&self, x: u8, y: u8) -> Option<usize> {
        self.ships.iter().position(|s| s.occupies(x, y))
    }

    pub fn ship_mut(&mut self, index: usize) -> &mut Ship {
        &mut self.ships[index]
    }

    /// All ships destroyed means the board's owner has lost.
    pub fn all_ships_destroyed(&self) -> bool {
        self.ships.iter().all(Ship::is_destroyed)
    }

    /// Mark every still-empty cell in the 8-connected neighborhood of the
    /// destroyed ship as a miss, covering every segment and clamped to the
    /// board. Returns the newly marked cells in segment-then-scan order.
    pub fn mark_around_ship(&mut self, ship_index: usize) -> Vec<Point> {
        let segments: Vec<Point> = self.ships[ship_index].cells().collect();
        let mut marked = Vec::new();
        for seg in segments {
            for dy in -1i16..=1 {
                for dx in -1i16..=1 {
                    let nx = seg.x as i16 + dx;
                    let ny = seg.y as i16 + dy;
                    if !(0..N as i16).contains(&nx) || !(0..N as i16).contains(&ny) {
                        continue;
                    }
                    let (nx, ny) = (nx as u8, ny as u8);
                    if self.cell(nx, ny) == CellState::Empty {
                        self.mark(nx, ny, CellState::Miss);
                        marked.push(Point { x: nx, y: ny });
                    }
                }
            }
        }
        marked
    }

    /// Cells not yet targeted: still `Empty` or `Ship`.
    pub fn untargeted(&self) -> Vec<Point> {
        let mut cells = Vec::new();
        for y in 0..BOARD_SIZE {
            for x in 0..BOARD_SIZE {
                if matches!(self.cell(x, y), CellState::Empty | CellState::Ship) {
                    cells.push(Point { x, y });
                }
            }
        }
        cells
    }

    /// Uniformly sample an untargeted cell. Falls back to `(0, 0)` when
    /// none remain, which cannot happen before a win is detected.
    pub fn random_target<R: Rng>(&self, rng: &mut R) -> Point {
        let cells = self.untargeted();
        if cells.is_empty() {
            return Point { x: 0, y: 0 };
        }
        cells[rng.random_range(0..cells.len())]
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
