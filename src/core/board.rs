//! A single 10x10 grid of cell states.

use core::fmt;

use crate::core::common::CellState;
use crate::core::config::{BOARD_SIZE, COLUMN_LABELS};
use crate::core::coord::Coord;

/// Fixed-size board indexed by [`Coord`].
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Grid {
    cells: [[CellState; BOARD_SIZE]; BOARD_SIZE],
}

impl Grid {
    /// Create a grid with every cell `Empty`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, at: Coord) -> CellState {
        self.cells[at.row()][at.col()]
    }

    pub(crate) fn set(&mut self, at: Coord, state: CellState) {
        self.cells[at.row()][at.col()] = state;
    }

    /// Reset every cell to `Empty`.
    pub fn clear(&mut self) {
        self.cells = [[CellState::Empty; BOARD_SIZE]; BOARD_SIZE];
    }

    /// Rows in board order, each indexed by column.
    pub fn rows(&self) -> &[[CellState; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    /// Number of cells currently in `state`.
    pub fn count(&self, state: CellState) -> usize {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&c| c == state)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.count(CellState::Empty) == BOARD_SIZE * BOARD_SIZE
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for label in COLUMN_LABELS {
            write!(f, " {}", label)?;
        }
        writeln!(f)?;
        for (r, row) in self.cells.iter().enumerate() {
            write!(f, "{:2} ", r + 1)?;
            for cell in row {
                let ch = match cell {
                    CellState::Empty => '.',
                    CellState::Ship => 'S',
                    CellState::Hit => 'H',
                    CellState::Miss => 'M',
                };
                write!(f, " {}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
