//! Coordinate codec: `"A1"`..`"J10"` <-> zero-based (column, row).

use alloc::string::String;
use core::fmt;
use core::str::FromStr;

use crate::core::common::CoordError;
use crate::core::config::{BOARD_SIZE, COLUMN_LABELS};

/// A validated board coordinate. Both indices are zero-based and `< BOARD_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    col: u8,
    row: u8,
}

impl Coord {
    pub fn new(col: usize, row: usize) -> Result<Self, CoordError> {
        if col >= BOARD_SIZE || row >= BOARD_SIZE {
            return Err(CoordError::OutOfBounds { col, row });
        }
        Ok(Self {
            col: col as u8,
            row: row as u8,
        })
    }

    pub fn col(self) -> usize {
        self.col as usize
    }

    pub fn row(self) -> usize {
        self.row as usize
    }

    /// Iterate over every coordinate on the board, row by row.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..BOARD_SIZE).flat_map(|row| {
            (0..BOARD_SIZE).map(move |col| Coord {
                col: col as u8,
                row: row as u8,
            })
        })
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", COLUMN_LABELS[self.col()], self.row() + 1)
    }
}

impl FromStr for Coord {
    type Err = CoordError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let input = input.trim();
        let mut chars = input.chars();
        let col_ch = chars.next().ok_or(CoordError::Empty)?;
        let upper = col_ch.to_ascii_uppercase();
        let col = COLUMN_LABELS
            .iter()
            .position(|&label| label == upper)
            .ok_or(CoordError::InvalidColumn(col_ch))?;

        // `str::parse` would also accept a leading '+', so check digits first.
        let row_str = chars.as_str();
        if row_str.is_empty() || !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CoordError::InvalidRow);
        }
        let row: usize = row_str.parse().map_err(|_| CoordError::InvalidRow)?;
        if row == 0 || row > BOARD_SIZE {
            return Err(CoordError::InvalidRow);
        }
        Coord::new(col, row - 1)
    }
}

/// Encode a zero-based (column, row) pair as a coordinate string.
pub fn encode(col: usize, row: usize) -> Result<String, CoordError> {
    use alloc::string::ToString;
    Coord::new(col, row).map(|c| c.to_string())
}

/// Decode a coordinate string into a zero-based (column, row) pair.
pub fn decode(text: &str) -> Result<(usize, usize), CoordError> {
    let coord: Coord = text.parse()?;
    Ok((coord.col(), coord.row()))
}
