//! Common types: cell states, shot outcomes and coordinate errors.

/// State of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellState {
    /// Nothing known about the cell.
    #[default]
    Empty,
    /// One of our own ships occupies the cell. Own board only.
    Ship,
    /// A shot landed on a ship segment. Terminal.
    Hit,
    /// A shot landed on water. Terminal.
    Miss,
}

impl CellState {
    /// `true` once a shot has resolved this cell.
    pub fn is_resolved(self) -> bool {
        matches!(self, CellState::Hit | CellState::Miss)
    }
}

/// Result reported by the service for one of our shots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOutcome {
    Hit,
    Miss,
    /// Hit that sank the ship.
    Sunk,
    /// The service answered with a result we do not recognise.
    Unknown,
}

impl ShotOutcome {
    /// Parse the service's result tag (`"hit"`, `"miss"`, `"sunk"`).
    pub fn from_wire(tag: &str) -> Self {
        match tag {
            "hit" => ShotOutcome::Hit,
            "miss" => ShotOutcome::Miss,
            "sunk" => ShotOutcome::Sunk,
            _ => ShotOutcome::Unknown,
        }
    }

    /// `true` for outcomes that struck a ship.
    pub fn is_hit(self) -> bool {
        matches!(self, ShotOutcome::Hit | ShotOutcome::Sunk)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ShotOutcome::Hit => "hit",
            ShotOutcome::Miss => "miss",
            ShotOutcome::Sunk => "sunk",
            ShotOutcome::Unknown => "unknown",
        }
    }
}

/// Errors returned by the coordinate codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordError {
    /// Input was empty.
    Empty,
    /// First character is not a column letter A-J.
    InvalidColumn(char),
    /// Row part is missing, not a number, or outside 1-10.
    InvalidRow,
    /// Zero-based index outside the board.
    OutOfBounds { col: usize, row: usize },
}

impl core::fmt::Display for CoordError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CoordError::Empty => write!(f, "Empty coordinate"),
            CoordError::InvalidColumn(c) => write!(f, "Invalid column '{}' - must be a letter A-J", c),
            CoordError::InvalidRow => write!(f, "Invalid row - must be a number 1-10"),
            CoordError::OutOfBounds { col, row } => {
                write!(f, "Index ({}, {}) is outside the 10x10 board", col, row)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CoordError {}
