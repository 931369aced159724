use crate::core::{
    board::Grid,
    common::{CellState, ShotOutcome},
    coord::Coord,
};

/// Shots we fired this session and how many of them struck a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Accuracy {
    pub shots_fired: u32,
    pub shots_hit: u32,
}

impl Accuracy {
    /// Count one accepted shot.
    pub fn record(&mut self, outcome: ShotOutcome) {
        self.shots_fired += 1;
        if outcome.is_hit() {
            self.shots_hit += 1;
        }
    }
}

/// Both boards of one session plus the accuracy counter.
///
/// The own board holds our fleet and the opponent's shots against it; the
/// offense board holds the results of our own shots. Resolved cells (`Hit`,
/// `Miss`) are terminal on both boards: no operation here ever changes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameBoards {
    own: Grid,
    offense: Grid,
    accuracy: Accuracy,
}

impl GameBoards {
    /// Create empty boards with a zeroed accuracy counter.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn own(&self) -> &Grid {
        &self.own
    }

    pub fn offense(&self) -> &Grid {
        &self.offense
    }

    pub fn accuracy(&self) -> Accuracy {
        self.accuracy
    }

    /// Clear both boards and the accuracy counter.
    pub fn reset(&mut self) {
        self.own.clear();
        self.offense.clear();
        self.accuracy = Accuracy::default();
    }

    /// Place our fleet on the own board. Re-marking a cell is a no-op.
    pub fn mark_own_ships<I>(&mut self, ships: I)
    where
        I: IntoIterator<Item = Coord>,
    {
        for at in ships {
            if self.own.get(at) == CellState::Empty {
                self.own.set(at, CellState::Ship);
            }
        }
    }

    /// Apply the opponent's cumulative shot list to the own board.
    ///
    /// A shot on `Ship` (or an already `Hit` cell) leaves `Hit`; any other
    /// unresolved cell becomes `Miss`. Replaying a list, or any prefix of
    /// it, changes nothing. Returns `true` if any cell changed.
    pub fn apply_opponent_shots<I>(&mut self, shots: I) -> bool
    where
        I: IntoIterator<Item = Coord>,
    {
        let mut changed = false;
        for at in shots {
            let current = self.own.get(at);
            let next = match current {
                CellState::Ship | CellState::Hit => CellState::Hit,
                CellState::Miss | CellState::Empty => CellState::Miss,
            };
            if next != current {
                self.own.set(at, next);
                changed = true;
            }
        }
        changed
    }

    /// Record the result of our shot on the offense board.
    ///
    /// Returns `false` without touching the board for an `Unknown` outcome
    /// or when the cell was already resolved.
    pub fn mark_offense_result(&mut self, at: Coord, outcome: ShotOutcome) -> bool {
        if self.offense.get(at).is_resolved() {
            return false;
        }
        let state = match outcome {
            ShotOutcome::Hit | ShotOutcome::Sunk => CellState::Hit,
            ShotOutcome::Miss => CellState::Miss,
            ShotOutcome::Unknown => return false,
        };
        self.offense.set(at, state);
        true
    }

    /// `true` if we already fired at `at`.
    pub fn is_already_targeted(&self, at: Coord) -> bool {
        self.offense.get(at).is_resolved()
    }

    /// Mark an accepted shot and count it towards accuracy.
    pub fn record_shot(&mut self, at: Coord, outcome: ShotOutcome) {
        self.mark_offense_result(at, outcome);
        self.accuracy.record(outcome);
    }
}
