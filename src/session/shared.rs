//! Board state shared by the tasks of a session.
//!
//! [`SharedBoards`] owns the boards behind a mutex. Mutation goes through two
//! capability handles minted per session: [`OwnBoardWriter`] for the poller
//! and [`OffenseBoardWriter`] for the fire coordinator. Every session bumps an
//! epoch, and a handle from an older epoch can no longer change anything.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::warn;

use crate::core::{Accuracy, Coord, GameBoards, Grid, ShotOutcome};

#[derive(Debug, Default)]
struct Inner {
    epoch: u64,
    boards: GameBoards,
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle to the boards of the current session. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct SharedBoards {
    inner: Arc<Mutex<Inner>>,
}

impl SharedBoards {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent copy of both boards and the accuracy counter.
    pub fn snapshot(&self) -> GameBoards {
        lock(&self.inner).boards
    }

    pub fn accuracy(&self) -> Accuracy {
        lock(&self.inner).boards.accuracy()
    }

    /// Reset the boards, place `fleet` and hand out the writers for the new
    /// session. Writers of any earlier session stop working.
    pub fn begin_session(&self, fleet: &[Coord]) -> (OwnBoardWriter, OffenseBoardWriter) {
        let mut guard = lock(&self.inner);
        guard.epoch += 1;
        guard.boards.reset();
        guard.boards.mark_own_ships(fleet.iter().copied());
        let epoch = guard.epoch;
        (
            OwnBoardWriter {
                inner: Arc::clone(&self.inner),
                epoch,
            },
            OffenseBoardWriter {
                inner: Arc::clone(&self.inner),
                epoch,
            },
        )
    }
}

/// Sole writer of the own board for one session.
#[derive(Debug)]
pub struct OwnBoardWriter {
    inner: Arc<Mutex<Inner>>,
    epoch: u64,
}

impl OwnBoardWriter {
    /// Apply the opponent's whole cumulative shot list under one lock.
    ///
    /// Returns the own board only when a cell changed. `None` when the list
    /// brought nothing new or the session is over.
    pub fn apply_opponent_shots(&self, shots: &[Coord]) -> Option<Grid> {
        let mut guard = lock(&self.inner);
        if guard.epoch != self.epoch {
            warn!("Dropping opponent shots from a finished session");
            return None;
        }
        if !guard.boards.apply_opponent_shots(shots.iter().copied()) {
            return None;
        }
        Some(*guard.boards.own())
    }
}

/// Sole writer of the offense board and accuracy counter for one session.
#[derive(Debug)]
pub struct OffenseBoardWriter {
    inner: Arc<Mutex<Inner>>,
    epoch: u64,
}

impl OffenseBoardWriter {
    pub fn is_already_targeted(&self, at: Coord) -> bool {
        lock(&self.inner).boards.is_already_targeted(at)
    }

    /// Record an accepted shot. Returns the updated offense board and
    /// accuracy, or `None` if the session is over.
    pub fn record_shot(&self, at: Coord, outcome: ShotOutcome) -> Option<(Grid, Accuracy)> {
        let mut guard = lock(&self.inner);
        if guard.epoch != self.epoch {
            warn!("Dropping shot result for {} from a finished session", at);
            return None;
        }
        guard.boards.record_shot(at, outcome);
        Some((*guard.boards.offense(), guard.boards.accuracy()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CellState;

    fn c(s: &str) -> Coord {
        s.parse().unwrap()
    }

    #[test]
    fn stale_writers_cannot_touch_a_new_session() {
        let shared = SharedBoards::new();
        let (old_own, old_offense) = shared.begin_session(&[c("A1")]);
        let (_own, _offense) = shared.begin_session(&[c("B2")]);

        assert!(old_own.apply_opponent_shots(&[c("B2")]).is_none());
        assert!(old_offense.record_shot(c("C3"), ShotOutcome::Hit).is_none());

        let boards = shared.snapshot();
        assert_eq!(boards.own().get(c("A1")), CellState::Empty);
        assert_eq!(boards.own().get(c("B2")), CellState::Ship);
        assert!(boards.offense().is_empty());
        assert_eq!(boards.accuracy(), Accuracy::default());
    }

    #[test]
    fn own_board_is_returned_only_when_it_changed() {
        let shared = SharedBoards::new();
        let (own, _offense) = shared.begin_session(&[c("A1"), c("A2")]);

        let after = own.apply_opponent_shots(&[c("A1")]).unwrap();
        assert_eq!(after.get(c("A1")), CellState::Hit);
        assert!(own.apply_opponent_shots(&[c("A1")]).is_none());
        assert!(own.apply_opponent_shots(&[]).is_none());

        let after = own.apply_opponent_shots(&[c("A1"), c("B3")]).unwrap();
        assert_eq!(after.get(c("B3")), CellState::Miss);
        assert_eq!(after.get(c("A2")), CellState::Ship);
    }
}
