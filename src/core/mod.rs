//! Board bookkeeping (no_std compatible)
//!
//! This module contains the pure board logic with no external dependencies
//! beyond `alloc`: the coordinate codec, the 10x10 grids and the
//! own/offense board aggregate with its accuracy counter.

pub mod board;
pub mod common;
pub mod config;
pub mod coord;
pub mod game;

// Re-export commonly used types
pub use board::Grid;
pub use common::{CellState, CoordError, ShotOutcome};
pub use config::*;
pub use coord::{decode, encode, Coord};
pub use game::{Accuracy, GameBoards};
