//! Session orchestration: lifecycle, background polling, firing and end
//! detection.

pub mod config;
pub mod fire;
pub mod lifecycle;
pub mod poller;
pub mod shared;
pub mod watcher;

pub use config::SessionConfig;
pub use fire::{FireCoordinator, FireStage};
pub use lifecycle::{GameSummary, LifecycleState, SessionController};
pub use poller::{SessionPoller, SnapshotReceiver};
pub use shared::{OffenseBoardWriter, OwnBoardWriter, SharedBoards};
pub use watcher::spawn_end_watcher;
