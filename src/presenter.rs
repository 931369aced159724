#![cfg(feature = "std")]
//! Interface to whatever renders the game.

use std::string::String;

use tokio_util::sync::CancellationToken;

use crate::core::Grid;

/// Named text panels the orchestrator writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelId {
    /// Prompts, rejections and end-of-game announcements.
    Instructions,
    /// Current game phase, or the degraded-connection warning.
    Status,
    ShotResult,
    Turn,
    Timer,
    Accuracy,
    OwnNick,
    OwnDesc,
    OpponentNick,
    OpponentDesc,
    Stats,
    Legend,
}

impl PanelId {
    /// Panels that only make sense while a session is on screen.
    pub const SESSION_SCOPED: [PanelId; 11] = [
        PanelId::Status,
        PanelId::ShotResult,
        PanelId::Turn,
        PanelId::Timer,
        PanelId::Accuracy,
        PanelId::OwnNick,
        PanelId::OwnDesc,
        PanelId::OpponentNick,
        PanelId::OpponentDesc,
        PanelId::Stats,
        PanelId::Legend,
    ];
}

/// The two boards on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GridId {
    /// Our fleet and the opponent's shots.
    Own,
    /// Our shots at the opponent.
    Offense,
}

/// Push-style rendering sink plus the one blocking input the game needs.
#[async_trait::async_trait]
pub trait Presenter: Send + Sync {
    fn set_panel_text(&self, panel: PanelId, text: &str);

    fn set_grid(&self, grid: GridId, cells: &Grid);

    /// Block until the user designates a cell on `grid`. Returns `None` once
    /// `cancel` fires.
    async fn wait_for_target(&self, grid: GridId, cancel: &CancellationToken) -> Option<String>;
}

/// Blank every session-scoped panel and both grids.
pub fn clear_session(presenter: &dyn Presenter) {
    for panel in PanelId::SESSION_SCOPED {
        presenter.set_panel_text(panel, "");
    }
    let empty = Grid::new();
    presenter.set_grid(GridId::Own, &empty);
    presenter.set_grid(GridId::Offense, &empty);
}
