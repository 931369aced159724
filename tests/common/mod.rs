#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use battleship_client::{Coord, Grid, GridId, MatchRequest, Opponent, PanelId, Presenter};
use tokio_util::sync::CancellationToken;

pub fn c(s: &str) -> Coord {
    s.parse().unwrap()
}

pub fn bot_request() -> MatchRequest {
    MatchRequest::new("tester", "integration test player", Opponent::Bot)
}

/// Records everything it is asked to show and hands out queued targets.
/// Once the queue runs dry it blocks until cancelled.
#[derive(Default)]
pub struct ScriptedPresenter {
    panels: Mutex<Vec<(PanelId, String)>>,
    grids: Mutex<HashMap<GridId, Grid>>,
    grid_pushes: Mutex<Vec<(GridId, Grid)>>,
    targets: Mutex<VecDeque<String>>,
}

impl ScriptedPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_targets(targets: &[&str]) -> Self {
        let presenter = Self::new();
        presenter
            .targets
            .lock()
            .unwrap()
            .extend(targets.iter().map(|t| t.to_string()));
        presenter
    }

    pub fn panel_history(&self, panel: PanelId) -> Vec<String> {
        self.panels
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| *p == panel)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn last_panel(&self, panel: PanelId) -> Option<String> {
        self.panel_history(panel).pop()
    }

    pub fn grid(&self, id: GridId) -> Option<Grid> {
        self.grids.lock().unwrap().get(&id).copied()
    }

    /// Every grid pushed for `id`, oldest first.
    pub fn grid_history(&self, id: GridId) -> Vec<Grid> {
        self.grid_pushes
            .lock()
            .unwrap()
            .iter()
            .filter(|(g, _)| *g == id)
            .map(|(_, cells)| *cells)
            .collect()
    }

    pub fn targets_left(&self) -> usize {
        self.targets.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Presenter for ScriptedPresenter {
    fn set_panel_text(&self, panel: PanelId, text: &str) {
        self.panels.lock().unwrap().push((panel, text.to_string()));
    }

    fn set_grid(&self, grid: GridId, cells: &Grid) {
        self.grids.lock().unwrap().insert(grid, *cells);
        self.grid_pushes.lock().unwrap().push((grid, *cells));
    }

    async fn wait_for_target(&self, _grid: GridId, cancel: &CancellationToken) -> Option<String> {
        let next = self.targets.lock().unwrap().pop_front();
        match next {
            Some(target) => Some(target),
            None => {
                cancel.cancelled().await;
                None
            }
        }
    }
}
