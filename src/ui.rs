#![cfg(feature = "std")]
//! Line-oriented terminal presenter.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::string::{String, ToString};
use std::sync::{Mutex, PoisonError};
use std::thread;

use log::{debug, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::{CellState, Grid, BOARD_SIZE, COLUMN_LABELS};
use crate::presenter::{GridId, PanelId, Presenter};

/// Prints panel and board changes to stdout and reads targets from stdin.
///
/// Stdin is read on its own OS thread and handed over line by line, so a
/// pending prompt never keeps the runtime from shutting down.
pub struct TerminalPresenter {
    panels: Mutex<BTreeMap<PanelId, String>>,
    grids: Mutex<BTreeMap<GridId, Grid>>,
    input: tokio::sync::Mutex<mpsc::Receiver<String>>,
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPresenter {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(8);
        thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
            debug!("stdin reader finished");
        });
        Self::with_input(rx)
    }

    /// Presenter reading target lines from `input` instead of stdin.
    pub fn with_input(input: mpsc::Receiver<String>) -> Self {
        Self {
            panels: Mutex::new(BTreeMap::new()),
            grids: Mutex::new(BTreeMap::new()),
            input: tokio::sync::Mutex::new(input),
        }
    }

    /// Remember `text` for `panel`. `false` if it is already showing.
    fn remember_panel(&self, panel: PanelId, text: &str) -> bool {
        let mut panels = self.panels.lock().unwrap_or_else(PoisonError::into_inner);
        if panels.get(&panel).map(String::as_str) == Some(text) {
            return false;
        }
        panels.insert(panel, text.to_string());
        true
    }

    /// Remember `cells` for `grid`. `false` if it is already showing.
    fn remember_grid(&self, grid: GridId, cells: &Grid) -> bool {
        let mut grids = self.grids.lock().unwrap_or_else(PoisonError::into_inner);
        if grids.get(&grid) == Some(cells) {
            return false;
        }
        grids.insert(grid, *cells);
        true
    }
}

fn panel_label(panel: PanelId) -> &'static str {
    match panel {
        PanelId::Instructions => "info",
        PanelId::Status => "status",
        PanelId::ShotResult => "shot",
        PanelId::Turn => "turn",
        PanelId::Timer => "timer",
        PanelId::Accuracy => "accuracy",
        PanelId::OwnNick => "nick",
        PanelId::OwnDesc => "desc",
        PanelId::OpponentNick => "opponent",
        PanelId::OpponentDesc => "opponent desc",
        PanelId::Stats => "stats",
        PanelId::Legend => "legend",
    }
}

fn cell_char(state: CellState) -> char {
    match state {
        CellState::Empty => '.',
        CellState::Ship => 'S',
        CellState::Hit => 'H',
        CellState::Miss => 'M',
    }
}

/// Render a grid inside the box frame used for every board.
pub fn render_grid(title: &str, grid: &Grid) -> String {
    let mut out = String::new();
    out.push_str(&format!("    {}\n", title));
    out.push_str("    ╔═══════════════════════╗\n");
    out.push_str("    ║  ");
    for label in COLUMN_LABELS {
        out.push_str(&format!(" {}", label));
    }
    out.push_str(" ║\n");
    out.push_str("    ╠═══════════════════════╣\n");
    for (r, row) in grid.rows().iter().enumerate().take(BOARD_SIZE) {
        out.push_str(&format!("    ║ {:2}", r + 1));
        for cell in row {
            out.push_str(&format!(" {}", cell_char(*cell)));
        }
        out.push_str(" ║\n");
    }
    out.push_str("    ╚═══════════════════════╝\n");
    out
}

#[async_trait::async_trait]
impl Presenter for TerminalPresenter {
    fn set_panel_text(&self, panel: PanelId, text: &str) {
        if self.remember_panel(panel, text) && !text.is_empty() {
            println!("[{}] {}", panel_label(panel), text);
        }
    }

    fn set_grid(&self, grid: GridId, cells: &Grid) {
        if !self.remember_grid(grid, cells) {
            return;
        }
        let title = match grid {
            GridId::Own => "Your fleet",
            GridId::Offense => "Opponent waters",
        };
        print!("{}", render_grid(title, cells));
    }

    async fn wait_for_target(&self, _grid: GridId, cancel: &CancellationToken) -> Option<String> {
        print!("Target (e.g. B7)> ");
        let _ = io::stdout().flush();
        let mut input = self.input.lock().await;
        tokio::select! {
            _ = cancel.cancelled() => None,
            line = input.recv() => match line {
                Some(line) => Some(line),
                None => {
                    warn!("stdin closed, no more targets can be read");
                    cancel.cancelled().await;
                    None
                }
            },
        }
    }
}
