//! Drives a session from creation through matchmaking and play to the end,
//! then rematches.

use std::string::{String, ToString};
use std::sync::Arc;
use std::time::Duration;
use std::vec::Vec;

use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::core::{Accuracy, Coord, Grid};
use crate::domain::{
    GameOutcome, GamePhase, MatchRequest, Opponent, PlayerDescriptions, PlayerStats,
    SessionSnapshot, SessionToken,
};
use crate::error::ClientError;
use crate::presenter::{clear_session, GridId, PanelId, Presenter};
use crate::service::GameService;
use crate::session::config::SessionConfig;
use crate::session::fire::FireCoordinator;
use crate::session::poller::SessionPoller;
use crate::session::shared::SharedBoards;
use crate::session::watcher::spawn_end_watcher;

/// States of the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    /// Waiting in the lobby for a human opponent.
    AwaitingJoin,
    /// Opponent known, waiting for the game to start.
    AwaitingOpponentReady,
    Active,
    Ended,
    RematchCountdown,
}

/// What one finished game left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    pub token: SessionToken,
    pub opponent: String,
    pub outcome: GameOutcome,
    pub accuracy: Accuracy,
}

/// Owns the session state machine and the tasks of the active phase.
pub struct SessionController {
    service: Arc<dyn GameService>,
    presenter: Arc<dyn Presenter>,
    request: MatchRequest,
    config: SessionConfig,
    boards: SharedBoards,
    state: LifecycleState,
    history: Vec<LifecycleState>,
}

impl SessionController {
    pub fn new(
        service: Arc<dyn GameService>,
        presenter: Arc<dyn Presenter>,
        request: MatchRequest,
        config: SessionConfig,
    ) -> Self {
        Self {
            service,
            presenter,
            request,
            config,
            boards: SharedBoards::new(),
            state: LifecycleState::Created,
            history: Vec::new(),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Every state entered so far, without consecutive repeats.
    pub fn history(&self) -> &[LifecycleState] {
        &self.history
    }

    pub fn boards(&self) -> &SharedBoards {
        &self.boards
    }

    fn enter(&mut self, state: LifecycleState) {
        if self.history.last() != Some(&state) {
            info!("Session: {:?} -> {:?}", self.state, state);
            self.history.push(state);
        }
        self.state = state;
    }

    /// Play games back to back with a rematch countdown in between.
    ///
    /// Stops after `max_games` finished games or when `cancel` fires, and
    /// returns the summaries collected so far. A failure to establish a
    /// session is returned as an error.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<Vec<GameSummary>, ClientError> {
        let mut summaries = Vec::new();
        loop {
            match self.play_once(cancel).await {
                Ok(summary) => summaries.push(summary),
                Err(ClientError::Cancelled) => return Ok(summaries),
                Err(e) => return Err(e),
            }
            let done = self
                .config
                .max_games
                .map_or(false, |max| summaries.len() as u32 >= max);
            if done || !self.rematch_countdown(cancel).await {
                return Ok(summaries);
            }
        }
    }

    /// Create a session and play it to the end.
    pub async fn play_once(&mut self, cancel: &CancellationToken) -> Result<GameSummary, ClientError> {
        self.enter(LifecycleState::Created);
        self.presenter
            .set_panel_text(PanelId::Instructions, "Creating a new game...");
        let service = Arc::clone(&self.service);
        let request = self.request.clone();
        let retry = self.config.retry;
        let token = tokio::select! {
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            res = retry.run("create session", || service.create_session(&request)) => res?,
        };
        info!("Session created for {} against {:?}", request.nick, request.opponent);

        let result = self.drive(&token, cancel).await;
        if result.is_err() {
            self.abandon(&token).await;
        }
        result
    }

    async fn drive(
        &mut self,
        token: &SessionToken,
        cancel: &CancellationToken,
    ) -> Result<GameSummary, ClientError> {
        let first = self.matchmake(token, cancel).await?;
        let fleet = self.fetch_fleet(token, cancel).await?;
        let (own_writer, offense_writer) = self.boards.begin_session(&fleet);

        let service = Arc::clone(&self.service);
        let retry = self.config.retry;
        let descriptions = retry
            .run_or_log("description", || service.description(token))
            .await;
        let nick = self.request.nick.clone();
        let stats = retry
            .run_or_log("player stats", || service.player_stats(&nick))
            .await;
        let opponent = descriptions
            .as_ref()
            .map(|d| d.opponent.clone())
            .unwrap_or_else(|| first.opponent.clone());
        self.draw_session(&first, descriptions.as_ref(), stats.as_ref());

        let session_cancel = cancel.child_token();
        let poller = SessionPoller::new(
            Arc::clone(&self.service),
            Arc::clone(&self.presenter),
            token.clone(),
            own_writer,
            self.config.poll_interval,
            retry,
            self.config.degraded_after,
        );
        let (poll_handle, snapshots) = poller.spawn(first, session_cancel.clone());
        let fire_handle = FireCoordinator::new(
            Arc::clone(&self.service),
            Arc::clone(&self.presenter),
            token.clone(),
            offense_writer,
            retry,
        )
        .spawn(snapshots.clone(), session_cancel.clone());
        let end_handle = spawn_end_watcher(snapshots, session_cancel.clone());
        self.enter(LifecycleState::Active);

        let outcome = match end_handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("End watcher failed: {}", e);
                None
            }
        };
        session_cancel.cancel();
        join_task(poll_handle, "poller").await;
        join_task(fire_handle, "fire coordinator").await;

        let Some(outcome) = outcome else {
            if cancel.is_cancelled() {
                return Err(ClientError::Cancelled);
            }
            return Err(ClientError::session_state("session stopped without a result"));
        };

        self.enter(LifecycleState::Ended);
        let announcement = match outcome {
            GameOutcome::Win => "Game ended You won!",
            GameOutcome::Lose => "Game ended You lost!",
        };
        self.presenter
            .set_panel_text(PanelId::Instructions, announcement);
        Ok(GameSummary {
            token: token.clone(),
            opponent,
            outcome,
            accuracy: self.boards.accuracy(),
        })
    }

    /// Poll until the service reports the game active (or already over).
    async fn matchmake(
        &mut self,
        token: &SessionToken,
        cancel: &CancellationToken,
    ) -> Result<SessionSnapshot, ClientError> {
        let service = Arc::clone(&self.service);
        let retry = self.config.retry;
        let refresh_every = self.config.refresh_every.max(1);
        let mut polls: u64 = 0;
        let mut failed: u32 = 0;

        loop {
            let fetched = tokio::select! {
                _ = cancel.cancelled() => return Err(ClientError::Cancelled),
                res = retry.run("status poll", || service.status(token)) => res,
            };
            match fetched {
                Ok(snapshot) => {
                    failed = 0;
                    match snapshot.phase {
                        GamePhase::Active | GamePhase::Ended => return Ok(snapshot),
                        GamePhase::MatchmakingBot => {
                            self.enter(LifecycleState::AwaitingOpponentReady);
                        }
                        GamePhase::MatchmakingHuman => {
                            self.enter(LifecycleState::AwaitingJoin);
                            if polls % refresh_every == 0 {
                                debug!("Refreshing lobby presence (poll {})", polls);
                                retry
                                    .run_or_log("presence refresh", || service.refresh(token))
                                    .await;
                            }
                        }
                    }
                    self.presenter
                        .set_panel_text(PanelId::Status, snapshot.phase.wire_name());
                }
                Err(e) => {
                    failed += 1;
                    warn!("Status poll dropped ({} in a row): {}", failed, e);
                    if failed >= self.config.degraded_after {
                        self.presenter.set_panel_text(
                            PanelId::Status,
                            &format!("Connection degraded: {} failed polls", failed),
                        );
                    }
                }
            }
            polls += 1;
            if !sleep_or_cancel(self.config.poll_interval, cancel).await {
                return Err(ClientError::Cancelled);
            }
        }
    }

    async fn fetch_fleet(
        &self,
        token: &SessionToken,
        cancel: &CancellationToken,
    ) -> Result<Vec<Coord>, ClientError> {
        let service = Arc::clone(&self.service);
        let raw = tokio::select! {
            _ = cancel.cancelled() => return Err(ClientError::Cancelled),
            res = self.config.retry.run("own board", || service.own_board(token)) => res?,
        };
        raw.iter()
            .map(|s| {
                s.parse::<Coord>().map_err(|e| {
                    ClientError::invalid_response(format!("bad ship coordinate '{}': {}", s, e))
                })
            })
            .collect()
    }

    fn draw_session(
        &self,
        first: &SessionSnapshot,
        descriptions: Option<&PlayerDescriptions>,
        stats: Option<&PlayerStats>,
    ) {
        let p = &*self.presenter;
        let fallback = PlayerDescriptions {
            nick: first.nick.clone(),
            desc: first.desc.clone(),
            opponent: first.opponent.clone(),
            opponent_desc: first.opponent_desc.clone(),
        };
        let d = descriptions.unwrap_or(&fallback);
        p.set_panel_text(PanelId::OwnNick, &d.nick);
        p.set_panel_text(PanelId::OwnDesc, &d.desc);
        p.set_panel_text(PanelId::OpponentNick, &d.opponent);
        p.set_panel_text(PanelId::OpponentDesc, &d.opponent_desc);
        let stats_text = match stats {
            Some(s) => format!(
                "My stats Games : {} Points : {} Rank : {} Wins : {}",
                s.games, s.points, s.rank, s.wins
            ),
            None => "My stats : unavailable".to_string(),
        };
        p.set_panel_text(PanelId::Stats, &stats_text);
        p.set_panel_text(PanelId::Legend, "S = ship  M = miss  H = hit");
        p.set_panel_text(PanelId::ShotResult, "Shoot result");
        p.set_panel_text(PanelId::Accuracy, "Shots accuracy : 0 / 0");
        p.set_panel_text(
            PanelId::Instructions,
            &format!("Game started against {}", d.opponent),
        );
        p.set_grid(GridId::Own, self.boards.snapshot().own());
        p.set_grid(GridId::Offense, &Grid::new());
    }

    /// Settle, clear the screen and count down to the rematch. `false` if
    /// cancelled on the way.
    async fn rematch_countdown(&mut self, cancel: &CancellationToken) -> bool {
        if !sleep_or_cancel(self.config.settle_delay, cancel).await {
            return false;
        }
        clear_session(&*self.presenter);
        self.enter(LifecycleState::RematchCountdown);
        let against = match &self.request.opponent {
            Opponent::Bot => "WPBot".to_string(),
            Opponent::Player(nick) => nick.clone(),
            Opponent::AnyChallenger => "the next challenger".to_string(),
        };
        for remaining in (1..=self.config.countdown_ticks).rev() {
            self.presenter.set_panel_text(
                PanelId::Instructions,
                &format!(
                    "Playing again with {} in : {} press Ctrl-C for more options",
                    against, remaining
                ),
            );
            if !sleep_or_cancel(self.config.countdown_tick, cancel).await {
                return false;
            }
        }
        true
    }

    async fn abandon(&self, token: &SessionToken) {
        let service = Arc::clone(&self.service);
        if self
            .config
            .retry
            .run_or_log("abandon session", || service.abandon(token))
            .await
            .is_some()
        {
            info!("Abandoned unfinished session");
        }
    }
}

async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = sleep(duration) => true,
    }
}

async fn join_task(handle: JoinHandle<()>, name: &str) {
    if let Err(e) = handle.await {
        warn!("{} task failed: {}", name, e);
    }
}
