//! Scripted in-process game service.
//!
//! Plays back a queue of [`ScriptedGame`]s: each `create_session` starts the
//! next one. The service answers status polls from the script, reacts to
//! shots, can be told to fail upcoming calls, and records every call it
//! received in a [`CallLog`].

use std::collections::{HashMap, VecDeque};
use std::string::{String, ToString};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::vec::Vec;

use crate::core::ShotOutcome;
use crate::domain::{
    GameOutcome, GamePhase, MatchRequest, PlayerDescriptions, PlayerStats, SessionSnapshot,
    SessionToken, WaitingPlayer,
};
use crate::error::ClientError;
use crate::service::GameService;

/// Script for one game, from matchmaking to the end.
#[derive(Debug, Clone)]
pub struct ScriptedGame {
    ships: Vec<String>,
    matchmaking: VecDeque<GamePhase>,
    volleys: Vec<Vec<String>>,
    results: HashMap<String, String>,
    turns: usize,
    min_active_polls: usize,
    outcome: String,
    opponent: String,
    opponent_desc: String,
    timer: u32,
}

impl ScriptedGame {
    /// A game whose fleet occupies `ships`. By default the game is active on
    /// the first poll, grants no shots and ends in a loss after one poll.
    pub fn new(ships: &[&str]) -> Self {
        Self {
            ships: ships.iter().map(|s| s.to_string()).collect(),
            matchmaking: VecDeque::new(),
            volleys: Vec::new(),
            results: HashMap::new(),
            turns: 0,
            min_active_polls: 1,
            outcome: "lose".to_string(),
            opponent: "WPBot".to_string(),
            opponent_desc: "bot".to_string(),
            timer: 60,
        }
    }

    /// Report `phase` for the next `polls` status calls before going active.
    pub fn matchmaking(mut self, phase: GamePhase, polls: usize) -> Self {
        self.matchmaking.extend(std::iter::repeat(phase).take(polls));
        self
    }

    /// Cumulative opponent-shot lists, one per active poll. The last list
    /// keeps being reported once the script runs out.
    pub fn opponent_volleys(mut self, volleys: &[&[&str]]) -> Self {
        self.volleys = volleys
            .iter()
            .map(|v| v.iter().map(|s| s.to_string()).collect())
            .collect();
        self
    }

    /// Result tag the service answers for a shot at `coord` (default `"miss"`).
    pub fn shot_result(mut self, coord: &str, tag: &str) -> Self {
        self.results.insert(coord.to_string(), tag.to_string());
        self
    }

    /// Number of shots we may fire; `should_fire` stays set until they are used.
    pub fn turns(mut self, turns: usize) -> Self {
        self.turns = turns;
        self
    }

    /// Minimum number of active-phase polls before the game can end.
    pub fn min_active_polls(mut self, polls: usize) -> Self {
        self.min_active_polls = polls;
        self
    }

    /// `last_game_status` reported once the game ends.
    pub fn outcome(mut self, tag: &str) -> Self {
        self.outcome = tag.to_string();
        self
    }

    pub fn opponent(mut self, nick: &str, desc: &str) -> Self {
        self.opponent = nick.to_string();
        self.opponent_desc = desc.to_string();
        self
    }
}

/// Every call the service received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallLog {
    pub create: u32,
    pub requests: Vec<MatchRequest>,
    pub status: u32,
    pub description: u32,
    pub board: u32,
    /// Coordinates of every shot that reached the service.
    pub shots: Vec<String>,
    pub refresh: u32,
    pub abandon: u32,
    pub player_stats: u32,
    pub lobby: u32,
    pub leaderboard: u32,
}

struct LiveGame {
    token: SessionToken,
    nick: String,
    desc: String,
    script: ScriptedGame,
    active_polls: usize,
    shots: usize,
}

impl LiveGame {
    fn is_over(&self) -> bool {
        self.active_polls >= self.script.min_active_polls && self.shots >= self.script.turns
    }

    fn volley(&self) -> Vec<String> {
        if self.script.volleys.is_empty() {
            return Vec::new();
        }
        let idx = self
            .active_polls
            .saturating_sub(1)
            .min(self.script.volleys.len() - 1);
        self.script.volleys[idx].clone()
    }

    fn snapshot(&self, phase: GamePhase) -> SessionSnapshot {
        let mut snap = SessionSnapshot::in_phase(phase);
        snap.nick = self.nick.clone();
        snap.desc = self.desc.clone();
        snap.opponent = self.script.opponent.clone();
        snap.opponent_desc = self.script.opponent_desc.clone();
        snap.timer = self.script.timer;
        snap
    }
}

#[derive(Default)]
struct State {
    queue: VecDeque<ScriptedGame>,
    live: Option<LiveGame>,
    issued: u32,
    fail_create: u32,
    fail_status: u32,
    fail_fire: u32,
    lobby: Vec<WaitingPlayer>,
    leaderboard: Vec<PlayerStats>,
    log: CallLog,
}

impl State {
    fn live(&mut self, token: &SessionToken) -> Result<&mut LiveGame, ClientError> {
        match self.live.as_mut() {
            Some(game) if &game.token == token => Ok(game),
            _ => Err(ClientError::session_state(format!("unknown session token '{}'", token))),
        }
    }
}

fn take_failure(counter: &mut u32, what: &str) -> Result<(), ClientError> {
    if *counter > 0 {
        *counter -= 1;
        return Err(ClientError::network(format!("injected {} failure", what)));
    }
    Ok(())
}

/// In-process [`GameService`] driven by [`ScriptedGame`]s.
#[derive(Default)]
pub struct InMemoryService {
    state: Mutex<State>,
}

impl InMemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a game for the next `create_session` call.
    pub fn push_game(&self, game: ScriptedGame) {
        self.state().queue.push_back(game);
    }

    pub fn with_game(self, game: ScriptedGame) -> Self {
        self.push_game(game);
        self
    }

    /// Fail the next `n` `create_session` calls with a network error.
    pub fn fail_next_creates(&self, n: u32) {
        self.state().fail_create = n;
    }

    /// Fail the next `n` `status` calls with a network error.
    pub fn fail_next_status(&self, n: u32) {
        self.state().fail_status = n;
    }

    /// Fail the next `n` `fire` calls with a network error.
    pub fn fail_next_shots(&self, n: u32) {
        self.state().fail_fire = n;
    }

    pub fn set_lobby(&self, lobby: Vec<WaitingPlayer>) {
        self.state().lobby = lobby;
    }

    pub fn set_leaderboard(&self, stats: Vec<PlayerStats>) {
        self.state().leaderboard = stats;
    }

    /// Copy of the call log so far.
    pub fn calls(&self) -> CallLog {
        self.state().log.clone()
    }
}

#[async_trait::async_trait]
impl GameService for InMemoryService {
    async fn create_session(&self, request: &MatchRequest) -> Result<SessionToken, ClientError> {
        let mut state = self.state();
        state.log.create += 1;
        take_failure(&mut state.fail_create, "create")?;
        let script = state
            .queue
            .pop_front()
            .ok_or_else(|| ClientError::session_state("no game available"))?;
        state.issued += 1;
        let token = SessionToken::new(format!("token-{}", state.issued));
        state.log.requests.push(request.clone());
        state.live = Some(LiveGame {
            token: token.clone(),
            nick: request.nick.clone(),
            desc: request.desc.clone(),
            script,
            active_polls: 0,
            shots: 0,
        });
        Ok(token)
    }

    async fn status(&self, token: &SessionToken) -> Result<SessionSnapshot, ClientError> {
        let mut state = self.state();
        state.log.status += 1;
        take_failure(&mut state.fail_status, "status")?;
        let game = state.live(token)?;
        if let Some(phase) = game.script.matchmaking.pop_front() {
            return Ok(game.snapshot(phase));
        }
        if game.is_over() {
            let mut snap = game.snapshot(GamePhase::Ended);
            snap.opponent_shots = game.volley();
            snap.last_outcome = GameOutcome::from_wire(&game.script.outcome);
            return Ok(snap);
        }
        game.active_polls += 1;
        let mut snap = game.snapshot(GamePhase::Active);
        snap.opponent_shots = game.volley();
        snap.should_fire = game.shots < game.script.turns;
        Ok(snap)
    }

    async fn description(&self, token: &SessionToken) -> Result<PlayerDescriptions, ClientError> {
        let mut state = self.state();
        state.log.description += 1;
        let game = state.live(token)?;
        Ok(PlayerDescriptions {
            nick: game.nick.clone(),
            desc: game.desc.clone(),
            opponent: game.script.opponent.clone(),
            opponent_desc: game.script.opponent_desc.clone(),
        })
    }

    async fn own_board(&self, token: &SessionToken) -> Result<Vec<String>, ClientError> {
        let mut state = self.state();
        state.log.board += 1;
        Ok(state.live(token)?.script.ships.clone())
    }

    async fn fire(&self, token: &SessionToken, coord: &str) -> Result<ShotOutcome, ClientError> {
        let mut state = self.state();
        take_failure(&mut state.fail_fire, "fire")?;
        state.log.shots.push(coord.to_string());
        let game = state.live(token)?;
        if game.shots >= game.script.turns {
            return Err(ClientError::session_state("not your turn"));
        }
        game.shots += 1;
        let tag = game.script.results.get(coord).map(String::as_str).unwrap_or("miss");
        Ok(ShotOutcome::from_wire(tag))
    }

    async fn waiting_players(&self) -> Result<Vec<WaitingPlayer>, ClientError> {
        let mut state = self.state();
        state.log.lobby += 1;
        Ok(state.lobby.clone())
    }

    async fn player_stats(&self, nick: &str) -> Result<PlayerStats, ClientError> {
        let mut state = self.state();
        state.log.player_stats += 1;
        let found = state.leaderboard.iter().find(|s| s.nick == nick).cloned();
        Ok(found.unwrap_or_else(|| PlayerStats {
            nick: nick.to_string(),
            ..PlayerStats::default()
        }))
    }

    async fn leaderboard(&self) -> Result<Vec<PlayerStats>, ClientError> {
        let mut state = self.state();
        state.log.leaderboard += 1;
        Ok(state.leaderboard.clone())
    }

    async fn refresh(&self, token: &SessionToken) -> Result<(), ClientError> {
        let mut state = self.state();
        state.log.refresh += 1;
        state.live(token)?;
        Ok(())
    }

    async fn abandon(&self, token: &SessionToken) -> Result<(), ClientError> {
        let mut state = self.state();
        state.log.abandon += 1;
        state.live(token)?;
        state.live = None;
        Ok(())
    }
}
