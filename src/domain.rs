#![cfg(feature = "std")]
//! Session-level domain types exchanged between the service client and the
//! orchestrator.

use std::fmt;
use std::string::String;
use std::vec::Vec;

/// Phase of the remote session, as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamePhase {
    /// Waiting for the bot opponent to be ready.
    MatchmakingBot,
    /// Waiting for a human opponent to join.
    MatchmakingHuman,
    Active,
    Ended,
}

impl GamePhase {
    /// Service-side name of the phase.
    pub fn wire_name(self) -> &'static str {
        match self {
            GamePhase::MatchmakingBot => "waiting_wpbot",
            GamePhase::MatchmakingHuman => "waiting",
            GamePhase::Active => "game_in_progress",
            GamePhase::Ended => "ended",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "waiting_wpbot" => Some(GamePhase::MatchmakingBot),
            "waiting" => Some(GamePhase::MatchmakingHuman),
            "game_in_progress" => Some(GamePhase::Active),
            "ended" => Some(GamePhase::Ended),
            _ => None,
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Result of the last completed game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Win,
    Lose,
}

impl GameOutcome {
    /// `"win"` is a win, any other non-empty tag a loss, empty means no
    /// completed game yet.
    pub fn from_wire(tag: &str) -> Option<Self> {
        match tag {
            "" => None,
            "win" => Some(GameOutcome::Win),
            _ => Some(GameOutcome::Lose),
        }
    }
}

/// Point-in-time view of the session, replaced wholesale on every poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: GamePhase,
    pub nick: String,
    pub desc: String,
    pub opponent: String,
    pub opponent_desc: String,
    /// Every shot the opponent fired this game, cumulative across polls.
    pub opponent_shots: Vec<String>,
    pub should_fire: bool,
    /// Seconds left in the current turn.
    pub timer: u32,
    pub last_outcome: Option<GameOutcome>,
}

impl SessionSnapshot {
    /// An empty snapshot in the given phase.
    pub fn in_phase(phase: GamePhase) -> Self {
        Self {
            phase,
            nick: String::new(),
            desc: String::new(),
            opponent: String::new(),
            opponent_desc: String::new(),
            opponent_shots: Vec::new(),
            should_fire: false,
            timer: 0,
            last_outcome: None,
        }
    }
}

/// Nicknames and descriptions of both players.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerDescriptions {
    pub nick: String,
    pub desc: String,
    pub opponent: String,
    pub opponent_desc: String,
}

/// Credential issued by the service for one session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who we want to play against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Opponent {
    /// The service's built-in bot.
    Bot,
    /// Challenge a specific waiting player.
    Player(String),
    /// Wait in the lobby until someone challenges us.
    AnyChallenger,
}

/// Parameters for creating or joining a session. Reused unchanged for
/// rematches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRequest {
    pub nick: String,
    pub desc: String,
    pub opponent: Opponent,
}

impl MatchRequest {
    pub fn new(nick: impl Into<String>, desc: impl Into<String>, opponent: Opponent) -> Self {
        Self {
            nick: nick.into(),
            desc: desc.into(),
            opponent,
        }
    }
}

/// Lobby entry for a player waiting to be challenged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitingPlayer {
    pub nick: String,
    pub status: String,
}

/// Leaderboard statistics of one player.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayerStats {
    pub nick: String,
    pub games: u32,
    pub wins: u32,
    pub points: u32,
    pub rank: u32,
}
