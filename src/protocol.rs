#![cfg(feature = "std")]
//! JSON payloads of the game service's REST API and their conversion into
//! domain types.

use std::string::String;
use std::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::core::ShotOutcome;
use crate::domain::{
    GameOutcome, GamePhase, MatchRequest, Opponent, PlayerDescriptions, PlayerStats,
    SessionSnapshot, WaitingPlayer,
};
use crate::error::ClientError;

/// Header carrying the session credential.
pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Body of `POST /game`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamePayload {
    pub desc: String,
    pub nick: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub target_nick: String,
    pub wpbot: bool,
}

impl From<&MatchRequest> for GamePayload {
    fn from(req: &MatchRequest) -> Self {
        let (target_nick, wpbot) = match &req.opponent {
            Opponent::Bot => (String::new(), true),
            Opponent::Player(nick) => (nick.clone(), false),
            Opponent::AnyChallenger => (String::new(), false),
        };
        GamePayload {
            desc: req.desc.clone(),
            nick: req.nick.clone(),
            target_nick,
            wpbot,
        }
    }
}

/// Body of `GET /game` and `GET /game/desc`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusData {
    pub desc: String,
    pub game_status: String,
    pub last_game_status: String,
    pub nick: String,
    pub opp_desc: String,
    /// `null` before the opponent's first shot.
    pub opp_shots: Option<Vec<String>>,
    pub opponent: String,
    pub should_fire: bool,
    pub timer: u32,
}

impl TryFrom<StatusData> for SessionSnapshot {
    type Error = ClientError;

    fn try_from(data: StatusData) -> Result<Self, Self::Error> {
        let phase = GamePhase::from_wire(&data.game_status).ok_or_else(|| {
            ClientError::invalid_response(format!("unknown game status '{}'", data.game_status))
        })?;
        Ok(SessionSnapshot {
            phase,
            nick: data.nick,
            desc: data.desc,
            opponent: data.opponent,
            opponent_desc: data.opp_desc,
            opponent_shots: data.opp_shots.unwrap_or_default(),
            should_fire: data.should_fire,
            timer: data.timer,
            last_outcome: GameOutcome::from_wire(&data.last_game_status),
        })
    }
}

impl From<StatusData> for PlayerDescriptions {
    fn from(data: StatusData) -> Self {
        PlayerDescriptions {
            nick: data.nick,
            desc: data.desc,
            opponent: data.opponent,
            opponent_desc: data.opp_desc,
        }
    }
}

/// Body of `GET /game/board`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardData {
    pub board: Vec<String>,
}

/// Body of `POST /game/fire`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotRequest {
    pub coord: String,
}

/// Response of `POST /game/fire`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotResponse {
    pub result: String,
}

impl From<ShotResponse> for ShotOutcome {
    fn from(resp: ShotResponse) -> Self {
        ShotOutcome::from_wire(&resp.result)
    }
}

/// Entry of `GET /game/lobby`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbyEntry {
    pub nick: String,
    #[serde(default)]
    pub game_status: String,
}

impl From<LobbyEntry> for WaitingPlayer {
    fn from(entry: LobbyEntry) -> Self {
        WaitingPlayer {
            nick: entry.nick,
            status: entry.game_status,
        }
    }
}

/// Statistics record used by both stats endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsData {
    pub nick: String,
    pub games: u32,
    pub wins: u32,
    pub points: u32,
    pub rank: u32,
}

impl From<StatsData> for PlayerStats {
    fn from(s: StatsData) -> Self {
        PlayerStats {
            nick: s.nick,
            games: s.games,
            wins: s.wins,
            points: s.points,
            rank: s.rank,
        }
    }
}

/// Body of `GET /game/stats/{nick}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatsData {
    pub stats: StatsData,
}

/// Body of `GET /game/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardData {
    pub stats: Vec<StatsData>,
}
