use std::string::String;
use std::vec::Vec;

use crate::core::ShotOutcome;
use crate::domain::{
    MatchRequest, PlayerDescriptions, PlayerStats, SessionSnapshot, SessionToken, WaitingPlayer,
};
use crate::error::ClientError;

/// Request/response operations offered by the remote game service.
///
/// Implementations are stateless with respect to sessions: every
/// session-scoped call takes the token explicitly.
#[async_trait::async_trait]
pub trait GameService: Send + Sync {
    /// Create a session (or join the named opponent) and return its token.
    async fn create_session(&self, request: &MatchRequest) -> Result<SessionToken, ClientError>;
    async fn status(&self, token: &SessionToken) -> Result<SessionSnapshot, ClientError>;
    async fn description(&self, token: &SessionToken) -> Result<PlayerDescriptions, ClientError>;
    /// Coordinates of our fleet as placed by the service.
    async fn own_board(&self, token: &SessionToken) -> Result<Vec<String>, ClientError>;
    async fn fire(&self, token: &SessionToken, coord: &str) -> Result<ShotOutcome, ClientError>;
    async fn waiting_players(&self) -> Result<Vec<WaitingPlayer>, ClientError>;
    async fn player_stats(&self, nick: &str) -> Result<PlayerStats, ClientError>;
    async fn leaderboard(&self) -> Result<Vec<PlayerStats>, ClientError>;
    /// Keep a lobby entry visible to other players.
    async fn refresh(&self, token: &SessionToken) -> Result<(), ClientError>;
    async fn abandon(&self, token: &SessionToken) -> Result<(), ClientError>;
}

pub mod http;
pub mod in_memory;

pub use http::HttpGameService;
pub use in_memory::{CallLog, InMemoryService, ScriptedGame};
