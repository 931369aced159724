//! REST client for the game service.

use std::string::String;
use std::vec::Vec;
use std::time::Duration;

use log::{debug, info};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::core::ShotOutcome;
use crate::domain::{
    MatchRequest, PlayerDescriptions, PlayerStats, SessionSnapshot, SessionToken, WaitingPlayer,
};
use crate::error::ClientError;
use crate::protocol::{
    BoardData, GamePayload, LeaderboardData, LobbyEntry, PlayerStatsData, ShotRequest,
    ShotResponse, StatusData, AUTH_HEADER,
};
use crate::service::GameService;

/// Public game server.
pub const DEFAULT_BASE_URL: &str = "https://go-pjatk-server.fly.dev/api";

/// Default timeout for a single request (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// [`GameService`] over HTTP + JSON.
#[derive(Debug, Clone)]
pub struct HttpGameService {
    client: Client,
    base_url: String,
}

impl HttpGameService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::network(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, req: RequestBuilder, token: &SessionToken) -> RequestBuilder {
        req.header(AUTH_HEADER, token.as_str())
    }

    async fn send(req: RequestBuilder) -> Result<Response, ClientError> {
        let response = req.send().await?;
        Ok(response.error_for_status()?)
    }

    async fn send_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, ClientError> {
        let response = Self::send(req).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait::async_trait]
impl GameService for HttpGameService {
    async fn create_session(&self, request: &MatchRequest) -> Result<SessionToken, ClientError> {
        let payload = GamePayload::from(request);
        info!("Creating session for {} (wpbot: {})", payload.nick, payload.wpbot);
        let response = Self::send(self.client.post(self.url("/game")).json(&payload)).await?;
        let token = response
            .headers()
            .get(AUTH_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::invalid_response("no session token in response headers"))?;
        debug!("Session token issued");
        Ok(SessionToken::new(token))
    }

    async fn status(&self, token: &SessionToken) -> Result<SessionSnapshot, ClientError> {
        let req = self.authed(self.client.get(self.url("/game")), token);
        let data: StatusData = Self::send_json(req).await?;
        SessionSnapshot::try_from(data)
    }

    async fn description(&self, token: &SessionToken) -> Result<PlayerDescriptions, ClientError> {
        let req = self.authed(self.client.get(self.url("/game/desc")), token);
        let data: StatusData = Self::send_json(req).await?;
        Ok(PlayerDescriptions::from(data))
    }

    async fn own_board(&self, token: &SessionToken) -> Result<Vec<String>, ClientError> {
        let req = self.authed(self.client.get(self.url("/game/board")), token);
        let data: BoardData = Self::send_json(req).await?;
        Ok(data.board)
    }

    async fn fire(&self, token: &SessionToken, coord: &str) -> Result<ShotOutcome, ClientError> {
        let body = ShotRequest {
            coord: coord.to_string(),
        };
        let req = self.authed(self.client.post(self.url("/game/fire")).json(&body), token);
        let data: ShotResponse = Self::send_json(req).await?;
        Ok(ShotOutcome::from(data))
    }

    async fn waiting_players(&self) -> Result<Vec<WaitingPlayer>, ClientError> {
        let entries: Vec<LobbyEntry> = Self::send_json(self.client.get(self.url("/game/lobby"))).await?;
        Ok(entries.into_iter().map(WaitingPlayer::from).collect())
    }

    async fn player_stats(&self, nick: &str) -> Result<PlayerStats, ClientError> {
        let req = self.client.get(self.url(&format!("/game/stats/{}", nick)));
        let data: PlayerStatsData = Self::send_json(req).await?;
        Ok(PlayerStats::from(data.stats))
    }

    async fn leaderboard(&self) -> Result<Vec<PlayerStats>, ClientError> {
        let data: LeaderboardData = Self::send_json(self.client.get(self.url("/game/stats"))).await?;
        Ok(data.stats.into_iter().map(PlayerStats::from).collect())
    }

    async fn refresh(&self, token: &SessionToken) -> Result<(), ClientError> {
        let req = self.authed(self.client.get(self.url("/game/refresh")), token);
        Self::send(req).await?;
        Ok(())
    }

    async fn abandon(&self, token: &SessionToken) -> Result<(), ClientError> {
        let req = self.authed(self.client.delete(self.url("/game/abandon")), token);
        Self::send(req).await?;
        info!("Session abandoned");
        Ok(())
    }
}
