#![cfg(feature = "std")]
//! Error taxonomy shared by the service clients and the session orchestrator.

use std::string::String;

use crate::core::CoordError;

/// Errors surfaced by game-service calls and session orchestration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Transport failure: connection refused, timeout, 5xx.
    Network(String),
    /// Payload was malformed or carried unexpected values.
    InvalidResponse(String),
    /// A coordinate string failed to decode.
    InvalidCoordinate(CoordError),
    /// The request was not valid for the current session state
    /// (e.g. firing out of turn, unknown token).
    SessionState(String),
    /// The caller cancelled the operation.
    Cancelled,
}

impl ClientError {
    pub fn network(msg: impl Into<String>) -> Self {
        ClientError::Network(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        ClientError::InvalidResponse(msg.into())
    }

    pub fn session_state(msg: impl Into<String>) -> Self {
        ClientError::SessionState(msg.into())
    }
}

impl From<CoordError> for ClientError {
    fn from(err: CoordError) -> Self {
        ClientError::InvalidCoordinate(err)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ClientError::InvalidResponse(err.to_string());
        }
        match err.status() {
            Some(status) if status.is_client_error() => ClientError::SessionState(err.to_string()),
            _ => ClientError::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::InvalidResponse(err.to_string())
    }
}

impl core::fmt::Display for ClientError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ClientError::Network(e) => write!(f, "Network error: {}", e),
            ClientError::InvalidResponse(e) => write!(f, "Invalid response: {}", e),
            ClientError::InvalidCoordinate(e) => write!(f, "Invalid coordinate: {}", e),
            ClientError::SessionState(e) => write!(f, "Session state error: {}", e),
            ClientError::Cancelled => write!(f, "Operation cancelled"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::InvalidCoordinate(e) => Some(e),
            _ => None,
        }
    }
}
