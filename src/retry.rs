#![cfg(feature = "std")]
//! Bounded retry of a single fallible service call.

use std::future::Future;

use log::{debug, warn};

use crate::error::ClientError;

/// Attempts made by the default policy.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Retries an operation up to a fixed number of attempts with no delay in
/// between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Policy making at most `attempts` calls. Zero is treated as one.
    pub fn new(attempts: u32) -> Self {
        Self {
            attempts: attempts.max(1),
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Run `op` until it succeeds or the attempts are used up, returning the
    /// last error in the latter case.
    ///
    /// [`ClientError::Cancelled`] and [`ClientError::SessionState`] are
    /// returned immediately; asking again cannot change either answer.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, ClientError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(ClientError::Cancelled) => return Err(ClientError::Cancelled),
                Err(e @ ClientError::SessionState(_)) => {
                    debug!("{}: rejected by the service: {}", label, e);
                    return Err(e);
                }
                Err(e) if attempt < self.attempts => {
                    debug!("{}: attempt {}/{} failed: {}", label, attempt, self.attempts, e);
                    attempt += 1;
                }
                Err(e) => {
                    debug!("{}: attempt {}/{} failed: {}", label, attempt, self.attempts, e);
                    return Err(e);
                }
            }
        }
    }

    /// Like [`RetryPolicy::run`], but logs the final error and yields `None`
    /// so the caller keeps its previous state.
    pub async fn run_or_log<T, F, Fut>(&self, label: &str, op: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        match self.run(label, op).await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("{}: giving up: {}", label, e);
                None
            }
        }
    }
}
