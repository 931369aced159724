use std::time::Duration;

use crate::retry::RetryPolicy;

/// Delay between two status polls (1 second).
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Presence refresh cadence while waiting for a human opponent, in polls.
pub const REFRESH_EVERY: u64 = 10;

/// Pause after announcing the result (3 seconds).
pub const SETTLE_DELAY: Duration = Duration::from_secs(3);

/// Ticks of the rematch countdown.
pub const REMATCH_COUNTDOWN: u32 = 25;

/// Length of one countdown tick (1 second).
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Consecutive failed polls before the connection is shown as degraded.
pub const DEGRADED_AFTER: u32 = 5;

/// Timing and policy knobs of a game session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub poll_interval: Duration,
    pub retry: RetryPolicy,
    pub refresh_every: u64,
    pub settle_delay: Duration,
    pub countdown_ticks: u32,
    pub countdown_tick: Duration,
    pub degraded_after: u32,
    /// Stop after this many finished games. `None` rematches forever.
    pub max_games: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
            retry: RetryPolicy::default(),
            refresh_every: REFRESH_EVERY,
            settle_delay: SETTLE_DELAY,
            countdown_ticks: REMATCH_COUNTDOWN,
            countdown_tick: COUNTDOWN_TICK,
            degraded_after: DEGRADED_AFTER,
            max_games: None,
        }
    }
}

impl SessionConfig {
    pub fn with_max_games(mut self, games: u32) -> Self {
        self.max_games = Some(games);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_degraded_after(mut self, polls: u32) -> Self {
        self.degraded_after = polls.max(1);
        self
    }
}
