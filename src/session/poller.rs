use std::sync::Arc;
use std::time::Duration;
use std::vec::Vec;

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::core::Coord;
use crate::domain::{SessionSnapshot, SessionToken};
use crate::presenter::{GridId, PanelId, Presenter};
use crate::retry::RetryPolicy;
use crate::service::GameService;
use crate::session::shared::OwnBoardWriter;

/// Receiving end of the latest published snapshot.
pub type SnapshotReceiver = watch::Receiver<Arc<SessionSnapshot>>;

/// Periodically refreshes the session snapshot and republishes it.
///
/// The poller is the only writer of the own board and the only sender of
/// snapshots. A tick whose fetch fails (after retries) is dropped; everyone
/// keeps reading the previous snapshot.
pub struct SessionPoller {
    service: Arc<dyn GameService>,
    presenter: Arc<dyn Presenter>,
    token: SessionToken,
    writer: OwnBoardWriter,
    poll_interval: Duration,
    retry: RetryPolicy,
    degraded_after: u32,
}

impl SessionPoller {
    pub fn new(
        service: Arc<dyn GameService>,
        presenter: Arc<dyn Presenter>,
        token: SessionToken,
        writer: OwnBoardWriter,
        poll_interval: Duration,
        retry: RetryPolicy,
        degraded_after: u32,
    ) -> Self {
        Self {
            service,
            presenter,
            token,
            writer,
            poll_interval,
            retry,
            degraded_after: degraded_after.max(1),
        }
    }

    /// Absorb `initial`, publish it and start polling in the background.
    pub fn spawn(
        self,
        initial: SessionSnapshot,
        cancel: CancellationToken,
    ) -> (JoinHandle<()>, SnapshotReceiver) {
        self.absorb(&initial);
        let (tx, rx) = watch::channel(Arc::new(initial));
        let handle = tokio::spawn(self.run(tx, cancel));
        (handle, rx)
    }

    async fn run(self, tx: watch::Sender<Arc<SessionSnapshot>>, cancel: CancellationToken) {
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut failed_ticks: u32 = 0;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let service = &self.service;
            let token = &self.token;
            let fetched = tokio::select! {
                _ = cancel.cancelled() => break,
                res = self.retry.run("status poll", || service.status(token)) => res,
            };

            match fetched {
                Ok(snapshot) => {
                    if failed_ticks >= self.degraded_after {
                        info!("Connection restored after {} failed polls", failed_ticks);
                    }
                    failed_ticks = 0;
                    self.absorb(&snapshot);
                    tx.send_replace(Arc::new(snapshot));
                }
                Err(e) => {
                    failed_ticks += 1;
                    warn!("Status poll dropped ({} in a row): {}", failed_ticks, e);
                    if failed_ticks >= self.degraded_after {
                        self.presenter.set_panel_text(
                            PanelId::Status,
                            &format!(
                                "Connection degraded: {} failed polls, showing last known state",
                                failed_ticks
                            ),
                        );
                    }
                }
            }
        }
        debug!("Session poller stopped");
    }

    /// Apply the snapshot's opponent shots and refresh the panels it drives.
    fn absorb(&self, snapshot: &SessionSnapshot) {
        let shots: Vec<Coord> = snapshot
            .opponent_shots
            .iter()
            .filter_map(|raw| match raw.parse::<Coord>() {
                Ok(at) => Some(at),
                Err(e) => {
                    warn!("Ignoring opponent shot '{}': {}", raw, e);
                    None
                }
            })
            .collect();
        if let Some(own) = self.writer.apply_opponent_shots(&shots) {
            self.presenter.set_grid(GridId::Own, &own);
        }
        self.presenter
            .set_panel_text(PanelId::Timer, &format!("Timer : {}", snapshot.timer));
        self.presenter.set_panel_text(
            PanelId::Turn,
            &format!("Should I fire? : {}", snapshot.should_fire),
        );
        self.presenter
            .set_panel_text(PanelId::Status, snapshot.phase.wire_name());
    }
}
