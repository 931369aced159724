use std::string::{String, ToString};
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::{Coord, ShotOutcome};
use crate::domain::SessionToken;
use crate::presenter::{GridId, PanelId, Presenter};
use crate::retry::RetryPolicy;
use crate::service::GameService;
use crate::session::poller::SnapshotReceiver;
use crate::session::shared::OffenseBoardWriter;

/// Where the fire coordinator is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireStage {
    /// Waiting for the snapshot to say it is our turn.
    Idle,
    /// Waiting for the user to pick a cell.
    AwaitingTarget,
    Validating,
    Submitting,
    Applying,
}

/// Takes our turns: asks for a target, checks it locally, fires it and
/// records the result on the offense board.
pub struct FireCoordinator {
    service: Arc<dyn GameService>,
    presenter: Arc<dyn Presenter>,
    token: SessionToken,
    writer: OffenseBoardWriter,
    retry: RetryPolicy,
    stage: FireStage,
}

impl FireCoordinator {
    pub fn new(
        service: Arc<dyn GameService>,
        presenter: Arc<dyn Presenter>,
        token: SessionToken,
        writer: OffenseBoardWriter,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            service,
            presenter,
            token,
            writer,
            retry,
            stage: FireStage::Idle,
        }
    }

    pub fn spawn(self, snapshots: SnapshotReceiver, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(snapshots, cancel))
    }

    fn enter(&mut self, stage: FireStage) {
        debug!("Fire coordinator: {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Run until `cancel` fires or the poller goes away.
    pub async fn run(mut self, mut snapshots: SnapshotReceiver, cancel: CancellationToken) {
        'session: loop {
            self.enter(FireStage::Idle);
            let my_turn = tokio::select! {
                _ = cancel.cancelled() => break 'session,
                turn = wait_for_turn(&mut snapshots) => turn,
            };
            if !my_turn {
                break 'session;
            }

            self.presenter
                .set_panel_text(PanelId::Instructions, "Your turn - pick a target on the opponent board");
            let target = loop {
                self.enter(FireStage::AwaitingTarget);
                let picked = tokio::select! {
                    _ = cancel.cancelled() => break 'session,
                    picked = self.presenter.wait_for_target(GridId::Offense, &cancel) => picked,
                };
                let Some(raw) = picked else {
                    break 'session;
                };

                self.enter(FireStage::Validating);
                match self.validate(&raw) {
                    Ok(at) => break at,
                    Err(rejection) => {
                        debug!("Rejected target '{}': {}", raw, rejection);
                        self.presenter.set_panel_text(PanelId::Instructions, &rejection);
                    }
                }
            };
            self.presenter
                .set_panel_text(PanelId::Instructions, &format!("Valid coords : {}", target));

            self.enter(FireStage::Submitting);
            let coord = target.to_string();
            let service = &self.service;
            let token = &self.token;
            let submitted = tokio::select! {
                _ = cancel.cancelled() => break 'session,
                res = self.retry.run("fire", || service.fire(token, &coord)) => res,
            };
            let outcome = match submitted {
                Ok(outcome) => outcome,
                Err(e) => {
                    // Not counted: the service never confirmed the shot.
                    warn!("Shot at {} failed: {}", coord, e);
                    self.presenter
                        .set_panel_text(PanelId::Instructions, &format!("Shot at {} failed: {}", coord, e));
                    continue 'session;
                }
            };

            self.enter(FireStage::Applying);
            if !self.apply(target, outcome) {
                break 'session;
            }

            // The turn flag in hand predates our shot; wait for the next poll.
            tokio::select! {
                _ = cancel.cancelled() => break 'session,
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        break 'session;
                    }
                }
            }
        }
        debug!("Fire coordinator stopped in {:?}", self.stage);
    }

    fn validate(&self, raw: &str) -> Result<Coord, String> {
        let at: Coord = raw
            .parse()
            .map_err(|e| format!("Invalid coords : {} ({})", raw.trim(), e))?;
        if self.writer.is_already_targeted(at) {
            return Err(format!("Already targeted : {}", at));
        }
        Ok(at)
    }

    /// Record the result and refresh the offense panels. `false` once the
    /// session this coordinator belongs to is over.
    fn apply(&self, at: Coord, outcome: ShotOutcome) -> bool {
        if outcome == ShotOutcome::Unknown {
            warn!("Service returned an unrecognised result for {}", at);
        }
        let Some((offense, accuracy)) = self.writer.record_shot(at, outcome) else {
            return false;
        };
        info!("Shot at {}: {}", at, outcome.as_str());
        self.presenter.set_grid(GridId::Offense, &offense);
        self.presenter
            .set_panel_text(PanelId::ShotResult, &format!("{} {}", outcome.as_str(), at));
        self.presenter.set_panel_text(
            PanelId::Accuracy,
            &format!(
                "Shots accuracy : {} / {}",
                accuracy.shots_hit, accuracy.shots_fired
            ),
        );
        true
    }
}

async fn wait_for_turn(snapshots: &mut SnapshotReceiver) -> bool {
    snapshots.wait_for(|s| s.should_fire).await.is_ok()
}
