use log::{info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::domain::{GameOutcome, GamePhase};
use crate::session::poller::SnapshotReceiver;

/// Watch the published snapshots until the game ends and report the
/// outcome. Yields `None` if cancelled or if the poller went away first.
pub fn spawn_end_watcher(
    mut snapshots: SnapshotReceiver,
    cancel: CancellationToken,
) -> JoinHandle<Option<GameOutcome>> {
    tokio::spawn(async move {
        tokio::select! {
            _ = cancel.cancelled() => None,
            outcome = wait_for_end(&mut snapshots) => outcome,
        }
    })
}

async fn wait_for_end(snapshots: &mut SnapshotReceiver) -> Option<GameOutcome> {
    let last_outcome = match snapshots.wait_for(|s| s.phase == GamePhase::Ended).await {
        Ok(snapshot) => snapshot.last_outcome,
        Err(_) => return None,
    };
    let outcome = last_outcome.unwrap_or_else(|| {
        warn!("Game ended without a reported result, counting it as lost");
        GameOutcome::Lose
    });
    info!("Game ended: {:?}", outcome);
    Some(outcome)
}
