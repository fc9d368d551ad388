//! Periodic, single-flight refresh loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};

use super::Refresher;

/// Run a cycle every `every` until `shutdown` flips to true.
///
/// Each cycle is awaited before the next tick is taken, so cycles never
/// overlap; a cycle longer than `every` delays the following one. The first
/// tick fires one interval from now (the caller runs the initial cycle).
pub async fn run_schedule(
    refresher: Arc<Refresher>,
    targets: Arc<[String]>,
    every: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut tick = tokio::time::interval_at(Instant::now() + every, every);
    tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = tick.tick() => {
                refresher.run_cycle(&targets).await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    tracing::info!("refresh schedule stopped");
}
