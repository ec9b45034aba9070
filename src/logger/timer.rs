//! Background flush timer.

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::logger::Shared;

/// Tick the logger every `period` until shutdown or until it is dropped.
pub(crate) async fn run(logger: Weak<Shared>, period: Duration, mut shutdown: broadcast::Receiver<()>) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let Some(logger) = logger.upgrade() else {
                    break;
                };
                logger.tick();
            }
            _ = shutdown.recv() => {
                tracing::debug!("Flush timer received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
