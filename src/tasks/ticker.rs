//! Frame-cadence driver for the sequencing engine

use std::{sync::Arc, time::Duration};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

use crate::state::AppState;

/// Background task that samples the clock at display cadence and ticks the
/// sequence. Elapsed time is measured per sample, so a late or skipped frame
/// delays an update without losing time.
pub async fn ticker_task(state: Arc<AppState>, frame: Duration) {
    info!("Starting ticker task ({}ms frames)", frame.as_millis());

    let mut frames = interval(frame);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let now = frames.tick().await.into_std();
        if let Err(e) = state.tick(now) {
            error!("Failed to tick sequence: {}", e);
        }
    }
}
