//! Consumer of announcements produced by the notification sink

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::{services::Announcement, state::AppState};

/// Background task that hands each announcement to the audio layer.
///
/// Sound synthesis and speech happen outside this service; here every
/// announcement is logged for whoever plays it back.
pub async fn announcement_task(state: Arc<AppState>) {
    info!("Starting announcement task");

    let mut announcements = state.announcer.subscribe();

    loop {
        match announcements.recv().await {
            Ok(announcement) => log_announcement(&announcement),
            Err(RecvError::Lagged(skipped)) => {
                warn!("Announcement consumer lagged, dropped {} announcements", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Announcement channel closed, stopping announcement task");
                break;
            }
        }
    }
}

fn log_announcement(announcement: &Announcement) {
    match (&announcement.cue, &announcement.speech) {
        (Some(cue), Some(speech)) => {
            info!(kind = ?announcement.kind, cue = ?cue, "Announcement: {}", speech)
        }
        (Some(cue), None) => info!(kind = ?announcement.kind, cue = ?cue, "Announcement cue"),
        (None, Some(speech)) => info!(kind = ?announcement.kind, "Announcement: {}", speech),
        (None, None) => {}
    }
}
