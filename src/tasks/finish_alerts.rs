//! Finish-alert background task

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::{services::deliver_finish_alert, state::AppState};

/// Background task that announces every finished stage.
///
/// Runs detached from the controller: a slow or failing notification never
/// holds up the countdown.
pub async fn finish_alerts_task(state: Arc<AppState>) {
    info!("Starting finish alerts task");

    let mut finish_rx = state.subscribe_finish();

    loop {
        match finish_rx.recv().await {
            Ok(event) => deliver_finish_alert(&event, &state.alerts).await,
            Err(RecvError::Lagged(missed)) => {
                warn!("Finish alerts fell behind, {} events skipped", missed);
            }
            Err(RecvError::Closed) => {
                info!("Finish event channel closed, stopping alerts task");
                break;
            }
        }
    }
}
