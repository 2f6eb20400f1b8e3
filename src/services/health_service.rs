use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report degraded mode, pinging the store when a scoreboard is installed.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_scoreboard().await {
        Ok(service) => {
            if let Err(err) = service.store().health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        Err(_) => warn!("storage unavailable (degraded mode)"),
    }

    if state.is_degraded() {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
