pub mod locks;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{error::ServiceError, services::scoreboard_service::ScoreboardService};

pub use self::locks::KeyedLocks;

pub type SharedState = Arc<AppState>;

/// Central application state holding the scoreboard once storage is connected and synced.
pub struct AppState {
    scoreboard: RwLock<Option<ScoreboardService>>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a scoreboard is installed.
    pub fn new() -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            scoreboard: RwLock::new(None),
            degraded: degraded_tx,
        })
    }

    /// Obtain a handle to the installed scoreboard, if any.
    pub async fn scoreboard(&self) -> Option<ScoreboardService> {
        let guard = self.scoreboard.read().await;
        guard.as_ref().cloned()
    }

    /// Like [`AppState::scoreboard`] but fails with [`ServiceError::Degraded`] when none is installed.
    pub async fn require_scoreboard(&self) -> Result<ScoreboardService, ServiceError> {
        self.scoreboard().await.ok_or(ServiceError::Degraded)
    }

    /// Install a synced scoreboard and leave degraded mode.
    pub async fn install_scoreboard(&self, service: ScoreboardService) {
        {
            let mut guard = self.scoreboard.write().await;
            *guard = Some(service);
        }
        self.update_degraded(false);
    }

    /// Drop the current scoreboard and enter degraded mode.
    pub async fn clear_scoreboard(&self) {
        {
            let mut guard = self.scoreboard.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Update the degraded flag when the value changes.
    pub(crate) fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }
}
