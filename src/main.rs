//! Scoreboard backend binary entrypoint wiring storage, config sync and the REST layer.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scoreboard_back::{
    config::{GamesConfig, StoreBackend},
    dao::{score_store, storage::StorageError},
    routes,
    services::{
        config_sync::{ConfigSyncEngine, SyncReport},
        scoreboard_service::ScoreboardService,
        storage_supervisor,
    },
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let games_config = Arc::new(GamesConfig::load());
    let backend = StoreBackend::from_env();
    info!(?backend, "selected storage backend");

    let app_state = AppState::new();

    tokio::spawn(storage_supervisor::run(app_state.clone(), move || {
        let games_config = games_config.clone();
        async move { connect_and_sync(backend, &games_config).await }
    }));
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Open the store and apply the games configuration before handing out the scoreboard.
async fn connect_and_sync(
    backend: StoreBackend,
    games_config: &GamesConfig,
) -> Result<ScoreboardService, StorageError> {
    let store = score_store::connect(&backend).await?;
    let service = ScoreboardService::new(store);
    let report = ConfigSyncEngine::new(service.clone())
        .sync(games_config)
        .await;
    log_sync_report(&report);
    Ok(service)
}

fn log_sync_report(report: &SyncReport) {
    for outcome in report.outcomes() {
        if let Some(drift) = outcome.enabled_drift {
            warn!(
                game = %outcome.game,
                configured = drift.configured,
                persisted = drift.persisted,
                "games config enabled flag differs from the stored game; keeping the stored flag"
            );
        }
        let changed = outcome.created
            || !outcome.channels_created.is_empty()
            || !outcome.channels_linked.is_empty();
        if changed {
            info!(
                game = %outcome.game,
                created = outcome.created,
                channels_created = ?outcome.channels_created,
                channels_linked = ?outcome.channels_linked,
                "games config entry applied"
            );
        }
    }

    for (index, err) in report.failures() {
        warn!(index, error = %err, "games config entry skipped");
    }

    if report.is_noop() {
        info!(entries = report.entries.len(), "games config already in sync");
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
