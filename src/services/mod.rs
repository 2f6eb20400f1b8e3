/// Request-facing operations backing the REST routes.
pub mod command_service;
/// Games configuration synchronization.
pub mod config_sync;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Scoreboard queries and score recording.
pub mod scoreboard_service;
/// Storage connection supervisor with reconnection backoff.
pub mod storage_supervisor;
