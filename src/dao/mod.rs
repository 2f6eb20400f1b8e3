/// Persisted game and channel documents.
pub mod models;
/// Document store abstraction and its backends.
pub mod score_store;
/// Backend-agnostic storage errors.
pub mod storage;
