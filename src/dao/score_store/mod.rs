#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::{
    config::StoreBackend,
    dao::{
        models::{ChannelEntity, GameEntity},
        storage::StorageResult,
    },
};

/// Abstraction over the document store holding games and channels.
///
/// Documents are always written whole; there is no partial update.
pub trait ScoreStore: Send + Sync {
    fn find_game(&self, name: String) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    fn find_channel(&self, name: String)
    -> BoxFuture<'static, StorageResult<Option<ChannelEntity>>>;
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Games whose enabled flag equals `enabled`.
    fn find_games_by_enabled(
        &self,
        enabled: bool,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Resolve channel references; unknown names are skipped.
    fn find_games_by_names(
        &self,
        names: Vec<String>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    fn list_channels(&self) -> BoxFuture<'static, StorageResult<Vec<ChannelEntity>>>;
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn save_channel(&self, channel: ChannelEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Open the store selected by `backend`.
pub async fn connect(backend: &StoreBackend) -> StorageResult<Arc<dyn ScoreStore>> {
    match backend {
        StoreBackend::Memory => Ok(Arc::new(memory::MemoryScoreStore::new())),
        #[cfg(feature = "mongo-store")]
        StoreBackend::Mongo => {
            let config = self::mongodb::MongoConfig::from_env().await?;
            let store = self::mongodb::MongoScoreStore::connect(config).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "mongo-store"))]
        StoreBackend::Mongo => Err(crate::dao::storage::StorageError::BackendDisabled { backend: "mongo" }),
        #[cfg(feature = "couch-store")]
        StoreBackend::Couch => {
            let config = couchdb::CouchConfig::from_env()?;
            let store = couchdb::CouchScoreStore::connect(config).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "couch-store"))]
        StoreBackend::Couch => Err(crate::dao::storage::StorageError::BackendDisabled { backend: "couch" }),
    }
}
