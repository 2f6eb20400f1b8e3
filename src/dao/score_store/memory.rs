//! Process-local store keeping documents in insertion order; backs tests and `STORE_BACKEND=memory`.

use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use crate::dao::{
    models::{ChannelEntity, GameEntity},
    score_store::ScoreStore,
    storage::StorageResult,
};

#[derive(Clone, Default)]
pub struct MemoryScoreStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    games: RwLock<IndexMap<String, GameEntity>>,
    channels: RwLock<IndexMap<String, ChannelEntity>>,
}

impl MemoryScoreStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn filter_games(&self, keep: impl Fn(&GameEntity) -> bool) -> Vec<GameEntity> {
        let games = self.inner.games.read().await;
        games.values().filter(|&game| keep(game)).cloned().collect()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn find_game(&self, name: String) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.games.read().await.get(&name).cloned()) })
    }

    fn find_channel(
        &self,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<ChannelEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.channels.read().await.get(&name).cloned()) })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.filter_games(|_| true).await) })
    }

    fn find_games_by_enabled(
        &self,
        enabled: bool,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .filter_games(|game| game.is_enabled == enabled)
                .await)
        })
    }

    fn find_games_by_names(
        &self,
        names: Vec<String>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .filter_games(|game| names.contains(&game.name))
                .await)
        })
    }

    fn list_channels(&self) -> BoxFuture<'static, StorageResult<Vec<ChannelEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.channels.read().await.values().cloned().collect()) })
    }

    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.games.write().await.insert(game.name.clone(), game);
            Ok(())
        })
    }

    fn save_channel(&self, channel: ChannelEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .inner
                .channels
                .write()
                .await
                .insert(channel.name.clone(), channel);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
