use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database,
    bson::{Document, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoChannelDocument, MongoGameDocument},
};
use crate::dao::{
    models::{ChannelEntity, GameEntity},
    score_store::ScoreStore,
    storage::StorageResult,
};

const GAME_COLLECTION_NAME: &str = "games";
const CHANNEL_COLLECTION_NAME: &str = "channels";

/// MongoDB-backed store; games and channels live in their own collections, keyed by unique name.
#[derive(Clone)]
pub struct MongoScoreStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoScoreStore {
    /// Establish a connection to MongoDB and ensure the name indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;
        for (collection_name, index_name) in [
            (GAME_COLLECTION_NAME, "game_name_idx"),
            (CHANNEL_COLLECTION_NAME, "channel_name_idx"),
        ] {
            let collection = database.collection::<Document>(collection_name);
            let index = mongodb::IndexModel::builder()
                .keys(doc! {"name": 1})
                .options(
                    IndexOptions::builder()
                        .name(Some(index_name.to_owned()))
                        .unique(Some(true))
                        .build(),
                )
                .build();

            collection
                .create_index(index)
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection: collection_name,
                    index: "name",
                    source,
                })?;
        }

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn games(&self) -> Collection<MongoGameDocument> {
        self.database()
            .await
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn channels(&self) -> Collection<MongoChannelDocument> {
        self.database()
            .await
            .collection::<MongoChannelDocument>(CHANNEL_COLLECTION_NAME)
    }

    async fn find_game(&self, name: String) -> MongoResult<Option<GameEntity>> {
        let document = self
            .games()
            .await
            .find_one(doc! {"name": name.as_str()})
            .await
            .map_err(|source| MongoDaoError::LoadGame { name, source })?;

        Ok(document.map(Into::into))
    }

    async fn find_channel(&self, name: String) -> MongoResult<Option<ChannelEntity>> {
        let document = self
            .channels()
            .await
            .find_one(doc! {"name": name.as_str()})
            .await
            .map_err(|source| MongoDaoError::LoadChannel { name, source })?;

        Ok(document.map(Into::into))
    }

    async fn query_games(&self, filter: Document) -> MongoResult<Vec<GameEntity>> {
        let documents: Vec<MongoGameDocument> = self
            .games()
            .await
            .find(filter)
            .await
            .map_err(|source| MongoDaoError::QueryGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::QueryGames { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn list_channels(&self) -> MongoResult<Vec<ChannelEntity>> {
        let documents: Vec<MongoChannelDocument> = self
            .channels()
            .await
            .find(doc! {})
            .await
            .map_err(|source| MongoDaoError::ListChannels { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListChannels { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    /// Replace the whole game document, inserting it on first save.
    async fn save_game(&self, game: GameEntity) -> MongoResult<()> {
        let name = game.name.clone();
        let document: MongoGameDocument = game.into();
        self.games()
            .await
            .replace_one(doc! {"name": name.as_str()}, &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveGame { name, source })?;

        Ok(())
    }

    async fn save_channel(&self, channel: ChannelEntity) -> MongoResult<()> {
        let name = channel.name.clone();
        let document: MongoChannelDocument = channel.into();
        self.channels()
            .await
            .replace_one(doc! {"name": name.as_str()}, &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveChannel { name, source })?;

        Ok(())
    }
}

impl ScoreStore for MongoScoreStore {
    fn find_game(&self, name: String) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(name).await.map_err(Into::into) })
    }

    fn find_channel(
        &self,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<ChannelEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_channel(name).await.map_err(Into::into) })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.query_games(doc! {}).await.map_err(Into::into) })
    }

    fn find_games_by_enabled(
        &self,
        enabled: bool,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .query_games(doc! {"is_enabled": enabled})
                .await
                .map_err(Into::into)
        })
    }

    fn find_games_by_names(
        &self,
        names: Vec<String>,
    ) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .query_games(doc! {"name": {"$in": names}})
                .await
                .map_err(Into::into)
        })
    }

    fn list_channels(&self) -> BoxFuture<'static, StorageResult<Vec<ChannelEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_channels().await.map_err(Into::into) })
    }

    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_game(game).await.map_err(Into::into) })
    }

    fn save_channel(&self, channel: ChannelEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_channel(channel).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}
