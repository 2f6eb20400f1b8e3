//! Scoreboard operations over persisted games and channels.
//!
//! Every mutation reads the owning document, changes it in memory and writes it back whole
//! while holding the per-document lock from [`KeyedLocks`].

use std::{collections::HashMap, sync::Arc, time::SystemTime};

use indexmap::IndexSet;

use crate::{
    dao::{
        models::{CategoryEntity, GameEntity, ScoreEntity},
        score_store::ScoreStore,
    },
    domain::{
        ScoreError,
        category::{find, find_mut, find_path, list_enabled},
        score::{RenderedScore, parse_score, render_score},
    },
    error::ServiceError,
    state::KeyedLocks,
};

/// One listed score, rendered with its category's pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub player_id: String,
    pub value: RenderedScore,
    pub created_at: SystemTime,
}

/// Handle on the scoreboard, cheap to clone.
#[derive(Clone)]
pub struct ScoreboardService {
    store: Arc<dyn ScoreStore>,
    locks: KeyedLocks,
}

impl ScoreboardService {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    /// Backing store, used by the supervisor for health checks.
    pub fn store(&self) -> Arc<dyn ScoreStore> {
        self.store.clone()
    }

    pub(crate) fn locks(&self) -> &KeyedLocks {
        &self.locks
    }

    /// Names of every enabled game.
    pub async fn list_active_games(&self) -> Result<IndexSet<String>, ServiceError> {
        let games = self.store.find_games_by_enabled(true).await?;
        Ok(games.into_iter().map(|game| game.name).collect())
    }

    /// Names of the channels referencing at least one enabled game.
    pub async fn list_active_channels(&self) -> Result<IndexSet<String>, ServiceError> {
        let active = self.list_active_games().await?;
        let channels = self.store.list_channels().await?;
        Ok(channels
            .into_iter()
            .filter(|channel| channel.games.iter().any(|game| active.contains(game)))
            .map(|channel| channel.name)
            .collect())
    }

    pub async fn list_all_channels(&self) -> Result<IndexSet<String>, ServiceError> {
        let channels = self.store.list_channels().await?;
        Ok(channels.into_iter().map(|channel| channel.name).collect())
    }

    /// Games referenced by `channel`, in membership order.
    ///
    /// `enabled` keeps only games with that flag; `None` keeps all of them. References to
    /// games that no longer resolve are left out of every view. Returns `None` when the channel
    /// does not exist.
    pub async fn games_in_channel(
        &self,
        channel: &str,
        enabled: Option<bool>,
    ) -> Result<Option<Vec<String>>, ServiceError> {
        let Some(channel) = self.store.find_channel(channel.to_owned()).await? else {
            return Ok(None);
        };

        let resolved: HashMap<String, bool> = self
            .store
            .find_games_by_names(channel.games.clone())
            .await?
            .into_iter()
            .map(|game| (game.name, game.is_enabled))
            .collect();

        let games = channel
            .games
            .into_iter()
            .filter(|name| match (resolved.get(name), enabled) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(is_enabled), Some(wanted)) => *is_enabled == wanted,
            })
            .collect();

        Ok(Some(games))
    }

    /// Immediate categories of `game` whose enabled flag equals `enabled`.
    pub async fn categories_for_game(
        &self,
        game: &str,
        enabled: bool,
    ) -> Result<Vec<String>, ServiceError> {
        let game = self.require_game(game).await?;
        Ok(list_enabled(&game.categories, enabled))
    }

    pub async fn find_game(&self, name: &str) -> Result<Option<GameEntity>, ServiceError> {
        Ok(self.store.find_game(name.to_owned()).await?)
    }

    /// Create and persist a game unless one with that name already exists.
    ///
    /// Returns the persisted game and whether it was created by this call. An existing game is
    /// returned untouched.
    pub async fn add_game(
        &self,
        name: &str,
        is_enabled: bool,
        categories: Vec<CategoryEntity>,
    ) -> Result<(GameEntity, bool), ServiceError> {
        let _guard = self.locks.lock_game(name).await;
        if let Some(existing) = self.store.find_game(name.to_owned()).await? {
            return Ok((existing, false));
        }

        let game = GameEntity::new(name, is_enabled, categories);
        self.store.save_game(game.clone()).await?;
        Ok((game, true))
    }

    /// Parse `raw` against the category's declared type and record it for `player_id`.
    ///
    /// Nothing is persisted when the game or category is unknown or the value is rejected.
    pub async fn add_score(
        &self,
        player_id: &str,
        game: &str,
        raw: &str,
        category: &str,
    ) -> Result<ScoreRecord, ServiceError> {
        if player_id.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "player id must not be empty".into(),
            ));
        }

        let _guard = self.locks.lock_game(game).await;
        let mut entity = self.require_game(game).await?;

        let node = find_mut(&mut entity.categories, category).ok_or_else(|| {
            ServiceError::UnknownCategory {
                game: game.to_owned(),
                category: category.to_owned(),
            }
        })?;
        let kind = node
            .score_kind()
            .cloned()
            .ok_or_else(|| ScoreError::NotLeaf {
                category: node.name.clone(),
            })?;

        let value = parse_score(&kind, raw.trim())?;
        let score = ScoreEntity::new(player_id, value);
        let record = ScoreRecord {
            player_id: score.player_id.clone(),
            value: render_score(&kind, &score.value),
            created_at: score.created_at,
        };
        node.append_score(score)?;

        entity.updated_at = SystemTime::now();
        self.store.save_game(entity).await?;
        Ok(record)
    }

    /// Scores of a leaf category in the order they were recorded.
    pub async fn list_scores(
        &self,
        game: &str,
        category: &str,
    ) -> Result<Vec<ScoreRecord>, ServiceError> {
        let entity = self.require_game(game).await?;
        let node =
            find(&entity.categories, category).ok_or_else(|| ServiceError::UnknownCategory {
                game: game.to_owned(),
                category: category.to_owned(),
            })?;

        let (Some(kind), Some(scores)) = (node.score_kind(), node.scores()) else {
            return Err(ServiceError::NotLeaf(node.name.clone()));
        };

        Ok(scores
            .iter()
            .map(|score| ScoreRecord {
                player_id: score.player_id.clone(),
                value: render_score(kind, &score.value),
                created_at: score.created_at,
            })
            .collect())
    }

    /// Whether `game` is an enabled game of `channel`; unknown channels host nothing.
    pub async fn is_game_available_for_channel(
        &self,
        game: &str,
        channel: &str,
    ) -> Result<bool, ServiceError> {
        let games = self.games_in_channel(channel, Some(true)).await?;
        Ok(games.is_some_and(|games| games.iter().any(|name| name == game)))
    }

    /// Whether `category` resolves in `game` with it and every ancestor enabled.
    pub async fn is_category_available_for_game(
        &self,
        category: &str,
        game: &str,
    ) -> Result<bool, ServiceError> {
        let entity = self.require_game(game).await?;
        Ok(find_path(&entity.categories, category)
            .is_some_and(|path| path.iter().all(|node| node.is_enabled)))
    }

    async fn require_game(&self, name: &str) -> Result<GameEntity, ServiceError> {
        self.store
            .find_game(name.to_owned())
            .await?
            .ok_or_else(|| ServiceError::UnknownGame(name.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::{
        models::{ChannelEntity, ScoreKind},
        score_store::memory::MemoryScoreStore,
    };

    async fn seeded() -> (ScoreboardService, MemoryScoreStore) {
        let store = MemoryScoreStore::new();
        let mk64 = GameEntity::new(
            "mk64",
            true,
            vec![
                CategoryEntity::interior(
                    "Single track",
                    "Category",
                    true,
                    vec![CategoryEntity::leaf(
                        "Toad Turnpike",
                        "Track",
                        true,
                        ScoreKind::Time {
                            score_fmt: "%M:%S%.3f".into(),
                        },
                    )],
                ),
                CategoryEntity::leaf("time-trial", "Category", true, ScoreKind::Point),
                CategoryEntity::leaf("retired", "Category", false, ScoreKind::Point),
            ],
        );
        let smb3 = GameEntity::new("smb3", false, Vec::new());
        store.save_game(mk64).await.unwrap();
        store.save_game(smb3).await.unwrap();
        store
            .save_channel(ChannelEntity::new(
                "retro",
                vec!["mk64".into(), "smb3".into(), "gone".into()],
            ))
            .await
            .unwrap();
        store
            .save_channel(ChannelEntity::new("lobby", vec!["smb3".into()]))
            .await
            .unwrap();

        (ScoreboardService::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn active_listings() {
        let (service, _) = seeded().await;
        let games: Vec<_> = service.list_active_games().await.unwrap().into_iter().collect();
        assert_eq!(games, vec!["mk64"]);

        let active: Vec<_> = service
            .list_active_channels()
            .await
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(active, vec!["retro"]);

        let all = service.list_all_channels().await.unwrap();
        assert!(all.contains("lobby") && all.contains("retro"));
    }

    #[tokio::test]
    async fn channel_views_split_on_enabled_flag() {
        let (service, _) = seeded().await;
        let enabled = service.games_in_channel("retro", Some(true)).await.unwrap();
        let disabled = service.games_in_channel("retro", Some(false)).await.unwrap();
        let all = service.games_in_channel("retro", None).await.unwrap();

        assert_eq!(enabled, Some(vec!["mk64".to_string()]));
        assert_eq!(disabled, Some(vec!["smb3".to_string()]));
        assert_eq!(all, Some(vec!["mk64".to_string(), "smb3".to_string()]));
        assert_eq!(service.games_in_channel("nowhere", None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn categories_are_listed_one_level_deep() {
        let (service, _) = seeded().await;
        let enabled = service.categories_for_game("mk64", true).await.unwrap();
        assert_eq!(enabled, vec!["Single track", "time-trial"]);
        let disabled = service.categories_for_game("mk64", false).await.unwrap();
        assert_eq!(disabled, vec!["retired"]);
        assert!(matches!(
            service.categories_for_game("zelda", true).await,
            Err(ServiceError::UnknownGame(_))
        ));
    }

    #[tokio::test]
    async fn nested_time_score_is_recorded_and_rendered() {
        let (service, store) = seeded().await;
        let record = service
            .add_score("alice", "mk64", "01:23.456", "Toad Turnpike")
            .await
            .unwrap();
        assert_eq!(record.value, RenderedScore::Time("01:23.456".into()));

        let listed = service.list_scores("mk64", "Toad Turnpike").await.unwrap();
        assert_eq!(listed, vec![record]);

        let persisted = store.find_game("mk64".into()).await.unwrap().unwrap();
        let leaf = find(&persisted.categories, "Toad Turnpike").unwrap();
        assert_eq!(leaf.scores().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn scores_keep_insertion_order() {
        let (service, _) = seeded().await;
        for (player, raw) in [("bob", "90"), ("alice", "120"), ("carol", "15")] {
            service
                .add_score(player, "mk64", raw, "time-trial")
                .await
                .unwrap();
        }
        let players: Vec<_> = service
            .list_scores("mk64", "time-trial")
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.player_id)
            .collect();
        assert_eq!(players, vec!["bob", "alice", "carol"]);
    }

    #[tokio::test]
    async fn lookup_failures_come_before_parsing() {
        let (service, _) = seeded().await;
        assert!(matches!(
            service.add_score("alice", "zelda", "not-a-number", "any").await,
            Err(ServiceError::UnknownGame(_))
        ));
        assert!(matches!(
            service.add_score("alice", "mk64", "not-a-number", "rainbow").await,
            Err(ServiceError::UnknownCategory { .. })
        ));
        assert!(matches!(
            service.add_score("alice", "mk64", "1", "Single track").await,
            Err(ServiceError::NotLeaf(_))
        ));
        assert!(matches!(
            service.add_score(" ", "mk64", "1", "time-trial").await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn availability_checks() {
        let (service, _) = seeded().await;
        assert!(service.is_game_available_for_channel("mk64", "retro").await.unwrap());
        assert!(!service.is_game_available_for_channel("smb3", "retro").await.unwrap());
        assert!(!service.is_game_available_for_channel("mk64", "nowhere").await.unwrap());

        assert!(service
            .is_category_available_for_game("Toad Turnpike", "mk64")
            .await
            .unwrap());
        assert!(!service
            .is_category_available_for_game("retired", "mk64")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn disabled_parent_closes_its_subtree() {
        let store = MemoryScoreStore::new();
        let game = GameEntity::new(
            "mk64",
            true,
            vec![CategoryEntity::interior(
                "Single track",
                "Category",
                false,
                vec![CategoryEntity::leaf("Toad Turnpike", "Track", true, ScoreKind::Point)],
            )],
        );
        store.save_game(game).await.unwrap();
        let service = ScoreboardService::new(Arc::new(store));

        assert!(service.categories_for_game("mk64", true).await.unwrap().is_empty());
        assert!(!service
            .is_category_available_for_game("Toad Turnpike", "mk64")
            .await
            .unwrap());
        assert!(!service
            .is_category_available_for_game("Single track", "mk64")
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn add_game_keeps_existing_document() {
        let (service, _) = seeded().await;
        let (game, created) = service.add_game("mk64", false, Vec::new()).await.unwrap();
        assert!(!created);
        assert!(game.is_enabled);
        assert_eq!(game.categories.len(), 3);

        let (game, created) = service.add_game("tetris", true, Vec::new()).await.unwrap();
        assert!(created);
        assert_eq!(service.find_game("tetris").await.unwrap(), Some(game));
    }
}
