//! Reconciles the declarative games configuration with persisted games and channels.
//!
//! Running a sync any number of times leaves the same games, channels and memberships as
//! running it once. Existing games are never rewritten: their categories, scores and enabled
//! flag stay as persisted, and a differing `enabled` in the configuration is only reported.
//!
//! An entry's category declarations are validated even when its game already exists. An
//! invalid declaration fails the whole entry, so none of its channels are created or linked
//! on that run.

use std::collections::HashSet;

use indexmap::IndexSet;
use thiserror::Error;
use tracing::debug;

use crate::{
    config::{
        CategorySpec, ConfigError, DEFAULT_CATEGORY_NAME, DEFAULT_SCORE_FORMAT, GameConfig,
        GamesConfig,
    },
    dao::models::{CategoryEntity, ChannelEntity, DEFAULT_CATEGORY_LABEL, ScoreKind, ScoreType},
    domain::{category::MAX_CATEGORY_DEPTH, score::validate_pattern},
    error::ServiceError,
    services::scoreboard_service::ScoreboardService,
};

/// Why a configuration entry was not fully synchronized.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Configured and persisted enabled flags of a game that already existed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnabledDrift {
    pub configured: bool,
    pub persisted: bool,
}

/// What a successful entry sync changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSyncOutcome {
    pub game: String,
    /// The game document was created by this run.
    pub created: bool,
    pub enabled_drift: Option<EnabledDrift>,
    /// Channels created by this run, holding just this game.
    pub channels_created: Vec<String>,
    /// Existing channels the game was appended to.
    pub channels_linked: Vec<String>,
}

/// Result of one configuration entry.
#[derive(Debug)]
pub struct EntryReport {
    /// Position of the entry in the configuration file.
    pub index: usize,
    pub outcome: Result<GameSyncOutcome, SyncError>,
}

/// Per-entry results of a sync run, in configuration order.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub entries: Vec<EntryReport>,
}

impl SyncReport {
    pub fn outcomes(&self) -> impl Iterator<Item = &GameSyncOutcome> {
        self.entries
            .iter()
            .filter_map(|entry| entry.outcome.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (usize, &SyncError)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.outcome.as_ref().err().map(|err| (entry.index, err)))
    }

    /// Games created by this run.
    pub fn created_games(&self) -> Vec<&str> {
        self.outcomes()
            .filter(|outcome| outcome.created)
            .map(|outcome| outcome.game.as_str())
            .collect()
    }

    /// Whether the run changed nothing and every entry succeeded.
    pub fn is_noop(&self) -> bool {
        self.failures().next().is_none()
            && self.outcomes().all(|outcome| {
                !outcome.created
                    && outcome.channels_created.is_empty()
                    && outcome.channels_linked.is_empty()
            })
    }
}

/// Applies a [`GamesConfig`] through a [`ScoreboardService`].
pub struct ConfigSyncEngine {
    service: ScoreboardService,
}

impl ConfigSyncEngine {
    pub fn new(service: ScoreboardService) -> Self {
        Self { service }
    }

    /// Synchronize every entry; a failing entry never stops the following ones.
    pub async fn sync(&self, config: &GamesConfig) -> SyncReport {
        let mut report = SyncReport::default();
        for (index, entry) in config.games.iter().enumerate() {
            let outcome = match entry {
                Ok(game) => self.sync_entry(game).await,
                Err(err) => Err(SyncError::Config(err.clone())),
            };
            report.entries.push(EntryReport { index, outcome });
        }
        report
    }

    /// Synchronize a single game entry and its channel memberships.
    ///
    /// A game created before a channel write fails stays persisted.
    pub async fn sync_entry(&self, entry: &GameConfig) -> Result<GameSyncOutcome, SyncError> {
        let categories = build_category_tree(&entry.name, entry.categories.as_deref())?;
        let (game, created) = self
            .service
            .add_game(&entry.name, entry.enabled, categories)
            .await?;
        debug!(game = %game.name, created, "game synchronized");

        let enabled_drift =
            (!created && game.is_enabled != entry.enabled).then_some(EnabledDrift {
                configured: entry.enabled,
                persisted: game.is_enabled,
            });

        let mut outcome = GameSyncOutcome {
            game: game.name.clone(),
            created,
            enabled_drift,
            channels_created: Vec::new(),
            channels_linked: Vec::new(),
        };

        let channels: IndexSet<&str> = entry.channels.iter().map(String::as_str).collect();
        for channel_name in channels {
            let _guard = self.service.locks().lock_channel(channel_name).await;
            let store = self.service.store();
            let existing = store
                .find_channel(channel_name.to_owned())
                .await
                .map_err(ServiceError::from)?;
            match existing {
                None => {
                    let channel = ChannelEntity::new(channel_name, vec![game.name.clone()]);
                    store.save_channel(channel).await.map_err(ServiceError::from)?;
                    debug!(channel = %channel_name, game = %game.name, "channel created");
                    outcome.channels_created.push(channel_name.to_owned());
                }
                Some(mut channel) if !channel.has_game(&game.name) => {
                    channel.games.push(game.name.clone());
                    store.save_channel(channel).await.map_err(ServiceError::from)?;
                    debug!(channel = %channel_name, game = %game.name, "game linked to channel");
                    outcome.channels_linked.push(channel_name.to_owned());
                }
                Some(_) => {}
            }
        }

        Ok(outcome)
    }
}

/// Build the category forest of a game entry; no declared categories means a single
/// default time leaf.
pub fn build_category_tree(
    game: &str,
    specs: Option<&[CategorySpec]>,
) -> Result<Vec<CategoryEntity>, ConfigError> {
    match specs {
        None => Ok(vec![CategoryEntity::leaf(
            DEFAULT_CATEGORY_NAME,
            DEFAULT_CATEGORY_LABEL,
            true,
            ScoreKind::Time {
                score_fmt: DEFAULT_SCORE_FORMAT.to_owned(),
            },
        )]),
        Some(specs) => build_level(game, specs, DEFAULT_CATEGORY_LABEL, 0),
    }
}

fn build_level(
    game: &str,
    specs: &[CategorySpec],
    label: &str,
    depth: usize,
) -> Result<Vec<CategoryEntity>, ConfigError> {
    if depth >= MAX_CATEGORY_DEPTH {
        return Err(ConfigError::TooDeep {
            game: game.to_owned(),
            max: MAX_CATEGORY_DEPTH,
        });
    }

    let mut seen = HashSet::new();
    let mut level = Vec::with_capacity(specs.len());
    for spec in specs {
        if !seen.insert(spec.name.as_str()) {
            return Err(ConfigError::DuplicateCategory {
                game: game.to_owned(),
                category: spec.name.clone(),
            });
        }
        level.push(build_node(game, spec, label, depth)?);
    }
    Ok(level)
}

fn build_node(
    game: &str,
    spec: &CategorySpec,
    label: &str,
    depth: usize,
) -> Result<CategoryEntity, ConfigError> {
    let enabled = spec.enabled.unwrap_or(true);
    match (&spec.subcategory, spec.score_type.as_deref()) {
        (Some(_), Some(_)) => Err(ConfigError::AmbiguousRole {
            game: game.to_owned(),
            category: spec.name.clone(),
        }),
        (Some(sub), None) => {
            let children = build_level(game, &sub.categories, &sub.label, depth + 1)?;
            Ok(CategoryEntity::interior(&spec.name, label, enabled, children))
        }
        (None, Some(score_type)) => {
            let kind = leaf_kind(game, spec, score_type)?;
            Ok(CategoryEntity::leaf(&spec.name, label, enabled, kind))
        }
        (None, None) => Err(ConfigError::MissingScoreType {
            game: game.to_owned(),
            category: spec.name.clone(),
        }),
    }
}

fn leaf_kind(game: &str, spec: &CategorySpec, score_type: &str) -> Result<ScoreKind, ConfigError> {
    let score_error = |source| ConfigError::Score {
        game: game.to_owned(),
        category: spec.name.clone(),
        source,
    };

    match score_type.parse::<ScoreType>().map_err(score_error)? {
        ScoreType::Point => Ok(ScoreKind::Point),
        ScoreType::Time => {
            let score_fmt =
                spec.score_fmt
                    .clone()
                    .ok_or_else(|| ConfigError::MissingScoreFormat {
                        game: game.to_owned(),
                        category: spec.name.clone(),
                    })?;
            validate_pattern(&score_fmt).map_err(score_error)?;
            Ok(ScoreKind::Time { score_fmt })
        }
    }
}
