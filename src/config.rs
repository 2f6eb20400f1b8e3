//! Runtime configuration: the declarative games file and the storage backend selection.

use std::{env, fs, io::ErrorKind, path::PathBuf, sync::Arc};

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};
use validator::{Validate, ValidationErrors};

use crate::domain::ScoreError;

/// Default location on disk where the server looks for the games configuration.
const DEFAULT_GAMES_CONFIG_PATH: &str = "config/games.json";
/// Environment variable that overrides [`DEFAULT_GAMES_CONFIG_PATH`].
const GAMES_CONFIG_PATH_ENV: &str = "SCOREBOARD_GAMES_CONFIG_PATH";
/// Environment variable selecting the storage backend.
const STORE_BACKEND_ENV: &str = "STORE_BACKEND";

/// Name of the category implied when a game declares none.
pub const DEFAULT_CATEGORY_NAME: &str = "Default";
/// Pattern of the implied default category.
pub const DEFAULT_SCORE_FORMAT: &str = "mm:ss.ffffff";

/// A games configuration entry that cannot be synchronized.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("games config entry #{index} is malformed: {source}")]
    Malformed {
        index: usize,
        #[source]
        source: Arc<serde_json::Error>,
    },
    #[error("games config entry `{game}` is invalid: {source}")]
    Invalid {
        game: String,
        #[source]
        source: ValidationErrors,
    },
    #[error("category `{category}` of game `{game}` declares no score_type")]
    MissingScoreType { game: String, category: String },
    #[error("time category `{category}` of game `{game}` declares no score_fmt")]
    MissingScoreFormat { game: String, category: String },
    #[error("category `{category}` of game `{game}` declares both a score_type and subcategories")]
    AmbiguousRole { game: String, category: String },
    #[error("category `{category}` appears twice under the same parent in game `{game}`")]
    DuplicateCategory { game: String, category: String },
    #[error("categories of game `{game}` are nested deeper than {max} levels")]
    TooDeep { game: String, max: usize },
    #[error("category `{category}` of game `{game}` is unusable")]
    Score {
        game: String,
        category: String,
        #[source]
        source: ScoreError,
    },
}

/// Declarative list of games, each entry decoded on its own so one bad entry cannot hide the rest.
#[derive(Debug, Default)]
pub struct GamesConfig {
    pub games: Vec<Result<GameConfig, ConfigError>>,
}

/// One configured game.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GameConfig {
    #[validate(length(min = 1, message = "game name must not be empty"))]
    pub name: String,
    pub enabled: bool,
    #[serde(rename = "channel")]
    #[validate(custom(function = "validate_channel_names"))]
    pub channels: Vec<String>,
    /// Top-level categories; absent means a single implied default category.
    #[serde(rename = "category", default)]
    pub categories: Option<Vec<CategorySpec>>,
}

/// Declarative category node.
#[derive(Debug, Clone, Deserialize)]
pub struct CategorySpec {
    pub name: String,
    #[serde(default)]
    pub score_type: Option<String>,
    #[serde(default)]
    pub score_fmt: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub subcategory: Option<SubcategorySpec>,
}

/// Nested block turning its parent into an interior category.
#[derive(Debug, Clone, Deserialize)]
pub struct SubcategorySpec {
    /// Label shared by every child declared in this block.
    pub label: String,
    #[serde(rename = "category")]
    pub categories: Vec<CategorySpec>,
}

#[derive(Debug, Deserialize)]
/// JSON representation of the file located at [`DEFAULT_GAMES_CONFIG_PATH`].
struct RawGamesConfig {
    #[serde(default)]
    games: Vec<Value>,
}

impl GamesConfig {
    /// Load the games configuration from disk; an absent or unreadable file yields no games.
    pub fn load() -> Self {
        let path = resolve_games_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        count = config.games.len(),
                        "loaded games config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse games config; no games will be synchronized"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "games config not found; no games will be synchronized"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read games config; no games will be synchronized"
                );
                Self::default()
            }
        }
    }

    /// Parse the file contents. Only a malformed top level fails; entries fail one by one.
    pub fn parse(contents: &str) -> Result<Self, serde_json::Error> {
        // Decoding into a map first rejects a top-level array, which the struct visitor accepts.
        let top: Map<String, Value> = serde_json::from_str(contents)?;
        let raw: RawGamesConfig = serde_json::from_value(Value::Object(top))?;
        let games = raw
            .games
            .into_iter()
            .enumerate()
            .map(|(index, value)| GameConfig::from_value(index, value))
            .collect();
        Ok(Self { games })
    }
}

impl GameConfig {
    fn from_value(index: usize, value: Value) -> Result<Self, ConfigError> {
        let game: GameConfig = serde_json::from_value(value)
            .map_err(|source| ConfigError::Malformed {
                index,
                source: Arc::new(source),
            })?;
        game.validate().map_err(|source| ConfigError::Invalid {
            game: game.name.clone(),
            source,
        })?;
        Ok(game)
    }
}

fn validate_channel_names(channels: &[String]) -> Result<(), validator::ValidationError> {
    if channels.iter().any(|name| name.trim().is_empty()) {
        let mut err = validator::ValidationError::new("channel_name");
        err.message = Some("channel names must not be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Resolve the games configuration path taking the environment override into account.
fn resolve_games_config_path() -> PathBuf {
    env::var_os(GAMES_CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_GAMES_CONFIG_PATH))
}

/// Persistence backend the binary connects to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Couch,
    Memory,
}

impl StoreBackend {
    /// Read `STORE_BACKEND`; unknown values fall back to MongoDB.
    pub fn from_env() -> Self {
        match env::var(STORE_BACKEND_ENV) {
            Ok(value) => Self::from_name(&value).unwrap_or_else(|| {
                warn!(value = %value, "unknown storage backend; using mongo");
                StoreBackend::Mongo
            }),
            Err(_) => StoreBackend::Mongo,
        }
    }

    fn from_name(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Some(StoreBackend::Mongo),
            "couch" | "couchdb" => Some(StoreBackend::Couch),
            "memory" => Some(StoreBackend::Memory),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_fail_independently() {
        let config = GamesConfig::parse(
            r#"{
                "games": [
                    {"name": "mk64", "enabled": true, "channel": ["mk64-chat"]},
                    {"name": "smb3", "channel": ["retro"]},
                    {"name": "", "enabled": true, "channel": ["retro"]},
                    {"name": "tetris", "enabled": false, "channel": [" "]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.games.len(), 4);
        let mk64 = config.games[0].as_ref().unwrap();
        assert_eq!(mk64.name, "mk64");
        assert_eq!(mk64.channels, vec!["mk64-chat"]);
        assert!(mk64.categories.is_none());

        assert!(matches!(
            config.games[1],
            Err(ConfigError::Malformed { index: 1, .. })
        ));
        assert!(matches!(config.games[2], Err(ConfigError::Invalid { .. })));
        assert!(matches!(config.games[3], Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn nested_category_specs_decode() {
        let config = GamesConfig::parse(
            r#"{
                "games": [{
                    "name": "mk64",
                    "enabled": true,
                    "channel": ["mk64-chat"],
                    "category": [{
                        "name": "Single track",
                        "subcategory": {
                            "label": "Track",
                            "category": [
                                {"name": "Toad Turnpike", "score_type": "Time", "score_fmt": "%M:%S%.3f"}
                            ]
                        }
                    }]
                }]
            }"#,
        )
        .unwrap();

        let game = config.games[0].as_ref().unwrap();
        let categories = game.categories.as_ref().unwrap();
        let subcategory = categories[0].subcategory.as_ref().unwrap();
        assert_eq!(subcategory.label, "Track");
        assert_eq!(subcategory.categories[0].score_type.as_deref(), Some("Time"));
    }

    #[test]
    fn malformed_top_level_is_an_error() {
        assert!(GamesConfig::parse("[]").is_err());
        assert!(GamesConfig::parse(r#"[[{"name": "mk64"}]]"#).is_err());
        assert!(GamesConfig::parse("\"games\"").is_err());
        assert!(GamesConfig::parse("{}").unwrap().games.is_empty());
    }

    #[test]
    fn backend_names() {
        assert_eq!(StoreBackend::from_name("Mongo"), Some(StoreBackend::Mongo));
        assert_eq!(StoreBackend::from_name("couchdb"), Some(StoreBackend::Couch));
        assert_eq!(StoreBackend::from_name(" memory "), Some(StoreBackend::Memory));
        assert_eq!(StoreBackend::from_name("redis"), None);
    }
}
