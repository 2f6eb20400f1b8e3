use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Label given to categories that are not nested under a subcategory block.
pub const DEFAULT_CATEGORY_LABEL: &str = "Category";

/// Aggregate game document: the root owning the whole category forest and its scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Document identity.
    pub id: Uuid,
    /// Globally unique game name (natural key).
    pub name: String,
    /// Whether the game accepts and lists scores.
    pub is_enabled: bool,
    /// Top-level category forest.
    pub categories: Vec<CategoryEntity>,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the game document was written.
    pub updated_at: SystemTime,
}

impl GameEntity {
    /// Build a brand-new game document with a fresh identity.
    pub fn new(name: impl Into<String>, is_enabled: bool, categories: Vec<CategoryEntity>) -> Self {
        let now = SystemTime::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_enabled,
            categories,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Channel document referencing the games playable in it by name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelEntity {
    /// Document identity.
    pub id: Uuid,
    /// Globally unique channel name (natural key).
    pub name: String,
    /// Names of the referenced games, in insertion order and without duplicates.
    pub games: Vec<String>,
}

impl ChannelEntity {
    /// Build a new channel referencing the given games.
    pub fn new(name: impl Into<String>, games: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            games,
        }
    }

    /// Whether the channel already references `game`.
    pub fn has_game(&self, game: &str) -> bool {
        self.games.iter().any(|name| name == game)
    }
}

/// Node of a game's category tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryEntity {
    /// Name, unique among siblings only.
    pub name: String,
    /// Display grouping name shared by siblings declared in the same block.
    pub label: String,
    pub is_enabled: bool,
    /// Leaf or interior role, fixed at construction.
    #[serde(flatten)]
    pub role: CategoryRole,
}

/// Role a category plays in the tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum CategoryRole {
    /// Accumulates scores of a single declared type.
    Leaf {
        kind: ScoreKind,
        scores: Vec<ScoreEntity>,
    },
    /// Groups child categories and holds no scores.
    Interior { categories: Vec<CategoryEntity> },
}

/// Declared score type of a leaf category, with the format time scores are parsed and rendered with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "score_type")]
pub enum ScoreKind {
    Time { score_fmt: String },
    Point,
}

/// Discriminant shared by [`ScoreKind`] and [`ScoreValue`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScoreType {
    Time,
    Point,
}

/// One player's recorded result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreEntity {
    pub player_id: String,
    /// Set once when the score is recorded.
    pub created_at: SystemTime,
    pub value: ScoreValue,
}

/// Typed score payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ScoreValue {
    /// Elapsed time, stored as a time of day.
    Time(NaiveTime),
    Point(i64),
}

impl ScoreKind {
    pub fn score_type(&self) -> ScoreType {
        match self {
            ScoreKind::Time { .. } => ScoreType::Time,
            ScoreKind::Point => ScoreType::Point,
        }
    }
}

impl ScoreValue {
    pub fn score_type(&self) -> ScoreType {
        match self {
            ScoreValue::Time(_) => ScoreType::Time,
            ScoreValue::Point(_) => ScoreType::Point,
        }
    }
}
