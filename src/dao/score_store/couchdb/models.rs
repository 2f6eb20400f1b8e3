use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::dao::models::{CategoryEntity, ChannelEntity, GameEntity};

pub const GAME_PREFIX: &str = "game::";
pub const CHANNEL_PREFIX: &str = "channel::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[serde(default)]
    pub doc: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchGameDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub game: GameBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameBody {
    pub game_id: Uuid,
    pub name: String,
    pub is_enabled: bool,
    #[serde(default)]
    pub categories: Vec<CategoryEntity>,
    pub created_at: SystemTime,
    pub updated_at: SystemTime,
}

impl From<(GameEntity, Option<String>)> for CouchGameDocument {
    fn from((game, rev): (GameEntity, Option<String>)) -> Self {
        Self {
            id: game_doc_id(&game.name),
            rev,
            game: GameBody {
                game_id: game.id,
                name: game.name,
                is_enabled: game.is_enabled,
                categories: game.categories,
                created_at: game.created_at,
                updated_at: game.updated_at,
            },
        }
    }
}

impl From<CouchGameDocument> for GameEntity {
    fn from(doc: CouchGameDocument) -> Self {
        Self {
            id: doc.game.game_id,
            name: doc.game.name,
            is_enabled: doc.game.is_enabled,
            categories: doc.game.categories,
            created_at: doc.game.created_at,
            updated_at: doc.game.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchChannelDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub channel: ChannelBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelBody {
    pub channel_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub games: Vec<String>,
}

impl From<(ChannelEntity, Option<String>)> for CouchChannelDocument {
    fn from((channel, rev): (ChannelEntity, Option<String>)) -> Self {
        Self {
            id: channel_doc_id(&channel.name),
            rev,
            channel: ChannelBody {
                channel_id: channel.id,
                name: channel.name,
                games: channel.games,
            },
        }
    }
}

impl From<CouchChannelDocument> for ChannelEntity {
    fn from(doc: CouchChannelDocument) -> Self {
        Self {
            id: doc.channel.channel_id,
            name: doc.channel.name,
            games: doc.channel.games,
        }
    }
}

pub fn game_doc_id(name: &str) -> String {
    format!("{GAME_PREFIX}{name}")
}

pub fn channel_doc_id(name: &str) -> String {
    format!("{CHANNEL_PREFIX}{name}")
}
