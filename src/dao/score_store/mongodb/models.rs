use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{CategoryEntity, ChannelEntity, GameEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    is_enabled: bool,
    #[serde(default)]
    categories: Vec<CategoryEntity>,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            is_enabled: value.is_enabled,
            categories: value.categories,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            is_enabled: value.is_enabled,
            categories: value.categories,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

/// Channel document; `games` holds game names acting as references into `games`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoChannelDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    #[serde(default)]
    games: Vec<String>,
}

impl From<ChannelEntity> for MongoChannelDocument {
    fn from(value: ChannelEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            games: value.games,
        }
    }
}

impl From<MongoChannelDocument> for ChannelEntity {
    fn from(value: MongoChannelDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            games: value.games,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use mongodb::bson::{deserialize_from_document, serialize_to_document};

    use super::*;
    use crate::dao::models::{ScoreEntity, ScoreKind, ScoreValue};

    #[test]
    fn game_document_keeps_the_category_tree() {
        let mut leaf = CategoryEntity::leaf(
            "Toad Turnpike",
            "Track",
            true,
            ScoreKind::Time {
                score_fmt: "%H:%M:%S".into(),
            },
        );
        let time = NaiveTime::from_hms_opt(1, 2, 3).unwrap();
        leaf.append_score(ScoreEntity::new("alice", ScoreValue::Time(time)))
            .unwrap();
        let game = GameEntity::new(
            "mk64",
            true,
            vec![CategoryEntity::interior("Single track", "Category", false, vec![leaf])],
        );

        let doc = serialize_to_document(&MongoGameDocument::from(game.clone())).unwrap();
        let categories = doc.get_array("categories").unwrap();
        let top = categories[0].as_document().unwrap();
        assert_eq!(top.get_str("role").unwrap(), "interior");
        let nested = top.get_array("categories").unwrap()[0].as_document().unwrap();
        assert_eq!(nested.get_str("role").unwrap(), "leaf");
        assert_eq!(nested.get_array("scores").unwrap().len(), 1);

        let decoded: MongoGameDocument = deserialize_from_document(doc).unwrap();
        let decoded = GameEntity::from(decoded);
        assert_eq!(decoded.categories, game.categories);
    }
}
