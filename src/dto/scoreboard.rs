use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    domain::score::RenderedScore, dto::format_system_time,
    services::scoreboard_service::ScoreRecord,
};

/// Tri-state filter on the enabled flag of games or categories.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EnabledQuery {
    /// Keep only enabled (`true`) or disabled (`false`) entries.
    pub enabled: Option<bool>,
}

/// Restrict the channel listing to channels hosting an enabled game.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ActiveQuery {
    pub active: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GamesResponse {
    pub games: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChannelsResponse {
    pub channels: Vec<String>,
}

/// Immediate categories of a game.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoriesResponse {
    pub game: String,
    pub categories: Vec<String>,
}

/// Score value: a formatted time or a number of points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum ScoreValueDto {
    Time(String),
    Point(i64),
}

impl From<RenderedScore> for ScoreValueDto {
    fn from(value: RenderedScore) -> Self {
        match value {
            RenderedScore::Time(time) => ScoreValueDto::Time(time),
            RenderedScore::Point(points) => ScoreValueDto::Point(points),
        }
    }
}

/// One recorded score.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScoreEntry {
    pub player_id: String,
    pub score: ScoreValueDto,
    /// RFC3339 timestamp of the submission.
    pub created_at: String,
}

impl From<ScoreRecord> for ScoreEntry {
    fn from(record: ScoreRecord) -> Self {
        Self {
            player_id: record.player_id,
            score: record.value.into(),
            created_at: format_system_time(record.created_at),
        }
    }
}

/// Scores of a leaf category in submission order.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScoresResponse {
    pub game: String,
    pub category: String,
    pub scores: Vec<ScoreEntry>,
}

/// Score submitted from a channel.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddScoreRequest {
    #[validate(length(min = 1, message = "player_id must not be empty"))]
    pub player_id: String,
    #[validate(length(min = 1, message = "game must not be empty"))]
    pub game: String,
    /// Target category; `Default` when omitted.
    #[serde(default)]
    pub category: Option<String>,
    /// Raw value, parsed with the category's score type and format.
    #[validate(length(min = 1, message = "score must not be empty"))]
    pub score: String,
}

/// Acknowledgement of a recorded score.
#[derive(Debug, Serialize, ToSchema)]
pub struct AddScoreResponse {
    pub game: String,
    pub category: String,
    #[serde(flatten)]
    pub entry: ScoreEntry,
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, UNIX_EPOCH};

    use super::*;

    #[test]
    fn score_entries_serialize_flat_values() {
        let entry = ScoreEntry::from(ScoreRecord {
            player_id: "alice".into(),
            value: RenderedScore::Point(120),
            created_at: UNIX_EPOCH + Duration::from_secs(60),
        });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "player_id": "alice",
                "score": 120,
                "created_at": "1970-01-01T00:01:00Z"
            })
        );
    }

    #[test]
    fn add_score_request_requires_fields() {
        let request: AddScoreRequest =
            serde_json::from_str(r#"{"player_id": "", "game": "mk64", "score": "120"}"#).unwrap();
        assert!(request.category.is_none());
        assert!(request.validate().is_err());
    }
}
