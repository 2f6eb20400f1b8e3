use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::scoreboard::{
        ActiveQuery, AddScoreRequest, AddScoreResponse, CategoriesResponse, ChannelsResponse,
        EnabledQuery, GamesResponse, ScoresResponse,
    },
    error::AppError,
    services::command_service,
    state::SharedState,
};

/// Routes exposing games, channels, categories and scores.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games))
        .route("/games/{game}/categories", get(list_categories))
        .route("/games/{game}/categories/{category}/scores", get(list_scores))
        .route("/channels", get(list_channels))
        .route("/channels/{channel}/games", get(list_channel_games))
        .route("/channels/{channel}/scores", post(submit_score))
}

/// List the enabled games.
#[utoipa::path(
    get,
    path = "/games",
    tag = "scoreboard",
    responses(
        (status = 200, description = "Enabled games", body = GamesResponse),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn list_games(State(state): State<SharedState>) -> Result<Json<GamesResponse>, AppError> {
    Ok(Json(command_service::list_active_games(&state).await?))
}

/// List channels, optionally only those hosting an enabled game.
#[utoipa::path(
    get,
    path = "/channels",
    tag = "scoreboard",
    params(ActiveQuery),
    responses((status = 200, description = "Channels", body = ChannelsResponse))
)]
pub async fn list_channels(
    State(state): State<SharedState>,
    Query(query): Query<ActiveQuery>,
) -> Result<Json<ChannelsResponse>, AppError> {
    let active_only = query.active.unwrap_or(false);
    Ok(Json(
        command_service::list_channels(&state, active_only).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/channels/{channel}/games",
    tag = "scoreboard",
    params(
        ("channel" = String, Path, description = "Channel name"),
        EnabledQuery
    ),
    responses(
        (status = 200, description = "Games of the channel", body = GamesResponse),
        (status = 404, description = "Unknown channel")
    )
)]
pub async fn list_channel_games(
    State(state): State<SharedState>,
    Path(channel): Path<String>,
    Query(query): Query<EnabledQuery>,
) -> Result<Json<GamesResponse>, AppError> {
    Ok(Json(
        command_service::games_in_channel(&state, &channel, query.enabled).await?,
    ))
}

/// Immediate categories of a game, enabled ones unless `enabled=false`.
#[utoipa::path(
    get,
    path = "/games/{game}/categories",
    tag = "scoreboard",
    params(
        ("game" = String, Path, description = "Game name"),
        EnabledQuery
    ),
    responses(
        (status = 200, description = "Categories of the game", body = CategoriesResponse),
        (status = 404, description = "Unknown game")
    )
)]
pub async fn list_categories(
    State(state): State<SharedState>,
    Path(game): Path<String>,
    Query(query): Query<EnabledQuery>,
) -> Result<Json<CategoriesResponse>, AppError> {
    let enabled = query.enabled.unwrap_or(true);
    Ok(Json(
        command_service::categories_for_game(&state, &game, enabled).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/games/{game}/categories/{category}/scores",
    tag = "scoreboard",
    params(
        ("game" = String, Path, description = "Game name"),
        ("category" = String, Path, description = "Category name, searched at any depth")
    ),
    responses(
        (status = 200, description = "Scores in submission order", body = ScoresResponse),
        (status = 404, description = "Unknown game or category"),
        (status = 409, description = "Category holds subcategories")
    )
)]
pub async fn list_scores(
    State(state): State<SharedState>,
    Path((game, category)): Path<(String, String)>,
) -> Result<Json<ScoresResponse>, AppError> {
    Ok(Json(
        command_service::list_scores(&state, &game, &category).await?,
    ))
}

/// Record a score submitted from a channel.
#[utoipa::path(
    post,
    path = "/channels/{channel}/scores",
    tag = "scoreboard",
    params(("channel" = String, Path, description = "Channel the score is submitted from")),
    request_body = AddScoreRequest,
    responses(
        (status = 200, description = "Score recorded", body = AddScoreResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Unknown channel, game or category"),
        (status = 409, description = "Category holds subcategories"),
        (status = 422, description = "Score does not match the category format")
    )
)]
pub async fn submit_score(
    State(state): State<SharedState>,
    Path(channel): Path<String>,
    Json(payload): Json<AddScoreRequest>,
) -> Result<Json<AddScoreResponse>, AppError> {
    payload.validate()?;
    Ok(Json(
        command_service::submit_score(&state, &channel, payload).await?,
    ))
}
