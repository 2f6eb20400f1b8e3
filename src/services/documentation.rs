use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the scoreboard backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::scoreboard::list_games,
        crate::routes::scoreboard::list_channels,
        crate::routes::scoreboard::list_channel_games,
        crate::routes::scoreboard::list_categories,
        crate::routes::scoreboard::list_scores,
        crate::routes::scoreboard::submit_score,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::scoreboard::GamesResponse,
            crate::dto::scoreboard::ChannelsResponse,
            crate::dto::scoreboard::CategoriesResponse,
            crate::dto::scoreboard::ScoresResponse,
            crate::dto::scoreboard::ScoreEntry,
            crate::dto::scoreboard::ScoreValueDto,
            crate::dto::scoreboard::AddScoreRequest,
            crate::dto::scoreboard::AddScoreResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "scoreboard", description = "Games, channels, categories and scores"),
    )
)]
pub struct ApiDoc;
