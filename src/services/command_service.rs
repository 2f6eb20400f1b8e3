//! Request-facing operations behind the REST routes. Each helper resolves the installed
//! scoreboard, runs the domain operation and projects the result into response DTOs.

use crate::{
    config::DEFAULT_CATEGORY_NAME,
    dto::scoreboard::{
        AddScoreRequest, AddScoreResponse, CategoriesResponse, ChannelsResponse, GamesResponse,
        ScoresResponse,
    },
    error::ServiceError,
    state::SharedState,
};

pub async fn list_active_games(state: &SharedState) -> Result<GamesResponse, ServiceError> {
    let service = state.require_scoreboard().await?;
    let games = service.list_active_games().await?;
    Ok(GamesResponse {
        games: games.into_iter().collect(),
    })
}

pub async fn list_channels(
    state: &SharedState,
    active_only: bool,
) -> Result<ChannelsResponse, ServiceError> {
    let service = state.require_scoreboard().await?;
    let channels = if active_only {
        service.list_active_channels().await?
    } else {
        service.list_all_channels().await?
    };
    Ok(ChannelsResponse {
        channels: channels.into_iter().collect(),
    })
}

pub async fn games_in_channel(
    state: &SharedState,
    channel: &str,
    enabled: Option<bool>,
) -> Result<GamesResponse, ServiceError> {
    let service = state.require_scoreboard().await?;
    let games = service
        .games_in_channel(channel, enabled)
        .await?
        .ok_or_else(|| ServiceError::UnknownChannel(channel.to_owned()))?;
    Ok(GamesResponse { games })
}

pub async fn categories_for_game(
    state: &SharedState,
    game: &str,
    enabled: bool,
) -> Result<CategoriesResponse, ServiceError> {
    let service = state.require_scoreboard().await?;
    let categories = service.categories_for_game(game, enabled).await?;
    Ok(CategoriesResponse {
        game: game.to_owned(),
        categories,
    })
}

pub async fn list_scores(
    state: &SharedState,
    game: &str,
    category: &str,
) -> Result<ScoresResponse, ServiceError> {
    let service = state.require_scoreboard().await?;
    let records = service.list_scores(game, category).await?;
    Ok(ScoresResponse {
        game: game.to_owned(),
        category: category.to_owned(),
        scores: records.into_iter().map(Into::into).collect(),
    })
}

/// Record a score submitted from `channel`.
///
/// The game must be enabled in that channel and the category, `Default` when omitted, must
/// resolve in the game and be enabled.
pub async fn submit_score(
    state: &SharedState,
    channel: &str,
    request: AddScoreRequest,
) -> Result<AddScoreResponse, ServiceError> {
    let service = state.require_scoreboard().await?;
    let AddScoreRequest {
        player_id,
        game,
        category,
        score,
    } = request;

    if !service.is_game_available_for_channel(&game, channel).await? {
        return Err(match service.games_in_channel(channel, None).await? {
            None => ServiceError::UnknownChannel(channel.to_owned()),
            Some(_) => ServiceError::GameNotInChannel {
                game,
                channel: channel.to_owned(),
            },
        });
    }

    let category = category.unwrap_or_else(|| DEFAULT_CATEGORY_NAME.to_owned());
    if !service
        .is_category_available_for_game(&category, &game)
        .await?
    {
        return Err(ServiceError::UnknownCategory { game, category });
    }

    let record = service
        .add_score(&player_id, &game, &score, &category)
        .await?;
    Ok(AddScoreResponse {
        game,
        category,
        entry: record.into(),
    })
}
