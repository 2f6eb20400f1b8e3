mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use scoreboard_back::{routes, state::AppState};

use common::{ARCADE_CONFIG, synced};

async fn app() -> Router {
    let (service, _) = synced(ARCADE_CONFIG).await;
    let state = AppState::new();
    state.install_scoreboard(service).await;
    routes::router(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn degraded_state_answers_503() {
    let app = routes::router(AppState::new());
    let (status, body) = send(&app, get("/games")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["message"].as_str().unwrap().contains("degraded"));

    let (status, body) = send(&app, get("/healthcheck")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
}

#[tokio::test]
async fn listings() {
    let app = app().await;

    let (status, body) = send(&app, get("/games")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"games": ["mk64", "tetris"]}));

    let (_, body) = send(&app, get("/channels?active=true")).await;
    assert_eq!(body, json!({"channels": ["mk64-chat", "arcade"]}));

    let (_, body) = send(&app, get("/channels/arcade/games?enabled=false")).await;
    assert_eq!(body, json!({"games": ["smb3"]}));

    let (_, body) = send(&app, get("/games/mk64/categories")).await;
    assert_eq!(
        body,
        json!({"game": "mk64", "categories": ["time-trial", "Single track"]})
    );

    let (status, _) = send(&app, get("/channels/lobby/games")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submit_and_list_scores() {
    let app = app().await;

    let (status, body) = send(
        &app,
        post_json(
            "/channels/arcade/scores",
            json!({"player_id": "alice", "game": "mk64", "category": "time-trial", "score": "120"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["player_id"], "alice");
    assert_eq!(body["score"], 120);
    assert_eq!(body["category"], "time-trial");

    let (status, body) = send(
        &app,
        post_json(
            "/channels/arcade/scores",
            json!({"player_id": "bob", "game": "tetris", "score": "01:02.345678"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"], "Default");
    assert_eq!(body["score"], "01:02.345678");

    let (status, body) = send(&app, get("/games/mk64/categories/time-trial/scores")).await;
    assert_eq!(status, StatusCode::OK);
    let scores = body["scores"].as_array().unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0]["player_id"], "alice");
    assert!(scores[0]["created_at"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn submission_errors_map_to_statuses() {
    let app = app().await;
    let cases = [
        (
            "/channels/arcade/scores",
            json!({"player_id": "a", "game": "smb3", "score": "1"}),
            StatusCode::NOT_FOUND,
        ),
        (
            "/channels/mk64-chat/scores",
            json!({"player_id": "a", "game": "tetris", "score": "1"}),
            StatusCode::NOT_FOUND,
        ),
        (
            "/channels/lobby/scores",
            json!({"player_id": "a", "game": "mk64", "score": "1"}),
            StatusCode::NOT_FOUND,
        ),
        (
            "/channels/arcade/scores",
            json!({"player_id": "a", "game": "mk64", "category": "Rainbow Road", "score": "01:02.345"}),
            StatusCode::NOT_FOUND,
        ),
        (
            "/channels/arcade/scores",
            json!({"player_id": "a", "game": "mk64", "category": "time-trial", "score": "fast"}),
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        (
            "/channels/arcade/scores",
            json!({"player_id": "a", "game": "mk64", "category": "Single track", "score": "1"}),
            StatusCode::CONFLICT,
        ),
        (
            "/channels/arcade/scores",
            json!({"player_id": "", "game": "mk64", "score": "1"}),
            StatusCode::BAD_REQUEST,
        ),
    ];

    for (uri, body, expected) in cases {
        let (status, payload) = send(&app, post_json(uri, body.clone())).await;
        assert_eq!(status, expected, "{body}: {payload}");
    }
}

#[tokio::test]
async fn disabled_parent_rejects_scores_for_enabled_children() {
    let (service, _) = synced(
        r#"{
            "games": [{
                "name": "mk64",
                "enabled": true,
                "channel": ["c"],
                "category": [{
                    "name": "Single track",
                    "enabled": false,
                    "subcategory": {
                        "label": "Track",
                        "category": [{"name": "Toad Turnpike", "score_type": "Point"}]
                    }
                }]
            }]
        }"#,
    )
    .await;
    let state = AppState::new();
    state.install_scoreboard(service).await;
    let app = routes::router(state);

    let (status, _) = send(
        &app,
        post_json(
            "/channels/c/scores",
            json!({"player_id": "a", "game": "mk64", "category": "Toad Turnpike", "score": "5"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, get("/games/mk64/categories/Toad%20Turnpike/scores")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["scores"].as_array().unwrap().is_empty());
}
