#![allow(dead_code)]

use std::sync::Arc;

use scoreboard_back::{
    config::GamesConfig,
    dao::score_store::memory::MemoryScoreStore,
    services::{
        config_sync::{ConfigSyncEngine, SyncReport},
        scoreboard_service::ScoreboardService,
    },
};

pub const MK64_CONFIG: &str = r#"{
    "games": [{
        "name": "mk64",
        "enabled": true,
        "channel": ["mk64-chat"],
        "category": [{"name": "time-trial", "score_type": "Point"}]
    }]
}"#;

pub const ARCADE_CONFIG: &str = r#"{
    "games": [
        {
            "name": "mk64",
            "enabled": true,
            "channel": ["mk64-chat", "arcade"],
            "category": [
                {"name": "time-trial", "score_type": "Point"},
                {
                    "name": "Single track",
                    "subcategory": {
                        "label": "Track",
                        "category": [
                            {"name": "Toad Turnpike", "score_type": "Time", "score_fmt": "%H:%M:%S"},
                            {"name": "Rainbow Road", "score_type": "Time", "score_fmt": "mm:ss.fff", "enabled": false}
                        ]
                    }
                }
            ]
        },
        {"name": "smb3", "enabled": false, "channel": ["arcade"]},
        {"name": "tetris", "enabled": true, "channel": ["arcade"]}
    ]
}"#;

pub fn parse(contents: &str) -> GamesConfig {
    GamesConfig::parse(contents).expect("test config parses")
}

pub fn memory_service() -> (ScoreboardService, MemoryScoreStore) {
    let store = MemoryScoreStore::new();
    (ScoreboardService::new(Arc::new(store.clone())), store)
}

pub async fn synced(contents: &str) -> (ScoreboardService, SyncReport) {
    let (service, _) = memory_service();
    let report = ConfigSyncEngine::new(service.clone())
        .sync(&parse(contents))
        .await;
    (service, report)
}
