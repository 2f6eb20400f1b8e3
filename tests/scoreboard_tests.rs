mod common;

use std::collections::HashSet;

use scoreboard_back::{domain::score::RenderedScore, error::ServiceError};

use common::{ARCADE_CONFIG, synced};

#[tokio::test]
async fn rejected_point_score_leaves_category_untouched() {
    let (service, _) = synced(ARCADE_CONFIG).await;
    service
        .add_score("alice", "mk64", "120", "time-trial")
        .await
        .unwrap();

    for raw in ["12.5", "abc", "", "1:00"] {
        let err = service
            .add_score("bob", "mk64", raw, "time-trial")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidFormat { .. }), "{raw}");
    }

    let scores = service.list_scores("mk64", "time-trial").await.unwrap();
    assert_eq!(scores.len(), 1);
}

#[tokio::test]
async fn time_score_renders_with_its_pattern() {
    let (service, _) = synced(ARCADE_CONFIG).await;
    let record = service
        .add_score("p1", "mk64", "01:02:03", "Toad Turnpike")
        .await
        .unwrap();

    let scores = service.list_scores("mk64", "Toad Turnpike").await.unwrap();
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].player_id, "p1");
    assert_eq!(scores[0].value, RenderedScore::Time("01:02:03".into()));
    assert_eq!(scores[0].created_at, record.created_at);
}

#[tokio::test]
async fn default_category_accepts_minute_times() {
    let (service, _) = synced(ARCADE_CONFIG).await;
    service
        .add_score("carol", "tetris", "01:02.345678", "Default")
        .await
        .unwrap();
    let err = service
        .add_score("carol", "tetris", "01:02:03", "Default")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidFormat { .. }));

    let scores = service.list_scores("tetris", "Default").await.unwrap();
    assert_eq!(scores[0].value, RenderedScore::Time("01:02.345678".into()));
}

#[tokio::test]
async fn channel_views_partition_membership() {
    let (service, _) = synced(ARCADE_CONFIG).await;
    for channel in ["arcade", "mk64-chat"] {
        let all: HashSet<_> = service
            .games_in_channel(channel, None)
            .await
            .unwrap()
            .unwrap()
            .into_iter()
            .collect();
        let enabled: HashSet<_> = service
            .games_in_channel(channel, Some(true))
            .await
            .unwrap()
            .unwrap()
            .into_iter()
            .collect();
        let disabled: HashSet<_> = service
            .games_in_channel(channel, Some(false))
            .await
            .unwrap()
            .unwrap()
            .into_iter()
            .collect();

        assert!(enabled.is_disjoint(&disabled));
        assert_eq!(&enabled | &disabled, all);
    }
}

#[tokio::test]
async fn interior_categories_hold_no_scores() {
    let (service, _) = synced(ARCADE_CONFIG).await;
    assert!(matches!(
        service.list_scores("mk64", "Single track").await,
        Err(ServiceError::NotLeaf(_))
    ));
    assert!(matches!(
        service.add_score("p1", "mk64", "01:02:03", "Single track").await,
        Err(ServiceError::NotLeaf(_))
    ));
}

#[tokio::test]
async fn concurrent_submissions_are_not_lost() {
    let (service, _) = synced(ARCADE_CONFIG).await;

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .add_score(&format!("player-{i}"), "mk64", &i.to_string(), "time-trial")
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let scores = service.list_scores("mk64", "time-trial").await.unwrap();
    assert_eq!(scores.len(), 16);
}
