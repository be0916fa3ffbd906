use raidtimes::database::models::{Category, GroupId, NewRun, PlayerId, Scale};
use raidtimes::database::{MemoryStore, RecordStore};
use raidtimes::error::SpeedrunError;
use raidtimes::speedrun::catalog::{CHAMBERS_OF_XERIC, Segment, THEATRE_OF_BLOOD};
use raidtimes::speedrun::groups::resolve_or_create;
use raidtimes::speedrun::runs::{
    PbSubject, delete_run, find_exact_run, find_personal_best, submit, submit_new,
    sync_screenshot,
};

async fn board(store: &MemoryStore, category: &str, size: i32) -> (Category, Scale) {
    (
        store.category_by_identifier(category).await.unwrap().unwrap(),
        store.scale_by_value(size).await.unwrap().unwrap(),
    )
}

async fn group_of(store: &MemoryStore, external_ids: &[i64]) -> (Vec<PlayerId>, GroupId) {
    let mut ids = Vec::new();
    for external_id in external_ids {
        let player = match store.find_player_by_external_id(*external_id).await.unwrap() {
            Some(p) => p,
            None => store
                .create_player(*external_id, &format!("runner{external_id}"))
                .await
                .unwrap(),
        };
        ids.push(player.player_id);
    }
    let group = resolve_or_create(store, ids.clone()).await.unwrap();
    (ids, group)
}

#[tokio::test]
async fn identical_run_is_rejected_once_stored() {
    let store = MemoryStore::seeded();
    let (category, scale) = board(&store, CHAMBERS_OF_XERIC, 2).await;
    let (_, group) = group_of(&store, &[1, 2]).await;

    submit(&store, category.raid_type_id, scale.scale_id, group, 122, None)
        .await
        .unwrap();
    let err = submit(&store, category.raid_type_id, scale.scale_id, group, 122, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SpeedrunError::DuplicateRun));

    submit(&store, category.raid_type_id, scale.scale_id, group, 121, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn same_time_is_allowed_for_another_board_or_group() {
    let store = MemoryStore::seeded();
    let (category, duo) = board(&store, CHAMBERS_OF_XERIC, 2).await;
    let (_, trio) = board(&store, CHAMBERS_OF_XERIC, 3).await;
    let (other_category, _) = board(&store, THEATRE_OF_BLOOD, 2).await;
    let (_, pair) = group_of(&store, &[1, 2]).await;
    let (_, other_pair) = group_of(&store, &[1, 3]).await;

    submit(&store, category.raid_type_id, duo.scale_id, pair, 500, None)
        .await
        .unwrap();
    submit(&store, category.raid_type_id, duo.scale_id, other_pair, 500, None)
        .await
        .unwrap();
    submit(&store, category.raid_type_id, trio.scale_id, pair, 500, None)
        .await
        .unwrap();
    submit(&store, other_category.raid_type_id, duo.scale_id, pair, 500, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn personal_best_is_the_minimum() {
    let store = MemoryStore::seeded();
    let (category, scale) = board(&store, CHAMBERS_OF_XERIC, 2).await;
    let (ids, group) = group_of(&store, &[1, 2]).await;
    let (_, other) = group_of(&store, &[1, 3]).await;

    for (g, ticks) in [(group, 130), (group, 110), (group, 120), (other, 105)] {
        submit(&store, category.raid_type_id, scale.scale_id, g, ticks, None)
            .await
            .unwrap();
    }

    let by_group = find_personal_best(
        &store,
        category.raid_type_id,
        scale.scale_id,
        PbSubject::Group(group),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(by_group.ticks, 110);

    // Player 1 ran in both groups.
    let by_player = find_personal_best(
        &store,
        category.raid_type_id,
        scale.scale_id,
        PbSubject::Player(ids[0]),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(by_player.ticks, 105);

    let by_teammate = find_personal_best(
        &store,
        category.raid_type_id,
        scale.scale_id,
        PbSubject::Player(ids[1]),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(by_teammate.ticks, 110);
}

#[tokio::test]
async fn no_runs_means_no_personal_best() {
    let store = MemoryStore::seeded();
    let (category, scale) = board(&store, CHAMBERS_OF_XERIC, 2).await;
    let (_, group) = group_of(&store, &[1, 2]).await;

    let pb = find_personal_best(
        &store,
        category.raid_type_id,
        scale.scale_id,
        PbSubject::Group(group),
    )
    .await
    .unwrap();
    assert!(pb.is_none());
}

#[tokio::test]
async fn delete_removes_run_and_room_detail() {
    let store = MemoryStore::seeded();
    let (category, scale) = board(&store, THEATRE_OF_BLOOD, 2).await;
    let (_, group) = group_of(&store, &[1, 2]).await;

    let run = submit_new(
        &store,
        &NewRun {
            category: category.raid_type_id,
            scale: scale.scale_id,
            group,
            ticks: 2_000,
            screenshot: None,
            segments: [(Segment::Maiden, 200), (Segment::Completed, 2_000)].into(),
        },
    )
    .await
    .unwrap();
    assert_eq!(store.run_segments(run.run_id).await.unwrap().len(), 2);

    assert!(delete_run(&store, run.run_id).await.unwrap());
    assert!(store.run_segments(run.run_id).await.unwrap().is_empty());
    assert!(
        find_exact_run(&store, category.raid_type_id, scale.scale_id, group, 2_000)
            .await
            .unwrap()
            .is_none()
    );
    assert!(!delete_run(&store, run.run_id).await.unwrap());

    // The same time can be submitted again once deleted.
    submit(&store, category.raid_type_id, scale.scale_id, group, 2_000, None)
        .await
        .unwrap();
}

#[tokio::test]
async fn missing_screenshot_reference_is_cleared() {
    let store = MemoryStore::seeded();
    let (category, scale) = board(&store, CHAMBERS_OF_XERIC, 1).await;
    let (_, group) = group_of(&store, &[1]).await;
    let run = submit(
        &store,
        category.raid_type_id,
        scale.scale_id,
        group,
        900,
        Some("42.png".to_string()),
    )
    .await
    .unwrap();

    let kept = sync_screenshot(&store, run.clone(), |_| true).await.unwrap();
    assert_eq!(kept.screenshot.as_deref(), Some("42.png"));

    let cleared = sync_screenshot(&store, run, |_| false).await.unwrap();
    assert_eq!(cleared.screenshot, None);
    let stored = find_exact_run(&store, category.raid_type_id, scale.scale_id, group, 900)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.screenshot, None);
}
