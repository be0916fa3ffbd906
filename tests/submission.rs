mod common;

use common::FailingStore;
use raidtimes::database::models::RunFilter;
use raidtimes::database::{MemoryStore, RecordStore};
use raidtimes::error::SpeedrunError;
use raidtimes::speedrun::catalog::{CHAMBERS_OF_XERIC, Segment, THEATRE_OF_BLOOD};
use raidtimes::speedrun::players::RunnerIdentity;
use raidtimes::speedrun::room_pbs::current_bests;
use raidtimes::speedrun::runs::{PbSubject, find_personal_best};
use raidtimes::speedrun::submission::{
    SegmentSubmission, TimedSubmission, delete_submitted_run, submit_segment_run,
    submit_timed_run,
};
use raidtimes::timing::GameTime;

fn runners(ids: &[i64]) -> Vec<RunnerIdentity> {
    ids.iter()
        .map(|id| RunnerIdentity::new(*id, format!("runner{id}")))
        .collect()
}

fn timed(category: &str, scale: i32, ids: &[i64], time: GameTime) -> TimedSubmission {
    TimedSubmission {
        category: category.to_string(),
        scale,
        runners: runners(ids),
        time,
        screenshot: None,
    }
}

const TOB_PASTE: &str = "Maiden: 2:00.0 | Bloat: 0:48.0 | Nylocas: 3:12.0 | Sotetseg: 1:30.0 \
                         | Xarpus: 2:00.0 | Verzik: 4:00.0 | Completed: 17:30.0 | Size: 2";

async fn run_count(store: &MemoryStore, category: &str, scale: i32) -> usize {
    let category = store.category_by_identifier(category).await.unwrap().unwrap();
    let scale = store.scale_by_value(scale).await.unwrap().unwrap();
    store
        .runs_matching(&RunFilter::board(category.raid_type_id, scale.scale_id))
        .await
        .unwrap()
        .len()
}

#[tokio::test]
async fn duplicate_then_faster_run_scenario() {
    let store = MemoryStore::seeded();

    let first = submit_timed_run(
        &store,
        &timed(CHAMBERS_OF_XERIC, 2, &[1, 2], GameTime::new(1, 13, 2)),
    )
    .await
    .unwrap();
    assert_eq!(first.run.ticks, 122);
    let group = first.run.player_group_id;
    let pb = find_personal_best(
        &store,
        first.category.raid_type_id,
        first.scale.scale_id,
        PbSubject::Group(group),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(pb.run_id, first.run.run_id);

    // Same runners listed in the other order.
    let err = submit_timed_run(
        &store,
        &timed(CHAMBERS_OF_XERIC, 2, &[2, 1], GameTime::new(1, 13, 2)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, SpeedrunError::DuplicateRun));
    assert_eq!(run_count(&store, CHAMBERS_OF_XERIC, 2).await, 1);

    let faster = submit_timed_run(
        &store,
        &timed(CHAMBERS_OF_XERIC, 2, &[1, 2], GameTime::new(1, 0, 0)),
    )
    .await
    .unwrap();
    assert_eq!(faster.run.ticks, 100);
    assert_eq!(faster.run.player_group_id, group);
    let pb = find_personal_best(
        &store,
        first.category.raid_type_id,
        first.scale.scale_id,
        PbSubject::Group(group),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(pb.ticks, 100);
}

#[tokio::test]
async fn invalid_time_is_rejected_before_anything_else() {
    let store = MemoryStore::seeded();
    let err = submit_timed_run(&store, &timed("No such raid", 9, &[1], GameTime::new(1, 13, 3)))
        .await
        .unwrap_err();
    assert!(matches!(err, SpeedrunError::InvalidDuration));
}

#[tokio::test]
async fn runner_count_must_match_scale_without_writing() {
    let store = MemoryStore::seeded();
    let err = submit_timed_run(
        &store,
        &timed(CHAMBERS_OF_XERIC, 2, &[1, 2, 3], GameTime::new(10, 0, 0)),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        SpeedrunError::RunnerCountMismatch {
            expected: 2,
            got: 3
        }
    ));
    assert!(store.find_player_by_external_id(1).await.unwrap().is_none());

    // A repeated runner only counts once.
    let err = submit_timed_run(
        &store,
        &timed(CHAMBERS_OF_XERIC, 2, &[1, 1], GameTime::new(10, 0, 0)),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        SpeedrunError::RunnerCountMismatch {
            expected: 2,
            got: 1
        }
    ));

    let err = submit_timed_run(
        &store,
        &timed(CHAMBERS_OF_XERIC, 2, &[], GameTime::new(10, 0, 0)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, SpeedrunError::InvalidGroup));
}

#[tokio::test]
async fn unknown_reference_data_is_rejected() {
    let store = MemoryStore::seeded();
    let err = submit_timed_run(&store, &timed("Barrows", 1, &[1], GameTime::new(1, 0, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, SpeedrunError::UnknownCategory(_)));

    let err = submit_timed_run(
        &store,
        &timed(CHAMBERS_OF_XERIC, 8, &[1], GameTime::new(1, 0, 0)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, SpeedrunError::UnknownScale(8)));
}

#[tokio::test]
async fn runner_names_are_refreshed() {
    let store = MemoryStore::seeded();
    submit_timed_run(&store, &timed(CHAMBERS_OF_XERIC, 1, &[7], GameTime::new(20, 0, 0)))
        .await
        .unwrap();
    let mut renamed = timed(CHAMBERS_OF_XERIC, 1, &[7], GameTime::new(19, 0, 0));
    renamed.runners = vec![RunnerIdentity::new(7, "a".repeat(40))];
    let submitted = submit_timed_run(&store, &renamed).await.unwrap();
    assert_eq!(submitted.players[0].name, "a".repeat(32));
    let stored = store.find_player_by_external_id(7).await.unwrap().unwrap();
    assert_eq!(stored.name, "a".repeat(32));
}

#[tokio::test]
async fn room_paste_stores_run_and_room_bests() {
    let store = MemoryStore::seeded();
    let submission = SegmentSubmission {
        category: THEATRE_OF_BLOOD.to_string(),
        runners: runners(&[1, 2]),
        paste: TOB_PASTE.to_string(),
    };
    let outcome = submit_segment_run(&store, &submission).await.unwrap();
    assert_eq!(outcome.submitted.run.ticks, 1_750);
    assert_eq!(outcome.submitted.scale.value, 2);
    assert_eq!(outcome.improvements.len(), 2);
    for (_, improvements) in &outcome.improvements {
        assert_eq!(improvements.len(), 7);
        assert!(improvements.values().all(|i| i.before.is_none()));
    }
    let stored = store
        .run_segments(outcome.submitted.run.run_id)
        .await
        .unwrap();
    assert_eq!(stored[&Segment::Bloat], 80);

    // Slower overall, but a faster Bloat.
    let slower = SegmentSubmission {
        paste: TOB_PASTE
            .replace("Bloat: 0:48.0", "Bloat: 0:42.0")
            .replace("Completed: 17:30.0", "Completed: 17:36.0"),
        ..submission
    };
    let outcome = submit_segment_run(&store, &slower).await.unwrap();
    for (player, improvements) in &outcome.improvements {
        assert_eq!(
            improvements.keys().copied().collect::<Vec<_>>(),
            vec![Segment::Bloat],
            "{}",
            player.name
        );
        assert_eq!(improvements[&Segment::Bloat].before, Some(80));
        assert_eq!(improvements[&Segment::Bloat].after, 70);
    }

    let player = outcome.improvements[0].0.player_id;
    let record = current_bests(
        &store,
        player,
        &outcome.submitted.category,
        &outcome.submitted.scale,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(record.get(Segment::Completed), Some(1_750));
    assert_eq!(record.get(Segment::Bloat), Some(70));
}

#[tokio::test]
async fn duplicate_room_paste_stores_no_run_but_applies_room_bests() {
    let store = MemoryStore::seeded();
    let submission = SegmentSubmission {
        category: THEATRE_OF_BLOOD.to_string(),
        runners: runners(&[1, 2]),
        paste: TOB_PASTE.to_string(),
    };
    let first = submit_segment_run(&store, &submission).await.unwrap();
    assert!(!first.duplicate);

    let same_total = SegmentSubmission {
        paste: TOB_PASTE.replace("Maiden: 2:00.0", "Maiden: 1:30.0"),
        runners: runners(&[2, 1]),
        ..submission
    };
    let again = submit_segment_run(&store, &same_total).await.unwrap();
    assert!(again.duplicate);
    assert_eq!(again.submitted.run.run_id, first.submitted.run.run_id);
    assert_eq!(run_count(&store, THEATRE_OF_BLOOD, 2).await, 1);
    for (_, improvements) in &again.improvements {
        assert_eq!(
            improvements.keys().copied().collect::<Vec<_>>(),
            vec![Segment::Maiden]
        );
    }

    let player = first.improvements[0].0.player_id;
    let record = current_bests(&store, player, &first.submitted.category, &first.submitted.scale)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.get(Segment::Maiden), Some(150));
}

#[tokio::test]
async fn room_paste_interrupted_between_runners_can_be_resent() {
    let store = FailingStore::seeded();
    store.create_player(1, "runner1").await.unwrap();
    let second = store.create_player(2, "runner2").await.unwrap();
    store.fail_room_writes_for(second.player_id);

    let submission = SegmentSubmission {
        category: THEATRE_OF_BLOOD.to_string(),
        runners: runners(&[1, 2]),
        paste: TOB_PASTE.to_string(),
    };
    let err = submit_segment_run(&store, &submission).await.unwrap_err();
    assert!(matches!(err, SpeedrunError::Store(_)), "{err:?}");

    let category = store
        .category_by_identifier(THEATRE_OF_BLOOD)
        .await
        .unwrap()
        .unwrap();
    let scale = store.scale_by_value(2).await.unwrap().unwrap();
    let first = store.find_player_by_external_id(1).await.unwrap().unwrap();

    // The first runner's rooms were written before the failure and stay intact.
    let record = current_bests(&store, first.player_id, &category, &scale)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.times.len(), 7);
    assert_eq!(record.get(Segment::Verzik), Some(400));
    assert!(
        current_bests(&store, second.player_id, &category, &scale)
            .await
            .unwrap()
            .is_none()
    );

    store.recover();
    let retry = submit_segment_run(&store, &submission).await.unwrap();
    assert!(retry.duplicate);
    assert_eq!(retry.improvements[0].0.player_id, first.player_id);
    assert!(retry.improvements[0].1.is_empty());
    assert_eq!(retry.improvements[1].0.player_id, second.player_id);
    assert_eq!(retry.improvements[1].1.len(), 7);

    let record = current_bests(&store, second.player_id, &category, &scale)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.get(Segment::Maiden), Some(200));
    assert_eq!(record.get(Segment::Completed), Some(1_750));
    let runs = store
        .runs_matching(&RunFilter::board(category.raid_type_id, scale.scale_id))
        .await
        .unwrap();
    assert_eq!(runs.len(), 1);
}

#[tokio::test]
async fn room_paste_rejections_leave_the_store_untouched() {
    let store = MemoryStore::seeded();

    let not_tracked = SegmentSubmission {
        category: CHAMBERS_OF_XERIC.to_string(),
        runners: runners(&[1, 2]),
        paste: TOB_PASTE.to_string(),
    };
    let err = submit_segment_run(&store, &not_tracked).await.unwrap_err();
    assert!(matches!(err, SpeedrunError::NotSegmentCapable(_)));

    let incomplete = SegmentSubmission {
        category: THEATRE_OF_BLOOD.to_string(),
        runners: runners(&[1, 2]),
        paste: TOB_PASTE.replace("Xarpus: 2:00.0 |", ""),
    };
    let err = submit_segment_run(&store, &incomplete).await.unwrap_err();
    assert!(matches!(err, SpeedrunError::MalformedSegmentPaste(_)));

    let wrong_size = SegmentSubmission {
        category: THEATRE_OF_BLOOD.to_string(),
        runners: runners(&[1, 2, 3]),
        paste: TOB_PASTE.to_string(),
    };
    let err = submit_segment_run(&store, &wrong_size).await.unwrap_err();
    assert!(matches!(err, SpeedrunError::RunnerCountMismatch { .. }));

    assert_eq!(run_count(&store, THEATRE_OF_BLOOD, 2).await, 0);
    assert!(store.find_player_by_external_id(1).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_submitted_run_finds_the_exact_run() {
    let store = MemoryStore::seeded();
    let time = GameTime::new(15, 0, 0);
    submit_timed_run(&store, &timed(CHAMBERS_OF_XERIC, 2, &[1, 2], time))
        .await
        .unwrap();

    let wrong_time =
        delete_submitted_run(&store, CHAMBERS_OF_XERIC, 2, &[1, 2], GameTime::new(15, 0, 6))
            .await
            .unwrap();
    assert!(wrong_time.is_none());
    let unknown_runner = delete_submitted_run(&store, CHAMBERS_OF_XERIC, 2, &[1, 3], time)
        .await
        .unwrap();
    assert!(unknown_runner.is_none());

    let deleted = delete_submitted_run(&store, CHAMBERS_OF_XERIC, 2, &[2, 1], time)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(deleted.ticks, 1_500);
    assert_eq!(run_count(&store, CHAMBERS_OF_XERIC, 2).await, 0);
    assert!(
        delete_submitted_run(&store, CHAMBERS_OF_XERIC, 2, &[1, 2], time)
            .await
            .unwrap()
            .is_none()
    );
}
