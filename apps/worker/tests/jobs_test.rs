//! Job payload and dispatch tests
//!
//! Payloads are produced by other services, so their JSON shape is part of
//! the worker's contract.

mod common;

use cadence_worker::jobs::{
    dispatch, handle_payload, BackfillJob, ClassifyTrackJob, MoodJob, SessionEndedJob,
    TrackSkippedJob,
};
use common::lazy_state;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case(
    json!({"type": "classify_track", "song_id": 42}),
    MoodJob::ClassifyTrack(ClassifyTrackJob { song_id: 42, force: false })
)]
#[case(
    json!({"type": "classify_track", "song_id": 42, "force": true}),
    MoodJob::ClassifyTrack(ClassifyTrackJob { song_id: 42, force: true })
)]
#[case(
    json!({"type": "backfill"}),
    MoodJob::Backfill(BackfillJob { batch_size: None })
)]
#[case(
    json!({"type": "backfill", "batch_size": 250}),
    MoodJob::Backfill(BackfillJob { batch_size: Some(250) })
)]
#[case(
    json!({"type": "track_skipped", "user_id": 7, "track_id": 3}),
    MoodJob::TrackSkipped(TrackSkippedJob { user_id: 7, track_id: 3 })
)]
#[case(
    json!({"type": "session_ended", "user_id": 7}),
    MoodJob::SessionEnded(SessionEndedJob { user_id: 7 })
)]
fn test_payload_shapes(#[case] payload: serde_json::Value, #[case] expected: MoodJob) {
    let parsed = MoodJob::from_payload(&payload.to_string()).unwrap();
    assert_eq!(parsed, expected);
    assert_eq!(serde_json::to_value(&parsed).unwrap()["type"], payload["type"]);
}

#[rstest]
#[case(r#"{"type": "classify_track"}"#)]
#[case(r#"{"type": "rebuild_index", "song_id": 1}"#)]
#[case(r#"{"song_id": 1}"#)]
#[case("not json")]
fn test_malformed_payloads_are_rejected(#[case] payload: &str) {
    assert!(MoodJob::from_payload(payload).is_err());
}

#[test]
fn test_job_names_match_type_tags() {
    let jobs = [
        MoodJob::ClassifyTrack(ClassifyTrackJob {
            song_id: 1,
            force: false,
        }),
        MoodJob::Backfill(BackfillJob::default()),
        MoodJob::TrackSkipped(TrackSkippedJob {
            user_id: 1,
            track_id: 2,
        }),
        MoodJob::SessionEnded(SessionEndedJob { user_id: 1 }),
    ];

    for job in jobs {
        let value = serde_json::to_value(&job).unwrap();
        assert_eq!(value["type"], job.name());
    }
}

#[tokio::test]
async fn test_unparseable_payload_reports_failure() {
    let state = lazy_state();

    let result = handle_payload(&state, r#"{"type": "classify_track"}"#).await;

    assert!(!result.success);
    assert!(!result.retryable);
    assert_eq!(result.job, "unknown");
}

#[rstest]
#[case(MoodJob::ClassifyTrack(ClassifyTrackJob { song_id: 0, force: true }), "classify_track")]
#[case(MoodJob::TrackSkipped(TrackSkippedJob { user_id: -1, track_id: 4 }), "track_skipped")]
#[case(MoodJob::SessionEnded(SessionEndedJob { user_id: 0 }), "session_ended")]
#[tokio::test]
async fn test_invalid_ids_fail_before_storage(#[case] job: MoodJob, #[case] name: &str) {
    let state = lazy_state();

    let result = dispatch(&state, &job).await;

    assert!(!result.success);
    assert!(!result.retryable);
    assert_eq!(result.job, name);
    assert!(result
        .error_message
        .unwrap()
        .starts_with("invalid payload"));
}
