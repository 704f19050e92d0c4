//! Integration tests for the mood backfill job

mod common;

use std::ops::RangeInclusive;

use assert_matches::assert_matches;
use cadence_mood_engine::{MoodCount, MoodLabel, SongId};
use cadence_worker::jobs::mood_backfill::run_backfill;
use cadence_worker::WorkerError;
use common::{BackfillFixture, PendingSongs, UnreachableSongs};

fn songs_with_genre(
    ids: RangeInclusive<SongId>,
    genre: &'static str,
) -> Vec<(SongId, Option<&'static str>)> {
    ids.map(|id| (id, Some(genre))).collect()
}

#[test_log::test(tokio::test)]
async fn test_backfill_classifies_every_song_in_batches() {
    let songs = songs_with_genre(1..=25, "Ambient");
    let fixture = BackfillFixture::new(&songs);
    let pending = PendingSongs::new(fixture.catalog.clone(), fixture.store.clone());

    let summary = run_backfill(&pending, &fixture.classifier, fixture.store.as_ref(), 10)
        .await
        .unwrap();

    assert_eq!(summary.classified, 25);
    assert_eq!(summary.batches, 3);
    // 10 + 10 + 5; the short batch ends the run
    assert_eq!(pending.calls(), 3);
    for id in 1..=25 {
        assert_eq!(
            fixture.store.mood_record(id).map(|r| r.primary_mood),
            Some(MoodLabel::Chill)
        );
    }
}

#[tokio::test]
async fn test_backfill_stops_on_empty_batch_after_exact_multiple() {
    let songs = songs_with_genre(1..=20, "Pop");
    let fixture = BackfillFixture::new(&songs);
    let pending = PendingSongs::new(fixture.catalog.clone(), fixture.store.clone());

    let summary = run_backfill(&pending, &fixture.classifier, fixture.store.as_ref(), 10)
        .await
        .unwrap();

    assert_eq!(summary.classified, 20);
    assert_eq!(summary.batches, 2);
    assert_eq!(pending.calls(), 3);
}

#[tokio::test]
async fn test_backfill_leaves_existing_classifications_alone() {
    let fixture = BackfillFixture::new(&[(1, Some("Pop")), (2, Some("Pop")), (3, Some("Pop"))]);
    fixture.store.put_mood(2, MoodLabel::Sad);
    let pending = PendingSongs::new(fixture.catalog.clone(), fixture.store.clone());

    let summary = run_backfill(&pending, &fixture.classifier, fixture.store.as_ref(), 10)
        .await
        .unwrap();

    assert_eq!(summary.classified, 2);
    assert_eq!(
        fixture.store.mood_record(2).map(|r| r.primary_mood),
        Some(MoodLabel::Sad)
    );
}

#[tokio::test]
async fn test_backfill_reports_distribution_most_frequent_first() {
    let fixture = BackfillFixture::new(&[
        (1, Some("Death Metal")),
        (2, Some("Heavy Metal")),
        (3, Some("Thrash Metal")),
        (4, Some("Techno")),
        (5, None),
    ]);
    let pending = PendingSongs::new(fixture.catalog.clone(), fixture.store.clone());

    let summary = run_backfill(&pending, &fixture.classifier, fixture.store.as_ref(), 2)
        .await
        .unwrap();

    assert_eq!(summary.classified, 5);
    assert_eq!(summary.batches, 3);
    assert_eq!(
        summary.distribution.first(),
        Some(&MoodCount {
            mood: MoodLabel::Intense,
            count: 3
        })
    );
    let total: i64 = summary.distribution.iter().map(|c| c.count).sum();
    assert_eq!(total, 5);
}

#[tokio::test]
async fn test_backfill_on_empty_catalog() {
    let fixture = BackfillFixture::new(&[]);
    let pending = PendingSongs::new(fixture.catalog.clone(), fixture.store.clone());

    let summary = run_backfill(&pending, &fixture.classifier, fixture.store.as_ref(), 10)
        .await
        .unwrap();

    assert_eq!(summary.classified, 0);
    assert_eq!(summary.batches, 0);
    assert!(summary.distribution.is_empty());
}

#[tokio::test]
async fn test_zero_batch_size_is_rejected() {
    let fixture = BackfillFixture::new(&[(1, Some("Pop"))]);
    let pending = PendingSongs::new(fixture.catalog.clone(), fixture.store.clone());

    let result = run_backfill(&pending, &fixture.classifier, fixture.store.as_ref(), 0).await;

    assert_matches!(result, Err(WorkerError::InvalidPayload(_)));
    assert_eq!(pending.calls(), 0);
}

#[tokio::test]
async fn test_storage_failure_is_retryable() {
    let fixture = BackfillFixture::new(&[(1, Some("Pop"))]);

    let err = run_backfill(&UnreachableSongs, &fixture.classifier, fixture.store.as_ref(), 10)
        .await
        .unwrap_err();

    assert!(err.is_retryable());
    assert_matches!(err, WorkerError::Storage(_));
}
