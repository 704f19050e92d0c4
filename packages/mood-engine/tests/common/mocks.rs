//! Instrumented collaborators for mood engine integration tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cadence_mood_engine::{
    MoodClassifier, MoodLabel, SessionContext, SessionStore, SongId, StorageError, StorageResult,
    TrackPicker, UserId,
};

/// Wraps a classifier and counts how often it is asked
pub struct CountingClassifier {
    inner: Arc<dyn MoodClassifier>,
    calls: AtomicUsize,
}

impl CountingClassifier {
    pub fn new(inner: Arc<dyn MoodClassifier>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MoodClassifier for CountingClassifier {
    async fn classify(&self, song_id: SongId) -> StorageResult<MoodLabel> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.classify(song_id).await
    }
}

/// Session store whose every call fails with a backend error
pub struct FailingSessionStore;

#[async_trait]
impl SessionStore for FailingSessionStore {
    async fn find_active(&self, _user_id: UserId) -> StorageResult<Option<SessionContext>> {
        Err(StorageError::backend("load active session", "connection reset"))
    }

    async fn save_active(&self, _session: &SessionContext) -> StorageResult<()> {
        Err(StorageError::backend("save active session", "connection reset"))
    }

    async fn deactivate(&self, _user_id: UserId) -> StorageResult<bool> {
        Err(StorageError::backend("deactivate session", "connection reset"))
    }
}

/// Session store that never answers within a reasonable deadline
pub struct StalledSessionStore {
    pub delay: Duration,
}

#[async_trait]
impl SessionStore for StalledSessionStore {
    async fn find_active(&self, _user_id: UserId) -> StorageResult<Option<SessionContext>> {
        tokio::time::sleep(self.delay).await;
        Ok(None)
    }

    async fn save_active(&self, _session: &SessionContext) -> StorageResult<()> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    async fn deactivate(&self, _user_id: UserId) -> StorageResult<bool> {
        tokio::time::sleep(self.delay).await;
        Ok(false)
    }
}

/// Picker that records every shortlist size it was offered
#[derive(Default)]
pub struct RecordingPicker {
    offered: Mutex<Vec<usize>>,
}

impl RecordingPicker {
    pub fn offered(&self) -> Vec<usize> {
        self.offered.lock().unwrap().clone()
    }
}

impl TrackPicker for RecordingPicker {
    fn pick(&self, len: usize) -> usize {
        self.offered.lock().unwrap().push(len);
        len - 1
    }
}

/// Ignores `len` and returns an index past the end
pub struct OverreachingPicker;

impl TrackPicker for OverreachingPicker {
    fn pick(&self, _len: usize) -> usize {
        usize::MAX
    }
}
