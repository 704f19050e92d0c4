//! In-memory stand-ins for the worker's Postgres queries

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use cadence_mood_engine::memory::{InMemoryCatalog, InMemoryMoodStore};
use cadence_mood_engine::{SongId, StorageError, StorageResult};
use cadence_worker::jobs::UnclassifiedSongs;

/// Catalog songs without a record in the mood store, lowest id first
pub struct PendingSongs {
    catalog: Arc<InMemoryCatalog>,
    store: Arc<InMemoryMoodStore>,
    calls: AtomicUsize,
}

impl PendingSongs {
    pub fn new(catalog: Arc<InMemoryCatalog>, store: Arc<InMemoryMoodStore>) -> Self {
        Self {
            catalog,
            store,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UnclassifiedSongs for PendingSongs {
    async fn next_unclassified(&self, limit: usize) -> StorageResult<Vec<SongId>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut ids: Vec<SongId> = self
            .catalog
            .song_ids()
            .into_iter()
            .filter(|id| self.store.mood_record(*id).is_none())
            .collect();
        ids.sort_unstable();
        ids.truncate(limit);
        Ok(ids)
    }
}

/// Always fails, as if the database were down
pub struct UnreachableSongs;

#[async_trait]
impl UnclassifiedSongs for UnreachableSongs {
    async fn next_unclassified(&self, _limit: usize) -> StorageResult<Vec<SongId>> {
        Err(StorageError::backend(
            "list unclassified songs",
            "connection refused",
        ))
    }
}
