use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lesson_core::model::LessonId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Raw snapshot as held by a slot: an opaque payload plus when it was written.
///
/// The slot never interprets the payload; decoding and staleness are the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRecord {
    pub lesson_id: LessonId,
    pub payload: String,
    pub saved_at: DateTime<Utc>,
}

impl SnapshotRecord {
    #[must_use]
    pub fn new(lesson_id: LessonId, payload: impl Into<String>, saved_at: DateTime<Utc>) -> Self {
        Self {
            lesson_id,
            payload: payload.into(),
            saved_at,
        }
    }
}

/// Durable per-lesson slot for in-progress attempt snapshots.
///
/// One entry per lesson; writes overwrite.
#[async_trait]
pub trait SnapshotSlot: Send + Sync {
    /// Read the snapshot for a lesson.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slot cannot be read.
    async fn read_snapshot(&self, lesson_id: LessonId)
    -> Result<Option<SnapshotRecord>, StorageError>;

    /// Overwrite the snapshot for `record.lesson_id`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn write_snapshot(&self, record: &SnapshotRecord) -> Result<(), StorageError>;

    /// Delete the snapshot for a lesson. Deleting a missing snapshot is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the slot cannot be written.
    async fn delete_snapshot(&self, lesson_id: LessonId) -> Result<(), StorageError>;
}

/// In-memory slot, keyed the same way as the durable backends.
#[derive(Clone, Default)]
pub struct InMemorySnapshotSlot {
    slots: Arc<Mutex<HashMap<String, SnapshotRecord>>>,
}

impl InMemorySnapshotSlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SnapshotSlot for InMemorySnapshotSlot {
    async fn read_snapshot(
        &self,
        lesson_id: LessonId,
    ) -> Result<Option<SnapshotRecord>, StorageError> {
        let guard = self
            .slots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(&lesson_id.snapshot_key()).cloned())
    }

    async fn write_snapshot(&self, record: &SnapshotRecord) -> Result<(), StorageError> {
        let mut guard = self
            .slots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(record.lesson_id.snapshot_key(), record.clone());
        Ok(())
    }

    async fn delete_snapshot(&self, lesson_id: LessonId) -> Result<(), StorageError> {
        let mut guard = self
            .slots
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(&lesson_id.snapshot_key());
        Ok(())
    }
}

/// Snapshot slot behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub snapshots: Arc<dyn SnapshotSlot>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let snapshots: Arc<dyn SnapshotSlot> = Arc::new(InMemorySnapshotSlot::new());
        Self { snapshots }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::time::fixed_now;

    #[tokio::test]
    async fn write_overwrites_and_delete_removes() {
        let slot = InMemorySnapshotSlot::new();
        let lesson = LessonId::new(3);

        slot.write_snapshot(&SnapshotRecord::new(lesson, "{}", fixed_now()))
            .await
            .unwrap();
        slot.write_snapshot(&SnapshotRecord::new(lesson, "{\"score\":1}", fixed_now()))
            .await
            .unwrap();
        assert_eq!(slot.len(), 1);

        let read = slot.read_snapshot(lesson).await.unwrap().unwrap();
        assert_eq!(read.payload, "{\"score\":1}");

        slot.delete_snapshot(lesson).await.unwrap();
        assert!(slot.read_snapshot(lesson).await.unwrap().is_none());
        assert!(slot.is_empty());
    }

    #[tokio::test]
    async fn lessons_do_not_share_slots() {
        let slot = InMemorySnapshotSlot::new();
        slot.write_snapshot(&SnapshotRecord::new(LessonId::new(1), "a", fixed_now()))
            .await
            .unwrap();

        assert!(slot.read_snapshot(LessonId::new(2)).await.unwrap().is_none());
        slot.delete_snapshot(LessonId::new(2)).await.unwrap();
        assert_eq!(slot.len(), 1);
    }

    #[tokio::test]
    async fn len_counts_through_poisoned_lock() {
        let slot = InMemorySnapshotSlot::new();
        slot.write_snapshot(&SnapshotRecord::new(LessonId::new(1), "a", fixed_now()))
            .await
            .unwrap();

        let holder = slot.clone();
        let _ = std::thread::spawn(move || {
            let _guard = holder.slots.lock().unwrap();
            panic!("poison the slot lock");
        })
        .join();

        assert!(slot.slots.is_poisoned());
        assert_eq!(slot.len(), 1);
        assert!(!slot.is_empty());
    }
}
