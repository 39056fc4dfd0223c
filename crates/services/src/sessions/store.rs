use std::sync::Arc;

use chrono::Duration;
use lesson_core::Clock;
use lesson_core::model::{LessonId, SessionState};
use storage::repository::{SnapshotRecord, SnapshotSlot};

/// Saves and restores in-progress attempts with a staleness rule.
///
/// Every failure is absorbed: the caller sees either a usable state or nothing.
#[derive(Clone)]
pub struct SessionStateStore {
    clock: Clock,
    slot: Arc<dyn SnapshotSlot>,
    staleness_window: Duration,
}

impl SessionStateStore {
    #[must_use]
    pub fn new(clock: Clock, slot: Arc<dyn SnapshotSlot>, staleness_window: Duration) -> Self {
        Self {
            clock,
            slot,
            staleness_window,
        }
    }

    /// Read the snapshot for `lesson_id`.
    ///
    /// Snapshots at least `staleness_window` old are deleted and reported as absent.
    pub async fn load(&self, lesson_id: LessonId) -> Option<SessionState> {
        let record = match self.slot.read_snapshot(lesson_id).await {
            Ok(Some(record)) => record,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(%lesson_id, error = %err, "failed to read session snapshot");
                return None;
            }
        };

        let age = self.clock.elapsed_since(record.saved_at);
        if age >= self.staleness_window {
            tracing::info!(%lesson_id, age_secs = age.num_seconds(), "discarding stale session snapshot");
            self.clear(lesson_id).await;
            return None;
        }

        match serde_json::from_str::<SessionState>(&record.payload) {
            Ok(state) => Some(state),
            Err(err) => {
                tracing::warn!(%lesson_id, error = %err, "unreadable session snapshot");
                None
            }
        }
    }

    /// Overwrite the snapshot with `state`, stamped with the current time.
    pub async fn save(&self, lesson_id: LessonId, state: &SessionState) {
        let payload = match serde_json::to_string(state) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(%lesson_id, error = %err, "failed to encode session snapshot");
                return;
            }
        };
        let record = SnapshotRecord::new(lesson_id, payload, self.clock.now());
        if let Err(err) = self.slot.write_snapshot(&record).await {
            tracing::warn!(%lesson_id, error = %err, "failed to write session snapshot");
        }
    }

    /// Delete the snapshot.
    pub async fn clear(&self, lesson_id: LessonId) {
        if let Err(err) = self.slot.delete_snapshot(lesson_id).await {
            tracing::warn!(%lesson_id, error = %err, "failed to delete session snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lesson_core::model::{AnsweredRecord, QuestionId};
    use lesson_core::time::{fixed_clock, fixed_now};
    use storage::repository::{InMemorySnapshotSlot, StorageError};

    fn store_with(slot: &InMemorySnapshotSlot, clock: Clock) -> SessionStateStore {
        SessionStateStore::new(clock, Arc::new(slot.clone()), Duration::hours(1))
    }

    fn sample_state() -> SessionState {
        let mut state = SessionState::fresh(5);
        state
            .record(AnsweredRecord {
                question_id: QuestionId::new(1),
                was_correct: false,
                correct_answer: "hola".into(),
                explanation: "greeting".into(),
            })
            .unwrap();
        state.lose_heart();
        state
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let slot = InMemorySnapshotSlot::new();
        let store = store_with(&slot, fixed_clock());
        let lesson = LessonId::new(1);
        let state = sample_state();

        store.save(lesson, &state).await;
        assert_eq!(store.load(lesson).await, Some(state));
    }

    #[tokio::test]
    async fn stale_snapshot_is_deleted() {
        let slot = InMemorySnapshotSlot::new();
        let lesson = LessonId::new(1);
        store_with(&slot, fixed_clock()).save(lesson, &sample_state()).await;

        let mut later = fixed_clock();
        later.advance(Duration::hours(2));
        assert_eq!(store_with(&slot, later).load(lesson).await, None);
        assert!(slot.is_empty());
    }

    #[tokio::test]
    async fn snapshot_exactly_at_window_is_stale() {
        let slot = InMemorySnapshotSlot::new();
        let lesson = LessonId::new(1);
        store_with(&slot, fixed_clock()).save(lesson, &sample_state()).await;

        let mut later = fixed_clock();
        later.advance(Duration::hours(1));
        assert_eq!(store_with(&slot, later).load(lesson).await, None);
    }

    #[tokio::test]
    async fn snapshot_inside_window_survives() {
        let slot = InMemorySnapshotSlot::new();
        let lesson = LessonId::new(1);
        store_with(&slot, fixed_clock()).save(lesson, &sample_state()).await;

        let mut later = fixed_clock();
        later.advance(Duration::minutes(59));
        assert!(store_with(&slot, later).load(lesson).await.is_some());
    }

    #[tokio::test]
    async fn corrupt_payload_reads_as_absent() {
        let slot = InMemorySnapshotSlot::new();
        let lesson = LessonId::new(4);
        slot.write_snapshot(&SnapshotRecord::new(lesson, "{not json", fixed_now()))
            .await
            .unwrap();

        assert_eq!(store_with(&slot, fixed_clock()).load(lesson).await, None);
    }

    #[tokio::test]
    async fn clear_removes_snapshot() {
        let slot = InMemorySnapshotSlot::new();
        let store = store_with(&slot, fixed_clock());
        let lesson = LessonId::new(2);
        store.save(lesson, &sample_state()).await;

        store.clear(lesson).await;
        assert!(slot.is_empty());
        assert_eq!(store.load(lesson).await, None);
    }

    struct BrokenSlot;

    #[async_trait]
    impl SnapshotSlot for BrokenSlot {
        async fn read_snapshot(
            &self,
            _lesson_id: LessonId,
        ) -> Result<Option<SnapshotRecord>, StorageError> {
            Err(StorageError::Connection("disk gone".into()))
        }

        async fn write_snapshot(&self, _record: &SnapshotRecord) -> Result<(), StorageError> {
            Err(StorageError::Connection("disk gone".into()))
        }

        async fn delete_snapshot(&self, _lesson_id: LessonId) -> Result<(), StorageError> {
            Err(StorageError::Connection("disk gone".into()))
        }
    }

    #[tokio::test]
    async fn slot_failures_are_absorbed() {
        let store = SessionStateStore::new(fixed_clock(), Arc::new(BrokenSlot), Duration::hours(1));
        let lesson = LessonId::new(1);

        store.save(lesson, &sample_state()).await;
        store.clear(lesson).await;
        assert_eq!(store.load(lesson).await, None);
    }
}
