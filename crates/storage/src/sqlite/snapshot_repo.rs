use chrono::{DateTime, Utc};
use lesson_core::model::LessonId;
use sqlx::Row;

use super::SqliteRepository;
use crate::repository::{SnapshotRecord, SnapshotSlot, StorageError};

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn lesson_id_i64(id: LessonId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("lesson_id overflow".into()))
}

#[async_trait::async_trait]
impl SnapshotSlot for SqliteRepository {
    async fn read_snapshot(
        &self,
        lesson_id: LessonId,
    ) -> Result<Option<SnapshotRecord>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT payload, saved_at
                FROM session_snapshots
                WHERE slot_key = ?1
            ",
        )
        .bind(lesson_id.snapshot_key())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let payload: String = row.try_get("payload").map_err(ser)?;
        let saved_at: DateTime<Utc> = row.try_get("saved_at").map_err(ser)?;
        Ok(Some(SnapshotRecord::new(lesson_id, payload, saved_at)))
    }

    async fn write_snapshot(&self, record: &SnapshotRecord) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO session_snapshots (slot_key, lesson_id, payload, saved_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(slot_key) DO UPDATE SET
                    payload = excluded.payload,
                    saved_at = excluded.saved_at
            ",
        )
        .bind(record.lesson_id.snapshot_key())
        .bind(lesson_id_i64(record.lesson_id)?)
        .bind(&record.payload)
        .bind(record.saved_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn delete_snapshot(&self, lesson_id: LessonId) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM session_snapshots WHERE slot_key = ?1")
            .bind(lesson_id.snapshot_key())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }
}
