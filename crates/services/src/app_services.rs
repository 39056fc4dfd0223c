use std::sync::Arc;

use lesson_core::model::SessionSettings;
use storage::repository::Storage;

use crate::Clock;
use crate::api::{ApiConfig, LessonApiClient};
use crate::error::AppServicesError;
use crate::sessions::LessonSessionLoop;

/// Assembles the lesson loop from a REST backend and snapshot storage.
#[derive(Clone)]
pub struct AppServices {
    api: LessonApiClient,
    session_loop: Arc<LessonSessionLoop>,
}

impl AppServices {
    /// Wire services over an already opened storage.
    #[must_use]
    pub fn new(
        storage: &Storage,
        api: LessonApiClient,
        clock: Clock,
        settings: SessionSettings,
    ) -> Self {
        let client = Arc::new(api.clone());
        let session_loop = LessonSessionLoop::new(
            clock,
            client.clone(),
            client.clone(),
            client,
            Arc::clone(&storage.snapshots),
        )
        .with_settings(settings);

        Self {
            api,
            session_loop: Arc::new(session_loop),
        }
    }

    /// Build services backed by `SQLite` snapshot storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        api: ApiConfig,
        clock: Clock,
        settings: SessionSettings,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::new(&storage, LessonApiClient::new(api), clock, settings))
    }

    /// Build services from `LESSON_API_BASE_URL`, `LESSON_API_TOKEN` and `LESSON_DB_URL`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the backend is not configured or storage cannot be opened.
    pub async fn from_env(clock: Clock) -> Result<Self, AppServicesError> {
        let api = LessonApiClient::from_env()?;
        let storage = Storage::sqlite_from_env().await?;
        tracing::info!(base_url = %api.config().base_url(), "lesson services ready");
        Ok(Self::new(&storage, api, clock, SessionSettings::default()))
    }

    #[must_use]
    pub fn api(&self) -> &LessonApiClient {
        &self.api
    }

    #[must_use]
    pub fn session_loop(&self) -> Arc<LessonSessionLoop> {
        Arc::clone(&self.session_loop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use lesson_core::time::fixed_clock;

    #[test]
    fn wires_settings_into_the_loop() {
        let api = LessonApiClient::new(ApiConfig::new("http://localhost:9/api", None).unwrap());
        let settings = SessionSettings::new(3, Duration::minutes(30), 20).unwrap();
        let services = AppServices::new(&Storage::in_memory(), api, fixed_clock(), settings);

        assert_eq!(services.session_loop().settings(), &settings);
        assert_eq!(services.api().config().base_url().as_str(), "http://localhost:9/api/");
    }
}
