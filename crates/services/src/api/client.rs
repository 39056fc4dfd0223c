use async_trait::async_trait;
use lesson_core::model::{LessonId, Question, QuestionId};
use reqwest::{Client, RequestBuilder, Response};

use super::dto::{CompleteLessonRequest, QuestionDto, SubmitAnswerRequest};
use super::{AnswerRecorder, ApiConfig, CompletionRecorder, LessonCompletion, QuestionSource};
use crate::error::ApiError;

/// REST client for the lesson backend.
#[derive(Clone)]
pub struct LessonApiClient {
    client: Client,
    config: ApiConfig,
}

impl LessonApiClient {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Build a client from `LESSON_API_BASE_URL` / `LESSON_API_TOKEN`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the base url is missing or invalid.
    pub fn from_env() -> Result<Self, ApiError> {
        Ok(Self::new(ApiConfig::from_env()?))
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn ensure_success(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(ApiError::HttpStatus(response.status()))
        }
    }
}

#[async_trait]
impl QuestionSource for LessonApiClient {
    async fn lesson_questions(&self, lesson_id: LessonId) -> Result<Vec<Question>, ApiError> {
        let url = self
            .config
            .endpoint(&format!("lessons/{lesson_id}/questions/"))?;
        let response = self.authorize(self.client.get(url)).send().await?;
        let body: Vec<QuestionDto> = Self::ensure_success(response)?.json().await?;
        body.into_iter().map(QuestionDto::into_question).collect()
    }
}

#[async_trait]
impl AnswerRecorder for LessonApiClient {
    async fn record_answer(&self, question_id: QuestionId, answer: &str) -> Result<(), ApiError> {
        let url = self
            .config
            .endpoint(&format!("questions/{question_id}/submit_answer/"))?;
        let response = self
            .authorize(self.client.post(url))
            .json(&SubmitAnswerRequest { answer })
            .send()
            .await?;
        Self::ensure_success(response)?;
        Ok(())
    }
}

#[async_trait]
impl CompletionRecorder for LessonApiClient {
    async fn complete_lesson(&self, completion: &LessonCompletion) -> Result<(), ApiError> {
        let url = self
            .config
            .endpoint(&format!("lessons/{}/complete/", completion.lesson_id))?;
        let response = self
            .authorize(self.client.post(url))
            .json(&CompleteLessonRequest::from(completion))
            .send()
            .await?;
        Self::ensure_success(response)?;
        Ok(())
    }
}
