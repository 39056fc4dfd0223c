use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use lesson_core::model::{LessonId, QuestionId, QuestionKind};
use services::ApiError;
use services::api::{
    AnswerRecorder, ApiConfig, CompletionRecorder, LessonApiClient, LessonCompletion,
    QuestionSource,
};
use tokio::net::TcpListener;

/// Request as seen by the stub backend.
#[derive(Debug, Clone)]
struct Captured {
    method: Method,
    path: String,
    authorization: Option<String>,
    body: String,
}

#[derive(Clone)]
struct Backend {
    status: StatusCode,
    body: &'static str,
    seen: Arc<Mutex<Vec<Captured>>>,
}

impl Backend {
    fn requests(&self) -> Vec<Captured> {
        self.seen.lock().unwrap().clone()
    }
}

async fn respond(
    State(backend): State<Backend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    backend.seen.lock().unwrap().push(Captured {
        method,
        path: uri.path().to_owned(),
        authorization,
        body,
    });
    (
        backend.status,
        [(header::CONTENT_TYPE, "application/json")],
        backend.body,
    )
}

/// Serve the lesson endpoints on an ephemeral port; returns the api base url.
async fn serve(status: StatusCode, body: &'static str) -> (String, Backend) {
    let backend = Backend {
        status,
        body,
        seen: Arc::default(),
    };
    let app = Router::new()
        .route("/api/lessons/{id}/questions/", get(respond))
        .route("/api/questions/{id}/submit_answer/", post(respond))
        .route("/api/lessons/{id}/complete/", post(respond))
        .with_state(backend.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}/api", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (base, backend)
}

fn client(base: &str, token: Option<&str>) -> LessonApiClient {
    LessonApiClient::new(ApiConfig::new(base, token.map(str::to_owned)).unwrap())
}

#[tokio::test]
async fn fetches_and_decodes_questions() {
    let body = r#"[
        {"id": 11, "question_type": "select_word", "prompt": "El ___ come",
         "correct_answer": "gato", "options": [{"text": "gato"}, {"text": "perro"}],
         "vocabulary_word": "gato",
         "word_translations": {"Come": {"translation": "eats", "part_of_speech": "verb"}}},
        {"id": 12, "question_type": "speak", "prompt": "Hola", "correct_answer": "hola"}
    ]"#;
    let (base, backend) = serve(StatusCode::OK, body).await;

    let questions = client(&base, Some("secret"))
        .lesson_questions(LessonId::new(3))
        .await
        .unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].path, "/api/lessons/3/questions/");
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer secret"));

    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].id(), QuestionId::new(11));
    assert_eq!(questions[0].kind(), QuestionKind::SelectWord);
    assert_eq!(questions[0].options(), ["gato", "perro"]);
    assert_eq!(questions[0].translation_for("come").unwrap().translation, "eats");
    assert_eq!(questions[1].kind(), QuestionKind::Speak);
}

#[tokio::test]
async fn unknown_question_type_fails_decoding() {
    let body = r#"[{"id": 1, "question_type": "draw", "prompt": "x", "correct_answer": "y"}]"#;
    let (base, _backend) = serve(StatusCode::OK, body).await;

    let err = client(&base, None)
        .lesson_questions(LessonId::new(3))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn posts_submitted_answer() {
    let (base, backend) = serve(StatusCode::OK, "{}").await;

    client(&base, None)
        .record_answer(QuestionId::new(42), "hola")
        .await
        .unwrap();

    let requests = backend.requests();
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].path, "/api/questions/42/submit_answer/");
    assert_eq!(requests[0].body, r#"{"answer":"hola"}"#);
    assert!(requests[0].authorization.is_none());
}

#[tokio::test]
async fn posts_lesson_completion() {
    let (base, backend) = serve(StatusCode::OK, "{}").await;
    let completion = LessonCompletion {
        lesson_id: LessonId::new(5),
        stars_earned: 3,
        questions_completed: 5,
        questions_correct: 3,
        xp_earned: 30,
    };

    client(&base, None).complete_lesson(&completion).await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(requests[0].path, "/api/lessons/5/complete/");
    let json: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "stars_earned": 3,
            "questions_completed": 5,
            "questions_correct": 3,
            "xp_earned": 30
        })
    );
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let (base, _backend) = serve(StatusCode::INTERNAL_SERVER_ERROR, "{}").await;

    let err = client(&base, None)
        .record_answer(QuestionId::new(1), "x")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::HttpStatus(status) if status.as_u16() == 500));
}
