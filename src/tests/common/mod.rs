// Common test utilities and helpers

use crate::AppState;
use crate::config::{LimitsConfig, StaticConfig};
use crate::handlers;
use crate::models::{CodeAnalysis, SnippetSubmission};
use crate::services::llm::{CodeReviewer, LLMError, RawAnalysisReply};
use crate::services::{AnalysisRepository, AnalysisService};
use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    extract::DefaultBodyLimit,
    http::{Request, StatusCode, header},
    routing::get,
};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tower::util::ServiceExt;

/// Create an in-memory SQLite database for testing
pub async fn create_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// What the scripted reviewer does on every call
pub enum Script {
    /// Provider reply text, decoded and normalized like a real reply
    RawReply(&'static str),
    /// Transport-level failure with the given message
    NetworkError(&'static str),
}

/// Reviewer that replays a fixed script and counts its calls
pub struct ScriptedReviewer {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedReviewer {
    pub fn new(script: Script) -> Arc<Self> {
        Arc::new(Self { script, calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CodeReviewer for ScriptedReviewer {
    async fn review(&self, _snippet: &SnippetSubmission) -> Result<CodeAnalysis, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script {
            Script::RawReply(text) => Ok(RawAnalysisReply::parse(text)?.normalize()),
            Script::NetworkError(msg) => Err(LLMError::ApiError(msg.to_string())),
        }
    }
}

/// Provider reply used by most tests: complete, with empty suggestions
pub const PRINT_ONE_REPLY: &str = r#"{
    "summary": "prints 1",
    "bugs": [],
    "vulnerabilities": [],
    "timeComplexity": "O(1)",
    "spaceComplexity": "O(1)",
    "suggestions": []
}"#;

pub fn create_test_service(
    pool: &SqlitePool,
    reviewer: Arc<dyn CodeReviewer>,
    limits: LimitsConfig,
) -> Arc<AnalysisService> {
    Arc::new(AnalysisService::new(AnalysisRepository::new(pool.clone()), reviewer, limits))
}

pub fn create_test_state(service: Arc<AnalysisService>) -> Arc<AppState> {
    Arc::new(AppState {
        static_config: StaticConfig::default(),
        analysis_service: service,
    })
}

/// Router with the analysis and system routes, wired like the binary
pub fn create_test_router(state: Arc<AppState>) -> Router {
    let body_limit = state.analysis_service.limits().max_body_bytes();

    Router::new()
        .route(
            "/api/analyze/snippets",
            get(handlers::analysis::list_snippets).post(handlers::analysis::analyze_snippet),
        )
        .route("/", get(handlers::system::root))
        .route("/ready", get(handlers::system::ready_check))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// POST a raw body to the analysis endpoint; returns status and parsed JSON
pub async fn post_snippet(app: &Router, body: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method("POST")
        .uri("/api/analyze/snippets")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    send(app, req).await
}

pub async fn get_snippets(app: &Router) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .method("GET")
        .uri("/api/analyze/snippets")
        .body(Body::empty())
        .unwrap();

    send(app, req).await
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}
