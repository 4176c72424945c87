// HTTP-level tests for the snippet analysis endpoints

use crate::config::{LLMConfig, LimitsConfig};
use crate::services::LLMClient;
use crate::tests::common::*;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use std::sync::Arc;

#[tokio::test]
async fn test_analyze_snippet_returns_stored_record() {
    let pool = create_test_db().await;
    let reviewer = ScriptedReviewer::new(Script::RawReply(PRINT_ONE_REPLY));
    let service = create_test_service(&pool, reviewer.clone(), LimitsConfig::default());
    let app = create_test_router(create_test_state(service));

    let (status, body) =
        post_snippet(&app, r#"{"code":"print(1)","language":"python","title":"t1"}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Analysis saved successfully");

    let data = &body["data"];
    assert!(uuid::Uuid::parse_str(data["id"].as_str().unwrap()).is_ok());
    assert!(data["createdAt"].as_str().is_some());
    assert_eq!(data["code"], "print(1)");
    assert_eq!(data["language"], "python");
    assert_eq!(data["title"], "t1");
    assert_eq!(data["analysis"]["summary"], "prints 1");
    assert_eq!(data["analysis"]["timeComplexity"], "O(1)");
    assert_eq!(data["analysis"]["suggestions"], serde_json::json!(["No suggestions provided"]));
    assert_eq!(reviewer.calls(), 1);
}

#[tokio::test]
async fn test_missing_title_is_rejected_without_side_effects() {
    let pool = create_test_db().await;
    let reviewer = ScriptedReviewer::new(Script::RawReply(PRINT_ONE_REPLY));
    let service = create_test_service(&pool, reviewer.clone(), LimitsConfig::default());
    let app = create_test_router(create_test_state(service.clone()));

    let (status, body) = post_snippet(&app, r#"{"code":"x=1","language":"python"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({ "message": "Please provide all the fields" }));
    assert_eq!(reviewer.calls(), 0);
    assert_eq!(service.repository().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_empty_code_is_rejected() {
    let pool = create_test_db().await;
    let reviewer = ScriptedReviewer::new(Script::RawReply(PRINT_ONE_REPLY));
    let service = create_test_service(&pool, reviewer.clone(), LimitsConfig::default());
    let app = create_test_router(create_test_state(service));

    let (status, body) =
        post_snippet(&app, r#"{"code":"","language":"python","title":"t"}"#).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide all the fields");
    assert_eq!(reviewer.calls(), 0);
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let pool = create_test_db().await;
    let reviewer = ScriptedReviewer::new(Script::RawReply(PRINT_ONE_REPLY));
    let service = create_test_service(&pool, reviewer.clone(), LimitsConfig::default());
    let app = create_test_router(create_test_state(service));

    let (status, body) = post_snippet(&app, "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please provide all the fields");

    // Wrong field type is treated the same way
    let (status, _) =
        post_snippet(&app, r#"{"code":42,"language":"python","title":"t"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reviewer.calls(), 0);
}

#[tokio::test]
async fn test_oversized_code_is_rejected() {
    let pool = create_test_db().await;
    let reviewer = ScriptedReviewer::new(Script::RawReply(PRINT_ONE_REPLY));
    let limits = LimitsConfig { max_code_bytes: 16, ..LimitsConfig::default() };
    let service = create_test_service(&pool, reviewer.clone(), limits);
    let app = create_test_router(create_test_state(service));

    let code = "x".repeat(100);
    let payload = serde_json::json!({ "code": code, "language": "python", "title": "big" });
    let (status, body) = post_snippet(&app, &payload.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Code snippet exceeds the maximum size of 16 bytes");
    assert_eq!(reviewer.calls(), 0);
}

#[tokio::test]
async fn test_provider_failure_returns_500_and_stores_nothing() {
    let pool = create_test_db().await;
    let reviewer = ScriptedReviewer::new(Script::NetworkError("connection refused"));
    let service = create_test_service(&pool, reviewer.clone(), LimitsConfig::default());
    let app = create_test_router(create_test_state(service.clone()));

    let (status, body) =
        post_snippet(&app, r#"{"code":"print(1)","language":"python","title":"t1"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
    assert_eq!(body["error"], "connection refused");
    assert_eq!(reviewer.calls(), 1);
    assert_eq!(service.repository().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_store_failure_returns_500_and_leaves_no_record() {
    let pool = create_test_db().await;
    sqlx::query(
        r#"CREATE TRIGGER reject_insert BEFORE INSERT ON snippet_analyses
           BEGIN SELECT RAISE(ABORT, 'disk is full'); END"#,
    )
    .execute(&pool)
    .await
    .unwrap();

    let reviewer = ScriptedReviewer::new(Script::RawReply(PRINT_ONE_REPLY));
    let service = create_test_service(&pool, reviewer.clone(), LimitsConfig::default());
    let app = create_test_router(create_test_state(service.clone()));

    let (status, body) =
        post_snippet(&app, r#"{"code":"print(1)","language":"python","title":"t1"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Storage error"), "unexpected error: {}", error);
    assert!(error.contains("disk is full"));
    assert_eq!(reviewer.calls(), 1);
    assert_eq!(service.repository().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_oversized_body_is_rejected_with_body_limit() {
    let pool = create_test_db().await;
    let reviewer = ScriptedReviewer::new(Script::RawReply(PRINT_ONE_REPLY));
    let limits = LimitsConfig { max_code_bytes: 16, ..LimitsConfig::default() };
    let body_limit = limits.max_body_bytes();
    let service = create_test_service(&pool, reviewer.clone(), limits);
    let app = create_test_router(create_test_state(service));

    // Small code, huge title: the body limit trips, not the code bound
    let title = "t".repeat(body_limit + 1);
    let payload = serde_json::json!({ "code": "x", "language": "python", "title": title });
    let (status, body) = post_snippet(&app, &payload.to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        format!("Request body exceeds the maximum size of {} bytes", body_limit)
    );
    assert_eq!(reviewer.calls(), 0);
}

#[tokio::test]
async fn test_missing_api_key_fails_each_analysis() {
    let pool = create_test_db().await;
    let client = LLMClient::new(&LLMConfig { api_key: None, ..LLMConfig::default() }).unwrap();
    let service = create_test_service(&pool, Arc::new(client), LimitsConfig::default());
    let app = create_test_router(create_test_state(service.clone()));

    let (status, body) =
        post_snippet(&app, r#"{"code":"print(1)","language":"python","title":"t1"}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("API key not configured"));
    assert_eq!(service.repository().count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_list_snippets_returns_all_records_in_order() {
    let pool = create_test_db().await;
    let reviewer = ScriptedReviewer::new(Script::RawReply(PRINT_ONE_REPLY));
    let service = create_test_service(&pool, reviewer, LimitsConfig::default());
    let app = create_test_router(create_test_state(service));

    let (status, body) = get_snippets(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Snippets fetched successfully");
    assert_eq!(body["data"], serde_json::json!([]));

    for title in ["first", "second"] {
        let payload = serde_json::json!({ "code": "print(1)", "language": "python", "title": title });
        let (status, _) = post_snippet(&app, &payload.to_string()).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get_snippets(&app).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["first", "second"]);

    // Listing has no side effects
    let (_, again) = get_snippets(&app).await;
    assert_eq!(again["data"], body["data"]);
}

#[tokio::test]
async fn test_list_snippets_storage_failure() {
    let pool = create_test_db().await;
    let reviewer = ScriptedReviewer::new(Script::RawReply(PRINT_ONE_REPLY));
    let service = create_test_service(&pool, reviewer, LimitsConfig::default());
    let app = create_test_router(create_test_state(service));

    pool.close().await;

    let (status, body) = get_snippets(&app).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to fetch snippets");
    assert!(body["error"].as_str().is_some());
}

#[tokio::test]
async fn test_root_returns_json_status_for_api_clients() {
    let pool = create_test_db().await;
    let reviewer = ScriptedReviewer::new(Script::RawReply(PRINT_ONE_REPLY));
    let service = create_test_service(&pool, reviewer, LimitsConfig::default());
    let app = create_test_router(create_test_state(service));

    let req = Request::builder()
        .uri("/")
        .header(header::ACCEPT, "application/json")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "message": "CodeIntel API is running" }));
}

#[tokio::test]
async fn test_ready_check_reports_store_state() {
    let pool = create_test_db().await;
    let reviewer = ScriptedReviewer::new(Script::RawReply(PRINT_ONE_REPLY));
    let service = create_test_service(&pool, reviewer, LimitsConfig::default());
    let app = create_test_router(create_test_state(service));

    let req = Request::builder().uri("/ready").body(Body::empty()).unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    pool.close().await;

    let req = Request::builder().uri("/ready").body(Body::empty()).unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
