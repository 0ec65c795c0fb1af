//! Slides and Drive HTTP client against a local mock server.

use mockito::Matcher;
use serde_json::json;
use slidesmith::credentials::Credentials;
use slidesmith::error::ApiError;
use slidesmith::executor::{PlanExecutor, RunTotals};
use slidesmith::planner::{ElementCounts, PlannedBatch};
use slidesmith::rate_limit::RateLimiter;
use slidesmith::retry::RetryPolicy;
use slidesmith::slides::{MutationCommand, PresentationService, SlidesHttpClient};

fn credentials() -> Credentials {
    Credentials {
        access_token: "token-123".to_string(),
        api_key: None,
    }
}

fn client(server: &mockito::ServerGuard) -> SlidesHttpClient {
    SlidesHttpClient::new(&credentials(), Some(server.url()), Some(server.url())).unwrap()
}

#[tokio::test]
async fn batch_update_posts_requests_with_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/presentations/deck-1:batchUpdate")
        .match_header("authorization", "Bearer token-123")
        .match_body(Matcher::Json(json!({
            "requests": [
                { "deleteText": { "objectId": "t1", "textRange": { "type": "ALL" } } },
                { "insertText": { "objectId": "t1", "insertionIndex": 0, "text": "Hello" } }
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"presentationId": "deck-1", "replies": [{}, {}]}"#)
        .create_async()
        .await;

    let response = client(&server)
        .batch_update(
            "deck-1",
            &[
                MutationCommand::delete_all_text("t1"),
                MutationCommand::insert_text("t1", "Hello"),
            ],
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.presentation_id.as_deref(), Some("deck-1"));
    assert_eq!(response.replies.len(), 2);
}

#[tokio::test]
async fn create_slide_reply_carries_object_id() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/presentations/deck-1:batchUpdate")
        .with_status(200)
        .with_body(r#"{"replies": [{"createSlide": {"objectId": "g1a2b3"}}]}"#)
        .create_async()
        .await;

    let response = client(&server)
        .batch_update("deck-1", &[MutationCommand::insert_text("x", "y")])
        .await
        .unwrap();
    assert_eq!(response.created_slide_id(0).unwrap(), "g1a2b3");
    assert!(matches!(
        response.created_slide_id(1),
        Err(ApiError::BatchReply(_))
    ));
}

#[tokio::test]
async fn status_codes_map_to_error_kinds() {
    let mut server = mockito::Server::new_async().await;
    let cases = [
        ("bad", 400),
        ("auth", 401),
        ("missing", 404),
        ("quota", 429),
        ("down", 503),
    ];
    for (id, status) in cases {
        server
            .mock("POST", format!("/v1/presentations/{}:batchUpdate", id).as_str())
            .with_status(status)
            .with_body(r#"{"error": {"message": "nope"}}"#)
            .create_async()
            .await;
    }
    let client = client(&server);
    let command = [MutationCommand::insert_text("t1", "x")];

    let err = client.batch_update("bad", &command).await.unwrap_err();
    assert!(matches!(err, ApiError::BatchRejected(ref m) if m.contains("nope")));
    assert!(matches!(
        client.batch_update("auth", &command).await,
        Err(ApiError::ProviderAuthFailed(_))
    ));
    assert!(matches!(
        client.batch_update("missing", &command).await,
        Err(ApiError::ProviderNotFound(_))
    ));
    let quota = client.batch_update("quota", &command).await.unwrap_err();
    assert!(matches!(quota, ApiError::ProviderRateLimit(_)));
    assert!(quota.is_retryable());
    let down = client.batch_update("down", &command).await.unwrap_err();
    assert!(down.is_retryable());
}

#[tokio::test]
async fn executor_retries_server_errors_then_skips() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/presentations/deck-1:batchUpdate")
        .with_status(503)
        .expect(3)
        .create_async()
        .await;

    let client = client(&server);
    let policy = RetryPolicy {
        max_attempts: 3,
        initial_backoff_ms: 1,
        max_backoff_ms: 2,
    };
    let executor = PlanExecutor::new(&client, "deck-1", RateLimiter::new(6000).unwrap(), policy);
    let batch = PlannedBatch {
        slide_number: 1,
        description: "replace text t1 on slide 1".to_string(),
        commands: vec![MutationCommand::insert_text("t1", "x")],
        elements: ElementCounts {
            text: 1,
            ..ElementCounts::default()
        },
    };
    let mut totals = RunTotals::default();

    assert!(executor.execute(&batch, &mut totals).await.is_none());
    mock.assert_async().await;
    assert_eq!(totals.text.skipped, 1);
    assert_eq!(totals.text.updated, 0);
}

#[tokio::test]
async fn copy_presentation_targets_folder() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/drive/v3/files/template-1/copy")
        .match_query(Matcher::UrlEncoded(
            "supportsAllDrives".to_string(),
            "true".to_string(),
        ))
        .match_header("authorization", "Bearer token-123")
        .match_body(Matcher::Json(json!({
            "name": "Quarterly deck",
            "parents": ["folder-9"]
        })))
        .with_status(200)
        .with_body(r#"{"id": "copy-42", "name": "Quarterly deck"}"#)
        .create_async()
        .await;

    let id = client(&server)
        .copy_presentation("template-1", "Quarterly deck", "folder-9")
        .await
        .unwrap();
    mock.assert_async().await;
    assert_eq!(id, "copy-42");
}
