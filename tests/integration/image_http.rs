//! Image generation and object storage clients against a local mock server.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mockito::Matcher;
use serde_json::json;
use slidesmith::credentials::Credentials;
use slidesmith::document::AspectRatio;
use slidesmith::error::ApiError;
use slidesmith::image::{
    GcsStorage, ImageGenerator, ImageProvider, ImagenClient, ObjectStorage, StoredImageProvider,
};
use slidesmith::retry::RetryPolicy;
use std::sync::Arc;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake";

fn credentials() -> Credentials {
    Credentials {
        access_token: "token-123".to_string(),
        api_key: None,
    }
}

fn predict_body(bytes: &[u8]) -> String {
    json!({ "predictions": [{ "bytesBase64Encoded": STANDARD.encode(bytes), "mimeType": "image/png" }] })
        .to_string()
}

#[tokio::test]
async fn imagen_sends_prompt_and_ratio_with_key() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1beta/models/imagen-test:predict")
        .match_query(Matcher::UrlEncoded("key".to_string(), "k1".to_string()))
        .match_body(Matcher::PartialJson(json!({
            "instances": [{ "prompt": "a red circle" }],
            "parameters": { "sampleCount": 1, "aspectRatio": "16:9" }
        })))
        .with_status(200)
        .with_body(predict_body(PNG_BYTES))
        .create_async()
        .await;

    let client =
        ImagenClient::new(Some("imagen-test".to_string()), "k1".to_string(), Some(server.url()))
            .unwrap();
    let bytes = client
        .generate_png("a red circle", AspectRatio::Landscape16x9)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(bytes, PNG_BYTES);
}

#[tokio::test]
async fn imagen_filtered_output_is_empty_generation() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1beta/models/imagen-test:predict")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"predictions": []}"#)
        .create_async()
        .await;

    let client =
        ImagenClient::new(Some("imagen-test".to_string()), "k1".to_string(), Some(server.url()))
            .unwrap();
    let err = client
        .generate_png("something filtered", AspectRatio::Square)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::EmptyGeneration(_)));
}

#[tokio::test]
async fn imagen_bad_key_is_auth_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1beta/models/imagen-test:predict")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"error": {"message": "API key not valid"}}"#)
        .create_async()
        .await;

    let client = ImagenClient::new(
        Some("imagen-test".to_string()),
        "wrong".to_string(),
        Some(server.url()),
    )
    .unwrap();
    let err = client
        .generate_png("a red circle", AspectRatio::Square)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::ProviderAuthFailed(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn storage_upload_sets_cache_control() {
    let mut server = mockito::Server::new_async().await;
    let upload = server
        .mock("POST", "/upload/storage/v1/b/bkt/o")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("uploadType".to_string(), "media".to_string()),
            Matcher::UrlEncoded("name".to_string(), "slides/a.png".to_string()),
        ]))
        .match_header("authorization", "Bearer token-123")
        .match_header("content-type", "image/png")
        .with_status(200)
        .with_body(r#"{"name": "slides/a.png"}"#)
        .create_async()
        .await;
    let patch = server
        .mock("PATCH", "/storage/v1/b/bkt/o/slides%2Fa.png")
        .match_body(Matcher::Json(json!({ "cacheControl": "public, max-age=31536000" })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let storage = GcsStorage::new(&credentials(), "bkt", Some(server.url()), None).unwrap();
    storage
        .put_object(
            "slides/a.png",
            PNG_BYTES.to_vec(),
            "image/png",
            "public, max-age=31536000",
        )
        .await
        .unwrap();

    upload.assert_async().await;
    patch.assert_async().await;
    assert_eq!(
        storage.public_url("slides/a.png"),
        "https://storage.googleapis.com/bkt/slides/a.png"
    );
}

#[tokio::test]
async fn storage_delete_missing_object_fails() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("DELETE", "/storage/v1/b/bkt/o/slides%2Fgone.png")
        .with_status(404)
        .create_async()
        .await;

    let storage = GcsStorage::new(&credentials(), "bkt", Some(server.url()), None).unwrap();
    let err = storage.delete_object("slides/gone.png").await.unwrap_err();
    assert!(matches!(err, ApiError::ProviderNotFound(_)));
}

#[tokio::test]
async fn ensure_bucket_creates_and_grants_public_read() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/storage/v1/b/bkt")
        .with_status(404)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/storage/v1/b")
        .match_query(Matcher::UrlEncoded("project".to_string(), "proj-1".to_string()))
        .match_body(Matcher::Json(json!({ "name": "bkt", "location": "europe-west1" })))
        .with_status(200)
        .with_body(r#"{"name": "bkt"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/storage/v1/b/bkt/iam")
        .with_status(200)
        .with_body(r#"{"bindings": [{"role": "roles/storage.admin", "members": ["user:a@example.com"]}], "etag": "CAE="}"#)
        .create_async()
        .await;
    let grant = server
        .mock("PUT", "/storage/v1/b/bkt/iam")
        .match_body(Matcher::PartialJson(json!({
            "etag": "CAE=",
            "bindings": [
                { "role": "roles/storage.admin", "members": ["user:a@example.com"] },
                { "role": "roles/storage.objectViewer", "members": ["allUsers"] }
            ]
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let storage = GcsStorage::new(&credentials(), "bkt", Some(server.url()), None).unwrap();
    let setup = storage
        .ensure_bucket(Some("proj-1"), "europe-west1")
        .await
        .unwrap();

    create.assert_async().await;
    grant.assert_async().await;
    assert!(setup.created);
    assert!(setup.public_granted);
    assert_eq!(setup.base_url, "https://storage.googleapis.com/bkt/");
}

#[tokio::test]
async fn ensure_bucket_is_idempotent() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/storage/v1/b/bkt")
        .with_status(200)
        .with_body(r#"{"name": "bkt"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/storage/v1/b/bkt/iam")
        .with_status(200)
        .with_body(r#"{"bindings": [{"role": "roles/storage.objectViewer", "members": ["allUsers"]}]}"#)
        .create_async()
        .await;
    let grant = server
        .mock("PUT", "/storage/v1/b/bkt/iam")
        .expect(0)
        .create_async()
        .await;

    let storage = GcsStorage::new(&credentials(), "bkt", Some(server.url()), None).unwrap();
    let setup = storage.ensure_bucket(None, "us-central1").await.unwrap();

    grant.assert_async().await;
    assert!(!setup.created);
    assert!(!setup.public_granted);
}

#[tokio::test]
async fn missing_bucket_without_project_is_config_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/storage/v1/b/bkt")
        .with_status(404)
        .create_async()
        .await;

    let storage = GcsStorage::new(&credentials(), "bkt", Some(server.url()), None).unwrap();
    let err = storage.ensure_bucket(None, "us-central1").await.unwrap_err();
    assert!(matches!(err, ApiError::ConfigError(_)));
}

#[tokio::test]
async fn stored_provider_generates_uploads_and_returns_public_url() {
    let mut server = mockito::Server::new_async().await;
    let predict = server
        .mock("POST", "/v1beta/models/imagen-test:predict")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(predict_body(PNG_BYTES))
        .create_async()
        .await;
    let upload = server
        .mock("POST", "/upload/storage/v1/b/bkt/o")
        .match_query(Matcher::Regex(r"name=deck%2F[0-9a-f-]+\.png".to_string()))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;
    let patch = server
        .mock(
            "PATCH",
            Matcher::Regex(r"^/storage/v1/b/bkt/o/deck%2F[0-9a-f-]+\.png$".to_string()),
        )
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let generator = ImagenClient::new(
        Some("imagen-test".to_string()),
        "k1".to_string(),
        Some(server.url()),
    )
    .unwrap();
    let storage = GcsStorage::new(
        &credentials(),
        "bkt",
        Some(server.url()),
        Some("cdn.example.com".to_string()),
    )
    .unwrap();
    let provider = StoredImageProvider::new(
        Arc::new(generator),
        Arc::new(storage),
        "deck",
        RetryPolicy::none(),
    );

    let url = provider.generate("a red circle", "4:3").await.unwrap();

    predict.assert_async().await;
    upload.assert_async().await;
    patch.assert_async().await;
    assert!(url.starts_with("https://cdn.example.com/bkt/deck/"));
    assert!(url.ends_with(".png"));
}

#[tokio::test]
async fn stored_provider_rejects_bad_ratio_without_calls() {
    let mut server = mockito::Server::new_async().await;
    let predict = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let generator = ImagenClient::new(None, "k1".to_string(), Some(server.url())).unwrap();
    let storage = GcsStorage::new(&credentials(), "bkt", Some(server.url()), None).unwrap();
    let provider = StoredImageProvider::new(
        Arc::new(generator),
        Arc::new(storage),
        "slides",
        RetryPolicy::none(),
    );

    let err = provider.generate("a red circle", "5:5").await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidArgument(_)));
    predict.assert_async().await;
}
