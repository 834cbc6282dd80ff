use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use hashlink_core::{ShortKey, Storage, StorageError};
use hashlink_server::{App, AppState};
use hashlink_storage::InMemoryStorage;
use tower::ServiceExt;

const BASE_URL: &str = "http://localhost:8080";

/// A backend whose every call fails with the same error.
struct FailingStorage(StorageError);

#[async_trait]
impl Storage for FailingStorage {
    async fn put(&self, _key: &ShortKey, _original_url: &str) -> hashlink_core::Result<()> {
        Err(self.0.clone())
    }

    async fn get(&self, _key: &ShortKey) -> hashlink_core::Result<Option<String>> {
        Err(self.0.clone())
    }

    async fn close(&self) {}
}

/// A backend that never answers in time.
struct StalledStorage;

#[async_trait]
impl Storage for StalledStorage {
    async fn put(&self, _key: &ShortKey, _original_url: &str) -> hashlink_core::Result<()> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }

    async fn get(&self, _key: &ShortKey) -> hashlink_core::Result<Option<String>> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(None)
    }

    async fn close(&self) {}
}

fn app_with(storage: Arc<dyn Storage>) -> Router {
    App::router(AppState::new(storage, BASE_URL))
}

fn app() -> Router {
    app_with(Arc::new(InMemoryStorage::new()))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: impl Into<Body>,
) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body.into())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn shorten(app: &Router, url: &str) -> String {
    let (status, body) = send(app, Method::POST, "/", url.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    body
}

/// Follows a short link handed out by `shorten`.
async fn resolve(app: &Router, short_url: &str) -> (StatusCode, String) {
    let path = short_url.trim_start_matches(BASE_URL);
    send(app, Method::GET, path, Body::empty()).await
}

#[tokio::test]
async fn create_then_resolve() {
    let app = app();

    let (status, short_url) = send(&app, Method::POST, "/", "http://test.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        short_url,
        "http://localhost:8080/1aa0d4413384d91bc0d452f03b505298"
    );

    let (status, body) = send(
        &app,
        Method::GET,
        "/1aa0d4413384d91bc0d452f03b505298",
        Body::empty(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "http://test.com");
}

#[tokio::test]
async fn resolve_preserves_original_casing() {
    let app = app();

    let short_url = shorten(&app, "https://Example.com/Path").await;
    assert_eq!(
        short_url,
        format!("{BASE_URL}/{}", ShortKey::derive("https://example.com/path"))
    );

    let (status, body) = resolve(&app, &short_url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "https://Example.com/Path");
}

#[tokio::test]
async fn repeated_create_is_idempotent() {
    let app = app();

    let first = shorten(&app, "https://example.com/a").await;
    let second = shorten(&app, "https://example.com/a").await;
    assert_eq!(first, second);

    let (_, body) = resolve(&app, &first).await;
    assert_eq!(body, "https://example.com/a");
}

#[tokio::test]
async fn case_variants_keep_the_first_submission() {
    let app = app();

    let first = shorten(&app, "https://example.com/page").await;
    let second = shorten(&app, "HTTPS://EXAMPLE.COM/PAGE").await;
    assert_eq!(first, second);

    let (_, body) = resolve(&app, &first).await;
    assert_eq!(body, "https://example.com/page");
}

#[tokio::test]
async fn body_is_stored_verbatim() {
    let app = app();
    let url = "https://example.com/search?q=two words\n";

    let short_url = shorten(&app, url).await;

    let (_, body) = resolve(&app, &short_url).await;
    assert_eq!(body, url);
}

#[tokio::test]
async fn percent_encoded_key_is_decoded() {
    let app = app();
    shorten(&app, "http://test.com").await;

    // "%31" is "1", the first character of the key.
    let (status, body) = send(
        &app,
        Method::GET,
        "/%31aa0d4413384d91bc0d452f03b505298",
        Body::empty(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "http://test.com");
}

#[tokio::test]
async fn unknown_key_resolves_to_empty_body() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::GET,
        "/00000000000000000000000000000000",
        Body::empty(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "");
}

#[tokio::test]
async fn unknown_key_is_404_in_strict_mode() {
    let state =
        AppState::new(Arc::new(InMemoryStorage::new()), BASE_URL).with_strict_not_found(true);
    let app = App::router(state);

    let (status, body) = send(&app, Method::GET, "/missing", Body::empty()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "");

    let short_url = shorten(&app, "https://example.com").await;
    let (status, body) = resolve(&app, &short_url).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "https://example.com");
}

#[tokio::test]
async fn other_methods_are_rejected() {
    let app = app();

    for method in [Method::DELETE, Method::PUT, Method::PATCH] {
        let (status, body) = send(
            &app,
            method,
            "/1aa0d4413384d91bc0d452f03b505298",
            Body::empty(),
        )
        .await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, "");
    }

    let (status, body) = send(&app, Method::DELETE, "/", Body::empty()).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, "");
}

#[tokio::test]
async fn empty_body_is_rejected() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/", Body::empty()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "url must not be empty");
}

#[tokio::test]
async fn non_utf8_body_is_rejected() {
    let app = app();

    let (status, body) = send(&app, Method::POST, "/", vec![0xff_u8, 0xfe, 0xfd]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "url must be valid UTF-8");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let state =
        AppState::new(Arc::new(InMemoryStorage::new()), BASE_URL).with_max_body_bytes(16);
    let app = App::router(state);

    let (status, _) = send(&app, Method::POST, "/", "https://example.com/too/long").await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

    let (status, _) = send(&app, Method::POST, "/", "http://a.io").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn put_failure_is_500_with_error_text() {
    let app = app_with(Arc::new(FailingStorage(StorageError::Query(
        "connection reset by peer".to_string(),
    ))));

    let (status, body) = send(&app, Method::POST, "/", "http://test.com").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "storage query failed: connection reset by peer");
}

#[tokio::test]
async fn get_failure_is_500_with_error_text() {
    let app = app_with(Arc::new(FailingStorage(StorageError::Unavailable(
        "pool closed".to_string(),
    ))));

    let (status, body) = send(&app, Method::GET, "/abc", Body::empty()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "storage backend unavailable: pool closed");
}

#[tokio::test]
async fn stalled_storage_hits_the_deadline() {
    let state = AppState::new(Arc::new(StalledStorage), BASE_URL)
        .with_storage_timeout(Duration::from_millis(20));
    let app = App::router(state);

    let (status, body) = send(&app, Method::GET, "/abc", Body::empty()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "storage operation timed out: no response within 20ms");

    let (status, _) = send(&app, Method::POST, "/", "http://test.com").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn health_check() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/health", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"ok"}"#);
}
