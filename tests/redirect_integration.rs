//! Redirect integration tests
//!
//! These tests verify that redirects resolve stored mappings, record a visit
//! per redirect, and reject unknown codes.

use axum::{
    body::Body,
    extract::connect_info::MockConnectInfo,
    http::{header, Request, StatusCode},
    Router,
};
use hashlink::app::create_app;
use hashlink::config::{parse_trusted_proxies, Config, RedirectMode, TrustedProxyMode};
use hashlink::storage::{MemoryStorage, Storage, StorageError};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceExt;

const PEER: ([u8; 4], u16) = ([127, 0, 0, 1], 12345);

fn create_test_app(storage: Arc<dyn Storage>, config: Config) -> Router {
    create_app(storage, Arc::new(config)).layer(MockConnectInfo(SocketAddr::from(PEER)))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_redirect_known_code() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let mapping = storage.create("http://example.com").await.unwrap();

    let app = create_test_app(Arc::clone(&storage), Config::default());
    let response = app
        .oneshot(get(&format!("/{}", mapping.short_code)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "http://example.com"
    );

    let events = storage.get_analytics(&mapping.short_code).await.unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].ip_address, "127.0.0.1:12345");
}

#[tokio::test]
async fn test_shorten_then_redirect() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let app = create_test_app(storage, Config::default());

    let request = Request::builder()
        .method("POST")
        .uri("/shorten")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"original_url": "http://example.com"}"#))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let short_url = json["short_url"].as_str().unwrap();
    let path = short_url.strip_prefix("http://localhost:8080").unwrap();

    let response = app.oneshot(get(path)).await.unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "http://example.com"
    );
}

#[tokio::test]
async fn test_redirect_unknown_code() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let app = create_test_app(Arc::clone(&storage), Config::default());

    let response = app.oneshot(get("/deadbeef")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(header::LOCATION).is_none());

    // No analytics are created for a failed lookup
    assert!(matches!(
        storage.get_analytics("deadbeef").await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn test_redirect_configured_status() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let mapping = storage.create("https://example.com/temp").await.unwrap();

    for (mode, expected) in [
        (RedirectMode::Found, StatusCode::FOUND),
        (RedirectMode::TemporaryRedirect, StatusCode::TEMPORARY_REDIRECT),
        (RedirectMode::PermanentRedirect, StatusCode::PERMANENT_REDIRECT),
    ] {
        let config = Config {
            redirect_status: mode,
            ..Config::default()
        };
        let app = create_test_app(Arc::clone(&storage), config);

        let response = app
            .oneshot(get(&format!("/{}", mapping.short_code)))
            .await
            .unwrap();
        assert_eq!(response.status(), expected);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://example.com/temp"
        );
    }

    let events = storage.get_analytics(&mapping.short_code).await.unwrap();
    assert_eq!(events.len(), 3);
}

#[tokio::test]
async fn test_redirect_records_forwarded_client() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let mapping = storage.create("https://example.com/proxied").await.unwrap();

    let mut config = Config::default();
    config.analytics.trusted_proxy_mode = TrustedProxyMode::Standard;
    config.analytics.trusted_proxies = parse_trusted_proxies("127.0.0.0/8").unwrap();
    let app = create_test_app(Arc::clone(&storage), config);

    let request = Request::builder()
        .uri(format!("/{}", mapping.short_code))
        .header("x-forwarded-for", "203.0.113.9, 127.0.0.2")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);

    let events = storage.get_analytics(&mapping.short_code).await.unwrap();
    assert_eq!(events[0].ip_address, "203.0.113.9");
}

#[tokio::test]
async fn test_redirect_ignores_forwarded_headers_by_default() {
    let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
    let mapping = storage.create("https://example.com/direct").await.unwrap();
    let app = create_test_app(Arc::clone(&storage), Config::default());

    let request = Request::builder()
        .uri(format!("/{}", mapping.short_code))
        .header("x-forwarded-for", "203.0.113.9")
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap();

    let events = storage.get_analytics(&mapping.short_code).await.unwrap();
    assert_eq!(events[0].ip_address, "127.0.0.1:12345");
}
