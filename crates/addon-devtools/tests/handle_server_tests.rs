//! Handle server integration tests.
//!
//! Serves the deferred handle over HTTP while a bootstrap runs.

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use addon_devtools::bootstrap::{session_token_slot, SessionBootstrap};
use devtools_test_utils::fixtures::{self, SESSION_TOKEN};
use devtools_test_utils::{MockResourceBackend, TestHandleServer};
use std::time::Duration;

#[tokio::test]
async fn test_request_waits_for_bootstrap() {
    let backend = MockResourceBackend::start().await;
    backend.mount_happy_path("m-7", "e-7").await;
    let (resolver, handle) = session_token_slot();
    let server = TestHandleServer::spawn(handle).await.unwrap();

    let pending = tokio::spawn({
        let url = format!("{}/devtools/session-token", server.url());
        async move { reqwest::get(url).await }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!pending.is_finished());

    let health: serde_json::Value = reqwest::get(format!("{}/health", server.url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["resolved"], false);

    SessionBootstrap::new(fixtures::meeting_store(&backend.host()))
        .run(resolver)
        .await
        .unwrap();

    let response = pending.await.unwrap().unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["resourceId"], "m-7");
    assert_eq!(body["resourceType"], 1);
    assert_eq!(body["token"]["access_token"], SESSION_TOKEN);
}

#[tokio::test]
async fn test_failed_bootstrap_returns_503() {
    let backend = MockResourceBackend::start().await;
    backend.mount_tenant_token_rejected(403).await;
    let (resolver, handle) = session_token_slot();
    let server = TestHandleServer::spawn(handle).await.unwrap();

    let result = SessionBootstrap::new(fixtures::meeting_store(&backend.host()))
        .run(resolver)
        .await;
    assert!(result.is_err());

    let response = reqwest::get(format!("{}/devtools/session-token", server.url()))
        .await
        .unwrap();
    assert_eq!(response.status(), 503);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "DEPENDENCY_ERROR");
}

#[tokio::test]
async fn test_cors_allows_addon_origin() {
    let (_resolver, handle) = session_token_slot();
    let server = TestHandleServer::spawn(handle).await.unwrap();

    let response = reqwest::Client::new()
        .get(format!("{}/health", server.url()))
        .header("origin", "https://addon.localhost:3000")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
