//! HTTP routes for the handle server.

use crate::bootstrap::DevToolsNamespace;
use crate::handlers;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Namespace holding the deferred session-token handle.
    pub namespace: DevToolsNamespace,
}

/// Build the application routes.
///
/// - `/health` - liveness plus handle state
/// - `/devtools/session-token` - waits for and returns the session token
///
/// CORS is permissive since callers are add-on pages served from another
/// origin.
pub fn build_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/devtools/session-token", get(handlers::get_session_token))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::bootstrap::session_token_slot;
    use crate::models::{ResourceKind, SessionTokenInfo, TokenInfo};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app(namespace: DevToolsNamespace) -> Router {
        build_routes(Arc::new(AppState { namespace }))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[tokio::test]
    async fn test_session_token_route_returns_resolved_token() {
        let (resolver, handle) = session_token_slot();
        resolver.resolve(SessionTokenInfo {
            token: TokenInfo::bearer("session-token"),
            resource_type: ResourceKind::Meeting,
            resource_id: "m-1".to_string(),
        });

        let (status, body) = get_json(
            app(DevToolsNamespace::new(handle)),
            "/devtools/session-token",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resourceId"], "m-1");
        assert_eq!(body["resourceType"], 1);
        assert_eq!(body["token"]["access_token"], "session-token");
    }

    #[tokio::test]
    async fn test_session_token_route_503_when_abandoned() {
        let (resolver, handle) = session_token_slot();
        drop(resolver);

        let (status, body) = get_json(
            app(DevToolsNamespace::new(handle)),
            "/devtools/session-token",
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "DEPENDENCY_ERROR");
    }

    #[tokio::test]
    async fn test_health_reports_resolution() {
        let (resolver, handle) = session_token_slot();
        let namespace = DevToolsNamespace::new(handle);

        let (status, body) = get_json(app(namespace.clone()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "status": "ok", "resolved": false }));

        resolver.resolve(SessionTokenInfo {
            token: TokenInfo::bearer("t"),
            resource_type: ResourceKind::Meeting,
            resource_id: "m-2".to_string(),
        });

        let (_, body) = get_json(app(namespace), "/health").await;
        assert_eq!(body["resolved"], true);
    }
}
