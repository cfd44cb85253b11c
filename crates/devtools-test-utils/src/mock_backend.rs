//! Fake token and resource service.
//!
//! Wraps a wiremock `MockServer` and mounts the five endpoints the exchange
//! client talks to, rooted under `/v1` like the real service.

use crate::fixtures;
use wiremock::matchers::{body_partial_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Running fake backend.
pub struct MockResourceBackend {
    server: MockServer,
}

impl MockResourceBackend {
    /// Start a backend on a random local port. Nothing is mounted yet.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Value for the store's `host` key.
    pub fn host(&self) -> String {
        format!("{}/v1", self.server.uri())
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// `POST /v1/token` answers with the tenant token fixture.
    pub async fn mount_tenant_token(&self) {
        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .and(body_partial_json(serde_json::json!({
                "grant_type": "client_credentials",
                "client_key": fixtures::CLIENT_KEY
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::tenant_token_body()))
            .mount(&self.server)
            .await;
    }

    /// `POST /v1/token` rejects the credentials with `status`.
    pub async fn mount_tenant_token_rejected(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path("/v1/token"))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(serde_json::json!({ "error": "invalid_client" })),
            )
            .mount(&self.server)
            .await;
    }

    /// `POST /v1/meetings` echoes a supplied `code`, otherwise returns `fresh_code`.
    pub async fn mount_create_meeting(&self, fresh_code: &str) {
        let fresh_code = fresh_code.to_string();
        Mock::given(method("POST"))
            .and(path("/v1/meetings"))
            .and(header(
                "authorization",
                format!("Bearer {}", fixtures::TENANT_TOKEN).as_str(),
            ))
            .respond_with(move |request: &Request| {
                let body: serde_json::Value =
                    serde_json::from_slice(&request.body).unwrap_or_default();
                let code = body
                    .get("code")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or(&fresh_code)
                    .to_string();
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "code": code }))
            })
            .mount(&self.server)
            .await;
    }

    /// `POST /v1/events` returns `event_code`.
    pub async fn mount_create_event(&self, event_code: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/events"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "code": event_code })),
            )
            .mount(&self.server)
            .await;
    }

    /// `GET /v1/token/session/{id}/{type}` answers with the session token fixture.
    pub async fn mount_session_token(&self) {
        Mock::given(method("GET"))
            .and(path_regex(r"^/v1/token/session/[^/]+/[12]$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::session_token_body()))
            .mount(&self.server)
            .await;
    }

    /// `GET /v1/meetingAddons/{id}` answers with the runtime descriptor fixture.
    pub async fn mount_runtime_info(&self) {
        Mock::given(method("GET"))
            .and(path(format!("/v1/meetingAddons/{}", fixtures::ADDON_ID)))
            .and(header(
                "authorization",
                format!("Bearer {}", fixtures::SESSION_TOKEN).as_str(),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::runtime_info_body()))
            .mount(&self.server)
            .await;
    }

    /// Mount every endpoint for a successful run.
    pub async fn mount_happy_path(&self, meeting_code: &str, event_code: &str) {
        self.mount_tenant_token().await;
        self.mount_create_meeting(meeting_code).await;
        self.mount_create_event(event_code).await;
        self.mount_session_token().await;
        self.mount_runtime_info().await;
    }

    /// Every request received so far, in order.
    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// `METHOD /path` of every request received so far, in order.
    pub async fn request_lines(&self) -> Vec<String> {
        self.requests()
            .await
            .iter()
            .map(|r| format!("{} {}", r.method, r.url.path()))
            .collect()
    }

    /// JSON bodies of every request to `request_path`, in order.
    pub async fn bodies_for(&self, request_path: &str) -> Vec<serde_json::Value> {
        self.requests()
            .await
            .iter()
            .filter(|r| r.url.path() == request_path)
            .map(|r| serde_json::from_slice(&r.body).unwrap_or_default())
            .collect()
    }
}
