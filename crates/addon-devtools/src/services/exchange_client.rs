//! Credential exchange client for the token and resource service.
//!
//! One method per logical request, one HTTP call per method. The client owns
//! nothing but the base URL and a reusable `reqwest::Client`.
//!
//! # Failure mapping
//!
//! - Tenant token exchange answered with a non-2xx status: `Auth`
//! - Any other non-2xx status, connection failure or unparsable body: `Transport`
//!
//! Nothing is retried and no timeout is applied here; the first failure is
//! returned to the caller. Error bodies are sanitized before they are put into
//! an error message, so a token echoed back by the service never reaches logs.

use crate::errors::DevToolsError;
use crate::models::{
    AddonRuntimeInfo, CreateEventRequest, CreateMeetingRequest, Event, Meeting, ResourceKind,
    SessionTokenInfo, TenantToken, TokenInfo, TokenRequest,
};
use async_trait::async_trait;
use common::secret::{ExposeSecret, SecretString};
use regex::Regex;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::sync::LazyLock;
use tracing::{debug, instrument, trace, warn};

/// Maximum length for error body in error messages.
const MAX_ERROR_BODY_LEN: usize = 256;

/// Regex pattern for JWT tokens (header.payload.signature).
static JWT_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"eyJ[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]*)?").ok()
});

/// Regex pattern for Bearer tokens in text.
static BEARER_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)bearer\s+[A-Za-z0-9._~+/=-]+").ok());

/// Sanitize an error response body.
///
/// Bearer values are replaced first so `Bearer <JWT>` is redacted as a whole,
/// then standalone JWTs, then the result is truncated on a char boundary.
pub(crate) fn sanitize_error_body(body: &str) -> String {
    let mut sanitized = body.to_string();
    if let Some(pattern) = BEARER_PATTERN.as_ref() {
        sanitized = pattern
            .replace_all(&sanitized, "[BEARER_REDACTED]")
            .into_owned();
    }
    if let Some(pattern) = JWT_PATTERN.as_ref() {
        sanitized = pattern.replace_all(&sanitized, "[JWT_REDACTED]").into_owned();
    }

    if sanitized.len() <= MAX_ERROR_BODY_LEN {
        return sanitized;
    }

    let mut end = MAX_ERROR_BODY_LEN;
    while !sanitized.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", sanitized.get(..end).unwrap_or_default())
}

/// Operations against the token and resource service.
///
/// Implemented over HTTP by [`HttpExchangeClient`] and by
/// [`MockResourceService`](super::mock::MockResourceService) in tests.
#[async_trait]
pub trait ResourceService: Send + Sync {
    /// Exchange tenant client credentials for a tenant token.
    async fn request_tenant_token(
        &self,
        key: &str,
        secret: &SecretString,
    ) -> Result<TenantToken, DevToolsError>;

    /// Create a meeting hosting the add-on. A supplied `existing_code` asks the
    /// service to reuse that meeting.
    async fn create_meeting(
        &self,
        addon_identifier: &str,
        tenant_token: &TenantToken,
        existing_code: Option<&str>,
    ) -> Result<Meeting, DevToolsError>;

    /// Create the fixture scheduling event originating from `meeting_code`.
    async fn create_event(
        &self,
        meeting_code: &str,
        tenant_token: &TenantToken,
    ) -> Result<Event, DevToolsError>;

    /// Request a token scoped to one meeting or event.
    async fn request_session_token(
        &self,
        tenant_token: &TenantToken,
        resource_id: &str,
        resource_kind: ResourceKind,
    ) -> Result<SessionTokenInfo, DevToolsError>;

    /// Fetch the add-on runtime descriptor using a session token.
    async fn request_runtime_info(
        &self,
        session_token: &str,
        addon_identifier: &str,
    ) -> Result<AddonRuntimeInfo, DevToolsError>;
}

/// HTTP implementation of [`ResourceService`].
#[derive(Debug, Clone)]
pub struct HttpExchangeClient {
    client: Client,
    base_url: Url,
}

impl HttpExchangeClient {
    /// Create a client for the service rooted at `host`
    /// (e.g. `https://api.example/v1`).
    ///
    /// # Errors
    ///
    /// Returns `DevToolsError::Configuration` if `host` is not an absolute
    /// http(s) URL or the HTTP client cannot be built.
    pub fn new(host: &str) -> Result<Self, DevToolsError> {
        let base_url = Url::parse(host).map_err(|e| {
            DevToolsError::Configuration(format!("'host' is not a valid URL ({host}): {e}"))
        })?;

        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(DevToolsError::Configuration(format!(
                "'host' must be an http(s) URL, got '{host}'"
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("addon-devtools/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                DevToolsError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, base_url })
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, DevToolsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                DevToolsError::Configuration(format!(
                    "'host' cannot be used as a base URL: {}",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        operation: &'static str,
    ) -> Result<Response, DevToolsError> {
        request.send().await.map_err(|e| {
            warn!(target: "devtools.services.exchange_client", operation, error = %e, "HTTP request failed");
            DevToolsError::Transport(format!("{operation} failed: {e}"))
        })
    }

    /// Parse a successful response, or turn a non-2xx one into `Transport`.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: Response,
        operation: &'static str,
    ) -> Result<T, DevToolsError> {
        let status = response.status();

        if status.is_success() {
            return response.json::<T>().await.map_err(|e| {
                warn!(target: "devtools.services.exchange_client", operation, error = %e, "Failed to parse response");
                DevToolsError::Transport(format!("{operation} returned an unparsable body: {e}"))
            });
        }

        let body = response.text().await.unwrap_or_default();
        warn!(
            target: "devtools.services.exchange_client",
            operation,
            status = %status,
            "Service returned an error status"
        );
        Err(DevToolsError::Transport(format!(
            "{operation} returned status {}: {}",
            status.as_u16(),
            sanitize_error_body(&body)
        )))
    }
}

#[async_trait]
impl ResourceService for HttpExchangeClient {
    #[instrument(skip_all, fields(client_key = %key))]
    async fn request_tenant_token(
        &self,
        key: &str,
        secret: &SecretString,
    ) -> Result<TenantToken, DevToolsError> {
        let url = self.endpoint(&["token"])?;
        debug!(target: "devtools.services.exchange_client", url = %url, "Requesting tenant token");

        let body = TokenRequest::client_credentials(key, secret.expose_secret());
        let response = self
            .send(self.client.post(url).json(&body), "POST /token")
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Body is logged at trace level only; it may echo credentials.
            let body = response.text().await.unwrap_or_default();
            warn!(
                target: "devtools.services.exchange_client",
                status = %status,
                "Tenant credentials rejected"
            );
            trace!(target: "devtools.services.exchange_client", body = %body, "Rejection response body");
            return Err(DevToolsError::Auth(format!(
                "Invalid credentials: '{}' and '{}' were rejected with status {}",
                crate::config::KEY_CLIENT_KEY,
                crate::config::KEY_CLIENT_SECRET,
                status.as_u16()
            )));
        }

        let info: TokenInfo = response.json().await.map_err(|e| {
            warn!(target: "devtools.services.exchange_client", error = %e, "Failed to parse token response");
            DevToolsError::Transport(format!("POST /token returned an unparsable body: {e}"))
        })?;

        debug!(
            target: "devtools.services.exchange_client",
            expires_in_secs = ?info.expires_in,
            "Tenant token acquired"
        );
        Ok(TenantToken::new(info))
    }

    #[instrument(skip_all, fields(addon_identifier = %addon_identifier, reuse = existing_code.is_some()))]
    async fn create_meeting(
        &self,
        addon_identifier: &str,
        tenant_token: &TenantToken,
        existing_code: Option<&str>,
    ) -> Result<Meeting, DevToolsError> {
        let url = self.endpoint(&["meetings"])?;
        let body = CreateMeetingRequest::for_addon(addon_identifier, existing_code);
        debug!(target: "devtools.services.exchange_client", url = %url, code = ?existing_code, "Creating meeting");

        let response = self
            .send(
                self.client
                    .post(url)
                    .bearer_auth(tenant_token.access_token())
                    .json(&body),
                "POST /meetings",
            )
            .await?;

        self.handle_response(response, "POST /meetings").await
    }

    #[instrument(skip_all, fields(meeting_code = %meeting_code))]
    async fn create_event(
        &self,
        meeting_code: &str,
        tenant_token: &TenantToken,
    ) -> Result<Event, DevToolsError> {
        let url = self.endpoint(&["events"])?;
        let body = CreateEventRequest::fixture(meeting_code);
        debug!(target: "devtools.services.exchange_client", url = %url, "Creating event");

        let response = self
            .send(
                self.client
                    .post(url)
                    .bearer_auth(tenant_token.access_token())
                    .json(&body),
                "POST /events",
            )
            .await?;

        self.handle_response(response, "POST /events").await
    }

    #[instrument(skip_all, fields(resource_id = %resource_id, resource_type = %resource_kind))]
    async fn request_session_token(
        &self,
        tenant_token: &TenantToken,
        resource_id: &str,
        resource_kind: ResourceKind,
    ) -> Result<SessionTokenInfo, DevToolsError> {
        let kind = resource_kind.to_string();
        let url = self.endpoint(&["token", "session", resource_id, &kind])?;
        debug!(target: "devtools.services.exchange_client", url = %url, "Requesting session token");

        let response = self
            .send(
                self.client
                    .get(url)
                    .bearer_auth(tenant_token.access_token()),
                "GET /token/session",
            )
            .await?;

        let token: TokenInfo = self
            .handle_response(response, "GET /token/session")
            .await?;

        Ok(SessionTokenInfo {
            token,
            resource_type: resource_kind,
            resource_id: resource_id.to_string(),
        })
    }

    #[instrument(skip_all, fields(addon_identifier = %addon_identifier))]
    async fn request_runtime_info(
        &self,
        session_token: &str,
        addon_identifier: &str,
    ) -> Result<AddonRuntimeInfo, DevToolsError> {
        let url = self.endpoint(&["meetingAddons", addon_identifier])?;
        debug!(target: "devtools.services.exchange_client", url = %url, "Requesting add-on runtime info");

        let response = self
            .send(
                self.client.get(url).bearer_auth(session_token),
                "GET /meetingAddons",
            )
            .await?;

        self.handle_response(response, "GET /meetingAddons").await
    }
}
