//! Data models for the token and resource service.
//!
//! Request bodies are serialized exactly as the service expects them
//! (mixed snake/camel case is the service's, not ours). Every type that
//! carries a bearer token prints `[REDACTED]` in its `Debug` output.

mod runtime_info;

pub use runtime_info::{AddonRuntimeInfo, AddonToken, HostSurface, InactiveMode};

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Tokens
// =============================================================================

/// OAuth-style token payload as returned by the service.
///
/// Fields other than the three known ones are preserved so the session token
/// handed to the add-on is exactly what the service issued.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// The bearer token.
    pub access_token: String,

    /// Token type, usually `Bearer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Lifetime in seconds from issuance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,

    /// Any additional fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl TokenInfo {
    /// Token with only an access token set.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: Some("Bearer".to_string()),
            expires_in: None,
            extra: serde_json::Map::new(),
        }
    }
}

impl fmt::Debug for TokenInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenInfo")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("extra_fields", &self.extra.len())
            .finish()
    }
}

/// Bearer token scoped to a tenant, obtained through the client-credentials
/// exchange. Authorizes resource creation and session token requests.
#[derive(Debug, Clone, PartialEq)]
pub struct TenantToken(TokenInfo);

impl TenantToken {
    /// Wrap a token issued by the client-credentials exchange.
    pub fn new(info: TokenInfo) -> Self {
        Self(info)
    }

    /// The bearer value.
    pub fn access_token(&self) -> &str {
        &self.0.access_token
    }
}

// =============================================================================
// Resources
// =============================================================================

/// Selects which resource a session token is scoped to.
///
/// The wire form (store value, URL segment and JSON) is the numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ResourceKind {
    /// A direct meeting session. This is "addon mode".
    #[default]
    Meeting,
    /// A scheduling event originating from a meeting.
    Event,
}

impl ResourceKind {
    /// Numeric code used on the wire.
    pub fn code(self) -> u8 {
        match self {
            ResourceKind::Meeting => 1,
            ResourceKind::Event => 2,
        }
    }

    /// Parse a store selector value (`"1"` or `"2"`).
    pub fn parse_selector(value: &str) -> Option<Self> {
        value
            .trim()
            .parse::<u8>()
            .ok()
            .and_then(|code| Self::try_from(code).ok())
    }

    /// Whether this kind runs the simulated host initialization.
    pub fn is_addon_mode(self) -> bool {
        matches!(self, ResourceKind::Meeting)
    }
}

impl From<ResourceKind> for u8 {
    fn from(kind: ResourceKind) -> Self {
        kind.code()
    }
}

impl TryFrom<u8> for ResourceKind {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ResourceKind::Meeting),
            2 => Ok(ResourceKind::Event),
            other => Err(format!("unknown resource type {other}")),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Meeting returned by `POST /meetings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    /// Meeting code; also the resource id for meeting sessions.
    #[serde(default)]
    pub code: String,
}

/// Scheduling event returned by `POST /events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event code; the resource id for event sessions.
    #[serde(default)]
    pub code: String,
}

/// Session token together with the resource it is scoped to.
///
/// This is the value the deferred handle resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokenInfo {
    /// Session-scoped token.
    pub token: TokenInfo,

    /// Kind of resource the token is scoped to.
    pub resource_type: ResourceKind,

    /// Meeting code or event code.
    pub resource_id: String,
}

// =============================================================================
// Request bodies
// =============================================================================

/// Client-credentials token request (`POST /token`).
#[derive(Clone, Serialize)]
pub struct TokenRequest {
    pub grant_type: String,
    pub client_key: String,
    pub client_secret: String,
}

impl TokenRequest {
    /// Create a client credentials token request.
    pub fn client_credentials(
        client_key: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            grant_type: "client_credentials".to_string(),
            client_key: client_key.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRequest")
            .field("grant_type", &self.grant_type)
            .field("client_key", &self.client_key)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Add-on reference inside a meeting creation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddonReference {
    pub identifier: String,
}

/// Meeting creation request (`POST /meetings`).
///
/// `code` is omitted from the JSON entirely when no meeting is cached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetingRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub addons_info: Vec<AddonReference>,
}

impl CreateMeetingRequest {
    /// Request for a meeting hosting one add-on, optionally reusing a code.
    pub fn for_addon(addon_identifier: &str, existing_code: Option<&str>) -> Self {
        Self {
            code: existing_code.map(str::to_string),
            addons_info: vec![AddonReference {
                identifier: addon_identifier.to_string(),
            }],
        }
    }
}

/// Participant in the fixed event fixture.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventParticipant {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub order: u32,
    pub timezone: String,
}

/// Event creation request (`POST /events`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub notify_participants: bool,
    pub title: String,
    pub description: String,
    pub resolution_mode: String,
    pub origin_id: String,
    pub participants: Vec<EventParticipant>,
}

impl CreateEventRequest {
    /// The deterministic local-testing event: one proposer and one selector,
    /// originating from the given meeting.
    pub fn fixture(meeting_code: &str) -> Self {
        Self {
            notify_participants: false,
            title: format!("Test event for meet:{meeting_code}"),
            description: "Description of the test event".to_string(),
            resolution_mode: "fifo".to_string(),
            origin_id: meeting_code.to_string(),
            participants: vec![
                EventParticipant {
                    email: "test-proposer@meet.rs".to_string(),
                    first_name: "Test".to_string(),
                    last_name: "Proposer".to_string(),
                    role: "PowerUser".to_string(),
                    order: 0,
                    timezone: "America/Los_Angeles".to_string(),
                },
                EventParticipant {
                    email: "test-selector@meet.rs".to_string(),
                    first_name: "Test".to_string(),
                    last_name: "Selector".to_string(),
                    role: "User".to_string(),
                    order: 1,
                    timezone: "Europe/Belgrade".to_string(),
                },
            ],
        }
    }
}
