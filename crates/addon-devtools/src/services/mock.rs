//! In-process mock of the token and resource service.
//!
//! Records every call in order so tests can assert on the exchange sequence
//! without an HTTP server.

use super::exchange_client::ResourceService;
use crate::errors::DevToolsError;
use crate::models::{
    AddonRuntimeInfo, AddonToken, Event, HostSurface, InactiveMode, Meeting, ResourceKind,
    SessionTokenInfo, TenantToken, TokenInfo,
};
use async_trait::async_trait;
use common::secret::SecretString;
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// One exchange step of the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockStep {
    TenantToken,
    CreateMeeting,
    CreateEvent,
    SessionToken,
    RuntimeInfo,
}

/// A call as the mock received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    TenantToken {
        key: String,
    },
    CreateMeeting {
        addon_identifier: String,
        existing_code: Option<String>,
    },
    CreateEvent {
        meeting_code: String,
    },
    SessionToken {
        resource_id: String,
        resource_kind: ResourceKind,
    },
    RuntimeInfo {
        session_token: String,
        addon_identifier: String,
    },
}

impl RecordedCall {
    /// Which step this call belongs to.
    pub fn step(&self) -> MockStep {
        match self {
            RecordedCall::TenantToken { .. } => MockStep::TenantToken,
            RecordedCall::CreateMeeting { .. } => MockStep::CreateMeeting,
            RecordedCall::CreateEvent { .. } => MockStep::CreateEvent,
            RecordedCall::SessionToken { .. } => MockStep::SessionToken,
            RecordedCall::RuntimeInfo { .. } => MockStep::RuntimeInfo,
        }
    }
}

/// Mock resource service for unit testing.
///
/// Meeting creation echoes a supplied code (the service reusing the meeting)
/// and otherwise returns the configured fresh code.
pub struct MockResourceService {
    meeting_code: String,
    event_code: String,
    reject_credentials: bool,
    fail_at: Option<MockStep>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl Default for MockResourceService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResourceService {
    /// Tenant token issued by the mock.
    pub const TENANT_TOKEN: &'static str = "mock-tenant-token";

    /// Session token issued by the mock.
    pub const SESSION_TOKEN: &'static str = "mock-session-token";

    /// Create a mock that accepts everything.
    pub fn new() -> Self {
        Self {
            meeting_code: "mock-meeting".to_string(),
            event_code: "mock-event".to_string(),
            reject_credentials: false,
            fail_at: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Code returned for newly created meetings.
    pub fn with_meeting_code(mut self, code: impl Into<String>) -> Self {
        self.meeting_code = code.into();
        self
    }

    /// Code returned for created events.
    pub fn with_event_code(mut self, code: impl Into<String>) -> Self {
        self.event_code = code.into();
        self
    }

    /// Reject the tenant credential exchange with `Auth`.
    pub fn rejecting_credentials(mut self) -> Self {
        self.reject_credentials = true;
        self
    }

    /// Fail the given step with `Transport`.
    pub fn failing_at(mut self, step: MockStep) -> Self {
        self.fail_at = Some(step);
        self
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Steps received so far, in order.
    pub fn steps(&self) -> Vec<MockStep> {
        self.calls().iter().map(RecordedCall::step).collect()
    }

    fn record(&self, call: RecordedCall) -> Result<(), DevToolsError> {
        let step = call.step();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        if self.fail_at == Some(step) {
            return Err(DevToolsError::Transport(format!(
                "mock failure at {step:?}"
            )));
        }
        Ok(())
    }
}

/// Runtime descriptor returned by the mock for `addon_identifier`.
pub fn sample_runtime_info(addon_identifier: &str) -> AddonRuntimeInfo {
    AddonRuntimeInfo {
        identifier: addon_identifier.to_string(),
        title: "Sample Add-on".to_string(),
        description: "Add-on under local development".to_string(),
        category: "productivity".to_string(),
        icon: "extension".to_string(),
        icon_dark: None,
        host: HostSurface::Canvas,
        inactive_mode: InactiveMode::Hidden,
        preloaded: false,
        session_id: "session-1".to_string(),
        session_user_id: "session-user-1".to_string(),
        session_user_role: "Host".to_string(),
        tenant: "tenant-1".to_string(),
        settings: BTreeMap::from([("mode".to_string(), "dev".to_string())]),
        token: AddonToken(serde_json::json!({ "access_token": "mock-addon-token" })),
        is_guest_user: false,
    }
}

#[async_trait]
impl ResourceService for MockResourceService {
    async fn request_tenant_token(
        &self,
        key: &str,
        _secret: &SecretString,
    ) -> Result<TenantToken, DevToolsError> {
        self.record(RecordedCall::TenantToken {
            key: key.to_string(),
        })?;

        if self.reject_credentials {
            return Err(DevToolsError::Auth("mock rejected credentials".to_string()));
        }
        Ok(TenantToken::new(TokenInfo::bearer(Self::TENANT_TOKEN)))
    }

    async fn create_meeting(
        &self,
        addon_identifier: &str,
        _tenant_token: &TenantToken,
        existing_code: Option<&str>,
    ) -> Result<Meeting, DevToolsError> {
        self.record(RecordedCall::CreateMeeting {
            addon_identifier: addon_identifier.to_string(),
            existing_code: existing_code.map(str::to_string),
        })?;

        Ok(Meeting {
            code: existing_code.unwrap_or(self.meeting_code.as_str()).to_string(),
        })
    }

    async fn create_event(
        &self,
        meeting_code: &str,
        _tenant_token: &TenantToken,
    ) -> Result<Event, DevToolsError> {
        self.record(RecordedCall::CreateEvent {
            meeting_code: meeting_code.to_string(),
        })?;

        Ok(Event {
            code: self.event_code.clone(),
        })
    }

    async fn request_session_token(
        &self,
        _tenant_token: &TenantToken,
        resource_id: &str,
        resource_kind: ResourceKind,
    ) -> Result<SessionTokenInfo, DevToolsError> {
        self.record(RecordedCall::SessionToken {
            resource_id: resource_id.to_string(),
            resource_kind,
        })?;

        Ok(SessionTokenInfo {
            token: TokenInfo::bearer(Self::SESSION_TOKEN),
            resource_type: resource_kind,
            resource_id: resource_id.to_string(),
        })
    }

    async fn request_runtime_info(
        &self,
        session_token: &str,
        addon_identifier: &str,
    ) -> Result<AddonRuntimeInfo, DevToolsError> {
        self.record(RecordedCall::RuntimeInfo {
            session_token: session_token.to_string(),
            addon_identifier: addon_identifier.to_string(),
        })?;

        Ok(sample_runtime_info(addon_identifier))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_echoes_existing_code() {
        let mock = MockResourceService::new().with_meeting_code("fresh");
        let tenant = TenantToken::new(TokenInfo::bearer("t"));

        let reused = mock.create_meeting("a", &tenant, Some("cached")).await.unwrap();
        let fresh = mock.create_meeting("a", &tenant, None).await.unwrap();

        assert_eq!(reused.code, "cached");
        assert_eq!(fresh.code, "fresh");
        assert_eq!(mock.steps(), vec![MockStep::CreateMeeting, MockStep::CreateMeeting]);
    }

    #[tokio::test]
    async fn test_mock_failing_at_records_call() {
        let mock = MockResourceService::new().failing_at(MockStep::CreateEvent);
        let tenant = TenantToken::new(TokenInfo::bearer("t"));

        let result = mock.create_event("m", &tenant).await;

        assert!(matches!(result, Err(DevToolsError::Transport(_))));
        assert_eq!(mock.calls().len(), 1);
    }
}
