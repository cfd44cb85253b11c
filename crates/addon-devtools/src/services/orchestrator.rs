//! Token orchestration.
//!
//! Sequences exchange-client calls into the three operations a bootstrap run
//! needs: tenant token, session token and runtime info. Every step consumes the
//! previous step's output, so calls are strictly sequential and the first
//! failure aborts the chain.
//!
//! Session token chain:
//!
//! ```text
//! load cached code -> create/reuse meeting -> persist code
//!     -> [event kind: create event from meeting]
//!     -> session token for (resource id, kind)
//! ```
//!
//! The meeting is created on every run; when a code is cached it is passed
//! along and the service decides whether that means reuse.

use super::exchange_client::ResourceService;
use crate::config::{DevToolsConfig, KEY_MEETING_CODE};
use crate::errors::DevToolsError;
use crate::models::{AddonRuntimeInfo, Meeting, ResourceKind, SessionTokenInfo, TenantToken};
use common::store::ConfigStore;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Drives the exchange chain for one bootstrap run.
pub struct TokenOrchestrator {
    client: Arc<dyn ResourceService>,
    store: Arc<dyn ConfigStore>,
    config: DevToolsConfig,
}

impl TokenOrchestrator {
    /// Create an orchestrator over a client, the store holding the meeting
    /// cache, and already-validated configuration.
    pub fn new(
        client: Arc<dyn ResourceService>,
        store: Arc<dyn ConfigStore>,
        config: DevToolsConfig,
    ) -> Self {
        Self {
            client,
            store,
            config,
        }
    }

    /// Exchange the configured tenant credentials for a tenant token.
    ///
    /// # Errors
    ///
    /// `Auth` if the credentials are rejected, `Transport` on network or
    /// parse failures.
    #[instrument(skip_all)]
    pub async fn tenant_token(&self) -> Result<TenantToken, DevToolsError> {
        let credentials = &self.config.credentials;
        let token = self
            .client
            .request_tenant_token(&credentials.key, &credentials.secret)
            .await?;

        info!(target: "devtools.services.orchestrator", "Tenant token acquired");
        Ok(token)
    }

    /// Create (or reuse) the meeting, create the event for event sessions, and
    /// request a session token scoped to the resulting resource.
    ///
    /// # Errors
    ///
    /// `Dependency` if the service returns a meeting or event without a code,
    /// `Transport` on network or parse failures, `Configuration` if the
    /// meeting cache cannot be read or written.
    #[instrument(skip_all, fields(resource_type = %self.config.resource_kind))]
    pub async fn session_token(
        &self,
        tenant_token: &TenantToken,
    ) -> Result<SessionTokenInfo, DevToolsError> {
        let resource_kind = self.config.resource_kind;
        let cached_code = self.load_cached_resource()?;

        let meeting = self
            .client
            .create_meeting(
                &self.config.addon_identifier,
                tenant_token,
                cached_code.as_deref(),
            )
            .await?;

        if meeting.code.trim().is_empty() {
            return Err(DevToolsError::Dependency(
                "Meeting creation returned no meeting code".to_string(),
            ));
        }
        self.persist_created_resource(&meeting)?;

        info!(
            target: "devtools.services.orchestrator",
            meeting_code = %meeting.code,
            reused = cached_code.as_deref() == Some(meeting.code.as_str()),
            "Meeting ready"
        );

        let resource_id = match resource_kind {
            ResourceKind::Meeting => meeting.code,
            ResourceKind::Event => {
                let event = self
                    .client
                    .create_event(&meeting.code, tenant_token)
                    .await?;

                if event.code.trim().is_empty() {
                    return Err(DevToolsError::Dependency(format!(
                        "Event creation for meeting {} returned no event code",
                        meeting.code
                    )));
                }

                info!(
                    target: "devtools.services.orchestrator",
                    event_code = %event.code,
                    origin = %meeting.code,
                    "Event created"
                );
                event.code
            }
        };

        let session = self
            .client
            .request_session_token(tenant_token, &resource_id, resource_kind)
            .await?;

        info!(
            target: "devtools.services.orchestrator",
            resource_id = %session.resource_id,
            "Session token acquired"
        );
        Ok(session)
    }

    /// Fetch the add-on runtime descriptor for an acquired session.
    ///
    /// # Errors
    ///
    /// `Transport` on network or parse failures.
    #[instrument(skip_all)]
    pub async fn runtime_info(
        &self,
        session: &SessionTokenInfo,
    ) -> Result<AddonRuntimeInfo, DevToolsError> {
        let runtime_info = self
            .client
            .request_runtime_info(&session.token.access_token, &self.config.addon_identifier)
            .await?;

        info!(
            target: "devtools.services.orchestrator",
            session_id = %runtime_info.session_id,
            "Add-on runtime info acquired"
        );
        Ok(runtime_info)
    }

    /// Meeting code cached by a previous run, if any. Blank values count as absent.
    ///
    /// # Errors
    ///
    /// `Configuration` if the store cannot be read.
    pub fn load_cached_resource(&self) -> Result<Option<String>, DevToolsError> {
        let cached = self
            .store
            .get(KEY_MEETING_CODE)?
            .filter(|code| !code.trim().is_empty());

        debug!(
            target: "devtools.services.orchestrator",
            cached = ?cached,
            "Loaded cached meeting code"
        );
        Ok(cached)
    }

    /// Cache the meeting code so the next run reuses the meeting.
    ///
    /// The write is committed immediately and survives a later failure in the
    /// same run.
    ///
    /// # Errors
    ///
    /// `Configuration` if the store cannot be written.
    pub fn persist_created_resource(&self, meeting: &Meeting) -> Result<(), DevToolsError> {
        self.store.set(KEY_MEETING_CODE, &meeting.code)?;
        debug!(
            target: "devtools.services.orchestrator",
            meeting_code = %meeting.code,
            "Cached meeting code"
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{
        KEY_ADDON_ID, KEY_CLIENT_KEY, KEY_CLIENT_SECRET, KEY_HOST, KEY_RESOURCE_TYPE,
    };
    use crate::services::mock::{MockResourceService, MockStep, RecordedCall};
    use common::store::MemoryStore;

    fn store_with_type(resource_type: &str) -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_entries([
            (KEY_HOST, "https://api.example/v1"),
            (KEY_ADDON_ID, "addon-1"),
            (KEY_CLIENT_KEY, "k"),
            (KEY_CLIENT_SECRET, "s"),
            (KEY_RESOURCE_TYPE, resource_type),
        ]))
    }

    fn orchestrator(
        mock: Arc<MockResourceService>,
        store: Arc<MemoryStore>,
    ) -> TokenOrchestrator {
        let config = DevToolsConfig::from_store(store.as_ref()).unwrap();
        TokenOrchestrator::new(mock, store, config)
    }

    async fn run_chain(orchestrator: &TokenOrchestrator) -> Result<SessionTokenInfo, DevToolsError> {
        let tenant = orchestrator.tenant_token().await?;
        orchestrator.session_token(&tenant).await
    }

    #[tokio::test]
    async fn test_meeting_kind_uses_meeting_code() {
        let mock = Arc::new(MockResourceService::new().with_meeting_code("m-100"));
        let store = store_with_type("1");
        let orchestrator = orchestrator(mock.clone(), store.clone());

        let session = run_chain(&orchestrator).await.unwrap();

        assert_eq!(session.resource_id, "m-100");
        assert_eq!(session.resource_type, ResourceKind::Meeting);
        assert_eq!(
            mock.steps(),
            vec![
                MockStep::TenantToken,
                MockStep::CreateMeeting,
                MockStep::SessionToken
            ]
        );
    }

    #[tokio::test]
    async fn test_event_kind_creates_event_from_meeting() {
        let mock = Arc::new(
            MockResourceService::new()
                .with_meeting_code("m-200")
                .with_event_code("e-300"),
        );
        let store = store_with_type("2");
        let orchestrator = orchestrator(mock.clone(), store);

        let session = run_chain(&orchestrator).await.unwrap();

        assert_eq!(session.resource_id, "e-300");
        assert_eq!(session.resource_type, ResourceKind::Event);

        let calls = mock.calls();
        assert_eq!(
            calls.get(2),
            Some(&RecordedCall::CreateEvent {
                meeting_code: "m-200".to_string()
            })
        );
        assert_eq!(
            calls.get(3),
            Some(&RecordedCall::SessionToken {
                resource_id: "e-300".to_string(),
                resource_kind: ResourceKind::Event
            })
        );
    }

    #[tokio::test]
    async fn test_no_cached_code_sends_none() {
        let mock = Arc::new(MockResourceService::new());
        let orchestrator = orchestrator(mock.clone(), store_with_type("1"));

        run_chain(&orchestrator).await.unwrap();

        assert_eq!(
            mock.calls().get(1),
            Some(&RecordedCall::CreateMeeting {
                addon_identifier: "addon-1".to_string(),
                existing_code: None
            })
        );
    }

    #[tokio::test]
    async fn test_cached_code_is_passed_to_meeting_creation() {
        let mock = Arc::new(MockResourceService::new());
        let store = store_with_type("1");
        store.set(KEY_MEETING_CODE, "cached-1").unwrap();
        let orchestrator = orchestrator(mock.clone(), store);

        let session = run_chain(&orchestrator).await.unwrap();

        assert_eq!(session.resource_id, "cached-1");
        assert_eq!(
            mock.calls().get(1),
            Some(&RecordedCall::CreateMeeting {
                addon_identifier: "addon-1".to_string(),
                existing_code: Some("cached-1".to_string())
            })
        );
    }

    #[tokio::test]
    async fn test_second_run_reuses_first_runs_code() {
        let store = store_with_type("1");

        let first = Arc::new(MockResourceService::new().with_meeting_code("first-code"));
        run_chain(&orchestrator(first, store.clone())).await.unwrap();
        assert_eq!(
            store.get(KEY_MEETING_CODE).unwrap().as_deref(),
            Some("first-code")
        );

        let second = Arc::new(MockResourceService::new().with_meeting_code("other-code"));
        run_chain(&orchestrator(second.clone(), store)).await.unwrap();

        assert!(second.calls().contains(&RecordedCall::CreateMeeting {
            addon_identifier: "addon-1".to_string(),
            existing_code: Some("first-code".to_string())
        }));
    }

    #[tokio::test]
    async fn test_blank_cached_code_is_ignored() {
        let store = store_with_type("1");
        store.set(KEY_MEETING_CODE, "  ").unwrap();
        let orchestrator = orchestrator(Arc::new(MockResourceService::new()), store);

        assert_eq!(orchestrator.load_cached_resource().unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_meeting_code_is_dependency_error() {
        let mock = Arc::new(MockResourceService::new().with_meeting_code(""));
        let store = store_with_type("2");
        let orchestrator = orchestrator(mock.clone(), store.clone());

        let err = run_chain(&orchestrator).await.unwrap_err();

        assert!(matches!(err, DevToolsError::Dependency(_)));
        assert!(!mock.steps().contains(&MockStep::CreateEvent));
        assert!(!mock.steps().contains(&MockStep::SessionToken));
        assert_eq!(store.get(KEY_MEETING_CODE).unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_event_code_is_dependency_error() {
        let mock = Arc::new(MockResourceService::new().with_event_code(""));
        let orchestrator = orchestrator(mock.clone(), store_with_type("2"));

        let err = run_chain(&orchestrator).await.unwrap_err();

        assert!(matches!(err, DevToolsError::Dependency(_)));
        assert!(!mock.steps().contains(&MockStep::SessionToken));
    }

    #[tokio::test]
    async fn test_rejected_credentials_stop_the_chain() {
        let mock = Arc::new(MockResourceService::new().rejecting_credentials());
        let orchestrator = orchestrator(mock.clone(), store_with_type("1"));

        let err = run_chain(&orchestrator).await.unwrap_err();

        assert!(matches!(err, DevToolsError::Auth(_)));
        assert_eq!(mock.steps(), vec![MockStep::TenantToken]);
    }

    #[tokio::test]
    async fn test_meeting_code_stays_cached_when_later_step_fails() {
        let mock = Arc::new(
            MockResourceService::new()
                .with_meeting_code("kept")
                .failing_at(MockStep::SessionToken),
        );
        let store = store_with_type("1");
        let orchestrator = orchestrator(mock, store.clone());

        let err = run_chain(&orchestrator).await.unwrap_err();

        assert!(matches!(err, DevToolsError::Transport(_)));
        assert_eq!(store.get(KEY_MEETING_CODE).unwrap().as_deref(), Some("kept"));
    }

    #[tokio::test]
    async fn test_runtime_info_uses_session_token() {
        let mock = Arc::new(MockResourceService::new());
        let orchestrator = orchestrator(mock.clone(), store_with_type("1"));

        let session = run_chain(&orchestrator).await.unwrap();
        let info = orchestrator.runtime_info(&session).await.unwrap();

        assert_eq!(info.identifier, "addon-1");
        assert_eq!(
            mock.calls().last(),
            Some(&RecordedCall::RuntimeInfo {
                session_token: MockResourceService::SESSION_TOKEN.to_string(),
                addon_identifier: "addon-1".to_string()
            })
        );
    }
}
