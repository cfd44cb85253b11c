//! Session bootstrap.
//!
//! The entry flow of a dev run:
//!
//! ```text
//! Start -> ConfigValidated -> TenantTokenAcquired -> SessionTokenAcquired
//!       -> [RuntimeInfoAcquired -> HostInitSent] -> Done
//! ```
//!
//! Configuration is validated before any network call. The deferred handle is
//! resolved as soon as the session token is acquired, so consumers are served
//! whether or not the host-init segment runs. That segment (in brackets) runs
//! only when a host SDK sink is present and the session is for a meeting.

pub mod host;
pub mod init_message;
pub mod token_handle;

pub use host::{HostSdk, JsonFileHost, JsonOutput, WebhookHost};
pub use init_message::InitMessage;
pub use token_handle::{
    session_token_slot, DevToolsNamespace, HandleError, SessionTokenHandle, SessionTokenResolver,
};

use crate::config::DevToolsConfig;
use crate::errors::DevToolsError;
use crate::models::SessionTokenInfo;
use crate::services::{HttpExchangeClient, ResourceService, TokenOrchestrator};
use common::store::ConfigStore;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Progress of a bootstrap run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStage {
    Start,
    ConfigValidated,
    TenantTokenAcquired,
    SessionTokenAcquired,
    RuntimeInfoAcquired,
    HostInitSent,
    Done,
}

impl fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BootstrapStage::Start => "start",
            BootstrapStage::ConfigValidated => "config_validated",
            BootstrapStage::TenantTokenAcquired => "tenant_token_acquired",
            BootstrapStage::SessionTokenAcquired => "session_token_acquired",
            BootstrapStage::RuntimeInfoAcquired => "runtime_info_acquired",
            BootstrapStage::HostInitSent => "host_init_sent",
            BootstrapStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct BootstrapOutcome {
    /// The session token the handle was resolved with.
    pub session: Arc<SessionTokenInfo>,

    /// Message delivered to the host SDK, if the host-init segment ran.
    pub init_message: Option<InitMessage>,

    /// Last stage reached. `Done` for every successful run.
    pub stage: BootstrapStage,

    /// Stages visited, in order.
    pub trail: Vec<BootstrapStage>,
}

/// Tracks and logs stage transitions.
#[derive(Debug)]
struct StageTracker {
    trail: Vec<BootstrapStage>,
}

impl StageTracker {
    fn new() -> Self {
        Self {
            trail: vec![BootstrapStage::Start],
        }
    }

    fn current(&self) -> BootstrapStage {
        self.trail.last().copied().unwrap_or(BootstrapStage::Start)
    }

    fn advance(&mut self, next: BootstrapStage) {
        info!(
            target: "devtools.bootstrap",
            from = %self.current(),
            to = %next,
            "Bootstrap stage"
        );
        self.trail.push(next);
    }
}

/// One bootstrap run against a configuration store.
pub struct SessionBootstrap {
    store: Arc<dyn ConfigStore>,
    client: Option<Arc<dyn ResourceService>>,
    host_sdk: Option<Arc<dyn HostSdk>>,
}

impl SessionBootstrap {
    /// Bootstrap reading configuration from `store`. The exchange client is
    /// built from the configured host unless one is injected.
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            client: None,
            host_sdk: None,
        }
    }

    /// Use `client` instead of an HTTP client built from the configured host.
    pub fn with_client(mut self, client: Arc<dyn ResourceService>) -> Self {
        self.client = Some(client);
        self
    }

    /// Deliver the init message to `host_sdk` in addon mode.
    pub fn with_host_sdk(mut self, host_sdk: Arc<dyn HostSdk>) -> Self {
        self.host_sdk = Some(host_sdk);
        self
    }

    /// Run the bootstrap, resolving `resolver` with the acquired session token.
    ///
    /// On failure the resolver is dropped unresolved and handle waiters get
    /// [`HandleError::Abandoned`].
    ///
    /// # Errors
    ///
    /// `Configuration` for missing or invalid store values (before any network
    /// call), otherwise whatever the failing exchange or host sink returned.
    #[instrument(skip_all)]
    pub async fn run(
        self,
        resolver: SessionTokenResolver,
    ) -> Result<BootstrapOutcome, DevToolsError> {
        let mut stages = StageTracker::new();

        match self.execute(resolver, &mut stages).await {
            Ok((session, init_message)) => {
                stages.advance(BootstrapStage::Done);
                Ok(BootstrapOutcome {
                    session,
                    init_message,
                    stage: stages.current(),
                    trail: stages.trail,
                })
            }
            Err(e) => {
                warn!(
                    target: "devtools.bootstrap",
                    stage = %stages.current(),
                    error = %e,
                    "Bootstrap failed"
                );
                Err(e)
            }
        }
    }

    async fn execute(
        self,
        resolver: SessionTokenResolver,
        stages: &mut StageTracker,
    ) -> Result<(Arc<SessionTokenInfo>, Option<InitMessage>), DevToolsError> {
        let config = DevToolsConfig::from_store(self.store.as_ref())?;
        let client: Arc<dyn ResourceService> = match self.client {
            Some(client) => client,
            None => Arc::new(HttpExchangeClient::new(&config.credentials.host)?),
        };
        stages.advance(BootstrapStage::ConfigValidated);

        let host = config.credentials.host.clone();
        let addon_identifier = config.addon_identifier.clone();
        let resource_kind = config.resource_kind;
        let orchestrator = TokenOrchestrator::new(client, self.store, config);

        let tenant_token = orchestrator.tenant_token().await?;
        stages.advance(BootstrapStage::TenantTokenAcquired);

        let session = orchestrator.session_token(&tenant_token).await?;
        let session = resolver.resolve(session);
        stages.advance(BootstrapStage::SessionTokenAcquired);

        let Some(host_sdk) = self.host_sdk else {
            info!(
                target: "devtools.bootstrap",
                "No host SDK attached, skipping host initialization"
            );
            return Ok((session, None));
        };

        if !resource_kind.is_addon_mode() {
            info!(
                target: "devtools.bootstrap",
                resource_type = %resource_kind,
                "Not in addon mode, skipping host initialization"
            );
            return Ok((session, None));
        }

        let runtime_info = orchestrator.runtime_info(&session).await?;
        stages.advance(BootstrapStage::RuntimeInfoAcquired);

        let message = InitMessage::from_runtime_info(&host, &addon_identifier, &runtime_info);
        host_sdk.on_init(&message).await?;
        stages.advance(BootstrapStage::HostInitSent);

        Ok((session, Some(message)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{
        KEY_ADDON_ID, KEY_CLIENT_KEY, KEY_CLIENT_SECRET, KEY_HOST, KEY_RESOURCE_TYPE,
    };
    use crate::services::mock::{MockResourceService, MockStep};
    use async_trait::async_trait;
    use common::store::MemoryStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingHost {
        messages: Mutex<Vec<InitMessage>>,
    }

    #[async_trait]
    impl HostSdk for RecordingHost {
        async fn on_init(&self, message: &InitMessage) -> Result<(), DevToolsError> {
            self.messages.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn store(resource_type: &str) -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_entries([
            (KEY_HOST, "https://api.example/v1"),
            (KEY_ADDON_ID, "addon-1"),
            (KEY_CLIENT_KEY, "k"),
            (KEY_CLIENT_SECRET, "s"),
            (KEY_RESOURCE_TYPE, resource_type),
        ]))
    }

    #[tokio::test]
    async fn test_addon_mode_sends_host_init() {
        let mock = Arc::new(MockResourceService::new().with_meeting_code("m-1"));
        let host = Arc::new(RecordingHost::default());
        let (resolver, handle) = session_token_slot();

        let outcome = SessionBootstrap::new(store("1"))
            .with_client(mock.clone())
            .with_host_sdk(host.clone())
            .run(resolver)
            .await
            .unwrap();

        assert_eq!(outcome.stage, BootstrapStage::Done);
        assert_eq!(
            outcome.trail,
            vec![
                BootstrapStage::Start,
                BootstrapStage::ConfigValidated,
                BootstrapStage::TenantTokenAcquired,
                BootstrapStage::SessionTokenAcquired,
                BootstrapStage::RuntimeInfoAcquired,
                BootstrapStage::HostInitSent,
                BootstrapStage::Done,
            ]
        );
        assert_eq!(mock.steps().last(), Some(&MockStep::RuntimeInfo));

        let messages = host.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        let sent = messages.first().unwrap();
        assert_eq!(sent.host.origin, "https://api.example");
        assert_eq!(Some(sent), outcome.init_message.as_ref());

        let resolved = handle.try_get().unwrap();
        assert_eq!(resolved.resource_id, "m-1");
    }

    #[tokio::test]
    async fn test_event_kind_skips_host_init() {
        let mock = Arc::new(MockResourceService::new().with_event_code("e-1"));
        let host = Arc::new(RecordingHost::default());
        let (resolver, handle) = session_token_slot();

        let outcome = SessionBootstrap::new(store("2"))
            .with_client(mock.clone())
            .with_host_sdk(host.clone())
            .run(resolver)
            .await
            .unwrap();

        assert!(outcome.init_message.is_none());
        assert!(host.messages.lock().unwrap().is_empty());
        assert!(!mock.steps().contains(&MockStep::RuntimeInfo));
        assert_eq!(handle.wait().await.unwrap().resource_id, "e-1");
    }

    #[tokio::test]
    async fn test_without_host_sdk_resolves_handle_only() {
        let mock = Arc::new(MockResourceService::new());
        let (resolver, handle) = session_token_slot();

        let outcome = SessionBootstrap::new(store("1"))
            .with_client(mock.clone())
            .run(resolver)
            .await
            .unwrap();

        assert!(outcome.init_message.is_none());
        assert_eq!(
            outcome.trail,
            vec![
                BootstrapStage::Start,
                BootstrapStage::ConfigValidated,
                BootstrapStage::TenantTokenAcquired,
                BootstrapStage::SessionTokenAcquired,
                BootstrapStage::Done,
            ]
        );
        assert!(handle.is_resolved());
    }

    #[tokio::test]
    async fn test_missing_addon_id_makes_no_calls() {
        let mock = Arc::new(MockResourceService::new());
        let store = Arc::new(MemoryStore::with_entries([(KEY_HOST, "https://api.example/v1")]));
        let (resolver, handle) = session_token_slot();

        let result = SessionBootstrap::new(store)
            .with_client(mock.clone())
            .run(resolver)
            .await;

        assert!(matches!(result, Err(DevToolsError::Configuration(_))));
        assert!(mock.calls().is_empty());
        assert_eq!(handle.wait().await.unwrap_err(), HandleError::Abandoned);
    }

    #[tokio::test]
    async fn test_missing_host_makes_no_calls() {
        let mock = Arc::new(MockResourceService::new());
        let store = Arc::new(MemoryStore::with_entries([
            (KEY_ADDON_ID, "addon-1"),
            (KEY_CLIENT_KEY, "k"),
            (KEY_CLIENT_SECRET, "s"),
        ]));
        let (resolver, handle) = session_token_slot();

        let result = SessionBootstrap::new(store)
            .with_client(mock.clone())
            .run(resolver)
            .await;

        assert!(
            matches!(result, Err(DevToolsError::Configuration(ref msg)) if msg.contains("'host'"))
        );
        assert!(mock.calls().is_empty());
        assert_eq!(handle.wait().await.unwrap_err(), HandleError::Abandoned);
    }

    #[tokio::test]
    async fn test_rejected_credentials_abandon_handle() {
        let mock = Arc::new(MockResourceService::new().rejecting_credentials());
        let (resolver, handle) = session_token_slot();

        let result = SessionBootstrap::new(store("1"))
            .with_client(mock)
            .run(resolver)
            .await;

        assert!(matches!(result, Err(DevToolsError::Auth(_))));
        assert_eq!(handle.wait().await.unwrap_err(), HandleError::Abandoned);
    }

    #[tokio::test]
    async fn test_host_init_failure_keeps_handle_resolved() {
        let mock = Arc::new(MockResourceService::new().failing_at(MockStep::RuntimeInfo));
        let host = Arc::new(RecordingHost::default());
        let (resolver, handle) = session_token_slot();

        let result = SessionBootstrap::new(store("1"))
            .with_client(mock)
            .with_host_sdk(host)
            .run(resolver)
            .await;

        assert!(matches!(result, Err(DevToolsError::Transport(_))));
        assert!(handle.is_resolved());
    }
}
