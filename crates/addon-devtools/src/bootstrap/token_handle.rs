//! Deferred session-token handle.
//!
//! A single-assignment slot built on `tokio::sync::watch`. The producer side
//! ([`SessionTokenResolver`]) is consumed by [`SessionTokenResolver::resolve`],
//! so a value can be assigned at most once. The consumer side
//! ([`SessionTokenHandle`]) is cheap to clone; every clone observes the same
//! value, whether `wait` is called before or after resolution.
//!
//! If the resolver is dropped without resolving (the bootstrap failed),
//! waiters get [`HandleError::Abandoned`] instead of waiting forever.

use crate::models::SessionTokenInfo;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

/// Errors observed by handle consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HandleError {
    /// The bootstrap ended without acquiring a session token.
    #[error("Session token was never resolved")]
    Abandoned,
}

type Slot = Option<Arc<SessionTokenInfo>>;

/// Create a connected resolver/handle pair.
pub fn session_token_slot() -> (SessionTokenResolver, SessionTokenHandle) {
    let (sender, receiver) = watch::channel(None);
    (
        SessionTokenResolver { sender },
        SessionTokenHandle { receiver },
    )
}

/// Producer side of the slot. Resolving consumes it.
#[derive(Debug)]
pub struct SessionTokenResolver {
    sender: watch::Sender<Slot>,
}

impl SessionTokenResolver {
    /// Assign the session token and wake every waiter.
    ///
    /// Returns the shared value handed to consumers. The value is stored even
    /// when no handle is currently alive.
    pub fn resolve(self, info: SessionTokenInfo) -> Arc<SessionTokenInfo> {
        let info = Arc::new(info);
        self.sender.send_replace(Some(Arc::clone(&info)));
        info
    }

    /// A new consumer handle for this slot.
    pub fn handle(&self) -> SessionTokenHandle {
        SessionTokenHandle {
            receiver: self.sender.subscribe(),
        }
    }
}

/// Consumer side of the slot.
#[derive(Debug, Clone)]
pub struct SessionTokenHandle {
    receiver: watch::Receiver<Slot>,
}

impl SessionTokenHandle {
    /// Wait until the session token is resolved.
    ///
    /// Returns immediately if it already is.
    ///
    /// # Errors
    ///
    /// `HandleError::Abandoned` if the resolver was dropped unresolved.
    pub async fn wait(&self) -> Result<Arc<SessionTokenInfo>, HandleError> {
        let mut receiver = self.receiver.clone();
        let slot = receiver
            .wait_for(Option::is_some)
            .await
            .map_err(|_| HandleError::Abandoned)?;

        (*slot).clone().ok_or(HandleError::Abandoned)
    }

    /// The session token if already resolved.
    pub fn try_get(&self) -> Option<Arc<SessionTokenInfo>> {
        self.receiver.borrow().clone()
    }

    /// Whether the session token has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.receiver.borrow().is_some()
    }
}

/// The namespaced object exposed to the hosted add-on.
///
/// Every call to [`DevToolsNamespace::get_session_token`] returns a handle on
/// the same slot.
#[derive(Debug, Clone)]
pub struct DevToolsNamespace {
    handle: SessionTokenHandle,
}

impl DevToolsNamespace {
    pub fn new(handle: SessionTokenHandle) -> Self {
        Self { handle }
    }

    /// Handle resolving to the session token of this run.
    pub fn get_session_token(&self) -> SessionTokenHandle {
        self.handle.clone()
    }
}
