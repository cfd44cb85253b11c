//! Test server harness for E2E testing
//!
//! Provides `TestHandleServer` for spawning the handle server in tests.

use addon_devtools::bootstrap::{DevToolsNamespace, SessionTokenHandle};
use addon_devtools::routes::{self, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle server bound to a random local port.
pub struct TestHandleServer {
    addr: SocketAddr,
    _handle: JoinHandle<()>,
}

impl TestHandleServer {
    /// Spawn a server exposing `handle`.
    pub async fn spawn(handle: SessionTokenHandle) -> Result<Self, anyhow::Error> {
        let state = Arc::new(AppState {
            namespace: DevToolsNamespace::new(handle),
        });
        let app = routes::build_routes(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            _handle: handle,
        })
    }

    /// Base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestHandleServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}
