//! Session token handler.
//!
//! Serves the deferred handle to an add-on page. Requests made before the
//! bootstrap finishes are held until the token is resolved.

use crate::bootstrap::HandleError;
use crate::errors::DevToolsError;
use crate::models::SessionTokenInfo;
use crate::routes::AppState;
use axum::extract::State;
use axum::Json;
use std::sync::Arc;
use tracing::{debug, instrument};

/// `GET /devtools/session-token`
///
/// # Errors
///
/// `Dependency` (503) if the bootstrap ended without a session token.
#[instrument(skip_all, name = "devtools.handlers.session_token")]
pub async fn get_session_token(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SessionTokenInfo>, DevToolsError> {
    let info = state
        .namespace
        .get_session_token()
        .wait()
        .await
        .map_err(|e| match e {
            HandleError::Abandoned => DevToolsError::Dependency(e.to_string()),
        })?;

    debug!(
        target: "devtools.handlers.session_token",
        resource_id = %info.resource_id,
        "Serving session token"
    );
    Ok(Json(SessionTokenInfo::clone(&info)))
}
