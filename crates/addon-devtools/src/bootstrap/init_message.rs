//! Synthetic host initialization message.
//!
//! Mirrors what a real host sends an add-on on startup, assembled from the
//! runtime descriptor plus fixed presentation values.

use crate::models::{AddonRuntimeInfo, AddonToken};
use serde::Serialize;
use std::collections::BTreeMap;

/// Principal color shown by the simulated host.
pub const PRINCIPAL_COLOR: &str = "#303F9F";

/// Display name of the simulated user.
pub const PRINCIPAL_DISPLAY_NAME: &str = "FirstName LastName";

/// Message type marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Init,
}

/// Mode the add-on runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddonMode {
    Normal,
}

/// Meeting state at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MeetingState {
    MeetingStarted,
}

/// Color theme requested from the add-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
}

/// Host addressing info.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostAddress {
    pub auth_host: String,
    pub origin: String,
}

/// The user the add-on runs as.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub addon_identifier: String,
    pub color: String,
    pub display_name: String,
    pub is_guest: bool,
    pub session_id: String,
    pub session_user_id: String,
    pub session_user_role: String,
    pub tenant: String,
    pub theme: Theme,
    pub token: AddonToken,
}

/// Initialization message passed to the host SDK sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub mode: AddonMode,
    pub state: MeetingState,
    pub configuration: Vec<serde_json::Value>,
    pub participants: Vec<serde_json::Value>,
    pub host: HostAddress,
    pub principal: Principal,
    pub settings: BTreeMap<String, String>,
}

impl InitMessage {
    /// Build the message for `addon_identifier` from its runtime descriptor.
    ///
    /// `service_host` is the configured service URL; the host address is that
    /// URL with its API version segment (`/v1`) removed.
    pub fn from_runtime_info(
        service_host: &str,
        addon_identifier: &str,
        runtime_info: &AddonRuntimeInfo,
    ) -> Self {
        let origin = strip_api_version(service_host);

        Self {
            message_type: MessageType::Init,
            mode: AddonMode::Normal,
            state: MeetingState::MeetingStarted,
            configuration: Vec::new(),
            participants: Vec::new(),
            host: HostAddress {
                auth_host: origin.clone(),
                origin,
            },
            principal: Principal {
                addon_identifier: addon_identifier.to_string(),
                color: PRINCIPAL_COLOR.to_string(),
                display_name: PRINCIPAL_DISPLAY_NAME.to_string(),
                is_guest: false,
                session_id: runtime_info.session_id.clone(),
                session_user_id: runtime_info.session_user_id.clone(),
                session_user_role: runtime_info.session_user_role.clone(),
                tenant: runtime_info.tenant.clone(),
                theme: Theme::Dark,
                token: runtime_info.token.clone(),
            },
            settings: runtime_info.settings.clone(),
        }
    }
}

fn strip_api_version(host: &str) -> String {
    host.replacen("/v1", "", 1)
}
