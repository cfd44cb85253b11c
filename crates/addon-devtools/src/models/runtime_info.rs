//! Add-on runtime descriptor (`GET /meetingAddons/{identifier}`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where the host renders the add-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HostSurface {
    #[default]
    Canvas,
    Panel,
}

/// What the host does with the add-on when it becomes inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InactiveMode {
    /// Hide the add-on.
    #[default]
    Hidden,
    /// Shrink the add-on to a 200px mini view.
    Mini,
}

/// Token the host presents to the add-on.
///
/// Its shape is owned by the service, so it is carried through untouched.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddonToken(pub serde_json::Value);

impl fmt::Debug for AddonToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AddonToken([REDACTED])")
    }
}

/// The add-on as the host would deliver it to a running session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonRuntimeInfo {
    /// Add-on identifier.
    pub identifier: String,

    /// Localized title.
    #[serde(default)]
    pub title: String,

    /// Localized description.
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub category: String,

    /// Material icon name, URL or app action.
    #[serde(default)]
    pub icon: String,

    /// Icon used in dark mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_dark: Option<String>,

    #[serde(default)]
    pub host: HostSurface,

    #[serde(default)]
    pub inactive_mode: InactiveMode,

    /// Load on session start rather than on first navigation.
    #[serde(default)]
    pub preloaded: bool,

    /// Hashed session (meeting) identifier.
    pub session_id: String,

    /// Hashed session + user identity.
    pub session_user_id: String,

    /// Role of the user in the session.
    pub session_user_role: String,

    /// Hashed tenant identifier.
    pub tenant: String,

    /// Author-defined runtime settings.
    #[serde(default)]
    pub settings: BTreeMap<String, String>,

    pub token: AddonToken,

    #[serde(default)]
    pub is_guest_user: bool,
}
