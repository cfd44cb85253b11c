//! Store and response fixtures.

use common::store::MemoryStore;
use std::sync::Arc;

pub const ADDON_ID: &str = "addon-under-test";
pub const CLIENT_KEY: &str = "test-client-key";
pub const CLIENT_SECRET: &str = "test-client-secret";

pub const TENANT_TOKEN: &str = "tenant-token-1";
pub const SESSION_TOKEN: &str = "session-token-1";

/// Store with every value a meeting session needs.
pub fn meeting_store(host: &str) -> Arc<MemoryStore> {
    store_with_type(host, "1")
}

/// Store with every value an event session needs.
pub fn event_store(host: &str) -> Arc<MemoryStore> {
    store_with_type(host, "2")
}

/// Fully configured store for the given resource type selector.
pub fn store_with_type(host: &str, resource_type: &str) -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_entries([
        ("host", host),
        ("addon-id", ADDON_ID),
        ("key", CLIENT_KEY),
        ("secret", CLIENT_SECRET),
        ("type", resource_type),
    ]))
}

/// Tenant token response body.
pub fn tenant_token_body() -> serde_json::Value {
    serde_json::json!({
        "access_token": TENANT_TOKEN,
        "token_type": "Bearer",
        "expires_in": 3600
    })
}

/// Session token response body.
pub fn session_token_body() -> serde_json::Value {
    serde_json::json!({
        "access_token": SESSION_TOKEN,
        "token_type": "Bearer",
        "expires_in": 900,
        "scope": "session"
    })
}

/// Runtime descriptor response body for [`ADDON_ID`].
pub fn runtime_info_body() -> serde_json::Value {
    serde_json::json!({
        "identifier": ADDON_ID,
        "title": "Add-on under test",
        "description": "Integration test add-on",
        "category": "productivity",
        "icon": "extension",
        "host": "Canvas",
        "inactiveMode": "mini",
        "preloaded": true,
        "sessionId": "hashed-session",
        "sessionUserId": "hashed-session-user",
        "sessionUserRole": "Host",
        "tenant": "hashed-tenant",
        "settings": { "theme": "compact" },
        "token": { "access_token": "addon-token", "expires_in": 900 },
        "isGuestUser": false
    })
}
