//! Dev tools configuration.
//!
//! Configuration is read from a [`ConfigStore`]. Validation happens once, up
//! front, so a run with missing values fails before any network call. The
//! client secret is held as a `SecretString` and redacted in Debug output.

use crate::errors::DevToolsError;
use crate::models::ResourceKind;
use common::secret::{is_blank, SecretString};
use common::store::ConfigStore;

/// Base URL of the token and resource service.
pub const KEY_HOST: &str = "host";

/// Identifier of the add-on under development.
pub const KEY_ADDON_ID: &str = "addon-id";

/// Tenant client key.
pub const KEY_CLIENT_KEY: &str = "key";

/// Tenant client secret.
pub const KEY_CLIENT_SECRET: &str = "secret";

/// Resource kind selector (`1` meeting, `2` event).
pub const KEY_RESOURCE_TYPE: &str = "type";

/// Cached meeting code from a previous run.
pub const KEY_MEETING_CODE: &str = "code";

/// Every key the store recognizes.
pub const KNOWN_KEYS: [&str; 6] = [
    KEY_HOST,
    KEY_ADDON_ID,
    KEY_CLIENT_KEY,
    KEY_CLIENT_SECRET,
    KEY_RESOURCE_TYPE,
    KEY_MEETING_CODE,
];

/// Keys whose values must never be printed.
pub const SECRET_KEYS: [&str; 1] = [KEY_CLIENT_SECRET];

/// Whether `key` is one of [`KNOWN_KEYS`].
pub fn is_known_key(key: &str) -> bool {
    KNOWN_KEYS.contains(&key)
}

/// Static tenant credentials for the run.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Base URL of the service, without a trailing slash.
    pub host: String,

    /// Client key.
    pub key: String,

    /// Client secret.
    pub secret: SecretString,
}

/// Validated configuration for a bootstrap run.
#[derive(Debug, Clone)]
pub struct DevToolsConfig {
    pub credentials: Credentials,

    /// Identifier of the add-on a session is created for.
    pub addon_identifier: String,

    /// Which resource the session token is scoped to (default: meeting).
    pub resource_kind: ResourceKind,
}

impl DevToolsConfig {
    /// Load and validate configuration from the store.
    ///
    /// `host` and `addon-id` are checked first, then the credential pair, then
    /// the resource type.
    ///
    /// # Errors
    ///
    /// Returns `DevToolsError::Configuration` naming the first missing or
    /// invalid key, or when the store itself cannot be read.
    pub fn from_store(store: &dyn ConfigStore) -> Result<Self, DevToolsError> {
        let host = read_trimmed(store, KEY_HOST)?;
        let addon_identifier = read_trimmed(store, KEY_ADDON_ID)?;

        let (Some(host), Some(addon_identifier)) = (host, addon_identifier) else {
            return Err(DevToolsError::Configuration(format!(
                "To use the token service define '{KEY_HOST}' and '{KEY_ADDON_ID}' in the store"
            )));
        };

        let key = read_non_empty(store, KEY_CLIENT_KEY)?;
        let secret = read_non_empty(store, KEY_CLIENT_SECRET)?.map(SecretString::from);

        let (Some(key), Some(secret)) = (key, secret) else {
            return Err(DevToolsError::Configuration(format!(
                "To request a tenant token define '{KEY_CLIENT_KEY}' and '{KEY_CLIENT_SECRET}' in the store"
            )));
        };

        if is_blank(&secret) {
            return Err(DevToolsError::Configuration(format!(
                "'{KEY_CLIENT_SECRET}' must not be blank"
            )));
        }

        let resource_kind = match read_trimmed(store, KEY_RESOURCE_TYPE)? {
            None => ResourceKind::default(),
            Some(value) => ResourceKind::parse_selector(&value).ok_or_else(|| {
                DevToolsError::Configuration(format!(
                    "'{KEY_RESOURCE_TYPE}' must be 1 (meeting) or 2 (event), got '{value}'"
                ))
            })?,
        };

        Ok(Self {
            credentials: Credentials {
                host: normalize_host(&host),
                key,
                secret,
            },
            addon_identifier,
            resource_kind,
        })
    }
}

/// Read a value exactly as stored. Blank values count as absent.
fn read_non_empty(store: &dyn ConfigStore, key: &str) -> Result<Option<String>, DevToolsError> {
    Ok(store.get(key)?.filter(|v| !v.trim().is_empty()))
}

/// Like [`read_non_empty`], with surrounding whitespace removed. Not used for
/// credentials, which are sent as stored.
fn read_trimmed(store: &dyn ConfigStore, key: &str) -> Result<Option<String>, DevToolsError> {
    Ok(read_non_empty(store, key)?.map(|v| v.trim().to_string()))
}

fn normalize_host(host: &str) -> String {
    host.trim_end_matches('/').to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::secret::ExposeSecret;
    use common::store::MemoryStore;

    fn base_entries() -> Vec<(&'static str, &'static str)> {
        vec![
            (KEY_HOST, "https://api.example/v1"),
            (KEY_ADDON_ID, "addon-1"),
            (KEY_CLIENT_KEY, "k"),
            (KEY_CLIENT_SECRET, "s"),
        ]
    }

    #[test]
    fn test_from_store_defaults() {
        let store = MemoryStore::with_entries(base_entries());
        let config = DevToolsConfig::from_store(&store).unwrap();

        assert_eq!(config.credentials.host, "https://api.example/v1");
        assert_eq!(config.credentials.key, "k");
        assert_eq!(config.credentials.secret.expose_secret(), "s");
        assert_eq!(config.addon_identifier, "addon-1");
        assert_eq!(config.resource_kind, ResourceKind::Meeting);
    }

    #[test]
    fn test_from_store_event_kind() {
        let mut entries = base_entries();
        entries.push((KEY_RESOURCE_TYPE, "2"));
        let store = MemoryStore::with_entries(entries);

        let config = DevToolsConfig::from_store(&store).unwrap();
        assert_eq!(config.resource_kind, ResourceKind::Event);
    }

    #[test]
    fn test_missing_host() {
        let store = MemoryStore::with_entries(
            base_entries().into_iter().filter(|(k, _)| *k != KEY_HOST),
        );
        let err = DevToolsConfig::from_store(&store).unwrap_err();

        assert!(matches!(err, DevToolsError::Configuration(_)));
        assert!(err.to_string().contains("'host'"));
    }

    #[test]
    fn test_credentials_are_kept_as_stored() {
        let store = MemoryStore::with_entries([
            (KEY_HOST, " https://api.example/v1/ "),
            (KEY_ADDON_ID, " addon-1 "),
            (KEY_CLIENT_KEY, " k "),
            (KEY_CLIENT_SECRET, "s \t"),
        ]);
        let config = DevToolsConfig::from_store(&store).unwrap();

        assert_eq!(config.credentials.key, " k ");
        assert_eq!(config.credentials.secret.expose_secret(), "s \t");
        assert_eq!(config.credentials.host, "https://api.example/v1");
        assert_eq!(config.addon_identifier, "addon-1");
    }

    #[test]
    fn test_empty_addon_id_counts_as_missing() {
        let mut entries = base_entries();
        entries.retain(|(k, _)| *k != KEY_ADDON_ID);
        entries.push((KEY_ADDON_ID, ""));
        let store = MemoryStore::with_entries(entries);

        let err = DevToolsConfig::from_store(&store).unwrap_err();
        assert!(matches!(err, DevToolsError::Configuration(_)));
    }

    #[test]
    fn test_missing_secret() {
        let store = MemoryStore::with_entries(
            base_entries()
                .into_iter()
                .filter(|(k, _)| *k != KEY_CLIENT_SECRET),
        );
        let err = DevToolsConfig::from_store(&store).unwrap_err();

        assert!(err.to_string().contains("'secret'"));
    }

    #[test]
    fn test_invalid_resource_type() {
        let mut entries = base_entries();
        entries.push((KEY_RESOURCE_TYPE, "3"));
        let store = MemoryStore::with_entries(entries);

        let err = DevToolsConfig::from_store(&store).unwrap_err();
        assert!(err.to_string().contains("got '3'"));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let mut entries = base_entries();
        entries.retain(|(k, _)| *k != KEY_HOST);
        entries.push((KEY_HOST, "http://localhost:5000/v1/"));
        let store = MemoryStore::with_entries(entries);

        let config = DevToolsConfig::from_store(&store).unwrap();
        assert_eq!(config.credentials.host, "http://localhost:5000/v1");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let store = MemoryStore::with_entries([
            (KEY_HOST, "https://api.example/v1"),
            (KEY_ADDON_ID, "addon-1"),
            (KEY_CLIENT_KEY, "k"),
            (KEY_CLIENT_SECRET, "super-secret-value"),
        ]);
        let config = DevToolsConfig::from_store(&store).unwrap();

        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-value"));
    }

    #[test]
    fn test_known_keys() {
        assert!(is_known_key("addon-id"));
        assert!(is_known_key("code"));
        assert!(!is_known_key("meet-dev-sdk-host"));
    }
}
