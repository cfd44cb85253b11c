//! Secret types for keeping credentials out of logs.
//!
//! Re-exports the [`secrecy`] types used for the tenant client secret and any
//! other value that must never show up in `{:?}` output or a tracing field.
//!
//! `SecretString` implements `Debug` with redaction, so a struct that derives
//! `Debug` and holds one is safe to log as a whole. Reading the value requires
//! an explicit `expose_secret()` call at the point of use (for example when the
//! credential is written into a token request body).
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct TenantCredentials {
//!     key: String,
//!     secret: SecretString,
//! }
//!
//! let creds = TenantCredentials {
//!     key: "tenant-key".to_string(),
//!     secret: SecretString::from("tenant-secret"),
//! };
//!
//! assert!(!format!("{creds:?}").contains("tenant-secret"));
//! assert_eq!(creds.secret.expose_secret(), "tenant-secret");
//! ```
//!
//! Bearer tokens handed to the hosted add-on are plain `String`s on response
//! types because they are serialized back out; those types carry a manual
//! `Debug` impl that prints `[REDACTED]` instead.

pub use secrecy::{ExposeSecret, SecretString};

/// Returns `true` when the secret holds no characters.
///
/// Used when a credential read from the store turns out to be blank.
#[must_use]
pub fn is_blank(secret: &SecretString) -> bool {
    secret.expose_secret().trim().is_empty()
}
