//! # Dev Tools Test Utilities
//!
//! Shared test utilities for `addon-devtools`.
//!
//! This crate provides:
//! - Fake token and resource service (`MockResourceBackend`, wiremock based)
//! - Configuration store fixtures (`fixtures`)
//! - Handle server harness (`TestHandleServer` for E2E tests)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use devtools_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> anyhow::Result<()> {
//!     let backend = MockResourceBackend::start().await;
//!     backend.mount_happy_path("m-1", "e-1").await;
//!
//!     let store = fixtures::meeting_store(&backend.host());
//!     // run the bootstrap against `store` ...
//!     Ok(())
//! }
//! ```

pub mod fixtures;
pub mod mock_backend;
pub mod server_harness;

// Re-export commonly used items
pub use mock_backend::*;
pub use server_harness::*;
