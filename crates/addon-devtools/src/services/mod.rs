//! Service layer.
//!
//! # Components
//!
//! - `exchange_client` - HTTP client for the token and resource service
//! - `orchestrator` - Sequences exchanges into tenant/session/runtime operations
//! - `mock` - Recording in-process `ResourceService` for tests

pub mod exchange_client;
pub mod mock;
pub mod orchestrator;

pub use exchange_client::{HttpExchangeClient, ResourceService};
pub use mock::MockResourceService;
pub use orchestrator::TokenOrchestrator;
