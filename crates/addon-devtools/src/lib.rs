//! Add-on Dev Tools Library
//!
//! Local bootstrap for add-on SDK sessions. Acquires a tenant token from
//! stored credentials, creates or reuses a meeting (and optionally an event),
//! exchanges it for a session token, and hands that token to a deferred handle
//! the add-on under development reads.
//!
//! # Modules
//!
//! - `bootstrap` - Staged entry flow, deferred handle, host SDK sinks
//! - `cli` - Command line definitions and store editing commands
//! - `config` - Store keys and validated run configuration
//! - `errors` - Error types
//! - `handlers` - HTTP handlers for the handle server
//! - `models` - Service data models
//! - `observability` - Log filter defaults
//! - `routes` - Handle server router
//! - `services` - Exchange client and token orchestration

pub mod bootstrap;
pub mod cli;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod observability;
pub mod routes;
pub mod services;
