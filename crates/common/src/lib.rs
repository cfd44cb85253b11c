//! Common utilities and types shared across the add-on dev tools crates.

#![warn(clippy::pedantic)]

/// Module for process-level configuration (logging)
pub mod config;

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for the persistent key-value configuration store
pub mod store;
