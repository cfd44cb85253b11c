//! HTTP request handlers for the handle server.

pub mod health;
pub mod session_token;

pub use health::health_check;
pub use session_token::get_session_token;
