//! API middleware components
//!
//! This module contains middleware components used by the SuperNova API,
//! including authentication, rate limiting, and request logging.

pub mod auth;
pub mod rate_limiting;
pub mod logging;

// Re-export middleware components
pub use auth::ApiAuth;
pub use rate_limiting::RateLimiter;
pub use logging::ApiLogger; 