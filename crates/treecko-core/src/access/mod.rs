//! Access control in front of the ingestion pipeline.

mod authorization;
mod rate_limiter;

pub use authorization::{AuthorizationConfig, AuthorizationMode, UserAuthorization};
pub use rate_limiter::{RateLimitConfig, RateLimiter};

/// Identifier of the user sending receipts.
pub type UserId = i64;
