// Request security: input validation, per-client rate limiting, and the
// per-endpoint query statistics registry.

mod metrics;
mod rate_limit;
pub mod validate;

pub use metrics::QueryStats;
pub use rate_limit::{RateLimitConfig, RateLimiter};
