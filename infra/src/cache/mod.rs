//! Cache module for Redis-backed state shared between service instances
//!
//! The only shared state the engine needs outside the store is the issuance
//! rate rule, so this module holds the Redis client and the rate limiter.

pub mod rate_limiter;
pub mod redis_client;

#[cfg(test)]
mod tests;

pub use rate_limiter::RedisIssueRateLimiter;
pub use redis_client::RedisClient;
