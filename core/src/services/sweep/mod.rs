//! Expiry sweep module
//!
//! Periodic maintenance of verification requests:
//! - Pending requests past `expires_at` are moved to Expired in batches
//! - Terminal requests older than the retention window are deleted

mod sweeper;

#[cfg(test)]
mod tests;

pub use sweeper::{ExpirySweepConfig, ExpirySweeper, SweepResult};
