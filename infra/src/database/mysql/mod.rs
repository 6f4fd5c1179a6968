//! MySQL repository implementations

pub(crate) mod verification_store_impl;

pub use verification_store_impl::{MySqlVerificationStore, CREATE_TABLE_SQL};
