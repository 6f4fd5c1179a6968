//! Common utility functions

pub mod mask;
