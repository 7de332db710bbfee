//! Configuration module for the discovery pipeline
//!
//! Holds the remote API location, timeouts, and the endpoint exclusion list.

pub mod types;

pub use types::*;
