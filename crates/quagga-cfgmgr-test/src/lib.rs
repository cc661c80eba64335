//! Test infrastructure for the Quagga configuration manager
//!
//! Provides:
//! - Running-configuration fixtures
//! - Desired-state builders
//! - A recording mock transport
//! - Command-sequence verification helpers

pub mod fixtures;
mod mock;
mod verification;

pub use fixtures::*;
pub use mock::MockTransport;
pub use verification::*;
