//! Common infrastructure for the Quagga configuration manager.
//!
//! - [`shell`]: shell command execution with proper quoting
//! - [`transport`]: the [`Transport`] trait and its `vtysh` implementation
//! - [`error`]: error types for cfgmgr operations
//!
//! # Example
//!
//! ```ignore
//! use quagga_cfgmgr_common::{Transport, VtyshTransport, CfgMgrResult};
//!
//! async fn dump() -> CfgMgrResult<String> {
//!     VtyshTransport::default().running_config().await
//! }
//! ```

pub mod error;
pub mod shell;
pub mod transport;

// Re-export commonly used items at crate root
pub use error::{CfgMgrError, CfgMgrResult};
pub use transport::{Transport, VtyshTransport, SHOW_RUNNING_CONFIG};
