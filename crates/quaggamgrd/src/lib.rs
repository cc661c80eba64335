//! Quagga/FRR configuration manager daemon
//!
//! Reads a desired-state document, compares each declared entity with the
//! device's running configuration and submits the commands that close the
//! gap through `vtysh`.

mod commands;
mod quagga_mgr;
mod settings;
mod types;

pub use commands::*;
pub use quagga_mgr::QuaggaMgr;
pub use settings::{OutputFormat, Settings};
pub use types::*;
