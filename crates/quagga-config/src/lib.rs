//! Running-configuration model for Quagga/FRR routing daemons.
//!
//! This crate maps between the indentation-scoped configuration text that
//! `vtysh` prints and a typed per-entity attribute model, and turns the
//! difference between two attribute maps into an ordered list of CLI
//! fragments:
//!
//! - [`schema`]: static per-kind attribute tables (pattern, type, default,
//!   templates)
//! - [`parser`]: single pass over `show running-config` output
//! - [`resolver`]: inherited address-family activation
//! - [`diff`]: type-aware attribute comparison
//! - [`emitter`]: context framing and negation of mutations
//! - [`plan`]: create / modify / destroy for one entity
//! - [`desired`]: YAML desired-state documents
//!
//! # Example
//!
//! ```
//! use quagga_config::{observe, plan, Identity, Kind, load_desired};
//!
//! let running = "router bgp 65000\n neighbor 10.0.0.2 remote-as 65001\n";
//! let observed = observe(running);
//!
//! let desired = load_desired(
//!     "entities:\n  - kind: bgp_peer\n    name: 65000 10.0.0.2\n    attributes:\n      remote_as: 65002\n",
//! )
//! .unwrap();
//! let identity = Identity::parse(Kind::BgpPeer, "65000 10.0.0.2").unwrap();
//! let sequence = plan(observed.find(&identity), &desired[0]).unwrap().unwrap();
//! assert!(sequence.contains("neighbor 10.0.0.2 remote-as 65002"));
//! ```
//!
//! Everything here is synchronous and free of I/O; executing the fragments
//! is left to the caller.

pub mod desired;
pub mod diff;
pub mod emitter;
pub mod error;
pub mod family;
pub mod identity;
pub mod instance;
mod kinds;
pub mod parser;
pub mod plan;
mod registry;
pub mod resolver;
pub mod schema;
pub mod template;
pub mod value;

pub use desired::{load_desired, DesiredDocument, DesiredEntity};
pub use diff::{diff, Mutation, MutationSet};
pub use emitter::{emit, CommandSequence};
pub use error::{ConfigError, ConfigResult, Diagnostic};
pub use family::AddressFamily;
pub use identity::Identity;
pub use instance::{Attributes, EntityInstance, Ensure};
pub use parser::{parse, ParsedConfig};
pub use plan::{destroy, plan};
pub use resolver::resolve;
pub use schema::{AttributeSpec, Kind, KindSchema};
pub use value::{AttributeValue, ValueType};

/// Parses running-configuration text and resolves inherited attributes.
pub fn observe(text: &str) -> ParsedConfig {
    parse(text).resolved()
}
