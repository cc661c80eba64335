//! Per-kind schema tables.
//!
//! Kinds are grouped by protocol; [`crate::schema::Kind::schema`] is the
//! only way in.

pub(crate) mod bgp;
pub(crate) mod interface;
pub(crate) mod ospf;
pub(crate) mod policy;
