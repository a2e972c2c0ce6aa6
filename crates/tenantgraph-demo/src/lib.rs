//! tenantgraph-demo: two customers sharing one graph database.
//!
//! Saves `ConfigurationNode`s while switching the current customer and
//! prints what the raw store holds next to what the tenant-scoped session
//! returns.

pub mod error;
pub mod node;
pub mod scenario;
