//! tenantgraph-store: tenant-labelled persistence over a graph store.
//!
//! All entity reads and writes flow through [`TenantSession`], which adds
//! the current tenant's label on write and requires it on read. The
//! [`GraphStore`] trait is the boundary to the database; [`GraphClient`]
//! implements it for Neo4j and [`MemoryGraphStore`] in process.

pub mod attributes;
pub mod client;
pub mod entity;
pub mod memory;
pub mod mutations;
pub mod queries;
pub mod session;
pub mod store;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use entity::{LabelRegistry, NodeEntity};
pub use memory::MemoryGraphStore;
pub use session::{TenantQuery, TenantSession};
pub use store::GraphStore;
