//! tenantgraph-core: tenant identity and label injection for tenantgraph.
//!
//! This crate provides the pieces every tenantgraph component shares:
//! - `TenantId`, `LabelSet`, and the scalar attribute model
//! - `TenantContext`, the "current tenant" holder
//! - `TenantLabelProvider`, which adds the tenant label to a label set
//! - Configuration management
//! - Common error types

pub mod config;
pub mod context;
pub mod error;
pub mod labels;
pub mod types;

pub use config::{Settings, TenantLabelConfig};
pub use context::{TenantContext, TenantSource};
pub use error::{Result, TenancyError};
pub use labels::TenantLabelProvider;
pub use types::{AttributeValue, Attributes, LabelSet, NodeIdentity, StoredNode, TenantId};
