use thiserror::Error;

/// Top-level error type for tenant-scoped graph operations.
#[derive(Error, Debug)]
pub enum TenancyError {
    /// Fatal wiring problem: unregistered entity type, entity type with no
    /// intrinsic label, dynamic provider without a tenant source.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No usable tenant could be resolved for the current operation.
    #[error("Tenant resolution error: {0}")]
    TenantResolution(String),

    /// The graph store could not be reached. Never retried by this layer.
    #[error("Graph store unreachable: {0}")]
    Connectivity(String),

    #[error("Node not found: {label} with identity {id}")]
    NotFound { label: String, id: i64 },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Graph store error: {0}")]
    Store(String),
}

impl From<serde_json::Error> for TenancyError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TenancyError>;
