//! Error types for the tenantgraph-demo crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemoError {
    #[error(transparent)]
    Tenancy(#[from] tenantgraph_core::TenancyError),

    #[error("Graph error: {0}")]
    Graph(#[from] tenantgraph_store::GraphError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DemoError>;
