//! Neo4j connection management and shared graph client.

use neo4rs::{ConfigBuilder, Graph, Query};

use tenantgraph_core::TenancyError;

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Neo4j connection error: {0}")]
    Connection(String),

    #[error("Neo4j query error: {0}")]
    Query(#[from] neo4rs::Error),

    #[error("Graph store unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GraphError {
    /// True when the store could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Unavailable(_) => true,
            Self::Query(e) => matches!(
                e,
                neo4rs::Error::ConnectionError | neo4rs::Error::IOError { .. }
            ),
            Self::Serialization(_) => false,
        }
    }
}

impl From<GraphError> for TenancyError {
    fn from(e: GraphError) -> Self {
        if e.is_connectivity() {
            TenancyError::Connectivity(e.to_string())
        } else if let GraphError::Serialization(msg) = e {
            TenancyError::Serialization(msg)
        } else {
            TenancyError::Store(e.to_string())
        }
    }
}

/// Configuration for connecting to Neo4j.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
    pub fetch_size: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: "neo4j".to_string(),
            password: "secret".to_string(),
            max_connections: 16,
            fetch_size: 256,
        }
    }
}

impl From<&tenantgraph_core::config::Neo4jSettings> for GraphConfig {
    fn from(s: &tenantgraph_core::config::Neo4jSettings) -> Self {
        Self {
            uri: s.uri.clone(),
            user: s.user.clone(),
            password: s.password.clone(),
            ..Default::default()
        }
    }
}

/// Thread-safe Neo4j graph client with connection pooling.
///
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct GraphClient {
    graph: Graph,
}

impl GraphClient {
    /// Connect to Neo4j with the given configuration.
    pub async fn connect(config: &GraphConfig) -> Result<Self, GraphError> {
        let neo_config = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.user)
            .password(&config.password)
            .max_connections(config.max_connections as usize)
            .fetch_size(config.fetch_size)
            .build()
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        let graph = Graph::connect(neo_config)
            .await
            .map_err(|e| GraphError::Connection(e.to_string()))?;

        tracing::info!(uri = %config.uri, "Connected to Neo4j");
        Ok(Self { graph })
    }

    /// Execute a write-only query (CREATE, MERGE, DELETE, SET).
    pub async fn run(&self, query: Query) -> Result<(), GraphError> {
        self.graph.run(query).await?;
        Ok(())
    }

    /// Execute a read query and collect all rows.
    pub async fn query_rows(&self, query: Query) -> Result<Vec<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Execute a read query and return the first row, if any.
    pub async fn query_one(&self, query: Query) -> Result<Option<neo4rs::Row>, GraphError> {
        let mut stream = self.graph.execute(query).await?;
        Ok(stream.next().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_errors_map_to_connectivity() {
        let err: TenancyError = GraphError::Connection("refused".to_string()).into();
        assert!(matches!(err, TenancyError::Connectivity(_)));

        let err: TenancyError = GraphError::Unavailable("down".to_string()).into();
        assert!(matches!(err, TenancyError::Connectivity(_)));

        let err: TenancyError = GraphError::Serialization("bad row".to_string()).into();
        assert!(matches!(err, TenancyError::Serialization(_)));
    }

    #[test]
    fn config_from_settings() {
        let settings = tenantgraph_core::config::Neo4jSettings {
            uri: "bolt://db:7687".to_string(),
            ..Default::default()
        };
        let config = GraphConfig::from(&settings);
        assert_eq!(config.uri, "bolt://db:7687");
        assert_eq!(config.max_connections, 16);
    }
}
