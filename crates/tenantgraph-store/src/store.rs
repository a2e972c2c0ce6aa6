//! The boundary between tenant-scoped persistence and a graph engine.

use async_trait::async_trait;

use tenantgraph_core::{Attributes, LabelSet, NodeIdentity, StoredNode};

use crate::client::{GraphClient, GraphError};

/// Node-level commands a graph engine must support.
///
/// Every method is one indivisible call from the caller's point of view.
/// Label filters are superset matches: a node qualifies when it carries
/// every label in the filter, and an empty filter matches every node.
/// Implementations own retries and timeouts, if they have any.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Create a node and return its store-assigned identity.
    async fn create_node(
        &self,
        labels: &LabelSet,
        attributes: &Attributes,
    ) -> Result<NodeIdentity, GraphError>;

    /// Replace the attributes of node `id` if it carries all of `labels`.
    /// Returns false when no such node exists. Labels are left untouched.
    async fn update_node(
        &self,
        id: NodeIdentity,
        labels: &LabelSet,
        attributes: &Attributes,
    ) -> Result<bool, GraphError>;

    async fn match_nodes(&self, labels: &LabelSet) -> Result<Vec<StoredNode>, GraphError>;

    async fn match_node(
        &self,
        id: NodeIdentity,
        labels: &LabelSet,
    ) -> Result<Option<StoredNode>, GraphError>;

    /// Number of nodes `match_nodes` would return, without reading them.
    async fn count_nodes(&self, labels: &LabelSet) -> Result<u64, GraphError>;

    /// Detach-delete node `id` if it carries all of `labels`.
    async fn delete_node(&self, id: NodeIdentity, labels: &LabelSet) -> Result<bool, GraphError>;

    /// Detach-delete every node, whatever its labels. Returns the count.
    async fn delete_all(&self) -> Result<u64, GraphError>;
}

#[async_trait]
impl GraphStore for GraphClient {
    async fn create_node(
        &self,
        labels: &LabelSet,
        attributes: &Attributes,
    ) -> Result<NodeIdentity, GraphError> {
        self.create_labelled_node(labels, attributes).await
    }

    async fn update_node(
        &self,
        id: NodeIdentity,
        labels: &LabelSet,
        attributes: &Attributes,
    ) -> Result<bool, GraphError> {
        self.update_labelled_node(id, labels, attributes).await
    }

    async fn match_nodes(&self, labels: &LabelSet) -> Result<Vec<StoredNode>, GraphError> {
        self.list_labelled_nodes(labels).await
    }

    async fn match_node(
        &self,
        id: NodeIdentity,
        labels: &LabelSet,
    ) -> Result<Option<StoredNode>, GraphError> {
        self.get_labelled_node(id, labels).await
    }

    async fn count_nodes(&self, labels: &LabelSet) -> Result<u64, GraphError> {
        self.count_labelled_nodes(labels).await
    }

    async fn delete_node(&self, id: NodeIdentity, labels: &LabelSet) -> Result<bool, GraphError> {
        self.delete_labelled_node(id, labels).await
    }

    async fn delete_all(&self) -> Result<u64, GraphError> {
        self.detach_delete_all().await
    }
}
