//! In-process graph store.
//!
//! Stands in for an embedded database: the demo's `--embedded` mode and
//! the test suites run against it. Identities are handed out from a
//! counter starting at zero, like a fresh Neo4j database.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use tenantgraph_core::{Attributes, LabelSet, NodeIdentity, StoredNode};

use crate::client::GraphError;
use crate::store::GraphStore;

#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    nodes: RwLock<BTreeMap<NodeIdentity, StoredNode>>,
    next_id: AtomicI64,
    unreachable: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call fail as if the database were down.
    pub fn set_reachable(&self, reachable: bool) {
        self.unreachable.store(!reachable, Ordering::SeqCst);
    }

    /// Number of commands received, including failed ones.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.nodes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.nodes.read().await.is_empty()
    }

    fn begin(&self) -> Result<(), GraphError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(GraphError::Unavailable(
                "in-memory store is switched off".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn create_node(
        &self,
        labels: &LabelSet,
        attributes: &Attributes,
    ) -> Result<NodeIdentity, GraphError> {
        self.begin()?;
        let identity = NodeIdentity(self.next_id.fetch_add(1, Ordering::SeqCst));
        let node = StoredNode {
            identity,
            labels: labels.clone(),
            attributes: attributes.clone(),
        };
        self.nodes.write().await.insert(identity, node);
        Ok(identity)
    }

    async fn update_node(
        &self,
        id: NodeIdentity,
        labels: &LabelSet,
        attributes: &Attributes,
    ) -> Result<bool, GraphError> {
        self.begin()?;
        let mut nodes = self.nodes.write().await;
        match nodes.get_mut(&id) {
            Some(node) if node.labels.is_superset(labels) => {
                node.attributes = attributes.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn match_nodes(&self, labels: &LabelSet) -> Result<Vec<StoredNode>, GraphError> {
        self.begin()?;
        Ok(self
            .nodes
            .read()
            .await
            .values()
            .filter(|n| n.labels.is_superset(labels))
            .cloned()
            .collect())
    }

    async fn match_node(
        &self,
        id: NodeIdentity,
        labels: &LabelSet,
    ) -> Result<Option<StoredNode>, GraphError> {
        self.begin()?;
        Ok(self
            .nodes
            .read()
            .await
            .get(&id)
            .filter(|n| n.labels.is_superset(labels))
            .cloned())
    }

    async fn count_nodes(&self, labels: &LabelSet) -> Result<u64, GraphError> {
        self.begin()?;
        let nodes = self.nodes.read().await;
        Ok(nodes.values().filter(|n| n.labels.is_superset(labels)).count() as u64)
    }

    async fn delete_node(&self, id: NodeIdentity, labels: &LabelSet) -> Result<bool, GraphError> {
        self.begin()?;
        let mut nodes = self.nodes.write().await;
        if nodes.get(&id).is_some_and(|n| n.labels.is_superset(labels)) {
            nodes.remove(&id);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn delete_all(&self) -> Result<u64, GraphError> {
        self.begin()?;
        let mut nodes = self.nodes.write().await;
        let count = nodes.len() as u64;
        nodes.clear();
        Ok(count)
    }
}
