//! Read operations for the graph.

use neo4rs::query;

use tenantgraph_core::{AttributeValue, Attributes, LabelSet, NodeIdentity, StoredNode};

use crate::client::{GraphClient, GraphError};
use crate::mutations::label_pattern;

impl GraphClient {
    /// All nodes carrying every label in `labels`.
    pub async fn list_labelled_nodes(
        &self,
        labels: &LabelSet,
    ) -> Result<Vec<StoredNode>, GraphError> {
        let pattern = label_pattern(labels);
        let cypher = format!(
            "MATCH (n{pattern})
             RETURN n
             ORDER BY id(n)"
        );

        tracing::debug!(labels = %labels, "Matching nodes");
        let rows = self.query_rows(query(&cypher)).await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let node: neo4rs::Node = row.get("n").map_err(|e| {
                GraphError::Serialization(format!("Failed to deserialize node: {e}"))
            })?;
            results.push(neo4j_node_to_stored(&node));
        }
        Ok(results)
    }

    /// Number of nodes carrying every label in `labels`.
    pub async fn count_labelled_nodes(&self, labels: &LabelSet) -> Result<u64, GraphError> {
        let pattern = label_pattern(labels);
        let cypher = format!(
            "MATCH (n{pattern})
             RETURN count(n) AS cnt"
        );

        tracing::debug!(labels = %labels, "Counting nodes");
        self.count_result(query(&cypher)).await
    }

    /// Node `id`, provided it carries every label in `labels`.
    pub async fn get_labelled_node(
        &self,
        id: NodeIdentity,
        labels: &LabelSet,
    ) -> Result<Option<StoredNode>, GraphError> {
        let pattern = label_pattern(labels);
        let cypher = format!(
            "MATCH (n{pattern})
             WHERE id(n) = $id
             RETURN n"
        );

        let q = query(&cypher).param("id", id.0);

        match self.query_one(q).await? {
            Some(row) => {
                let node: neo4rs::Node = row.get("n").map_err(|e| {
                    GraphError::Serialization(format!("Failed to deserialize node: {e}"))
                })?;
                Ok(Some(neo4j_node_to_stored(&node)))
            }
            None => Ok(None),
        }
    }
}

/// Convert a neo4rs::Node into a StoredNode.
///
/// Properties are tried as bool, integer, float, then string. Lists and
/// maps are never written by this crate and are skipped.
fn neo4j_node_to_stored(node: &neo4rs::Node) -> StoredNode {
    let labels: LabelSet = node.labels().into_iter().map(|l| l.to_string()).collect();

    let mut attributes = Attributes::new();
    for key in node.keys() {
        let value = if let Ok(b) = node.get::<bool>(key) {
            AttributeValue::Bool(b)
        } else if let Ok(i) = node.get::<i64>(key) {
            AttributeValue::Integer(i)
        } else if let Ok(f) = node.get::<f64>(key) {
            AttributeValue::Float(f)
        } else if let Ok(s) = node.get::<String>(key) {
            AttributeValue::String(s)
        } else {
            tracing::debug!(key, "Skipping non-scalar node property");
            continue;
        };
        attributes.insert(key.to_string(), value);
    }

    StoredNode {
        identity: NodeIdentity(node.id()),
        labels,
        attributes,
    }
}
