//! Write operations for the graph.
//!
//! Labels cannot be query parameters in Cypher, so they are spliced into
//! the statement text with backtick escaping. Attribute values always
//! travel as parameters.

use neo4rs::{query, BoltMap, BoltNull, BoltString, BoltType};

use tenantgraph_core::{AttributeValue, Attributes, LabelSet, NodeIdentity};

use crate::client::{GraphClient, GraphError};

impl GraphClient {
    /// `CREATE` a node with the given labels and properties.
    pub async fn create_labelled_node(
        &self,
        labels: &LabelSet,
        attributes: &Attributes,
    ) -> Result<NodeIdentity, GraphError> {
        let pattern = label_pattern(labels);
        let cypher = format!(
            "CREATE (n{pattern})
             SET n = $props
             RETURN id(n) AS id"
        );

        let q = query(&cypher).param("props", props_param(attributes));

        tracing::debug!(labels = %labels, "Creating node");
        let row = self
            .query_one(q)
            .await?
            .ok_or_else(|| GraphError::Serialization("CREATE returned no row".to_string()))?;
        let id: i64 = row
            .get("id")
            .map_err(|e| GraphError::Serialization(format!("Failed to read node id: {e}")))?;
        Ok(NodeIdentity(id))
    }

    /// Overwrite the properties of a node that carries all of `labels`.
    pub async fn update_labelled_node(
        &self,
        id: NodeIdentity,
        labels: &LabelSet,
        attributes: &Attributes,
    ) -> Result<bool, GraphError> {
        let pattern = label_pattern(labels);
        let cypher = format!(
            "MATCH (n{pattern})
             WHERE id(n) = $id
             SET n = $props
             RETURN count(n) AS cnt"
        );

        let q = query(&cypher)
            .param("id", id.0)
            .param("props", props_param(attributes));

        tracing::debug!(id = id.0, labels = %labels, "Updating node");
        Ok(self.count_result(q).await? > 0)
    }

    /// Detach-delete one node that carries all of `labels`.
    pub async fn delete_labelled_node(
        &self,
        id: NodeIdentity,
        labels: &LabelSet,
    ) -> Result<bool, GraphError> {
        let pattern = label_pattern(labels);
        let cypher = format!(
            "MATCH (n{pattern})
             WHERE id(n) = $id
             DETACH DELETE n
             RETURN count(n) AS cnt"
        );

        let q = query(&cypher).param("id", id.0);
        Ok(self.count_result(q).await? > 0)
    }

    /// Detach-delete every node in the database.
    pub async fn detach_delete_all(&self) -> Result<u64, GraphError> {
        let q = query(
            "MATCH (n)
             DETACH DELETE n
             RETURN count(n) AS cnt",
        );
        self.count_result(q).await
    }

    /// Run a query ending in `RETURN count(..) AS cnt`.
    pub(crate) async fn count_result(&self, q: neo4rs::Query) -> Result<u64, GraphError> {
        match self.query_one(q).await? {
            Some(row) => read_count(&row),
            None => Ok(0),
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────

fn read_count(row: &neo4rs::Row) -> Result<u64, GraphError> {
    let cnt: i64 = row
        .get("cnt")
        .map_err(|e| GraphError::Serialization(format!("Failed to read count: {e}")))?;
    u64::try_from(cnt)
        .map_err(|_| GraphError::Serialization(format!("Negative count returned: {cnt}")))
}

/// Escape a label for use as a Cypher identifier.
pub(crate) fn escape_label(label: &str) -> String {
    format!("`{}`", label.replace('`', "``"))
}

/// `:`A`:`B`` for a label set; empty for an empty set.
pub(crate) fn label_pattern(labels: &LabelSet) -> String {
    labels
        .iter()
        .map(|l| format!(":{}", escape_label(l)))
        .collect()
}

fn props_param(attributes: &Attributes) -> BoltType {
    let mut map = BoltMap::new();
    for (key, value) in attributes {
        map.put(BoltString::from(key.as_str()), to_bolt(value));
    }
    BoltType::Map(map)
}

fn to_bolt(value: &AttributeValue) -> BoltType {
    match value {
        AttributeValue::Null => BoltType::Null(BoltNull),
        AttributeValue::Bool(b) => BoltType::from(*b),
        AttributeValue::Integer(i) => BoltType::from(*i),
        AttributeValue::Float(f) => BoltType::from(*f),
        AttributeValue::String(s) => BoltType::from(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_escaped() {
        assert_eq!(escape_label("Customer1"), "`Customer1`");
        assert_eq!(escape_label("a`b"), "`a``b`");
        assert_eq!(escape_label("x) DETACH DELETE (y"), "`x) DETACH DELETE (y`");
    }

    #[test]
    fn label_pattern_joins_in_stable_order() {
        let labels: LabelSet = ["Customer1", "ConfigurationNode"].into_iter().collect();
        assert_eq!(label_pattern(&labels), ":`ConfigurationNode`:`Customer1`");
        assert_eq!(label_pattern(&LabelSet::new()), "");
    }

    fn count_row(value: BoltType) -> neo4rs::Row {
        neo4rs::Row::new(
            neo4rs::BoltList::from(vec![BoltType::from("cnt")]),
            neo4rs::BoltList::from(vec![value]),
        )
    }

    #[test]
    fn count_column_is_decoded() {
        assert_eq!(read_count(&count_row(BoltType::from(3i64))).unwrap(), 3);
    }

    #[test]
    fn undecodable_count_is_an_error() {
        for value in [BoltType::from("three"), BoltType::from(-1i64)] {
            assert!(matches!(
                read_count(&count_row(value)),
                Err(GraphError::Serialization(_))
            ));
        }
    }
}
