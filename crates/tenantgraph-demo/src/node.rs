//! The sample entity.

use std::fmt;

use serde::{Deserialize, Serialize};

use tenantgraph_core::NodeIdentity;
use tenantgraph_store::{LabelRegistry, NodeEntity};

/// A single configuration value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigurationNode {
    #[serde(skip)]
    id: Option<NodeIdentity>,
    value: String,
}

impl ConfigurationNode {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            id: None,
            value: value.into(),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl NodeEntity for ConfigurationNode {
    const TYPE_NAME: &'static str = "ConfigurationNode";

    fn identity(&self) -> Option<NodeIdentity> {
        self.id
    }

    fn assign_identity(&mut self, id: NodeIdentity) {
        self.id = Some(id);
    }
}

impl fmt::Display for ConfigurationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(f, "ConfigurationNode{{id={id}, value='{}'}}", self.value),
            None => write!(f, "ConfigurationNode{{id=null, value='{}'}}", self.value),
        }
    }
}

/// Labels for every entity the demo persists.
pub fn registry() -> LabelRegistry {
    LabelRegistry::new().register_default::<ConfigurationNode>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_shows_identity() {
        let mut node = ConfigurationNode::new("OGM-Config-1");
        assert_eq!(
            node.to_string(),
            "ConfigurationNode{id=null, value='OGM-Config-1'}"
        );
        node.assign_identity(NodeIdentity(3));
        assert_eq!(node.to_string(), "ConfigurationNode{id=3, value='OGM-Config-1'}");
    }

    #[test]
    fn registered_under_its_type_name() {
        let labels = registry();
        let labels = labels.intrinsic_labels::<ConfigurationNode>().unwrap();
        assert!(labels.contains("ConfigurationNode"));
        assert_eq!(labels.len(), 1);
    }
}
