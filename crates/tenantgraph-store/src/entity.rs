//! Mapping between Rust entity types and labelled graph nodes.

use std::any::type_name;
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use tenantgraph_core::{Attributes, LabelSet, NodeIdentity, Result, StoredNode, TenancyError};

use crate::attributes::to_attributes;

/// A type persisted as a graph node.
///
/// The identity is not one of the serialized fields: mark it
/// `#[serde(skip)]` so it never ends up in the attribute map.
pub trait NodeEntity: Serialize + DeserializeOwned + Send + Sync {
    /// Key under which the type's intrinsic labels are registered.
    const TYPE_NAME: &'static str;

    fn identity(&self) -> Option<NodeIdentity>;

    /// Called once, after the first save.
    fn assign_identity(&mut self, id: NodeIdentity);
}

/// Intrinsic labels per entity type, declared up front.
#[derive(Debug, Clone, Default)]
pub struct LabelRegistry {
    labels: HashMap<&'static str, LabelSet>,
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the intrinsic labels of `E`.
    pub fn register<E, I, S>(mut self, labels: I) -> Self
    where
        E: NodeEntity,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels.insert(E::TYPE_NAME, labels.into_iter().collect());
        self
    }

    /// Declare `E` with its type name as its only label.
    pub fn register_default<E: NodeEntity>(self) -> Self {
        self.register::<E, _, _>([E::TYPE_NAME])
    }

    /// The intrinsic labels of `E`.
    ///
    /// Unregistered types and types registered without a usable label are
    /// configuration errors.
    pub fn intrinsic_labels<E: NodeEntity>(&self) -> Result<&LabelSet> {
        let labels = self.labels.get(E::TYPE_NAME).ok_or_else(|| {
            TenancyError::Configuration(format!(
                "entity type {} is not registered",
                type_name::<E>()
            ))
        })?;
        if labels.is_empty() || labels.iter().any(|l| l.trim().is_empty()) {
            return Err(TenancyError::Configuration(format!(
                "entity type {} declares no intrinsic label",
                type_name::<E>()
            )));
        }
        Ok(labels)
    }
}

/// Serialize an entity's fields into node attributes.
///
/// Fails on fields that cannot be read back unchanged: nested values,
/// non-finite floats, and integers outside `i64`.
pub fn encode_attributes<E: Serialize>(entity: &E) -> Result<Attributes> {
    Ok(to_attributes(entity)?)
}

/// Rebuild an entity from a stored node and stamp its identity.
pub fn decode_entity<E: NodeEntity>(node: StoredNode) -> Result<E> {
    let fields: serde_json::Map<String, serde_json::Value> = node
        .attributes
        .iter()
        .map(|(k, v)| (k.clone(), v.to_json()))
        .collect();
    let mut entity: E = serde_json::from_value(serde_json::Value::Object(fields))?;
    entity.assign_identity(node.identity);
    Ok(entity)
}
