//! Tenant-scoped persistence.
//!
//! [`TenantSession`] sits between callers and a [`GraphStore`]. Every save
//! writes the entity's intrinsic labels plus the current tenant's label;
//! every read requires both. Each operation resolves the tenant exactly
//! once and then issues exactly one store command.

use std::marker::PhantomData;
use std::sync::Arc;

use tenantgraph_core::{
    LabelSet, NodeIdentity, Result, StoredNode, TenancyError, TenantLabelProvider,
};

use crate::entity::{decode_entity, encode_attributes, LabelRegistry, NodeEntity};
use crate::store::GraphStore;

#[derive(Clone)]
pub struct TenantSession {
    store: Arc<dyn GraphStore>,
    provider: Arc<TenantLabelProvider>,
    registry: Arc<LabelRegistry>,
}

impl TenantSession {
    pub fn new(
        store: Arc<dyn GraphStore>,
        provider: Arc<TenantLabelProvider>,
        registry: Arc<LabelRegistry>,
    ) -> Self {
        Self {
            store,
            provider,
            registry,
        }
    }

    pub fn provider(&self) -> &TenantLabelProvider {
        &self.provider
    }

    /// Labels a node of type `E` carries under the current tenant.
    fn scoped_labels<E: NodeEntity>(&self) -> Result<LabelSet> {
        let base = self.registry.intrinsic_labels::<E>()?;
        self.provider.compute_labels(base)
    }

    /// Persist `entity` under the current tenant.
    ///
    /// A new entity is created with `intrinsic ∪ {tenant}` and receives its
    /// identity. An entity that already has one is updated in place, but
    /// only if that node is visible to the current tenant; its labels are
    /// never rewritten.
    pub async fn save<E: NodeEntity>(&self, entity: &mut E) -> Result<StoredNode> {
        let labels = self.scoped_labels::<E>()?;
        let attributes = encode_attributes(entity)?;

        let identity = match entity.identity() {
            None => {
                let id = self.store.create_node(&labels, &attributes).await?;
                entity.assign_identity(id);
                id
            }
            Some(id) => {
                if !self.store.update_node(id, &labels, &attributes).await? {
                    return Err(TenancyError::NotFound {
                        label: labels.to_string(),
                        id: id.0,
                    });
                }
                id
            }
        };

        tracing::debug!(
            entity = E::TYPE_NAME,
            id = identity.0,
            labels = %labels,
            "Saved entity"
        );
        Ok(StoredNode {
            identity,
            labels,
            attributes,
        })
    }

    /// All entities of type `E` owned by the current tenant.
    ///
    /// The tenant is read now; the store is not touched until
    /// [`TenantQuery::fetch`].
    pub fn find_all<E: NodeEntity>(&self) -> Result<TenantQuery<E>> {
        Ok(TenantQuery {
            store: Arc::clone(&self.store),
            labels: self.scoped_labels::<E>()?,
            _entity: PhantomData,
        })
    }

    /// Entity `id`, if it exists and belongs to the current tenant.
    pub async fn find_by_id<E: NodeEntity>(&self, id: NodeIdentity) -> Result<Option<E>> {
        let labels = self.scoped_labels::<E>()?;
        self.store
            .match_node(id, &labels)
            .await?
            .map(decode_entity)
            .transpose()
    }

    pub async fn count<E: NodeEntity>(&self) -> Result<u64> {
        let labels = self.scoped_labels::<E>()?;
        Ok(self.store.count_nodes(&labels).await?)
    }

    /// Delete `entity` if it belongs to the current tenant.
    /// Returns false for unsaved entities and other tenants' nodes.
    pub async fn delete<E: NodeEntity>(&self, entity: &E) -> Result<bool> {
        let Some(id) = entity.identity() else {
            return Ok(false);
        };
        let labels = self.scoped_labels::<E>()?;
        Ok(self.store.delete_node(id, &labels).await?)
    }

    /// Delete every node in the store.
    ///
    /// This is an administrative operation and is NOT tenant-scoped: it
    /// removes other tenants' nodes and nodes written outside this session.
    pub async fn clear_all(&self) -> Result<u64> {
        let removed = self.store.delete_all().await?;
        tracing::warn!(removed, "Cleared all nodes across every tenant");
        Ok(removed)
    }
}

/// A label-filtered read, bound to the tenant seen when it was built.
///
/// `fetch` can be called any number of times; each call re-reads the
/// store with the same label filter.
pub struct TenantQuery<E> {
    store: Arc<dyn GraphStore>,
    labels: LabelSet,
    _entity: PhantomData<fn() -> E>,
}

impl<E: NodeEntity> TenantQuery<E> {
    /// The labels every returned node carries.
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub async fn fetch(&self) -> Result<Vec<E>> {
        let nodes = self.store.match_nodes(&self.labels).await?;
        tracing::debug!(labels = %self.labels, found = nodes.len(), "Fetched entities");
        nodes.into_iter().map(decode_entity).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryGraphStore;
    use serde::{Deserialize, Serialize};
    use tenantgraph_core::{TenantContext, TenantId};

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Note {
        #[serde(skip)]
        id: Option<NodeIdentity>,
        text: String,
    }

    impl Note {
        fn new(text: &str) -> Self {
            Self {
                id: None,
                text: text.to_string(),
            }
        }
    }

    impl NodeEntity for Note {
        const TYPE_NAME: &'static str = "Note";

        fn identity(&self) -> Option<NodeIdentity> {
            self.id
        }

        fn assign_identity(&mut self, id: NodeIdentity) {
            self.id = Some(id);
        }
    }

    fn tenant(s: &str) -> TenantId {
        TenantId::parse(s).unwrap()
    }

    fn setup() -> (Arc<MemoryGraphStore>, TenantContext, TenantSession) {
        let store = Arc::new(MemoryGraphStore::new());
        let ctx = TenantContext::new();
        let session = TenantSession::new(
            store.clone(),
            Arc::new(TenantLabelProvider::dynamic(ctx.clone())),
            Arc::new(LabelRegistry::new().register_default::<Note>()),
        );
        (store, ctx, session)
    }

    #[tokio::test]
    async fn save_assigns_identity_and_labels() {
        let (_, ctx, session) = setup();
        ctx.set(tenant("T1"));

        let mut note = Note::new("hello");
        let stored = session.save(&mut note).await.unwrap();

        assert_eq!(note.identity(), Some(stored.identity));
        assert_eq!(stored.labels, LabelSet::new().with("Note").with("T1"));
        assert!(!stored.attributes.contains_key("T1"));
    }

    #[tokio::test]
    async fn resave_keeps_identity_and_labels() {
        let (store, ctx, session) = setup();
        ctx.set(tenant("T1"));
        let mut note = Note::new("v1");
        let first = session.save(&mut note).await.unwrap();

        note.text = "v2".to_string();
        let second = session.save(&mut note).await.unwrap();
        assert_eq!(first.identity, second.identity);
        assert_eq!(store.len().await, 1);

        let found: Vec<Note> = session.find_all::<Note>().unwrap().fetch().await.unwrap();
        assert_eq!(found, vec![note]);
    }

    #[tokio::test]
    async fn resave_under_other_tenant_is_rejected() {
        let (store, ctx, session) = setup();
        ctx.set(tenant("T1"));
        let mut note = Note::new("mine");
        session.save(&mut note).await.unwrap();

        ctx.set(tenant("T2"));
        note.text = "stolen".to_string();
        let err = session.save(&mut note).await.unwrap_err();
        assert!(matches!(err, TenancyError::NotFound { .. }));

        let nodes = store.match_nodes(&LabelSet::new()).await.unwrap();
        assert_eq!(nodes[0].labels, LabelSet::new().with("Note").with("T1"));
        assert_eq!(
            nodes[0].attributes["text"],
            tenantgraph_core::AttributeValue::from("mine")
        );
    }

    #[tokio::test]
    async fn find_all_is_lazy_and_restartable() {
        let (store, ctx, session) = setup();
        ctx.set(tenant("T1"));

        let query = session.find_all::<Note>().unwrap();
        assert_eq!(store.call_count(), 0);

        assert!(query.fetch().await.unwrap().is_empty());
        session.save(&mut Note::new("a")).await.unwrap();
        assert_eq!(query.fetch().await.unwrap().len(), 1);
        assert_eq!(query.labels(), &LabelSet::new().with("Note").with("T1"));
    }

    #[tokio::test]
    async fn query_keeps_tenant_seen_at_creation() {
        let (_, ctx, session) = setup();
        ctx.set(tenant("T1"));
        session.save(&mut Note::new("a")).await.unwrap();
        let query = session.find_all::<Note>().unwrap();

        ctx.set(tenant("T2"));
        session.save(&mut Note::new("b")).await.unwrap();

        let texts: Vec<String> = query
            .fetch()
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.text)
            .collect();
        assert_eq!(texts, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn find_by_id_count_and_delete_are_scoped() {
        let (_, ctx, session) = setup();
        ctx.set(tenant("T1"));
        let mut note = Note::new("a");
        let id = session.save(&mut note).await.unwrap().identity;

        ctx.set(tenant("T2"));
        assert!(session.find_by_id::<Note>(id).await.unwrap().is_none());
        assert_eq!(session.count::<Note>().await.unwrap(), 0);
        assert!(!session.delete(&note).await.unwrap());

        ctx.set(tenant("T1"));
        assert_eq!(session.find_by_id::<Note>(id).await.unwrap(), Some(note.clone()));
        assert_eq!(session.count::<Note>().await.unwrap(), 1);
        assert!(session.delete(&note).await.unwrap());
        assert_eq!(session.count::<Note>().await.unwrap(), 0);
        assert!(!session.delete(&Note::new("unsaved")).await.unwrap());
    }

    #[tokio::test]
    async fn count_is_a_single_store_call() {
        let (store, ctx, session) = setup();
        ctx.set(tenant("T1"));
        session.save(&mut Note::new("a")).await.unwrap();
        session.save(&mut Note::new("b")).await.unwrap();

        let before = store.call_count();
        assert_eq!(session.count::<Note>().await.unwrap(), 2);
        assert_eq!(store.call_count(), before + 1);
    }

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct Reading {
        #[serde(skip)]
        id: Option<NodeIdentity>,
        value: f64,
        total: u64,
    }

    impl NodeEntity for Reading {
        const TYPE_NAME: &'static str = "Reading";

        fn identity(&self) -> Option<NodeIdentity> {
            self.id
        }

        fn assign_identity(&mut self, id: NodeIdentity) {
            self.id = Some(id);
        }
    }

    #[tokio::test]
    async fn unreadable_numbers_are_never_stored() {
        let store = Arc::new(MemoryGraphStore::new());
        let session = TenantSession::new(
            store.clone(),
            Arc::new(TenantLabelProvider::fixed(tenant("T1"))),
            Arc::new(LabelRegistry::new().register_default::<Reading>()),
        );
        let reading = |value, total| Reading {
            id: None,
            value,
            total,
        };

        session.save(&mut reading(1.5, 7)).await.unwrap();
        for mut bad in [reading(f64::NAN, 1), reading(f64::INFINITY, 1), reading(1.0, u64::MAX)] {
            let err = session.save(&mut bad).await.unwrap_err();
            assert!(matches!(err, TenancyError::Serialization(_)), "{err}");
            assert_eq!(bad.identity(), None);
        }
        assert_eq!(store.len().await, 1);

        let found = session.find_all::<Reading>().unwrap().fetch().await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].value, found[0].total), (1.5, 7));
    }

    #[tokio::test]
    async fn unregistered_type_is_a_configuration_error() {
        let store = Arc::new(MemoryGraphStore::new());
        let session = TenantSession::new(
            store.clone(),
            Arc::new(TenantLabelProvider::fixed(tenant("T1"))),
            Arc::new(LabelRegistry::new()),
        );
        let err = session.save(&mut Note::new("a")).await.unwrap_err();
        assert!(matches!(err, TenancyError::Configuration(_)));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn missing_tenant_writes_nothing() {
        let (store, _ctx, session) = setup();
        let err = session.save(&mut Note::new("a")).await.unwrap_err();
        assert!(matches!(err, TenancyError::TenantResolution(_)));
        assert_eq!(store.call_count(), 0);
        assert!(session.find_all::<Note>().is_err());
    }

    #[tokio::test]
    async fn unreachable_store_is_not_retried() {
        let (store, ctx, session) = setup();
        ctx.set(tenant("T1"));
        store.set_reachable(false);

        let mut note = Note::new("a");
        let err = session.save(&mut note).await.unwrap_err();
        assert!(matches!(err, TenancyError::Connectivity(_)));
        assert_eq!(store.call_count(), 1);
        assert_eq!(note.identity(), None);
    }
}
