//! Tenant label injection.
//!
//! A [`TenantLabelProvider`] turns the intrinsic labels of an entity type
//! into the label set actually written to, and required from, the store:
//! `base ∪ {tenant label}`.

use std::fmt;
use std::sync::Arc;

use crate::config::TenantLabelConfig;
use crate::context::TenantSource;
use crate::error::{Result, TenancyError};
use crate::types::{LabelSet, TenantId};

/// Where the tenant label comes from.
#[derive(Clone)]
pub enum TenantLabelProvider {
    /// One tenant, fixed when the provider is built.
    Static(TenantId),
    /// Re-evaluated against the source on every call.
    Dynamic(Arc<dyn TenantSource>),
}

impl TenantLabelProvider {
    pub fn fixed(tenant: TenantId) -> Self {
        Self::Static(tenant)
    }

    pub fn dynamic(source: impl TenantSource + 'static) -> Self {
        Self::Dynamic(Arc::new(source))
    }

    /// Build the provider named by configuration.
    ///
    /// Dynamic mode needs a `source`; there is nothing in a config file a
    /// dynamic provider could read the tenant from.
    pub fn from_config(
        config: &TenantLabelConfig,
        source: Option<Arc<dyn TenantSource>>,
    ) -> Result<Self> {
        match config {
            TenantLabelConfig::Static { value } => TenantId::parse(value.clone())
                .map(Self::Static)
                .map_err(|e| TenancyError::Configuration(format!("static tenant label: {e}"))),
            TenantLabelConfig::Dynamic { .. } => source.map(Self::Dynamic).ok_or_else(|| {
                TenancyError::Configuration(
                    "dynamic tenant label provider requires a tenant source".to_string(),
                )
            }),
        }
    }

    /// The tenant whose label the next computation applies.
    pub fn tenant(&self) -> Result<TenantId> {
        match self {
            Self::Static(tenant) => Ok(tenant.clone()),
            Self::Dynamic(source) => source.current_tenant(),
        }
    }

    /// Add the current tenant's label to `base`.
    ///
    /// Fails instead of returning `base` unchanged: an unlabelled node
    /// would be visible to every tenant's queries.
    pub fn compute_labels(&self, base: &LabelSet) -> Result<LabelSet> {
        let tenant = self.tenant()?;
        if base.contains(tenant.label()) {
            return Err(TenancyError::TenantResolution(format!(
                "tenant label `{tenant}` collides with an intrinsic label of {base}"
            )));
        }
        let labels = base.clone().with(tenant.label());
        tracing::debug!(tenant = %tenant, labels = %labels, "Computed tenant labels");
        Ok(labels)
    }
}

impl fmt::Debug for TenantLabelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(tenant) => f.debug_tuple("Static").field(tenant).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}
