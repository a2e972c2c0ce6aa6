//! The "current tenant" holder.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{Result, TenancyError};
use crate::types::TenantId;

tokio::task_local! {
    static SCOPED_TENANT: TenantId;
}

/// Source of the tenant a dynamic label provider applies on each call.
pub trait TenantSource: Send + Sync {
    fn current_tenant(&self) -> Result<TenantId>;
}

/// Shared handle to the current tenant.
///
/// Two layers are consulted by [`TenantContext::get`]:
///
/// 1. a task-local tenant installed with [`TenantContext::scope`], visible
///    only to the future it wraps;
/// 2. the shared default installed with [`TenantContext::set`], visible to
///    every clone of this handle.
///
/// The shared default is last-write-wins. It is only safe when operations
/// run one after another. Concurrent operations for different tenants must
/// each run inside their own `scope`, otherwise one task's `set` changes
/// the labels applied by another.
#[derive(Debug, Clone, Default)]
pub struct TenantContext {
    current: Arc<RwLock<Option<TenantId>>>,
}

impl TenantContext {
    /// A context with no tenant set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tenant(tenant: TenantId) -> Self {
        let ctx = Self::new();
        ctx.set(tenant);
        ctx
    }

    /// Replace the shared default tenant. Nodes already stored keep their labels.
    pub fn set(&self, tenant: TenantId) {
        tracing::debug!(tenant = %tenant, "Switching tenant");
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(tenant);
    }

    /// Forget the shared default tenant.
    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The tenant for the calling task.
    ///
    /// Fails if the task is not inside a [`scope`](Self::scope) and no
    /// default was ever [`set`](Self::set). That is a wiring mistake, so
    /// there is no fallback tenant.
    pub fn get(&self) -> Result<TenantId> {
        if let Ok(tenant) = SCOPED_TENANT.try_with(Clone::clone) {
            return Ok(tenant);
        }
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| TenancyError::TenantResolution("no current tenant is set".to_string()))
    }

    /// Run `fut` with `tenant` as the current tenant for that future only.
    ///
    /// Tasks spawned from inside `fut` do NOT inherit the scoped tenant.
    /// They see the shared default from [`set`](Self::set), which may be
    /// another tenant. Wrap the spawned future in its own `scope`.
    pub async fn scope<F: Future>(tenant: TenantId, fut: F) -> F::Output {
        SCOPED_TENANT.scope(tenant, fut).await
    }
}

impl TenantSource for TenantContext {
    fn current_tenant(&self) -> Result<TenantId> {
        self.get()
    }
}

/// Any `Fn() -> Option<String>` is a tenant source; `None` and blank
/// values are rejected rather than mapped to a placeholder label.
impl<F> TenantSource for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn current_tenant(&self) -> Result<TenantId> {
        match self() {
            Some(raw) => TenantId::parse(raw),
            None => Err(TenancyError::TenantResolution(
                "tenant source yielded no value".to_string(),
            )),
        }
    }
}
