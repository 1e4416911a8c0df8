//! Tenant registry: maps a tenant name to its live handler instance.
//!
//! Constructed once at service start and passed explicitly to whatever
//! hosts the core — handlers are registered at tenant startup and torn
//! down at tenant shutdown. No global state.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::handler::MetadataHandler;

#[derive(Default)]
pub struct TenantRegistry {
    inner: RwLock<HashMap<String, Arc<MetadataHandler>>>,
}

impl TenantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the handler for a tenant and returns the
    /// previous handler when one was registered.
    pub fn register(
        &self,
        tenant: impl Into<String>,
        handler: Arc<MetadataHandler>,
    ) -> Option<Arc<MetadataHandler>> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tenant.into(), handler)
    }

    pub fn lookup(&self, tenant: &str) -> Option<Arc<MetadataHandler>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(tenant)
            .cloned()
    }

    pub fn deregister(&self, tenant: &str) -> Option<Arc<MetadataHandler>> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(tenant)
    }

    pub fn tenants(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
