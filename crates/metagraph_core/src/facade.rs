//! Repository facade: the single translation boundary over the store port.
//!
//! Every method takes the caller identity and a logical operation name,
//! performs the store call, and maps any `StoreFailure` onto the
//! caller-facing taxonomy through one total function. An unrecognised
//! failure becomes a `RepositoryError`, never a raw propagation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{MetaGraphError, Result};
use crate::identity::CallerIdentity;
use crate::ports::{
    ElementSearch, GraphStore, NeighborhoodQuery, OrderKey, RelationshipSearch, StoreFailure,
    StoreOrdering,
};
use crate::types::{
    Classification, InstanceGraph, MetadataElement, Page, Relationship, Sequencing,
};

/// Maps a low-level store failure onto the caller-facing taxonomy.
/// Total: every failure kind has exactly one outcome.
pub(crate) fn translate(operation: &str, failure: StoreFailure) -> MetaGraphError {
    match failure {
        StoreFailure::NotFound { guid } => MetaGraphError::EntityNotKnown { guid },
        StoreFailure::ProxyOnly { guid } => MetaGraphError::EntityProxyOnly { guid },
        StoreFailure::RelationshipNotFound { guid } => {
            MetaGraphError::RelationshipNotKnown { guid }
        }
        StoreFailure::ClassificationNotFound { guid, name } => MetaGraphError::ClassificationError {
            element: guid,
            classification: name,
            message: "not attached".into(),
        },
        StoreFailure::VersionConflict {
            guid,
            expected,
            actual,
        } => MetaGraphError::RepositoryError {
            operation: operation.to_string(),
            source: anyhow::anyhow!(
                "concurrent mutation of {guid}: expected version {expected}, got {actual}"
            ),
        },
        StoreFailure::Unsupported { function } => {
            MetaGraphError::FunctionNotSupported { operation: function }
        }
        StoreFailure::InvalidPaging {
            start_from,
            page_size,
            message,
        } => MetaGraphError::PagingError {
            start_from,
            page_size,
            message,
        },
        StoreFailure::Unreachable(source) => MetaGraphError::StoreUnreachable {
            operation: operation.to_string(),
            source,
        },
        StoreFailure::Backend(source) => MetaGraphError::RepositoryError {
            operation: operation.to_string(),
            source,
        },
    }
}

/// Translates the caller-facing ordering enum into the store's own
/// representation. Pure, total, order-preserving.
pub fn store_ordering(sequencing: &Sequencing) -> StoreOrdering {
    match sequencing {
        Sequencing::CreationDateRecent => StoreOrdering {
            key: OrderKey::CreationTime,
            descending: true,
        },
        Sequencing::CreationDateOldest => StoreOrdering {
            key: OrderKey::CreationTime,
            descending: false,
        },
        Sequencing::PropertyAscending(p) => StoreOrdering {
            key: OrderKey::Property(p.clone()),
            descending: false,
        },
        Sequencing::PropertyDescending(p) => StoreOrdering {
            key: OrderKey::Property(p.clone()),
            descending: true,
        },
        Sequencing::Guid => StoreOrdering {
            key: OrderKey::Guid,
            descending: false,
        },
    }
}

pub struct RepositoryFacade {
    store: Arc<dyn GraphStore>,
    tenant: String,
}

impl RepositoryFacade {
    pub fn new(store: Arc<dyn GraphStore>, tenant: impl Into<String>) -> Self {
        Self {
            store,
            tenant: tenant.into(),
        }
    }

    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    fn trace(&self, caller: &CallerIdentity, operation: &str) {
        tracing::debug!(
            tenant = %self.tenant,
            caller = %caller.actor_id,
            operation,
            "repository call"
        );
    }

    // ── Elements ──────────────────────────────────────────────

    pub async fn create_element(
        &self,
        caller: &CallerIdentity,
        element: MetadataElement,
    ) -> Result<MetadataElement> {
        const OP: &str = "create-element";
        self.trace(caller, OP);
        self.store
            .create_element(element)
            .await
            .map_err(|f| translate(OP, f))
    }

    pub async fn get_element(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
    ) -> Result<MetadataElement> {
        const OP: &str = "get-element";
        self.trace(caller, OP);
        self.store
            .get_element(guid)
            .await
            .map_err(|f| translate(OP, f))
    }

    pub async fn update_element(
        &self,
        caller: &CallerIdentity,
        element: MetadataElement,
    ) -> Result<MetadataElement> {
        const OP: &str = "update-element";
        self.trace(caller, OP);
        self.store
            .update_element(element)
            .await
            .map_err(|f| translate(OP, f))
    }

    pub async fn delete_element(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        at: DateTime<Utc>,
    ) -> Result<MetadataElement> {
        const OP: &str = "delete-element";
        self.trace(caller, OP);
        self.store
            .delete_element(guid, &caller.actor_id, at)
            .await
            .map_err(|f| translate(OP, f))
    }

    pub async fn restore_element(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        at: DateTime<Utc>,
    ) -> Result<MetadataElement> {
        const OP: &str = "restore-element";
        self.trace(caller, OP);
        self.store
            .restore_element(guid, &caller.actor_id, at)
            .await
            .map_err(|f| translate(OP, f))
    }

    pub async fn purge_element(&self, caller: &CallerIdentity, guid: Uuid) -> Result<()> {
        const OP: &str = "purge-element";
        self.trace(caller, OP);
        self.store
            .purge_element(guid)
            .await
            .map_err(|f| translate(OP, f))
    }

    // ── Classifications ───────────────────────────────────────

    pub async fn classify_element(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        classification: Classification,
        at: DateTime<Utc>,
    ) -> Result<MetadataElement> {
        const OP: &str = "classify-element";
        self.trace(caller, OP);
        self.store
            .classify_element(guid, classification, &caller.actor_id, at)
            .await
            .map_err(|f| translate(OP, f))
    }

    pub async fn declassify_element(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        classification_name: &str,
        at: DateTime<Utc>,
    ) -> Result<MetadataElement> {
        const OP: &str = "declassify-element";
        self.trace(caller, OP);
        self.store
            .declassify_element(guid, classification_name, &caller.actor_id, at)
            .await
            .map_err(|f| translate(OP, f))
    }

    // ── Relationships ─────────────────────────────────────────

    pub async fn create_relationship(
        &self,
        caller: &CallerIdentity,
        relationship: Relationship,
    ) -> Result<Relationship> {
        const OP: &str = "create-relationship";
        self.trace(caller, OP);
        self.store
            .create_relationship(relationship)
            .await
            .map_err(|f| translate(OP, f))
    }

    pub async fn get_relationship(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
    ) -> Result<Relationship> {
        const OP: &str = "get-relationship";
        self.trace(caller, OP);
        self.store
            .get_relationship(guid)
            .await
            .map_err(|f| translate(OP, f))
    }

    pub async fn update_relationship(
        &self,
        caller: &CallerIdentity,
        relationship: Relationship,
    ) -> Result<Relationship> {
        const OP: &str = "update-relationship";
        self.trace(caller, OP);
        self.store
            .update_relationship(relationship)
            .await
            .map_err(|f| translate(OP, f))
    }

    pub async fn delete_relationship(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Relationship> {
        const OP: &str = "delete-relationship";
        self.trace(caller, OP);
        self.store
            .delete_relationship(guid, &caller.actor_id, at)
            .await
            .map_err(|f| translate(OP, f))
    }

    pub async fn restore_relationship(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        at: DateTime<Utc>,
    ) -> Result<Relationship> {
        const OP: &str = "restore-relationship";
        self.trace(caller, OP);
        self.store
            .restore_relationship(guid, &caller.actor_id, at)
            .await
            .map_err(|f| translate(OP, f))
    }

    pub async fn purge_relationship(&self, caller: &CallerIdentity, guid: Uuid) -> Result<()> {
        const OP: &str = "purge-relationship";
        self.trace(caller, OP);
        self.store
            .purge_relationship(guid)
            .await
            .map_err(|f| translate(OP, f))
    }

    // ── Queries ───────────────────────────────────────────────

    pub async fn find_elements(
        &self,
        caller: &CallerIdentity,
        search: ElementSearch,
    ) -> Result<Vec<MetadataElement>> {
        const OP: &str = "find-elements";
        self.trace(caller, OP);
        self.store
            .find_elements(search)
            .await
            .map_err(|f| translate(OP, f))
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn find_elements_by_property_value(
        &self,
        caller: &CallerIdentity,
        property: &str,
        value: &serde_json::Value,
        type_names: &[String],
        as_of: DateTime<Utc>,
        ordering: StoreOrdering,
        page: Page,
    ) -> Result<Vec<MetadataElement>> {
        const OP: &str = "find-elements-by-property-value";
        self.trace(caller, OP);
        self.store
            .find_elements_by_property_value(property, value, type_names, as_of, ordering, page)
            .await
            .map_err(|f| translate(OP, f))
    }

    pub async fn find_elements_by_text(
        &self,
        caller: &CallerIdentity,
        search: &str,
        type_names: &[String],
        as_of: DateTime<Utc>,
        ordering: StoreOrdering,
        page: Page,
    ) -> Result<Vec<MetadataElement>> {
        const OP: &str = "find-elements-by-text";
        self.trace(caller, OP);
        self.store
            .find_elements_by_text(search, type_names, as_of, ordering, page)
            .await
            .map_err(|f| translate(OP, f))
    }

    pub async fn relationships_for_element(
        &self,
        caller: &CallerIdentity,
        search: RelationshipSearch,
    ) -> Result<Vec<Relationship>> {
        const OP: &str = "relationships-for-element";
        self.trace(caller, OP);
        self.store
            .relationships_for_element(search)
            .await
            .map_err(|f| translate(OP, f))
    }

    /// Bounded traversal. A store that lacks the capability yields an
    /// empty graph rather than an error — that policy applies only to
    /// `Unsupported`; every other failure kind surfaces normally.
    pub async fn entity_neighborhood(
        &self,
        caller: &CallerIdentity,
        query: NeighborhoodQuery,
    ) -> Result<InstanceGraph> {
        const OP: &str = "entity-neighborhood";
        self.trace(caller, OP);
        match self.store.neighborhood(query).await {
            Ok(graph) => Ok(graph),
            Err(StoreFailure::Unsupported { function }) => {
                tracing::debug!(
                    tenant = %self.tenant,
                    function,
                    "store lacks traversal support; returning empty neighborhood"
                );
                Ok(InstanceGraph::default())
            }
            Err(failure) => Err(translate(OP, failure)),
        }
    }
}
