//! Test doubles for exercising handler behavior against degraded stores.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use metagraph_core::ports::{
    ElementSearch, GraphStore, NeighborhoodQuery, RelationshipSearch, StoreFailure, StoreOrdering,
    StoreResult,
};
use metagraph_core::types::{
    Classification, InstanceGraph, MetadataElement, Page, Relationship,
};

/// Delegates every primitive to the wrapped store but reports traversal
/// as an unsupported capability, the way a store without native graph
/// expansion would.
pub struct UnsupportedTraversalStore {
    inner: Arc<dyn GraphStore>,
}

impl UnsupportedTraversalStore {
    pub fn new(inner: Arc<dyn GraphStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl GraphStore for UnsupportedTraversalStore {
    async fn create_element(&self, element: MetadataElement) -> StoreResult<MetadataElement> {
        self.inner.create_element(element).await
    }

    async fn get_element(&self, guid: Uuid) -> StoreResult<MetadataElement> {
        self.inner.get_element(guid).await
    }

    async fn update_element(&self, element: MetadataElement) -> StoreResult<MetadataElement> {
        self.inner.update_element(element).await
    }

    async fn delete_element(
        &self,
        guid: Uuid,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<MetadataElement> {
        self.inner.delete_element(guid, actor, at).await
    }

    async fn restore_element(
        &self,
        guid: Uuid,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<MetadataElement> {
        self.inner.restore_element(guid, actor, at).await
    }

    async fn purge_element(&self, guid: Uuid) -> StoreResult<()> {
        self.inner.purge_element(guid).await
    }

    async fn classify_element(
        &self,
        guid: Uuid,
        classification: Classification,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<MetadataElement> {
        self.inner
            .classify_element(guid, classification, actor, at)
            .await
    }

    async fn declassify_element(
        &self,
        guid: Uuid,
        classification_name: &str,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<MetadataElement> {
        self.inner
            .declassify_element(guid, classification_name, actor, at)
            .await
    }

    async fn create_relationship(&self, relationship: Relationship) -> StoreResult<Relationship> {
        self.inner.create_relationship(relationship).await
    }

    async fn get_relationship(&self, guid: Uuid) -> StoreResult<Relationship> {
        self.inner.get_relationship(guid).await
    }

    async fn update_relationship(&self, relationship: Relationship) -> StoreResult<Relationship> {
        self.inner.update_relationship(relationship).await
    }

    async fn delete_relationship(
        &self,
        guid: Uuid,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Relationship> {
        self.inner.delete_relationship(guid, actor, at).await
    }

    async fn restore_relationship(
        &self,
        guid: Uuid,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Relationship> {
        self.inner.restore_relationship(guid, actor, at).await
    }

    async fn purge_relationship(&self, guid: Uuid) -> StoreResult<()> {
        self.inner.purge_relationship(guid).await
    }

    async fn find_elements(&self, search: ElementSearch) -> StoreResult<Vec<MetadataElement>> {
        self.inner.find_elements(search).await
    }

    async fn find_elements_by_property_value(
        &self,
        property: &str,
        value: &serde_json::Value,
        type_names: &[String],
        as_of: DateTime<Utc>,
        ordering: StoreOrdering,
        page: Page,
    ) -> StoreResult<Vec<MetadataElement>> {
        self.inner
            .find_elements_by_property_value(property, value, type_names, as_of, ordering, page)
            .await
    }

    async fn find_elements_by_text(
        &self,
        search: &str,
        type_names: &[String],
        as_of: DateTime<Utc>,
        ordering: StoreOrdering,
        page: Page,
    ) -> StoreResult<Vec<MetadataElement>> {
        self.inner
            .find_elements_by_text(search, type_names, as_of, ordering, page)
            .await
    }

    async fn relationships_for_element(
        &self,
        search: RelationshipSearch,
    ) -> StoreResult<Vec<Relationship>> {
        self.inner.relationships_for_element(search).await
    }

    async fn neighborhood(&self, _query: NeighborhoodQuery) -> StoreResult<InstanceGraph> {
        Err(StoreFailure::Unsupported {
            function: "neighborhood".into(),
        })
    }
}
