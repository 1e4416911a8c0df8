//! Store port: the narrow interface the core uses to reach a backing store.
//!
//! `StoreFailure` is the low-level failure taxonomy an adapter is allowed
//! to produce. It never crosses the repository facade — the facade maps it
//! onto `MetaGraphError` and nothing above the facade imports this type
//! for error handling.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::types::{
    Classification, InstanceGraph, InstanceStatus, MetadataElement, Page, Relationship,
};

pub type StoreResult<T> = std::result::Result<T, StoreFailure>;

// ── Low-level failures ────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreFailure {
    #[error("element {guid} not found")]
    NotFound { guid: Uuid },

    #[error("element {guid} is held as a proxy only")]
    ProxyOnly { guid: Uuid },

    #[error("relationship {guid} not found")]
    RelationshipNotFound { guid: Uuid },

    #[error("classification {name} is not attached to element {guid}")]
    ClassificationNotFound { guid: Uuid, name: String },

    #[error("version conflict on {guid}: expected {expected}, got {actual}")]
    VersionConflict {
        guid: Uuid,
        expected: i64,
        actual: i64,
    },

    #[error("store does not support {function}")]
    Unsupported { function: String },

    #[error("invalid paging (start_from={start_from}, page_size={page_size}): {message}")]
    InvalidPaging {
        start_from: usize,
        page_size: usize,
        message: String,
    },

    #[error("store unreachable: {0}")]
    Unreachable(anyhow::Error),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

// ── Store-facing ordering ─────────────────────────────────────

/// The store's own ordering representation. The facade owns the
/// translation from the caller-facing `Sequencing` enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOrdering {
    pub key: OrderKey,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderKey {
    CreationTime,
    Property(String),
    Guid,
}

impl Default for StoreOrdering {
    fn default() -> Self {
        Self {
            key: OrderKey::Guid,
            descending: false,
        }
    }
}

// ── Query shapes ──────────────────────────────────────────────

/// Filtered element search.
///
/// Empty filter vectors mean "no constraint", with one exception: an
/// empty `status_filter` excludes soft-deleted instances. A
/// `classification_names` filter requires the element to carry every
/// named classification.
#[derive(Debug, Clone)]
pub struct ElementSearch {
    pub type_names: Vec<String>,
    pub property_filters: BTreeMap<String, serde_json::Value>,
    pub status_filter: Vec<InstanceStatus>,
    pub classification_names: Vec<String>,
    pub as_of: DateTime<Utc>,
    pub ordering: StoreOrdering,
    pub page: Page,
}

/// Relationships attached to one element.
#[derive(Debug, Clone)]
pub struct RelationshipSearch {
    pub element: Uuid,
    pub type_names: Vec<String>,
    pub status_filter: Vec<InstanceStatus>,
    pub as_of: DateTime<Utc>,
    pub ordering: StoreOrdering,
    pub page: Page,
}

/// Bounded breadth-first traversal from a starting element.
///
/// `level` is the maximum hop count; `0` returns only the start element.
/// `classification_filter` requires every named classification, like
/// `ElementSearch`. The start element is exempt from the entity type
/// and classification filters (but not from status or effectivity).
#[derive(Debug, Clone)]
pub struct NeighborhoodQuery {
    pub start: Uuid,
    pub entity_type_filters: Vec<String>,
    pub relationship_type_filters: Vec<String>,
    pub status_filter: Vec<InstanceStatus>,
    pub classification_filter: Vec<String>,
    pub as_of: DateTime<Utc>,
    pub level: u32,
}

// ── The store port ────────────────────────────────────────────

/// One method per store primitive. Implementations own durability and
/// per-GUID concurrency control; `update_*` must reject a write whose
/// version is not exactly one ahead of the stored version.
///
/// Lifecycle primitives (`delete`/`restore`) flip status and bump the
/// version themselves; the handler validates legality before calling.
/// `classify`/`declassify` do NOT bump the element version —
/// classifications are versioned independently of the owning element.
#[async_trait]
pub trait GraphStore: Send + Sync {
    // elements
    async fn create_element(&self, element: MetadataElement) -> StoreResult<MetadataElement>;
    async fn get_element(&self, guid: Uuid) -> StoreResult<MetadataElement>;
    async fn update_element(&self, element: MetadataElement) -> StoreResult<MetadataElement>;
    async fn delete_element(
        &self,
        guid: Uuid,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<MetadataElement>;
    async fn restore_element(
        &self,
        guid: Uuid,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<MetadataElement>;
    async fn purge_element(&self, guid: Uuid) -> StoreResult<()>;

    // classifications (upsert semantics; collision rules live in the handler)
    async fn classify_element(
        &self,
        guid: Uuid,
        classification: Classification,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<MetadataElement>;
    async fn declassify_element(
        &self,
        guid: Uuid,
        classification_name: &str,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<MetadataElement>;

    // relationships
    async fn create_relationship(&self, relationship: Relationship) -> StoreResult<Relationship>;
    async fn get_relationship(&self, guid: Uuid) -> StoreResult<Relationship>;
    async fn update_relationship(&self, relationship: Relationship) -> StoreResult<Relationship>;
    async fn delete_relationship(
        &self,
        guid: Uuid,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Relationship>;
    async fn restore_relationship(
        &self,
        guid: Uuid,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Relationship>;
    async fn purge_relationship(&self, guid: Uuid) -> StoreResult<()>;

    // queries
    async fn find_elements(&self, search: ElementSearch) -> StoreResult<Vec<MetadataElement>>;
    async fn find_elements_by_property_value(
        &self,
        property: &str,
        value: &serde_json::Value,
        type_names: &[String],
        as_of: DateTime<Utc>,
        ordering: StoreOrdering,
        page: Page,
    ) -> StoreResult<Vec<MetadataElement>>;
    async fn find_elements_by_text(
        &self,
        search: &str,
        type_names: &[String],
        as_of: DateTime<Utc>,
        ordering: StoreOrdering,
        page: Page,
    ) -> StoreResult<Vec<MetadataElement>>;
    async fn relationships_for_element(
        &self,
        search: RelationshipSearch,
    ) -> StoreResult<Vec<Relationship>>;

    /// Bounded graph traversal — optional capability. Stores without it
    /// fail with `StoreFailure::Unsupported`.
    async fn neighborhood(&self, query: NeighborhoodQuery) -> StoreResult<InstanceGraph>;
}
