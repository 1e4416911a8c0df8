//! In-memory implementation of the `GraphStore` port.
//!
//! Backs the element and relationship maps with `tokio::sync::RwLock`;
//! per-GUID concurrency control is the optimistic version check in the
//! update primitives. Traversal is a native breadth-first expansion.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet, VecDeque};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use metagraph_core::ports::{
    ElementSearch, GraphStore, NeighborhoodQuery, OrderKey, RelationshipSearch, StoreFailure,
    StoreOrdering, StoreResult,
};
use metagraph_core::types::{
    Classification, InstanceGraph, InstanceStatus, MetadataElement, Page, Relationship,
};

#[derive(Default)]
pub struct MemGraphStore {
    elements: RwLock<HashMap<Uuid, MetadataElement>>,
    relationships: RwLock<HashMap<Uuid, Relationship>>,
}

impl MemGraphStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// ── Filter and ordering helpers ───────────────────────────────

/// Empty filter admits everything except soft-deleted instances.
fn status_admitted(status: InstanceStatus, filter: &[InstanceStatus]) -> bool {
    if filter.is_empty() {
        status != InstanceStatus::Deleted
    } else {
        filter.contains(&status)
    }
}

fn type_admitted(type_name: &str, filter: &[String]) -> bool {
    filter.is_empty() || filter.iter().any(|t| t == type_name)
}

fn value_cmp(a: &serde_json::Value, b: &serde_json::Value) -> Ordering {
    use serde_json::Value;
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn option_value_cmp(a: Option<&serde_json::Value>, b: Option<&serde_json::Value>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => value_cmp(x, y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

/// Sorts with the GUID as a final tiebreak so results are deterministic
/// for equal keys.
fn sort_elements(items: &mut [MetadataElement], ordering: &StoreOrdering) {
    items.sort_by(|a, b| {
        let cmp = match &ordering.key {
            OrderKey::CreationTime => a.audit.created_at.cmp(&b.audit.created_at),
            OrderKey::Property(p) => option_value_cmp(a.properties.get(p), b.properties.get(p)),
            OrderKey::Guid => a.guid.cmp(&b.guid),
        };
        let cmp = if ordering.descending { cmp.reverse() } else { cmp };
        cmp.then_with(|| a.guid.cmp(&b.guid))
    });
}

fn sort_relationships(items: &mut [Relationship], ordering: &StoreOrdering) {
    items.sort_by(|a, b| {
        let cmp = match &ordering.key {
            OrderKey::CreationTime => a.audit.created_at.cmp(&b.audit.created_at),
            OrderKey::Property(p) => option_value_cmp(a.properties.get(p), b.properties.get(p)),
            OrderKey::Guid => a.guid.cmp(&b.guid),
        };
        let cmp = if ordering.descending { cmp.reverse() } else { cmp };
        cmp.then_with(|| a.guid.cmp(&b.guid))
    });
}

fn check_page(page: &Page) -> StoreResult<()> {
    if page.is_valid() {
        Ok(())
    } else {
        Err(StoreFailure::InvalidPaging {
            start_from: page.start_from,
            page_size: page.page_size,
            message: "page_size must be positive".into(),
        })
    }
}

fn element_admitted(element: &MetadataElement, query: &NeighborhoodQuery) -> bool {
    type_admitted(&element.type_name, &query.entity_type_filters)
        && status_admitted(element.status, &query.status_filter)
        && element.effectivity.is_effective_at(query.as_of)
        && query
            .classification_filter
            .iter()
            .all(|name| element.classification(name).is_some())
}

fn relationship_admitted(relationship: &Relationship, query: &NeighborhoodQuery) -> bool {
    type_admitted(&relationship.type_name, &query.relationship_type_filters)
        && status_admitted(relationship.status, &query.status_filter)
        && relationship.effectivity.is_effective_at(query.as_of)
}

// ── GraphStore impl ───────────────────────────────────────────

#[async_trait]
impl GraphStore for MemGraphStore {
    async fn create_element(&self, element: MetadataElement) -> StoreResult<MetadataElement> {
        let mut elements = self.elements.write().await;
        if elements.contains_key(&element.guid) {
            return Err(StoreFailure::Backend(anyhow!(
                "element {} already exists",
                element.guid
            )));
        }
        elements.insert(element.guid, element.clone());
        tracing::trace!(guid = %element.guid, type_name = %element.type_name, "element stored");
        Ok(element)
    }

    async fn get_element(&self, guid: Uuid) -> StoreResult<MetadataElement> {
        self.elements
            .read()
            .await
            .get(&guid)
            .cloned()
            .ok_or(StoreFailure::NotFound { guid })
    }

    async fn update_element(&self, element: MetadataElement) -> StoreResult<MetadataElement> {
        let mut elements = self.elements.write().await;
        let stored = elements
            .get_mut(&element.guid)
            .ok_or(StoreFailure::NotFound { guid: element.guid })?;
        if element.version != stored.version + 1 {
            return Err(StoreFailure::VersionConflict {
                guid: element.guid,
                expected: stored.version + 1,
                actual: element.version,
            });
        }
        if element.type_name != stored.type_name {
            return Err(StoreFailure::Backend(anyhow!(
                "type of {} is immutable",
                element.guid
            )));
        }
        *stored = element.clone();
        Ok(element)
    }

    async fn delete_element(
        &self,
        guid: Uuid,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<MetadataElement> {
        let mut elements = self.elements.write().await;
        let stored = elements
            .get_mut(&guid)
            .ok_or(StoreFailure::NotFound { guid })?;
        if stored.status == InstanceStatus::Deleted {
            return Err(StoreFailure::Backend(anyhow!("{guid} is already deleted")));
        }
        stored.prior_status = Some(stored.status);
        stored.status = InstanceStatus::Deleted;
        stored.version += 1;
        stored.audit.touched(actor, at);
        Ok(stored.clone())
    }

    async fn restore_element(
        &self,
        guid: Uuid,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<MetadataElement> {
        let mut elements = self.elements.write().await;
        let stored = elements
            .get_mut(&guid)
            .ok_or(StoreFailure::NotFound { guid })?;
        if stored.status != InstanceStatus::Deleted {
            return Err(StoreFailure::Backend(anyhow!("{guid} is not deleted")));
        }
        stored.status = stored.prior_status.take().unwrap_or(InstanceStatus::Active);
        stored.version += 1;
        stored.audit.touched(actor, at);
        Ok(stored.clone())
    }

    async fn purge_element(&self, guid: Uuid) -> StoreResult<()> {
        self.elements
            .write()
            .await
            .remove(&guid)
            .map(|_| ())
            .ok_or(StoreFailure::NotFound { guid })
    }

    async fn classify_element(
        &self,
        guid: Uuid,
        classification: Classification,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<MetadataElement> {
        let mut elements = self.elements.write().await;
        let stored = elements
            .get_mut(&guid)
            .ok_or(StoreFailure::NotFound { guid })?;
        match stored
            .classifications
            .iter_mut()
            .find(|c| c.type_name == classification.type_name)
        {
            Some(existing) => *existing = classification,
            None => stored.classifications.push(classification),
        }
        // Classifications are versioned independently of the element.
        stored.audit.touched(actor, at);
        Ok(stored.clone())
    }

    async fn declassify_element(
        &self,
        guid: Uuid,
        classification_name: &str,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<MetadataElement> {
        let mut elements = self.elements.write().await;
        let stored = elements
            .get_mut(&guid)
            .ok_or(StoreFailure::NotFound { guid })?;
        let position = stored
            .classifications
            .iter()
            .position(|c| c.type_name == classification_name)
            .ok_or_else(|| StoreFailure::ClassificationNotFound {
                guid,
                name: classification_name.to_string(),
            })?;
        stored.classifications.remove(position);
        stored.audit.touched(actor, at);
        Ok(stored.clone())
    }

    async fn create_relationship(&self, relationship: Relationship) -> StoreResult<Relationship> {
        let mut relationships = self.relationships.write().await;
        if relationships.contains_key(&relationship.guid) {
            return Err(StoreFailure::Backend(anyhow!(
                "relationship {} already exists",
                relationship.guid
            )));
        }
        relationships.insert(relationship.guid, relationship.clone());
        Ok(relationship)
    }

    async fn get_relationship(&self, guid: Uuid) -> StoreResult<Relationship> {
        self.relationships
            .read()
            .await
            .get(&guid)
            .cloned()
            .ok_or(StoreFailure::RelationshipNotFound { guid })
    }

    async fn update_relationship(&self, relationship: Relationship) -> StoreResult<Relationship> {
        let mut relationships = self.relationships.write().await;
        let stored = relationships
            .get_mut(&relationship.guid)
            .ok_or(StoreFailure::RelationshipNotFound {
                guid: relationship.guid,
            })?;
        if relationship.version != stored.version + 1 {
            return Err(StoreFailure::VersionConflict {
                guid: relationship.guid,
                expected: stored.version + 1,
                actual: relationship.version,
            });
        }
        *stored = relationship.clone();
        Ok(relationship)
    }

    async fn delete_relationship(
        &self,
        guid: Uuid,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Relationship> {
        let mut relationships = self.relationships.write().await;
        let stored = relationships
            .get_mut(&guid)
            .ok_or(StoreFailure::RelationshipNotFound { guid })?;
        if stored.status == InstanceStatus::Deleted {
            return Err(StoreFailure::Backend(anyhow!("{guid} is already deleted")));
        }
        stored.prior_status = Some(stored.status);
        stored.status = InstanceStatus::Deleted;
        stored.version += 1;
        stored.audit.touched(actor, at);
        Ok(stored.clone())
    }

    async fn restore_relationship(
        &self,
        guid: Uuid,
        actor: &str,
        at: DateTime<Utc>,
    ) -> StoreResult<Relationship> {
        let mut relationships = self.relationships.write().await;
        let stored = relationships
            .get_mut(&guid)
            .ok_or(StoreFailure::RelationshipNotFound { guid })?;
        if stored.status != InstanceStatus::Deleted {
            return Err(StoreFailure::Backend(anyhow!("{guid} is not deleted")));
        }
        stored.status = stored.prior_status.take().unwrap_or(InstanceStatus::Active);
        stored.version += 1;
        stored.audit.touched(actor, at);
        Ok(stored.clone())
    }

    async fn purge_relationship(&self, guid: Uuid) -> StoreResult<()> {
        self.relationships
            .write()
            .await
            .remove(&guid)
            .map(|_| ())
            .ok_or(StoreFailure::RelationshipNotFound { guid })
    }

    async fn find_elements(&self, search: ElementSearch) -> StoreResult<Vec<MetadataElement>> {
        check_page(&search.page)?;
        let elements = self.elements.read().await;
        let mut found: Vec<MetadataElement> = elements
            .values()
            .filter(|e| type_admitted(&e.type_name, &search.type_names))
            .filter(|e| status_admitted(e.status, &search.status_filter))
            .filter(|e| e.effectivity.is_effective_at(search.as_of))
            .filter(|e| {
                search
                    .property_filters
                    .iter()
                    .all(|(k, v)| e.properties.get(k) == Some(v))
            })
            .filter(|e| {
                search
                    .classification_names
                    .iter()
                    .all(|name| e.classification(name).is_some())
            })
            .cloned()
            .collect();
        sort_elements(&mut found, &search.ordering);
        Ok(search.page.apply(found))
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
        check_page(&page)?;
        let elements = self.elements.read().await;
        let mut found: Vec<MetadataElement> = elements
            .values()
            .filter(|e| type_admitted(&e.type_name, type_names))
            .filter(|e| status_admitted(e.status, &[]))
            .filter(|e| e.effectivity.is_effective_at(as_of))
            .filter(|e| e.properties.get(property) == Some(value))
            .cloned()
            .collect();
        sort_elements(&mut found, &ordering);
        Ok(page.apply(found))
    }

    /// Case-insensitive substring match over string property values.
    async fn find_elements_by_text(
        &self,
        search: &str,
        type_names: &[String],
        as_of: DateTime<Utc>,
        ordering: StoreOrdering,
        page: Page,
    ) -> StoreResult<Vec<MetadataElement>> {
        check_page(&page)?;
        let needle = search.to_lowercase();
        let elements = self.elements.read().await;
        let mut found: Vec<MetadataElement> = elements
            .values()
            .filter(|e| type_admitted(&e.type_name, type_names))
            .filter(|e| status_admitted(e.status, &[]))
            .filter(|e| e.effectivity.is_effective_at(as_of))
            .filter(|e| {
                e.properties.0.values().any(|v| {
                    v.as_str()
                        .map(|s| s.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                })
            })
            .cloned()
            .collect();
        sort_elements(&mut found, &ordering);
        Ok(page.apply(found))
    }

    async fn relationships_for_element(
        &self,
        search: RelationshipSearch,
    ) -> StoreResult<Vec<Relationship>> {
        check_page(&search.page)?;
        let relationships = self.relationships.read().await;
        let mut found: Vec<Relationship> = relationships
            .values()
            .filter(|r| r.end_one.guid == search.element || r.end_two.guid == search.element)
            .filter(|r| type_admitted(&r.type_name, &search.type_names))
            .filter(|r| status_admitted(r.status, &search.status_filter))
            .filter(|r| r.effectivity.is_effective_at(search.as_of))
            .cloned()
            .collect();
        sort_relationships(&mut found, &search.ordering);
        Ok(search.page.apply(found))
    }

    /// Breadth-first expansion from the start element. Each element is
    /// expanded at most once (cycle-safe) and expansion stops at `level`
    /// hops regardless of remaining reachable nodes. The start element is
    /// exempt from the entity type and classification filters but must
    /// pass the status and effectivity checks itself.
    async fn neighborhood(&self, query: NeighborhoodQuery) -> StoreResult<InstanceGraph> {
        let elements = self.elements.read().await;
        let relationships = self.relationships.read().await;

        let start = elements
            .get(&query.start)
            .ok_or(StoreFailure::NotFound { guid: query.start })?;
        if !status_admitted(start.status, &query.status_filter)
            || !start.effectivity.is_effective_at(query.as_of)
        {
            return Err(StoreFailure::NotFound { guid: query.start });
        }

        let mut visited: HashSet<Uuid> = HashSet::from([query.start]);
        let mut queue: VecDeque<(Uuid, u32)> = VecDeque::from([(query.start, 0)]);
        let mut out_elements: Vec<MetadataElement> = Vec::new();
        let mut seen_relationships: HashSet<Uuid> = HashSet::new();
        let mut out_relationships: Vec<Relationship> = Vec::new();

        while let Some((guid, depth)) = queue.pop_front() {
            let Some(element) = elements.get(&guid) else {
                continue;
            };
            out_elements.push(element.clone());
            if depth >= query.level {
                continue;
            }
            for relationship in relationships.values() {
                let Some(far) = relationship.other_end(guid) else {
                    continue;
                };
                if !relationship_admitted(relationship, &query) {
                    continue;
                }
                let Some(far_element) = elements.get(&far.guid) else {
                    continue;
                };
                if !element_admitted(far_element, &query) {
                    continue;
                }
                if seen_relationships.insert(relationship.guid) {
                    out_relationships.push(relationship.clone());
                }
                if visited.insert(far_element.guid) {
                    queue.push_back((far_element.guid, depth + 1));
                }
            }
        }

        out_elements.sort_by_key(|e| e.guid);
        out_relationships.sort_by_key(|r| r.guid);
        tracing::trace!(
            start = %query.start,
            level = query.level,
            elements = out_elements.len(),
            relationships = out_relationships.len(),
            "neighborhood expanded"
        );
        Ok(InstanceGraph {
            elements: out_elements,
            relationships: out_relationships,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metagraph_core::types::{EffectivityWindow, InstanceProperties, ProvenanceAudit};

    fn element(type_name: &str, props: &[(&str, serde_json::Value)]) -> MetadataElement {
        MetadataElement {
            guid: Uuid::new_v4(),
            type_name: type_name.into(),
            properties: props
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            status: InstanceStatus::Active,
            prior_status: None,
            version: 1,
            audit: ProvenanceAudit::on_create("test", Utc::now()),
            effectivity: EffectivityWindow::always(),
            classifications: Vec::new(),
        }
    }

    fn link(type_name: &str, a: &MetadataElement, b: &MetadataElement) -> Relationship {
        Relationship {
            guid: Uuid::new_v4(),
            type_name: type_name.into(),
            properties: InstanceProperties::new(),
            status: InstanceStatus::Active,
            prior_status: None,
            version: 1,
            audit: ProvenanceAudit::on_create("test", Utc::now()),
            effectivity: EffectivityWindow::always(),
            end_one: a.proxy(),
            end_two: b.proxy(),
        }
    }

    fn query(start: Uuid, level: u32) -> NeighborhoodQuery {
        NeighborhoodQuery {
            start,
            entity_type_filters: Vec::new(),
            relationship_type_filters: Vec::new(),
            status_filter: Vec::new(),
            classification_filter: Vec::new(),
            as_of: Utc::now(),
            level,
        }
    }

    #[tokio::test]
    async fn update_rejects_stale_version() {
        let store = MemGraphStore::new();
        let created = store
            .create_element(element("asset", &[]))
            .await
            .unwrap();

        let mut stale = created.clone();
        stale.version = created.version; // not bumped
        let err = store.update_element(stale).await.unwrap_err();
        assert!(matches!(err, StoreFailure::VersionConflict { .. }));

        let mut fresh = created;
        fresh.version += 1;
        assert!(store.update_element(fresh).await.is_ok());
    }

    #[tokio::test]
    async fn delete_restore_round_trip_retains_prior_status() {
        let store = MemGraphStore::new();
        let mut draft = element("asset", &[]);
        draft.status = InstanceStatus::Draft;
        let created = store.create_element(draft).await.unwrap();

        let deleted = store
            .delete_element(created.guid, "t", Utc::now())
            .await
            .unwrap();
        assert_eq!(deleted.status, InstanceStatus::Deleted);
        assert_eq!(deleted.prior_status, Some(InstanceStatus::Draft));
        assert_eq!(deleted.version, 2);

        let restored = store
            .restore_element(created.guid, "t", Utc::now())
            .await
            .unwrap();
        assert_eq!(restored.status, InstanceStatus::Draft);
        assert_eq!(restored.prior_status, None);
        assert_eq!(restored.version, 3);
    }

    #[tokio::test]
    async fn classify_upserts_without_version_bump() {
        let store = MemGraphStore::new();
        let created = store
            .create_element(element("asset", &[]))
            .await
            .unwrap();

        let first = Classification::new(
            "confidentiality",
            [("level".to_string(), serde_json::json!(1))]
                .into_iter()
                .collect(),
        );
        let after = store
            .classify_element(created.guid, first, "t", Utc::now())
            .await
            .unwrap();
        assert_eq!(after.classifications.len(), 1);
        assert_eq!(after.version, created.version);

        let second = Classification::new(
            "confidentiality",
            [("level".to_string(), serde_json::json!(2))]
                .into_iter()
                .collect(),
        );
        let after = store
            .classify_element(created.guid, second, "t", Utc::now())
            .await
            .unwrap();
        assert_eq!(after.classifications.len(), 1);
        assert_eq!(
            after.classifications[0].properties.get("level"),
            Some(&serde_json::json!(2))
        );
    }

    #[tokio::test]
    async fn declassify_unknown_name_fails() {
        let store = MemGraphStore::new();
        let created = store
            .create_element(element("asset", &[]))
            .await
            .unwrap();
        let err = store
            .declassify_element(created.guid, "missing", "t", Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreFailure::ClassificationNotFound { .. }));
    }

    #[tokio::test]
    async fn find_elements_by_text_is_case_insensitive() {
        let store = MemGraphStore::new();
        store
            .create_element(element(
                "asset",
                &[("display_name", serde_json::json!("Customer Ledger"))],
            ))
            .await
            .unwrap();
        store
            .create_element(element(
                "asset",
                &[("display_name", serde_json::json!("inventory"))],
            ))
            .await
            .unwrap();

        let found = store
            .find_elements_by_text(
                "LEDGER",
                &[],
                Utc::now(),
                StoreOrdering::default(),
                Page::default(),
            )
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    #[tokio::test]
    async fn neighborhood_level_zero_returns_only_start() {
        let store = MemGraphStore::new();
        let a = store.create_element(element("asset", &[])).await.unwrap();
        let b = store.create_element(element("asset", &[])).await.unwrap();
        store
            .create_relationship(link("linked_to", &a, &b))
            .await
            .unwrap();

        let graph = store.neighborhood(query(a.guid, 0)).await.unwrap();
        assert_eq!(graph.elements.len(), 1);
        assert_eq!(graph.elements[0].guid, a.guid);
        assert!(graph.relationships.is_empty());
    }

    #[tokio::test]
    async fn neighborhood_diamond_visits_each_node_once() {
        // a → b, a → c, b → d, c → d: two paths of length 2 reach d.
        let store = MemGraphStore::new();
        let a = store.create_element(element("asset", &[])).await.unwrap();
        let b = store.create_element(element("asset", &[])).await.unwrap();
        let c = store.create_element(element("asset", &[])).await.unwrap();
        let d = store.create_element(element("asset", &[])).await.unwrap();
        for (x, y) in [(&a, &b), (&a, &c), (&b, &d), (&c, &d)] {
            store
                .create_relationship(link("linked_to", x, y))
                .await
                .unwrap();
        }

        let graph = store.neighborhood(query(a.guid, 3)).await.unwrap();
        assert_eq!(graph.elements.len(), 4);
        assert_eq!(graph.relationships.len(), 4);
        let unique: HashSet<Uuid> = graph.elements.iter().map(|e| e.guid).collect();
        assert_eq!(unique.len(), 4);
    }

    #[tokio::test]
    async fn neighborhood_cycle_terminates() {
        let store = MemGraphStore::new();
        let a = store.create_element(element("asset", &[])).await.unwrap();
        let b = store.create_element(element("asset", &[])).await.unwrap();
        store
            .create_relationship(link("linked_to", &a, &b))
            .await
            .unwrap();
        store
            .create_relationship(link("linked_to", &b, &a))
            .await
            .unwrap();

        let graph = store.neighborhood(query(a.guid, 10)).await.unwrap();
        assert_eq!(graph.elements.len(), 2);
        assert_eq!(graph.relationships.len(), 2);
    }

    #[tokio::test]
    async fn neighborhood_level_bound_is_respected() {
        // chain a → b → c: level 1 must not reach c.
        let store = MemGraphStore::new();
        let a = store.create_element(element("asset", &[])).await.unwrap();
        let b = store.create_element(element("asset", &[])).await.unwrap();
        let c = store.create_element(element("asset", &[])).await.unwrap();
        store
            .create_relationship(link("linked_to", &a, &b))
            .await
            .unwrap();
        store
            .create_relationship(link("linked_to", &b, &c))
            .await
            .unwrap();

        let graph = store.neighborhood(query(a.guid, 1)).await.unwrap();
        let guids: HashSet<Uuid> = graph.elements.iter().map(|e| e.guid).collect();
        assert!(guids.contains(&a.guid));
        assert!(guids.contains(&b.guid));
        assert!(!guids.contains(&c.guid));
    }

    #[tokio::test]
    async fn find_elements_ordering_by_property_descending() {
        let store = MemGraphStore::new();
        for (name, size) in [("small", 1), ("big", 9), ("mid", 5)] {
            store
                .create_element(element(
                    "asset",
                    &[
                        ("display_name", serde_json::json!(name)),
                        ("size", serde_json::json!(size)),
                    ],
                ))
                .await
                .unwrap();
        }
        let found = store
            .find_elements(ElementSearch {
                type_names: vec!["asset".into()],
                property_filters: Default::default(),
                status_filter: Vec::new(),
                classification_names: Vec::new(),
                as_of: Utc::now(),
                ordering: StoreOrdering {
                    key: OrderKey::Property("size".into()),
                    descending: true,
                },
                page: Page::default(),
            })
            .await
            .unwrap();
        let names: Vec<&str> = found
            .iter()
            .filter_map(|e| e.properties.get("display_name").and_then(|v| v.as_str()))
            .collect();
        assert_eq!(names, vec!["big", "mid", "small"]);
    }

    #[tokio::test]
    async fn zero_page_size_is_invalid_paging() {
        let store = MemGraphStore::new();
        let err = store
            .find_elements(ElementSearch {
                type_names: Vec::new(),
                property_filters: Default::default(),
                status_filter: Vec::new(),
                classification_names: Vec::new(),
                as_of: Utc::now(),
                ordering: StoreOrdering::default(),
                page: Page::new(0, 0),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreFailure::InvalidPaging { .. }));
    }
}
