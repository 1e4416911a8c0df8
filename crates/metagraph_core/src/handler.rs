//! Metadata element handler: the CRUD/traversal surface of the core.
//!
//! The handler enforces type correctness and the lifecycle state machine,
//! applies zone visibility, and drives classification reconciliation.
//! It is stateless per call — each public operation is an independent
//! unit of work against the store, safe to invoke concurrently; conflicts
//! on the same GUID surface as retryable repository errors from the
//! store's optimistic version check.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{MetaGraphError, Result};
use crate::facade::{store_ordering, RepositoryFacade};
use crate::identity::CallerIdentity;
use crate::ports::{ElementSearch, NeighborhoodQuery, RelationshipSearch, StoreOrdering};
use crate::reconcile::{reconcile, ReconcileResult};
use crate::type_registry::{TypeCategory, TypeRegistry};
use crate::types::{
    Classification, EffectivityWindow, InstanceGraph, InstanceProperties, InstanceStatus,
    MetadataElement, Page, ProvenanceAudit, Relationship, Sequencing, UpdateMode,
};

/// Well-known property naming the zones an element belongs to.
/// Allowed on every element type without declaration.
pub const ZONE_MEMBERSHIP_PROPERTY: &str = "zone_membership";

/// Per-handler visibility configuration.
#[derive(Debug, Clone, Default)]
pub struct HandlerOptions {
    /// When set, an element tagged with zones must share at least one
    /// with this set to be visible. Untagged elements are always visible.
    pub supported_zones: Option<HashSet<String>>,
}

// ── Request shapes ────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct NewElement {
    pub type_name: String,
    pub properties: InstanceProperties,
    pub initial_status: Option<InstanceStatus>,
    pub effectivity: EffectivityWindow,
}

impl NewElement {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            properties: InstanceProperties::new(),
            initial_status: None,
            effectivity: EffectivityWindow::always(),
        }
    }

    pub fn with_properties(mut self, properties: InstanceProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_initial_status(mut self, status: InstanceStatus) -> Self {
        self.initial_status = Some(status);
        self
    }

    pub fn with_effectivity(mut self, effectivity: EffectivityWindow) -> Self {
        self.effectivity = effectivity;
        self
    }
}

#[derive(Debug, Clone)]
pub struct NewRelationship {
    pub type_name: String,
    pub properties: InstanceProperties,
    pub initial_status: Option<InstanceStatus>,
    pub effectivity: EffectivityWindow,
    pub end_one: Uuid,
    pub end_two: Uuid,
}

impl NewRelationship {
    pub fn new(type_name: impl Into<String>, end_one: Uuid, end_two: Uuid) -> Self {
        Self {
            type_name: type_name.into(),
            properties: InstanceProperties::new(),
            initial_status: None,
            effectivity: EffectivityWindow::always(),
            end_one,
            end_two,
        }
    }

    pub fn with_properties(mut self, properties: InstanceProperties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_initial_status(mut self, status: InstanceStatus) -> Self {
        self.initial_status = Some(status);
        self
    }
}

/// Filtered element search request.
#[derive(Debug, Clone, Default)]
pub struct FindRequest {
    pub type_names: Vec<String>,
    pub property_filters: BTreeMap<String, serde_json::Value>,
    pub status_filter: Vec<InstanceStatus>,
    pub classification_names: Vec<String>,
    pub as_of: Option<DateTime<Utc>>,
    pub sequencing: Sequencing,
    pub page: Page,
}

/// Bounded neighborhood traversal request.
#[derive(Debug, Clone)]
pub struct NeighborhoodRequest {
    pub start: Uuid,
    pub entity_type_filters: Vec<String>,
    pub relationship_type_filters: Vec<String>,
    pub status_filter: Vec<InstanceStatus>,
    pub classification_filter: Vec<String>,
    pub as_of: Option<DateTime<Utc>>,
    pub level: u32,
}

impl NeighborhoodRequest {
    pub fn new(start: Uuid, level: u32) -> Self {
        Self {
            start,
            entity_type_filters: Vec::new(),
            relationship_type_filters: Vec::new(),
            status_filter: Vec::new(),
            classification_filter: Vec::new(),
            as_of: None,
            level,
        }
    }
}

// ── Visibility helpers ────────────────────────────────────────

/// Zone rule: an element is visible when it carries no zone tags, or
/// when at least one of its zones is in the supported set. A handler
/// with no supported-zone restriction sees everything.
pub(crate) fn zone_visible(
    supported: &Option<HashSet<String>>,
    properties: &InstanceProperties,
) -> bool {
    let Some(supported) = supported else {
        return true;
    };
    match properties.get(ZONE_MEMBERSHIP_PROPERTY) {
        Some(serde_json::Value::Array(zones)) if !zones.is_empty() => zones
            .iter()
            .filter_map(|z| z.as_str())
            .any(|z| supported.contains(z)),
        _ => true,
    }
}

fn effective_time(as_of: Option<DateTime<Utc>>) -> DateTime<Utc> {
    as_of.unwrap_or_else(Utc::now)
}

// ── Handler ───────────────────────────────────────────────────

pub struct MetadataHandler {
    facade: RepositoryFacade,
    registry: Arc<TypeRegistry>,
    options: HandlerOptions,
}

impl MetadataHandler {
    pub fn new(facade: RepositoryFacade, registry: Arc<TypeRegistry>) -> Self {
        Self {
            facade,
            registry,
            options: HandlerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: HandlerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    // ── Validation helpers ────────────────────────────────────

    fn validate_properties(&self, type_name: &str, properties: &InstanceProperties) -> Result<()> {
        for name in properties.names() {
            if name == ZONE_MEMBERSHIP_PROPERTY {
                continue;
            }
            if !self.registry.property_defined(type_name, name)? {
                return Err(MetaGraphError::PropertyError {
                    property: name.to_string(),
                    message: format!("not defined for type {type_name}"),
                });
            }
        }
        Ok(())
    }

    fn validate_effectivity(&self, window: &EffectivityWindow) -> Result<()> {
        if window.is_well_formed() {
            Ok(())
        } else {
            Err(MetaGraphError::invalid_parameter(
                "effectivity",
                "effective_to must be after effective_from",
            ))
        }
    }

    fn validate_page(&self, page: &Page) -> Result<()> {
        if page.is_valid() {
            Ok(())
        } else {
            Err(MetaGraphError::PagingError {
                start_from: page.start_from,
                page_size: page.page_size,
                message: "page_size must be positive".into(),
            })
        }
    }

    fn resolve_initial_status(
        &self,
        type_name: &str,
        initial: Option<InstanceStatus>,
    ) -> Result<InstanceStatus> {
        let status = initial.unwrap_or(InstanceStatus::Active);
        if matches!(status, InstanceStatus::Deleted | InstanceStatus::Unknown)
            || !self.registry.status_legal(type_name, status)?
        {
            return Err(MetaGraphError::StatusNotSupported {
                type_name: type_name.to_string(),
                status,
            });
        }
        Ok(status)
    }

    fn validate_sequencing(&self, type_names: &[String], sequencing: &Sequencing) -> Result<()> {
        let Some(property) = sequencing.property() else {
            return Ok(());
        };
        if property.is_empty() {
            return Err(MetaGraphError::PropertyError {
                property: property.to_string(),
                message: "sequencing property name is empty".into(),
            });
        }
        if type_names.is_empty() {
            return Ok(());
        }
        for type_name in type_names {
            if self.registry.property_defined(type_name, property)? {
                return Ok(());
            }
        }
        Err(MetaGraphError::PropertyError {
            property: property.to_string(),
            message: "sequencing property is not defined for the requested types".into(),
        })
    }

    fn require_types(&self, type_names: &[String], category: TypeCategory) -> Result<()> {
        for name in type_names {
            self.registry.require_category(name, category)?;
        }
        Ok(())
    }

    /// Raw fetch plus the zone guard. Soft-deleted elements still come
    /// back — lifecycle operations need them.
    async fn guarded_element(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
    ) -> Result<MetadataElement> {
        let element = self.facade.get_element(caller, guid).await?;
        if !zone_visible(&self.options.supported_zones, &element.properties) {
            return Err(MetaGraphError::EntityNotKnown { guid });
        }
        Ok(element)
    }

    /// Fetch for mutation: must exist, be zone-visible, and not be
    /// soft-deleted.
    async fn mutable_element(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
    ) -> Result<MetadataElement> {
        let element = self.guarded_element(caller, guid).await?;
        if element.status == InstanceStatus::Deleted {
            return Err(MetaGraphError::EntityNotKnown { guid });
        }
        Ok(element)
    }

    async fn mutable_relationship(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
    ) -> Result<Relationship> {
        let relationship = self.facade.get_relationship(caller, guid).await?;
        if relationship.status == InstanceStatus::Deleted {
            return Err(MetaGraphError::RelationshipNotKnown { guid });
        }
        Ok(relationship)
    }

    /// Store-side page for list calls. Under a zone restriction the
    /// requested window must be applied after the zone filter, so the
    /// store fetch is unpaged and `window_visible` pages the survivors.
    fn store_page(&self, page: Page) -> Page {
        if self.options.supported_zones.is_some() {
            Page::new(0, usize::MAX)
        } else {
            page
        }
    }

    fn window_visible(&self, page: &Page, items: Vec<MetadataElement>) -> Vec<MetadataElement> {
        let visible: Vec<MetadataElement> = items
            .into_iter()
            .filter(|e| zone_visible(&self.options.supported_zones, &e.properties))
            .collect();
        if self.options.supported_zones.is_some() {
            page.apply(visible)
        } else {
            visible
        }
    }

    fn element_visible_at(&self, element: &MetadataElement, at: DateTime<Utc>) -> bool {
        element.status != InstanceStatus::Deleted
            && element.effectivity.is_effective_at(at)
            && zone_visible(&self.options.supported_zones, &element.properties)
    }

    // ── Element operations ────────────────────────────────────

    pub async fn create_element(
        &self,
        caller: &CallerIdentity,
        request: NewElement,
    ) -> Result<MetadataElement> {
        let def = self
            .registry
            .require_category(&request.type_name, TypeCategory::Entity)?;
        self.validate_properties(&def.name, &request.properties)?;
        self.validate_effectivity(&request.effectivity)?;
        let status = self.resolve_initial_status(&def.name, request.initial_status)?;

        let now = Utc::now();
        let element = MetadataElement {
            guid: Uuid::new_v4(),
            type_name: def.name.clone(),
            properties: request.properties,
            status,
            prior_status: None,
            version: 1,
            audit: ProvenanceAudit::on_create(&caller.actor_id, now),
            effectivity: request.effectivity,
            classifications: Vec::new(),
        };
        let created = self.facade.create_element(caller, element).await?;
        tracing::info!(guid = %created.guid, type_name = %created.type_name, "element created");
        Ok(created)
    }

    pub async fn get_element_by_guid(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<MetadataElement> {
        let at = effective_time(as_of);
        let element = self.facade.get_element(caller, guid).await?;
        if !self.element_visible_at(&element, at) {
            return Err(MetaGraphError::EntityNotKnown { guid });
        }
        Ok(element)
    }

    /// Looks an element up by a property expected to hold a unique value.
    /// More than one effective match is a property error.
    pub async fn get_element_by_unique_name(
        &self,
        caller: &CallerIdentity,
        property: &str,
        value: &str,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Option<MetadataElement>> {
        if property.is_empty() {
            return Err(MetaGraphError::invalid_parameter(
                "property",
                "unique-name property must not be empty",
            ));
        }
        let at = effective_time(as_of);
        let matches = self
            .facade
            .find_elements_by_property_value(
                caller,
                property,
                &serde_json::Value::String(value.to_string()),
                &[],
                at,
                StoreOrdering::default(),
                // Two candidates decide uniqueness, but zone-hidden
                // duplicates may sort first, so a zoned handler fetches
                // everything before filtering.
                self.store_page(Page::new(0, 2)),
            )
            .await?;
        let mut visible: Vec<MetadataElement> = matches
            .into_iter()
            .filter(|e| self.element_visible_at(e, at))
            .collect();
        match visible.len() {
            0 => Ok(None),
            1 => Ok(Some(visible.remove(0))),
            _ => Err(MetaGraphError::PropertyError {
                property: property.to_string(),
                message: format!("value {value:?} is not unique"),
            }),
        }
    }

    pub async fn get_guid_by_unique_name(
        &self,
        caller: &CallerIdentity,
        property: &str,
        value: &str,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Option<Uuid>> {
        Ok(self
            .get_element_by_unique_name(caller, property, value, as_of)
            .await?
            .map(|e| e.guid))
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn find_elements_by_string(
        &self,
        caller: &CallerIdentity,
        search: &str,
        type_names: &[String],
        as_of: Option<DateTime<Utc>>,
        sequencing: Sequencing,
        page: Page,
    ) -> Result<Vec<MetadataElement>> {
        if search.is_empty() {
            return Err(MetaGraphError::invalid_parameter(
                "search",
                "search string must not be empty",
            ));
        }
        self.validate_page(&page)?;
        self.require_types(type_names, TypeCategory::Entity)?;
        self.validate_sequencing(type_names, &sequencing)?;
        let at = effective_time(as_of);
        let found = self
            .facade
            .find_elements_by_text(
                caller,
                search,
                &self.registry.with_subtypes(type_names),
                at,
                store_ordering(&sequencing),
                self.store_page(page),
            )
            .await?;
        Ok(self.window_visible(&page, found))
    }

    pub async fn find_elements(
        &self,
        caller: &CallerIdentity,
        request: FindRequest,
    ) -> Result<Vec<MetadataElement>> {
        self.validate_page(&request.page)?;
        self.require_types(&request.type_names, TypeCategory::Entity)?;
        self.require_types(&request.classification_names, TypeCategory::Classification)?;
        self.validate_sequencing(&request.type_names, &request.sequencing)?;
        if !request.type_names.is_empty() {
            for property in request.property_filters.keys() {
                let defined = {
                    let mut any = false;
                    for type_name in &request.type_names {
                        if self.registry.property_defined(type_name, property)? {
                            any = true;
                            break;
                        }
                    }
                    any
                };
                if !defined && property != ZONE_MEMBERSHIP_PROPERTY {
                    return Err(MetaGraphError::PropertyError {
                        property: property.clone(),
                        message: "filter property is not defined for the requested types".into(),
                    });
                }
            }
        }

        let at = effective_time(request.as_of);
        let search = ElementSearch {
            type_names: self.registry.with_subtypes(&request.type_names),
            property_filters: request.property_filters,
            status_filter: request.status_filter,
            classification_names: request.classification_names,
            as_of: at,
            ordering: store_ordering(&request.sequencing),
            page: self.store_page(request.page),
        };
        let found = self.facade.find_elements(caller, search).await?;
        Ok(self.window_visible(&request.page, found))
    }

    pub async fn update_element_properties(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        properties: InstanceProperties,
        mode: UpdateMode,
    ) -> Result<MetadataElement> {
        let mut element = self.mutable_element(caller, guid).await?;
        self.validate_properties(&element.type_name, &properties)?;
        match mode {
            UpdateMode::Replace => element.properties = properties,
            UpdateMode::Merge => element.properties.merge(properties),
        }
        element.version += 1;
        element.audit.touched(&caller.actor_id, Utc::now());
        self.facade.update_element(caller, element).await
    }

    pub async fn update_element_status(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        status: InstanceStatus,
    ) -> Result<MetadataElement> {
        let mut element = self.mutable_element(caller, guid).await?;
        // Deleted is only reachable through delete; Unknown is never a target.
        if matches!(status, InstanceStatus::Deleted | InstanceStatus::Unknown)
            || !self.registry.status_legal(&element.type_name, status)?
        {
            return Err(MetaGraphError::StatusNotSupported {
                type_name: element.type_name,
                status,
            });
        }
        element.status = status;
        element.version += 1;
        element.audit.touched(&caller.actor_id, Utc::now());
        self.facade.update_element(caller, element).await
    }

    pub async fn update_element_effectivity(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        effectivity: EffectivityWindow,
    ) -> Result<MetadataElement> {
        self.validate_effectivity(&effectivity)?;
        let mut element = self.mutable_element(caller, guid).await?;
        element.effectivity = effectivity;
        element.version += 1;
        element.audit.touched(&caller.actor_id, Utc::now());
        self.facade.update_element(caller, element).await
    }

    pub async fn delete_element(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
    ) -> Result<MetadataElement> {
        let element = self.guarded_element(caller, guid).await?;
        if element.status == InstanceStatus::Deleted {
            return Err(MetaGraphError::invalid_parameter(
                "guid",
                format!("element {guid} is already deleted"),
            ));
        }
        let deleted = self.facade.delete_element(caller, guid, Utc::now()).await?;
        tracing::info!(guid = %guid, "element soft-deleted");
        Ok(deleted)
    }

    pub async fn restore_element(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
    ) -> Result<MetadataElement> {
        let element = self.guarded_element(caller, guid).await?;
        if element.status != InstanceStatus::Deleted {
            return Err(MetaGraphError::EntityNotDeleted { guid });
        }
        let restored = self.facade.restore_element(caller, guid, Utc::now()).await?;
        tracing::info!(guid = %guid, status = %restored.status, "element restored");
        Ok(restored)
    }

    /// Permanent destruction — admin only, and only from `Deleted`.
    pub async fn purge_element(&self, caller: &CallerIdentity, guid: Uuid) -> Result<()> {
        caller.require_admin("purge-element")?;
        let element = self.guarded_element(caller, guid).await?;
        if element.status != InstanceStatus::Deleted {
            return Err(MetaGraphError::EntityNotDeleted { guid });
        }
        self.facade.purge_element(caller, guid).await?;
        tracing::info!(guid = %guid, "element purged");
        Ok(())
    }

    // ── Classification operations ─────────────────────────────

    pub async fn classify(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        classification_name: &str,
        properties: InstanceProperties,
        effectivity: EffectivityWindow,
    ) -> Result<MetadataElement> {
        self.validate_effectivity(&effectivity)?;
        let element = self.mutable_element(caller, guid).await?;
        let cls = self
            .registry
            .require_category(classification_name, TypeCategory::Classification)?;
        self.validate_properties(&cls.name, &properties)?;
        self.registry
            .classification_attachable(cls, &element.type_name)?;
        if element.classification(classification_name).is_some() {
            return Err(MetaGraphError::ClassificationError {
                element: guid,
                classification: classification_name.to_string(),
                message: "already attached; reclassify to update it".into(),
            });
        }
        self.facade
            .classify_element(
                caller,
                guid,
                Classification {
                    type_name: cls.name.clone(),
                    properties,
                    effectivity,
                },
                Utc::now(),
            )
            .await
    }

    pub async fn reclassify(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        classification_name: &str,
        properties: InstanceProperties,
        mode: UpdateMode,
    ) -> Result<MetadataElement> {
        let element = self.mutable_element(caller, guid).await?;
        let cls = self
            .registry
            .require_category(classification_name, TypeCategory::Classification)?;
        self.validate_properties(&cls.name, &properties)?;
        let Some(existing) = element.classification(classification_name) else {
            return Err(MetaGraphError::ClassificationError {
                element: guid,
                classification: classification_name.to_string(),
                message: "not attached".into(),
            });
        };
        let new_properties = match mode {
            UpdateMode::Replace => properties,
            UpdateMode::Merge => {
                let mut merged = existing.properties.clone();
                merged.merge(properties);
                merged
            }
        };
        self.facade
            .classify_element(
                caller,
                guid,
                Classification {
                    type_name: cls.name.clone(),
                    properties: new_properties,
                    effectivity: existing.effectivity,
                },
                Utc::now(),
            )
            .await
    }

    pub async fn unclassify(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        classification_name: &str,
    ) -> Result<MetadataElement> {
        let element = self.mutable_element(caller, guid).await?;
        if element.classification(classification_name).is_none() {
            return Err(MetaGraphError::ClassificationError {
                element: guid,
                classification: classification_name.to_string(),
                message: "not attached".into(),
            });
        }
        self.facade
            .declassify_element(caller, guid, classification_name, Utc::now())
            .await
    }

    pub async fn update_classification_effectivity(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        classification_name: &str,
        effectivity: EffectivityWindow,
    ) -> Result<MetadataElement> {
        self.validate_effectivity(&effectivity)?;
        let element = self.mutable_element(caller, guid).await?;
        let Some(existing) = element.classification(classification_name) else {
            return Err(MetaGraphError::ClassificationError {
                element: guid,
                classification: classification_name.to_string(),
                message: "not attached".into(),
            });
        };
        self.facade
            .classify_element(
                caller,
                guid,
                Classification {
                    type_name: existing.type_name.clone(),
                    properties: existing.properties.clone(),
                    effectivity,
                },
                Utc::now(),
            )
            .await
    }

    /// Bulk reconcile: computes the minimal edit set scoped to `relevant`
    /// and applies adds, then updates, then removes. Not transactional —
    /// a failure partway through leaves earlier edits in place; re-invoking
    /// with the same desired set converges.
    pub async fn set_classifications(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        relevant: &BTreeSet<String>,
        desired: Vec<Classification>,
    ) -> Result<ReconcileResult> {
        let element = self.mutable_element(caller, guid).await?;
        for classification in &desired {
            let cls = self
                .registry
                .require_category(&classification.type_name, TypeCategory::Classification)?;
            self.validate_properties(&cls.name, &classification.properties)?;
            self.validate_effectivity(&classification.effectivity)?;
            self.registry
                .classification_attachable(cls, &element.type_name)?;
        }

        let result = reconcile(relevant, &element.classifications, &desired);
        let now = Utc::now();
        for classification in result.to_add.iter().chain(result.to_update.iter()) {
            self.facade
                .classify_element(caller, guid, classification.clone(), now)
                .await?;
        }
        for name in &result.to_remove {
            self.facade
                .declassify_element(caller, guid, name, now)
                .await?;
        }
        tracing::debug!(
            guid = %guid,
            added = result.to_add.len(),
            updated = result.to_update.len(),
            removed = result.to_remove.len(),
            "classifications reconciled"
        );
        Ok(result)
    }

    // ── Relationship operations ───────────────────────────────

    pub async fn create_relationship(
        &self,
        caller: &CallerIdentity,
        request: NewRelationship,
    ) -> Result<Relationship> {
        let def = self
            .registry
            .require_category(&request.type_name, TypeCategory::Relationship)?;
        self.validate_properties(&def.name, &request.properties)?;
        self.validate_effectivity(&request.effectivity)?;
        let status = self.resolve_initial_status(&def.name, request.initial_status)?;

        // Each end's existence is checked at call time; no multi-object
        // transaction. A concurrent delete surfaces on the create below.
        let end_one = self.mutable_element(caller, request.end_one).await?;
        let end_two = self.mutable_element(caller, request.end_two).await?;
        self.registry
            .ends_compatible(def, &end_one.type_name, &end_two.type_name)?;

        let now = Utc::now();
        let relationship = Relationship {
            guid: Uuid::new_v4(),
            type_name: def.name.clone(),
            properties: request.properties,
            status,
            prior_status: None,
            version: 1,
            audit: ProvenanceAudit::on_create(&caller.actor_id, now),
            effectivity: request.effectivity,
            end_one: end_one.proxy(),
            end_two: end_two.proxy(),
        };
        let created = self.facade.create_relationship(caller, relationship).await?;
        tracing::info!(guid = %created.guid, type_name = %created.type_name, "relationship created");
        Ok(created)
    }

    pub async fn get_relationship_by_guid(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Relationship> {
        let at = effective_time(as_of);
        let relationship = self.facade.get_relationship(caller, guid).await?;
        if relationship.status == InstanceStatus::Deleted
            || !relationship.effectivity.is_effective_at(at)
        {
            return Err(MetaGraphError::RelationshipNotKnown { guid });
        }
        Ok(relationship)
    }

    pub async fn update_relationship_properties(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        properties: InstanceProperties,
        mode: UpdateMode,
    ) -> Result<Relationship> {
        let mut relationship = self.mutable_relationship(caller, guid).await?;
        self.validate_properties(&relationship.type_name, &properties)?;
        match mode {
            UpdateMode::Replace => relationship.properties = properties,
            UpdateMode::Merge => relationship.properties.merge(properties),
        }
        relationship.version += 1;
        relationship.audit.touched(&caller.actor_id, Utc::now());
        self.facade.update_relationship(caller, relationship).await
    }

    pub async fn update_relationship_status(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        status: InstanceStatus,
    ) -> Result<Relationship> {
        let mut relationship = self.mutable_relationship(caller, guid).await?;
        if matches!(status, InstanceStatus::Deleted | InstanceStatus::Unknown)
            || !self.registry.status_legal(&relationship.type_name, status)?
        {
            return Err(MetaGraphError::StatusNotSupported {
                type_name: relationship.type_name,
                status,
            });
        }
        relationship.status = status;
        relationship.version += 1;
        relationship.audit.touched(&caller.actor_id, Utc::now());
        self.facade.update_relationship(caller, relationship).await
    }

    pub async fn update_relationship_effectivity(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        effectivity: EffectivityWindow,
    ) -> Result<Relationship> {
        self.validate_effectivity(&effectivity)?;
        let mut relationship = self.mutable_relationship(caller, guid).await?;
        relationship.effectivity = effectivity;
        relationship.version += 1;
        relationship.audit.touched(&caller.actor_id, Utc::now());
        self.facade.update_relationship(caller, relationship).await
    }

    pub async fn delete_relationship(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
    ) -> Result<Relationship> {
        let relationship = self.facade.get_relationship(caller, guid).await?;
        if relationship.status == InstanceStatus::Deleted {
            return Err(MetaGraphError::invalid_parameter(
                "guid",
                format!("relationship {guid} is already deleted"),
            ));
        }
        self.facade
            .delete_relationship(caller, guid, Utc::now())
            .await
    }

    pub async fn restore_relationship(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
    ) -> Result<Relationship> {
        let relationship = self.facade.get_relationship(caller, guid).await?;
        if relationship.status != InstanceStatus::Deleted {
            return Err(MetaGraphError::RelationshipNotDeleted { guid });
        }
        self.facade
            .restore_relationship(caller, guid, Utc::now())
            .await
    }

    pub async fn purge_relationship(&self, caller: &CallerIdentity, guid: Uuid) -> Result<()> {
        caller.require_admin("purge-relationship")?;
        let relationship = self.facade.get_relationship(caller, guid).await?;
        if relationship.status != InstanceStatus::Deleted {
            return Err(MetaGraphError::RelationshipNotDeleted { guid });
        }
        self.facade.purge_relationship(caller, guid).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn relationships_for_element(
        &self,
        caller: &CallerIdentity,
        guid: Uuid,
        type_names: &[String],
        status_filter: &[InstanceStatus],
        as_of: Option<DateTime<Utc>>,
        sequencing: Sequencing,
        page: Page,
    ) -> Result<Vec<Relationship>> {
        self.validate_page(&page)?;
        self.require_types(type_names, TypeCategory::Relationship)?;
        self.validate_sequencing(type_names, &sequencing)?;
        let at = effective_time(as_of);
        let element = self.guarded_element(caller, guid).await?;
        if !self.element_visible_at(&element, at) {
            return Err(MetaGraphError::EntityNotKnown { guid });
        }
        self.facade
            .relationships_for_element(
                caller,
                RelationshipSearch {
                    element: guid,
                    type_names: self.registry.with_subtypes(type_names),
                    status_filter: status_filter.to_vec(),
                    as_of: at,
                    ordering: store_ordering(&sequencing),
                    page,
                },
            )
            .await
    }

    /// Induced subgraph reachable within `level` hops of `start`,
    /// subject to type/status/classification filters. A store without
    /// traversal support yields an empty graph (facade policy); zone
    /// filtering is applied to the result before it is returned.
    pub async fn get_neighborhood(
        &self,
        caller: &CallerIdentity,
        request: NeighborhoodRequest,
    ) -> Result<InstanceGraph> {
        self.require_types(&request.entity_type_filters, TypeCategory::Entity)?;
        self.require_types(
            &request.relationship_type_filters,
            TypeCategory::Relationship,
        )?;
        self.require_types(&request.classification_filter, TypeCategory::Classification)?;
        let at = effective_time(request.as_of);
        let start = self.guarded_element(caller, request.start).await?;
        if !self.element_visible_at(&start, at) {
            return Err(MetaGraphError::EntityNotKnown {
                guid: request.start,
            });
        }

        let graph = self
            .facade
            .entity_neighborhood(
                caller,
                NeighborhoodQuery {
                    start: request.start,
                    entity_type_filters: self.registry.with_subtypes(&request.entity_type_filters),
                    relationship_type_filters: self
                        .registry
                        .with_subtypes(&request.relationship_type_filters),
                    status_filter: request.status_filter,
                    classification_filter: request.classification_filter,
                    as_of: at,
                    level: request.level,
                },
            )
            .await?;

        let elements: Vec<MetadataElement> = graph
            .elements
            .into_iter()
            .filter(|e| zone_visible(&self.options.supported_zones, &e.properties))
            .collect();
        let retained: HashSet<Uuid> = elements.iter().map(|e| e.guid).collect();
        let relationships: Vec<Relationship> = graph
            .relationships
            .into_iter()
            .filter(|r| retained.contains(&r.end_one.guid) && retained.contains(&r.end_two.guid))
            .collect();
        Ok(InstanceGraph {
            elements,
            relationships,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, serde_json::Value)]) -> InstanceProperties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn zone_visible_without_restriction() {
        let properties = props(&[(ZONE_MEMBERSHIP_PROPERTY, serde_json::json!(["quarantine"]))]);
        assert!(zone_visible(&None, &properties));
    }

    #[test]
    fn zone_visible_untagged_element() {
        let supported = Some(HashSet::from(["production".to_string()]));
        assert!(zone_visible(&supported, &InstanceProperties::new()));
    }

    #[test]
    fn zone_visible_empty_tag_list_is_unzoned() {
        let supported = Some(HashSet::from(["production".to_string()]));
        let properties = props(&[(ZONE_MEMBERSHIP_PROPERTY, serde_json::json!([]))]);
        assert!(zone_visible(&supported, &properties));
    }

    #[test]
    fn zone_visible_requires_overlap() {
        let supported = Some(HashSet::from(["production".to_string()]));
        let inside = props(&[(
            ZONE_MEMBERSHIP_PROPERTY,
            serde_json::json!(["production", "quarantine"]),
        )]);
        let outside = props(&[(ZONE_MEMBERSHIP_PROPERTY, serde_json::json!(["quarantine"]))]);
        assert!(zone_visible(&supported, &inside));
        assert!(!zone_visible(&supported, &outside));
    }

    #[test]
    fn zone_visible_ignores_malformed_tags() {
        let supported = Some(HashSet::from(["production".to_string()]));
        let malformed = props(&[(ZONE_MEMBERSHIP_PROPERTY, serde_json::json!("production"))]);
        assert!(zone_visible(&supported, &malformed));
    }
}
