//! Core instance types for the metadata graph.
//! These are pure value types — no storage dependencies.

// Status-like enums use `from_str() -> Option<Self>` instead of `FromStr`
// because they return None for unknown values rather than an error.
#![allow(clippy::should_implement_trait)]

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Instance status ───────────────────────────────────────────

/// Lifecycle status of an element or relationship.
///
/// `Unknown` is a sentinel for status values the handler cannot interpret.
/// It is only ever an observed input, never a transition target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Draft,
    Proposed,
    Prepared,
    Active,
    Deleted,
    #[serde(other)]
    Unknown,
}

impl InstanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Proposed => "proposed",
            Self::Prepared => "prepared",
            Self::Active => "active",
            Self::Deleted => "deleted",
            Self::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "proposed" => Some(Self::Proposed),
            "prepared" => Some(Self::Prepared),
            "active" => Some(Self::Active),
            "deleted" => Some(Self::Deleted),
            _ => None,
        }
    }

    /// Lenient parse for status values read back from a store: anything
    /// unrecognised collapses to `Unknown` instead of failing.
    pub fn parse_lenient(s: &str) -> Self {
        Self::from_str(s).unwrap_or(Self::Unknown)
    }
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ── Effectivity window ────────────────────────────────────────

/// The `[from, to)` time range during which an instance is visible to
/// time-scoped queries. `None` on either side means unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectivityWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
}

impl EffectivityWindow {
    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    /// Unbounded window (always effective).
    pub fn always() -> Self {
        Self::default()
    }

    /// Half-open containment: `from <= at < to`.
    pub fn is_effective_at(&self, at: DateTime<Utc>) -> bool {
        if let Some(from) = self.from {
            if at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if at >= to {
                return false;
            }
        }
        true
    }

    /// A window is well-formed when `to` is strictly after `from`
    /// (whenever both bounds are set).
    pub fn is_well_formed(&self) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => to > from,
            _ => true,
        }
    }
}

// ── Property bag ──────────────────────────────────────────────

/// Ordered name → value property bag carried by every instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceProperties(pub BTreeMap<String, serde_json::Value>);

impl InstanceProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: serde_json::Value) {
        self.0.insert(name.into(), value);
    }

    /// Overlay `other` onto this bag — keys present in `other` win,
    /// keys absent from `other` are retained.
    pub fn merge(&mut self, other: InstanceProperties) {
        for (k, v) in other.0 {
            self.0.insert(k, v);
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, serde_json::Value)> for InstanceProperties {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ── Provenance audit ──────────────────────────────────────────

/// Creation/update audit pair carried by every instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvenanceAudit {
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,
}

impl ProvenanceAudit {
    pub fn on_create(actor: impl Into<String>, at: DateTime<Utc>) -> Self {
        let actor = actor.into();
        Self {
            created_by: actor.clone(),
            created_at: at,
            updated_by: actor,
            updated_at: at,
        }
    }

    pub fn touched(&mut self, actor: impl Into<String>, at: DateTime<Utc>) {
        self.updated_by = actor.into();
        self.updated_at = at;
    }
}

// ── Instances ─────────────────────────────────────────────────

/// Far-end reference carried on a relationship: enough to resolve the
/// end without a full fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementProxy {
    pub guid: Uuid,
    pub type_name: String,
}

/// A typed facet attached to exactly one element. Not independently
/// addressable; its lifetime is bounded by the owning element's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub type_name: String,
    pub properties: InstanceProperties,
    #[serde(default)]
    pub effectivity: EffectivityWindow,
}

impl Classification {
    pub fn new(type_name: impl Into<String>, properties: InstanceProperties) -> Self {
        Self {
            type_name: type_name.into(),
            properties,
            effectivity: EffectivityWindow::always(),
        }
    }
}

/// A typed entity node in the metadata graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataElement {
    pub guid: Uuid,
    pub type_name: String,
    pub properties: InstanceProperties,
    pub status: InstanceStatus,
    /// Pre-delete status retained while soft-deleted, consumed by restore.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_status: Option<InstanceStatus>,
    pub version: i64,
    pub audit: ProvenanceAudit,
    #[serde(default)]
    pub effectivity: EffectivityWindow,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classifications: Vec<Classification>,
}

impl MetadataElement {
    pub fn classification(&self, name: &str) -> Option<&Classification> {
        self.classifications.iter().find(|c| c.type_name == name)
    }

    pub fn proxy(&self) -> ElementProxy {
        ElementProxy {
            guid: self.guid,
            type_name: self.type_name.clone(),
        }
    }
}

/// A typed edge between two elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub guid: Uuid,
    pub type_name: String,
    pub properties: InstanceProperties,
    pub status: InstanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_status: Option<InstanceStatus>,
    pub version: i64,
    pub audit: ProvenanceAudit,
    #[serde(default)]
    pub effectivity: EffectivityWindow,
    pub end_one: ElementProxy,
    pub end_two: ElementProxy,
}

impl Relationship {
    /// The proxy at the far end from `guid`, or None when `guid` is
    /// neither end.
    pub fn other_end(&self, guid: Uuid) -> Option<&ElementProxy> {
        if self.end_one.guid == guid {
            Some(&self.end_two)
        } else if self.end_two.guid == guid {
            Some(&self.end_one)
        } else {
            None
        }
    }
}

/// The induced subgraph returned by neighborhood traversal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceGraph {
    pub elements: Vec<MetadataElement>,
    pub relationships: Vec<Relationship>,
}

impl InstanceGraph {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.relationships.is_empty()
    }
}

// ── Sequencing and paging ─────────────────────────────────────

/// Caller-facing result ordering for list operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sequencing {
    CreationDateRecent,
    CreationDateOldest,
    PropertyAscending(String),
    PropertyDescending(String),
    Guid,
}

impl Default for Sequencing {
    fn default() -> Self {
        Self::Guid
    }
}

impl Sequencing {
    /// The property name a property-ordered sequencing sorts on.
    pub fn property(&self) -> Option<&str> {
        match self {
            Self::PropertyAscending(p) | Self::PropertyDescending(p) => Some(p),
            _ => None,
        }
    }
}

/// How a properties update is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Incoming bag replaces the whole existing bag.
    Replace,
    /// Incoming keys overlay the existing bag.
    Merge,
}

/// startFrom/pageSize paging for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub start_from: usize,
    pub page_size: usize,
}

impl Page {
    pub const DEFAULT_PAGE_SIZE: usize = 100;

    pub fn new(start_from: usize, page_size: usize) -> Self {
        Self {
            start_from,
            page_size,
        }
    }

    /// A zero-size page is always a caller bug.
    pub fn is_valid(&self) -> bool {
        self.page_size > 0
    }

    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.start_from)
            .take(self.page_size)
            .collect()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            start_from: 0,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────
