//! Metadata graph store core.
//!
//! Typed entities, relationships, and classifications, each versioned and
//! governed by a lifecycle state machine, effectivity windows, and
//! soft-delete/restore/purge semantics. The core is pure domain logic:
//! it reaches the backing store only through the [`ports::GraphStore`]
//! trait, and the [`facade::RepositoryFacade`] is the single boundary
//! where low-level store failures become the caller-facing
//! [`error::MetaGraphError`] taxonomy.
//!
//! Wiring follows the port/adapter split: host code builds a store
//! adapter, wraps it in a facade, constructs a [`handler::MetadataHandler`]
//! per tenant, and registers handlers in a [`tenant::TenantRegistry`].

pub mod error;
pub mod facade;
pub mod handler;
pub mod identity;
pub mod ports;
pub mod reconcile;
pub mod tenant;
pub mod type_registry;
pub mod types;

pub use error::{MetaGraphError, Result};
pub use facade::RepositoryFacade;
pub use handler::{
    FindRequest, HandlerOptions, MetadataHandler, NeighborhoodRequest, NewElement,
    NewRelationship, ZONE_MEMBERSHIP_PROPERTY,
};
pub use identity::CallerIdentity;
pub use ports::{
    ElementSearch, GraphStore, NeighborhoodQuery, OrderKey, RelationshipSearch, StoreFailure,
    StoreOrdering, StoreResult,
};
pub use reconcile::{reconcile, ReconcileResult};
pub use tenant::TenantRegistry;
pub use type_registry::{TypeCategory, TypeDef, TypeRegistry, TypeRegistryBuilder};
pub use types::{
    Classification, EffectivityWindow, ElementProxy, InstanceGraph, InstanceProperties,
    InstanceStatus, MetadataElement, Page, ProvenanceAudit, Relationship, Sequencing, UpdateMode,
};
