//! Shared fixture: a small data-catalog type system wired to the
//! in-memory store.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;

use metagraph_core::facade::RepositoryFacade;
use metagraph_core::handler::{HandlerOptions, MetadataHandler};
use metagraph_core::identity::CallerIdentity;
use metagraph_core::ports::GraphStore;
use metagraph_core::type_registry::{TypeDef, TypeRegistry};
use metagraph_core::types::{InstanceProperties, InstanceStatus};
use metagraph_memstore::MemGraphStore;

pub fn registry() -> Arc<TypeRegistry> {
    let registry = TypeRegistry::builder()
        .register(TypeDef::entity("referenceable", &["qualified_name"]))
        .register(
            TypeDef::entity("asset", &["display_name", "owner", "size"])
                .with_super_type("referenceable"),
        )
        .register(TypeDef::entity("database", &["engine"]).with_super_type("asset"))
        .register(
            TypeDef::entity("glossary_term", &["summary"]).with_legal_statuses(&[
                InstanceStatus::Draft,
                InstanceStatus::Active,
                InstanceStatus::Deleted,
            ]),
        )
        .register(TypeDef::relationship(
            "semantic_assignment",
            &["confidence"],
            &["asset"],
            &["glossary_term"],
        ))
        .register(TypeDef::relationship("linked_to", &["label"], &[], &[]))
        .register(TypeDef::classification(
            "confidentiality",
            &["level"],
            &["asset"],
        ))
        .register(TypeDef::classification("retention", &["days"], &[]))
        .build()
        .expect("fixture registry is valid");
    Arc::new(registry)
}

/// `RUST_LOG`-driven, per-test-writer subscriber. Safe to call from
/// every fixture; repeat initialisation is ignored.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn handler() -> MetadataHandler {
    handler_with_store(Arc::new(MemGraphStore::new()))
}

pub fn handler_with_store(store: Arc<dyn GraphStore>) -> MetadataHandler {
    init_tracing();
    MetadataHandler::new(RepositoryFacade::new(store, "test-tenant"), registry())
}

pub fn zoned_handler(zones: &[&str]) -> MetadataHandler {
    let options = HandlerOptions {
        supported_zones: Some(zones.iter().map(|z| z.to_string()).collect::<HashSet<_>>()),
    };
    handler().with_options(options)
}

pub fn steward() -> CallerIdentity {
    CallerIdentity::new("alice", vec!["steward".into()])
}

pub fn admin() -> CallerIdentity {
    CallerIdentity::new("root", vec!["admin".into()])
}

pub fn props(pairs: &[(&str, serde_json::Value)]) -> InstanceProperties {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
