//! Tenant registry: isolated handler instances per tenant.

mod common;

use std::sync::Arc;

use common::{handler, steward};
use metagraph_core::handler::{FindRequest, NewElement};
use metagraph_core::tenant::TenantRegistry;

#[tokio::test]
async fn register_lookup_deregister() {
    let registry = TenantRegistry::new();
    assert!(registry.is_empty());

    registry.register("cocoa", Arc::new(handler()));
    registry.register("vanilla", Arc::new(handler()));
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.tenants(), vec!["cocoa", "vanilla"]);

    assert!(registry.lookup("cocoa").is_some());
    assert!(registry.lookup("unknown").is_none());

    registry.deregister("cocoa");
    assert!(registry.lookup("cocoa").is_none());
    assert_eq!(registry.len(), 1);
}

#[tokio::test]
async fn tenants_do_not_share_data() {
    let registry = TenantRegistry::new();
    registry.register("cocoa", Arc::new(handler()));
    registry.register("vanilla", Arc::new(handler()));
    let caller = steward();

    let cocoa = registry.lookup("cocoa").unwrap();
    cocoa
        .create_element(&caller, NewElement::new("asset"))
        .await
        .unwrap();

    let vanilla = registry.lookup("vanilla").unwrap();
    let found = vanilla
        .find_elements(&caller, FindRequest::default())
        .await
        .unwrap();
    assert!(found.is_empty());

    let found = cocoa
        .find_elements(&caller, FindRequest::default())
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn reregistering_replaces_the_instance() {
    let registry = TenantRegistry::new();
    registry.register("cocoa", Arc::new(handler()));
    let caller = steward();
    registry
        .lookup("cocoa")
        .unwrap()
        .create_element(&caller, NewElement::new("asset"))
        .await
        .unwrap();

    registry.register("cocoa", Arc::new(handler()));
    let found = registry
        .lookup("cocoa")
        .unwrap()
        .find_elements(&caller, FindRequest::default())
        .await
        .unwrap();
    assert!(found.is_empty());
}
