//! Classification attach/detach and bulk reconciliation.

mod common;

use std::collections::BTreeSet;

use common::{handler, props, steward};
use metagraph_core::handler::NewElement;
use metagraph_core::types::{Classification, EffectivityWindow, MetadataElement, UpdateMode};

async fn asset(handler: &metagraph_core::handler::MetadataHandler) -> MetadataElement {
    handler
        .create_element(&steward(), NewElement::new("asset"))
        .await
        .unwrap()
}

fn relevant(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[tokio::test]
async fn classify_attaches_without_version_bump() {
    let handler = handler();
    let caller = steward();
    let element = asset(&handler).await;

    let after = handler
        .classify(
            &caller,
            element.guid,
            "confidentiality",
            props(&[("level", serde_json::json!("secret"))]),
            EffectivityWindow::always(),
        )
        .await
        .unwrap();
    assert_eq!(after.classifications.len(), 1);
    assert_eq!(after.version, element.version);
    assert!(after.classification("confidentiality").is_some());
}

#[tokio::test]
async fn classify_twice_is_a_collision() {
    let handler = handler();
    let caller = steward();
    let element = asset(&handler).await;

    handler
        .classify(
            &caller,
            element.guid,
            "confidentiality",
            props(&[]),
            EffectivityWindow::always(),
        )
        .await
        .unwrap();
    let err = handler
        .classify(
            &caller,
            element.guid,
            "confidentiality",
            props(&[]),
            EffectivityWindow::always(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "classification_error");
}

#[tokio::test]
async fn classify_honors_attachment_constraint() {
    let handler = handler();
    let caller = steward();
    let term = handler
        .create_element(&caller, NewElement::new("glossary_term"))
        .await
        .unwrap();
    // confidentiality attaches only to asset and its subtypes.
    let err = handler
        .classify(
            &caller,
            term.guid,
            "confidentiality",
            props(&[]),
            EffectivityWindow::always(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "type_error");

    // retention declares no constraint and attaches anywhere.
    assert!(handler
        .classify(
            &caller,
            term.guid,
            "retention",
            props(&[("days", serde_json::json!(30))]),
            EffectivityWindow::always(),
        )
        .await
        .is_ok());
}

#[tokio::test]
async fn reclassify_replace_and_merge() {
    let handler = handler();
    let caller = steward();
    let element = asset(&handler).await;
    handler
        .classify(
            &caller,
            element.guid,
            "confidentiality",
            props(&[("level", serde_json::json!("internal"))]),
            EffectivityWindow::always(),
        )
        .await
        .unwrap();

    let after = handler
        .reclassify(
            &caller,
            element.guid,
            "confidentiality",
            props(&[("level", serde_json::json!("secret"))]),
            UpdateMode::Merge,
        )
        .await
        .unwrap();
    let attached = after.classification("confidentiality").unwrap();
    assert_eq!(
        attached.properties.get("level"),
        Some(&serde_json::json!("secret"))
    );

    let after = handler
        .reclassify(
            &caller,
            element.guid,
            "confidentiality",
            props(&[]),
            UpdateMode::Replace,
        )
        .await
        .unwrap();
    assert!(after
        .classification("confidentiality")
        .unwrap()
        .properties
        .is_empty());
}

#[tokio::test]
async fn reclassify_and_unclassify_require_attachment() {
    let handler = handler();
    let caller = steward();
    let element = asset(&handler).await;

    let err = handler
        .reclassify(
            &caller,
            element.guid,
            "confidentiality",
            props(&[]),
            UpdateMode::Replace,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "classification_error");

    let err = handler
        .unclassify(&caller, element.guid, "confidentiality")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "classification_error");
}

#[tokio::test]
async fn unclassify_detaches() {
    let handler = handler();
    let caller = steward();
    let element = asset(&handler).await;
    handler
        .classify(
            &caller,
            element.guid,
            "confidentiality",
            props(&[]),
            EffectivityWindow::always(),
        )
        .await
        .unwrap();

    let after = handler
        .unclassify(&caller, element.guid, "confidentiality")
        .await
        .unwrap();
    assert!(after.classifications.is_empty());
}

#[tokio::test]
async fn update_classification_effectivity_keeps_properties() {
    let handler = handler();
    let caller = steward();
    let element = asset(&handler).await;
    handler
        .classify(
            &caller,
            element.guid,
            "confidentiality",
            props(&[("level", serde_json::json!("secret"))]),
            EffectivityWindow::always(),
        )
        .await
        .unwrap();

    let from = chrono::Utc::now();
    let after = handler
        .update_classification_effectivity(
            &caller,
            element.guid,
            "confidentiality",
            EffectivityWindow::new(Some(from), None),
        )
        .await
        .unwrap();
    let attached = after.classification("confidentiality").unwrap();
    assert_eq!(attached.effectivity.from, Some(from));
    assert_eq!(
        attached.properties.get("level"),
        Some(&serde_json::json!("secret"))
    );
}

#[tokio::test]
async fn set_classifications_converges_to_desired() {
    let handler = handler();
    let caller = steward();
    let element = asset(&handler).await;
    handler
        .classify(
            &caller,
            element.guid,
            "confidentiality",
            props(&[("level", serde_json::json!("internal"))]),
            EffectivityWindow::always(),
        )
        .await
        .unwrap();

    let desired = vec![
        Classification::new(
            "confidentiality",
            props(&[("level", serde_json::json!("secret"))]),
        ),
        Classification::new("retention", props(&[("days", serde_json::json!(90))])),
    ];
    let result = handler
        .set_classifications(
            &caller,
            element.guid,
            &relevant(&["confidentiality", "retention"]),
            desired.clone(),
        )
        .await
        .unwrap();
    assert_eq!(result.to_add.len(), 1);
    assert_eq!(result.to_update.len(), 1);
    assert!(result.to_remove.is_empty());

    let element = handler
        .get_element_by_guid(&caller, element.guid, None)
        .await
        .unwrap();
    assert_eq!(element.classifications.len(), 2);
    assert_eq!(
        element
            .classification("confidentiality")
            .unwrap()
            .properties
            .get("level"),
        Some(&serde_json::json!("secret"))
    );

    // Re-applying the same desired set is a full no-op: converged
    // payloads produce no updates either.
    let again = handler
        .set_classifications(
            &caller,
            element.guid,
            &relevant(&["confidentiality", "retention"]),
            desired,
        )
        .await
        .unwrap();
    assert!(again.is_noop());
}

#[tokio::test]
async fn set_classifications_never_removes_outside_relevant() {
    let handler = handler();
    let caller = steward();
    let element = asset(&handler).await;
    handler
        .classify(
            &caller,
            element.guid,
            "retention",
            props(&[("days", serde_json::json!(30))]),
            EffectivityWindow::always(),
        )
        .await
        .unwrap();

    // retention is attached but outside the relevant scope; an empty
    // desired set must leave it alone.
    let result = handler
        .set_classifications(
            &caller,
            element.guid,
            &relevant(&["confidentiality"]),
            Vec::new(),
        )
        .await
        .unwrap();
    assert!(result.is_noop());

    let element = handler
        .get_element_by_guid(&caller, element.guid, None)
        .await
        .unwrap();
    assert!(element.classification("retention").is_some());
}

#[tokio::test]
async fn set_classifications_removes_inside_relevant() {
    let handler = handler();
    let caller = steward();
    let element = asset(&handler).await;
    handler
        .classify(
            &caller,
            element.guid,
            "retention",
            props(&[("days", serde_json::json!(30))]),
            EffectivityWindow::always(),
        )
        .await
        .unwrap();

    let result = handler
        .set_classifications(&caller, element.guid, &relevant(&["retention"]), Vec::new())
        .await
        .unwrap();
    assert_eq!(result.to_remove, vec!["retention".to_string()]);

    let element = handler
        .get_element_by_guid(&caller, element.guid, None)
        .await
        .unwrap();
    assert!(element.classifications.is_empty());
}

#[tokio::test]
async fn set_classifications_validates_before_applying() {
    let handler = handler();
    let caller = steward();
    let element = asset(&handler).await;

    // One bad entry rejects the whole request before any edit lands.
    let desired = vec![
        Classification::new("retention", props(&[("days", serde_json::json!(30))])),
        Classification::new("unregistered", props(&[])),
    ];
    let err = handler
        .set_classifications(
            &caller,
            element.guid,
            &relevant(&["retention", "unregistered"]),
            desired,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "type_error");

    let element = handler
        .get_element_by_guid(&caller, element.guid, None)
        .await
        .unwrap();
    assert!(element.classifications.is_empty());
}
