//! Category Export Tests
//!
//! Runs category batches through `CategoryTreeProcessor` and `CategoryWriter`
//! against a recording remote catalog:
//! - roots are never exported
//! - an unmapped tree is reported once, on its root children
//! - children of categories created in the same batch follow their parent
//! - created categories are recorded in the category mapping

mod common;

use std::sync::Arc;

use pimbridge_connector::error::ConnectorError;
use pimbridge_connector::ids::RemoteCategoryId;
use pimbridge_connector::operation::{CategoryCreate, CategoryData, CategoryRef};
use pimbridge_connector::types::{CategoryStatusSnapshot, RemoteCategory};
use pimbridge_export::catalog::CategoryNode;
use pimbridge_export::error::ExportError;
use pimbridge_export::operations::NormalizedOperationSet;
use pimbridge_export::processor::CategoryTreeProcessor;
use pimbridge_export::writer::CategoryWriter;

use common::{
    connection, context_builder, export_config, init_tracing, stored_mapping,
    RecordingCatalogService, RemoteCall,
};

fn remote_category(id: i64, parent_id: Option<i64>, name: &str) -> RemoteCategory {
    RemoteCategory {
        id: RemoteCategoryId::new(id),
        parent_id: parent_id.map(RemoteCategoryId::new),
        name: name.to_string(),
        position: 0,
    }
}

fn remote() -> Arc<RecordingCatalogService> {
    Arc::new(
        RecordingCatalogService::new().with_status(CategoryStatusSnapshot::from_categories([
            remote_category(1, None, "Master"),
            remote_category(10, Some(1), "Shoes"),
        ])),
    )
}

/// master(1) ─ shoes(2) ─ boots(3), plus an unmapped tree
/// other(10) ─ orphan(11) ─ lost(12).
fn categories() -> Vec<CategoryNode> {
    let master = CategoryNode::root(1, "master").with_label("en_US", "Master");
    let shoes = CategoryNode::child(&master, 2, "shoes").with_label("en_US", "Shoes");
    let boots = CategoryNode::child(&shoes, 3, "boots")
        .with_label("en_US", "Boots")
        .with_label("fr_FR", "Bottes");

    let other = CategoryNode::root(10, "other");
    let orphan = CategoryNode::child(&other, 11, "orphan").with_label("en_US", "Orphan");
    let lost = CategoryNode::child(&orphan, 12, "lost");

    vec![master, shoes, boots, other, orphan, lost]
}

fn processor(remote: Arc<RecordingCatalogService>, valid_credentials: bool) -> CategoryTreeProcessor {
    CategoryTreeProcessor::new(
        export_config(),
        context_builder(remote),
        stored_mapping("category", valid_credentials),
    )
}

#[tokio::test]
async fn test_batch_with_unmapped_tree() {
    init_tracing();
    let processor = processor(remote(), true);
    assert!(processor
        .set_category_mapping(r#"{"master": "1", "shoes": "10"}"#)
        .await
        .unwrap()
        .is_allowed());

    let outcome = processor.process(&categories()).await.unwrap();

    // shoes is mapped, still exists and keeps its parent
    assert_eq!(outcome.operations.updates.len(), 1);
    assert_eq!(outcome.operations.updates[0].pim_code, "shoes");
    assert_eq!(outcome.operations.updates[0].id, RemoteCategoryId::new(10));
    assert!(outcome.operations.moves.is_empty());

    // boots is new, created under shoes' remote id
    assert_eq!(outcome.operations.creates.len(), 1);
    assert_eq!(outcome.operations.creates[0].pim_code, "boots");
    assert_eq!(
        outcome.operations.creates[0].parent.remote_id(),
        Some(RemoteCategoryId::new(10))
    );
    assert_eq!(outcome.operations.creates[0].data.name, "Boots");

    assert_eq!(outcome.operations.variations.len(), 1);
    assert_eq!(outcome.operations.variations[0].store_view, "fr");
    assert_eq!(outcome.operations.variations[0].name, "Bottes");
    assert_eq!(
        outcome.operations.variations[0].category,
        CategoryRef::Pending {
            pim_code: "boots".to_string()
        }
    );

    // orphan is reported, lost is skipped quietly
    assert_eq!(outcome.item_errors.len(), 1);
    assert_eq!(outcome.item_errors[0].category_id(), Some(11));
    assert!(outcome.item_errors[0].message.contains("other"));
}

#[tokio::test]
async fn test_moved_category() {
    init_tracing();
    let remote = Arc::new(
        RecordingCatalogService::new().with_status(CategoryStatusSnapshot::from_categories([
            remote_category(1, None, "Master"),
            remote_category(10, Some(1), "Shoes"),
            remote_category(20, Some(1), "Boots"),
        ])),
    );
    let processor = processor(remote, true);
    processor
        .set_category_mapping(r#"{"master": "1", "shoes": "10", "boots": "20"}"#)
        .await
        .unwrap();

    let outcome = processor.process(&categories()).await.unwrap();

    assert_eq!(outcome.operations.moves.len(), 1);
    assert_eq!(outcome.operations.moves[0].id, RemoteCategoryId::new(20));
    assert_eq!(
        outcome.operations.moves[0].parent.remote_id(),
        Some(RemoteCategoryId::new(10))
    );
    assert_eq!(outcome.operations.updates.len(), 2);
    assert!(outcome.operations.creates.is_empty());
    assert_eq!(
        outcome.operations.variations[0].category,
        CategoryRef::Remote {
            id: RemoteCategoryId::new(20)
        }
    );
}

#[tokio::test]
async fn test_write_records_created_categories() {
    init_tracing();
    let remote = remote();
    let category_mapping = stored_mapping("category", true);
    let processor = CategoryTreeProcessor::new(
        export_config(),
        context_builder(remote.clone()),
        category_mapping.clone(),
    );
    processor
        .set_category_mapping(r#"{"master": "1", "shoes": "10"}"#)
        .await
        .unwrap();

    let outcome = processor.process(&categories()).await.unwrap();
    let writer = CategoryWriter::new(remote.clone(), category_mapping, connection());
    let report = writer.write(&outcome.operations).await.unwrap();

    assert_eq!(
        report.created,
        vec![("boots".to_string(), RemoteCategoryId::new(100))]
    );
    assert_eq!(report.updated, 1);
    assert_eq!(report.moved, 0);
    assert_eq!(report.variations, 1);

    let calls = remote.calls();
    match &calls[0] {
        RemoteCall::CreateCategory(parent_id, create) => {
            assert_eq!(*parent_id, RemoteCategoryId::new(10));
            assert_eq!(create.pim_code, "boots");
        }
        other => panic!("unexpected call {other:?}"),
    }
    assert!(matches!(calls[1], RemoteCall::UpdateCategory(_)));
    match &calls[2] {
        RemoteCall::CategoryVariation(id, variation) => {
            assert_eq!(*id, RemoteCategoryId::new(100));
            assert_eq!(variation.store_view, "fr");
        }
        other => panic!("unexpected call {other:?}"),
    }

    let mapping: serde_json::Value =
        serde_json::from_str(&processor.category_mapping().await.unwrap()).unwrap();
    assert_eq!(mapping["boots"]["target"], "100");
    assert_eq!(mapping["shoes"]["target"], "10");

    // a second pass updates boots instead of creating it again
    let remote_after = Arc::new(
        RecordingCatalogService::new().with_status(CategoryStatusSnapshot::from_categories([
            remote_category(1, None, "Master"),
            remote_category(10, Some(1), "Shoes"),
            remote_category(100, Some(10), "Boots"),
        ])),
    );
    let second = CategoryTreeProcessor::new(
        export_config(),
        context_builder(remote_after),
        processor_mapping(&processor).await,
    );
    let outcome = second.process(&categories()).await.unwrap();
    assert!(outcome.operations.creates.is_empty());
    assert_eq!(outcome.operations.updates.len(), 2);
}

/// Copy the mapping of `processor` into a fresh stored mapping.
async fn processor_mapping(
    processor: &CategoryTreeProcessor,
) -> Arc<pimbridge_export::mapper::MappingMerger> {
    let mapping = stored_mapping("category", true);
    let json = processor.category_mapping().await.unwrap();
    let collection = pimbridge_export::mapper::mapping_from_json(&json).unwrap();
    mapping.set_mapping(&connection(), &collection).await.unwrap();
    mapping
}

#[tokio::test]
async fn test_variation_without_created_category_fails() {
    let remote = remote();
    let writer = CategoryWriter::new(remote.clone(), stored_mapping("category", true), connection());

    let mut operations = NormalizedOperationSet::new();
    operations
        .variations
        .push(pimbridge_connector::operation::CategoryVariation {
            category: CategoryRef::Pending {
                pim_code: "ghost".to_string(),
            },
            store_view: "fr".to_string(),
            name: "Fantôme".to_string(),
            url_key: None,
        });

    let result = writer.write(&operations).await;
    assert!(matches!(
        result,
        Err(ExportError::Connector(ConnectorError::InvalidData { .. }))
    ));
    assert!(remote.calls().is_empty());
}

#[tokio::test]
async fn test_children_of_new_category_follow_it() {
    init_tracing();
    let remote = remote();
    let category_mapping = stored_mapping("category", true);
    let processor = CategoryTreeProcessor::new(
        export_config(),
        context_builder(remote.clone()),
        category_mapping.clone(),
    );
    processor
        .set_category_mapping(r#"{"master": "1"}"#)
        .await
        .unwrap();

    let outcome = processor.process(&categories()).await.unwrap();

    // shoes is created under master, boots under the pending shoes
    let creates = &outcome.operations.creates;
    assert_eq!(creates.len(), 2);
    assert_eq!(creates[0].pim_code, "shoes");
    assert_eq!(creates[0].parent.remote_id(), Some(RemoteCategoryId::new(1)));
    assert_eq!(creates[1].pim_code, "boots");
    assert_eq!(
        creates[1].parent,
        CategoryRef::Pending {
            pim_code: "shoes".to_string()
        }
    );
    // only the unmapped tree is reported
    assert_eq!(outcome.item_errors.len(), 1);
    assert_eq!(outcome.item_errors[0].category_id(), Some(11));

    let writer = CategoryWriter::new(remote.clone(), category_mapping, connection());
    let report = writer.write(&outcome.operations).await.unwrap();
    assert_eq!(
        report.created,
        vec![
            ("shoes".to_string(), RemoteCategoryId::new(100)),
            ("boots".to_string(), RemoteCategoryId::new(101)),
        ]
    );

    let calls = remote.calls();
    match &calls[1] {
        RemoteCall::CreateCategory(parent_id, create) => {
            assert_eq!(*parent_id, RemoteCategoryId::new(100));
            assert_eq!(create.pim_code, "boots");
        }
        other => panic!("unexpected call {other:?}"),
    }
    assert!(matches!(
        calls[2],
        RemoteCall::CategoryVariation(id, _) if id == RemoteCategoryId::new(101)
    ));

    let mapping: serde_json::Value =
        serde_json::from_str(&processor.category_mapping().await.unwrap()).unwrap();
    assert_eq!(mapping["shoes"]["target"], "100");
    assert_eq!(mapping["boots"]["target"], "101");
}

#[tokio::test]
async fn test_unrecorded_creation_is_authentication_failure() {
    let remote = remote();
    let writer = CategoryWriter::new(remote.clone(), stored_mapping("category", false), connection());

    let mut operations = NormalizedOperationSet::new();
    operations.creates.push(CategoryCreate {
        pim_code: "shoes".to_string(),
        parent: CategoryRef::Remote {
            id: RemoteCategoryId::new(1),
        },
        store_view: "default".to_string(),
        data: CategoryData::new("Shoes"),
    });

    match writer.write(&operations).await {
        Err(ExportError::Connector(ConnectorError::AuthenticationFailed { connection_id })) => {
            assert_eq!(connection_id, connection().identifier());
        }
        other => panic!("unexpected result {other:?}"),
    }
    // the category exists remotely, only the mapping write was refused
    assert_eq!(remote.calls().len(), 1);
}

#[tokio::test]
async fn test_invalid_credentials_leave_tree_unmapped() {
    let processor = processor(remote(), false);

    assert!(processor
        .set_category_mapping(r#"{"master": "1"}"#)
        .await
        .unwrap()
        .is_invalid_credentials());
    assert_eq!(processor.category_mapping().await.unwrap(), "{}");

    let outcome = processor.process(&categories()).await.unwrap();
    assert!(outcome.operations.is_empty());
    // shoes and orphan are both root children of unmapped trees
    assert_eq!(outcome.item_errors.len(), 2);
}

#[tokio::test]
async fn test_scalar_mapping_payload() {
    let processor = processor(remote(), true);

    processor
        .set_category_mapping(r#"{"master": "1"}"#)
        .await
        .unwrap();

    // payloads with no usable entry are accepted and keep the stored mapping
    for payload in [r#""master""#, "42", "[7]"] {
        assert!(processor
            .set_category_mapping(payload)
            .await
            .unwrap()
            .is_allowed());
        let mapping: serde_json::Value =
            serde_json::from_str(&processor.category_mapping().await.unwrap()).unwrap();
        assert_eq!(mapping["master"]["target"], "1", "{payload}");
    }

    // an explicit empty object clears it
    assert!(processor
        .set_category_mapping("{}")
        .await
        .unwrap()
        .is_allowed());
    assert_eq!(processor.category_mapping().await.unwrap(), "{}");

    assert!(matches!(
        processor.set_category_mapping("not json").await,
        Err(ExportError::InvalidMapping { .. })
    ));
}

#[tokio::test]
async fn test_configuration_fields() {
    let processor = processor(remote(), true);
    processor
        .set_category_mapping(r#"{"master": "1"}"#)
        .await
        .unwrap();

    let fields = processor.configuration_fields().await.unwrap();

    assert!(fields.contains_key("isAnchor"));
    assert!(fields.contains_key("urlKey"));
    assert!(fields.contains_key("categoryMapping"));
}
