use std::sync::Arc;

use chrono::{Duration, Utc};
use parking_lot::Mutex;
use serde_json::json;

use lodestone_core::{
    AnomalyNotice, AnomalyReporter, Classification, Entity, EntityId, EntityQuery,
    InstanceStatus, PageRequestPolicy, PagingWindow, Principal, PropertyCondition,
    PropertyFilter, PropertyOperator, Relationship, RelationshipQuery, SequencingOrder,
    StoreError, TypeRef, MEMENTO_CLASSIFICATION,
};
use lodestone_scan::{EntityCursor, MetadataCursor, RelationshipCursor};
use lodestone_store::InMemoryMetadataStore;

/// Reporter that records every notice for later inspection.
#[derive(Default)]
struct RecordingReporter {
    notices: Mutex<Vec<AnomalyNotice>>,
}

impl RecordingReporter {
    fn notices(&self) -> Vec<AnomalyNotice> {
        self.notices.lock().clone()
    }
}

impl AnomalyReporter for RecordingReporter {
    fn report(&self, notice: AnomalyNotice) {
        self.notices.lock().push(notice);
    }
}

fn steward() -> Principal {
    Principal::new("steward")
}

fn asset(name: &str) -> Entity {
    Entity::new(TypeRef::named("DataAsset"), json!({ "name": name }))
}

fn window(offset: i64, limit: i64) -> PagingWindow {
    PageRequestPolicy::default()
        .normalize(offset, limit)
        .expect("valid window")
}

fn names(entities: &[Entity]) -> Vec<&str> {
    entities
        .iter()
        .map(|e| e.properties["name"].as_str().expect("name"))
        .collect()
}

fn entity_cursor(store: &Arc<InMemoryMetadataStore>, query: EntityQuery) -> EntityCursor {
    EntityCursor::new(store.clone(), steward(), query, window(0, 2))
}

fn relationship_cursor(
    store: &Arc<InMemoryMetadataStore>,
    query: RelationshipQuery,
) -> RelationshipCursor {
    RelationshipCursor::new(store.clone(), steward(), query, window(0, 10))
}

/// Seeds a store whose raw order interleaves visible assets with
/// instances the server-side filters hide, so small pages regularly
/// come back empty.
fn seeded_store() -> Arc<InMemoryMetadataStore> {
    let store = InMemoryMetadataStore::new();
    let principal = steward();
    let canonical = asset("orders");
    let canonical_id = canonical.entity_id;

    store.create_entity(&principal, canonical, None).expect("create");
    store
        .create_entity(
            &principal,
            asset("orders-shadow").with_duplicate_of(canonical_id),
            None,
        )
        .expect("create");
    store
        .create_entity(
            &principal,
            asset("retired").with_classification(Classification::new(MEMENTO_CLASSIFICATION)),
            None,
        )
        .expect("create");
    store
        .create_entity(
            &principal,
            Entity::new(TypeRef::named("GlossaryTerm"), json!({ "name": "term" })),
            None,
        )
        .expect("create");
    store.create_entity(&principal, asset("customers"), None).expect("create");
    store
        .create_entity(
            &principal,
            asset("invoices").with_status(InstanceStatus::Deprecated),
            None,
        )
        .expect("create");
    Arc::new(store)
}

#[tokio::test]
async fn entity_cursor_drains_through_filtered_pages() {
    let store = seeded_store();
    let query = EntityQuery::new().with_type(TypeRef::named("DataAsset"));

    let drained = entity_cursor(&store, query).drain().await.expect("drain");
    assert_eq!(names(&drained), vec!["orders", "customers", "invoices"]);
}

#[tokio::test]
async fn duplicate_suppression_can_be_skipped() {
    let store = seeded_store();

    let suppressed = entity_cursor(&store, EntityQuery::new())
        .drain()
        .await
        .expect("drain");
    assert!(!names(&suppressed).contains(&"orders-shadow"));

    let raw = entity_cursor(&store, EntityQuery::new().skip_duplicates())
        .drain()
        .await
        .expect("drain");
    assert!(names(&raw).contains(&"orders-shadow"));
}

#[tokio::test]
async fn lineage_retrieval_reveals_hidden_instances() {
    let store = seeded_store();

    let normal = entity_cursor(&store, EntityQuery::new())
        .drain()
        .await
        .expect("drain");
    assert!(!names(&normal).contains(&"retired"));

    let lineage = entity_cursor(&store, EntityQuery::new().for_lineage())
        .drain()
        .await
        .expect("drain");
    assert!(names(&lineage).contains(&"retired"));
}

#[tokio::test]
async fn status_filter_restricts_results() {
    let store = seeded_store();
    let query = EntityQuery::new()
        .with_type(TypeRef::named("DataAsset"))
        .with_statuses(vec![InstanceStatus::Deprecated]);

    let drained = entity_cursor(&store, query).drain().await.expect("drain");
    assert_eq!(names(&drained), vec!["invoices"]);
}

#[tokio::test]
async fn classification_filter_is_an_allow_list() {
    let store = InMemoryMetadataStore::new();
    store
        .create_entity(
            &steward(),
            asset("pii-table").with_classification(Classification::new("Confidential")),
            None,
        )
        .expect("create");
    store.create_entity(&steward(), asset("public-table"), None).expect("create");
    let store = Arc::new(store);

    let query = EntityQuery::new().with_classifications(vec!["Confidential".to_string()]);
    let drained = entity_cursor(&store, query).drain().await.expect("drain");
    assert_eq!(names(&drained), vec!["pii-table"]);
}

#[tokio::test]
async fn effective_time_hides_expired_instances() {
    let now = Utc::now();
    let store = InMemoryMetadataStore::new();
    store
        .create_entity(
            &steward(),
            asset("current").with_effectivity(Some(now - Duration::days(1)), None),
            None,
        )
        .expect("create");
    store
        .create_entity(
            &steward(),
            asset("expired").with_effectivity(
                Some(now - Duration::days(10)),
                Some(now - Duration::days(5)),
            ),
            None,
        )
        .expect("create");
    let store = Arc::new(store);

    let query = EntityQuery::new().effective_at(now);
    let drained = entity_cursor(&store, query).drain().await.expect("drain");
    assert_eq!(names(&drained), vec!["current"]);
}

fn feeds(n: i64, created_hours_ago: i64) -> Relationship {
    let mut relationship = Relationship::new(
        TypeRef::named("Feeds"),
        EntityId::new(),
        EntityId::new(),
        json!({ "n": n, "pipeline": format!("etl-{n}") }),
    );
    relationship.created_at = Utc::now() - Duration::hours(created_hours_ago);
    relationship.updated_at = relationship.created_at;
    relationship
}

fn pipeline_numbers(relationships: &[Relationship]) -> Vec<i64> {
    relationships
        .iter()
        .map(|r| r.properties["n"].as_i64().expect("n"))
        .collect()
}

#[tokio::test]
async fn relationship_search_defaults_to_most_recent_first() {
    let store = InMemoryMetadataStore::new();
    for (n, age) in [(1, 30), (2, 10), (3, 20)] {
        store.create_relationship(&steward(), feeds(n, age)).expect("create");
    }
    let store = Arc::new(store);

    let drained = relationship_cursor(&store, RelationshipQuery::new())
        .drain()
        .await
        .expect("drain");
    assert_eq!(pipeline_numbers(&drained), vec![2, 3, 1]);
}

#[tokio::test]
async fn relationship_search_drains_capped_pages() {
    let store = InMemoryMetadataStore::new().with_relationship_batch_cap(2);
    for n in 0..7 {
        store.create_relationship(&steward(), feeds(n, 100 - n)).expect("create");
    }
    let store = Arc::new(store);

    // Every page is short of the requested limit; the cursor advances by
    // actual batch length and still sees everything exactly once.
    let drained = relationship_cursor(&store, RelationshipQuery::new())
        .drain()
        .await
        .expect("drain");
    assert_eq!(pipeline_numbers(&drained), vec![6, 5, 4, 3, 2, 1, 0]);
}

#[tokio::test]
async fn relationship_property_search_with_sequencing() {
    let store = InMemoryMetadataStore::new();
    for (n, age) in [(5, 1), (1, 2), (3, 3), (8, 4)] {
        store.create_relationship(&steward(), feeds(n, age)).expect("create");
    }
    let store = Arc::new(store);

    let query = RelationshipQuery::new()
        .with_predicate(PropertyFilter::all(vec![PropertyCondition::new(
            "n",
            PropertyOperator::GreaterThan,
            json!(1),
        )]))
        .sequenced_by("n", SequencingOrder::PropertyAscending);

    let drained = relationship_cursor(&store, query).drain().await.expect("drain");
    assert_eq!(pipeline_numbers(&drained), vec![3, 5, 8]);
}

#[tokio::test]
async fn as_of_query_ignores_later_instances() {
    let store = InMemoryMetadataStore::new();
    store.create_relationship(&steward(), feeds(1, 48)).expect("create");
    store.create_relationship(&steward(), feeds(2, 1)).expect("create");
    let store = Arc::new(store);

    let query = RelationshipQuery::new().as_of(Utc::now() - Duration::hours(24));
    let drained = relationship_cursor(&store, query).drain().await.expect("drain");
    assert_eq!(pipeline_numbers(&drained), vec![1]);
}

#[tokio::test]
async fn soft_delete_keeps_instance_recoverable() {
    let store = InMemoryMetadataStore::new();
    let id = store.create_entity(&steward(), asset("orders"), None).expect("create");
    store.delete_entity(&steward(), id).expect("delete");
    let store = Arc::new(store);

    let deleted = store
        .get_entity(&steward(), id)
        .expect("get")
        .expect("still present");
    assert_eq!(deleted.status, InstanceStatus::Deleted);
    assert_eq!(deleted.version, 2);

    let normal = entity_cursor(&store, EntityQuery::new())
        .drain()
        .await
        .expect("drain");
    assert!(normal.is_empty());

    let lineage = entity_cursor(&store, EntityQuery::new().for_lineage())
        .drain()
        .await
        .expect("drain");
    assert_eq!(names(&lineage), vec!["orders"]);
}

#[tokio::test]
async fn purge_fallback_is_reported() {
    let reporter = Arc::new(RecordingReporter::default());
    let store = InMemoryMetadataStore::new()
        .without_soft_delete()
        .with_reporter(reporter.clone());

    let id = store.create_entity(&steward(), asset("orders"), None).expect("create");
    store.delete_entity(&steward(), id).expect("delete");

    assert_eq!(store.entity_count(), 0);
    let notices = reporter.notices();
    assert_eq!(notices.len(), 1);
    assert!(matches!(
        &notices[0],
        AnomalyNotice::PurgedWithoutSoftDelete { instance_id, .. }
            if *instance_id == id.to_string()
    ));
}

#[tokio::test]
async fn provenance_tag_applied_when_supported() {
    let store = InMemoryMetadataStore::new();
    let id = store
        .create_entity(&steward(), asset("orders"), Some("ingest-batch-7"))
        .expect("create");

    let entity = store
        .get_entity(&steward(), id)
        .expect("get")
        .expect("present");
    assert!(entity.has_classification("ingest-batch-7"));
}

#[tokio::test]
async fn unapplied_provenance_tag_is_reported_not_fatal() {
    let reporter = Arc::new(RecordingReporter::default());
    let store = InMemoryMetadataStore::new()
        .without_provenance_tags()
        .with_reporter(reporter.clone());

    let id = store
        .create_entity(&steward(), asset("orders"), Some("ingest-batch-7"))
        .expect("create");

    let entity = store
        .get_entity(&steward(), id)
        .expect("get")
        .expect("created despite the failed tag");
    assert!(!entity.has_classification("ingest-batch-7"));

    let notices = reporter.notices();
    assert_eq!(notices.len(), 1);
    assert!(matches!(
        &notices[0],
        AnomalyNotice::ProvenanceTagNotApplied { tag, .. } if tag == "ingest-batch-7"
    ));
}

#[tokio::test]
async fn unauthorized_principal_surfaces_through_cursor() {
    let store = Arc::new(
        InMemoryMetadataStore::new().with_authorized_principals(["steward"]),
    );
    let mut cursor = EntityCursor::new(
        store,
        Principal::new("intruder"),
        EntityQuery::new(),
        window(0, 10),
    );

    let err = cursor.has_next().await.expect_err("unauthorized");
    assert!(matches!(err, StoreError::Unauthorized { .. }));
    assert!(!cursor.has_next().await.expect("post-failure"));
}
