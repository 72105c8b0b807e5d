//! In-memory reference implementation of the metadata query port.
//!
//! The store reproduces the paging semantics of a remote, page-oriented
//! metadata store: entity listings slice the table in native order and
//! then apply server-side filtering to the slice, so a page can come
//! back empty while matching data exists further along; relationship
//! searches filter and sort first, then slice, and may cap a batch below
//! the requested limit.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value as JsonValue;

use lodestone_core::{
    AnomalyNotice, AnomalyReporter, Classification, Entity, EntityId, EntityQuery,
    InstanceStatus, MetadataQueryPort, PagingWindow, Principal, Relationship, RelationshipId,
    RelationshipQuery, SequencingOrder, StoreError, StoreResult, TracingAnomalyReporter,
    MEMENTO_CLASSIFICATION,
};

/// In-memory metadata store. Insertion order is the store's native
/// ordering.
///
/// The store itself is internally synchronized and shareable through an
/// `Arc`; many independent cursors may read it concurrently.
pub struct InMemoryMetadataStore {
    entities: RwLock<Vec<Entity>>,
    relationships: RwLock<Vec<Relationship>>,
    authorized: Option<HashSet<String>>,
    soft_delete_supported: bool,
    provenance_tags_supported: bool,
    relationship_batch_cap: usize,
    reporter: Arc<dyn AnomalyReporter>,
}

impl InMemoryMetadataStore {
    /// Creates an empty store: every principal authorized, soft delete
    /// and provenance tagging supported, no relationship batch cap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(Vec::new()),
            relationships: RwLock::new(Vec::new()),
            authorized: None,
            soft_delete_supported: true,
            provenance_tags_supported: true,
            relationship_batch_cap: usize::MAX,
            reporter: Arc::new(TracingAnomalyReporter),
        }
    }

    /// Restricts access to the named principals.
    #[must_use]
    pub fn with_authorized_principals<I, S>(mut self, principals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authorized = Some(principals.into_iter().map(Into::into).collect());
        self
    }

    /// Declares that this store cannot soft-delete: delete requests
    /// become permanent purges, each reported as an anomaly.
    #[must_use]
    pub fn without_soft_delete(mut self) -> Self {
        self.soft_delete_supported = false;
        self
    }

    /// Declares that this store cannot apply provenance tags.
    #[must_use]
    pub fn without_provenance_tags(mut self) -> Self {
        self.provenance_tags_supported = false;
        self
    }

    /// Caps relationship batches below the requested page size,
    /// producing legitimately short non-final pages.
    #[must_use]
    pub fn with_relationship_batch_cap(mut self, cap: usize) -> Self {
        self.relationship_batch_cap = cap.max(1);
        self
    }

    /// Replaces the anomaly reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: Arc<dyn AnomalyReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    fn authorize(&self, principal: &Principal, operation: &'static str) -> StoreResult<()> {
        match &self.authorized {
            Some(allowed) if !allowed.contains(principal.as_str()) => {
                Err(StoreError::unauthorized(principal.as_str(), operation))
            }
            _ => Ok(()),
        }
    }

    /// Stores a new entity, applying the provenance tag as a
    /// classification when the store supports tagging. An unapplied tag
    /// is reported, never an error: the instance is created regardless.
    pub fn create_entity(
        &self,
        principal: &Principal,
        mut entity: Entity,
        provenance_tag: Option<&str>,
    ) -> StoreResult<EntityId> {
        self.authorize(principal, "create_entity")?;

        if let Some(tag) = provenance_tag {
            if self.provenance_tags_supported {
                entity.classifications.push(Classification::new(tag));
            } else {
                self.reporter.report(AnomalyNotice::ProvenanceTagNotApplied {
                    principal: principal.clone(),
                    type_name: entity.type_ref.name.clone(),
                    instance_id: entity.entity_id.to_string(),
                    tag: tag.to_string(),
                });
            }
        }

        let id = entity.entity_id;
        self.entities.write().push(entity);
        Ok(id)
    }

    /// Deletes an entity: soft delete when supported, otherwise a
    /// permanent purge reported as an anomaly.
    pub fn delete_entity(&self, principal: &Principal, entity_id: EntityId) -> StoreResult<()> {
        self.authorize(principal, "delete_entity")?;

        let mut entities = self.entities.write();
        let Some(pos) = entities.iter().position(|e| e.entity_id == entity_id) else {
            return Err(StoreError::not_found("entity", entity_id.to_string()));
        };

        if self.soft_delete_supported {
            let entity = &mut entities[pos];
            entity.status = InstanceStatus::Deleted;
            entity.touch();
        } else {
            let entity = entities.remove(pos);
            self.reporter.report(AnomalyNotice::PurgedWithoutSoftDelete {
                principal: principal.clone(),
                type_name: entity.type_ref.name.clone(),
                instance_id: entity.entity_id.to_string(),
            });
        }
        Ok(())
    }

    /// Stores a new relationship.
    pub fn create_relationship(
        &self,
        principal: &Principal,
        relationship: Relationship,
    ) -> StoreResult<RelationshipId> {
        self.authorize(principal, "create_relationship")?;
        let id = relationship.relationship_id;
        self.relationships.write().push(relationship);
        Ok(id)
    }

    /// Deletes a relationship with the same soft-delete/purge rule as
    /// entities.
    pub fn delete_relationship(
        &self,
        principal: &Principal,
        relationship_id: RelationshipId,
    ) -> StoreResult<()> {
        self.authorize(principal, "delete_relationship")?;

        let mut relationships = self.relationships.write();
        let Some(pos) = relationships
            .iter()
            .position(|r| r.relationship_id == relationship_id)
        else {
            return Err(StoreError::not_found(
                "relationship",
                relationship_id.to_string(),
            ));
        };

        if self.soft_delete_supported {
            let relationship = &mut relationships[pos];
            relationship.status = InstanceStatus::Deleted;
            relationship.touch();
        } else {
            let relationship = relationships.remove(pos);
            self.reporter.report(AnomalyNotice::PurgedWithoutSoftDelete {
                principal: principal.clone(),
                type_name: relationship.type_ref.name.clone(),
                instance_id: relationship.relationship_id.to_string(),
            });
        }
        Ok(())
    }

    /// Fetches an entity by id, in whatever lifecycle state it is.
    pub fn get_entity(
        &self,
        principal: &Principal,
        entity_id: EntityId,
    ) -> StoreResult<Option<Entity>> {
        self.authorize(principal, "get_entity")?;
        Ok(self
            .entities
            .read()
            .iter()
            .find(|e| e.entity_id == entity_id)
            .cloned())
    }

    /// Number of entity instances held, including soft-deleted ones.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.read().len()
    }

    /// Number of relationship instances held, including soft-deleted
    /// ones.
    #[must_use]
    pub fn relationship_count(&self) -> usize {
        self.relationships.read().len()
    }
}

impl Default for InMemoryMetadataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataQueryPort for InMemoryMetadataStore {
    async fn find_entities(
        &self,
        principal: &Principal,
        query: &EntityQuery,
        window: &PagingWindow,
    ) -> StoreResult<Option<Vec<Entity>>> {
        self.authorize(principal, "find_entities")?;

        let entities = self.entities.read();
        if window.offset >= entities.len() {
            return Ok(None);
        }

        // Slice the raw table first, filter second: filtering happens
        // inside the page, so a fully-filtered page yields an empty,
        // non-terminal batch.
        let end = window.offset.saturating_add(window.limit).min(entities.len());
        let page = entities[window.offset..end]
            .iter()
            .filter(|entity| entity_visible(query, entity))
            .cloned()
            .collect();
        Ok(Some(page))
    }

    async fn find_relationships(
        &self,
        principal: &Principal,
        query: &RelationshipQuery,
        window: &PagingWindow,
    ) -> StoreResult<Option<Vec<Relationship>>> {
        self.authorize(principal, "find_relationships")?;

        let relationships = self.relationships.read();
        let mut matching: Vec<Relationship> = relationships
            .iter()
            .filter(|relationship| relationship_visible(query, relationship))
            .cloned()
            .collect();
        drop(relationships);

        sort_relationships(&mut matching, query);

        if window.offset >= matching.len() {
            return Ok(None);
        }
        let batch_size = window.limit.min(self.relationship_batch_cap);
        let end = window.offset.saturating_add(batch_size).min(matching.len());
        Ok(Some(matching[window.offset..end].to_vec()))
    }
}

/// Server-side visibility rules for entity listings.
fn entity_visible(query: &EntityQuery, entity: &Entity) -> bool {
    if let Some(type_ref) = &query.type_ref {
        if entity.type_ref.name != type_ref.name {
            return false;
        }
    }
    if !query.statuses.is_empty() && !query.statuses.contains(&entity.status) {
        return false;
    }
    // Soft-deleted instances and memento placeholders are normally
    // hidden; naming `Deleted` in the status set opts back in without
    // full lineage retrieval.
    if !query.include_lineage {
        if entity.status == InstanceStatus::Deleted
            && !query.statuses.contains(&InstanceStatus::Deleted)
        {
            return false;
        }
        if entity.has_classification(MEMENTO_CLASSIFICATION) {
            return false;
        }
    }
    if !query.skip_duplicate_processing && entity.duplicate_of.is_some() {
        return false;
    }
    if !query.classifications.is_empty()
        && !query
            .classifications
            .iter()
            .any(|name| entity.has_classification(name))
    {
        return false;
    }
    if let Some(instant) = query.effective_at {
        if !entity.is_effective_at(instant) {
            return false;
        }
    }
    true
}

/// Server-side visibility rules for relationship search.
fn relationship_visible(query: &RelationshipQuery, relationship: &Relationship) -> bool {
    if let Some(type_ref) = &query.type_ref {
        if relationship.type_ref.name != type_ref.name {
            return false;
        }
    }
    if !query.statuses.is_empty() && !query.statuses.contains(&relationship.status) {
        return false;
    }
    if !query.include_lineage
        && relationship.status == InstanceStatus::Deleted
        && !query.statuses.contains(&InstanceStatus::Deleted)
    {
        return false;
    }
    if let Some(instant) = query.as_of {
        // A historical query only sees instances that existed and were
        // valid at that instant.
        if relationship.created_at > instant || !relationship.is_effective_at(instant) {
            return false;
        }
    }
    if let Some(predicate) = &query.predicate {
        if !predicate.matches(&relationship.properties) {
            return false;
        }
    }
    true
}

fn sort_relationships(relationships: &mut [Relationship], query: &RelationshipQuery) {
    match query.sequencing_order {
        SequencingOrder::CreationDateRecent => {
            relationships.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        SequencingOrder::CreationDateOldest => {
            relationships.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        }
        SequencingOrder::LastUpdateRecent => {
            relationships.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        }
        SequencingOrder::LastUpdateOldest => {
            relationships.sort_by(|a, b| a.updated_at.cmp(&b.updated_at));
        }
        SequencingOrder::PropertyAscending => {
            if let Some(property) = &query.sequencing_property {
                relationships.sort_by(|a, b| compare_property(a, b, property));
            }
        }
        SequencingOrder::PropertyDescending => {
            if let Some(property) = &query.sequencing_property {
                relationships.sort_by(|a, b| compare_property(a, b, property).reverse());
            }
        }
    }
}

/// Orders two relationships by a property value. Instances missing the
/// property sort after those carrying it.
fn compare_property(a: &Relationship, b: &Relationship, property: &str) -> Ordering {
    match (a.properties.get(property), b.properties.get(property)) {
        (Some(left), Some(right)) => compare_json(left, right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_json(left: &JsonValue, right: &JsonValue) -> Ordering {
    if let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) {
        return l.partial_cmp(&r).unwrap_or(Ordering::Equal);
    }
    if let (Some(l), Some(r)) = (left.as_str(), right.as_str()) {
        return l.cmp(r);
    }
    Ordering::Equal
}
