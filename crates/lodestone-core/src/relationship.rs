//! Relationship instance domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::entity::{in_effectivity_window, TypeRef};
use crate::ids::{EntityId, RelationshipId};
use crate::status::InstanceStatus;

/// A typed, directed association between two entities.
///
/// `end_one` is the origin of the association, `end_two` the destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// Stable relationship identifier.
    pub relationship_id: RelationshipId,
    /// Type of this relationship.
    pub type_ref: TypeRef,
    /// Lifecycle status.
    pub status: InstanceStatus,
    /// Free-form relationship properties.
    pub properties: JsonValue,
    /// Entity at end one of the association.
    pub end_one: EntityId,
    /// Entity at end two of the association.
    pub end_two: EntityId,
    /// Start of the instance's validity period (inclusive).
    pub effective_from: Option<DateTime<Utc>>,
    /// End of the instance's validity period (exclusive).
    pub effective_to: Option<DateTime<Utc>>,
    /// Creation timestamp in UTC.
    pub created_at: DateTime<Utc>,
    /// Update timestamp in UTC.
    pub updated_at: DateTime<Utc>,
    /// Monotonic instance version, bumped on every mutation.
    pub version: i64,
}

impl Relationship {
    /// Creates a new active relationship with open effectivity.
    #[must_use]
    pub fn new(type_ref: TypeRef, end_one: EntityId, end_two: EntityId, properties: JsonValue) -> Self {
        let now = Utc::now();
        Self {
            relationship_id: RelationshipId::new(),
            type_ref,
            status: InstanceStatus::Active,
            properties,
            end_one,
            end_two,
            effective_from: None,
            effective_to: None,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// Set the lifecycle status.
    #[must_use]
    pub fn with_status(mut self, status: InstanceStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the validity period. `from` is inclusive, `to` exclusive.
    #[must_use]
    pub fn with_effectivity(
        mut self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Self {
        self.effective_from = from;
        self.effective_to = to;
        self
    }

    /// Returns true when the instance is valid at `instant`.
    #[must_use]
    pub fn is_effective_at(&self, instant: DateTime<Utc>) -> bool {
        in_effectivity_window(self.effective_from, self.effective_to, instant)
    }

    /// Updates the `updated_at` timestamp and bumps the version.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
    }
}
