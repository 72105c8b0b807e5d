//! Entity instance domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::ids::{EntityId, TypeDefId};
use crate::status::InstanceStatus;

/// Classification name reserved for lineage-only placeholder instances.
///
/// Instances carrying this classification exist to reconstruct historical
/// provenance chains and are hidden from retrieval unless the query asks
/// for lineage.
pub const MEMENTO_CLASSIFICATION: &str = "Memento";

/// Reference to a type definition: stable identifier plus display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    /// Stable type definition identifier.
    pub type_id: TypeDefId,
    /// Unique type name (e.g. `"DataAsset"`).
    pub name: String,
}

impl TypeRef {
    /// Creates a type reference with a freshly minted type id.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            type_id: TypeDefId::new(),
            name: name.into(),
        }
    }
}

/// Classification attached to an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    /// Classification name (e.g. `"Confidential"`).
    pub name: String,
    /// Free-form classification properties.
    pub properties: JsonValue,
    /// Start of the classification's validity period (inclusive).
    pub effective_from: Option<DateTime<Utc>>,
    /// End of the classification's validity period (exclusive).
    pub effective_to: Option<DateTime<Utc>>,
}

impl Classification {
    /// Creates a classification with no properties and open effectivity.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: JsonValue::Null,
            effective_from: None,
            effective_to: None,
        }
    }

    /// Add classification properties.
    #[must_use]
    pub fn with_properties(mut self, properties: JsonValue) -> Self {
        self.properties = properties;
        self
    }
}

/// A typed metadata entity instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    /// Stable entity identifier.
    pub entity_id: EntityId,
    /// Type of this entity.
    pub type_ref: TypeRef,
    /// Lifecycle status.
    pub status: InstanceStatus,
    /// Classifications attached to this entity.
    pub classifications: Vec<Classification>,
    /// Free-form instance properties.
    pub properties: JsonValue,
    /// Canonical entity this instance duplicates, if the store has
    /// identified it as a non-surviving duplicate.
    pub duplicate_of: Option<EntityId>,
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

impl Entity {
    /// Creates a new active entity with open effectivity.
    #[must_use]
    pub fn new(type_ref: TypeRef, properties: JsonValue) -> Self {
        let now = Utc::now();
        Self {
            entity_id: EntityId::new(),
            type_ref,
            status: InstanceStatus::Active,
            classifications: Vec::new(),
            properties,
            duplicate_of: None,
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

    /// Attach a classification.
    #[must_use]
    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classifications.push(classification);
        self
    }

    /// Mark this instance as a duplicate of a canonical entity.
    #[must_use]
    pub fn with_duplicate_of(mut self, canonical: EntityId) -> Self {
        self.duplicate_of = Some(canonical);
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

    /// Returns true when the entity carries the named classification.
    #[must_use]
    pub fn has_classification(&self, name: &str) -> bool {
        self.classifications.iter().any(|c| c.name == name)
    }

    /// Returns true when the instance is valid at `instant`.
    ///
    /// An absent bound is open: `effective_from = None` means "since
    /// forever", `effective_to = None` means "until further notice".
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

/// Shared effectivity check: `from` inclusive, `to` exclusive, absent
/// bounds open.
pub(crate) fn in_effectivity_window(
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    instant: DateTime<Utc>,
) -> bool {
    if let Some(from) = from {
        if instant < from {
            return false;
        }
    }
    if let Some(to) = to {
        if instant >= to {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn effectivity_open_bounds() {
        let entity = Entity::new(TypeRef::named("DataAsset"), JsonValue::Null);
        assert!(entity.is_effective_at(Utc::now()));
        assert!(entity.is_effective_at(Utc::now() - Duration::days(365)));
    }

    #[test]
    fn effectivity_window_is_half_open() {
        let from = Utc::now();
        let to = from + Duration::hours(1);
        let entity = Entity::new(TypeRef::named("DataAsset"), JsonValue::Null)
            .with_effectivity(Some(from), Some(to));

        assert!(entity.is_effective_at(from));
        assert!(entity.is_effective_at(from + Duration::minutes(30)));
        assert!(!entity.is_effective_at(to));
        assert!(!entity.is_effective_at(from - Duration::seconds(1)));
    }

    #[test]
    fn classification_lookup() {
        let entity = Entity::new(TypeRef::named("DataAsset"), JsonValue::Null)
            .with_classification(Classification::new("Confidential"));

        assert!(entity.has_classification("Confidential"));
        assert!(!entity.has_classification(MEMENTO_CLASSIFICATION));
    }

    #[test]
    fn touch_bumps_version() {
        let mut entity = Entity::new(TypeRef::named("DataAsset"), JsonValue::Null);
        assert_eq!(entity.version, 1);
        entity.touch();
        assert_eq!(entity.version, 2);
    }
}
