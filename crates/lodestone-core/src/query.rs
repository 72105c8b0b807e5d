//! Immutable query descriptors for entity and relationship retrieval.
//!
//! A descriptor is fixed at cursor construction; all per-call variance is
//! carried by the paging window.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::entity::TypeRef;
use crate::status::InstanceStatus;

/// Scoped entity listing: type, status set, classification set,
/// effective-time instant, plus the lineage and duplicate-processing
/// modifiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityQuery {
    /// Restrict results to this type. `None` matches all types.
    pub type_ref: Option<TypeRef>,
    /// Allowed lifecycle statuses. Empty means all statuses.
    pub statuses: Vec<InstanceStatus>,
    /// Allowed classification names; an entity passes when it carries at
    /// least one of them. Empty means unconstrained.
    pub classifications: Vec<String>,
    /// Only return instances valid at this instant.
    pub effective_at: Option<DateTime<Utc>>,
    /// Include soft-deleted and placeholder instances needed for
    /// provenance chains.
    pub include_lineage: bool,
    /// Disable automatic suppression of known duplicates.
    pub skip_duplicate_processing: bool,
}

impl EntityQuery {
    /// Creates an unconstrained entity query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a single type.
    #[must_use]
    pub fn with_type(mut self, type_ref: TypeRef) -> Self {
        self.type_ref = Some(type_ref);
        self
    }

    /// Restrict to the given lifecycle statuses.
    #[must_use]
    pub fn with_statuses(mut self, statuses: Vec<InstanceStatus>) -> Self {
        self.statuses = statuses;
        self
    }

    /// Restrict to entities carrying at least one named classification.
    #[must_use]
    pub fn with_classifications(mut self, names: Vec<String>) -> Self {
        self.classifications = names;
        self
    }

    /// Only return instances valid at `instant`.
    #[must_use]
    pub fn effective_at(mut self, instant: DateTime<Utc>) -> Self {
        self.effective_at = Some(instant);
        self
    }

    /// Include lineage-only instances.
    #[must_use]
    pub fn for_lineage(mut self) -> Self {
        self.include_lineage = true;
        self
    }

    /// Disable duplicate suppression.
    #[must_use]
    pub fn skip_duplicates(mut self) -> Self {
        self.skip_duplicate_processing = true;
        self
    }
}

/// Property-searched relationship listing with historical support.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipQuery {
    /// Restrict results to this type. `None` matches all types.
    pub type_ref: Option<TypeRef>,
    /// Property predicate. `None` matches all relationships.
    pub predicate: Option<PropertyFilter>,
    /// Allowed lifecycle statuses. Empty means all statuses.
    pub statuses: Vec<InstanceStatus>,
    /// Evaluate the query as of this instant.
    pub as_of: Option<DateTime<Utc>>,
    /// Property to sequence results by, for the property-based orders.
    pub sequencing_property: Option<String>,
    /// Result ordering. Defaults to most-recently-created first.
    pub sequencing_order: SequencingOrder,
    /// Include soft-deleted instances needed for provenance chains.
    pub include_lineage: bool,
    /// Carried for interface completeness; relationship search is not
    /// subject to duplicate suppression.
    pub skip_duplicate_processing: bool,
}

impl RelationshipQuery {
    /// Creates an unconstrained relationship query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a single type.
    #[must_use]
    pub fn with_type(mut self, type_ref: TypeRef) -> Self {
        self.type_ref = Some(type_ref);
        self
    }

    /// Apply a property predicate.
    #[must_use]
    pub fn with_predicate(mut self, predicate: PropertyFilter) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Restrict to the given lifecycle statuses.
    #[must_use]
    pub fn with_statuses(mut self, statuses: Vec<InstanceStatus>) -> Self {
        self.statuses = statuses;
        self
    }

    /// Evaluate the query as of `instant`.
    #[must_use]
    pub fn as_of(mut self, instant: DateTime<Utc>) -> Self {
        self.as_of = Some(instant);
        self
    }

    /// Sequence results by the named property in the given order.
    #[must_use]
    pub fn sequenced_by(mut self, property: impl Into<String>, order: SequencingOrder) -> Self {
        self.sequencing_property = Some(property.into());
        self.sequencing_order = order;
        self
    }

    /// Set the result ordering.
    #[must_use]
    pub fn with_order(mut self, order: SequencingOrder) -> Self {
        self.sequencing_order = order;
        self
    }

    /// Include lineage-only instances.
    #[must_use]
    pub fn for_lineage(mut self) -> Self {
        self.include_lineage = true;
        self
    }
}

/// Result ordering for relationship search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencingOrder {
    /// Most recently created first.
    CreationDateRecent,
    /// Oldest created first.
    CreationDateOldest,
    /// Most recently updated first.
    LastUpdateRecent,
    /// Least recently updated first.
    LastUpdateOldest,
    /// Ascending by the sequencing property.
    PropertyAscending,
    /// Descending by the sequencing property.
    PropertyDescending,
}

impl Default for SequencingOrder {
    fn default() -> Self {
        Self::CreationDateRecent
    }
}

/// How the conditions of a [`PropertyFilter`] combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Every condition must hold.
    All,
    /// At least one condition must hold.
    Any,
}

impl Default for MatchMode {
    fn default() -> Self {
        Self::All
    }
}

/// Comparison operator for a single property condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyOperator {
    Eq,
    NotEq,
    Contains,
    StartsWith,
    GreaterThan,
    LessThan,
}

/// A single property comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyCondition {
    /// Property name to compare.
    pub property: String,
    /// Comparison operator.
    pub operator: PropertyOperator,
    /// Value to compare against.
    pub value: JsonValue,
}

impl PropertyCondition {
    /// Creates a condition.
    #[must_use]
    pub fn new(property: impl Into<String>, operator: PropertyOperator, value: JsonValue) -> Self {
        Self {
            property: property.into(),
            operator,
            value,
        }
    }

    /// Evaluates this condition against an instance property object.
    ///
    /// A missing property never matches, whatever the operator.
    #[must_use]
    pub fn matches(&self, properties: &JsonValue) -> bool {
        let Some(actual) = properties.get(&self.property) else {
            return false;
        };
        match self.operator {
            PropertyOperator::Eq => actual == &self.value,
            PropertyOperator::NotEq => actual != &self.value,
            PropertyOperator::Contains => match (actual.as_str(), self.value.as_str()) {
                (Some(haystack), Some(needle)) => haystack.contains(needle),
                _ => false,
            },
            PropertyOperator::StartsWith => match (actual.as_str(), self.value.as_str()) {
                (Some(haystack), Some(prefix)) => haystack.starts_with(prefix),
                _ => false,
            },
            PropertyOperator::GreaterThan => compare_ordered(actual, &self.value)
                .is_some_and(|ord| ord == std::cmp::Ordering::Greater),
            PropertyOperator::LessThan => compare_ordered(actual, &self.value)
                .is_some_and(|ord| ord == std::cmp::Ordering::Less),
        }
    }
}

/// Structured property-search predicate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyFilter {
    /// Individual property comparisons.
    pub conditions: Vec<PropertyCondition>,
    /// How the conditions combine.
    pub match_mode: MatchMode,
}

impl PropertyFilter {
    /// Creates a filter that requires every condition to hold.
    #[must_use]
    pub fn all(conditions: Vec<PropertyCondition>) -> Self {
        Self {
            conditions,
            match_mode: MatchMode::All,
        }
    }

    /// Creates a filter that requires at least one condition to hold.
    #[must_use]
    pub fn any(conditions: Vec<PropertyCondition>) -> Self {
        Self {
            conditions,
            match_mode: MatchMode::Any,
        }
    }

    /// Evaluates the filter against an instance property object.
    ///
    /// An empty condition list matches everything.
    #[must_use]
    pub fn matches(&self, properties: &JsonValue) -> bool {
        if self.conditions.is_empty() {
            return true;
        }
        match self.match_mode {
            MatchMode::All => self.conditions.iter().all(|c| c.matches(properties)),
            MatchMode::Any => self.conditions.iter().any(|c| c.matches(properties)),
        }
    }
}

/// Orders two JSON scalars when they are comparable (both numbers or
/// both strings).
fn compare_ordered(left: &JsonValue, right: &JsonValue) -> Option<std::cmp::Ordering> {
    if let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) {
        return l.partial_cmp(&r);
    }
    if let (Some(l), Some(r)) = (left.as_str(), right.as_str()) {
        return Some(l.cmp(r));
    }
    None
}
