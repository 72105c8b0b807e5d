//! Core domain types and traits for the Lodestone metadata catalog.

pub mod anomaly;
pub mod config;
pub mod entity;
pub mod error;
pub mod ids;
pub mod paging;
pub mod port;
pub mod query;
pub mod relationship;
pub mod status;

pub use anomaly::{AnomalyNotice, AnomalyReporter, NullAnomalyReporter, TracingAnomalyReporter};
pub use config::{LodestoneConfig, ScanConfig};
pub use entity::{Classification, Entity, TypeRef, MEMENTO_CLASSIFICATION};
pub use error::{StoreError, StoreResult};
pub use ids::{EntityId, Principal, RelationshipId, TypeDefId};
pub use paging::{PageRequestPolicy, PagingWindow};
pub use port::MetadataQueryPort;
pub use query::{
    EntityQuery, MatchMode, PropertyCondition, PropertyFilter, PropertyOperator,
    RelationshipQuery, SequencingOrder,
};
pub use relationship::Relationship;
pub use status::InstanceStatus;
