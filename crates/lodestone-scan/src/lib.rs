//! Buffered pull cursors over the Lodestone metadata query port.
//!
//! Two cursor strategies share one pull protocol: entity listings keep
//! fetching past pages the store filtered empty (fixed-stride advance),
//! while relationship searches treat the first empty page as the end
//! (actual-length advance).

pub mod cursor;
pub mod entity_cursor;
pub mod relationship_cursor;

pub use cursor::MetadataCursor;
pub use entity_cursor::EntityCursor;
pub use relationship_cursor::RelationshipCursor;
