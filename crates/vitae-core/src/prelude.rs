//! Common imports for working with vitae-core.

pub use crate::error::{Result, VitaeError};
pub use crate::store::{EntityStore, StoreStats};
pub use crate::types::{
    clamp_unit, Entity, EntityId, EntityMetadata, EntitySource, EntityType, FeedbackDraft,
    FeedbackId, FeedbackRecord, RelationId, RelationMetadata, RelationProperties, RelationType,
    Relationship, Verdict,
};
