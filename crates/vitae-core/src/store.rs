//! The `EntityStore` trait: durable keyed storage of entities and
//! relationships with secondary indices.
//!
//! Implementations keep three relationship indices (by source, by
//! target, by relation type) and two entity indices (by type, lowercase
//! label) consistent with the primary records: a record is never
//! visible through one index and absent from another.
//!
//! Methods return owned values so that both in-memory and database
//! backends can implement the full contract.

use crate::error::Result;
use crate::types::{Entity, EntityId, EntityType, RelationId, RelationType, Relationship};
use serde::{Deserialize, Serialize};

/// Node and edge counts, computed from index sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub node_count: usize,
    pub edge_count: usize,
}

/// Keyed storage of the knowledge graph.
///
/// `upsert_*` operations are keyed by id: re-submitting an id replaces
/// the prior value entirely, never partially merges. Every mutator
/// clamps confidence and weight values into [0, 1] before storing.
pub trait EntityStore {
    /// Insert or fully replace an entity.
    ///
    /// Fails with a `ValidationError` when the label is empty.
    /// Returns the stored entity (with clamped confidence).
    fn upsert_node(&mut self, entity: Entity) -> Result<Entity>;

    /// Look up an entity by id. Absence is not an error.
    fn get_node(&self, id: &EntityId) -> Result<Option<Entity>>;

    /// All entities of the given type. Order is unspecified.
    fn nodes_by_type(&self, entity_type: EntityType) -> Result<Vec<Entity>>;

    /// Case-insensitive substring match over entity labels, backed by a
    /// precomputed lowercase index.
    fn search_label(&self, query: &str) -> Result<Vec<Entity>>;

    /// Remove an entity, its index entries, and all incident
    /// relationships. Returns whether the entity existed.
    fn delete_node(&mut self, id: &EntityId) -> Result<bool>;

    /// Insert or fully replace a relationship.
    ///
    /// Fails with a `ValidationError` when either endpoint does not
    /// reference an existing entity.
    fn upsert_edge(&mut self, relation: Relationship) -> Result<Relationship>;

    /// Look up a relationship by id.
    fn get_edge(&self, id: &RelationId) -> Result<Option<Relationship>>;

    /// All relationships leaving the given entity.
    fn edges_from(&self, source: &EntityId) -> Result<Vec<Relationship>>;

    /// All relationships arriving at the given entity.
    fn edges_to(&self, target: &EntityId) -> Result<Vec<Relationship>>;

    /// All relationships of the given type.
    fn edges_by_type(&self, relation_type: RelationType) -> Result<Vec<Relationship>>;

    /// Remove a relationship and its index entries. Returns whether it
    /// existed.
    fn delete_edge(&mut self, id: &RelationId) -> Result<bool>;

    /// Every entity in the store.
    fn all_nodes(&self) -> Result<Vec<Entity>>;

    /// Every relationship in the store.
    fn all_edges(&self) -> Result<Vec<Relationship>>;

    /// Counts from index sizes, not full scans.
    fn statistics(&self) -> Result<StoreStats>;

    /// Empty both stores and all indices atomically: either fully
    /// succeeds or leaves the prior state untouched.
    fn clear(&mut self) -> Result<()>;
}
