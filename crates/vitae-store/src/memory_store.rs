//! In-memory implementation of the EntityStore trait using petgraph.
//!
//! The graph is the backing store; HashMap indices give O(1) lookup by
//! id and O(1) access to the per-type and label secondary indices.
//! Deleting an entity cascades to its incident relationships so
//! traversal never meets a dangling endpoint.

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use vitae_core::error::Result;
use vitae_core::types::{clamp_unit, Entity, EntityId, EntityType, RelationId, RelationType, Relationship};
use vitae_core::{EntityStore, StoreStats, VitaeError};

/// Petgraph-backed entity store.
#[derive(Debug)]
pub struct MemoryStore {
    graph: StableDiGraph<Entity, Relationship>,
    /// Map from entity id to petgraph's internal index.
    node_index: HashMap<EntityId, NodeIndex>,
    /// Map from relation id to petgraph's internal edge index.
    edge_index: HashMap<RelationId, EdgeIndex>,
    /// Entity ids grouped by entity type.
    type_index: HashMap<EntityType, HashSet<EntityId>>,
    /// Lowercase label per entity for substring search.
    label_index: HashMap<EntityId, String>,
    /// Relation ids grouped by relation type.
    relation_type_index: HashMap<RelationType, HashSet<RelationId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
            node_index: HashMap::new(),
            edge_index: HashMap::new(),
            type_index: HashMap::new(),
            label_index: HashMap::new(),
            relation_type_index: HashMap::new(),
        }
    }

    fn validate_node(entity: &mut Entity) -> Result<()> {
        if entity.label.trim().is_empty() {
            return Err(VitaeError::empty_label());
        }
        entity.metadata.confidence = clamp_unit(entity.metadata.confidence);
        entity.metadata.frequency = entity.metadata.frequency.max(1);
        Ok(())
    }

    fn validate_edge(&self, relation: &mut Relationship) -> Result<()> {
        if !self.node_index.contains_key(&relation.source) {
            return Err(VitaeError::missing_endpoint(
                relation.id.to_string(),
                relation.source.to_string(),
            ));
        }
        if !self.node_index.contains_key(&relation.target) {
            return Err(VitaeError::missing_endpoint(
                relation.id.to_string(),
                relation.target.to_string(),
            ));
        }
        relation.properties.weight = clamp_unit(relation.properties.weight);
        relation.metadata.confidence = clamp_unit(relation.metadata.confidence);
        Ok(())
    }

    /// Remove an edge from the graph and every index. Returns the
    /// removed relationship.
    fn remove_edge_entry(&mut self, id: &RelationId) -> Option<Relationship> {
        let eidx = self.edge_index.remove(id)?;
        let relation = self.graph.remove_edge(eidx)?;
        if let Some(ids) = self.relation_type_index.get_mut(&relation.relation_type) {
            ids.remove(id);
        }
        Some(relation)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore for MemoryStore {
    fn upsert_node(&mut self, mut entity: Entity) -> Result<Entity> {
        Self::validate_node(&mut entity)?;
        let id = entity.id;

        if let Some(&idx) = self.node_index.get(&id) {
            // Full replacement: drop the old type-index entry first in
            // case the type changed.
            let old_type = self.graph[idx].entity_type;
            if let Some(ids) = self.type_index.get_mut(&old_type) {
                ids.remove(&id);
            }
            self.graph[idx] = entity.clone();
        } else {
            let idx = self.graph.add_node(entity.clone());
            self.node_index.insert(id, idx);
        }

        self.type_index
            .entry(entity.entity_type)
            .or_default()
            .insert(id);
        self.label_index.insert(id, entity.label.to_lowercase());

        debug!(entity = %id, label = %entity.label, "upserted node");
        Ok(entity)
    }

    fn get_node(&self, id: &EntityId) -> Result<Option<Entity>> {
        Ok(self.node_index.get(id).map(|&idx| self.graph[idx].clone()))
    }

    fn nodes_by_type(&self, entity_type: EntityType) -> Result<Vec<Entity>> {
        let Some(ids) = self.type_index.get(&entity_type) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| self.node_index.get(id))
            .map(|&idx| self.graph[idx].clone())
            .collect())
    }

    fn search_label(&self, query: &str) -> Result<Vec<Entity>> {
        let needle = query.to_lowercase();
        Ok(self
            .label_index
            .iter()
            .filter(|(_, label)| label.contains(&needle))
            .filter_map(|(id, _)| self.node_index.get(id))
            .map(|&idx| self.graph[idx].clone())
            .collect())
    }

    fn delete_node(&mut self, id: &EntityId) -> Result<bool> {
        let Some(&idx) = self.node_index.get(id) else {
            return Ok(false);
        };

        // Cascade: remove incident edges through the same path as
        // delete_edge so the relation indices stay consistent.
        let incident: Vec<RelationId> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .chain(self.graph.edges_directed(idx, Direction::Incoming))
            .map(|e| e.weight().id)
            .collect();
        for rid in &incident {
            self.remove_edge_entry(rid);
        }

        let entity = self.graph.remove_node(idx);
        self.node_index.remove(id);
        self.label_index.remove(id);
        if let Some(entity) = &entity {
            if let Some(ids) = self.type_index.get_mut(&entity.entity_type) {
                ids.remove(id);
            }
        }

        debug!(entity = %id, edges = incident.len(), "deleted node");
        Ok(true)
    }

    fn upsert_edge(&mut self, mut relation: Relationship) -> Result<Relationship> {
        self.validate_edge(&mut relation)?;
        let id = relation.id;

        // Replacement may move the edge between different endpoints, so
        // drop any prior edge with this id before re-adding.
        self.remove_edge_entry(&id);

        let from = self.node_index[&relation.source];
        let to = self.node_index[&relation.target];
        let eidx = self.graph.add_edge(from, to, relation.clone());
        self.edge_index.insert(id, eidx);
        self.relation_type_index
            .entry(relation.relation_type)
            .or_default()
            .insert(id);

        debug!(relation = %id, kind = %relation.relation_type, "upserted edge");
        Ok(relation)
    }

    fn get_edge(&self, id: &RelationId) -> Result<Option<Relationship>> {
        Ok(self
            .edge_index
            .get(id)
            .and_then(|&eidx| self.graph.edge_weight(eidx))
            .cloned())
    }

    fn edges_from(&self, source: &EntityId) -> Result<Vec<Relationship>> {
        let Some(&idx) = self.node_index.get(source) else {
            return Ok(Vec::new());
        };
        Ok(self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| e.weight().clone())
            .collect())
    }

    fn edges_to(&self, target: &EntityId) -> Result<Vec<Relationship>> {
        let Some(&idx) = self.node_index.get(target) else {
            return Ok(Vec::new());
        };
        Ok(self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| e.weight().clone())
            .collect())
    }

    fn edges_by_type(&self, relation_type: RelationType) -> Result<Vec<Relationship>> {
        let Some(ids) = self.relation_type_index.get(&relation_type) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| self.edge_index.get(id))
            .filter_map(|&eidx| self.graph.edge_weight(eidx))
            .cloned()
            .collect())
    }

    fn delete_edge(&mut self, id: &RelationId) -> Result<bool> {
        let removed = self.remove_edge_entry(id).is_some();
        if removed {
            debug!(relation = %id, "deleted edge");
        }
        Ok(removed)
    }

    fn all_nodes(&self) -> Result<Vec<Entity>> {
        Ok(self.graph.node_weights().cloned().collect())
    }

    fn all_edges(&self) -> Result<Vec<Relationship>> {
        Ok(self.graph.edge_weights().cloned().collect())
    }

    fn statistics(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            node_count: self.node_index.len(),
            edge_count: self.edge_index.len(),
        })
    }

    fn clear(&mut self) -> Result<()> {
        *self = Self::new();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(label: &str) -> Entity {
        Entity::new(EntityType::Skill, label)
    }

    #[test]
    fn upsert_replaces_by_id() {
        let mut store = MemoryStore::new();
        let mut e = skill("JavaScript");
        let id = e.id;
        store.upsert_node(e.clone()).unwrap();

        e.label = "TypeScript".to_string();
        e.entity_type = EntityType::TechSkill;
        store.upsert_node(e).unwrap();

        assert_eq!(store.statistics().unwrap().node_count, 1);
        let stored = store.get_node(&id).unwrap().unwrap();
        assert_eq!(stored.label, "TypeScript");
        // Type index follows the replacement
        assert!(store.nodes_by_type(EntityType::Skill).unwrap().is_empty());
        assert_eq!(store.nodes_by_type(EntityType::TechSkill).unwrap().len(), 1);
        // Label index follows the replacement
        assert!(store.search_label("javascript").unwrap().is_empty());
        assert_eq!(store.search_label("typescript").unwrap().len(), 1);
    }

    #[test]
    fn empty_label_rejected() {
        let mut store = MemoryStore::new();
        let e = skill("   ");
        assert!(store.upsert_node(e).is_err());
    }

    #[test]
    fn confidence_clamped_on_upsert() {
        let mut store = MemoryStore::new();
        let mut e = skill("Rust");
        e.metadata.confidence = 3.5;
        let stored = store.upsert_node(e).unwrap();
        assert_eq!(stored.metadata.confidence, 1.0);
    }

    #[test]
    fn search_label_is_case_insensitive_substring() {
        let mut store = MemoryStore::new();
        store.upsert_node(skill("Cell Biology")).unwrap();
        store.upsert_node(skill("Machine Learning")).unwrap();

        assert_eq!(store.search_label("cell").unwrap().len(), 1);
        assert_eq!(store.search_label("LEARN").unwrap().len(), 1);
        assert!(store.search_label("chemistry").unwrap().is_empty());
    }

    #[test]
    fn edge_requires_existing_endpoints() {
        let mut store = MemoryStore::new();
        let a = store.upsert_node(skill("a")).unwrap();
        let ghost = EntityId::new();
        let r = Relationship::new(a.id, ghost, RelationType::RelatedTo);
        assert!(store.upsert_edge(r).is_err());
    }

    #[test]
    fn edge_visible_through_all_three_indices() {
        let mut store = MemoryStore::new();
        let role = store.upsert_node(Entity::new(EntityType::Role, "Engineer")).unwrap();
        let sk = store.upsert_node(skill("Rust")).unwrap();
        let r = store
            .upsert_edge(Relationship::new(role.id, sk.id, RelationType::HasSkill))
            .unwrap();

        assert_eq!(store.edges_from(&role.id).unwrap().len(), 1);
        assert_eq!(store.edges_to(&sk.id).unwrap().len(), 1);
        assert_eq!(store.edges_by_type(RelationType::HasSkill).unwrap().len(), 1);
        assert_eq!(store.get_edge(&r.id).unwrap().unwrap().id, r.id);
    }

    #[test]
    fn delete_node_cascades_to_edges() {
        let mut store = MemoryStore::new();
        let role = store.upsert_node(Entity::new(EntityType::Role, "Engineer")).unwrap();
        let sk = store.upsert_node(skill("Rust")).unwrap();
        let r = store
            .upsert_edge(Relationship::new(role.id, sk.id, RelationType::HasSkill))
            .unwrap();

        assert!(store.delete_node(&sk.id).unwrap());

        assert!(store.get_edge(&r.id).unwrap().is_none());
        assert!(store.edges_from(&role.id).unwrap().is_empty());
        assert!(store.edges_by_type(RelationType::HasSkill).unwrap().is_empty());
        assert_eq!(store.statistics().unwrap().edge_count, 0);
    }

    #[test]
    fn delete_missing_node_is_false_not_error() {
        let mut store = MemoryStore::new();
        assert!(!store.delete_node(&EntityId::new()).unwrap());
    }

    #[test]
    fn upsert_edge_can_move_endpoints() {
        let mut store = MemoryStore::new();
        let a = store.upsert_node(skill("a")).unwrap();
        let b = store.upsert_node(skill("b")).unwrap();
        let c = store.upsert_node(skill("c")).unwrap();

        let mut r = Relationship::new(a.id, b.id, RelationType::RelatedTo);
        store.upsert_edge(r.clone()).unwrap();
        r.target = c.id;
        store.upsert_edge(r.clone()).unwrap();

        assert_eq!(store.statistics().unwrap().edge_count, 1);
        let edges_a = store.edges_from(&a.id).unwrap();
        assert_eq!(edges_a.len(), 1);
        assert_eq!(edges_a[0].target, c.id);
        assert!(store.edges_to(&b.id).unwrap().is_empty());
    }

    #[test]
    fn clear_empties_everything() {
        let mut store = MemoryStore::new();
        let a = store.upsert_node(skill("a")).unwrap();
        let b = store.upsert_node(skill("b")).unwrap();
        store
            .upsert_edge(Relationship::new(a.id, b.id, RelationType::RelatedTo))
            .unwrap();

        store.clear().unwrap();
        let stats = store.statistics().unwrap();
        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.edge_count, 0);
        assert!(store.search_label("a").unwrap().is_empty());
        assert!(store.all_edges().unwrap().is_empty());
    }

    // Index consistency after an arbitrary upsert/delete sequence: the
    // per-type index must contain exactly the surviving nodes of that type.
    #[test]
    fn type_index_matches_full_scan() {
        let mut store = MemoryStore::new();
        let mut ids = Vec::new();
        for i in 0..10 {
            let ty = if i % 2 == 0 { EntityType::Skill } else { EntityType::Project };
            let e = store.upsert_node(Entity::new(ty, format!("n{i}"))).unwrap();
            ids.push(e.id);
        }
        for id in ids.iter().step_by(3) {
            store.delete_node(id).unwrap();
        }

        for ty in EntityType::ALL {
            let indexed: std::collections::HashSet<EntityId> =
                store.nodes_by_type(ty).unwrap().iter().map(|e| e.id).collect();
            let scanned: std::collections::HashSet<EntityId> = store
                .all_nodes()
                .unwrap()
                .iter()
                .filter(|e| e.entity_type == ty)
                .map(|e| e.id)
                .collect();
            assert_eq!(indexed, scanned, "type index diverged for {ty}");
        }
    }

    #[test]
    fn petgraph_edge_ids_stay_stable() {
        let mut store = MemoryStore::new();
        let a = store.upsert_node(skill("a")).unwrap();
        let b = store.upsert_node(skill("b")).unwrap();
        let c = store.upsert_node(skill("c")).unwrap();
        let r1 = store
            .upsert_edge(Relationship::new(a.id, b.id, RelationType::RelatedTo))
            .unwrap();
        let r2 = store
            .upsert_edge(Relationship::new(b.id, c.id, RelationType::RelatedTo))
            .unwrap();

        store.delete_edge(&r1.id).unwrap();
        // r2 must still resolve after r1's removal
        let stored = store.get_edge(&r2.id).unwrap().unwrap();
        assert_eq!(stored.source, b.id);
        assert_eq!(
            store
                .edges_from(&b.id)
                .unwrap()
                .iter()
                .map(|e| e.id)
                .collect::<Vec<_>>(),
            vec![r2.id]
        );
    }
}
