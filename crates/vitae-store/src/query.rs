//! Graph query engine: bounded traversal and fuzzy label search.
//!
//! The engine:
//! 1. Walks outgoing edges breadth-first, bounded by depth
//! 2. Finds shortest paths within a fixed hop budget
//! 3. Scores labels against a query with a Levenshtein-based formula
//! 4. Resolves a node's full neighborhood context
//!
//! Fuzzy search visits every node per call. That is acceptable while
//! the graph stays in the low thousands of nodes; larger deployments
//! should add prefiltering without changing the scoring formula.

use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};
use vitae_core::error::Result;
use vitae_core::types::{Entity, EntityId, RelationType, Relationship};
use vitae_core::EntityStore;

/// Maximum number of hops considered by [`QueryEngine::shortest_path`].
pub const MAX_PATH_HOPS: usize = 5;

/// A relationship resolved together with the entity on its far side.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedEdge {
    pub relation: Relationship,
    pub other: Entity,
}

/// A node plus its fully resolved incoming and outgoing edges.
#[derive(Debug, Clone, Serialize)]
pub struct EntityContext {
    pub entity: Entity,
    /// Outgoing edges, each with the resolved target entity.
    pub outgoing: Vec<ResolvedEdge>,
    /// Incoming edges, each with the resolved source entity.
    pub incoming: Vec<ResolvedEdge>,
}

/// Read-only query layer over an entity store.
pub struct QueryEngine<'a, S: EntityStore> {
    store: &'a S,
}

impl<'a, S: EntityStore> QueryEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Breadth-first walk over outgoing edges from `start`.
    ///
    /// Returns each reached entity id mapped to the minimum depth at
    /// which it was first discovered; the first-discovered depth is
    /// never overwritten. Nodes discovered at `max_depth` are recorded
    /// but not expanded. The start node is recorded at depth 0. An
    /// unknown start id yields an empty map.
    pub fn bfs(&self, start: &EntityId, max_depth: usize) -> Result<HashMap<EntityId, usize>> {
        let mut depths = HashMap::new();
        if self.store.get_node(start)?.is_none() {
            return Ok(depths);
        }

        let mut queue = VecDeque::new();
        depths.insert(*start, 0);
        queue.push_back((*start, 0));

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for edge in self.store.edges_from(&current)? {
                if !depths.contains_key(&edge.target) {
                    depths.insert(edge.target, depth + 1);
                    queue.push_back((edge.target, depth + 1));
                }
            }
        }

        Ok(depths)
    }

    /// Entity ids reachable from `start` within `depth` hops, excluding
    /// `start` itself.
    pub fn find_related(&self, start: &EntityId, depth: usize) -> Result<HashSet<EntityId>> {
        let mut related: HashSet<EntityId> = self.bfs(start, depth)?.into_keys().collect();
        related.remove(start);
        Ok(related)
    }

    /// Shortest path from `start` to `end` over outgoing edges, bounded
    /// by [`MAX_PATH_HOPS`].
    ///
    /// Returns the entity-id sequence including both endpoints, or an
    /// empty sequence when `end` is unreachable within the bound.
    pub fn shortest_path(&self, start: &EntityId, end: &EntityId) -> Result<Vec<EntityId>> {
        if self.store.get_node(start)?.is_none() {
            return Ok(Vec::new());
        }
        if start == end {
            return Ok(vec![*start]);
        }

        let mut parent: HashMap<EntityId, EntityId> = HashMap::new();
        let mut queue = VecDeque::new();
        queue.push_back((*start, 0usize));
        parent.insert(*start, *start);

        while let Some((current, hops)) = queue.pop_front() {
            if hops >= MAX_PATH_HOPS {
                continue;
            }
            for edge in self.store.edges_from(&current)? {
                if parent.contains_key(&edge.target) {
                    continue;
                }
                parent.insert(edge.target, current);
                if edge.target == *end {
                    // Reconstruct back to the start
                    let mut path = vec![edge.target];
                    let mut node = current;
                    while node != *start {
                        path.push(node);
                        node = parent[&node];
                    }
                    path.push(*start);
                    path.reverse();
                    return Ok(path);
                }
                queue.push_back((edge.target, hops + 1));
            }
        }

        Ok(Vec::new())
    }

    /// Fuzzy label search: keep every entity whose label scores at
    /// least `threshold` against `query`, strongest first (stable on
    /// ties). Scores are not part of the public contract.
    pub fn fuzzy_search(&self, query: &str, threshold: f64) -> Result<Vec<Entity>> {
        let mut scored: Vec<(Entity, f64)> = Vec::new();
        for entity in self.store.all_nodes()? {
            let score = label_similarity(query, &entity.label);
            if score >= threshold {
                scored.push((entity, score));
            }
        }
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(scored.into_iter().map(|(entity, _)| entity).collect())
    }

    /// Outgoing-edge targets of `node` whose relation type is in
    /// `relation_types`, deduplicated.
    pub fn neighbors_by_edge_type(
        &self,
        node: &EntityId,
        relation_types: &[RelationType],
    ) -> Result<Vec<EntityId>> {
        let mut seen = HashSet::new();
        let mut neighbors = Vec::new();
        for edge in self.store.edges_from(node)? {
            if relation_types.contains(&edge.relation_type) && seen.insert(edge.target) {
                neighbors.push(edge.target);
            }
        }
        Ok(neighbors)
    }

    /// The node plus its resolved incoming and outgoing edges, or
    /// `None` when the node does not exist.
    pub fn context(&self, node: &EntityId) -> Result<Option<EntityContext>> {
        let Some(entity) = self.store.get_node(node)? else {
            return Ok(None);
        };

        let mut outgoing = Vec::new();
        for relation in self.store.edges_from(node)? {
            if let Some(target) = self.store.get_node(&relation.target)? {
                outgoing.push(ResolvedEdge {
                    relation,
                    other: target,
                });
            }
        }

        let mut incoming = Vec::new();
        for relation in self.store.edges_to(node)? {
            if let Some(source) = self.store.get_node(&relation.source)? {
                incoming.push(ResolvedEdge {
                    relation,
                    other: source,
                });
            }
        }

        Ok(Some(EntityContext {
            entity,
            outgoing,
            incoming,
        }))
    }
}

/// Similarity of `query` against a node label, in [0, 1].
///
/// 1.0 when the label contains the query, 0.9 when the query contains
/// the label, otherwise `1 − levenshtein / max(len)`. Comparison is
/// case-insensitive.
pub fn label_similarity(query: &str, label: &str) -> f64 {
    let q = query.to_lowercase();
    let l = label.to_lowercase();

    if l.contains(&q) {
        return 1.0;
    }
    if q.contains(&l) {
        return 0.9;
    }

    let distance = levenshtein(&q, &l);
    let max_len = q.chars().count().max(l.chars().count());
    1.0 - distance as f64 / max_len as f64
}

/// Classic dynamic-programming Levenshtein distance over chars, full
/// matrix, no early termination.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (n, m) = (a.len(), b.len());

    let mut matrix = vec![vec![0usize; m + 1]; n + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=m {
        matrix[0][j] = j;
    }

    for i in 1..=n {
        for j in 1..=m {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[n][m]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_store::MemoryStore;
    use vitae_core::types::EntityType;

    fn store_with_chain(len: usize) -> (MemoryStore, Vec<EntityId>) {
        let mut store = MemoryStore::new();
        let mut ids = Vec::new();
        for i in 0..len {
            let e = store
                .upsert_node(Entity::new(EntityType::Skill, format!("n{i}")))
                .unwrap();
            ids.push(e.id);
        }
        for w in ids.windows(2) {
            store
                .upsert_edge(Relationship::new(w[0], w[1], RelationType::RelatedTo))
                .unwrap();
        }
        (store, ids)
    }

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("rust", "rust"), 0);
    }

    #[test]
    fn similarity_substring_rules() {
        assert_eq!(label_similarity("script", "JavaScript"), 1.0);
        assert_eq!(label_similarity("javascript expert", "JavaScript"), 0.9);
        let s = label_similarity("rusr", "rust");
        assert!((s - 0.75).abs() < 1e-10);
    }

    #[test]
    fn bfs_depth_bound_holds() {
        let (store, ids) = store_with_chain(6);
        let engine = QueryEngine::new(&store);

        let depths = engine.bfs(&ids[0], 3).unwrap();
        assert_eq!(depths[&ids[0]], 0);
        assert_eq!(depths[&ids[3]], 3);
        assert!(!depths.contains_key(&ids[4]), "depth 4 is past the bound");
        assert!(depths.values().all(|&d| d <= 3));
    }

    #[test]
    fn bfs_keeps_first_discovered_depth() {
        let mut store = MemoryStore::new();
        let a = store.upsert_node(Entity::new(EntityType::Skill, "a")).unwrap();
        let b = store.upsert_node(Entity::new(EntityType::Skill, "b")).unwrap();
        let c = store.upsert_node(Entity::new(EntityType::Skill, "c")).unwrap();
        // a -> b -> c and a -> c: c is reachable at depth 1 and 2
        store.upsert_edge(Relationship::new(a.id, b.id, RelationType::RelatedTo)).unwrap();
        store.upsert_edge(Relationship::new(b.id, c.id, RelationType::RelatedTo)).unwrap();
        store.upsert_edge(Relationship::new(a.id, c.id, RelationType::RelatedTo)).unwrap();

        let depths = QueryEngine::new(&store).bfs(&a.id, 3).unwrap();
        assert_eq!(depths[&c.id], 1);
    }

    #[test]
    fn bfs_unknown_start_is_empty() {
        let store = MemoryStore::new();
        let depths = QueryEngine::new(&store).bfs(&EntityId::new(), 2).unwrap();
        assert!(depths.is_empty());
    }

    #[test]
    fn find_related_excludes_start() {
        let (store, ids) = store_with_chain(3);
        let engine = QueryEngine::new(&store);

        let related = engine.find_related(&ids[0], 1).unwrap();
        assert_eq!(related, [ids[1]].into_iter().collect());
        assert!(engine.find_related(&ids[0], 0).unwrap().is_empty());
    }

    #[test]
    fn shortest_path_within_bound() {
        let (store, ids) = store_with_chain(6);
        let engine = QueryEngine::new(&store);

        let path = engine.shortest_path(&ids[0], &ids[5]).unwrap();
        assert_eq!(path.len(), 6); // 5 hops, the maximum
        assert_eq!(path.first(), Some(&ids[0]));
        assert_eq!(path.last(), Some(&ids[5]));

        // Each consecutive pair must be edge-connected
        for w in path.windows(2) {
            assert!(store
                .edges_from(&w[0])
                .unwrap()
                .iter()
                .any(|e| e.target == w[1]));
        }
    }

    #[test]
    fn shortest_path_beyond_bound_is_empty() {
        let (store, ids) = store_with_chain(8);
        let engine = QueryEngine::new(&store);
        assert!(engine.shortest_path(&ids[0], &ids[7]).unwrap().is_empty());
    }

    #[test]
    fn shortest_path_respects_direction() {
        let (store, ids) = store_with_chain(3);
        let engine = QueryEngine::new(&store);
        assert!(engine.shortest_path(&ids[2], &ids[0]).unwrap().is_empty());
    }

    #[test]
    fn fuzzy_search_exact_label_scores_one() {
        let mut store = MemoryStore::new();
        let e = store
            .upsert_node(
                Entity::new(EntityType::Skill, "JavaScript").with_confidence(0.95),
            )
            .unwrap();
        store.upsert_node(Entity::new(EntityType::Skill, "Cooking")).unwrap();

        let engine = QueryEngine::new(&store);
        let hits = engine.fuzzy_search("javascript", 0.6).unwrap();
        assert_eq!(hits.iter().map(|e| e.id).collect::<Vec<_>>(), vec![e.id]);

        // Threshold 1.0 still includes the exact match (substring rule)
        let hits = engine.fuzzy_search("JavaScript", 1.0).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn fuzzy_search_orders_by_score() {
        let mut store = MemoryStore::new();
        store.upsert_node(Entity::new(EntityType::Skill, "Rust")).unwrap();
        store.upsert_node(Entity::new(EntityType::Skill, "Rusty tools")).unwrap();
        store.upsert_node(Entity::new(EntityType::Skill, "Crust")).unwrap();

        let engine = QueryEngine::new(&store);
        let hits = engine.fuzzy_search("rust", 0.5).unwrap();
        // All three contain "rust" as a substring and score 1.0; the
        // ordering must at least keep them all.
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn neighbors_filtered_by_relation_type() {
        let mut store = MemoryStore::new();
        let role = store.upsert_node(Entity::new(EntityType::Role, "Lead")).unwrap();
        let sk = store.upsert_node(Entity::new(EntityType::Skill, "Rust")).unwrap();
        let org = store
            .upsert_node(Entity::new(EntityType::Organization, "Acme"))
            .unwrap();
        store
            .upsert_edge(Relationship::new(role.id, sk.id, RelationType::HasSkill))
            .unwrap();
        store
            .upsert_edge(Relationship::new(role.id, org.id, RelationType::WorkedAt))
            .unwrap();

        let engine = QueryEngine::new(&store);
        let n = engine
            .neighbors_by_edge_type(&role.id, &[RelationType::HasSkill])
            .unwrap();
        assert_eq!(n, vec![sk.id]);

        let n = engine
            .neighbors_by_edge_type(&role.id, &[RelationType::HasSkill, RelationType::WorkedAt])
            .unwrap();
        assert_eq!(n.len(), 2);
    }

    #[test]
    fn context_resolves_both_directions() {
        let mut store = MemoryStore::new();
        let role = store.upsert_node(Entity::new(EntityType::Role, "Lead")).unwrap();
        let sk = store.upsert_node(Entity::new(EntityType::Skill, "Rust")).unwrap();
        store
            .upsert_edge(Relationship::new(role.id, sk.id, RelationType::HasSkill))
            .unwrap();

        let engine = QueryEngine::new(&store);
        let ctx = engine.context(&sk.id).unwrap().unwrap();
        assert_eq!(ctx.entity.id, sk.id);
        assert!(ctx.outgoing.is_empty());
        assert_eq!(ctx.incoming.len(), 1);
        assert_eq!(ctx.incoming[0].other.id, role.id);

        assert!(engine.context(&EntityId::new()).unwrap().is_none());
    }
}
