//! Relevance matcher: context-driven candidate ranking.
//!
//! Three independent strategies contribute candidates:
//! 1. Type match: entities of the candidate types, at `0.7 × weight`
//! 2. Keyword search: fuzzy label search per intent keyword, at
//!    `0.8 × weight`
//! 3. Sibling search: fuzzy search over sibling-derived keywords, at a
//!    fixed 0.6 that does not scale with the context weight
//!
//! Results merge by entity id, keeping the maximum score seen; final
//! order is descending score with a stable first-seen tie-break.

use serde::Serialize;
use std::collections::HashMap;
use vitae_core::error::Result;
use vitae_core::types::{clamp_unit, Entity, EntityId, EntityType};
use vitae_core::EntityStore;
use vitae_store::QueryEngine;

/// Score for a candidate produced by the type-match strategy.
pub const TYPE_MATCH_WEIGHT: f64 = 0.7;
/// Score for a candidate produced by intent-keyword fuzzy search.
pub const KEYWORD_MATCH_WEIGHT: f64 = 0.8;
/// Fixed score for sibling-derived candidates.
pub const SIBLING_MATCH_SCORE: f64 = 0.6;
/// Fuzzy-search threshold used by the keyword strategies.
pub const KEYWORD_FUZZY_THRESHOLD: f64 = 0.5;

/// A normalized request context, produced by an external analyzer.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Entity types the context suggests.
    pub entity_type_candidates: Vec<EntityType>,
    /// Keywords extracted from the request intent.
    pub intent_keywords: Vec<String>,
    /// How strongly the surrounding context implies the intent, in [0, 1].
    pub context_weight: f64,
    /// Keywords derived from sibling/neighborhood context. Empty
    /// disables the sibling strategy.
    pub sibling_keywords: Vec<String>,
}

impl RequestContext {
    pub fn new(context_weight: f64) -> Self {
        Self {
            context_weight: clamp_unit(context_weight),
            ..Default::default()
        }
    }

    pub fn with_types(mut self, types: Vec<EntityType>) -> Self {
        self.entity_type_candidates = types;
        self
    }

    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.intent_keywords = keywords;
        self
    }

    pub fn with_sibling_keywords(mut self, keywords: Vec<String>) -> Self {
        self.sibling_keywords = keywords;
        self
    }
}

/// A candidate entity with its combined relevance score.
#[derive(Debug, Clone, Serialize)]
pub struct RankedEntity {
    pub entity: Entity,
    pub score: f64,
}

/// Pools the three matching strategies over a store.
pub struct RelevanceMatcher;

impl RelevanceMatcher {
    /// Rank up to `max_results` entities relevant to `context`.
    pub fn rank<S: EntityStore>(
        store: &S,
        context: &RequestContext,
        max_results: usize,
    ) -> Result<Vec<RankedEntity>> {
        let weight = clamp_unit(context.context_weight);
        let engine = QueryEngine::new(store);

        // First-seen order is preserved for the stable tie-break.
        let mut pool: Vec<RankedEntity> = Vec::new();
        let mut position: HashMap<EntityId, usize> = HashMap::new();

        let mut add = |pool: &mut Vec<RankedEntity>,
                       position: &mut HashMap<EntityId, usize>,
                       entity: Entity,
                       score: f64| {
            match position.get(&entity.id) {
                Some(&i) => {
                    if score > pool[i].score {
                        pool[i].score = score;
                    }
                }
                None => {
                    position.insert(entity.id, pool.len());
                    pool.push(RankedEntity { entity, score });
                }
            }
        };

        for &entity_type in &context.entity_type_candidates {
            for entity in store.nodes_by_type(entity_type)? {
                add(&mut pool, &mut position, entity, TYPE_MATCH_WEIGHT * weight);
            }
        }

        for keyword in &context.intent_keywords {
            for entity in engine.fuzzy_search(keyword, KEYWORD_FUZZY_THRESHOLD)? {
                add(
                    &mut pool,
                    &mut position,
                    entity,
                    KEYWORD_MATCH_WEIGHT * weight,
                );
            }
        }

        for keyword in &context.sibling_keywords {
            for entity in engine.fuzzy_search(keyword, KEYWORD_FUZZY_THRESHOLD)? {
                add(&mut pool, &mut position, entity, SIBLING_MATCH_SCORE);
            }
        }

        pool.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        pool.truncate(max_results);
        Ok(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitae_core::types::{RelationType, Relationship};
    use vitae_store::MemoryStore;

    fn seeded_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        let rust = store
            .upsert_node(Entity::new(EntityType::TechSkill, "Rust"))
            .unwrap();
        let lead = store
            .upsert_node(Entity::new(EntityType::Role, "Tech Lead"))
            .unwrap();
        store
            .upsert_node(Entity::new(EntityType::Organization, "Acme"))
            .unwrap();
        store
            .upsert_edge(Relationship::new(lead.id, rust.id, RelationType::HasSkill))
            .unwrap();
        store
    }

    #[test]
    fn type_match_scores_scale_with_context_weight() {
        let store = seeded_store();
        let ctx = RequestContext::new(0.5).with_types(vec![EntityType::TechSkill]);
        let ranked = RelevanceMatcher::rank(&store, &ctx, 10).unwrap();

        assert_eq!(ranked.len(), 1);
        assert!((ranked[0].score - 0.35).abs() < 1e-10);
    }

    #[test]
    fn keyword_match_outranks_type_match() {
        let store = seeded_store();
        let ctx = RequestContext::new(1.0)
            .with_types(vec![EntityType::TechSkill])
            .with_keywords(vec!["rust".into()]);
        let ranked = RelevanceMatcher::rank(&store, &ctx, 10).unwrap();

        // "Rust" matches both strategies; the max (0.8) wins, never the sum.
        let rust = ranked.iter().find(|r| r.entity.label == "Rust").unwrap();
        assert!((rust.score - 0.8).abs() < 1e-10);
    }

    #[test]
    fn sibling_score_ignores_context_weight() {
        let store = seeded_store();
        let ctx = RequestContext::new(0.1).with_sibling_keywords(vec!["rust".into()]);
        let ranked = RelevanceMatcher::rank(&store, &ctx, 10).unwrap();

        let rust = ranked.iter().find(|r| r.entity.label == "Rust").unwrap();
        assert!((rust.score - SIBLING_MATCH_SCORE).abs() < 1e-10);
    }

    #[test]
    fn results_deduplicated_by_entity() {
        let store = seeded_store();
        let ctx = RequestContext::new(1.0)
            .with_types(vec![EntityType::TechSkill])
            .with_keywords(vec!["rust".into(), "rust lang".into()]);
        let ranked = RelevanceMatcher::rank(&store, &ctx, 10).unwrap();

        let rust_hits = ranked.iter().filter(|r| r.entity.label == "Rust").count();
        assert_eq!(rust_hits, 1);
    }

    #[test]
    fn truncates_to_requested_count() {
        let store = seeded_store();
        let ctx = RequestContext::new(1.0).with_types(vec![
            EntityType::TechSkill,
            EntityType::Role,
            EntityType::Organization,
        ]);
        let ranked = RelevanceMatcher::rank(&store, &ctx, 2).unwrap();
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn empty_context_returns_nothing() {
        let store = seeded_store();
        let ctx = RequestContext::new(1.0);
        assert!(RelevanceMatcher::rank(&store, &ctx, 10).unwrap().is_empty());
    }
}
