//! The `ProfileGraph` facade: one owner for the store, the feedback
//! ledger, and the learner, so the suggest/verdict/learn loop is a
//! handful of method calls.

use serde::Serialize;
use tracing::info;
use vitae_core::prelude::*;
use vitae_learn::{
    BatchOutcome, FeedbackLedger, GraphLearner, Improvement, LedgerStats, NodeInsight,
    PatternReport, RankedEntity, RelevanceMatcher, RequestContext,
};
use vitae_store::{EntityContext, MemoryStore, QueryEngine};

/// Combined store and ledger counts.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProfileStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub feedback_count: usize,
}

/// A professional knowledge graph with its feedback history.
///
/// Verdicts recorded through [`record_verdict`](Self::record_verdict)
/// are applied to the graph immediately; use the ledger replay methods
/// when feedback arrives out of band (for example from a loaded
/// snapshot).
#[derive(Debug, Default)]
pub struct ProfileGraph {
    store: MemoryStore,
    ledger: FeedbackLedger,
    learner: GraphLearner,
}

impl ProfileGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a profile from snapshot parts.
    pub fn from_parts(store: MemoryStore, ledger: FeedbackLedger) -> Self {
        Self {
            store,
            ledger,
            learner: GraphLearner::new(),
        }
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MemoryStore {
        &mut self.store
    }

    pub fn ledger(&self) -> &FeedbackLedger {
        &self.ledger
    }

    /// Insert or replace an entity.
    pub fn ingest_entity(&mut self, entity: Entity) -> Result<Entity> {
        self.store.upsert_node(entity)
    }

    /// Insert or replace a relationship. Both endpoints must already
    /// be in the graph.
    pub fn ingest_relationship(&mut self, relationship: Relationship) -> Result<Relationship> {
        self.store.upsert_edge(relationship)
    }

    pub fn entity(&self, id: &EntityId) -> Result<Option<Entity>> {
        self.store.get_node(id)
    }

    pub fn entities_by_type(&self, entity_type: EntityType) -> Result<Vec<Entity>> {
        self.store.nodes_by_type(entity_type)
    }

    /// Rank up to `max_results` entities against a request context.
    pub fn suggest(
        &self,
        context: &RequestContext,
        max_results: usize,
    ) -> Result<Vec<RankedEntity>> {
        RelevanceMatcher::rank(&self.store, context, max_results)
    }

    /// Fuzzy-match entities by label.
    pub fn search(&self, query: &str, threshold: f64) -> Result<Vec<Entity>> {
        QueryEngine::new(&self.store).fuzzy_search(query, threshold)
    }

    /// Entity ids reachable from `start` within `depth` hops.
    pub fn related(&self, start: &EntityId, depth: usize) -> Result<Vec<EntityId>> {
        let mut ids: Vec<EntityId> = QueryEngine::new(&self.store)
            .find_related(start, depth)?
            .into_iter()
            .collect();
        ids.sort_by_key(|id| id.0);
        Ok(ids)
    }

    /// Shortest directed path between two entities, empty when none
    /// exists within the hop bound.
    pub fn path(&self, start: &EntityId, end: &EntityId) -> Result<Vec<EntityId>> {
        QueryEngine::new(&self.store).shortest_path(start, end)
    }

    /// An entity with its resolved incoming and outgoing edges.
    pub fn entity_context(&self, id: &EntityId) -> Result<Option<EntityContext>> {
        QueryEngine::new(&self.store).context(id)
    }

    /// Record a verdict and fold it into the graph immediately.
    pub fn record_verdict(&mut self, draft: FeedbackDraft) -> Result<FeedbackRecord> {
        let record = self.ledger.record_verdict(&self.store, draft)?;
        let outcome = self.learner.process_record(&mut self.store, &record)?;
        info!(record = %record.id, adjusted = outcome.adjusted,
            created = outcome.created_node.is_some(), "verdict applied");
        Ok(record)
    }

    /// Replay the whole ledger against the graph.
    pub fn learn_all(&mut self) -> BatchOutcome {
        self.learner.process_all_history(&mut self.store, &self.ledger)
    }

    /// Strengthen edges repeatedly confirmed by feedback. Returns the
    /// number of edges refined.
    pub fn refine(&mut self) -> Result<usize> {
        self.learner
            .refine_relationship_weights(&mut self.store, &self.ledger)
    }

    /// Feedback-derived confidence for one entity.
    pub fn insight(&self, id: &EntityId) -> NodeInsight {
        self.ledger.node_insight(id)
    }

    /// Per-field accuracy patterns across the feedback history.
    pub fn patterns(&self) -> PatternReport {
        self.learner.analyze_patterns(&self.ledger)
    }

    /// Actionable suggestions derived from the feedback history.
    pub fn improvements(&self) -> Vec<Improvement> {
        self.learner.suggest_improvements(&self.ledger)
    }

    pub fn ledger_stats(&self) -> LedgerStats {
        self.ledger.statistics()
    }

    pub fn stats(&self) -> Result<ProfileStats> {
        let store = self.store.statistics()?;
        Ok(ProfileStats {
            node_count: store.node_count,
            edge_count: store.edge_count,
            feedback_count: self.ledger.len(),
        })
    }

    /// Drop all entities, relationships, and feedback.
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear()?;
        self.ledger.clear();
        Ok(())
    }
}
