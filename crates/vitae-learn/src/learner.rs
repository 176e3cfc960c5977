//! Graph learner: folds recorded verdicts back into the graph.
//!
//! Each verdict nudges the confidence of the entity the suggestion
//! came from, and an `Incorrect` verdict with a user edit that names
//! something the graph does not know yet becomes a new skill node.
//! Repeated confirmation of co-suggested pairs strengthens the edge
//! between them.

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};
use vitae_core::error::{Result, VitaeError};
use vitae_core::types::{
    Entity, EntityId, EntitySource, EntityType, FeedbackId, FeedbackRecord, RelationType,
    Relationship, Verdict,
};
use vitae_core::EntityStore;

use crate::ledger::FeedbackLedger;

/// Confidence delta applied on a `Correct` verdict.
pub const DELTA_CORRECT: f64 = 0.05;
/// Confidence delta applied on a `PartiallyCorrect` verdict.
pub const DELTA_PARTIAL: f64 = 0.02;
/// Confidence delta applied on an `Incorrect` verdict.
pub const DELTA_INCORRECT: f64 = -0.10;
/// Confidence delta applied on an `Ignored` verdict.
pub const DELTA_IGNORED: f64 = -0.02;
/// Feedback never drives an entity's confidence below this.
pub const CONFIDENCE_FLOOR: f64 = 0.3;
/// Confidence given to a node created from a user correction.
pub const CORRECTION_CONFIDENCE: f64 = 0.8;
/// Confidence of the inferred edge attached to a correction node.
pub const CORRECTION_EDGE_CONFIDENCE: f64 = 0.7;
/// Weight of the inferred edge attached to a correction node.
pub const CORRECTION_EDGE_WEIGHT: f64 = 0.5;
/// An edge needs more than this many confirming records to be refined.
pub const REFINE_MIN_CORRECT: usize = 2;
/// Confidence boost applied to a refined edge.
pub const REFINE_DELTA: f64 = 0.05;

/// What processing a single record did to the graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LearnOutcome {
    /// The source entity's confidence was adjusted.
    pub adjusted: bool,
    /// A correction node created from the user's edit, if any.
    pub created_node: Option<EntityId>,
}

/// Tally of a full-history replay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub processed: usize,
    pub adjusted: usize,
    pub created_nodes: usize,
    pub failures: usize,
}

/// How strongly an improvement suggestion should be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Critical,
    Warning,
    Info,
}

/// A human-readable nudge derived from the feedback history.
#[derive(Debug, Clone, Serialize)]
pub struct Improvement {
    pub severity: Severity,
    pub message: String,
}

/// Whether a field is notably good or notably bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PatternKind {
    /// Accuracy below 0.5 over at least three attempts.
    Problematic,
    /// Accuracy at or above 0.9 over at least three attempts.
    Accurate,
}

/// One field whose accuracy stands out.
#[derive(Debug, Clone, Serialize)]
pub struct FieldPattern {
    pub field_id: String,
    pub attempts: usize,
    pub accuracy: f64,
    pub kind: PatternKind,
}

/// Summary of per-field accuracy patterns across the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct PatternReport {
    pub field_patterns: Vec<FieldPattern>,
    pub overall_accuracy: f64,
    pub total_records: usize,
}

const MIN_PATTERN_ATTEMPTS: usize = 3;
const PROBLEMATIC_BELOW: f64 = 0.5;
const ACCURATE_AT_LEAST: f64 = 0.9;
const OVERALL_CRITICAL_BELOW: f64 = 0.6;

/// Applies feedback records to the graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphLearner;

impl GraphLearner {
    pub fn new() -> Self {
        Self
    }

    /// Fold one record into the graph.
    ///
    /// Adjusts the source entity's confidence by the verdict's delta,
    /// clamped to [`CONFIDENCE_FLOOR`, 1.0], and bumps its frequency.
    /// An `Incorrect` verdict whose user edit names a label the store
    /// has never seen also creates a correction skill node linked to
    /// the source. A record whose source entity is gone still gets the
    /// correction step; only the confidence step is skipped.
    pub fn process_record<S: EntityStore>(
        &self,
        store: &mut S,
        record: &FeedbackRecord,
    ) -> Result<LearnOutcome> {
        let mut outcome = LearnOutcome::default();
        let source = store.get_node(&record.source_entity)?;

        if let Some(mut entity) = source.clone() {
            let delta = verdict_delta(record.verdict);
            let before = entity.metadata.confidence;
            entity.metadata.confidence = (before + delta).clamp(CONFIDENCE_FLOOR, 1.0);
            entity.metadata.frequency += 1;
            debug!(entity = %entity.id, verdict = %record.verdict,
                before, after = entity.metadata.confidence, "confidence adjusted");
            store.upsert_node(entity)?;
            outcome.adjusted = true;
        } else {
            warn!(entity = %record.source_entity, "feedback source entity missing, confidence unchanged");
        }

        if record.verdict == Verdict::Incorrect {
            if let Some(edit) = &record.user_edit {
                let label = edit.trim();
                if !label.is_empty() && store.search_label(label)?.is_empty() {
                    let node = store.upsert_node(
                        Entity::new(EntityType::Skill, label)
                            .with_source(EntitySource::UserFeedback)
                            .with_confidence(CORRECTION_CONFIDENCE),
                    )?;
                    if source.is_some() {
                        store.upsert_edge(
                            Relationship::new(record.source_entity, node.id, RelationType::HasSkill)
                                .inferred()
                                .with_confidence(CORRECTION_EDGE_CONFIDENCE)
                                .with_weight(CORRECTION_EDGE_WEIGHT),
                        )?;
                    }
                    debug!(node = %node.id, label, "correction node created");
                    outcome.created_node = Some(node.id);
                }
            }
        }

        Ok(outcome)
    }

    /// Process one ledger record by id.
    pub fn process_by_id<S: EntityStore>(
        &self,
        store: &mut S,
        ledger: &FeedbackLedger,
        id: &FeedbackId,
    ) -> Result<LearnOutcome> {
        let record = ledger
            .get(id)
            .cloned()
            .ok_or_else(|| VitaeError::record_not_found(id.to_string()))?;
        self.process_record(store, &record)
    }

    /// Replay the entire ledger. Per-record failures are tallied and
    /// logged rather than aborting the batch.
    pub fn process_all_history<S: EntityStore>(
        &self,
        store: &mut S,
        ledger: &FeedbackLedger,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for record in ledger.history() {
            outcome.processed += 1;
            match self.process_record(store, record) {
                Ok(one) => {
                    if one.adjusted {
                        outcome.adjusted += 1;
                    }
                    if one.created_node.is_some() {
                        outcome.created_nodes += 1;
                    }
                }
                Err(err) => {
                    warn!(record = %record.id, %err, "failed to process feedback record");
                    outcome.failures += 1;
                }
            }
        }
        outcome
    }

    /// Strengthen edges whose endpoint pair keeps getting confirmed.
    ///
    /// An edge qualifies when more than [`REFINE_MIN_CORRECT`] `Correct`
    /// records have its source as their source entity and its target
    /// among the affected entities. Returns the number of edges
    /// refined.
    pub fn refine_relationship_weights<S: EntityStore>(
        &self,
        store: &mut S,
        ledger: &FeedbackLedger,
    ) -> Result<usize> {
        let mut refined = 0;
        for mut edge in store.all_edges()? {
            let confirmations = ledger
                .history()
                .iter()
                .filter(|r| {
                    r.verdict == Verdict::Correct
                        && r.source_entity == edge.source
                        && r.affected_entities.contains(&edge.target)
                })
                .count();
            if confirmations > REFINE_MIN_CORRECT {
                edge.metadata.confidence = (edge.metadata.confidence + REFINE_DELTA).min(1.0);
                edge.metadata.updated_at = Utc::now();
                debug!(edge = %edge.id, confirmations, "edge refined");
                store.upsert_edge(edge)?;
                refined += 1;
            }
        }
        Ok(refined)
    }

    /// Flag fields whose accuracy stands out, over at least three
    /// attempts each.
    pub fn analyze_patterns(&self, ledger: &FeedbackLedger) -> PatternReport {
        let stats = ledger.statistics();

        let mut field_patterns: Vec<FieldPattern> = stats
            .per_field
            .iter()
            .filter(|(_, f)| f.total >= MIN_PATTERN_ATTEMPTS)
            .filter_map(|(field_id, f)| {
                let accuracy = f.correct as f64 / f.total as f64;
                let kind = if accuracy < PROBLEMATIC_BELOW {
                    PatternKind::Problematic
                } else if accuracy >= ACCURATE_AT_LEAST {
                    PatternKind::Accurate
                } else {
                    return None;
                };
                Some(FieldPattern {
                    field_id: field_id.clone(),
                    attempts: f.total,
                    accuracy,
                    kind,
                })
            })
            .collect();
        field_patterns.sort_by(|a, b| a.field_id.cmp(&b.field_id));

        let correct_total: usize = stats.per_field.values().map(|f| f.correct).sum();
        let overall_accuracy = if stats.total > 0 {
            correct_total as f64 / stats.total as f64
        } else {
            0.0
        };

        PatternReport {
            field_patterns,
            overall_accuracy,
            total_records: stats.total,
        }
    }

    /// Turn the pattern report into actionable suggestions.
    pub fn suggest_improvements(&self, ledger: &FeedbackLedger) -> Vec<Improvement> {
        let report = self.analyze_patterns(ledger);
        let mut improvements = Vec::new();

        if report.total_records > 0 && report.overall_accuracy < OVERALL_CRITICAL_BELOW {
            improvements.push(Improvement {
                severity: Severity::Critical,
                message: format!(
                    "overall accuracy is {:.0}%, suggestions need more feedback or richer data",
                    report.overall_accuracy * 100.0
                ),
            });
        }

        for pattern in &report.field_patterns {
            if pattern.kind == PatternKind::Problematic {
                improvements.push(Improvement {
                    severity: Severity::Warning,
                    message: format!(
                        "field '{}' is wrong {:.0}% of the time over {} attempts",
                        pattern.field_id,
                        (1.0 - pattern.accuracy) * 100.0,
                        pattern.attempts
                    ),
                });
            }
        }

        if improvements.is_empty() && report.total_records > 0 {
            improvements.push(Improvement {
                severity: Severity::Info,
                message: "no problem fields detected".to_string(),
            });
        }

        improvements
    }
}

fn verdict_delta(verdict: Verdict) -> f64 {
    match verdict {
        Verdict::Correct => DELTA_CORRECT,
        Verdict::PartiallyCorrect => DELTA_PARTIAL,
        Verdict::Incorrect => DELTA_INCORRECT,
        Verdict::Ignored => DELTA_IGNORED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitae_core::types::FeedbackDraft;
    use vitae_store::MemoryStore;

    fn seeded(confidence: f64) -> (MemoryStore, EntityId) {
        let mut store = MemoryStore::new();
        let e = store
            .upsert_node(
                Entity::new(EntityType::Skill, "Rust").with_confidence(confidence),
            )
            .unwrap();
        (store, e.id)
    }

    fn recorded(
        store: &MemoryStore,
        ledger: &mut FeedbackLedger,
        draft: FeedbackDraft,
    ) -> FeedbackRecord {
        ledger.record_verdict(store, draft).unwrap()
    }

    #[test]
    fn correct_verdict_raises_confidence() {
        let (mut store, id) = seeded(0.8);
        let mut ledger = FeedbackLedger::new();
        let record = recorded(
            &store,
            &mut ledger,
            FeedbackDraft::new("skills", id, "Rust", Verdict::Correct),
        );

        let outcome = GraphLearner::new().process_record(&mut store, &record).unwrap();
        assert!(outcome.adjusted);

        let node = store.get_node(&id).unwrap().unwrap();
        assert!((node.metadata.confidence - 0.85).abs() < 1e-10);
        assert_eq!(node.metadata.frequency, 2);
    }

    #[test]
    fn confidence_caps_at_one() {
        let (mut store, id) = seeded(0.98);
        let mut ledger = FeedbackLedger::new();
        let record = recorded(
            &store,
            &mut ledger,
            FeedbackDraft::new("skills", id, "Rust", Verdict::Correct),
        );

        GraphLearner::new().process_record(&mut store, &record).unwrap();
        let node = store.get_node(&id).unwrap().unwrap();
        assert!((node.metadata.confidence - 1.0).abs() < 1e-10);
    }

    #[test]
    fn confidence_floors_at_point_three() {
        let (mut store, id) = seeded(0.35);
        let mut ledger = FeedbackLedger::new();
        let record = recorded(
            &store,
            &mut ledger,
            FeedbackDraft::new("skills", id, "Rust", Verdict::Incorrect),
        );

        GraphLearner::new().process_record(&mut store, &record).unwrap();
        let node = store.get_node(&id).unwrap().unwrap();
        assert!((node.metadata.confidence - CONFIDENCE_FLOOR).abs() < 1e-10);
    }

    #[test]
    fn incorrect_with_novel_edit_creates_correction_node() {
        let (mut store, id) = seeded(0.9);
        let mut ledger = FeedbackLedger::new();
        let record = recorded(
            &store,
            &mut ledger,
            FeedbackDraft::new("skills", id, "Rust", Verdict::Incorrect)
                .with_user_edit("Kubernetes"),
        );

        let outcome = GraphLearner::new().process_record(&mut store, &record).unwrap();
        let created = outcome.created_node.expect("correction node");

        let node = store.get_node(&created).unwrap().unwrap();
        assert_eq!(node.label, "Kubernetes");
        assert_eq!(node.entity_type, EntityType::Skill);
        assert_eq!(node.metadata.source, EntitySource::UserFeedback);
        assert!((node.metadata.confidence - CORRECTION_CONFIDENCE).abs() < 1e-10);

        let edges = store.edges_from(&id).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].target, created);
        assert_eq!(edges[0].relation_type, RelationType::HasSkill);
        assert!(edges[0].metadata.inferred);
        assert!((edges[0].metadata.confidence - CORRECTION_EDGE_CONFIDENCE).abs() < 1e-10);
        assert!((edges[0].properties.weight - CORRECTION_EDGE_WEIGHT).abs() < 1e-10);
    }

    #[test]
    fn known_edit_label_skips_correction_node() {
        let (mut store, id) = seeded(0.9);
        store
            .upsert_node(Entity::new(EntityType::Skill, "Kubernetes"))
            .unwrap();
        let mut ledger = FeedbackLedger::new();
        let record = recorded(
            &store,
            &mut ledger,
            FeedbackDraft::new("skills", id, "Rust", Verdict::Incorrect)
                .with_user_edit("kubernetes"),
        );

        let outcome = GraphLearner::new().process_record(&mut store, &record).unwrap();
        assert!(outcome.created_node.is_none());
        assert_eq!(store.statistics().unwrap().node_count, 2);
    }

    #[test]
    fn blank_edit_skips_correction_node() {
        let (mut store, id) = seeded(0.9);
        let mut ledger = FeedbackLedger::new();
        let record = recorded(
            &store,
            &mut ledger,
            FeedbackDraft::new("skills", id, "Rust", Verdict::Incorrect).with_user_edit("   "),
        );

        let outcome = GraphLearner::new().process_record(&mut store, &record).unwrap();
        assert!(outcome.created_node.is_none());
    }

    #[test]
    fn missing_source_skips_confidence_but_not_correction() {
        let mut store = MemoryStore::new();
        let ghost = EntityId::new();
        let record = FeedbackRecord {
            id: FeedbackId::new(),
            field_id: "skills".to_string(),
            source_entity: ghost,
            original_suggestion: "Rust".to_string(),
            user_edit: Some("Terraform".to_string()),
            verdict: Verdict::Incorrect,
            affected_entities: Vec::new(),
            recorded_at: Utc::now(),
        };

        let outcome = GraphLearner::new().process_record(&mut store, &record).unwrap();
        assert!(!outcome.adjusted);
        let created = outcome.created_node.expect("correction node");

        // No source to hang the edge off, so the node stands alone.
        assert!(store.edges_to(&created).unwrap().is_empty());
    }

    #[test]
    fn process_by_id_rejects_unknown_record() {
        let (mut store, _) = seeded(0.9);
        let ledger = FeedbackLedger::new();
        let err = GraphLearner::new()
            .process_by_id(&mut store, &ledger, &FeedbackId::new())
            .unwrap_err();
        assert!(matches!(err, VitaeError::NotFound(_)));
    }

    #[test]
    fn process_all_history_tallies_outcomes() {
        let (mut store, id) = seeded(0.8);
        let mut ledger = FeedbackLedger::new();
        recorded(&store, &mut ledger, FeedbackDraft::new("skills", id, "Rust", Verdict::Correct));
        recorded(
            &store,
            &mut ledger,
            FeedbackDraft::new("skills", id, "Rust", Verdict::Incorrect).with_user_edit("Go"),
        );

        let outcome = GraphLearner::new().process_all_history(&mut store, &ledger);
        assert_eq!(outcome.processed, 2);
        assert_eq!(outcome.adjusted, 2);
        assert_eq!(outcome.created_nodes, 1);
        assert_eq!(outcome.failures, 0);
    }

    #[test]
    fn refinement_needs_three_confirmations() {
        let mut store = MemoryStore::new();
        let role = store
            .upsert_node(Entity::new(EntityType::Role, "Tech Lead"))
            .unwrap();
        let skill = store
            .upsert_node(Entity::new(EntityType::Skill, "Rust"))
            .unwrap();
        let edge = store
            .upsert_edge(
                Relationship::new(role.id, skill.id, RelationType::HasSkill)
                    .with_confidence(0.7),
            )
            .unwrap();

        let mut ledger = FeedbackLedger::new();
        let confirm = |ledger: &mut FeedbackLedger, store: &MemoryStore| {
            ledger
                .record_verdict(
                    store,
                    FeedbackDraft::new("skills", role.id, "Rust", Verdict::Correct)
                        .with_affected(vec![skill.id]),
                )
                .unwrap();
        };

        confirm(&mut ledger, &store);
        confirm(&mut ledger, &store);
        let learner = GraphLearner::new();
        assert_eq!(learner.refine_relationship_weights(&mut store, &ledger).unwrap(), 0);

        confirm(&mut ledger, &store);
        assert_eq!(learner.refine_relationship_weights(&mut store, &ledger).unwrap(), 1);
        let refreshed = store.get_edge(&edge.id).unwrap().unwrap();
        assert!((refreshed.metadata.confidence - 0.75).abs() < 1e-10);
    }

    #[test]
    fn repeated_failures_flag_field_as_problematic() {
        let (store, id) = seeded(0.9);
        let mut ledger = FeedbackLedger::new();
        for _ in 0..3 {
            ledger
                .record_verdict(
                    &store,
                    FeedbackDraft::new("education", id, "BSc", Verdict::Incorrect),
                )
                .unwrap();
        }
        ledger
            .record_verdict(&store, FeedbackDraft::new("skills", id, "Rust", Verdict::Correct))
            .unwrap();

        let report = GraphLearner::new().analyze_patterns(&ledger);
        let problem = report
            .field_patterns
            .iter()
            .find(|p| p.field_id == "education")
            .expect("education flagged");
        assert_eq!(problem.kind, PatternKind::Problematic);
        assert_eq!(problem.attempts, 3);
        assert!((report.overall_accuracy - 0.25).abs() < 1e-10);
    }

    #[test]
    fn low_overall_accuracy_yields_critical_suggestion() {
        let (store, id) = seeded(0.9);
        let mut ledger = FeedbackLedger::new();
        for _ in 0..4 {
            ledger
                .record_verdict(
                    &store,
                    FeedbackDraft::new("summary", id, "text", Verdict::Incorrect),
                )
                .unwrap();
        }

        let improvements = GraphLearner::new().suggest_improvements(&ledger);
        assert!(improvements.iter().any(|i| i.severity == Severity::Critical));
        assert!(improvements.iter().any(|i| i.severity == Severity::Warning));
    }
}
