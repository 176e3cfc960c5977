//! Feedback ledger: append-only verdict history with aggregates.
//!
//! Records are immutable once appended and only ever removed by
//! `clear`. The ledger consults the store solely to warn about
//! verdicts on entities it does not know; it never mutates the graph
//! (that is the learner's job).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;
use vitae_core::error::Result;
use vitae_core::types::{
    EntityId, FeedbackDraft, FeedbackId, FeedbackRecord, Verdict,
};
use vitae_core::EntityStore;
use vitae_store::query::levenshtein;

/// Correct/incorrect tallies for one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStats {
    pub correct: usize,
    pub incorrect: usize,
    pub total: usize,
}

/// Aggregate statistics over the whole ledger.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStats {
    pub total: usize,
    /// Count per verdict kind.
    pub verdicts: HashMap<Verdict, usize>,
    pub per_field: HashMap<String, FieldStats>,
    /// Mean Levenshtein distance between suggestion and edit, over
    /// records where the two differ. 0.0 when no record differs.
    pub mean_edit_distance: f64,
}

/// Feedback-derived view of one entity.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct NodeInsight {
    /// Suggested confidence in [0, 1]. 0.5 for an entity with no
    /// feedback at all.
    pub confidence: f64,
    /// Weighted accuracy over this entity's verdicts, absent without
    /// feedback.
    pub accuracy: Option<f64>,
    pub record_count: usize,
}

/// Append-only record of verdicts on past suggestions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackLedger {
    records: Vec<FeedbackRecord>,
}

impl FeedbackLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from previously saved records (snapshot load).
    pub fn from_records(records: Vec<FeedbackRecord>) -> Self {
        Self { records }
    }

    /// Append a verdict, assigning its id and timestamp.
    ///
    /// A verdict on an entity the store does not know is recorded
    /// anyway (the entity may arrive later via snapshot or ingestion),
    /// but logged as a warning.
    pub fn record_verdict<S: EntityStore>(
        &mut self,
        store: &S,
        draft: FeedbackDraft,
    ) -> Result<FeedbackRecord> {
        if store.get_node(&draft.source_entity)?.is_none() {
            warn!(entity = %draft.source_entity, field = %draft.field_id,
                "verdict recorded for unknown entity");
        }

        let record = FeedbackRecord {
            id: FeedbackId::new(),
            field_id: draft.field_id,
            source_entity: draft.source_entity,
            original_suggestion: draft.original_suggestion,
            user_edit: draft.user_edit,
            verdict: draft.verdict,
            affected_entities: draft.affected_entities,
            recorded_at: Utc::now(),
        };
        self.records.push(record.clone());
        Ok(record)
    }

    pub fn history(&self) -> &[FeedbackRecord] {
        &self.records
    }

    pub fn get(&self, id: &FeedbackId) -> Option<&FeedbackRecord> {
        self.records.iter().find(|r| r.id == *id)
    }

    /// Records whose source entity or affected entities include `id`.
    pub fn for_node(&self, id: &EntityId) -> Vec<&FeedbackRecord> {
        self.records
            .iter()
            .filter(|r| r.source_entity == *id || r.affected_entities.contains(id))
            .collect()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Aggregate counts and the mean edit distance over differing
    /// suggestion/edit pairs.
    pub fn statistics(&self) -> LedgerStats {
        let mut verdicts: HashMap<Verdict, usize> = HashMap::new();
        let mut per_field: HashMap<String, FieldStats> = HashMap::new();
        let mut distance_sum = 0usize;
        let mut distance_count = 0usize;

        for record in &self.records {
            *verdicts.entry(record.verdict).or_insert(0) += 1;

            let field = per_field.entry(record.field_id.clone()).or_default();
            field.total += 1;
            match record.verdict {
                Verdict::Correct => field.correct += 1,
                Verdict::Incorrect => field.incorrect += 1,
                _ => {}
            }

            if let Some(edit) = &record.user_edit {
                if edit != &record.original_suggestion {
                    distance_sum += levenshtein(&record.original_suggestion, edit);
                    distance_count += 1;
                }
            }
        }

        LedgerStats {
            total: self.records.len(),
            verdicts,
            per_field,
            mean_edit_distance: if distance_count > 0 {
                distance_sum as f64 / distance_count as f64
            } else {
                0.0
            },
        }
    }

    /// Feedback-derived confidence for one entity.
    ///
    /// `weighted = (correct + 0.5·partial) / max(correct+partial+incorrect, 1)`,
    /// damped by `min(record_count/10, 1)` so lightly-used entities
    /// never reach full confidence on a handful of positives.
    pub fn node_insight(&self, id: &EntityId) -> NodeInsight {
        let records = self.for_node(id);
        if records.is_empty() {
            return NodeInsight {
                confidence: 0.5,
                accuracy: None,
                record_count: 0,
            };
        }

        let mut correct = 0usize;
        let mut partial = 0usize;
        let mut incorrect = 0usize;
        for record in &records {
            match record.verdict {
                Verdict::Correct => correct += 1,
                Verdict::PartiallyCorrect => partial += 1,
                Verdict::Incorrect => incorrect += 1,
                Verdict::Ignored => {}
            }
        }

        let weighted = (correct as f64 + 0.5 * partial as f64)
            / (correct + partial + incorrect).max(1) as f64;
        let frequency_factor = (records.len() as f64 / 10.0).min(1.0);
        let confidence = (0.5 + 0.5 * weighted * frequency_factor).min(1.0);

        NodeInsight {
            confidence,
            accuracy: Some(weighted),
            record_count: records.len(),
        }
    }
}
