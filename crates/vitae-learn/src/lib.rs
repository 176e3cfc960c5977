//! # Vitae Learn
//!
//! The adaptive half of the knowledge graph:
//!
//! - [`RelevanceMatcher`] turns a normalized request context into a
//!   ranked, deduplicated list of candidate entities.
//! - [`FeedbackLedger`] keeps the append-only record of verdicts on
//!   past suggestions and derives aggregate statistics from it.
//! - [`GraphLearner`] feeds verdicts back into the store: confidence
//!   deltas, correction nodes, relationship refinement, and quality
//!   patterns over the accumulated history.

pub mod ledger;
pub mod learner;
pub mod matcher;

pub use ledger::{FeedbackLedger, FieldStats, LedgerStats, NodeInsight};
pub use learner::{
    BatchOutcome, FieldPattern, GraphLearner, Improvement, LearnOutcome, PatternKind,
    PatternReport, Severity,
};
pub use matcher::{RankedEntity, RelevanceMatcher, RequestContext};
