//! # Vitae
//!
//! A local knowledge graph of a person's professional history, with
//! relevance matching and feedback-driven confidence learning.
//!
//! Skills, roles, organizations, projects, achievements, and education
//! live as typed nodes connected by weighted relationships. Suggestions
//! ranked out of the graph come back to it as verdicts, and each
//! verdict nudges entity confidences so the graph gets better at
//! answering over time.
//!
//! ## Quick Start
//!
//! ```rust
//! use vitae::prelude::*;
//!
//! # fn main() -> vitae::Result<()> {
//! let mut profile = ProfileGraph::new();
//!
//! // Build up the graph
//! let role = profile.ingest_entity(Entity::new(EntityType::Role, "Tech Lead"))?;
//! let skill = profile.ingest_entity(Entity::new(EntityType::Skill, "Rust"))?;
//! profile.ingest_relationship(Relationship::new(role.id, skill.id, RelationType::HasSkill))?;
//!
//! // Rank entities against a request
//! let context = RequestContext::new(0.8)
//!     .with_types(vec![EntityType::Skill])
//!     .with_keywords(vec!["rust".to_string()]);
//! let ranked = profile.suggest(&context, 5)?;
//! assert_eq!(ranked.len(), 1);
//!
//! // Close the loop: record a verdict, which adjusts confidence
//! let draft = FeedbackDraft::new("skills", skill.id, "Rust", Verdict::Correct);
//! profile.record_verdict(draft)?;
//!
//! assert!(profile.insight(&skill.id).record_count > 0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! Vitae is organized into several crates:
//!
//! - [`vitae_core`] - Entity/relationship types, the [`EntityStore`]
//!   trait, and the error taxonomy
//! - [`vitae_store`] - In-memory and SQLite-backed stores plus the
//!   graph query engine (traversal, paths, fuzzy search)
//! - [`vitae_learn`] - Relevance matcher, feedback ledger, and the
//!   graph learner
//!
//! This crate ties them together behind [`ProfileGraph`] and adds JSON
//! snapshot persistence.

pub mod profile;
pub mod snapshot;

pub use profile::{ProfileGraph, ProfileStats};
pub use snapshot::{load_snapshot, save_snapshot, GraphSnapshot, SnapshotMetadata};

pub use vitae_core::{EntityStore, Result, StoreStats, VitaeError};

/// Commonly used types, one import away.
pub mod prelude {
    pub use crate::profile::{ProfileGraph, ProfileStats};
    pub use crate::snapshot::{load_snapshot, save_snapshot, GraphSnapshot};

    pub use vitae_core::error::{NotFoundError, Result, ValidationError, VitaeError};
    pub use vitae_core::store::{EntityStore, StoreStats};
    pub use vitae_core::types::{
        Entity, EntityId, EntityMetadata, EntitySource, EntityType, FeedbackDraft, FeedbackId,
        FeedbackRecord, RelationId, RelationMetadata, RelationProperties, RelationType,
        Relationship, Verdict,
    };

    pub use vitae_store::{
        EntityContext, MemoryStore, QueryEngine, ResolvedEdge, MAX_PATH_HOPS,
    };

    #[cfg(feature = "sqlite")]
    pub use vitae_store::SqliteStore;

    pub use vitae_learn::{
        BatchOutcome, FeedbackLedger, FieldPattern, FieldStats, GraphLearner, Improvement,
        LearnOutcome, LedgerStats, NodeInsight, PatternKind, PatternReport, RankedEntity,
        RelevanceMatcher, RequestContext, Severity,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
