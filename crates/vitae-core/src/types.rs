//! Shared types used across all vitae crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an entity (node) in the knowledge graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a relationship (edge).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationId(pub Uuid);

impl RelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for RelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a feedback record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedbackId(pub Uuid);

impl FeedbackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FeedbackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FeedbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The kind of professional entity a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Skill,
    Role,
    Organization,
    Project,
    Achievement,
    Education,
    TechSkill,
    SoftSkill,
}

impl EntityType {
    pub const ALL: [EntityType; 8] = [
        EntityType::Skill,
        EntityType::Role,
        EntityType::Organization,
        EntityType::Project,
        EntityType::Achievement,
        EntityType::Education,
        EntityType::TechSkill,
        EntityType::SoftSkill,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Skill => "Skill",
            EntityType::Role => "Role",
            EntityType::Organization => "Organization",
            EntityType::Project => "Project",
            EntityType::Achievement => "Achievement",
            EntityType::Education => "Education",
            EntityType::TechSkill => "TechSkill",
            EntityType::SoftSkill => "SoftSkill",
        }
    }

    /// Case-insensitive parse of a type name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an entity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntitySource {
    /// Parsed out of an ingested resume/profile document.
    Resume,
    /// Entered directly by the user.
    UserInput,
    /// Derived by the system from other entities.
    Inferred,
    /// Created by the learner from a user correction.
    UserFeedback,
}

impl EntitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntitySource::Resume => "Resume",
            EntitySource::UserInput => "UserInput",
            EntitySource::Inferred => "Inferred",
            EntitySource::UserFeedback => "UserFeedback",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [
            EntitySource::Resume,
            EntitySource::UserInput,
            EntitySource::Inferred,
            EntitySource::UserFeedback,
        ]
        .iter()
        .copied()
        .find(|v| v.as_str().eq_ignore_ascii_case(s))
    }
}

/// Bookkeeping attached to every entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    pub created_at: DateTime<Utc>,
    pub source: EntitySource,
    /// Trustworthiness of this entity, always within [0, 1].
    pub confidence: f64,
    /// Times this entity was used or accepted. Starts at 1.
    pub frequency: u64,
}

impl EntityMetadata {
    pub fn new(source: EntitySource, confidence: f64) -> Self {
        Self {
            created_at: Utc::now(),
            source,
            confidence: clamp_unit(confidence),
            frequency: 1,
        }
    }
}

/// A typed, labeled node in the knowledge graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub entity_type: EntityType,
    /// Display text, non-empty.
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Type-specific attributes, key-ordered.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, serde_json::Value>,
    pub metadata: EntityMetadata,
}

impl Entity {
    /// Create an entity with a fresh id, `UserInput` source, and
    /// confidence 1.0. Adjust with the `with_*` builders.
    pub fn new(entity_type: EntityType, label: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(),
            entity_type,
            label: label.into(),
            description: None,
            properties: BTreeMap::new(),
            metadata: EntityMetadata::new(EntitySource::UserInput, 1.0),
        }
    }

    pub fn with_source(mut self, source: EntitySource) -> Self {
        self.metadata.source = source;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.metadata.confidence = clamp_unit(confidence);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

/// The kind of connection between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationType {
    HasSkill,
    WorkedAt,
    LedTeam,
    UsedTechnology,
    Achieved,
    RelatedTo,
    Demonstrates,
    Requires,
}

impl RelationType {
    pub const ALL: [RelationType; 8] = [
        RelationType::HasSkill,
        RelationType::WorkedAt,
        RelationType::LedTeam,
        RelationType::UsedTechnology,
        RelationType::Achieved,
        RelationType::RelatedTo,
        RelationType::Demonstrates,
        RelationType::Requires,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::HasSkill => "HasSkill",
            RelationType::WorkedAt => "WorkedAt",
            RelationType::LedTeam => "LedTeam",
            RelationType::UsedTechnology => "UsedTechnology",
            RelationType::Achieved => "Achieved",
            RelationType::RelatedTo => "RelatedTo",
            RelationType::Demonstrates => "Demonstrates",
            RelationType::Requires => "Requires",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain attributes of a relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationProperties {
    /// Relationship strength, within [0, 1].
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// Bookkeeping attached to every relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationMetadata {
    /// True when machine-derived rather than user-asserted.
    pub inferred: bool,
    /// Trustworthiness of this relationship, within [0, 1].
    pub confidence: f64,
    pub updated_at: DateTime<Utc>,
}

/// A typed, directed, weighted edge between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationId,
    pub source: EntityId,
    pub target: EntityId,
    pub relation_type: RelationType,
    pub properties: RelationProperties,
    pub metadata: RelationMetadata,
}

impl Relationship {
    /// Create a user-asserted relationship with a fresh id and full
    /// weight/confidence.
    pub fn new(source: EntityId, target: EntityId, relation_type: RelationType) -> Self {
        Self {
            id: RelationId::new(),
            source,
            target,
            relation_type,
            properties: RelationProperties {
                weight: 1.0,
                context: None,
            },
            metadata: RelationMetadata {
                inferred: false,
                confidence: 1.0,
                updated_at: Utc::now(),
            },
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.properties.weight = clamp_unit(weight);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.properties.context = Some(context.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.metadata.confidence = clamp_unit(confidence);
        self
    }

    pub fn inferred(mut self) -> Self {
        self.metadata.inferred = true;
        self
    }
}

/// The caller's judgment on a past suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Correct,
    PartiallyCorrect,
    Incorrect,
    Ignored,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Correct => "Correct",
            Verdict::PartiallyCorrect => "PartiallyCorrect",
            Verdict::Incorrect => "Incorrect",
            Verdict::Ignored => "Ignored",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [
            Verdict::Correct,
            Verdict::PartiallyCorrect,
            Verdict::Incorrect,
            Verdict::Ignored,
        ]
        .iter()
        .copied()
        .find(|v| v.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One verdict on a past suggestion, immutable once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: FeedbackId,
    /// The form field or slot the suggestion filled.
    pub field_id: String,
    /// The entity the suggestion was derived from.
    pub source_entity: EntityId,
    pub original_suggestion: String,
    /// What the user changed the suggestion to, if anything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_edit: Option<String>,
    pub verdict: Verdict,
    /// Other entities the suggestion drew on.
    #[serde(default)]
    pub affected_entities: Vec<EntityId>,
    pub recorded_at: DateTime<Utc>,
}

/// A feedback record before the ledger assigns its id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackDraft {
    pub field_id: String,
    pub source_entity: EntityId,
    pub original_suggestion: String,
    #[serde(default)]
    pub user_edit: Option<String>,
    pub verdict: Verdict,
    #[serde(default)]
    pub affected_entities: Vec<EntityId>,
}

impl FeedbackDraft {
    pub fn new(
        field_id: impl Into<String>,
        source_entity: EntityId,
        original_suggestion: impl Into<String>,
        verdict: Verdict,
    ) -> Self {
        Self {
            field_id: field_id.into(),
            source_entity,
            original_suggestion: original_suggestion.into(),
            user_edit: None,
            verdict,
            affected_entities: Vec::new(),
        }
    }

    pub fn with_user_edit(mut self, edit: impl Into<String>) -> Self {
        self.user_edit = Some(edit.into());
        self
    }

    pub fn with_affected(mut self, affected: Vec<EntityId>) -> Self {
        self.affected_entities = affected;
        self
    }
}

/// Clamp a confidence or weight into [0, 1].
pub fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_builder_clamps_confidence() {
        let e = Entity::new(EntityType::Skill, "Rust").with_confidence(1.7);
        assert_eq!(e.metadata.confidence, 1.0);
        let e = Entity::new(EntityType::Skill, "Rust").with_confidence(-0.2);
        assert_eq!(e.metadata.confidence, 0.0);
    }

    #[test]
    fn entity_starts_at_frequency_one() {
        let e = Entity::new(EntityType::Role, "Engineer");
        assert_eq!(e.metadata.frequency, 1);
    }

    #[test]
    fn type_names_round_trip() {
        for t in EntityType::ALL {
            assert_eq!(EntityType::parse(t.as_str()), Some(t));
        }
        for t in RelationType::ALL {
            assert_eq!(RelationType::parse(t.as_str()), Some(t));
        }
        assert_eq!(EntityType::parse("techskill"), Some(EntityType::TechSkill));
        assert_eq!(EntityType::parse("nonsense"), None);
    }

    #[test]
    fn verdict_parse_is_case_insensitive() {
        assert_eq!(Verdict::parse("correct"), Some(Verdict::Correct));
        assert_eq!(
            Verdict::parse("PARTIALLYCORRECT"),
            Some(Verdict::PartiallyCorrect)
        );
        assert_eq!(Verdict::parse("maybe"), None);
    }

    #[test]
    fn relationship_builder_sets_inferred() {
        let a = EntityId::new();
        let b = EntityId::new();
        let r = Relationship::new(a, b, RelationType::HasSkill)
            .with_weight(0.5)
            .inferred();
        assert!(r.metadata.inferred);
        assert_eq!(r.properties.weight, 0.5);
    }
}
