//! Ingest entities and relationships from a JSON file.
//!
//! The file references entities by label so it stays hand-writable:
//!
//! ```json
//! {
//!   "entities": [
//!     { "type": "Role", "label": "Tech Lead" },
//!     { "type": "Skill", "label": "Rust", "confidence": 0.9 }
//!   ],
//!   "relationships": [
//!     { "from": "Tech Lead", "to": "Rust", "type": "HasSkill", "weight": 0.9 }
//!   ]
//! }
//! ```

use anyhow::{bail, Context, Result};
use colored::Colorize;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use vitae::prelude::*;

use super::{load_or_create, save_current};

#[derive(Debug, Deserialize)]
struct ImportFile {
    #[serde(default)]
    entities: Vec<EntityImport>,
    #[serde(default)]
    relationships: Vec<RelationImport>,
}

#[derive(Debug, Deserialize)]
struct EntityImport {
    #[serde(rename = "type")]
    entity_type: String,
    label: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    properties: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RelationImport {
    from: String,
    to: String,
    #[serde(rename = "type")]
    relation_type: String,
    #[serde(default)]
    weight: Option<f64>,
    #[serde(default)]
    context: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
}

pub fn run(file: &str) -> Result<()> {
    let path = Path::new(file);
    if !path.exists() {
        bail!("File does not exist: {}", path.display());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let import: ImportFile = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let mut profile = load_or_create()?;

    // Labels seen in this file, for relationship resolution
    let mut by_label: HashMap<String, EntityId> = HashMap::new();
    let mut created = 0usize;
    let mut reused = 0usize;

    for item in &import.entities {
        let Some(entity_type) = EntityType::parse(&item.entity_type) else {
            bail!("Unknown entity type: {}", item.entity_type);
        };

        // Reuse an existing entity with the exact same label
        let existing = profile
            .store()
            .search_label(&item.label)?
            .into_iter()
            .find(|e| e.label.eq_ignore_ascii_case(&item.label));

        let id = if let Some(entity) = existing {
            reused += 1;
            entity.id
        } else {
            let mut entity = Entity::new(entity_type, item.label.clone())
                .with_source(EntitySource::Resume);
            if let Some(description) = &item.description {
                entity = entity.with_description(description.clone());
            }
            if let Some(source) = &item.source {
                let Some(source) = EntitySource::parse(source) else {
                    bail!("Unknown entity source: {}", source);
                };
                entity = entity.with_source(source);
            }
            if let Some(confidence) = item.confidence {
                entity = entity.with_confidence(confidence);
            }
            for (key, value) in &item.properties {
                entity = entity.with_property(key.clone(), value.clone());
            }
            created += 1;
            profile.ingest_entity(entity)?.id
        };

        by_label.insert(item.label.to_lowercase(), id);
    }

    let mut edges = 0usize;
    for item in &import.relationships {
        let Some(relation_type) = RelationType::parse(&item.relation_type) else {
            bail!("Unknown relation type: {}", item.relation_type);
        };
        let source = resolve_label(&profile, &by_label, &item.from)?;
        let target = resolve_label(&profile, &by_label, &item.to)?;

        let mut relation = Relationship::new(source, target, relation_type);
        if let Some(weight) = item.weight {
            relation = relation.with_weight(weight);
        }
        if let Some(context) = &item.context {
            relation = relation.with_context(context.clone());
        }
        if let Some(confidence) = item.confidence {
            relation = relation.with_confidence(confidence);
        }
        profile.ingest_relationship(relation)?;
        edges += 1;
    }

    save_current(&profile)?;

    println!("{} Ingested {}", "✓".green().bold(), path.display());
    println!("  Entities created:  {}", created.to_string().cyan());
    println!("  Entities reused:   {}", reused.to_string().cyan());
    println!("  Relationships:     {}", edges.to_string().cyan());

    Ok(())
}

/// Resolve a label to an entity id, first against this file's
/// entities, then against the whole graph.
fn resolve_label(
    profile: &ProfileGraph,
    by_label: &HashMap<String, EntityId>,
    label: &str,
) -> Result<EntityId> {
    if let Some(&id) = by_label.get(&label.to_lowercase()) {
        return Ok(id);
    }
    let matched = profile
        .store()
        .search_label(label)?
        .into_iter()
        .find(|e| e.label.eq_ignore_ascii_case(label));
    match matched {
        Some(entity) => Ok(entity.id),
        None => bail!("Relationship references unknown entity: {}", label),
    }
}
