//! Record a verdict on a past suggestion and learn from it.

use anyhow::{bail, Result};
use colored::Colorize;
use vitae::prelude::*;

use super::{load_current, save_current};

pub fn run(
    entity: &str,
    field: &str,
    suggestion: &str,
    verdict: &str,
    edit: Option<String>,
    affected: Option<String>,
) -> Result<()> {
    let Some(entity_id) = EntityId::parse(entity) else {
        bail!("Invalid entity id: {}", entity);
    };
    let Some(verdict) = Verdict::parse(verdict) else {
        bail!(
            "Unknown verdict: {} (expected correct, partiallycorrect, incorrect, or ignored)",
            verdict
        );
    };

    let mut draft = FeedbackDraft::new(field, entity_id, suggestion, verdict);
    if let Some(edit) = edit {
        draft = draft.with_user_edit(edit);
    }
    if let Some(affected) = affected {
        let mut ids = Vec::new();
        for raw in affected.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let Some(id) = EntityId::parse(raw) else {
                bail!("Invalid affected entity id: {}", raw);
            };
            ids.push(id);
        }
        draft = draft.with_affected(ids);
    }

    let mut profile = load_current()?;
    let record = profile.record_verdict(draft)?;
    save_current(&profile)?;

    println!("{} Verdict recorded: {}", "✓".green().bold(), record.verdict.to_string().cyan());
    println!("  Record id: {}", record.id.to_string().dimmed());

    if let Some(entity) = profile.entity(&entity_id)? {
        println!(
            "  {} now at confidence {:.2} (used {} times)",
            entity.label.white().bold(),
            entity.metadata.confidence,
            entity.metadata.frequency,
        );
    } else {
        println!("  {} Entity not in graph; verdict kept for later.", "•".yellow());
    }

    Ok(())
}
