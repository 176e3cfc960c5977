//! Snapshot management commands.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use vitae::prelude::*;

use crate::config::{current_profile_path, snapshots_dir};

pub fn save(name: &str) -> Result<()> {
    let current_path = current_profile_path()?;

    if !current_path.exists() {
        bail!("No active profile. Run {} first.", "vitae ingest".cyan());
    }

    let snapshots = snapshots_dir()?;
    std::fs::create_dir_all(&snapshots)?;

    let snapshot_path = snapshots.join(format!("{}.json", name));
    std::fs::copy(&current_path, &snapshot_path)
        .with_context(|| format!("Failed to save snapshot: {}", name))?;

    println!("{} Snapshot saved: {}", "✓".green().bold(), name.cyan());

    Ok(())
}

pub fn load(name: &str) -> Result<()> {
    let snapshots = snapshots_dir()?;
    let snapshot_path = snapshots.join(format!("{}.json", name));

    if !snapshot_path.exists() {
        bail!("Snapshot not found: {}", name);
    }

    // Validate before overwriting the current profile
    let profile = load_snapshot(&snapshot_path)
        .with_context(|| format!("Snapshot is not readable: {}", name))?;

    let current_path = current_profile_path()?;
    if let Some(parent) = current_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(&snapshot_path, &current_path)
        .with_context(|| format!("Failed to load snapshot: {}", name))?;

    let stats = profile.stats()?;
    println!("{} Snapshot loaded: {}", "✓".green().bold(), name.cyan());
    println!("  Entities:      {}", stats.node_count.to_string().cyan());
    println!("  Relationships: {}", stats.edge_count.to_string().cyan());
    println!("  Feedback:      {}", stats.feedback_count.to_string().cyan());

    Ok(())
}

pub fn list() -> Result<()> {
    let snapshots = snapshots_dir()?;

    if !snapshots.exists() {
        println!("{} No saved snapshots.", "•".yellow());
        return Ok(());
    }

    let mut found = false;
    println!("{} Saved snapshots:", "→".blue());
    println!();

    for entry in std::fs::read_dir(&snapshots)? {
        let entry = entry?;
        let path = entry.path();

        if path.extension().map(|e| e == "json").unwrap_or(false) {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_default();

            if let Ok(profile) = load_snapshot(&path) {
                let stats = profile.stats()?;
                println!(
                    "  {} {} ({} entities, {} relationships, {} feedback)",
                    "•".blue(),
                    name.white().bold(),
                    stats.node_count,
                    stats.edge_count,
                    stats.feedback_count,
                );
                found = true;
            }
        }
    }

    if !found {
        println!("  {} No saved snapshots.", "•".yellow());
    }

    Ok(())
}
