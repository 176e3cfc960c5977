//! Fuzzy-search entities by label.

use anyhow::Result;
use colored::Colorize;
use vitae::prelude::*;

use super::load_current;
use crate::config::Config;

pub fn run(query: &str, threshold: Option<f64>) -> Result<()> {
    let config = Config::load()?;
    let profile = load_current()?;

    let threshold = threshold.unwrap_or(config.search.threshold);
    let results = profile.search(query, threshold)?;

    if results.is_empty() {
        println!("{} No entities match '{}'.", "•".yellow(), query);
        return Ok(());
    }

    println!(
        "{} {} results for '{}':",
        "→".blue(),
        results.len().to_string().cyan(),
        query.white().bold()
    );
    println!();
    for entity in &results {
        println!(
            "  {} {} {} (confidence: {:.2})",
            "•".blue(),
            entity.label.white().bold(),
            format!("[{}]", entity.entity_type).dimmed(),
            entity.metadata.confidence,
        );
        if let Some(description) = &entity.description {
            println!("     {}", description.dimmed());
        }
        println!("     {}", entity.id.to_string().dimmed());
    }

    Ok(())
}
