//! Rank entities against a request context.

use anyhow::{bail, Result};
use colored::Colorize;
use vitae::prelude::*;

use super::load_current;
use crate::config::Config;

pub fn run(
    types: Option<String>,
    keywords: Option<String>,
    weight: Option<f64>,
    siblings: Option<String>,
    max_results: Option<usize>,
) -> Result<()> {
    let config = Config::load()?;
    let profile = load_current()?;

    let mut context =
        RequestContext::new(weight.unwrap_or(config.matcher.default_context_weight));

    if let Some(types) = types {
        let mut parsed = Vec::new();
        for name in types.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let Some(entity_type) = EntityType::parse(name) else {
                bail!("Unknown entity type: {}", name);
            };
            parsed.push(entity_type);
        }
        context = context.with_types(parsed);
    }
    if let Some(keywords) = keywords {
        context = context.with_keywords(split_list(&keywords));
    }
    if let Some(siblings) = siblings {
        context = context.with_sibling_keywords(split_list(&siblings));
    }

    let max = max_results.unwrap_or(config.matcher.max_results);
    let ranked = profile.suggest(&context, max)?;

    if ranked.is_empty() {
        println!("{} No matching entities.", "•".yellow());
        return Ok(());
    }

    println!("{} {} matches:", "→".blue(), ranked.len().to_string().cyan());
    println!();
    for (i, item) in ranked.iter().enumerate() {
        println!(
            "  {} {} {} (score: {:.3}, confidence: {:.2})",
            format!("{}.", i + 1).blue(),
            item.entity.label.white().bold(),
            format!("[{}]", item.entity.entity_type).dimmed(),
            item.score,
            item.entity.metadata.confidence,
        );
        println!("     {}", item.entity.id.to_string().dimmed());
    }

    Ok(())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
