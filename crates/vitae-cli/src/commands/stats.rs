//! Show graph and feedback statistics.

use anyhow::Result;
use colored::Colorize;
use vitae::prelude::*;

use super::load_current;

pub fn run() -> Result<()> {
    let profile = load_current()?;
    let stats = profile.stats()?;

    println!("{}", "Vitae Profile Statistics".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("{}", "Graph Structure".blue().bold());
    println!("  Entities:       {}", stats.node_count.to_string().cyan());
    println!("  Relationships:  {}", stats.edge_count.to_string().cyan());
    println!();

    println!("{}", "Entities by Type".blue().bold());
    for entity_type in EntityType::ALL {
        let count = profile.entities_by_type(entity_type)?.len();
        if count > 0 {
            println!("  {:16}{}", format!("{}:", entity_type), count.to_string().cyan());
        }
    }
    println!();

    println!("{}", "Feedback".blue().bold());
    println!("  Records:        {}", stats.feedback_count.to_string().cyan());
    if stats.feedback_count > 0 {
        let ledger = profile.ledger_stats();
        for (verdict, count) in &ledger.verdicts {
            println!("  {:16}{}", format!("{}:", verdict), count.to_string().cyan());
        }
        if ledger.mean_edit_distance > 0.0 {
            println!("  Mean edit dist: {:.2}", ledger.mean_edit_distance);
        }
    }

    println!();
    println!("{}", "═".repeat(40).dimmed());

    Ok(())
}
