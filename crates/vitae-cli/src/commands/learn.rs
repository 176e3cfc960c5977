//! Replay the feedback history against the graph.

use anyhow::Result;
use colored::Colorize;

use super::{load_current, save_current};

pub fn run() -> Result<()> {
    let mut profile = load_current()?;

    if profile.ledger().is_empty() {
        println!("{} No feedback recorded yet.", "•".yellow());
        return Ok(());
    }

    let outcome = profile.learn_all();
    let refined = profile.refine()?;
    save_current(&profile)?;

    println!("{} Feedback history processed.", "✓".green().bold());
    println!("  Records processed:   {}", outcome.processed.to_string().cyan());
    println!("  Confidences updated: {}", outcome.adjusted.to_string().cyan());
    println!("  Nodes created:       {}", outcome.created_nodes.to_string().cyan());
    println!("  Edges refined:       {}", refined.to_string().cyan());
    if outcome.failures > 0 {
        println!("  {} Records failed:    {}", "!".red(), outcome.failures);
    }

    Ok(())
}
