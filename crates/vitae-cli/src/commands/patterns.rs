//! Show per-field accuracy patterns and improvement suggestions.

use anyhow::Result;
use colored::Colorize;
use vitae::prelude::*;

use super::load_current;

pub fn run() -> Result<()> {
    let profile = load_current()?;
    let report = profile.patterns();

    if report.total_records == 0 {
        println!("{} No feedback recorded yet.", "•".yellow());
        return Ok(());
    }

    println!("{}", "Feedback Patterns".white().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();
    println!(
        "  Records:          {}",
        report.total_records.to_string().cyan()
    );
    println!("  Overall accuracy: {:.0}%", report.overall_accuracy * 100.0);
    println!();

    if report.field_patterns.is_empty() {
        println!("  {} No field stands out yet.", "•".yellow());
    } else {
        for pattern in &report.field_patterns {
            let marker = match pattern.kind {
                PatternKind::Problematic => "✗".red(),
                PatternKind::Accurate => "✓".green(),
            };
            println!(
                "  {} {} {:.0}% accurate over {} attempts",
                marker,
                pattern.field_id.white().bold(),
                pattern.accuracy * 100.0,
                pattern.attempts,
            );
        }
    }

    let improvements = profile.improvements();
    if !improvements.is_empty() {
        println!();
        println!("{}", "Suggestions".blue().bold());
        for improvement in &improvements {
            let marker = match improvement.severity {
                Severity::Critical => "!".red().bold(),
                Severity::Warning => "!".yellow(),
                Severity::Info => "•".blue(),
            };
            println!("  {} {}", marker, improvement.message);
        }
    }

    Ok(())
}
