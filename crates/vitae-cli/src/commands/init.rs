//! Initialize a new Vitae project.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::config::Config;

pub fn run(path: Option<String>) -> Result<()> {
    let base_path = path
        .map(|p| Path::new(&p).to_path_buf())
        .unwrap_or_else(|| std::env::current_dir().unwrap());

    println!("{} Initializing Vitae project...", "→".blue());

    // Create .vitae directory
    let vitae_dir = base_path.join(".vitae");
    std::fs::create_dir_all(&vitae_dir)
        .with_context(|| format!("Failed to create {}", vitae_dir.display()))?;
    println!("  {} Created {}", "✓".green(), vitae_dir.display());

    // Create snapshots directory
    let snapshots = vitae_dir.join("snapshots");
    std::fs::create_dir_all(&snapshots)
        .with_context(|| format!("Failed to create {}", snapshots.display()))?;
    println!("  {} Created {}", "✓".green(), snapshots.display());

    // Create default config
    let config_path = base_path.join("vitae.toml");
    if !config_path.exists() {
        let config = Config::default();
        config.save(&config_path)?;
        println!("  {} Created {}", "✓".green(), config_path.display());
    } else {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
    }

    // Keep the working profile out of version control
    let gitignore_path = vitae_dir.join(".gitignore");
    if !gitignore_path.exists() {
        std::fs::write(&gitignore_path, "current.json\nsnapshots/\n")?;
        println!("  {} Created {}", "✓".green(), gitignore_path.display());
    }

    println!();
    println!("{} Vitae project initialized!", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!("  {} vitae ingest <profile.json>", "1.".blue());
    println!("  {} vitae match --keywords \"rust\"", "2.".blue());
    println!("  {} vitae stats", "3.".blue());

    Ok(())
}
