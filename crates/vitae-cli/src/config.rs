//! Configuration management for the Vitae CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Vitae project configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    #[serde(default = "default_context_weight")]
    pub default_context_weight: f64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

// Default value functions
fn default_context_weight() -> f64 { 0.5 }
fn default_max_results() -> usize { 10 }
fn default_threshold() -> f64 { 0.7 }

impl Default for Config {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            default_context_weight: default_context_weight(),
            max_results: default_max_results(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

impl Config {
    /// Load config from vitae.toml in the current or parent
    /// directories, falling back to the user config directory.
    pub fn load() -> Result<Self> {
        if let Some(path) = find_config_file() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Find vitae.toml in the current or parent directories, then in the
/// user config directory.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join("vitae.toml");
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }

    let user_config = dirs::config_dir()?.join("vitae").join("vitae.toml");
    if user_config.exists() {
        return Some(user_config);
    }
    None
}

/// Get the Vitae data directory (.vitae/).
pub fn data_dir() -> Result<PathBuf> {
    let dir = std::env::current_dir()?.join(".vitae");
    Ok(dir)
}

/// Path to the current profile snapshot.
pub fn current_profile_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("current.json"))
}

/// Directory holding named snapshots.
pub fn snapshots_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("snapshots"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.matcher.max_results, config.matcher.max_results);
        assert_eq!(parsed.search.threshold, config.search.threshold);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.matcher.default_context_weight, 0.5);
        assert_eq!(parsed.search.threshold, 0.7);
    }
}
