//! CLI command implementations.

pub mod feedback;
pub mod ingest;
pub mod init;
pub mod learn;
pub mod matching;
pub mod patterns;
pub mod search;
pub mod session;
pub mod stats;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use vitae::prelude::*;

use crate::config::current_profile_path;

/// Load the current profile, or fail with a hint when none exists.
pub(crate) fn load_current() -> Result<ProfileGraph> {
    let path = current_profile_path()?;
    if !path.exists() {
        bail!("No profile found. Run {} first.", "vitae ingest".cyan());
    }
    load_snapshot(&path).context("Failed to load current profile")
}

/// Load the current profile, or start an empty one.
pub(crate) fn load_or_create() -> Result<ProfileGraph> {
    let path = current_profile_path()?;
    if path.exists() {
        load_snapshot(&path).context("Failed to load current profile")
    } else {
        Ok(ProfileGraph::new())
    }
}

/// Persist the profile as the current snapshot.
pub(crate) fn save_current(profile: &ProfileGraph) -> Result<()> {
    let path = current_profile_path()?;
    save_snapshot(profile, &path).context("Failed to save current profile")
}
