//! Snapshot persistence: save/load the profile graph and feedback
//! history as pretty-printed JSON.
//!
//! Entities and relationships serialize as-is, so a snapshot keeps
//! every id stable across save/load and feedback records still point
//! at the right nodes after a restore.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use vitae_core::types::{Entity, FeedbackRecord, Relationship};
use vitae_core::{EntityStore, Result, VitaeError};
use vitae_learn::FeedbackLedger;
use vitae_store::MemoryStore;

use crate::profile::ProfileGraph;

/// Bumped when the snapshot layout changes incompatibly.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable snapshot of a profile graph and its feedback history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub version: u32,
    pub nodes: Vec<Entity>,
    pub edges: Vec<Relationship>,
    #[serde(default)]
    pub feedback: Vec<FeedbackRecord>,
    pub metadata: SnapshotMetadata,
}

/// Snapshot bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub saved_at: DateTime<Utc>,
    pub node_count: usize,
    pub edge_count: usize,
    #[serde(default)]
    pub feedback_count: usize,
}

impl GraphSnapshot {
    /// Capture the current state of a profile.
    pub fn capture(profile: &ProfileGraph) -> Result<Self> {
        let nodes = profile.store().all_nodes()?;
        let edges = profile.store().all_edges()?;
        let feedback = profile.ledger().history().to_vec();

        Ok(Self {
            metadata: SnapshotMetadata {
                saved_at: Utc::now(),
                node_count: nodes.len(),
                edge_count: edges.len(),
                feedback_count: feedback.len(),
            },
            version: SNAPSHOT_VERSION,
            nodes,
            edges,
            feedback,
        })
    }

    /// Rebuild a profile from this snapshot.
    ///
    /// Nodes go in before edges so endpoint validation holds; an edge
    /// whose endpoint is missing from the snapshot is an error rather
    /// than a silent drop.
    pub fn restore(&self) -> Result<ProfileGraph> {
        let mut store = MemoryStore::new();
        for node in &self.nodes {
            store.upsert_node(node.clone())?;
        }
        for edge in &self.edges {
            store.upsert_edge(edge.clone())?;
        }
        let ledger = FeedbackLedger::from_records(self.feedback.clone());
        Ok(ProfileGraph::from_parts(store, ledger))
    }
}

/// Save a profile to a JSON file, creating parent directories as
/// needed.
pub fn save_snapshot(profile: &ProfileGraph, path: &Path) -> Result<()> {
    let snapshot = GraphSnapshot::capture(profile)?;
    let json = serde_json::to_string_pretty(&snapshot)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    Ok(())
}

/// Load a profile from a JSON snapshot file.
pub fn load_snapshot(path: &Path) -> Result<ProfileGraph> {
    let json = std::fs::read_to_string(path)?;
    let snapshot: GraphSnapshot = serde_json::from_str(&json)?;
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(VitaeError::Serialization(format!(
            "snapshot version {} is newer than supported version {}",
            snapshot.version, SNAPSHOT_VERSION
        )));
    }
    snapshot.restore()
}
