//! # Vitae Store
//!
//! Storage backends and the graph query engine.
//!
//! Two implementations of the [`EntityStore`](vitae_core::EntityStore)
//! trait live here: [`MemoryStore`], a petgraph-backed in-memory graph
//! with hash-map secondary indices, and [`SqliteStore`] (behind the
//! `sqlite` feature), a file-backed store for graphs that must survive
//! the process. [`QueryEngine`] layers bounded traversal and fuzzy
//! label search over any store.

pub mod memory_store;
pub mod query;

#[cfg(feature = "sqlite")]
pub mod sqlite_store;

pub use memory_store::MemoryStore;
pub use query::{EntityContext, QueryEngine, ResolvedEdge, MAX_PATH_HOPS};

#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteStore;
