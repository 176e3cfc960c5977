//! # Vitae Core
//!
//! Shared types, the `EntityStore` trait, and the error taxonomy for the
//! vitae knowledge graph.
//!
//! The graph models a person's professional profile: typed entities
//! (skills, roles, organizations, ...) connected by typed, weighted
//! relationships. Every entity and relationship carries a confidence
//! score in [0, 1] that downstream components adjust from feedback.

pub mod error;
pub mod prelude;
pub mod store;
pub mod types;

pub use error::{Result, VitaeError};
pub use store::{EntityStore, StoreStats};
pub use types::*;
