//! Explanation cache module
//!
//! Keeps the most recent explanations so repeated selections skip the network.
//!
//! This module contains two main components:
//! - `store`: Durable key-value slots (embedded database, in-memory fallback)
//! - `recency`: Bounded, insertion-ordered cache persisted into one slot

pub mod store;
pub mod recency;

pub use recency::ExplanationCache;
pub use store::{KeyValueStore, MemoryStore, RedbStore};
