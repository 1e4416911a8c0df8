//! In-memory `GraphStore` adapter.
//!
//! Suitable for tests and single-process deployments; everything lives in
//! process memory behind `tokio` read-write locks. A store backed by a
//! database implements the same `metagraph_core::ports::GraphStore` trait
//! and slots in behind the repository facade unchanged.

mod store;
mod testing;

pub use store::MemGraphStore;
pub use testing::UnsupportedTraversalStore;
