//! Read-optimized graph snapshots
//!
//! A [`ReadOnlyGraph`] is copied once from a live graph into fixed-size
//! slot tables and never changes afterward:
//! - Vertices, edges and hyperedges addressed by id or by slot
//! - Synced ids: integral ids used directly as slot offsets
//! - Adjacency and hyperedge membership stored as slots
//! - Every mutator fails with [`GraphError::ReadOnly`](crate::graph::GraphError::ReadOnly)

pub mod element;
pub mod graph;
pub mod slots;

pub use element::{FrozenProperties, ReadOnlyEdge, ReadOnlyElement, ReadOnlyHyperEdge, ReadOnlyVertex};
pub use graph::{
    EdgeCreator, ElementCounts, HyperEdgeCreator, ReadOnlyGraph, SlotResolver, SnapshotOptions, SyncedIds,
    VertexCreator,
};
pub use slots::SlotTable;
