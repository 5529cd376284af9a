//! Propgraph
//!
//! An embeddable, in-memory property graph engine with read-optimized
//! snapshots.
//!
//! # Architecture
//!
//! - [`graph`]: the mutable graph. Vertices, directed labeled edges and
//!   hyperedges, each carrying properties, held in concurrent registries.
//! - [`snapshot`]: [`ReadOnlyGraph`], an immutable array-backed copy of a
//!   graph for repeated scans and counts.
//! - [`index`]: secondary property indices, manual or kept current
//!   automatically from property writes.
//!
//! Both graph forms implement [`GraphRead`], so read-side code is written
//! once.
//!
//! ## Example Usage
//!
//! ```rust
//! use propgraph::{GraphRead, GraphStore, Label, PropertyAccess, ReadOnlyGraph};
//!
//! let graph = GraphStore::with_defaults();
//!
//! let alice = graph.add_vertex(None).unwrap();
//! let bob = graph.add_vertex(None).unwrap();
//! alice.set_property("name", "Alice").unwrap();
//!
//! let knows = graph.add_edge(&alice, &bob, None, Label::new("KNOWS")).unwrap();
//! assert_eq!(alice.out_edges(&[])[0].id(), knows.id());
//!
//! let snapshot = ReadOnlyGraph::new(&graph).unwrap();
//! graph.remove_edge(knows.id());
//!
//! assert_eq!(snapshot.number_of_edges(None), 1);
//! assert_eq!(graph.number_of_edges(None), 0);
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod graph;
pub mod index;
pub mod snapshot;

// Re-export main types for convenience
pub use graph::{
    DefaultSchema, Direction, Edge, EdgeId, Element, ElementKind, GraphConfig, GraphError, GraphRead,
    GraphResult, GraphSchema, GraphSettings, GraphStore, HyperEdge, HyperEdgeId, Identifier, Label,
    PropertyAccess, PropertyEvent, PropertyMap, PropertyStore, PropertyValue, StringSchema, Vertex, VertexId,
    VertexRemoval,
};

pub use index::{IndexInfo, IndexKey, IndexManager, IndexMode, IndexRegistry, PropertyIndex};

pub use snapshot::{
    ElementCounts, ReadOnlyEdge, ReadOnlyGraph, ReadOnlyHyperEdge, ReadOnlyVertex, SnapshotOptions, SyncedIds,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let ver = version();
        assert!(!ver.is_empty());
        assert_eq!(ver, "0.1.0");
    }
}
