//! Core property graph implementation
//!
//! This module implements the mutable property graph:
//! - Vertices with outgoing and incoming adjacency lists
//! - Directed, labeled edges; several edges may join the same vertices
//! - Hyperedges grouping edges under one label
//! - Properties on every element, the graph included, with reserved
//!   id and revision id entries
//! - Concurrent registries keyed by id

pub mod config;
pub mod edge;
pub mod element;
pub mod event;
pub mod hyperedge;
pub mod property;
pub mod read;
pub mod schema;
pub mod store;
pub mod types;
pub mod vertex;

// Re-export main types
pub use config::{
    sequential_ids, uuid_ids, EdgeFactory, GraphConfig, GraphInitializer, GraphSettings, HyperEdgeFactory,
    IdGenerator, VertexFactory,
};
pub use edge::Edge;
pub use element::{Element, GraphElement};
pub use event::{PropertyEvent, PropertyListener, SubscriptionId};
pub use hyperedge::HyperEdge;
pub use property::{PropertyAccess, PropertyData, PropertyMap, PropertyStore, PropertyValue};
pub use read::{Filter, GraphRead};
pub use schema::{DefaultSchema, GraphSchema, StringSchema, ID_KEY, REVISION_ID_KEY};
pub use store::{GraphError, GraphResult, GraphStore, VertexRemoval};
pub use types::{EdgeId, EdgeLabel, ElementKind, HyperEdgeId, Identifier, Label, PropertyKey, VertexId};
pub use vertex::{Direction, Vertex};
