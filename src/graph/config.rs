//! Graph configuration
//!
//! [`GraphSettings`] holds the serializable tunables of the backing
//! collections. [`GraphConfig`] adds the callbacks that derive a concrete
//! graph from the generic engine: id generators, element factories and an
//! optional graph initializer.

use super::edge::Edge;
use super::hyperedge::HyperEdge;
use super::schema::GraphSchema;
use super::store::{GraphError, GraphResult, GraphStore};
use super::vertex::Vertex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Capacity and sharding hints for the backing collections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    /// Initial capacity of the vertex registry
    pub initial_vertex_capacity: usize,
    /// Initial capacity of the edge registry
    pub initial_edge_capacity: usize,
    /// Initial capacity of the hyperedge registry
    pub initial_hyperedge_capacity: usize,
    /// Initial capacity of each adjacency list
    pub adjacency_capacity: usize,
    /// Initial capacity of each property store
    pub property_capacity: usize,
    /// Shard count of the concurrent registries (power of two, > 1)
    pub shard_amount: Option<usize>,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            initial_vertex_capacity: 1024,
            initial_edge_capacity: 4096,
            initial_hyperedge_capacity: 64,
            adjacency_capacity: 4,
            property_capacity: 4,
            shard_amount: None,
        }
    }
}

impl GraphSettings {
    /// Parse settings from YAML; missing fields keep their defaults
    pub fn from_yaml_str(yaml: &str) -> GraphResult<Self> {
        let settings: GraphSettings =
            serde_yaml::from_str(yaml).map_err(|e| GraphError::Configuration(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> GraphResult<()> {
        if let Some(shards) = self.shard_amount {
            if shards < 2 || !shards.is_power_of_two() {
                return Err(GraphError::Configuration(format!(
                    "shard_amount must be a power of two greater than 1, got {}",
                    shards
                )));
            }
        }
        Ok(())
    }
}

/// Produces fresh identifiers; must be safe to call from many threads
pub type IdGenerator<I> = Arc<dyn Fn() -> I + Send + Sync>;

/// Builds a vertex from its id and revision id
pub type VertexFactory<S> = Arc<
    dyn Fn(<S as GraphSchema>::VertexId, <S as GraphSchema>::RevisionId, &GraphSettings) -> Vertex<S>
        + Send
        + Sync,
>;

/// Builds an edge between two vertices
pub type EdgeFactory<S> = Arc<
    dyn Fn(
            <S as GraphSchema>::EdgeId,
            <S as GraphSchema>::RevisionId,
            &Arc<Vertex<S>>,
            &Arc<Vertex<S>>,
            <S as GraphSchema>::Label,
            &GraphSettings,
        ) -> Edge<S>
        + Send
        + Sync,
>;

/// Builds a hyperedge over a set of edges
pub type HyperEdgeFactory<S> = Arc<
    dyn Fn(
            <S as GraphSchema>::HyperEdgeId,
            <S as GraphSchema>::RevisionId,
            Vec<Arc<Edge<S>>>,
            <S as GraphSchema>::Label,
            &GraphSettings,
        ) -> HyperEdge<S>
        + Send
        + Sync,
>;

/// Runs once against a freshly constructed graph
pub type GraphInitializer<S> = Arc<dyn Fn(&GraphStore<S>) -> GraphResult<()> + Send + Sync>;

/// Sequential integer ids backed by an atomic counter
pub fn sequential_ids<I: From<u64>>(start: u64) -> IdGenerator<I> {
    let next = AtomicU64::new(start);
    Arc::new(move || I::from(next.fetch_add(1, Ordering::Relaxed)))
}

/// Random UUID v4 string ids
pub fn uuid_ids() -> IdGenerator<String> {
    Arc::new(|| uuid::Uuid::new_v4().to_string())
}

/// Everything needed to construct a [`GraphStore`]
pub struct GraphConfig<S: GraphSchema> {
    pub vertex_ids: IdGenerator<S::VertexId>,
    pub edge_ids: IdGenerator<S::EdgeId>,
    pub hyperedge_ids: IdGenerator<S::HyperEdgeId>,
    pub revision_ids: IdGenerator<S::RevisionId>,
    pub vertex_factory: VertexFactory<S>,
    pub edge_factory: EdgeFactory<S>,
    pub hyperedge_factory: HyperEdgeFactory<S>,
    pub graph_initializer: Option<GraphInitializer<S>>,
    pub settings: GraphSettings,
}

impl<S: GraphSchema> GraphConfig<S> {
    /// Configuration with the given generators and the stock factories
    pub fn new(
        vertex_ids: IdGenerator<S::VertexId>,
        edge_ids: IdGenerator<S::EdgeId>,
        hyperedge_ids: IdGenerator<S::HyperEdgeId>,
        revision_ids: IdGenerator<S::RevisionId>,
    ) -> Self {
        GraphConfig {
            vertex_ids,
            edge_ids,
            hyperedge_ids,
            revision_ids,
            vertex_factory: Arc::new(Vertex::<S>::new),
            edge_factory: Arc::new(Edge::<S>::new),
            hyperedge_factory: Arc::new(HyperEdge::<S>::new),
            graph_initializer: None,
            settings: GraphSettings::default(),
        }
    }

    /// Sequential ids for every kind, starting at 1 since 0 is the unset id
    pub fn sequential() -> Self
    where
        S::VertexId: From<u64>,
        S::EdgeId: From<u64>,
        S::HyperEdgeId: From<u64>,
        S::RevisionId: From<u64>,
    {
        Self::new(
            sequential_ids(1),
            sequential_ids(1),
            sequential_ids(1),
            sequential_ids(1),
        )
    }

    /// UUID string ids for every element kind, sequential revisions
    pub fn uuid() -> Self
    where
        S: GraphSchema<VertexId = String, EdgeId = String, HyperEdgeId = String>,
        S::RevisionId: From<u64>,
    {
        Self::new(uuid_ids(), uuid_ids(), uuid_ids(), sequential_ids(1))
    }

    pub fn with_settings(mut self, settings: GraphSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_vertex_factory(mut self, factory: VertexFactory<S>) -> Self {
        self.vertex_factory = factory;
        self
    }

    pub fn with_edge_factory(mut self, factory: EdgeFactory<S>) -> Self {
        self.edge_factory = factory;
        self
    }

    pub fn with_hyperedge_factory(mut self, factory: HyperEdgeFactory<S>) -> Self {
        self.hyperedge_factory = factory;
        self
    }

    pub fn with_graph_initializer(mut self, initializer: GraphInitializer<S>) -> Self {
        self.graph_initializer = Some(initializer);
        self
    }
}

impl<S: GraphSchema> Clone for GraphConfig<S> {
    fn clone(&self) -> Self {
        GraphConfig {
            vertex_ids: self.vertex_ids.clone(),
            edge_ids: self.edge_ids.clone(),
            hyperedge_ids: self.hyperedge_ids.clone(),
            revision_ids: self.revision_ids.clone(),
            vertex_factory: self.vertex_factory.clone(),
            edge_factory: self.edge_factory.clone(),
            hyperedge_factory: self.hyperedge_factory.clone(),
            graph_initializer: self.graph_initializer.clone(),
            settings: self.settings.clone(),
        }
    }
}

impl<S: GraphSchema> fmt::Debug for GraphConfig<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphConfig")
            .field("settings", &self.settings)
            .field("graph_initializer", &self.graph_initializer.is_some())
            .finish_non_exhaustive()
    }
}
