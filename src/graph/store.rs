//! In-memory graph storage implementation
//!
//! [`GraphStore`] owns three concurrent registries keyed by id (vertices,
//! edges, hyperedges) and keeps vertex adjacency in step with the edge
//! registry.
//!
//! Locking: registry lookups and scans take no graph lock. Element creation
//! holds the read side of the graph-scoped structure lock; removal and
//! `clear` hold the write side. Adjacency lists and hyperedge edge lists have
//! leaf locks that are only ever taken one at a time, after the structure
//! lock.

use super::config::{GraphConfig, IdGenerator};
use super::edge::Edge;
use super::element::{delegate_property_access, Element, GraphElement};
use super::hyperedge::HyperEdge;
use super::property::{PropertyAccess, PropertyStore};
use super::read::{Filter, GraphRead};
use super::schema::{DefaultSchema, GraphSchema};
use super::types::{ElementKind, Identifier};
use super::vertex::{Direction, Vertex};
use crate::index::IndexManager;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur during graph operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{kind} {id} already exists")]
    DuplicateId { kind: ElementKind, id: String },

    #[error("Property key {0} is reserved")]
    ReservedKey(String),

    #[error("Unsupported on read-only structure: {0}")]
    ReadOnly(String),

    #[error("Synced ids need an integral {kind} id type, got {type_name}")]
    SyncedIdsUnsupported {
        kind: ElementKind,
        type_name: &'static str,
    },

    #[error("{kind} id {id} does not fit a synced table of {capacity} slots")]
    SyncedIdOutOfRange {
        kind: ElementKind,
        id: String,
        capacity: usize,
    },

    #[error("More than {capacity} {kind} elements to copy")]
    CapacityExceeded { kind: ElementKind, capacity: usize },

    #[error("{kind} {id} not found")]
    NotFound { kind: ElementKind, id: String },

    #[error("Index {0} already exists")]
    IndexAlreadyExists(String),

    #[error("Index {0} not found")]
    IndexNotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// What [`GraphStore::remove_vertex`] took out of the graph
#[derive(Debug)]
pub struct VertexRemoval<S: GraphSchema> {
    pub vertex: Arc<Vertex<S>>,
    /// Incident edges, detached and unregistered
    pub edges: Vec<Arc<Edge<S>>>,
}

/// In-memory property graph
pub struct GraphStore<S: GraphSchema> {
    element: GraphElement<S, S::GraphId>,
    config: GraphConfig<S>,
    vertices: DashMap<S::VertexId, Arc<Vertex<S>>>,
    edges: DashMap<S::EdgeId, Arc<Edge<S>>>,
    hyperedges: DashMap<S::HyperEdgeId, Arc<HyperEdge<S>>>,
    structure: RwLock<()>,
    indices: IndexManager<S>,
}

/// Explicit id, or a generated one when `id` is missing or unset
fn resolve_id<I: Identifier>(kind: ElementKind, id: Option<I>, generator: &IdGenerator<I>) -> GraphResult<I> {
    let id = match id {
        Some(id) if !id.is_unset() => id,
        _ => generator(),
    };
    check_id(kind, &id)?;
    Ok(id)
}

fn check_id<I: Identifier>(kind: ElementKind, id: &I) -> GraphResult<()> {
    if id.is_unset() {
        return Err(GraphError::InvalidArgument(format!("{} id is not set", kind)));
    }
    if !id.is_representable() {
        return Err(GraphError::InvalidArgument(format!(
            "{} id {} does not fit an integer property",
            kind, id
        )));
    }
    Ok(())
}

fn registry<K, V>(capacity: usize, shards: Option<usize>) -> DashMap<K, V>
where
    K: Eq + std::hash::Hash,
{
    match shards {
        Some(shards) => DashMap::with_capacity_and_shard_amount(capacity, shards),
        None => DashMap::with_capacity(capacity),
    }
}

impl<S: GraphSchema> GraphStore<S> {
    /// Create a graph from `config`, running its graph initializer if any
    pub fn new(id: S::GraphId, config: GraphConfig<S>) -> GraphResult<Self> {
        config.settings.validate()?;
        let initializer = config.graph_initializer.clone();
        let graph = Self::build(id, config);

        if let Some(initializer) = initializer {
            initializer(&graph)?;
        }

        info!(
            "Created graph {} ({} vertices, {} edges after initialization)",
            graph.id(),
            graph.vertices.len(),
            graph.edges.len()
        );
        Ok(graph)
    }

    fn build(id: S::GraphId, config: GraphConfig<S>) -> Self {
        let settings = &config.settings;
        let revision_id = (config.revision_ids)();
        GraphStore {
            element: GraphElement::new(id, revision_id, settings.property_capacity),
            vertices: registry(settings.initial_vertex_capacity, settings.shard_amount),
            edges: registry(settings.initial_edge_capacity, settings.shard_amount),
            hyperedges: registry(settings.initial_hyperedge_capacity, settings.shard_amount),
            structure: RwLock::new(()),
            indices: IndexManager::new(),
            config,
        }
    }

    pub fn id(&self) -> &S::GraphId {
        self.element.id()
    }

    pub fn revision_id(&self) -> &S::RevisionId {
        self.element.revision_id()
    }

    /// Graph-level property store
    pub fn property_store(&self) -> &PropertyStore<S::Key, S::Value> {
        self.element.properties()
    }

    pub fn config(&self) -> &GraphConfig<S> {
        &self.config
    }

    /// Property indices of this graph
    pub fn indices(&self) -> &IndexManager<S> {
        &self.indices
    }

    // ---- vertices ----

    /// Create a vertex. A missing or unset id (the type's default) is taken
    /// from the vertex id generator.
    pub fn add_vertex(&self, id: Option<S::VertexId>) -> GraphResult<Arc<Vertex<S>>> {
        self.add_vertex_with(id, |_| Ok(()))
    }

    /// Create a vertex and run `initializer` on it before it is registered
    pub fn add_vertex_with<F>(&self, id: Option<S::VertexId>, initializer: F) -> GraphResult<Arc<Vertex<S>>>
    where
        F: FnOnce(&Vertex<S>) -> GraphResult<()>,
    {
        let id = resolve_id(ElementKind::Vertex, id, &self.config.vertex_ids)?;
        let _structure = self.structure.read();
        if self.vertices.contains_key(&id) {
            return Err(GraphError::DuplicateId {
                kind: ElementKind::Vertex,
                id: id.to_string(),
            });
        }

        let revision_id = (self.config.revision_ids)();
        let vertex = (self.config.vertex_factory)(id, revision_id, &self.config.settings);
        initializer(&vertex)?;

        let vertex = Arc::new(vertex);
        self.register_vertex(vertex.clone())?;
        Ok(vertex)
    }

    /// Register a vertex built outside the graph. Fails when its id is
    /// unset or already registered.
    pub fn insert_vertex(&self, vertex: Arc<Vertex<S>>) -> GraphResult<()> {
        check_id(ElementKind::Vertex, vertex.id())?;
        let _structure = self.structure.read();
        self.register_vertex(vertex)
    }

    fn register_vertex(&self, vertex: Arc<Vertex<S>>) -> GraphResult<()> {
        let id = vertex.id().clone();
        match self.vertices.entry(id.clone()) {
            Entry::Occupied(_) => {
                return Err(GraphError::DuplicateId {
                    kind: ElementKind::Vertex,
                    id: id.to_string(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(vertex.clone());
            }
        }
        self.indices.vertices().attach(id.clone(), vertex.property_store());
        debug!("Added vertex {}", id);
        Ok(())
    }

    pub fn get_vertex(&self, id: &S::VertexId) -> Option<Arc<Vertex<S>>> {
        self.vertices.get(id).map(|entry| entry.value().clone())
    }

    /// One slot per requested id; fails on an empty id list
    pub fn get_vertices(&self, ids: &[S::VertexId]) -> GraphResult<Vec<Option<Arc<Vertex<S>>>>> {
        self.vertices_by_id(ids)
    }

    pub fn contains_vertex(&self, id: &S::VertexId) -> bool {
        self.vertices.contains_key(id)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Remove a vertex together with every incident edge.
    ///
    /// Incident edges are detached from their other endpoint, dropped from
    /// any hyperedge and unregistered. Returns `None` for an unknown id.
    pub fn remove_vertex(&self, id: &S::VertexId) -> Option<VertexRemoval<S>> {
        let _structure = self.structure.write();
        let (_, vertex) = self.vertices.remove(id)?;
        self.indices.vertices().detach(id, vertex.property_store());

        let edges = vertex.take_incident_edges();
        for edge in &edges {
            self.edges.remove(edge.id());
            self.unlink_edge(edge);
        }

        debug!("Removed vertex {} and {} incident edges", id, edges.len());
        Some(VertexRemoval { vertex, edges })
    }

    // ---- edges ----

    /// Create an edge from `out_vertex` to `in_vertex` and add it to both
    /// adjacency lists. Endpoint membership in this graph is not checked.
    pub fn add_edge(
        &self,
        out_vertex: &Arc<Vertex<S>>,
        in_vertex: &Arc<Vertex<S>>,
        id: Option<S::EdgeId>,
        label: S::Label,
    ) -> GraphResult<Arc<Edge<S>>> {
        self.add_edge_with(out_vertex, in_vertex, id, label, |_| Ok(()))
    }

    /// Create an edge and run `initializer` on it before it is registered
    pub fn add_edge_with<F>(
        &self,
        out_vertex: &Arc<Vertex<S>>,
        in_vertex: &Arc<Vertex<S>>,
        id: Option<S::EdgeId>,
        label: S::Label,
        initializer: F,
    ) -> GraphResult<Arc<Edge<S>>>
    where
        F: FnOnce(&Edge<S>) -> GraphResult<()>,
    {
        let id = resolve_id(ElementKind::Edge, id, &self.config.edge_ids)?;
        let _structure = self.structure.read();
        if self.edges.contains_key(&id) {
            return Err(GraphError::DuplicateId {
                kind: ElementKind::Edge,
                id: id.to_string(),
            });
        }

        let revision_id = (self.config.revision_ids)();
        let edge = (self.config.edge_factory)(
            id,
            revision_id,
            out_vertex,
            in_vertex,
            label,
            &self.config.settings,
        );
        initializer(&edge)?;

        let edge = Arc::new(edge);
        let id = edge.id().clone();
        match self.edges.entry(id.clone()) {
            Entry::Occupied(_) => {
                return Err(GraphError::DuplicateId {
                    kind: ElementKind::Edge,
                    id: id.to_string(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(edge.clone());
            }
        }

        out_vertex.add_out_edge(edge.clone());
        in_vertex.add_in_edge(edge.clone());
        self.indices.edges().attach(id.clone(), edge.property_store());

        debug!("Added edge {} from {} to {}", id, out_vertex.id(), in_vertex.id());
        Ok(edge)
    }

    pub fn get_edge(&self, id: &S::EdgeId) -> Option<Arc<Edge<S>>> {
        self.edges.get(id).map(|entry| entry.value().clone())
    }

    pub fn get_edges(&self, ids: &[S::EdgeId]) -> GraphResult<Vec<Option<Arc<Edge<S>>>>> {
        self.edges_by_id(ids)
    }

    pub fn contains_edge(&self, id: &S::EdgeId) -> bool {
        self.edges.contains_key(id)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Unregister an edge and detach it from both endpoints and from every
    /// hyperedge containing it
    pub fn remove_edge(&self, id: &S::EdgeId) -> Option<Arc<Edge<S>>> {
        let _structure = self.structure.write();
        let (_, edge) = self.edges.remove(id)?;
        self.unlink_edge(&edge);
        debug!("Removed edge {}", id);
        Some(edge)
    }

    // Caller holds the structure write lock
    fn unlink_edge(&self, edge: &Arc<Edge<S>>) {
        if let Some(vertex) = edge.out_vertex() {
            vertex.detach(Direction::Out, edge.id());
        }
        if let Some(vertex) = edge.in_vertex() {
            vertex.detach(Direction::In, edge.id());
        }
        for hyperedge_id in edge.take_hyperedge_ids() {
            let hyperedge = self.hyperedges.get(&hyperedge_id).map(|entry| entry.value().clone());
            if let Some(hyperedge) = hyperedge {
                hyperedge.detach_edge(edge.id());
            }
        }
        self.indices.edges().detach(edge.id(), edge.property_store());
    }

    // ---- hyperedges ----

    pub fn add_hyperedge(
        &self,
        edges: Vec<Arc<Edge<S>>>,
        id: Option<S::HyperEdgeId>,
        label: S::Label,
    ) -> GraphResult<Arc<HyperEdge<S>>> {
        self.add_hyperedge_with(edges, id, label, |_| Ok(()))
    }

    /// Create a hyperedge over `edges` and run `initializer` on it before it
    /// is registered
    pub fn add_hyperedge_with<F>(
        &self,
        edges: Vec<Arc<Edge<S>>>,
        id: Option<S::HyperEdgeId>,
        label: S::Label,
        initializer: F,
    ) -> GraphResult<Arc<HyperEdge<S>>>
    where
        F: FnOnce(&HyperEdge<S>) -> GraphResult<()>,
    {
        let id = resolve_id(ElementKind::HyperEdge, id, &self.config.hyperedge_ids)?;
        let _structure = self.structure.read();
        if self.hyperedges.contains_key(&id) {
            return Err(GraphError::DuplicateId {
                kind: ElementKind::HyperEdge,
                id: id.to_string(),
            });
        }

        let revision_id = (self.config.revision_ids)();
        let hyperedge = (self.config.hyperedge_factory)(id, revision_id, edges, label, &self.config.settings);
        initializer(&hyperedge)?;

        let hyperedge = Arc::new(hyperedge);
        let id = hyperedge.id().clone();
        match self.hyperedges.entry(id.clone()) {
            Entry::Occupied(_) => {
                return Err(GraphError::DuplicateId {
                    kind: ElementKind::HyperEdge,
                    id: id.to_string(),
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(hyperedge.clone());
            }
        }

        for edge in hyperedge.edges() {
            edge.join_hyperedge(id.clone());
        }
        self.indices.hyperedges().attach(id.clone(), hyperedge.property_store());

        debug!("Added hyperedge {} over {} edges", id, hyperedge.edge_count());
        Ok(hyperedge)
    }

    pub fn get_hyperedge(&self, id: &S::HyperEdgeId) -> Option<Arc<HyperEdge<S>>> {
        self.hyperedges.get(id).map(|entry| entry.value().clone())
    }

    pub fn get_hyperedges(&self, ids: &[S::HyperEdgeId]) -> GraphResult<Vec<Option<Arc<HyperEdge<S>>>>> {
        self.hyperedges_by_id(ids)
    }

    pub fn hyperedge_count(&self) -> usize {
        self.hyperedges.len()
    }

    /// Unregister a hyperedge. Its member edges stay in the graph.
    pub fn remove_hyperedge(&self, id: &S::HyperEdgeId) -> Option<Arc<HyperEdge<S>>> {
        let _structure = self.structure.write();
        let (_, hyperedge) = self.hyperedges.remove(id)?;
        for edge in hyperedge.edges() {
            edge.leave_hyperedge(id);
        }
        self.indices.hyperedges().detach(id, hyperedge.property_store());
        debug!("Removed hyperedge {}", id);
        Some(hyperedge)
    }

    /// Remove every vertex, edge and hyperedge. Index definitions survive
    /// with their contents emptied.
    pub fn clear(&self) {
        let _structure = self.structure.write();

        let vertices: Vec<_> = self.vertices.iter().map(|entry| entry.value().clone()).collect();
        let edges: Vec<_> = self.edges.iter().map(|entry| entry.value().clone()).collect();
        let hyperedges: Vec<_> = self.hyperedges.iter().map(|entry| entry.value().clone()).collect();
        self.hyperedges.clear();
        self.edges.clear();
        self.vertices.clear();

        for vertex in &vertices {
            self.indices.vertices().detach(vertex.id(), vertex.property_store());
        }
        for edge in &edges {
            self.indices.edges().detach(edge.id(), edge.property_store());
        }
        for hyperedge in &hyperedges {
            self.indices.hyperedges().detach(hyperedge.id(), hyperedge.property_store());
        }
        self.indices.reset();

        info!(
            "Cleared graph {}: {} vertices, {} edges, {} hyperedges",
            self.id(),
            vertices.len(),
            edges.len(),
            hyperedges.len()
        );
    }

    // ---- indices ----

    /// Create an automatic vertex index over `property`, filled from the
    /// current vertices
    pub fn create_vertex_index(&self, name: &str, property: S::Key) -> GraphResult<()> {
        let key = property.clone();
        self.indices.vertices().create_automatic(name, property, || {
            self.vertices
                .iter()
                .filter_map(|entry| entry.value().get_property(&key).map(|v| (entry.key().clone(), v)))
                .collect()
        })
    }

    pub fn create_edge_index(&self, name: &str, property: S::Key) -> GraphResult<()> {
        let key = property.clone();
        self.indices.edges().create_automatic(name, property, || {
            self.edges
                .iter()
                .filter_map(|entry| entry.value().get_property(&key).map(|v| (entry.key().clone(), v)))
                .collect()
        })
    }

    pub fn create_hyperedge_index(&self, name: &str, property: S::Key) -> GraphResult<()> {
        let key = property.clone();
        self.indices.hyperedges().create_automatic(name, property, || {
            self.hyperedges
                .iter()
                .filter_map(|entry| entry.value().get_property(&key).map(|v| (entry.key().clone(), v)))
                .collect()
        })
    }

    /// Vertices stored under `value` in the named index. Ids that no longer
    /// resolve are skipped.
    pub fn vertices_by_index(&self, name: &str, value: &S::Value) -> GraphResult<Vec<Arc<Vertex<S>>>> {
        let ids = self.indices.vertices().lookup(name, value)?;
        Ok(ids.iter().filter_map(|id| self.get_vertex(id)).collect())
    }

    pub fn edges_by_index(&self, name: &str, value: &S::Value) -> GraphResult<Vec<Arc<Edge<S>>>> {
        let ids = self.indices.edges().lookup(name, value)?;
        Ok(ids.iter().filter_map(|id| self.get_edge(id)).collect())
    }

    pub fn hyperedges_by_index(&self, name: &str, value: &S::Value) -> GraphResult<Vec<Arc<HyperEdge<S>>>> {
        let ids = self.indices.hyperedges().lookup(name, value)?;
        Ok(ids.iter().filter_map(|id| self.get_hyperedge(id)).collect())
    }
}

impl GraphStore<DefaultSchema> {
    /// Integer-identified graph with sequential ids starting at 1
    pub fn with_defaults() -> Self {
        Self::build(1, GraphConfig::sequential())
    }
}

impl Default for GraphStore<DefaultSchema> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<S: GraphSchema> Element<S> for GraphStore<S> {
    type Id = S::GraphId;

    const KIND: ElementKind = ElementKind::Graph;

    fn id(&self) -> &S::GraphId {
        self.element.id()
    }

    fn revision_id(&self) -> &S::RevisionId {
        self.element.revision_id()
    }
}

delegate_property_access!(GraphStore, element);

impl<S: GraphSchema> GraphRead<S> for GraphStore<S> {
    type Vertex = Vertex<S>;
    type Edge = Edge<S>;
    type HyperEdge = HyperEdge<S>;

    type VertexRef<'a> = Arc<Vertex<S>> where Self: 'a;
    type EdgeRef<'a> = Arc<Edge<S>> where Self: 'a;
    type HyperEdgeRef<'a> = Arc<HyperEdge<S>> where Self: 'a;

    fn vertex(&self, id: &S::VertexId) -> Option<Arc<Vertex<S>>> {
        self.get_vertex(id)
    }

    /// Scans a point-in-time list of the registered vertices, so the graph
    /// may be mutated while the iterator is alive
    fn vertices<'a>(
        &'a self,
        filter: Option<Filter<'a, Vertex<S>>>,
    ) -> Box<dyn Iterator<Item = Arc<Vertex<S>>> + 'a> {
        let vertices: Vec<_> = self.vertices.iter().map(|entry| entry.value().clone()).collect();
        Box::new(
            vertices
                .into_iter()
                .filter(move |vertex| filter.map_or(true, |f| f(vertex))),
        )
    }

    fn number_of_vertices(&self, filter: Option<Filter<'_, Vertex<S>>>) -> usize {
        match filter {
            None => self.vertices.len(),
            Some(filter) => self.vertices(Some(filter)).count(),
        }
    }

    fn edge(&self, id: &S::EdgeId) -> Option<Arc<Edge<S>>> {
        self.get_edge(id)
    }

    fn edges<'a>(
        &'a self,
        filter: Option<Filter<'a, Edge<S>>>,
    ) -> Box<dyn Iterator<Item = Arc<Edge<S>>> + 'a> {
        let edges: Vec<_> = self.edges.iter().map(|entry| entry.value().clone()).collect();
        Box::new(edges.into_iter().filter(move |edge| filter.map_or(true, |f| f(edge))))
    }

    fn number_of_edges(&self, filter: Option<Filter<'_, Edge<S>>>) -> usize {
        match filter {
            None => self.edges.len(),
            Some(filter) => self.edges(Some(filter)).count(),
        }
    }

    fn hyperedge(&self, id: &S::HyperEdgeId) -> Option<Arc<HyperEdge<S>>> {
        self.get_hyperedge(id)
    }

    fn hyperedges<'a>(
        &'a self,
        filter: Option<Filter<'a, HyperEdge<S>>>,
    ) -> Box<dyn Iterator<Item = Arc<HyperEdge<S>>> + 'a> {
        let hyperedges: Vec<_> = self.hyperedges.iter().map(|entry| entry.value().clone()).collect();
        Box::new(
            hyperedges
                .into_iter()
                .filter(move |hyperedge| filter.map_or(true, |f| f(hyperedge))),
        )
    }

    fn number_of_hyperedges(&self, filter: Option<Filter<'_, HyperEdge<S>>>) -> usize {
        match filter {
            None => self.hyperedges.len(),
            Some(filter) => self.hyperedges(Some(filter)).count(),
        }
    }
}

impl<S: GraphSchema> fmt::Debug for GraphStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphStore")
            .field("id", self.id())
            .field("vertices", &self.vertices.len())
            .field("edges", &self.edges.len())
            .field("hyperedges", &self.hyperedges.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::property::PropertyValue;
    use crate::graph::types::{EdgeId, HyperEdgeId, Label, VertexId};

    fn knows() -> Label {
        Label::new("knows")
    }

    #[test]
    fn test_create_vertices() {
        let graph = GraphStore::with_defaults();
        let a = graph.add_vertex(None).unwrap();
        let b = graph.add_vertex(None).unwrap();

        assert_eq!(a.id(), &VertexId::new(1));
        assert_eq!(b.id(), &VertexId::new(2));
        assert_eq!(graph.vertex_count(), 2);
        assert!(graph.get_vertex(&VertexId::new(1)).is_some());
        assert!(graph.get_vertex(&VertexId::new(9)).is_none());
    }

    #[test]
    fn test_duplicate_vertex() {
        let graph = GraphStore::with_defaults();
        graph.add_vertex(Some(VertexId::new(7))).unwrap();

        let err = graph.add_vertex(Some(VertexId::new(7))).unwrap_err();
        assert_eq!(
            err,
            GraphError::DuplicateId {
                kind: ElementKind::Vertex,
                id: "VertexId(7)".to_string()
            }
        );
        assert_eq!(graph.vertex_count(), 1);
    }

    #[test]
    fn test_default_id_is_generated() {
        let graph = GraphStore::with_defaults();
        let first = graph.add_vertex(None).unwrap();
        let second = graph.add_vertex(Some(VertexId::default())).unwrap();

        assert_eq!(first.id(), &VertexId::new(1));
        assert_eq!(second.id(), &VertexId::new(2));

        let a = graph.add_vertex(None).unwrap();
        let edge = graph.add_edge(&first, &a, Some(EdgeId::default()), knows()).unwrap();
        assert_eq!(edge.id(), &EdgeId::new(1));
        let hyperedge = graph.add_hyperedge(vec![edge], Some(HyperEdgeId::new(0)), knows()).unwrap();
        assert_eq!(hyperedge.id(), &HyperEdgeId::new(1));
    }

    #[test]
    fn test_insert_vertex_rejects_default_id() {
        let graph = GraphStore::with_defaults();
        let unset: Arc<Vertex<DefaultSchema>> =
            Arc::new(Vertex::new(VertexId::default(), 1, &graph.config().settings));
        assert!(matches!(graph.insert_vertex(unset), Err(GraphError::InvalidArgument(_))));
        assert_eq!(graph.vertex_count(), 0);
    }

    #[test]
    fn test_oversized_integer_id_rejected() {
        let graph = GraphStore::with_defaults();
        let err = graph.add_vertex(Some(VertexId::new(u64::MAX))).unwrap_err();
        assert!(matches!(err, GraphError::InvalidArgument(_)));
        assert_eq!(graph.vertex_count(), 0);

        let largest = graph.add_vertex(Some(VertexId::new(i64::MAX as u64))).unwrap();
        assert_eq!(largest.get_property("Id"), Some(PropertyValue::Integer(i64::MAX)));
    }

    #[test]
    fn test_duplicate_edge_and_hyperedge_ids() {
        let graph = GraphStore::with_defaults();
        let a = graph.add_vertex(None).unwrap();
        let b = graph.add_vertex(None).unwrap();
        let edge = graph.add_edge(&a, &b, Some(EdgeId::new(5)), knows()).unwrap();
        graph.add_hyperedge(vec![edge.clone()], Some(HyperEdgeId::new(5)), knows()).unwrap();

        let err = graph.add_edge(&b, &a, Some(EdgeId::new(5)), knows()).unwrap_err();
        assert_eq!(
            err,
            GraphError::DuplicateId {
                kind: ElementKind::Edge,
                id: "EdgeId(5)".to_string()
            }
        );
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(b.out_degree(&[]), 0);
        assert_eq!(a.in_degree(&[]), 0);

        let err = graph
            .add_hyperedge(vec![edge.clone()], Some(HyperEdgeId::new(5)), knows())
            .unwrap_err();
        assert!(matches!(err, GraphError::DuplicateId { kind: ElementKind::HyperEdge, .. }));
        assert_eq!(graph.hyperedge_count(), 1);
        assert_eq!(edge.hyperedge_ids(), vec![HyperEdgeId::new(5)]);
    }

    #[test]
    fn test_generated_id_collision() {
        let graph = GraphStore::with_defaults();
        // Explicit ids that the generators hand out next
        let a = graph.add_vertex(Some(VertexId::new(1))).unwrap();
        let err = graph.add_vertex(None).unwrap_err();
        assert!(matches!(err, GraphError::DuplicateId { kind: ElementKind::Vertex, .. }));
        assert_eq!(graph.vertex_count(), 1);

        let b = graph.add_vertex(None).unwrap();
        assert_eq!(b.id(), &VertexId::new(2));

        let edge = graph.add_edge(&a, &b, Some(EdgeId::new(1)), knows()).unwrap();
        assert!(matches!(
            graph.add_edge(&a, &b, None, knows()),
            Err(GraphError::DuplicateId { kind: ElementKind::Edge, .. })
        ));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(a.out_degree(&[]), 1);

        graph.add_hyperedge(vec![edge.clone()], Some(HyperEdgeId::new(1)), knows()).unwrap();
        assert!(matches!(
            graph.add_hyperedge(vec![edge], None, knows()),
            Err(GraphError::DuplicateId { kind: ElementKind::HyperEdge, .. })
        ));
        assert_eq!(graph.hyperedge_count(), 1);
    }

    #[test]
    fn test_initializer_runs_before_registration() {
        let graph = GraphStore::with_defaults();
        let vertex = graph
            .add_vertex_with(None, |v| {
                v.set_property("name", "Alice")?;
                Ok(())
            })
            .unwrap();
        assert_eq!(vertex.get_property("name"), Some(PropertyValue::from("Alice")));

        // A failing initializer leaves nothing behind
        let err = graph
            .add_vertex_with(Some(VertexId::new(100)), |v| {
                v.set_property("Id", 1i64)?;
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, GraphError::ReservedKey(_)));
        assert!(!graph.contains_vertex(&VertexId::new(100)));
    }

    #[test]
    fn test_insert_prebuilt_vertex() {
        let graph = GraphStore::with_defaults();
        let vertex: Arc<Vertex<DefaultSchema>> =
            Arc::new(Vertex::new(VertexId::new(42), 1, &graph.config().settings));
        graph.insert_vertex(vertex.clone()).unwrap();
        assert!(graph.insert_vertex(vertex).is_err());
        assert!(graph.contains_vertex(&VertexId::new(42)));
    }

    #[test]
    fn test_create_edge_wires_adjacency() {
        let graph = GraphStore::with_defaults();
        let a = graph.add_vertex(None).unwrap();
        let b = graph.add_vertex(None).unwrap();
        let edge = graph.add_edge(&a, &b, None, knows()).unwrap();

        assert_eq!(edge.id(), &EdgeId::new(1));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(a.out_edges(&[])[0].id(), edge.id());
        assert_eq!(b.in_edges(&[])[0].id(), edge.id());
        assert_eq!(a.in_degree(&[]), 0);
    }

    #[test]
    fn test_remove_edge() {
        let graph = GraphStore::with_defaults();
        let a = graph.add_vertex(None).unwrap();
        let b = graph.add_vertex(None).unwrap();
        let edge = graph.add_edge(&a, &b, None, knows()).unwrap();

        let removed = graph.remove_edge(edge.id()).unwrap();
        assert_eq!(removed.id(), edge.id());
        assert!(graph.get_edge(edge.id()).is_none());
        assert_eq!(a.out_degree(&[]), 0);
        assert_eq!(b.in_degree(&[]), 0);
        assert!(graph.remove_edge(edge.id()).is_none());
    }

    #[test]
    fn test_remove_vertex_cascades() {
        let graph = GraphStore::with_defaults();
        let a = graph.add_vertex(None).unwrap();
        let b = graph.add_vertex(None).unwrap();
        let c = graph.add_vertex(None).unwrap();
        graph.add_edge(&a, &b, None, knows()).unwrap();
        graph.add_edge(&c, &a, None, knows()).unwrap();
        let kept = graph.add_edge(&b, &c, None, knows()).unwrap();

        let removal = graph.remove_vertex(a.id()).unwrap();
        assert_eq!(removal.vertex.id(), a.id());
        assert_eq!(removal.edges.len(), 2);

        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.contains_edge(kept.id()));
        assert_eq!(b.in_degree(&[]), 0);
        assert_eq!(c.out_degree(&[]), 0);
        assert_eq!(c.in_degree(&[]), 1);
        assert!(graph.remove_vertex(a.id()).is_none());
    }

    #[test]
    fn test_hyperedge_lifecycle() {
        let graph = GraphStore::with_defaults();
        let a = graph.add_vertex(None).unwrap();
        let b = graph.add_vertex(None).unwrap();
        let c = graph.add_vertex(None).unwrap();
        let e1 = graph.add_edge(&a, &b, None, knows()).unwrap();
        let e2 = graph.add_edge(&a, &c, None, knows()).unwrap();

        let hyperedge = graph
            .add_hyperedge(vec![e1.clone(), e2.clone()], None, Label::new("group"))
            .unwrap();
        assert_eq!(hyperedge.id(), &HyperEdgeId::new(1));
        assert_eq!(e1.hyperedge_ids(), vec![HyperEdgeId::new(1)]);
        assert_eq!(hyperedge.out_vertex().unwrap().id(), a.id());

        graph.remove_edge(e1.id());
        assert_eq!(hyperedge.edge_ids(), vec![e2.id().clone()]);

        graph.remove_hyperedge(hyperedge.id()).unwrap();
        assert!(e2.hyperedge_ids().is_empty());
        assert!(graph.contains_edge(e2.id()));
        assert_eq!(graph.hyperedge_count(), 0);
    }

    #[test]
    fn test_clear() {
        let graph = GraphStore::with_defaults();
        let a = graph.add_vertex(None).unwrap();
        let b = graph.add_vertex(None).unwrap();
        let e = graph.add_edge(&a, &b, None, knows()).unwrap();
        graph.add_hyperedge(vec![e], None, knows()).unwrap();

        graph.clear();
        assert_eq!(graph.vertex_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.hyperedge_count(), 0);
    }

    #[test]
    fn test_graph_initializer_and_properties() {
        let config = GraphConfig::<DefaultSchema>::sequential().with_graph_initializer(Arc::new(
            |graph: &GraphStore<DefaultSchema>| -> GraphResult<()> {
                graph.set_property("name", "social")?;
                graph.add_vertex(None)?;
                Ok(())
            },
        ));
        let graph = GraphStore::new(3, config).unwrap();

        assert_eq!(graph.id(), &3);
        assert_eq!(graph.vertex_count(), 1);
        assert_eq!(graph.get_property("name"), Some(PropertyValue::from("social")));
        assert_eq!(graph.get_property("Id"), Some(PropertyValue::Integer(3)));
        assert!(graph.remove_property("RevisionId").is_err());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = crate::graph::config::GraphSettings::default();
        settings.shard_amount = Some(3);
        let config = GraphConfig::<DefaultSchema>::sequential().with_settings(settings);
        assert!(matches!(
            GraphStore::new(0, config),
            Err(GraphError::Configuration(_))
        ));
    }

    #[test]
    fn test_filtered_reads() {
        let graph = GraphStore::with_defaults();
        for i in 0..10i64 {
            graph
                .add_vertex_with(None, |v| {
                    v.set_property("n", i)?;
                    Ok(())
                })
                .unwrap();
        }

        let even = |v: &Vertex<DefaultSchema>| v.get_property("n").and_then(|n| n.as_integer()).map_or(false, |n| n % 2 == 0);
        assert_eq!(graph.number_of_vertices(None), 10);
        assert_eq!(graph.number_of_vertices(Some(&even)), 5);
        assert_eq!(graph.vertices(Some(&even)).count(), 5);

        let found = graph.get_vertices(&[VertexId::new(1), VertexId::new(99)]).unwrap();
        assert!(found[0].is_some());
        assert!(found[1].is_none());
        assert!(matches!(graph.get_vertices(&[]), Err(GraphError::InvalidArgument(_))));
    }

    #[test]
    fn test_automatic_vertex_index() {
        let graph = GraphStore::with_defaults();
        let a = graph.add_vertex(None).unwrap();
        a.set_property("city", "Pune").unwrap();

        graph.create_vertex_index("by_city", "city".to_string()).unwrap();
        let b = graph
            .add_vertex_with(None, |v| {
                v.set_property("city", "Pune")?;
                Ok(())
            })
            .unwrap();

        let pune = PropertyValue::from("Pune");
        assert_eq!(graph.vertices_by_index("by_city", &pune).unwrap().len(), 2);

        b.set_property("city", "Delhi").unwrap();
        assert_eq!(graph.vertices_by_index("by_city", &pune).unwrap().len(), 1);

        graph.remove_vertex(a.id());
        assert!(graph.vertices_by_index("by_city", &pune).unwrap().is_empty());
    }
}
