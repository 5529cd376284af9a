//! Read-only property graph
//!
//! [`ReadOnlyGraph`] is an immutable, array-backed copy of a [`GraphStore`]
//! taken at one point in time. Construction copies vertices, then edges
//! (resolving endpoints against the copied vertices), then hyperedges
//! (resolving members against the copied edges). Vertex adjacency is derived
//! from the copied edges.
//!
//! The source graph must not be mutated while a snapshot is being built.

use super::element::{FrozenProperties, ReadOnlyEdge, ReadOnlyElement, ReadOnlyHyperEdge, ReadOnlyVertex};
use super::slots::SlotTable;
use crate::graph::element::delegate_property_access;
use crate::graph::{
    Direction, Edge, Element, ElementKind, Filter, GraphError, GraphRead, GraphResult, GraphSchema, GraphStore,
    HyperEdge, Identifier, Vertex,
};
use crate::index::IndexManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Per-kind flags: are ids dense integers usable as array offsets?
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncedIds {
    pub vertices: bool,
    pub edges: bool,
    pub hyperedges: bool,
}

impl SyncedIds {
    pub fn all() -> Self {
        SyncedIds {
            vertices: true,
            edges: true,
            hyperedges: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

/// Table sizes; a missing count is taken from the source graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementCounts {
    pub vertices: Option<usize>,
    pub edges: Option<usize>,
    pub hyperedges: Option<usize>,
}

/// Builds the read-only copy of a vertex
pub type VertexCreator<S> = Arc<dyn Fn(&Vertex<S>) -> GraphResult<ReadOnlyVertex<S>> + Send + Sync>;

/// Builds the read-only copy of an edge
pub type EdgeCreator<S> =
    Arc<dyn Fn(&Edge<S>, &SlotResolver<'_, S>) -> GraphResult<ReadOnlyEdge<S>> + Send + Sync>;

/// Builds the read-only copy of a hyperedge
pub type HyperEdgeCreator<S> =
    Arc<dyn Fn(&HyperEdge<S>, &SlotResolver<'_, S>) -> GraphResult<ReadOnlyHyperEdge<S>> + Send + Sync>;

/// How a snapshot is built
pub struct SnapshotOptions<S: GraphSchema> {
    pub counts: ElementCounts,
    pub synced_ids: SyncedIds,
    pub vertex_creator: VertexCreator<S>,
    pub edge_creator: EdgeCreator<S>,
    pub hyperedge_creator: HyperEdgeCreator<S>,
}

impl<S: GraphSchema> SnapshotOptions<S> {
    pub fn new() -> Self {
        SnapshotOptions {
            counts: ElementCounts::default(),
            synced_ids: SyncedIds::none(),
            vertex_creator: Arc::new(ReadOnlyVertex::<S>::from_source),
            edge_creator: Arc::new(ReadOnlyEdge::<S>::from_source),
            hyperedge_creator: Arc::new(ReadOnlyHyperEdge::<S>::from_source),
        }
    }

    pub fn with_counts(mut self, counts: ElementCounts) -> Self {
        self.counts = counts;
        self
    }

    pub fn with_synced_ids(mut self, synced_ids: SyncedIds) -> Self {
        self.synced_ids = synced_ids;
        self
    }

    pub fn with_vertex_creator(mut self, creator: VertexCreator<S>) -> Self {
        self.vertex_creator = creator;
        self
    }

    pub fn with_edge_creator(mut self, creator: EdgeCreator<S>) -> Self {
        self.edge_creator = creator;
        self
    }

    pub fn with_hyperedge_creator(mut self, creator: HyperEdgeCreator<S>) -> Self {
        self.hyperedge_creator = creator;
        self
    }
}

impl<S: GraphSchema> Default for SnapshotOptions<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GraphSchema> Clone for SnapshotOptions<S> {
    fn clone(&self) -> Self {
        SnapshotOptions {
            counts: self.counts,
            synced_ids: self.synced_ids,
            vertex_creator: self.vertex_creator.clone(),
            edge_creator: self.edge_creator.clone(),
            hyperedge_creator: self.hyperedge_creator.clone(),
        }
    }
}

impl<S: GraphSchema> fmt::Debug for SnapshotOptions<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotOptions")
            .field("counts", &self.counts)
            .field("synced_ids", &self.synced_ids)
            .finish_non_exhaustive()
    }
}

/// Id→slot lookups into the tables copied so far
pub struct SlotResolver<'a, S: GraphSchema> {
    vertices: &'a SlotTable<S::VertexId, ReadOnlyVertex<S>>,
    edges: Option<&'a SlotTable<S::EdgeId, ReadOnlyEdge<S>>>,
}

impl<'a, S: GraphSchema> SlotResolver<'a, S> {
    /// Slot of a copied vertex; `NotFound` if it was not copied
    pub fn vertex_slot(&self, id: &S::VertexId) -> GraphResult<usize> {
        self.vertices.slot_of(id).ok_or_else(|| GraphError::NotFound {
            kind: ElementKind::Vertex,
            id: id.to_string(),
        })
    }

    /// Slot of a copied edge; `NotFound` if it was not copied or edges are
    /// not copied yet
    pub fn edge_slot(&self, id: &S::EdgeId) -> GraphResult<usize> {
        self.edges
            .and_then(|edges| edges.slot_of(id))
            .ok_or_else(|| GraphError::NotFound {
                kind: ElementKind::Edge,
                id: id.to_string(),
            })
    }
}

fn table<I: Identifier, T>(kind: ElementKind, synced: bool, capacity: usize) -> GraphResult<SlotTable<I, T>> {
    if synced {
        SlotTable::synced(kind, capacity)
    } else {
        Ok(SlotTable::indexed(kind, capacity))
    }
}

/// Immutable, array-backed property graph
pub struct ReadOnlyGraph<S: GraphSchema> {
    element: ReadOnlyElement<S, S::GraphId>,
    vertices: SlotTable<S::VertexId, ReadOnlyVertex<S>>,
    edges: SlotTable<S::EdgeId, ReadOnlyEdge<S>>,
    hyperedges: SlotTable<S::HyperEdgeId, ReadOnlyHyperEdge<S>>,
    indices: IndexManager<S>,
}

impl<S: GraphSchema> ReadOnlyGraph<S> {
    /// Snapshot `source` with the default creators and no synced ids
    pub fn new(source: &GraphStore<S>) -> GraphResult<Self> {
        Self::with_options(source, &SnapshotOptions::default())
    }

    pub fn with_options(source: &GraphStore<S>, options: &SnapshotOptions<S>) -> GraphResult<Self> {
        let synced = options.synced_ids;
        let vertex_count = options
            .counts
            .vertices
            .unwrap_or_else(|| source.number_of_vertices(None));
        let edge_count = options.counts.edges.unwrap_or_else(|| source.number_of_edges(None));
        let hyperedge_count = options
            .counts
            .hyperedges
            .unwrap_or_else(|| source.number_of_hyperedges(None));

        let mut vertices = table(ElementKind::Vertex, synced.vertices, vertex_count)?;
        let mut edges = table(ElementKind::Edge, synced.edges, edge_count)?;
        let mut hyperedges = table(ElementKind::HyperEdge, synced.hyperedges, hyperedge_count)?;

        for vertex in source.vertices(None) {
            let copy = (options.vertex_creator)(&vertex)?;
            vertices.insert(copy.id().clone(), copy)?;
        }

        {
            let resolver = SlotResolver {
                vertices: &vertices,
                edges: None,
            };
            for edge in source.edges(None) {
                let copy = (options.edge_creator)(&edge, &resolver)?;
                edges.insert(copy.id().clone(), copy)?;
            }
        }

        for (slot, edge) in edges.iter_slots() {
            if let Some(vertex) = vertices.get_slot_mut(edge.out_vertex_slot()) {
                vertex.out_edges.push(slot);
            }
            if let Some(vertex) = vertices.get_slot_mut(edge.in_vertex_slot()) {
                vertex.in_edges.push(slot);
            }
        }

        {
            let resolver = SlotResolver {
                vertices: &vertices,
                edges: Some(&edges),
            };
            for hyperedge in source.hyperedges(None) {
                let copy = (options.hyperedge_creator)(&hyperedge, &resolver)?;
                hyperedges.insert(copy.id().clone(), copy)?;
            }
        }

        let element = ReadOnlyElement::copy_of(source.id(), source.revision_id(), source.property_store());
        let graph = ReadOnlyGraph {
            element,
            vertices,
            edges,
            hyperedges,
            indices: source.indices().frozen_copy(),
        };

        info!(
            "Built snapshot of graph {}: {} vertices, {} edges, {} hyperedges",
            graph.id(),
            graph.vertices.len(),
            graph.edges.len(),
            graph.hyperedges.len()
        );
        Ok(graph)
    }

    pub fn id(&self) -> &S::GraphId {
        self.element.id()
    }

    pub fn revision_id(&self) -> &S::RevisionId {
        self.element.revision_id()
    }

    /// Graph-level properties as they were when the snapshot was taken
    pub fn frozen_properties(&self) -> &FrozenProperties<S::Key, S::Value> {
        self.element.properties()
    }

    /// Frozen copy of the source's indices
    pub fn indices(&self) -> &IndexManager<S> {
        &self.indices
    }

    pub fn vertex_at(&self, slot: usize) -> Option<&ReadOnlyVertex<S>> {
        self.vertices.get_slot(slot)
    }

    pub fn edge_at(&self, slot: usize) -> Option<&ReadOnlyEdge<S>> {
        self.edges.get_slot(slot)
    }

    pub fn hyperedge_at(&self, slot: usize) -> Option<&ReadOnlyHyperEdge<S>> {
        self.hyperedges.get_slot(slot)
    }

    // ---- traversal ----

    /// Edges on the `direction` side of `vertex`, narrowed to `labels`
    /// (empty means every label)
    pub fn edges_of<'a>(
        &'a self,
        vertex: &'a ReadOnlyVertex<S>,
        direction: Direction,
        labels: &'a [S::Label],
    ) -> impl Iterator<Item = &'a ReadOnlyEdge<S>> + 'a {
        vertex
            .edge_slots(direction)
            .iter()
            .filter_map(move |slot| self.edges.get_slot(*slot))
            .filter(move |edge| edge.has_label(labels))
    }

    pub fn out_edges<'a>(
        &'a self,
        vertex: &'a ReadOnlyVertex<S>,
        labels: &'a [S::Label],
    ) -> impl Iterator<Item = &'a ReadOnlyEdge<S>> + 'a {
        self.edges_of(vertex, Direction::Out, labels)
    }

    pub fn in_edges<'a>(
        &'a self,
        vertex: &'a ReadOnlyVertex<S>,
        labels: &'a [S::Label],
    ) -> impl Iterator<Item = &'a ReadOnlyEdge<S>> + 'a {
        self.edges_of(vertex, Direction::In, labels)
    }

    /// Vertices at the far end of the `direction` edges of `vertex`
    pub fn adjacent_vertices<'a>(
        &'a self,
        vertex: &'a ReadOnlyVertex<S>,
        direction: Direction,
        labels: &'a [S::Label],
    ) -> impl Iterator<Item = &'a ReadOnlyVertex<S>> + 'a {
        self.edges_of(vertex, direction, labels)
            .filter_map(move |edge| self.vertices.get_slot(edge.vertex_slot(direction.reverse())))
    }

    pub fn degree(&self, vertex: &ReadOnlyVertex<S>, direction: Direction, labels: &[S::Label]) -> usize {
        if labels.is_empty() {
            return vertex.edge_slots(direction).len();
        }
        self.edges_of(vertex, direction, labels).count()
    }

    pub fn out_vertex(&self, edge: &ReadOnlyEdge<S>) -> Option<&ReadOnlyVertex<S>> {
        self.vertices.get_slot(edge.out_vertex_slot())
    }

    pub fn in_vertex(&self, edge: &ReadOnlyEdge<S>) -> Option<&ReadOnlyVertex<S>> {
        self.vertices.get_slot(edge.in_vertex_slot())
    }

    /// Member edges of `hyperedge` in membership order
    pub fn hyperedge_edges<'a>(
        &'a self,
        hyperedge: &'a ReadOnlyHyperEdge<S>,
    ) -> impl Iterator<Item = &'a ReadOnlyEdge<S>> + 'a {
        hyperedge
            .edge_slots()
            .iter()
            .filter_map(move |slot| self.edges.get_slot(*slot))
    }

    /// Out vertex of the first member edge
    pub fn hyperedge_out_vertex(&self, hyperedge: &ReadOnlyHyperEdge<S>) -> Option<&ReadOnlyVertex<S>> {
        self.hyperedge_edges(hyperedge)
            .next()
            .and_then(|edge| self.out_vertex(edge))
    }

    pub fn hyperedge_in_vertices<'a>(
        &'a self,
        hyperedge: &'a ReadOnlyHyperEdge<S>,
    ) -> impl Iterator<Item = &'a ReadOnlyVertex<S>> + 'a {
        self.hyperedge_edges(hyperedge)
            .filter_map(move |edge| self.in_vertex(edge))
    }

    // ---- indices ----

    pub fn vertices_by_index(&self, name: &str, value: &S::Value) -> GraphResult<Vec<&ReadOnlyVertex<S>>> {
        let ids = self.indices.vertices().lookup(name, value)?;
        Ok(ids.iter().filter_map(|id| self.vertices.get(id)).collect())
    }

    pub fn edges_by_index(&self, name: &str, value: &S::Value) -> GraphResult<Vec<&ReadOnlyEdge<S>>> {
        let ids = self.indices.edges().lookup(name, value)?;
        Ok(ids.iter().filter_map(|id| self.edges.get(id)).collect())
    }

    pub fn hyperedges_by_index(&self, name: &str, value: &S::Value) -> GraphResult<Vec<&ReadOnlyHyperEdge<S>>> {
        let ids = self.indices.hyperedges().lookup(name, value)?;
        Ok(ids.iter().filter_map(|id| self.hyperedges.get(id)).collect())
    }
}

impl<S: GraphSchema> Element<S> for ReadOnlyGraph<S> {
    type Id = S::GraphId;

    const KIND: ElementKind = ElementKind::Graph;

    fn id(&self) -> &S::GraphId {
        self.element.id()
    }

    fn revision_id(&self) -> &S::RevisionId {
        self.element.revision_id()
    }
}

delegate_property_access!(ReadOnlyGraph, element);

impl<S: GraphSchema> GraphRead<S> for ReadOnlyGraph<S> {
    type Vertex = ReadOnlyVertex<S>;
    type Edge = ReadOnlyEdge<S>;
    type HyperEdge = ReadOnlyHyperEdge<S>;

    type VertexRef<'a> = &'a ReadOnlyVertex<S> where Self: 'a;
    type EdgeRef<'a> = &'a ReadOnlyEdge<S> where Self: 'a;
    type HyperEdgeRef<'a> = &'a ReadOnlyHyperEdge<S> where Self: 'a;

    fn vertex(&self, id: &S::VertexId) -> Option<&ReadOnlyVertex<S>> {
        self.vertices.get(id)
    }

    fn vertices<'a>(
        &'a self,
        filter: Option<Filter<'a, ReadOnlyVertex<S>>>,
    ) -> Box<dyn Iterator<Item = &'a ReadOnlyVertex<S>> + 'a> {
        Box::new(
            self.vertices
                .iter()
                .filter(move |vertex| filter.map_or(true, |f| f(vertex))),
        )
    }

    fn number_of_vertices(&self, filter: Option<Filter<'_, ReadOnlyVertex<S>>>) -> usize {
        match filter {
            None => self.vertices.len(),
            Some(filter) => self.vertices.iter().filter(|vertex| filter(vertex)).count(),
        }
    }

    fn edge(&self, id: &S::EdgeId) -> Option<&ReadOnlyEdge<S>> {
        self.edges.get(id)
    }

    fn edges<'a>(
        &'a self,
        filter: Option<Filter<'a, ReadOnlyEdge<S>>>,
    ) -> Box<dyn Iterator<Item = &'a ReadOnlyEdge<S>> + 'a> {
        Box::new(self.edges.iter().filter(move |edge| filter.map_or(true, |f| f(edge))))
    }

    fn number_of_edges(&self, filter: Option<Filter<'_, ReadOnlyEdge<S>>>) -> usize {
        match filter {
            None => self.edges.len(),
            Some(filter) => self.edges.iter().filter(|edge| filter(edge)).count(),
        }
    }

    fn hyperedge(&self, id: &S::HyperEdgeId) -> Option<&ReadOnlyHyperEdge<S>> {
        self.hyperedges.get(id)
    }

    fn hyperedges<'a>(
        &'a self,
        filter: Option<Filter<'a, ReadOnlyHyperEdge<S>>>,
    ) -> Box<dyn Iterator<Item = &'a ReadOnlyHyperEdge<S>> + 'a> {
        Box::new(
            self.hyperedges
                .iter()
                .filter(move |hyperedge| filter.map_or(true, |f| f(hyperedge))),
        )
    }

    fn number_of_hyperedges(&self, filter: Option<Filter<'_, ReadOnlyHyperEdge<S>>>) -> usize {
        match filter {
            None => self.hyperedges.len(),
            Some(filter) => self.hyperedges.iter().filter(|hyperedge| filter(hyperedge)).count(),
        }
    }
}

impl<S: GraphSchema> fmt::Debug for ReadOnlyGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyGraph")
            .field("id", self.id())
            .field("vertices", &self.vertices)
            .field("edges", &self.edges)
            .field("hyperedges", &self.hyperedges)
            .finish()
    }
}
