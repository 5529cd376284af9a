//! Edge implementation for property graph
//!
//! An edge is a directed, labeled graph element between a tail (`out`)
//! vertex and a head (`in`) vertex. Both endpoints and the label are fixed
//! at construction. Several edges may connect the same pair of vertices.

use super::config::GraphSettings;
use super::element::{delegate_identity, delegate_property_access, Element, GraphElement};
use super::property::PropertyStore;
use super::schema::GraphSchema;
use super::types::ElementKind;
use super::vertex::{Direction, Vertex};
use parking_lot::RwLock;
use std::fmt;
use std::sync::{Arc, Weak};

/// A directed edge in the property graph
pub struct Edge<S: GraphSchema> {
    element: GraphElement<S, S::EdgeId>,

    /// Type of relationship (e.g., "KNOWS", "WORKS_AT")
    label: S::Label,

    out_vertex_id: S::VertexId,
    in_vertex_id: S::VertexId,

    // Weak so that an edge never keeps a removed vertex alive
    out_vertex: Weak<Vertex<S>>,
    in_vertex: Weak<Vertex<S>>,

    /// Hyperedges this edge is a member of
    hyperedges: RwLock<Vec<S::HyperEdgeId>>,
}

impl<S: GraphSchema> Edge<S> {
    /// Create a new directed edge from `out_vertex` to `in_vertex`.
    ///
    /// The edge is not added to either vertex's adjacency lists; the graph
    /// does that when it registers the edge.
    pub fn new(
        id: S::EdgeId,
        revision_id: S::RevisionId,
        out_vertex: &Arc<Vertex<S>>,
        in_vertex: &Arc<Vertex<S>>,
        label: S::Label,
        settings: &GraphSettings,
    ) -> Self {
        Edge {
            element: GraphElement::new(id, revision_id, settings.property_capacity),
            label,
            out_vertex_id: out_vertex.id().clone(),
            in_vertex_id: in_vertex.id().clone(),
            out_vertex: Arc::downgrade(out_vertex),
            in_vertex: Arc::downgrade(in_vertex),
            hyperedges: RwLock::new(Vec::new()),
        }
    }

    pub fn id(&self) -> &S::EdgeId {
        self.element.id()
    }

    pub fn revision_id(&self) -> &S::RevisionId {
        self.element.revision_id()
    }

    /// Backing store, e.g. to subscribe to property events
    pub fn property_store(&self) -> &PropertyStore<S::Key, S::Value> {
        self.element.properties()
    }

    pub fn label(&self) -> &S::Label {
        &self.label
    }

    pub fn has_label(&self, labels: &[S::Label]) -> bool {
        labels.is_empty() || labels.contains(&self.label)
    }

    /// Tail vertex, `None` once it has been dropped
    pub fn out_vertex(&self) -> Option<Arc<Vertex<S>>> {
        self.out_vertex.upgrade()
    }

    /// Head vertex, `None` once it has been dropped
    pub fn in_vertex(&self) -> Option<Arc<Vertex<S>>> {
        self.in_vertex.upgrade()
    }

    /// Endpoint on the `direction` side: `Out` is the tail, `In` the head
    pub fn vertex(&self, direction: Direction) -> Option<Arc<Vertex<S>>> {
        match direction {
            Direction::Out => self.out_vertex(),
            Direction::In => self.in_vertex(),
        }
    }

    pub fn out_vertex_id(&self) -> &S::VertexId {
        &self.out_vertex_id
    }

    pub fn in_vertex_id(&self) -> &S::VertexId {
        &self.in_vertex_id
    }

    /// Check if this edge goes FROM a specific vertex
    pub fn starts_from(&self, vertex: &S::VertexId) -> bool {
        &self.out_vertex_id == vertex
    }

    /// Check if this edge goes TO a specific vertex
    pub fn ends_at(&self, vertex: &S::VertexId) -> bool {
        &self.in_vertex_id == vertex
    }

    /// Check if this edge connects two specific vertices (in either direction)
    pub fn connects(&self, a: &S::VertexId, b: &S::VertexId) -> bool {
        (self.starts_from(a) && self.ends_at(b)) || (self.starts_from(b) && self.ends_at(a))
    }

    pub fn is_self_loop(&self) -> bool {
        self.out_vertex_id == self.in_vertex_id
    }

    /// Ids of the hyperedges containing this edge
    pub fn hyperedge_ids(&self) -> Vec<S::HyperEdgeId> {
        self.hyperedges.read().clone()
    }

    pub(crate) fn join_hyperedge(&self, hyperedge: S::HyperEdgeId) {
        let mut hyperedges = self.hyperedges.write();
        if !hyperedges.contains(&hyperedge) {
            hyperedges.push(hyperedge);
        }
    }

    pub(crate) fn leave_hyperedge(&self, hyperedge: &S::HyperEdgeId) {
        self.hyperedges.write().retain(|h| h != hyperedge);
    }

    pub(crate) fn take_hyperedge_ids(&self) -> Vec<S::HyperEdgeId> {
        std::mem::take(&mut *self.hyperedges.write())
    }
}

impl<S: GraphSchema> Element<S> for Edge<S> {
    type Id = S::EdgeId;

    const KIND: ElementKind = ElementKind::Edge;

    fn id(&self) -> &S::EdgeId {
        self.element.id()
    }

    fn revision_id(&self) -> &S::RevisionId {
        self.element.revision_id()
    }
}

delegate_property_access!(Edge, element);

delegate_identity!(Edge, element);

impl<S: GraphSchema> fmt::Debug for Edge<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("id", self.id())
            .field("label", &self.label)
            .field("out_vertex", &self.out_vertex_id)
            .field("in_vertex", &self.in_vertex_id)
            .finish()
    }
}
