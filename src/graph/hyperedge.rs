//! Hyperedge implementation
//!
//! A hyperedge groups a set of edges under one label. It is not wired into
//! vertex adjacency; its endpoints are derived from its member edges.

use super::config::GraphSettings;
use super::edge::Edge;
use super::element::{delegate_identity, delegate_property_access, Element, GraphElement};
use super::property::PropertyStore;
use super::schema::GraphSchema;
use super::types::ElementKind;
use super::vertex::Vertex;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A labeled collection of edges
pub struct HyperEdge<S: GraphSchema> {
    element: GraphElement<S, S::HyperEdgeId>,
    label: S::Label,
    edges: RwLock<Vec<Arc<Edge<S>>>>,
}

impl<S: GraphSchema> HyperEdge<S> {
    pub fn new(
        id: S::HyperEdgeId,
        revision_id: S::RevisionId,
        edges: Vec<Arc<Edge<S>>>,
        label: S::Label,
        settings: &GraphSettings,
    ) -> Self {
        HyperEdge {
            element: GraphElement::new(id, revision_id, settings.property_capacity),
            label,
            edges: RwLock::new(edges),
        }
    }

    pub fn id(&self) -> &S::HyperEdgeId {
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

    /// Member edges in insertion order
    pub fn edges(&self) -> Vec<Arc<Edge<S>>> {
        self.edges.read().clone()
    }

    pub fn edge_ids(&self) -> Vec<S::EdgeId> {
        self.edges.read().iter().map(|edge| edge.id().clone()).collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.read().is_empty()
    }

    pub fn contains_edge(&self, edge_id: &S::EdgeId) -> bool {
        self.edges.read().iter().any(|edge| edge.id() == edge_id)
    }

    /// Out vertex of the first member edge
    pub fn out_vertex(&self) -> Option<Arc<Vertex<S>>> {
        self.edges.read().first().and_then(|edge| edge.out_vertex())
    }

    /// In vertices of every member edge, in edge order
    pub fn in_vertices(&self) -> Vec<Arc<Vertex<S>>> {
        self.edges
            .read()
            .iter()
            .filter_map(|edge| edge.in_vertex())
            .collect()
    }

    pub(crate) fn detach_edge(&self, edge_id: &S::EdgeId) -> bool {
        let mut edges = self.edges.write();
        let before = edges.len();
        edges.retain(|edge| edge.id() != edge_id);
        edges.len() != before
    }
}

impl<S: GraphSchema> Element<S> for HyperEdge<S> {
    type Id = S::HyperEdgeId;

    const KIND: ElementKind = ElementKind::HyperEdge;

    fn id(&self) -> &S::HyperEdgeId {
        self.element.id()
    }

    fn revision_id(&self) -> &S::RevisionId {
        self.element.revision_id()
    }
}

delegate_property_access!(HyperEdge, element);

delegate_identity!(HyperEdge, element);

impl<S: GraphSchema> fmt::Debug for HyperEdge<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperEdge")
            .field("id", self.id())
            .field("label", &self.label)
            .field("edges", &self.edge_ids())
            .finish()
    }
}
