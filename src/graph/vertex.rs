//! Vertex implementation for property graph
//!
//! A vertex is a graph element plus two adjacency lists: the edges it is
//! the tail of (`out`) and the edges it is the head of (`in`). Vertices
//! hold their edges strongly while edges refer back to their endpoints
//! weakly, so a vertex and its edges never keep each other alive.

use super::config::GraphSettings;
use super::edge::Edge;
use super::element::{delegate_identity, delegate_property_access, Element, GraphElement};
use super::property::PropertyStore;
use super::schema::GraphSchema;
use super::types::ElementKind;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Direction of an adjacency list relative to its vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Edges leaving the vertex
    Out,
    /// Edges entering the vertex
    In,
}

impl Direction {
    pub fn reverse(self) -> Self {
        match self {
            Direction::Out => Direction::In,
            Direction::In => Direction::Out,
        }
    }
}

/// A vertex in the property graph
pub struct Vertex<S: GraphSchema> {
    element: GraphElement<S, S::VertexId>,
    out_edges: RwLock<Vec<Arc<Edge<S>>>>,
    in_edges: RwLock<Vec<Arc<Edge<S>>>>,
}

impl<S: GraphSchema> Vertex<S> {
    pub fn new(id: S::VertexId, revision_id: S::RevisionId, settings: &GraphSettings) -> Self {
        Vertex {
            element: GraphElement::new(id, revision_id, settings.property_capacity),
            out_edges: RwLock::new(Vec::with_capacity(settings.adjacency_capacity)),
            in_edges: RwLock::new(Vec::with_capacity(settings.adjacency_capacity)),
        }
    }

    pub fn id(&self) -> &S::VertexId {
        self.element.id()
    }

    pub fn revision_id(&self) -> &S::RevisionId {
        self.element.revision_id()
    }

    /// Backing store, e.g. to subscribe to property events
    pub fn property_store(&self) -> &PropertyStore<S::Key, S::Value> {
        self.element.properties()
    }

    fn adjacency(&self, direction: Direction) -> &RwLock<Vec<Arc<Edge<S>>>> {
        match direction {
            Direction::Out => &self.out_edges,
            Direction::In => &self.in_edges,
        }
    }

    /// Append an edge to one adjacency list. No duplicate check is made.
    pub fn add_edge(&self, direction: Direction, edge: Arc<Edge<S>>) {
        self.adjacency(direction).write().push(edge);
    }

    pub fn add_out_edge(&self, edge: Arc<Edge<S>>) {
        self.add_edge(Direction::Out, edge);
    }

    pub fn add_in_edge(&self, edge: Arc<Edge<S>>) {
        self.add_edge(Direction::In, edge);
    }

    /// Edges in `direction` whose label is one of `labels`; all edges when
    /// `labels` is empty
    pub fn edges(&self, direction: Direction, labels: &[S::Label]) -> Vec<Arc<Edge<S>>> {
        let adjacency = self.adjacency(direction).read();
        if labels.is_empty() {
            return adjacency.clone();
        }
        adjacency
            .iter()
            .filter(|edge| labels.contains(edge.label()))
            .cloned()
            .collect()
    }

    // Copy of one list; predicates run on it with no lock held so they may
    // read this vertex again.
    fn snapshot(&self, direction: Direction) -> Vec<Arc<Edge<S>>> {
        self.adjacency(direction).read().clone()
    }

    /// Edges in `direction` accepted by `predicate`
    pub fn edges_where<F>(&self, direction: Direction, predicate: F) -> Vec<Arc<Edge<S>>>
    where
        F: Fn(&Edge<S>) -> bool,
    {
        self.snapshot(direction)
            .into_iter()
            .filter(|edge| predicate(edge))
            .collect()
    }

    pub fn out_edges(&self, labels: &[S::Label]) -> Vec<Arc<Edge<S>>> {
        self.edges(Direction::Out, labels)
    }

    pub fn in_edges(&self, labels: &[S::Label]) -> Vec<Arc<Edge<S>>> {
        self.edges(Direction::In, labels)
    }

    pub fn out_edges_where<F>(&self, predicate: F) -> Vec<Arc<Edge<S>>>
    where
        F: Fn(&Edge<S>) -> bool,
    {
        self.edges_where(Direction::Out, predicate)
    }

    pub fn in_edges_where<F>(&self, predicate: F) -> Vec<Arc<Edge<S>>>
    where
        F: Fn(&Edge<S>) -> bool,
    {
        self.edges_where(Direction::In, predicate)
    }

    /// Vertices reached by following the matching edges in `direction`.
    ///
    /// Endpoints that have already been dropped are skipped.
    pub fn adjacent_vertices(&self, direction: Direction, labels: &[S::Label]) -> Vec<Arc<Vertex<S>>> {
        self.edges(direction, labels)
            .iter()
            .filter_map(|edge| edge.vertex(direction.reverse()))
            .collect()
    }

    /// Number of edges in `direction`, restricted to `labels` when given
    pub fn degree(&self, direction: Direction, labels: &[S::Label]) -> usize {
        let adjacency = self.adjacency(direction).read();
        if labels.is_empty() {
            return adjacency.len();
        }
        adjacency
            .iter()
            .filter(|edge| labels.contains(edge.label()))
            .count()
    }

    pub fn degree_where<F>(&self, direction: Direction, predicate: F) -> usize
    where
        F: Fn(&Edge<S>) -> bool,
    {
        self.snapshot(direction)
            .iter()
            .filter(|edge| predicate(edge))
            .count()
    }

    pub fn out_degree(&self, labels: &[S::Label]) -> usize {
        self.degree(Direction::Out, labels)
    }

    pub fn in_degree(&self, labels: &[S::Label]) -> usize {
        self.degree(Direction::In, labels)
    }

    pub fn out_degree_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Edge<S>) -> bool,
    {
        self.degree_where(Direction::Out, predicate)
    }

    pub fn in_degree_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Edge<S>) -> bool,
    {
        self.degree_where(Direction::In, predicate)
    }

    /// Remove the given edges from one adjacency list, or every edge when
    /// `edges` is empty. Returns the number of entries removed.
    ///
    /// This only edits this vertex. The edges stay registered in the graph
    /// and in the other endpoint's list.
    pub fn remove_edges(&self, direction: Direction, edges: &[Arc<Edge<S>>]) -> usize {
        let mut adjacency = self.adjacency(direction).write();
        let before = adjacency.len();
        if edges.is_empty() {
            adjacency.clear();
        } else {
            adjacency.retain(|edge| !edges.iter().any(|e| e.id() == edge.id()));
        }
        before - adjacency.len()
    }

    /// Remove the edges accepted by `predicate` from one adjacency list,
    /// returning the ones actually removed.
    ///
    /// The matching subset is computed first, without the list locked, and
    /// then removed under the write lock.
    pub fn remove_edges_where<F>(&self, direction: Direction, predicate: F) -> Vec<Arc<Edge<S>>>
    where
        F: Fn(&Edge<S>) -> bool,
    {
        let matching: HashSet<S::EdgeId> = self
            .snapshot(direction)
            .iter()
            .filter(|edge| predicate(edge))
            .map(|edge| edge.id().clone())
            .collect();
        if matching.is_empty() {
            return Vec::new();
        }

        let mut adjacency = self.adjacency(direction).write();
        let (removed, kept): (Vec<_>, Vec<_>) = adjacency
            .drain(..)
            .partition(|edge| matching.contains(edge.id()));
        *adjacency = kept;
        removed
    }

    pub fn remove_out_edges(&self, edges: &[Arc<Edge<S>>]) -> usize {
        self.remove_edges(Direction::Out, edges)
    }

    pub fn remove_in_edges(&self, edges: &[Arc<Edge<S>>]) -> usize {
        self.remove_edges(Direction::In, edges)
    }

    pub fn remove_out_edges_where<F>(&self, predicate: F) -> Vec<Arc<Edge<S>>>
    where
        F: Fn(&Edge<S>) -> bool,
    {
        self.remove_edges_where(Direction::Out, predicate)
    }

    pub fn remove_in_edges_where<F>(&self, predicate: F) -> Vec<Arc<Edge<S>>>
    where
        F: Fn(&Edge<S>) -> bool,
    {
        self.remove_edges_where(Direction::In, predicate)
    }

    /// Drop a single edge from one adjacency list by id
    pub(crate) fn detach(&self, direction: Direction, edge_id: &S::EdgeId) -> bool {
        let mut adjacency = self.adjacency(direction).write();
        let before = adjacency.len();
        adjacency.retain(|edge| edge.id() != edge_id);
        adjacency.len() != before
    }

    /// Empty both adjacency lists, returning every incident edge once.
    /// Self-loops appear in both lists and are reported a single time.
    pub(crate) fn take_incident_edges(&self) -> Vec<Arc<Edge<S>>> {
        let mut incident = std::mem::take(&mut *self.out_edges.write());
        let incoming = std::mem::take(&mut *self.in_edges.write());
        let outgoing: HashSet<S::EdgeId> = incident.iter().map(|edge| edge.id().clone()).collect();
        incident.extend(incoming.into_iter().filter(|edge| !outgoing.contains(edge.id())));
        incident
    }
}

impl<S: GraphSchema> Element<S> for Vertex<S> {
    type Id = S::VertexId;

    const KIND: ElementKind = ElementKind::Vertex;

    fn id(&self) -> &S::VertexId {
        self.element.id()
    }

    fn revision_id(&self) -> &S::RevisionId {
        self.element.revision_id()
    }
}

delegate_property_access!(Vertex, element);

delegate_identity!(Vertex, element);

impl<S: GraphSchema> fmt::Debug for Vertex<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vertex")
            .field("id", self.id())
            .field("revision_id", self.revision_id())
            .field("out_degree", &self.out_edges.read().len())
            .field("in_degree", &self.in_edges.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::property::{PropertyAccess, PropertyValue};
    use crate::graph::schema::DefaultSchema;
    use crate::graph::types::{EdgeId, Label, VertexId};

    type V = Vertex<DefaultSchema>;

    fn vertex(id: u64) -> Arc<V> {
        Arc::new(Vertex::new(VertexId::new(id), 1, &GraphSettings::default()))
    }

    fn connect(id: u64, from: &Arc<V>, to: &Arc<V>, label: &str) -> Arc<Edge<DefaultSchema>> {
        let edge = Arc::new(Edge::new(
            EdgeId::new(id),
            1,
            from,
            to,
            Label::new(label),
            &GraphSettings::default(),
        ));
        from.add_out_edge(edge.clone());
        to.add_in_edge(edge.clone());
        edge
    }

    #[test]
    fn test_create_vertex() {
        let v = vertex(1);
        assert_eq!(v.id(), &VertexId::new(1));
        assert_eq!(*v.revision_id(), 1);
        assert_eq!(v.out_degree(&[]), 0);
        assert_eq!(v.in_degree(&[]), 0);
    }

    #[test]
    fn test_vertex_properties() {
        let v = vertex(1);
        v.set_property("name", "Alice").unwrap();
        v.set_property("age", 30i64).unwrap();

        assert_eq!(v.get_property("name"), Some(PropertyValue::from("Alice")));
        assert!(v.has_property("age"));
        assert!(v.set_property("Id", 5i64).is_err());
        assert_eq!(v.id(), &VertexId::new(1));
    }

    #[test]
    fn test_label_filtering() {
        let a = vertex(1);
        let b = vertex(2);
        connect(1, &a, &b, "a");
        connect(2, &a, &b, "a");
        connect(3, &a, &b, "b");

        assert_eq!(a.out_edges(&[]).len(), 3);
        assert_eq!(a.out_edges(&[Label::new("a")]).len(), 2);
        assert_eq!(a.out_edges(&[Label::new("a"), Label::new("b")]).len(), 3);
        assert!(a.out_edges(&[Label::new("c")]).is_empty());
        assert_eq!(b.in_degree(&[Label::new("b")]), 1);
        assert_eq!(b.in_degree_where(|e| e.id().as_u64() > 1), 2);
    }

    #[test]
    fn test_adjacent_vertices() {
        let a = vertex(1);
        let b = vertex(2);
        let c = vertex(3);
        connect(1, &a, &b, "knows");
        connect(2, &a, &c, "likes");

        let knows: Vec<VertexId> = a
            .adjacent_vertices(Direction::Out, &[Label::new("knows")])
            .iter()
            .map(|v| *v.id())
            .collect();
        assert_eq!(knows, vec![VertexId::new(2)]);

        let sources = c.adjacent_vertices(Direction::In, &[]);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].id(), &VertexId::new(1));
    }

    #[test]
    fn test_remove_edges() {
        let a = vertex(1);
        let b = vertex(2);
        let e1 = connect(1, &a, &b, "a");
        connect(2, &a, &b, "a");
        connect(3, &a, &b, "b");

        assert_eq!(a.remove_out_edges(&[e1]), 1);
        assert_eq!(a.out_degree(&[]), 2);

        let removed = a.remove_out_edges_where(|e| e.label().as_str() == "b");
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id(), &EdgeId::new(3));
        assert_eq!(a.out_degree(&[]), 1);

        // Empty list clears everything
        assert_eq!(b.remove_in_edges(&[]), 3);
        assert_eq!(b.in_degree(&[]), 0);
    }

    #[test]
    fn test_take_incident_edges_reports_self_loop_once() {
        let a = vertex(1);
        let b = vertex(2);
        connect(1, &a, &a, "self");
        connect(2, &a, &b, "out");
        connect(3, &b, &a, "in");

        let incident = a.take_incident_edges();
        assert_eq!(incident.len(), 3);
        assert_eq!(a.out_degree(&[]), 0);
        assert_eq!(a.in_degree(&[]), 0);
    }

    #[test]
    fn test_predicates_may_read_the_same_vertex() {
        let a = vertex(1);
        let b = vertex(2);
        connect(1, &a, &b, "x");
        connect(2, &a, &b, "y");

        let (done, finished) = std::sync::mpsc::channel();
        let worker = a.clone();
        std::thread::spawn(move || {
            let busy = |e: &Edge<DefaultSchema>| {
                e.out_vertex().map_or(false, |v| v.out_degree(&[]) > 1) && e.label().as_str() == "x"
            };
            let seen = worker.out_edges_where(busy).len();
            let counted = worker.out_degree_where(busy);
            let removed = worker.remove_out_edges_where(busy);
            let _ = done.send((seen, counted, removed.len()));
        });

        let (seen, counted, removed) = finished
            .recv_timeout(std::time::Duration::from_secs(5))
            .expect("predicate reading its own vertex blocked");
        assert_eq!((seen, counted, removed), (1, 1, 1));
        assert_eq!(a.out_degree(&[]), 1);
        assert_eq!(a.out_edges(&[])[0].label().as_str(), "y");
    }

    #[test]
    fn test_vertices_order_by_id() {
        let mut vertices = vec![vertex(3), vertex(1), vertex(2)];
        vertices.sort();
        let ids: Vec<u64> = vertices.iter().map(|v| v.id().as_u64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let same = vertex(2);
        same.set_property("name", "other").unwrap();
        assert_eq!(*vertices[1], *same);
        assert!(vertices[0] < vertices[2]);
    }
}
