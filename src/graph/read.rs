//! Read API shared by the mutable graph and its snapshots
//!
//! Query code written against [`GraphRead`] runs unchanged on a live
//! [`GraphStore`](super::GraphStore) or a frozen
//! [`ReadOnlyGraph`](crate::snapshot::ReadOnlyGraph).

use super::element::Element;
use super::schema::GraphSchema;
use super::store::{GraphError, GraphResult};
use std::ops::Deref;

/// Predicate over an element, used by every filtered scan
pub type Filter<'a, T> = &'a dyn Fn(&T) -> bool;

/// Lookup, filtered iteration and counting over the three element kinds
pub trait GraphRead<S: GraphSchema> {
    type Vertex: Element<S, Id = S::VertexId>;
    type Edge: Element<S, Id = S::EdgeId>;
    type HyperEdge: Element<S, Id = S::HyperEdgeId>;

    type VertexRef<'a>: Deref<Target = Self::Vertex> + Clone
    where
        Self: 'a;
    type EdgeRef<'a>: Deref<Target = Self::Edge> + Clone
    where
        Self: 'a;
    type HyperEdgeRef<'a>: Deref<Target = Self::HyperEdge> + Clone
    where
        Self: 'a;

    fn vertex(&self, id: &S::VertexId) -> Option<Self::VertexRef<'_>>;

    /// One slot per requested id, `None` where the id is unknown
    fn vertices_by_id(&self, ids: &[S::VertexId]) -> GraphResult<Vec<Option<Self::VertexRef<'_>>>> {
        if ids.is_empty() {
            return Err(GraphError::InvalidArgument("no vertex ids given".to_string()));
        }
        Ok(ids.iter().map(|id| self.vertex(id)).collect())
    }

    fn vertices<'a>(
        &'a self,
        filter: Option<Filter<'a, Self::Vertex>>,
    ) -> Box<dyn Iterator<Item = Self::VertexRef<'a>> + 'a>;

    fn number_of_vertices(&self, filter: Option<Filter<'_, Self::Vertex>>) -> usize {
        self.vertices(filter).count()
    }

    fn edge(&self, id: &S::EdgeId) -> Option<Self::EdgeRef<'_>>;

    fn edges_by_id(&self, ids: &[S::EdgeId]) -> GraphResult<Vec<Option<Self::EdgeRef<'_>>>> {
        if ids.is_empty() {
            return Err(GraphError::InvalidArgument("no edge ids given".to_string()));
        }
        Ok(ids.iter().map(|id| self.edge(id)).collect())
    }

    fn edges<'a>(
        &'a self,
        filter: Option<Filter<'a, Self::Edge>>,
    ) -> Box<dyn Iterator<Item = Self::EdgeRef<'a>> + 'a>;

    fn number_of_edges(&self, filter: Option<Filter<'_, Self::Edge>>) -> usize {
        self.edges(filter).count()
    }

    fn hyperedge(&self, id: &S::HyperEdgeId) -> Option<Self::HyperEdgeRef<'_>>;

    fn hyperedges_by_id(
        &self,
        ids: &[S::HyperEdgeId],
    ) -> GraphResult<Vec<Option<Self::HyperEdgeRef<'_>>>> {
        if ids.is_empty() {
            return Err(GraphError::InvalidArgument("no hyperedge ids given".to_string()));
        }
        Ok(ids.iter().map(|id| self.hyperedge(id)).collect())
    }

    fn hyperedges<'a>(
        &'a self,
        filter: Option<Filter<'a, Self::HyperEdge>>,
    ) -> Box<dyn Iterator<Item = Self::HyperEdgeRef<'a>> + 'a>;

    fn number_of_hyperedges(&self, filter: Option<Filter<'_, Self::HyperEdge>>) -> usize {
        self.hyperedges(filter).count()
    }
}
