//! Read-only graph elements
//!
//! Each snapshot element owns a frozen copy of its source's properties.
//! Cross references (edge endpoints, vertex adjacency, hyperedge members)
//! are slots into the snapshot's tables, not pointers.

use super::graph::SlotResolver;
use crate::graph::element::{delegate_identity, delegate_property_access};
use crate::graph::property::collect_properties;
use crate::graph::{
    Direction, Edge, Element, ElementKind, GraphError, GraphResult, GraphSchema, HyperEdge, Identifier,
    PropertyAccess, PropertyData, PropertyKey, PropertyMap, PropertyStore, Vertex,
};
use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

fn read_only<T>(operation: &str) -> GraphResult<T> {
    Err(GraphError::ReadOnly(operation.to_string()))
}

/// Immutable property map that still answers [`PropertyAccess`] reads
#[derive(Clone)]
pub struct FrozenProperties<K, V> {
    id_key: K,
    revision_id_key: K,
    entries: PropertyMap<K, V>,
}

impl<K: PropertyKey, V: PropertyData> FrozenProperties<K, V> {
    /// Freeze `entries`, writing the reserved id and revision entries over
    /// whatever they held
    pub fn new(id_key: K, id_value: V, revision_id_key: K, revision_id_value: V, mut entries: PropertyMap<K, V>) -> Self {
        entries.insert(id_key.clone(), id_value);
        entries.insert(revision_id_key.clone(), revision_id_value);
        FrozenProperties {
            id_key,
            revision_id_key,
            entries,
        }
    }

    /// Copy the current contents of a live store
    pub fn from_store(store: &PropertyStore<K, V>) -> Self {
        FrozenProperties {
            id_key: store.id_key().clone(),
            revision_id_key: store.revision_id_key().clone(),
            entries: store.to_map(),
        }
    }

    pub fn id_key(&self) -> &K {
        &self.id_key
    }

    pub fn revision_id_key(&self) -> &K {
        &self.revision_id_key
    }

    pub fn as_map(&self) -> &PropertyMap<K, V> {
        &self.entries
    }
}

impl<K: PropertyKey, V: PropertyData> PropertyAccess<K, V> for FrozenProperties<K, V> {
    fn get_property<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).cloned()
    }

    fn has_property<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    fn set_property(&self, key: impl Into<K>, _value: impl Into<V>) -> GraphResult<Option<V>> {
        read_only(&format!("set_property {:?}", key.into()))
    }

    fn remove_property<Q>(&self, key: &Q) -> GraphResult<Option<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        read_only(&format!("remove_property {:?}", key))
    }

    fn properties(&self, filter: Option<&dyn Fn(&K, &V) -> bool>) -> Vec<(K, V)> {
        collect_properties(self.entries.iter(), filter)
    }

    fn property_keys(&self) -> Vec<K> {
        self.entries.keys().cloned().collect()
    }

    fn property_count(&self) -> usize {
        self.entries.len()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for FrozenProperties<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Identity plus frozen properties of one snapshot element
pub struct ReadOnlyElement<S: GraphSchema, I: Identifier> {
    id: I,
    revision_id: S::RevisionId,
    properties: FrozenProperties<S::Key, S::Value>,
}

impl<S: GraphSchema, I: Identifier> ReadOnlyElement<S, I>
where
    S::Value: From<I>,
{
    pub fn new(id: I, revision_id: S::RevisionId, properties: PropertyMap<S::Key, S::Value>) -> Self {
        let properties = FrozenProperties::new(
            S::id_key(),
            <S::Value as From<I>>::from(id.clone()),
            S::revision_id_key(),
            <S::Value as From<S::RevisionId>>::from(revision_id.clone()),
            properties,
        );
        ReadOnlyElement {
            id,
            revision_id,
            properties,
        }
    }
}

impl<S: GraphSchema, I: Identifier> ReadOnlyElement<S, I> {
    /// Copy id, revision id and the current properties of a live element
    pub fn copy_of(id: &I, revision_id: &S::RevisionId, store: &PropertyStore<S::Key, S::Value>) -> Self {
        ReadOnlyElement {
            id: id.clone(),
            revision_id: revision_id.clone(),
            properties: FrozenProperties::from_store(store),
        }
    }

    pub fn id(&self) -> &I {
        &self.id
    }

    pub fn revision_id(&self) -> &S::RevisionId {
        &self.revision_id
    }

    pub fn properties(&self) -> &FrozenProperties<S::Key, S::Value> {
        &self.properties
    }
}

impl<S: GraphSchema, I: Identifier> PartialEq for ReadOnlyElement<S, I> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<S: GraphSchema, I: Identifier> Eq for ReadOnlyElement<S, I> {}

impl<S: GraphSchema, I: Identifier> std::hash::Hash for ReadOnlyElement<S, I> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<S: GraphSchema, I: Identifier> fmt::Debug for ReadOnlyElement<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyElement")
            .field("id", &self.id)
            .field("revision_id", &self.revision_id)
            .field("properties", &self.properties)
            .finish()
    }
}

/// Snapshot vertex. Adjacency holds edge slots of the owning snapshot.
pub struct ReadOnlyVertex<S: GraphSchema> {
    element: ReadOnlyElement<S, S::VertexId>,
    pub(crate) out_edges: Vec<usize>,
    pub(crate) in_edges: Vec<usize>,
}

impl<S: GraphSchema> ReadOnlyVertex<S> {
    /// Vertex with the given identity and properties and no adjacency yet
    pub fn new(id: S::VertexId, revision_id: S::RevisionId, properties: PropertyMap<S::Key, S::Value>) -> Self {
        ReadOnlyVertex {
            element: ReadOnlyElement::new(id, revision_id, properties),
            out_edges: Vec::new(),
            in_edges: Vec::new(),
        }
    }

    /// Default vertex creator: copies identity and properties
    pub fn from_source(vertex: &Vertex<S>) -> GraphResult<Self> {
        Ok(ReadOnlyVertex {
            element: ReadOnlyElement::copy_of(vertex.id(), vertex.revision_id(), vertex.property_store()),
            out_edges: Vec::with_capacity(vertex.out_degree(&[])),
            in_edges: Vec::with_capacity(vertex.in_degree(&[])),
        })
    }

    pub fn id(&self) -> &S::VertexId {
        self.element.id()
    }

    pub fn revision_id(&self) -> &S::RevisionId {
        self.element.revision_id()
    }

    /// Edge slots on the `direction` side
    pub fn edge_slots(&self, direction: Direction) -> &[usize] {
        match direction {
            Direction::Out => &self.out_edges,
            Direction::In => &self.in_edges,
        }
    }

    pub fn out_edge_slots(&self) -> &[usize] {
        &self.out_edges
    }

    pub fn in_edge_slots(&self) -> &[usize] {
        &self.in_edges
    }

    pub fn out_degree(&self) -> usize {
        self.out_edges.len()
    }

    pub fn in_degree(&self) -> usize {
        self.in_edges.len()
    }

    pub fn add_edge(&self, _direction: Direction, edge: &S::EdgeId) -> GraphResult<()> {
        read_only(&format!("add edge {} to vertex {}", edge, self.id()))
    }

    pub fn add_out_edge(&self, edge: &S::EdgeId) -> GraphResult<()> {
        self.add_edge(Direction::Out, edge)
    }

    pub fn add_in_edge(&self, edge: &S::EdgeId) -> GraphResult<()> {
        self.add_edge(Direction::In, edge)
    }

    pub fn remove_edges(&self, _direction: Direction, _edges: &[S::EdgeId]) -> GraphResult<usize> {
        read_only(&format!("remove edges of vertex {}", self.id()))
    }

    pub fn remove_out_edges(&self, edges: &[S::EdgeId]) -> GraphResult<usize> {
        self.remove_edges(Direction::Out, edges)
    }

    pub fn remove_in_edges(&self, edges: &[S::EdgeId]) -> GraphResult<usize> {
        self.remove_edges(Direction::In, edges)
    }
}

impl<S: GraphSchema> Element<S> for ReadOnlyVertex<S> {
    type Id = S::VertexId;

    const KIND: ElementKind = ElementKind::Vertex;

    fn id(&self) -> &S::VertexId {
        self.element.id()
    }

    fn revision_id(&self) -> &S::RevisionId {
        self.element.revision_id()
    }
}

delegate_property_access!(ReadOnlyVertex, element);

delegate_identity!(ReadOnlyVertex, element);

impl<S: GraphSchema> fmt::Debug for ReadOnlyVertex<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyVertex")
            .field("id", self.id())
            .field("out_edges", &self.out_edges)
            .field("in_edges", &self.in_edges)
            .finish()
    }
}

/// Snapshot edge with its endpoints resolved to vertex slots
pub struct ReadOnlyEdge<S: GraphSchema> {
    element: ReadOnlyElement<S, S::EdgeId>,
    label: S::Label,
    out_vertex_id: S::VertexId,
    in_vertex_id: S::VertexId,
    out_vertex: usize,
    in_vertex: usize,
}

impl<S: GraphSchema> ReadOnlyEdge<S> {
    /// Build an edge whose endpoints are looked up in the snapshot under
    /// construction
    pub fn new(
        id: S::EdgeId,
        revision_id: S::RevisionId,
        out_vertex_id: S::VertexId,
        in_vertex_id: S::VertexId,
        label: S::Label,
        properties: PropertyMap<S::Key, S::Value>,
        resolver: &SlotResolver<'_, S>,
    ) -> GraphResult<Self> {
        Ok(ReadOnlyEdge {
            out_vertex: resolver.vertex_slot(&out_vertex_id)?,
            in_vertex: resolver.vertex_slot(&in_vertex_id)?,
            element: ReadOnlyElement::new(id, revision_id, properties),
            label,
            out_vertex_id,
            in_vertex_id,
        })
    }

    /// Default edge creator: copies identity, label and properties
    pub fn from_source(edge: &Edge<S>, resolver: &SlotResolver<'_, S>) -> GraphResult<Self> {
        Ok(ReadOnlyEdge {
            out_vertex: resolver.vertex_slot(edge.out_vertex_id())?,
            in_vertex: resolver.vertex_slot(edge.in_vertex_id())?,
            element: ReadOnlyElement::copy_of(edge.id(), edge.revision_id(), edge.property_store()),
            label: edge.label().clone(),
            out_vertex_id: edge.out_vertex_id().clone(),
            in_vertex_id: edge.in_vertex_id().clone(),
        })
    }

    pub fn id(&self) -> &S::EdgeId {
        self.element.id()
    }

    pub fn revision_id(&self) -> &S::RevisionId {
        self.element.revision_id()
    }

    pub fn label(&self) -> &S::Label {
        &self.label
    }

    pub fn has_label(&self, labels: &[S::Label]) -> bool {
        labels.is_empty() || labels.contains(&self.label)
    }

    pub fn out_vertex_id(&self) -> &S::VertexId {
        &self.out_vertex_id
    }

    pub fn in_vertex_id(&self) -> &S::VertexId {
        &self.in_vertex_id
    }

    pub fn out_vertex_slot(&self) -> usize {
        self.out_vertex
    }

    pub fn in_vertex_slot(&self) -> usize {
        self.in_vertex
    }

    /// Endpoint slot on the `direction` side
    pub fn vertex_slot(&self, direction: Direction) -> usize {
        match direction {
            Direction::Out => self.out_vertex,
            Direction::In => self.in_vertex,
        }
    }

    pub fn is_self_loop(&self) -> bool {
        self.out_vertex_id == self.in_vertex_id
    }
}

impl<S: GraphSchema> Element<S> for ReadOnlyEdge<S> {
    type Id = S::EdgeId;

    const KIND: ElementKind = ElementKind::Edge;

    fn id(&self) -> &S::EdgeId {
        self.element.id()
    }

    fn revision_id(&self) -> &S::RevisionId {
        self.element.revision_id()
    }
}

delegate_property_access!(ReadOnlyEdge, element);

delegate_identity!(ReadOnlyEdge, element);

impl<S: GraphSchema> fmt::Debug for ReadOnlyEdge<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyEdge")
            .field("id", self.id())
            .field("label", &self.label)
            .field("out_vertex", &self.out_vertex_id)
            .field("in_vertex", &self.in_vertex_id)
            .finish()
    }
}

/// Snapshot hyperedge with its members resolved to edge slots
pub struct ReadOnlyHyperEdge<S: GraphSchema> {
    element: ReadOnlyElement<S, S::HyperEdgeId>,
    label: S::Label,
    edges: Vec<usize>,
    edge_ids: Vec<S::EdgeId>,
}

impl<S: GraphSchema> ReadOnlyHyperEdge<S> {
    pub fn new(
        id: S::HyperEdgeId,
        revision_id: S::RevisionId,
        edge_ids: Vec<S::EdgeId>,
        label: S::Label,
        properties: PropertyMap<S::Key, S::Value>,
        resolver: &SlotResolver<'_, S>,
    ) -> GraphResult<Self> {
        let edges = edge_ids
            .iter()
            .map(|edge| resolver.edge_slot(edge))
            .collect::<GraphResult<Vec<_>>>()?;
        Ok(ReadOnlyHyperEdge {
            element: ReadOnlyElement::new(id, revision_id, properties),
            label,
            edges,
            edge_ids,
        })
    }

    /// Default hyperedge creator: copies identity, label, properties and
    /// member edges
    pub fn from_source(hyperedge: &HyperEdge<S>, resolver: &SlotResolver<'_, S>) -> GraphResult<Self> {
        let edge_ids = hyperedge.edge_ids();
        let edges = edge_ids
            .iter()
            .map(|edge| resolver.edge_slot(edge))
            .collect::<GraphResult<Vec<_>>>()?;
        Ok(ReadOnlyHyperEdge {
            element: ReadOnlyElement::copy_of(hyperedge.id(), hyperedge.revision_id(), hyperedge.property_store()),
            label: hyperedge.label().clone(),
            edges,
            edge_ids,
        })
    }

    pub fn id(&self) -> &S::HyperEdgeId {
        self.element.id()
    }

    pub fn revision_id(&self) -> &S::RevisionId {
        self.element.revision_id()
    }

    pub fn label(&self) -> &S::Label {
        &self.label
    }

    pub fn edge_ids(&self) -> &[S::EdgeId] {
        &self.edge_ids
    }

    pub fn edge_slots(&self) -> &[usize] {
        &self.edges
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn contains_edge(&self, edge_id: &S::EdgeId) -> bool {
        self.edge_ids.contains(edge_id)
    }
}

impl<S: GraphSchema> Element<S> for ReadOnlyHyperEdge<S> {
    type Id = S::HyperEdgeId;

    const KIND: ElementKind = ElementKind::HyperEdge;

    fn id(&self) -> &S::HyperEdgeId {
        self.element.id()
    }

    fn revision_id(&self) -> &S::RevisionId {
        self.element.revision_id()
    }
}

delegate_property_access!(ReadOnlyHyperEdge, element);

delegate_identity!(ReadOnlyHyperEdge, element);

impl<S: GraphSchema> fmt::Debug for ReadOnlyHyperEdge<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyHyperEdge")
            .field("id", self.id())
            .field("label", &self.label)
            .field("edges", &self.edge_ids)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DefaultSchema, GraphSettings, PropertyValue, VertexId};

    #[test]
    fn test_frozen_properties_reject_writes() {
        let mut entries = PropertyMap::new();
        entries.insert("name".to_string(), PropertyValue::from("Alice"));
        entries.insert("Id".to_string(), PropertyValue::from(99i64));
        let frozen = FrozenProperties::new(
            "Id".to_string(),
            PropertyValue::Integer(1),
            "RevisionId".to_string(),
            PropertyValue::Integer(2),
            entries,
        );

        // The reserved entries win over caller-provided ones
        assert_eq!(frozen.get_property("Id"), Some(PropertyValue::Integer(1)));
        assert_eq!(frozen.get_property("name"), Some(PropertyValue::from("Alice")));
        assert_eq!(frozen.property_count(), 3);

        assert!(matches!(frozen.set_property("name", "Bob"), Err(GraphError::ReadOnly(_))));
        assert!(matches!(frozen.remove_property("name"), Err(GraphError::ReadOnly(_))));
        assert_eq!(frozen.get_property("name"), Some(PropertyValue::from("Alice")));
    }

    #[test]
    fn test_vertex_copy_is_detached_from_source() {
        let source: Vertex<DefaultSchema> = Vertex::new(VertexId::new(4), 1, &GraphSettings::default());
        source.set_property("name", "Alice").unwrap();

        let copy = ReadOnlyVertex::from_source(&source).unwrap();
        source.set_property("name", "Bob").unwrap();

        assert_eq!(copy.id(), &VertexId::new(4));
        assert_eq!(copy.get_property("name"), Some(PropertyValue::from("Alice")));
        assert_eq!(copy.get_property("Id"), Some(PropertyValue::Integer(4)));
        assert_eq!(copy.out_degree(), 0);
    }

    #[test]
    fn test_vertex_mutators_fail() {
        let vertex: ReadOnlyVertex<DefaultSchema> = ReadOnlyVertex::new(VertexId::new(1), 1, PropertyMap::new());
        let edge = crate::graph::EdgeId::new(1);

        assert!(matches!(vertex.add_out_edge(&edge), Err(GraphError::ReadOnly(_))));
        assert!(matches!(vertex.add_in_edge(&edge), Err(GraphError::ReadOnly(_))));
        assert!(matches!(vertex.remove_out_edges(&[edge]), Err(GraphError::ReadOnly(_))));
        assert!(matches!(vertex.remove_in_edges(&[]), Err(GraphError::ReadOnly(_))));
        assert!(matches!(vertex.set_property("x", 1i64), Err(GraphError::ReadOnly(_))));
        assert_eq!(vertex.property_count(), 2);
    }
    #[test]
    fn test_copies_order_and_hash_by_id() {
        use std::collections::HashSet;

        let copy = |id: u64| ReadOnlyVertex::<DefaultSchema>::new(VertexId::new(id), 1, PropertyMap::new());
        let mut vertices = vec![copy(3), copy(1), copy(2)];
        vertices.sort();
        let ids: Vec<u64> = vertices.iter().map(|v| v.id().as_u64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        // Another revision of the same id is the same element
        let newer = ReadOnlyVertex::<DefaultSchema>::new(VertexId::new(2), 5, PropertyMap::new());
        let distinct: HashSet<_> = vertices.into_iter().chain(std::iter::once(newer)).collect();
        assert_eq!(distinct.len(), 3);
    }
}
