//! Manager for property indices
//!
//! Every element kind has an [`IndexRegistry`] holding named indices of two
//! flavours. Manual indices are filled by the caller. Automatic indices are
//! bound to a property key and follow property writes through the element
//! change notifications.

use super::property_index::{IndexKey, PropertyIndex};
use crate::graph::event::{PropertyEvent, PropertyListener, SubscriptionId};
use crate::graph::property::{PropertyData, PropertyStore};
use crate::graph::schema::GraphSchema;
use crate::graph::store::{GraphError, GraphResult};
use crate::graph::types::{ElementKind, Identifier};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::ops::RangeBounds;
use std::sync::{Arc, Weak};
use tracing::{debug, info};

/// How an index is maintained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexMode {
    /// Caller inserts and removes entries
    Manual,
    /// Follows writes to one property key
    Automatic,
}

/// Description of one index, as returned by [`IndexRegistry::indices`]
#[derive(Debug, Clone, PartialEq)]
pub struct IndexInfo<K> {
    pub name: String,
    pub kind: ElementKind,
    pub mode: IndexMode,
    /// Indexed property key, automatic indices only
    pub property: Option<K>,
    /// Number of (value, element) pairs
    pub entries: usize,
}

#[derive(Debug, Clone)]
struct AutomaticIndex<K, I: Identifier> {
    property: K,
    index: PropertyIndex<I>,
}

#[derive(Debug, Clone)]
struct Indices<K, I: Identifier> {
    manual: BTreeMap<String, PropertyIndex<I>>,
    automatic: BTreeMap<String, AutomaticIndex<K, I>>,
}

impl<K, I: Identifier> Indices<K, I> {
    fn contains(&self, name: &str) -> bool {
        self.manual.contains_key(name) || self.automatic.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<&PropertyIndex<I>> {
        self.manual
            .get(name)
            .or_else(|| self.automatic.get(name).map(|a| &a.index))
    }
}

/// Named indices over the elements of one kind
pub struct IndexRegistry<S: GraphSchema, I: Identifier> {
    kind: ElementKind,
    frozen: bool,
    indices: RwLock<Indices<S::Key, I>>,
    subscriptions: Mutex<HashMap<I, SubscriptionId>>,
}

impl<S: GraphSchema, I: Identifier> IndexRegistry<S, I> {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            frozen: false,
            indices: RwLock::new(Indices {
                manual: BTreeMap::new(),
                automatic: BTreeMap::new(),
            }),
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Frozen registries belong to snapshots and reject every mutation
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    fn ensure_mutable(&self) -> GraphResult<()> {
        if self.frozen {
            return Err(GraphError::ReadOnly(format!("{} index registry", self.kind)));
        }
        Ok(())
    }

    fn index_key(value: &S::Value) -> GraphResult<IndexKey> {
        value
            .index_key()
            .ok_or_else(|| GraphError::InvalidArgument(format!("value {:?} cannot be indexed", value)))
    }

    /// Create an empty manual index
    pub fn create_manual(&self, name: &str) -> GraphResult<()> {
        self.ensure_mutable()?;
        let mut indices = self.indices.write();
        if indices.contains(name) {
            return Err(GraphError::IndexAlreadyExists(name.to_string()));
        }
        indices.manual.insert(name.to_string(), PropertyIndex::new());
        info!("Created manual {} index '{}'", self.kind, name);
        Ok(())
    }

    /// Create an automatic index over `property`.
    ///
    /// `backfill` runs while the registry is locked and yields the current
    /// value of `property` for every existing element. Property events raised
    /// meanwhile wait for the lock and are applied afterwards.
    pub fn create_automatic<F>(&self, name: &str, property: S::Key, backfill: F) -> GraphResult<()>
    where
        F: FnOnce() -> Vec<(I, S::Value)>,
    {
        self.ensure_mutable()?;
        let mut indices = self.indices.write();
        if indices.contains(name) {
            return Err(GraphError::IndexAlreadyExists(name.to_string()));
        }

        let mut index = PropertyIndex::new();
        for (id, value) in backfill() {
            if let Some(key) = value.index_key() {
                index.insert(key, id);
            }
        }
        info!(
            "Created automatic {} index '{}' on {:?} with {} entries",
            self.kind,
            name,
            property,
            index.len()
        );
        indices
            .automatic
            .insert(name.to_string(), AutomaticIndex { property, index });
        Ok(())
    }

    pub fn drop_index(&self, name: &str) -> GraphResult<()> {
        self.ensure_mutable()?;
        let mut indices = self.indices.write();
        let dropped = indices.manual.remove(name).is_some() || indices.automatic.remove(name).is_some();
        if !dropped {
            return Err(GraphError::IndexNotFound(name.to_string()));
        }
        info!("Dropped {} index '{}'", self.kind, name);
        Ok(())
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.indices.read().contains(name)
    }

    /// Add `id` under `value` to a manual index
    pub fn insert(&self, name: &str, value: &S::Value, id: I) -> GraphResult<bool> {
        self.ensure_mutable()?;
        let key = Self::index_key(value)?;
        let mut indices = self.indices.write();
        if indices.automatic.contains_key(name) {
            return Err(GraphError::InvalidArgument(format!(
                "index '{}' is automatic and cannot be written to",
                name
            )));
        }
        let index = indices
            .manual
            .get_mut(name)
            .ok_or_else(|| GraphError::IndexNotFound(name.to_string()))?;
        Ok(index.insert(key, id))
    }

    /// Remove `id` under `value` from a manual index
    pub fn remove(&self, name: &str, value: &S::Value, id: &I) -> GraphResult<bool> {
        self.ensure_mutable()?;
        let key = Self::index_key(value)?;
        let mut indices = self.indices.write();
        if indices.automatic.contains_key(name) {
            return Err(GraphError::InvalidArgument(format!(
                "index '{}' is automatic and cannot be written to",
                name
            )));
        }
        let index = indices
            .manual
            .get_mut(name)
            .ok_or_else(|| GraphError::IndexNotFound(name.to_string()))?;
        Ok(index.remove(&key, id))
    }

    /// Ids stored under `value`. Values with no index form match nothing.
    pub fn lookup(&self, name: &str, value: &S::Value) -> GraphResult<Vec<I>> {
        let indices = self.indices.read();
        let index = indices
            .get(name)
            .ok_or_else(|| GraphError::IndexNotFound(name.to_string()))?;
        Ok(value.index_key().map(|key| index.get(&key)).unwrap_or_default())
    }

    /// Ids for every key within `range`
    pub fn range<R>(&self, name: &str, range: R) -> GraphResult<Vec<I>>
    where
        R: RangeBounds<IndexKey>,
    {
        let indices = self.indices.read();
        let index = indices
            .get(name)
            .ok_or_else(|| GraphError::IndexNotFound(name.to_string()))?;
        Ok(index.range(range))
    }

    /// Enumerate the indices, optionally narrowed by a predicate
    pub fn indices(&self, filter: Option<&dyn Fn(&IndexInfo<S::Key>) -> bool>) -> Vec<IndexInfo<S::Key>> {
        let indices = self.indices.read();
        let manual = indices.manual.iter().map(|(name, index)| IndexInfo {
            name: name.clone(),
            kind: self.kind,
            mode: IndexMode::Manual,
            property: None,
            entries: index.len(),
        });
        let automatic = indices.automatic.iter().map(|(name, automatic)| IndexInfo {
            name: name.clone(),
            kind: self.kind,
            mode: IndexMode::Automatic,
            property: Some(automatic.property.clone()),
            entries: automatic.index.len(),
        });
        manual
            .chain(automatic)
            .filter(|info| filter.map_or(true, |f| f(info)))
            .collect()
    }

    /// Start following the property writes of an element.
    ///
    /// The element's current values are indexed straight away.
    pub(crate) fn attach(self: &Arc<Self>, id: I, store: &PropertyStore<S::Key, S::Value>) {
        if self.frozen {
            return;
        }

        let mut indices = self.indices.write();

        let registry: Weak<Self> = Arc::downgrade(self);
        let element = id.clone();
        let listener: PropertyListener<S::Key, S::Value> =
            Arc::new(move |event: &PropertyEvent<'_, S::Key, S::Value>| {
                if let Some(registry) = registry.upgrade() {
                    registry.apply(&element, event);
                }
            });
        let subscription = store.subscribe(listener);
        let previous = self.subscriptions.lock().insert(id.clone(), subscription);
        if let Some(previous) = previous {
            store.unsubscribe(previous);
        }

        for automatic in indices.automatic.values_mut() {
            let value = crate::graph::property::PropertyAccess::get_property(store, &automatic.property);
            if let Some(key) = value.and_then(|v| v.index_key()) {
                automatic.index.insert(key, id.clone());
            }
        }
    }

    /// Stop following an element and purge it from the automatic indices
    pub(crate) fn detach(&self, id: &I, store: &PropertyStore<S::Key, S::Value>) {
        if self.frozen {
            return;
        }
        let subscription = self.subscriptions.lock().remove(id);
        if let Some(subscription) = subscription {
            store.unsubscribe(subscription);
        }
        let mut indices = self.indices.write();
        let purged: usize = indices
            .automatic
            .values_mut()
            .map(|automatic| automatic.index.remove_id(id))
            .sum();
        if purged > 0 {
            debug!("Purged {} {} from {} automatic index entries", self.kind, id, purged);
        }
    }

    /// Empty every index, keeping the definitions
    pub(crate) fn reset(&self) {
        self.subscriptions.lock().clear();
        let mut indices = self.indices.write();
        for index in indices.manual.values_mut() {
            index.clear();
        }
        for automatic in indices.automatic.values_mut() {
            automatic.index.clear();
        }
    }

    fn apply(&self, id: &I, event: &PropertyEvent<'_, S::Key, S::Value>) {
        if event.is_pre_change() {
            return;
        }
        let mut indices = self.indices.write();
        for automatic in indices.automatic.values_mut() {
            if &automatic.property != event.key() {
                continue;
            }
            match event {
                PropertyEvent::Changed { old, new, .. } => {
                    if let Some(key) = old.index_key() {
                        automatic.index.remove(&key, id);
                    }
                    if let Some(key) = new.index_key() {
                        automatic.index.insert(key, id.clone());
                    }
                }
                PropertyEvent::Added { value, .. } => {
                    if let Some(key) = value.index_key() {
                        automatic.index.insert(key, id.clone());
                    }
                }
                PropertyEvent::Removed { value, .. } => {
                    if let Some(key) = value.index_key() {
                        automatic.index.remove(&key, id);
                    }
                }
                PropertyEvent::Changing { .. } => {}
            }
        }
    }

    /// Read-only copy of the current index contents
    pub fn frozen_copy(&self) -> Self {
        Self {
            kind: self.kind,
            frozen: true,
            indices: RwLock::new(self.indices.read().clone()),
            subscriptions: Mutex::new(HashMap::new()),
        }
    }
}

impl<S: GraphSchema, I: Identifier> fmt::Debug for IndexRegistry<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indices = self.indices.read();
        f.debug_struct("IndexRegistry")
            .field("kind", &self.kind)
            .field("frozen", &self.frozen)
            .field("manual", &indices.manual.keys().collect::<Vec<_>>())
            .field("automatic", &indices.automatic.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Index registries for every element kind of a graph
pub struct IndexManager<S: GraphSchema> {
    vertices: Arc<IndexRegistry<S, S::VertexId>>,
    edges: Arc<IndexRegistry<S, S::EdgeId>>,
    hyperedges: Arc<IndexRegistry<S, S::HyperEdgeId>>,
}

impl<S: GraphSchema> IndexManager<S> {
    pub fn new() -> Self {
        Self {
            vertices: Arc::new(IndexRegistry::new(ElementKind::Vertex)),
            edges: Arc::new(IndexRegistry::new(ElementKind::Edge)),
            hyperedges: Arc::new(IndexRegistry::new(ElementKind::HyperEdge)),
        }
    }

    pub fn vertices(&self) -> &Arc<IndexRegistry<S, S::VertexId>> {
        &self.vertices
    }

    pub fn edges(&self) -> &Arc<IndexRegistry<S, S::EdgeId>> {
        &self.edges
    }

    pub fn hyperedges(&self) -> &Arc<IndexRegistry<S, S::HyperEdgeId>> {
        &self.hyperedges
    }

    pub(crate) fn reset(&self) {
        self.vertices.reset();
        self.edges.reset();
        self.hyperedges.reset();
    }

    pub fn frozen_copy(&self) -> Self {
        Self {
            vertices: Arc::new(self.vertices.frozen_copy()),
            edges: Arc::new(self.edges.frozen_copy()),
            hyperedges: Arc::new(self.hyperedges.frozen_copy()),
        }
    }
}

impl<S: GraphSchema> Default for IndexManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GraphSchema> fmt::Debug for IndexManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexManager")
            .field("vertices", &self.vertices)
            .field("edges", &self.edges)
            .field("hyperedges", &self.hyperedges)
            .finish()
    }
}
