//! Property values and property stores for graph elements
//!
//! Every vertex, edge, hyperedge and graph owns a [`PropertyStore`]. The store
//! always carries two reserved entries, the element id and its revision id,
//! written once at construction and never replaced or removed.

use super::event::{PropertyEvent, PropertyListener, SubscriptionId};
use super::store::{GraphError, GraphResult};
use super::types::{EdgeId, HyperEdgeId, PropertyKey, VertexId};
use crate::index::IndexKey;
use parking_lot::{ReentrantMutex, RwLock};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

/// Bound for property values
pub trait PropertyData: Clone + fmt::Debug + Send + Sync + 'static {
    /// Absent values are stored but skipped by property enumeration
    fn is_absent(&self) -> bool {
        false
    }

    /// Key under which this value is placed in a secondary index
    fn index_key(&self) -> Option<IndexKey> {
        None
    }
}

/// Property value type supporting multiple data types
///
/// Supports:
/// - String
/// - Integer (i64)
/// - Float (f64)
/// - Boolean
/// - DateTime (as i64 timestamp)
/// - Array (Vec<PropertyValue>)
/// - Map (HashMap<String, PropertyValue>)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    DateTime(i64), // Unix timestamp in milliseconds
    Array(Vec<PropertyValue>),
    Map(HashMap<String, PropertyValue>),
    Null,
}

impl PropertyValue {
    /// Check if value is null
    pub fn is_null(&self) -> bool {
        matches!(self, PropertyValue::Null)
    }

    /// Get string value if this is a string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get integer value if this is an integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get float value if this is a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get boolean value if this is a boolean
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            PropertyValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<i64> {
        match self {
            PropertyValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<PropertyValue>> {
        match self {
            PropertyValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, PropertyValue>> {
        match self {
            PropertyValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Get type name as string
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "String",
            PropertyValue::Integer(_) => "Integer",
            PropertyValue::Float(_) => "Float",
            PropertyValue::Boolean(_) => "Boolean",
            PropertyValue::DateTime(_) => "DateTime",
            PropertyValue::Array(_) => "Array",
            PropertyValue::Map(_) => "Map",
            PropertyValue::Null => "Null",
        }
    }
}

impl PropertyData for PropertyValue {
    fn is_absent(&self) -> bool {
        self.is_null()
    }

    fn index_key(&self) -> Option<IndexKey> {
        match self {
            PropertyValue::String(s) => Some(IndexKey::String(s.clone())),
            PropertyValue::Integer(i) => Some(IndexKey::Integer(*i)),
            PropertyValue::Float(f) => Some(IndexKey::Float(*f)),
            PropertyValue::Boolean(b) => Some(IndexKey::Boolean(*b)),
            PropertyValue::DateTime(dt) => Some(IndexKey::DateTime(*dt)),
            PropertyValue::Array(_) | PropertyValue::Map(_) | PropertyValue::Null => None,
        }
    }
}

impl PropertyData for String {
    fn index_key(&self) -> Option<IndexKey> {
        Some(IndexKey::String(self.clone()))
    }
}

impl PropertyData for i64 {
    fn index_key(&self) -> Option<IndexKey> {
        Some(IndexKey::Integer(*self))
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "\"{}\"", s),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Float(fl) => write!(f, "{}", fl),
            PropertyValue::Boolean(b) => write!(f, "{}", b),
            PropertyValue::DateTime(dt) => write!(f, "DateTime({})", dt),
            PropertyValue::Array(arr) => {
                write!(f, "[")?;
                for (i, val) in arr.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, "]")
            }
            PropertyValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, val)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, val)?;
                }
                write!(f, "}}")
            }
            PropertyValue::Null => write!(f, "null"),
        }
    }
}

// Convenience conversions
impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Integer(i)
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Integer(i64::from(i))
    }
}

// Values above i64::MAX are kept as their decimal string. Graphs reject such
// ids on creation, so reserved `Id` entries are always integers.
impl From<u64> for PropertyValue {
    fn from(i: u64) -> Self {
        i64::try_from(i).map_or_else(|_| PropertyValue::String(i.to_string()), PropertyValue::Integer)
    }
}

impl From<f64> for PropertyValue {
    fn from(f: f64) -> Self {
        PropertyValue::Float(f)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Boolean(b)
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(arr: Vec<PropertyValue>) -> Self {
        PropertyValue::Array(arr)
    }
}

impl From<HashMap<String, PropertyValue>> for PropertyValue {
    fn from(map: HashMap<String, PropertyValue>) -> Self {
        PropertyValue::Map(map)
    }
}

impl From<VertexId> for PropertyValue {
    fn from(id: VertexId) -> Self {
        PropertyValue::from(id.as_u64())
    }
}

impl From<EdgeId> for PropertyValue {
    fn from(id: EdgeId) -> Self {
        PropertyValue::from(id.as_u64())
    }
}

impl From<HyperEdgeId> for PropertyValue {
    fn from(id: HyperEdgeId) -> Self {
        PropertyValue::from(id.as_u64())
    }
}

/// Plain property map, used for frozen copies of a store
pub type PropertyMap<K = String, V = PropertyValue> = HashMap<K, V>;

/// Uniform property access over stores, elements and graphs.
///
/// Read-only implementations reject `set_property` and `remove_property`
/// with [`GraphError::ReadOnly`].
pub trait PropertyAccess<K: PropertyKey, V: PropertyData> {
    /// Value stored under `key`, `None` when missing
    fn get_property<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    fn has_property<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized;

    /// Insert or overwrite a property, returning the previous value
    fn set_property(&self, key: impl Into<K>, value: impl Into<V>) -> GraphResult<Option<V>>;

    /// Remove a property, returning the previous value
    fn remove_property<Q>(&self, key: &Q) -> GraphResult<Option<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized;

    /// All present properties, optionally narrowed by a predicate
    fn properties(&self, filter: Option<&dyn Fn(&K, &V) -> bool>) -> Vec<(K, V)>;

    fn property_keys(&self) -> Vec<K>;

    fn property_count(&self) -> usize;
}

/// Shared filtering rule for every property enumeration
pub(crate) fn collect_properties<'a, K, V>(
    entries: impl Iterator<Item = (&'a K, &'a V)>,
    filter: Option<&dyn Fn(&K, &V) -> bool>,
) -> Vec<(K, V)>
where
    K: PropertyKey,
    V: PropertyData,
{
    entries
        .filter(|(_, value)| !value.is_absent())
        .filter(|(key, value)| filter.map_or(true, |f| f(key, value)))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Thread-safe key/value store backing one graph element
///
/// Writes are serialized together with their notifications, so listeners
/// observe events in the order the entries changed. The write lock is
/// reentrant: a listener may write back to the same store.
pub struct PropertyStore<K, V> {
    id_key: K,
    revision_id_key: K,
    entries: RwLock<PropertyMap<K, V>>,
    writes: ReentrantMutex<()>,
    listeners: RwLock<Vec<(SubscriptionId, PropertyListener<K, V>)>>,
    next_subscription: AtomicU64,
}

impl<K: PropertyKey, V: PropertyData> PropertyStore<K, V> {
    /// Create a store pre-populated with the reserved id and revision entries
    pub fn with_identity(
        id_key: K,
        id_value: V,
        revision_id_key: K,
        revision_id_value: V,
        capacity: usize,
    ) -> Self {
        let mut entries = PropertyMap::with_capacity(capacity.max(2));
        entries.insert(id_key.clone(), id_value);
        entries.insert(revision_id_key.clone(), revision_id_value);

        PropertyStore {
            id_key,
            revision_id_key,
            entries: RwLock::new(entries),
            writes: ReentrantMutex::new(()),
            listeners: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        }
    }

    pub fn id_key(&self) -> &K {
        &self.id_key
    }

    pub fn revision_id_key(&self) -> &K {
        &self.revision_id_key
    }

    /// Check whether `key` is one of the two reserved keys
    pub fn is_reserved<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.id_key.borrow() == key || self.revision_id_key.borrow() == key
    }

    /// Register a listener for every subsequent property event
    pub fn subscribe(&self, listener: PropertyListener<K, V>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, listener));
        id
    }

    /// Remove a listener, returning whether it was registered
    pub fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(id, _)| *id != subscription);
        listeners.len() != before
    }

    /// Full copy of the entries, reserved and absent ones included
    pub fn to_map(&self) -> PropertyMap<K, V> {
        self.entries.read().clone()
    }

    // Listeners run without any store lock held so they may read the store.
    fn notify(&self, event: &PropertyEvent<'_, K, V>) {
        let listeners: Vec<PropertyListener<K, V>> = {
            let guard = self.listeners.read();
            if guard.is_empty() {
                return;
            }
            guard.iter().map(|(_, l)| l.clone()).collect()
        };
        for listener in listeners {
            listener(event);
        }
    }
}

impl<K: PropertyKey, V: PropertyData> PropertyAccess<K, V> for PropertyStore<K, V> {
    fn get_property<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.read().get(key).cloned()
    }

    fn has_property<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.read().contains_key(key)
    }

    fn set_property(&self, key: impl Into<K>, value: impl Into<V>) -> GraphResult<Option<V>> {
        let key = key.into();
        let value = value.into();
        if self.is_reserved(&key) {
            return Err(GraphError::ReservedKey(format!("{:?}", key)));
        }

        let _writing = self.writes.lock();
        let current = self.entries.read().get(&key).cloned();
        if let Some(old) = &current {
            self.notify(&PropertyEvent::Changing { key: &key, old, new: &value });
        }

        let previous = self.entries.write().insert(key.clone(), value.clone());
        match &previous {
            Some(old) => self.notify(&PropertyEvent::Changed { key: &key, old, new: &value }),
            None => self.notify(&PropertyEvent::Added { key: &key, value: &value }),
        }
        Ok(previous)
    }

    fn remove_property<Q>(&self, key: &Q) -> GraphResult<Option<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + fmt::Debug + ?Sized,
    {
        if self.is_reserved(key) {
            return Err(GraphError::ReservedKey(format!("{:?}", key)));
        }

        let _writing = self.writes.lock();
        let removed = self.entries.write().remove_entry(key);
        match removed {
            Some((key, value)) => {
                self.notify(&PropertyEvent::Removed { key: &key, value: &value });
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn properties(&self, filter: Option<&dyn Fn(&K, &V) -> bool>) -> Vec<(K, V)> {
        let entries = self.entries.read();
        collect_properties(entries.iter(), filter)
    }

    fn property_keys(&self) -> Vec<K> {
        self.entries.read().keys().cloned().collect()
    }

    fn property_count(&self) -> usize {
        self.entries.read().len()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for PropertyStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyStore")
            .field("entries", &*self.entries.read())
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}
