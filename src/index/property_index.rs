//! B-Tree based property index for fast lookups
//!
//! Maps an [`IndexKey`] to the set of element ids holding that value.

use crate::graph::types::Identifier;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};
use std::ops::RangeBounds;

/// Totally ordered form of a scalar property value.
///
/// Keys of different variants order by variant first. Floats use
/// `f64::total_cmp`, so `NaN` is a valid key and `-0.0 < 0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IndexKey {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    DateTime(i64),
    String(String),
}

impl IndexKey {
    fn rank(&self) -> u8 {
        match self {
            IndexKey::Boolean(_) => 0,
            IndexKey::Integer(_) => 1,
            IndexKey::Float(_) => 2,
            IndexKey::DateTime(_) => 3,
            IndexKey::String(_) => 4,
        }
    }
}

impl Ord for IndexKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (IndexKey::Boolean(a), IndexKey::Boolean(b)) => a.cmp(b),
            (IndexKey::Integer(a), IndexKey::Integer(b)) => a.cmp(b),
            (IndexKey::Float(a), IndexKey::Float(b)) => a.total_cmp(b),
            (IndexKey::DateTime(a), IndexKey::DateTime(b)) => a.cmp(b),
            (IndexKey::String(a), IndexKey::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for IndexKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for IndexKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for IndexKey {}

impl Hash for IndexKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            IndexKey::Boolean(b) => b.hash(state),
            IndexKey::Integer(i) | IndexKey::DateTime(i) => i.hash(state),
            IndexKey::Float(f) => f.to_bits().hash(state),
            IndexKey::String(s) => s.hash(state),
        }
    }
}

impl From<&str> for IndexKey {
    fn from(s: &str) -> Self {
        IndexKey::String(s.to_string())
    }
}

impl From<String> for IndexKey {
    fn from(s: String) -> Self {
        IndexKey::String(s)
    }
}

impl From<i64> for IndexKey {
    fn from(i: i64) -> Self {
        IndexKey::Integer(i)
    }
}

impl From<f64> for IndexKey {
    fn from(f: f64) -> Self {
        IndexKey::Float(f)
    }
}

impl From<bool> for IndexKey {
    fn from(b: bool) -> Self {
        IndexKey::Boolean(b)
    }
}

/// Index over one property: value -> set of element ids
#[derive(Debug, Clone)]
pub struct PropertyIndex<I: Identifier> {
    index: BTreeMap<IndexKey, BTreeSet<I>>,
    entries: usize,
}

impl<I: Identifier> PropertyIndex<I> {
    pub fn new() -> Self {
        Self {
            index: BTreeMap::new(),
            entries: 0,
        }
    }

    /// Returns false if the pair was already indexed
    pub fn insert(&mut self, key: IndexKey, id: I) -> bool {
        let added = self.index.entry(key).or_default().insert(id);
        if added {
            self.entries += 1;
        }
        added
    }

    pub fn remove(&mut self, key: &IndexKey, id: &I) -> bool {
        let Some(ids) = self.index.get_mut(key) else {
            return false;
        };
        let removed = ids.remove(id);
        if ids.is_empty() {
            self.index.remove(key);
        }
        if removed {
            self.entries -= 1;
        }
        removed
    }

    /// Remove `id` under every key. O(number of distinct keys).
    pub fn remove_id(&mut self, id: &I) -> usize {
        let mut removed = 0;
        self.index.retain(|_, ids| {
            if ids.remove(id) {
                removed += 1;
            }
            !ids.is_empty()
        });
        self.entries -= removed;
        removed
    }

    pub fn get(&self, key: &IndexKey) -> Vec<I> {
        self.index
            .get(key)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, key: &IndexKey, id: &I) -> bool {
        self.index.get(key).map_or(false, |ids| ids.contains(id))
    }

    /// Ids for every key in `range`, in key order
    pub fn range<R>(&self, range: R) -> Vec<I>
    where
        R: RangeBounds<IndexKey>,
    {
        let mut result = Vec::new();
        for (_, ids) in self.index.range(range) {
            result.extend(ids.iter().cloned());
        }
        result
    }

    /// Number of (key, id) pairs
    pub fn len(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn distinct_keys(&self) -> usize {
        self.index.len()
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.entries = 0;
    }
}

impl<I: Identifier> Default for PropertyIndex<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::VertexId;
    use std::ops::Bound;

    #[test]
    fn test_property_index_ops() {
        let mut index = PropertyIndex::new();
        let n1 = VertexId::new(1);
        let n2 = VertexId::new(2);
        let val = IndexKey::Integer(100);

        assert!(index.insert(val.clone(), n1));
        assert!(index.insert(val.clone(), n2));
        assert!(!index.insert(val.clone(), n2));
        assert_eq!(index.len(), 2);

        assert_eq!(index.get(&val), vec![n1, n2]);

        assert!(index.remove(&val, &n1));
        assert!(!index.remove(&val, &n1));
        assert_eq!(index.get(&val), vec![n2]);

        assert!(index.remove(&val, &n2));
        assert!(index.is_empty());
        assert_eq!(index.distinct_keys(), 0);
    }

    #[test]
    fn test_property_index_range() {
        let mut index = PropertyIndex::new();
        for i in 1..=10 {
            index.insert(IndexKey::Integer(i), VertexId::new(i as u64));
        }

        let range = (Bound::Included(IndexKey::Integer(3)), Bound::Included(IndexKey::Integer(7)));
        let results = index.range(range);

        assert_eq!(results.len(), 5); // 3, 4, 5, 6, 7
        for i in 3..=7 {
            assert!(results.contains(&VertexId::new(i)));
        }
    }

    #[test]
    fn test_remove_id_everywhere() {
        let mut index = PropertyIndex::new();
        index.insert(IndexKey::from("a"), 1u64);
        index.insert(IndexKey::from("b"), 1u64);
        index.insert(IndexKey::from("b"), 2u64);

        assert_eq!(index.remove_id(&1), 2);
        assert_eq!(index.len(), 1);
        assert_eq!(index.distinct_keys(), 1);
        assert!(index.contains(&IndexKey::from("b"), &2));
    }

    #[test]
    fn test_key_ordering() {
        assert!(IndexKey::Float(-0.0) < IndexKey::Float(0.0));
        assert!(IndexKey::Float(1.0) < IndexKey::Float(f64::NAN));
        assert_eq!(IndexKey::Float(f64::NAN), IndexKey::Float(f64::NAN));
        assert!(IndexKey::Boolean(true) < IndexKey::Integer(i64::MIN));
        assert!(IndexKey::Integer(5) < IndexKey::String("0".to_string()));
        assert_ne!(IndexKey::Integer(5), IndexKey::DateTime(5));
    }
}
