//! Fixed-size slot tables backing a snapshot
//!
//! A table is sized once at construction and never grows. Elements are
//! addressed by slot. With synced ids the slot comes straight from the id
//! (id `n` at slot `n - 1`, since 0 is the unset id); otherwise slots are
//! handed out in insertion order and an id→slot map is kept.

use crate::graph::{ElementKind, GraphError, GraphResult, Identifier};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use std::fmt;

/// Array of element slots addressed by id
pub struct SlotTable<I: Identifier, T> {
    kind: ElementKind,
    slots: Box<[Option<T>]>,
    /// `None` when ids are synced with slots
    offsets: Option<IndexMap<I, usize, FxBuildHasher>>,
    len: usize,
}

fn empty_slots<T>(capacity: usize) -> Box<[Option<T>]> {
    (0..capacity).map(|_| None).collect()
}

impl<I: Identifier, T> SlotTable<I, T> {
    /// Table whose slot offsets are derived from the ids
    pub fn synced(kind: ElementKind, capacity: usize) -> GraphResult<Self> {
        if !I::INTEGRAL {
            return Err(GraphError::SyncedIdsUnsupported {
                kind,
                type_name: std::any::type_name::<I>(),
            });
        }
        Ok(SlotTable {
            kind,
            slots: empty_slots(capacity),
            offsets: None,
            len: 0,
        })
    }

    /// Table that assigns slots in insertion order
    pub fn indexed(kind: ElementKind, capacity: usize) -> Self {
        SlotTable {
            kind,
            slots: empty_slots(capacity),
            offsets: Some(IndexMap::with_capacity_and_hasher(capacity, FxBuildHasher)),
            len: 0,
        }
    }

    /// Store `value` under `id`, returning its slot
    pub fn insert(&mut self, id: I, value: T) -> GraphResult<usize> {
        let capacity = self.slots.len();
        let slot = match &mut self.offsets {
            None => {
                let slot = id
                    .to_offset()
                    .filter(|offset| *offset < capacity)
                    .ok_or_else(|| GraphError::SyncedIdOutOfRange {
                        kind: self.kind,
                        id: id.to_string(),
                        capacity,
                    })?;
                if self.slots[slot].is_some() {
                    return Err(GraphError::DuplicateId {
                        kind: self.kind,
                        id: id.to_string(),
                    });
                }
                slot
            }
            Some(offsets) => {
                if offsets.contains_key(&id) {
                    return Err(GraphError::DuplicateId {
                        kind: self.kind,
                        id: id.to_string(),
                    });
                }
                let slot = offsets.len();
                if slot >= capacity {
                    return Err(GraphError::CapacityExceeded {
                        kind: self.kind,
                        capacity,
                    });
                }
                offsets.insert(id, slot);
                slot
            }
        };

        self.slots[slot] = Some(value);
        self.len += 1;
        Ok(slot)
    }

    /// Slot holding `id`, `None` when the id is not stored
    pub fn slot_of(&self, id: &I) -> Option<usize> {
        match &self.offsets {
            Some(offsets) => offsets.get(id).copied(),
            None => id
                .to_offset()
                .filter(|slot| self.slots.get(*slot).map_or(false, Option::is_some)),
        }
    }

    pub fn get(&self, id: &I) -> Option<&T> {
        self.slot_of(id).and_then(|slot| self.get_slot(slot))
    }

    pub fn get_slot(&self, slot: usize) -> Option<&T> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    pub(crate) fn get_slot_mut(&mut self, slot: usize) -> Option<&mut T> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Occupied slots in slot order
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.slots.iter().flatten()
    }

    pub fn iter_slots(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, value)| value.as_ref().map(|value| (slot, value)))
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_synced(&self) -> bool {
        self.offsets.is_none()
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }
}

impl<I: Identifier, T> fmt::Debug for SlotTable<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotTable")
            .field("kind", &self.kind)
            .field("synced", &self.is_synced())
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .finish()
    }
}
