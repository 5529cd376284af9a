//! Property change notifications
//!
//! Every property store publishes its writes to subscribed listeners.
//! Automatic indices use these events to stay current.

use std::sync::Arc;

/// A single change to a property store.
///
/// `Changing` fires before an existing key is overwritten. The other
/// variants fire after the store has been updated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PropertyEvent<'a, K, V> {
    Changing { key: &'a K, old: &'a V, new: &'a V },
    Changed { key: &'a K, old: &'a V, new: &'a V },
    Added { key: &'a K, value: &'a V },
    Removed { key: &'a K, value: &'a V },
}

impl<'a, K, V> PropertyEvent<'a, K, V> {
    /// Key the event refers to
    pub fn key(&self) -> &'a K {
        match self {
            PropertyEvent::Changing { key, .. }
            | PropertyEvent::Changed { key, .. }
            | PropertyEvent::Added { key, .. }
            | PropertyEvent::Removed { key, .. } => key,
        }
    }

    /// True for events delivered before the store changes
    pub fn is_pre_change(&self) -> bool {
        matches!(self, PropertyEvent::Changing { .. })
    }
}

/// Callback invoked for every property event of a store
pub type PropertyListener<K, V> = Arc<dyn Fn(&PropertyEvent<'_, K, V>) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe later
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub(crate) u64);
