//! Graph element base
//!
//! [`GraphElement`] is the identity plus property store shared by vertices,
//! edges, hyperedges and the graph itself. Equality, ordering and hashing
//! look at the id only.

use super::property::{PropertyAccess, PropertyStore};
use super::schema::GraphSchema;
use super::types::{ElementKind, Identifier};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Common identity surface of every element kind
pub trait Element<S: GraphSchema>: PropertyAccess<S::Key, S::Value> {
    type Id: Identifier;

    const KIND: ElementKind;

    fn id(&self) -> &Self::Id;

    fn revision_id(&self) -> &S::RevisionId;

    fn id_key(&self) -> S::Key {
        S::id_key()
    }

    fn revision_id_key(&self) -> S::Key {
        S::revision_id_key()
    }
}

/// Id, revision id and property store of one element
pub struct GraphElement<S: GraphSchema, I: Identifier> {
    id: I,
    revision_id: S::RevisionId,
    properties: PropertyStore<S::Key, S::Value>,
}

impl<S: GraphSchema, I: Identifier> GraphElement<S, I>
where
    S::Value: From<I>,
{
    pub fn new(id: I, revision_id: S::RevisionId, property_capacity: usize) -> Self {
        let properties = PropertyStore::with_identity(
            S::id_key(),
            <S::Value as From<I>>::from(id.clone()),
            S::revision_id_key(),
            <S::Value as From<S::RevisionId>>::from(revision_id.clone()),
            property_capacity,
        );

        GraphElement {
            id,
            revision_id,
            properties,
        }
    }
}

impl<S: GraphSchema, I: Identifier> GraphElement<S, I> {
    pub fn id(&self) -> &I {
        &self.id
    }

    pub fn revision_id(&self) -> &S::RevisionId {
        &self.revision_id
    }

    pub fn properties(&self) -> &PropertyStore<S::Key, S::Value> {
        &self.properties
    }
}

impl<S: GraphSchema, I: Identifier> PartialEq for GraphElement<S, I> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<S: GraphSchema, I: Identifier> Eq for GraphElement<S, I> {}

impl<S: GraphSchema, I: Identifier> PartialOrd for GraphElement<S, I> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<S: GraphSchema, I: Identifier> Ord for GraphElement<S, I> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl<S: GraphSchema, I: Identifier> Hash for GraphElement<S, I> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<S: GraphSchema, I: Identifier> fmt::Debug for GraphElement<S, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphElement")
            .field("id", &self.id)
            .field("revision_id", &self.revision_id)
            .field("properties", &self.properties)
            .finish()
    }
}

/// Forward `PropertyAccess` to a field holding a [`PropertyStore`]-backed
/// element.
macro_rules! delegate_property_access {
    ($ty:ident, $($field:ident).+) => {
        impl<S: $crate::graph::schema::GraphSchema>
            $crate::graph::property::PropertyAccess<S::Key, S::Value> for $ty<S>
        {
            fn get_property<Q>(&self, key: &Q) -> Option<S::Value>
            where
                S::Key: std::borrow::Borrow<Q>,
                Q: std::hash::Hash + Eq + ?Sized,
            {
                $crate::graph::property::PropertyAccess::get_property(self.$($field).+.properties(), key)
            }

            fn has_property<Q>(&self, key: &Q) -> bool
            where
                S::Key: std::borrow::Borrow<Q>,
                Q: std::hash::Hash + Eq + ?Sized,
            {
                $crate::graph::property::PropertyAccess::has_property(self.$($field).+.properties(), key)
            }

            fn set_property(
                &self,
                key: impl Into<S::Key>,
                value: impl Into<S::Value>,
            ) -> $crate::graph::store::GraphResult<Option<S::Value>> {
                $crate::graph::property::PropertyAccess::set_property(self.$($field).+.properties(), key, value)
            }

            fn remove_property<Q>(
                &self,
                key: &Q,
            ) -> $crate::graph::store::GraphResult<Option<S::Value>>
            where
                S::Key: std::borrow::Borrow<Q>,
                Q: std::hash::Hash + Eq + std::fmt::Debug + ?Sized,
            {
                $crate::graph::property::PropertyAccess::remove_property(self.$($field).+.properties(), key)
            }

            fn properties(
                &self,
                filter: Option<&dyn Fn(&S::Key, &S::Value) -> bool>,
            ) -> Vec<(S::Key, S::Value)> {
                $crate::graph::property::PropertyAccess::properties(self.$($field).+.properties(), filter)
            }

            fn property_keys(&self) -> Vec<S::Key> {
                $crate::graph::property::PropertyAccess::property_keys(self.$($field).+.properties())
            }

            fn property_count(&self) -> usize {
                $crate::graph::property::PropertyAccess::property_count(self.$($field).+.properties())
            }
        }
    };
}

pub(crate) use delegate_property_access;

/// Equality, ordering and hashing by id, forwarded to an element field
/// exposing `id()`.
macro_rules! delegate_identity {
    ($ty:ident, $field:ident) => {
        impl<S: $crate::graph::schema::GraphSchema> PartialEq for $ty<S> {
            fn eq(&self, other: &Self) -> bool {
                self.$field.id() == other.$field.id()
            }
        }

        impl<S: $crate::graph::schema::GraphSchema> Eq for $ty<S> {}

        impl<S: $crate::graph::schema::GraphSchema> PartialOrd for $ty<S> {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl<S: $crate::graph::schema::GraphSchema> Ord for $ty<S> {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.$field.id().cmp(other.$field.id())
            }
        }

        impl<S: $crate::graph::schema::GraphSchema> std::hash::Hash for $ty<S> {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(self.$field.id(), state);
            }
        }
    };
}

pub(crate) use delegate_identity;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::schema::{DefaultSchema, StringSchema};
    use crate::graph::types::VertexId;
    use crate::graph::PropertyValue;

    #[test]
    fn test_identity_is_a_property() {
        let element: GraphElement<DefaultSchema, VertexId> = GraphElement::new(VertexId::new(5), 3, 4);
        assert_eq!(element.id(), &VertexId::new(5));
        assert_eq!(*element.revision_id(), 3);
        assert_eq!(element.properties().get_property("Id"), Some(PropertyValue::Integer(5)));
        assert_eq!(element.properties().get_property("RevisionId"), Some(PropertyValue::Integer(3)));
    }

    #[test]
    fn test_equality_uses_id_only() {
        let a: GraphElement<StringSchema, String> = GraphElement::new("a".to_string(), 1, 0);
        let b: GraphElement<StringSchema, String> = GraphElement::new("a".to_string(), 2, 0);
        let c: GraphElement<StringSchema, String> = GraphElement::new("c".to_string(), 1, 0);

        b.properties().set_property("name", "different").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a < c);
    }
}
