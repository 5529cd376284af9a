//! Core type definitions for the graph engine
//!
//! Identifier, key and label bounds shared by every element kind, plus the
//! concrete id and label types used by the built-in schemas.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// Bound for anything used as a graph, vertex, edge, hyperedge or revision id.
///
/// Ids double as property values and as map keys, so they must be cheap to
/// clone, totally ordered and hashable.
pub trait Identifier:
    Clone + Eq + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// True when ids are non-negative integers that can address an array slot.
    const INTEGRAL: bool = false;

    /// True for the sentinel value that stands for "no id supplied": the
    /// default of the type (`0` or the empty string).
    fn is_unset(&self) -> bool {
        false
    }

    /// False for ids that do not fit the integer `Id` property losslessly.
    fn is_representable(&self) -> bool {
        true
    }

    /// Array offset for integral ids, `None` when the id cannot be one.
    ///
    /// Integral ids start at 1 because 0 is unset, so id `n` maps to offset
    /// `n - 1`.
    fn to_offset(&self) -> Option<usize> {
        None
    }
}

macro_rules! integral_identifier {
    ($($t:ty),*) => {
        $(
            impl Identifier for $t {
                const INTEGRAL: bool = true;

                fn is_unset(&self) -> bool {
                    *self == 0
                }

                fn is_representable(&self) -> bool {
                    i64::try_from(*self).is_ok()
                }

                fn to_offset(&self) -> Option<usize> {
                    usize::try_from(*self).ok().and_then(|id| id.checked_sub(1))
                }
            }
        )*
    };
}

integral_identifier!(u8, u16, u32, u64, usize, i32, i64);

impl Identifier for String {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

/// Bound for property keys
pub trait PropertyKey: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> PropertyKey for T where T: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

/// Bound for edge and hyperedge labels
pub trait EdgeLabel: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> EdgeLabel for T where T: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

/// The kinds of element a graph holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Graph,
    Vertex,
    Edge,
    HyperEdge,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Graph => "Graph",
            ElementKind::Vertex => "Vertex",
            ElementKind::Edge => "Edge",
            ElementKind::HyperEdge => "HyperEdge",
        };
        f.write_str(name)
    }
}

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        ///
        /// `0` (the default) means "no id". Ids must not exceed `i64::MAX` so
        /// they fit the integer `Id` property.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord, Default)]
        pub struct $name(pub u64);

        impl $name {
            pub fn new(id: u64) -> Self {
                $name(id)
            }

            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                $name(id)
            }
        }

        impl Identifier for $name {
            const INTEGRAL: bool = true;

            fn is_unset(&self) -> bool {
                self.0 == 0
            }

            fn is_representable(&self) -> bool {
                i64::try_from(self.0).is_ok()
            }

            fn to_offset(&self) -> Option<usize> {
                usize::try_from(self.0).ok().and_then(|id| id.checked_sub(1))
            }
        }
    };
}

integer_id!(
    /// Unique identifier for a vertex
    VertexId
);

integer_id!(
    /// Unique identifier for an edge
    EdgeId
);

integer_id!(
    /// Unique identifier for a hyperedge
    HyperEdgeId
);

/// Edge or hyperedge label (e.g., "KNOWS", "WORKS_AT")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord, Default)]
pub struct Label(String);

impl Label {
    pub fn new(label: impl Into<String>) -> Self {
        Label(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Label {
    fn from(s: String) -> Self {
        Label(s)
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Self {
        Label(s.to_string())
    }
}
