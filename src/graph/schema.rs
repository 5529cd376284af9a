//! Graph schemas
//!
//! A schema fixes the id, key, value and label types of a graph. The engine
//! is generic over the schema; [`DefaultSchema`] and [`StringSchema`] cover
//! the common integer-identified and string-identified cases.

use super::property::{PropertyData, PropertyValue};
use super::types::{EdgeId, EdgeLabel, HyperEdgeId, Identifier, Label, PropertyKey, VertexId};
use std::fmt;

/// Reserved property key holding an element's id
pub const ID_KEY: &str = "Id";

/// Reserved property key holding an element's revision id
pub const REVISION_ID_KEY: &str = "RevisionId";

/// Type configuration of a property graph.
///
/// Ids are stored as ordinary property values, so `Value` must be
/// constructible from every identifier type.
pub trait GraphSchema: fmt::Debug + Sized + Send + Sync + 'static {
    type GraphId: Identifier;
    type VertexId: Identifier;
    type EdgeId: Identifier;
    type HyperEdgeId: Identifier;
    type RevisionId: Identifier;
    type Key: PropertyKey;
    type Value: PropertyData
        + From<Self::GraphId>
        + From<Self::VertexId>
        + From<Self::EdgeId>
        + From<Self::HyperEdgeId>
        + From<Self::RevisionId>;
    type Label: EdgeLabel;

    /// Key of the reserved id entry
    fn id_key() -> Self::Key;

    /// Key of the reserved revision id entry
    fn revision_id_key() -> Self::Key;
}

/// Integer-identified graph with string keys and [`PropertyValue`] values
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSchema;

impl GraphSchema for DefaultSchema {
    type GraphId = u64;
    type VertexId = VertexId;
    type EdgeId = EdgeId;
    type HyperEdgeId = HyperEdgeId;
    type RevisionId = u64;
    type Key = String;
    type Value = PropertyValue;
    type Label = Label;

    fn id_key() -> String {
        ID_KEY.to_string()
    }

    fn revision_id_key() -> String {
        REVISION_ID_KEY.to_string()
    }
}

/// String-identified graph with string keys and [`PropertyValue`] values
#[derive(Debug, Clone, Copy, Default)]
pub struct StringSchema;

impl GraphSchema for StringSchema {
    type GraphId = String;
    type VertexId = String;
    type EdgeId = String;
    type HyperEdgeId = String;
    type RevisionId = u64;
    type Key = String;
    type Value = PropertyValue;
    type Label = Label;

    fn id_key() -> String {
        ID_KEY.to_string()
    }

    fn revision_id_key() -> String {
        REVISION_ID_KEY.to_string()
    }
}
