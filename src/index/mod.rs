//! Property Indexing module
//!
//! Provides B-Tree indices for optimizing property lookups, grouped per
//! element kind into manual and automatic registries.

pub mod manager;
pub mod property_index;

pub use manager::{IndexInfo, IndexManager, IndexMode, IndexRegistry};
pub use property_index::{IndexKey, PropertyIndex};
