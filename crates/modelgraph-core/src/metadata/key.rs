//! Candidate key over entity properties.

use crate::metadata::{EntityId, PropertyId};

/// A uniqueness constraint over an ordered set of properties.
///
/// All properties belong to the owning entity. At most one key per entity is
/// designated as the primary key; that designation lives on
/// [`crate::metadata::EntityType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    /// Owning entity type.
    pub entity: EntityId,
    /// Constrained properties, in declaration order.
    pub properties: Vec<PropertyId>,
}
