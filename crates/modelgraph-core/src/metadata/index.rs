//! Secondary index over entity properties.

use crate::metadata::{EntityId, PropertyId};

/// A lookup structure over an ordered set of properties of one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    /// Owning entity type.
    pub entity: EntityId,
    /// Indexed properties, in declaration order.
    pub properties: Vec<PropertyId>,
}
