//! Scalar property of an entity type.

use crate::metadata::{EntityId, ScalarType};

/// A scalar property belonging to one entity type.
///
/// A property either binds to a member of the entity's backing type or is a
/// shadow property that exists in the model only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Owning entity type.
    pub entity: EntityId,
    /// Property name (unique within the entity).
    pub name: String,
    /// Value type.
    pub ty: ScalarType,
    /// True when the property has no backing member.
    pub shadow: bool,
}
