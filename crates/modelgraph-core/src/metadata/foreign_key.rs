//! Referential link between two entity types.

use crate::metadata::{EntityId, KeyId, NavigationId, PropertyId};

/// A relationship from a dependent entity to a principal entity.
///
/// The dependent properties pair positionally with the properties of the
/// referenced principal key; the counts and value types match. Up to two
/// navigations attach to a foreign key, one per direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    /// Entity type holding the foreign key properties.
    pub dependent: EntityId,
    /// Foreign key properties on the dependent, in principal key order.
    pub properties: Vec<PropertyId>,
    /// Referenced entity type.
    pub principal: EntityId,
    /// Referenced candidate key on the principal.
    pub principal_key: KeyId,
    /// Whether each principal row relates to at most one dependent row.
    pub is_unique: bool,
    /// Whether the dependent properties must be non-null.
    pub is_required: bool,
    /// Navigation on the dependent pointing at the principal, if any.
    pub to_principal: Option<NavigationId>,
    /// Navigation on the principal pointing at the dependent(s), if any.
    pub to_dependent: Option<NavigationId>,
}
