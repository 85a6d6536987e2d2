//! Named traversal of a foreign key.

use crate::metadata::{EntityId, ForeignKeyId};

/// A named reference from one entity type across a foreign key.
///
/// Navigation names are unique within their entity across both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Entity type the navigation is declared on.
    pub entity: EntityId,
    /// Navigation name (unique within the entity).
    pub name: String,
    /// The foreign key this navigation traverses.
    pub foreign_key: ForeignKeyId,
    /// True when declared on the dependent and pointing at the principal.
    pub to_principal: bool,
}
