//! Builder error types.

use thiserror::Error;

/// Errors raised for caller misuse.
///
/// Expected precedence losses are not errors: builder operations report them
/// as `None`/`false` and leave the model unchanged. These variants cover
/// malformed references (a name that cannot resolve to anything) and illegal
/// retroactive edits of explicit declarations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A named member does not exist on the entity's backing type.
    #[error("no member {property} on backing type {entity}")]
    NoBackingMember {
        /// The member name that failed to resolve.
        property: String,
        /// The entity type that was searched.
        entity: String,
    },

    /// A named property has not been declared in a shadow entity type.
    #[error("property {property} not found in shadow entity {entity}")]
    PropertyNotFound {
        /// The property name that failed to resolve.
        property: String,
        /// The shadow entity type that was searched.
        entity: String,
    },

    /// Attempt to ignore a property that was added explicitly.
    #[error("property {property} on {entity} was added explicitly and cannot be ignored")]
    PropertyAddedExplicitly {
        /// The property being ignored.
        property: String,
        /// The owning entity type.
        entity: String,
    },

    /// Attempt to re-add a property whose name was ignored explicitly.
    #[error("property {property} on {entity} was ignored explicitly")]
    PropertyIgnoredExplicitly {
        /// The property being added.
        property: String,
        /// The owning entity type.
        entity: String,
    },

    /// Attempt to ignore a navigation that was added explicitly.
    #[error("navigation {navigation} on {entity} was added explicitly and cannot be ignored")]
    NavigationAddedExplicitly {
        /// The navigation being ignored.
        navigation: String,
        /// The owning entity type.
        entity: String,
    },

    /// Attempt to assign a navigation whose name was ignored explicitly.
    #[error("navigation {navigation} on {entity} was ignored explicitly")]
    NavigationIgnoredExplicitly {
        /// The navigation being assigned.
        navigation: String,
        /// The owning entity type.
        entity: String,
    },

    /// Attempt to ignore an entity type that was added explicitly.
    #[error("entity type {entity} was added explicitly and cannot be ignored")]
    EntityAddedExplicitly {
        /// The entity type being ignored.
        entity: String,
    },

    /// Attempt to re-add an entity type whose name was ignored explicitly.
    #[error("entity type {entity} was ignored explicitly")]
    EntityIgnoredExplicitly {
        /// The entity type being added.
        entity: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::NoBackingMember {
            property: "Unique".to_string(),
            entity: "Order".to_string(),
        };
        assert_eq!(err.to_string(), "no member Unique on backing type Order");

        let err = Error::PropertyNotFound {
            property: "Id".to_string(),
            entity: "Order".to_string(),
        };
        assert!(err.to_string().contains("shadow entity Order"));
    }
}
