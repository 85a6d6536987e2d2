//! Entity type metadata.

use std::sync::Arc;

use crate::metadata::{
    BackingType, ForeignKeyId, IndexId, KeyId, Member, NavigationId, PropertyId,
};

/// An entity type in the model.
///
/// Owns its properties, keys, indexes, dependent-side foreign keys and
/// navigations by id. The element lists keep insertion order; the arena in
/// [`crate::metadata::Model`] owns the elements themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityType {
    /// Entity type name (unique within the model).
    pub name: String,
    /// Backing type, absent for shadow entities.
    pub backing: Option<Arc<BackingType>>,
    pub(crate) properties: Vec<PropertyId>,
    pub(crate) keys: Vec<KeyId>,
    pub(crate) primary_key: Option<KeyId>,
    pub(crate) indexes: Vec<IndexId>,
    pub(crate) foreign_keys: Vec<ForeignKeyId>,
    pub(crate) navigations: Vec<NavigationId>,
}

impl EntityType {
    pub(crate) fn new(name: impl Into<String>, backing: Option<Arc<BackingType>>) -> Self {
        Self {
            name: name.into(),
            backing,
            properties: Vec::new(),
            keys: Vec::new(),
            primary_key: None,
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
            navigations: Vec::new(),
        }
    }

    /// Whether this entity type has no backing type.
    pub fn is_shadow(&self) -> bool {
        self.backing.is_none()
    }

    /// Look up a member of the backing type, if any.
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.backing.as_ref().and_then(|b| b.member(name))
    }

    /// The designated primary key, if one has been set.
    pub fn primary_key(&self) -> Option<KeyId> {
        self.primary_key
    }

    /// Property ids in declaration order.
    pub fn property_ids(&self) -> &[PropertyId] {
        &self.properties
    }

    /// Key ids in declaration order.
    pub fn key_ids(&self) -> &[KeyId] {
        &self.keys
    }

    /// Index ids in declaration order.
    pub fn index_ids(&self) -> &[IndexId] {
        &self.indexes
    }

    /// Dependent-side foreign key ids in declaration order.
    pub fn foreign_key_ids(&self) -> &[ForeignKeyId] {
        &self.foreign_keys
    }

    /// Navigation ids in declaration order.
    pub fn navigation_ids(&self) -> &[NavigationId] {
        &self.navigations
    }
}
