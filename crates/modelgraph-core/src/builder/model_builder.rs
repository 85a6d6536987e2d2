//! Model-level builder operations and cascade internals.

use tracing::debug;

use crate::builder::{EntityBuilder, Provenance};
use crate::error::Error;
use crate::metadata::{
    EntityId, EntityRef, ForeignKeyId, IndexId, KeyId, Model, NavigationId, PropertyId,
};
use crate::source::ConfigurationSource;

/// Mutable view over a model plus the provenance of every element in it.
///
/// All mutation funnels through here or through [`EntityBuilder`]. Operations
/// that lose on precedence return `Ok(None)` or `Ok(false)` and leave the
/// model untouched; [`Error`] is reserved for caller misuse. Cascading
/// operations validate every step up front and only then commit, so a refused
/// operation never leaves a partial change behind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelBuilder {
    pub(crate) model: Model,
    pub(crate) provenance: Provenance,
}

impl ModelBuilder {
    /// Create a builder over an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// The model built so far.
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// A builder scoped to one live entity type.
    pub fn entity_builder(&mut self, entity: EntityId) -> EntityBuilder<'_> {
        EntityBuilder {
            builder: self,
            entity,
        }
    }

    /// Get or add an entity type.
    ///
    /// Returns the existing entity (raising its recorded source) when one
    /// with this name is live. Returns `Ok(None)` when an ignore marker at
    /// equal or stronger source blocks the name; a stronger declaration
    /// clears the marker instead. An explicit request against an explicit
    /// marker is caller misuse.
    pub fn entity(
        &mut self,
        entity: impl Into<EntityRef>,
        source: ConfigurationSource,
    ) -> Result<Option<EntityId>, Error> {
        let entity = entity.into();
        let name = entity.name().to_string();

        if let Some(&ignored) = self.provenance.ignored_entities.get(&name) {
            if ignored >= source {
                if ignored == ConfigurationSource::Explicit
                    && source == ConfigurationSource::Explicit
                {
                    return Err(Error::EntityIgnoredExplicitly { entity: name });
                }
                return Ok(None);
            }
            self.provenance.ignored_entities.remove(&name);
        }

        if let Some(id) = self.model.find_entity(&name) {
            Provenance::raise(&mut self.provenance.entities, id, source);
            return Ok(Some(id));
        }

        let backing = match entity {
            EntityRef::Backed(backing) => Some(backing),
            EntityRef::Named(_) => None,
        };
        let id = self.model.add_entity(&name, backing);
        self.provenance.entities.insert(id, source);
        debug!(entity = %name, %source, "added entity type");
        Ok(Some(id))
    }

    /// Ignore an entity type name.
    ///
    /// Removes the live entity of this name when `source` is at least its
    /// recorded source and every relationship involving it can be removed,
    /// then records the ignore marker. Returns `Ok(false)` when precedence
    /// refuses; re-ignoring an already absent name is idempotent.
    pub fn ignore(
        &mut self,
        entity: impl Into<EntityRef>,
        source: ConfigurationSource,
    ) -> Result<bool, Error> {
        let name = entity.into().name().to_string();

        if let Some(id) = self.model.find_entity(&name) {
            let recorded = self.entity_source_or_explicit(id);
            if recorded > source {
                return Ok(false);
            }
            if recorded == ConfigurationSource::Explicit {
                return Err(Error::EntityAddedExplicitly { entity: name });
            }
            for fk in self.model.foreign_keys_involving(id) {
                if !source.overrides(Some(self.foreign_key_source_or_explicit(fk))) {
                    return Ok(false);
                }
            }

            for fk in self.model.foreign_keys_involving(id) {
                self.remove_foreign_key_internal(fk, source);
            }
            for key in self.model.entity(id).key_ids().to_vec() {
                if self.model.contains_key(key) {
                    self.remove_key_internal(key, source);
                }
            }
            for index in self.model.entity(id).index_ids().to_vec() {
                if self.model.contains_index(index) {
                    self.remove_index_internal(index, source);
                }
            }
            for property in self.model.entity(id).property_ids().to_vec() {
                if self.model.contains_property(property) {
                    self.model.remove_property(property);
                    self.provenance.properties.remove(&property);
                }
            }
            self.model.remove_entity(id);
            self.provenance.entities.remove(&id);
            self.provenance
                .ignored_members
                .retain(|(entity, _), _| *entity != id);
            debug!(entity = %name, %source, "removed ignored entity type");
        }

        Provenance::raise(&mut self.provenance.ignored_entities, name, source);
        Ok(true)
    }

    /// The recorded source of a live entity type.
    pub fn entity_source(&self, id: EntityId) -> Option<ConfigurationSource> {
        self.provenance.entities.get(&id).copied()
    }

    /// The recorded source of a live property.
    pub fn property_source(&self, id: PropertyId) -> Option<ConfigurationSource> {
        self.provenance.properties.get(&id).copied()
    }

    /// The recorded source of a live key.
    pub fn key_source(&self, id: KeyId) -> Option<ConfigurationSource> {
        self.provenance.keys.get(&id).copied()
    }

    /// The recorded source of a live index.
    pub fn index_source(&self, id: IndexId) -> Option<ConfigurationSource> {
        self.provenance.indexes.get(&id).copied()
    }

    /// The recorded source of a live foreign key.
    pub fn foreign_key_source(&self, id: ForeignKeyId) -> Option<ConfigurationSource> {
        self.provenance.foreign_keys.get(&id).copied()
    }

    /// The recorded source of a live navigation.
    pub fn navigation_source(&self, id: NavigationId) -> Option<ConfigurationSource> {
        self.provenance.navigations.get(&id).copied()
    }

    // Missing provenance for a live element is treated as the strongest
    // claim, so nothing weaker can disturb it.

    pub(crate) fn entity_source_or_explicit(&self, id: EntityId) -> ConfigurationSource {
        self.entity_source(id).unwrap_or(ConfigurationSource::Explicit)
    }

    pub(crate) fn property_source_or_explicit(&self, id: PropertyId) -> ConfigurationSource {
        self.property_source(id).unwrap_or(ConfigurationSource::Explicit)
    }

    pub(crate) fn key_source_or_explicit(&self, id: KeyId) -> ConfigurationSource {
        self.key_source(id).unwrap_or(ConfigurationSource::Explicit)
    }

    pub(crate) fn index_source_or_explicit(&self, id: IndexId) -> ConfigurationSource {
        self.index_source(id).unwrap_or(ConfigurationSource::Explicit)
    }

    pub(crate) fn foreign_key_source_or_explicit(&self, id: ForeignKeyId) -> ConfigurationSource {
        self.foreign_key_source(id)
            .unwrap_or(ConfigurationSource::Explicit)
    }

    pub(crate) fn navigation_source_or_explicit(&self, id: NavigationId) -> ConfigurationSource {
        self.navigation_source(id)
            .unwrap_or(ConfigurationSource::Explicit)
    }

    /// Whether `source` may remove a key along with every foreign key that
    /// references it.
    pub(crate) fn can_remove_key(&self, key: KeyId, source: ConfigurationSource) -> bool {
        if !source.overrides(Some(self.key_source_or_explicit(key))) {
            return false;
        }
        self.model
            .foreign_keys_referencing(key)
            .into_iter()
            .all(|fk| source.overrides(Some(self.foreign_key_source_or_explicit(fk))))
    }

    /// Remove a key, its referencing foreign keys and any shadow properties
    /// left unused. The caller has checked [`Self::can_remove_key`].
    pub(crate) fn remove_key_internal(&mut self, key: KeyId, source: ConfigurationSource) {
        for fk in self.model.foreign_keys_referencing(key) {
            self.remove_foreign_key_internal(fk, source);
        }
        let removed = self.model.remove_key(key);
        self.provenance.keys.remove(&key);
        self.collect_garbage(&removed.properties, source);
    }

    /// Remove a foreign key, its navigations and any shadow properties left
    /// unused. The caller has checked precedence on the foreign key itself.
    pub(crate) fn remove_foreign_key_internal(
        &mut self,
        fk: ForeignKeyId,
        source: ConfigurationSource,
    ) {
        let navigations = {
            let fk = self.model.foreign_key(fk);
            [fk.to_principal, fk.to_dependent]
        };
        let removed = self.model.remove_foreign_key(fk);
        self.provenance.foreign_keys.remove(&fk);
        for nav in navigations.into_iter().flatten() {
            self.provenance.navigations.remove(&nav);
        }
        self.collect_garbage(&removed.properties, source);
    }

    /// Remove an index and any shadow properties left unused.
    pub(crate) fn remove_index_internal(&mut self, index: IndexId, source: ConfigurationSource) {
        let removed = self.model.remove_index(index);
        self.provenance.indexes.remove(&index);
        self.collect_garbage(&removed.properties, source);
    }

    /// Drop shadow properties orphaned by a removal.
    ///
    /// A property is collected when it is shadow, no longer used by any key,
    /// index or foreign key, was not declared explicitly, and its recorded
    /// source does not exceed the source driving the removal. Backed
    /// properties are never collected.
    pub(crate) fn collect_garbage(
        &mut self,
        candidates: &[PropertyId],
        source: ConfigurationSource,
    ) {
        for &property in candidates {
            if !self.model.contains_property(property) {
                continue;
            }
            let recorded = self.property_source_or_explicit(property);
            let collectable = self.model.property(property).shadow
                && !self.model.property_in_use(property)
                && recorded < ConfigurationSource::Explicit
                && recorded <= source;
            if collectable {
                let removed = self.model.remove_property(property);
                self.provenance.properties.remove(&property);
                debug!(property = %removed.name, "collected orphaned shadow property");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{BackingType, ScalarType};
    use std::sync::Arc;

    fn customer_backing() -> Arc<BackingType> {
        Arc::new(
            BackingType::new("Customer")
                .with_member("Id", ScalarType::Int32)
                .with_member("Name", ScalarType::String),
        )
    }

    #[test]
    fn test_entity_add_is_idempotent_and_raises_source() {
        let mut builder = ModelBuilder::new();
        let id = builder
            .entity("Customer", ConfigurationSource::Convention)
            .unwrap()
            .unwrap();
        let again = builder
            .entity("Customer", ConfigurationSource::Explicit)
            .unwrap()
            .unwrap();
        assert_eq!(id, again);
        assert_eq!(
            builder.entity_source(id),
            Some(ConfigurationSource::Explicit)
        );

        // A later weaker declaration does not lower the recorded source.
        builder
            .entity("Customer", ConfigurationSource::Convention)
            .unwrap();
        assert_eq!(
            builder.entity_source(id),
            Some(ConfigurationSource::Explicit)
        );
    }

    #[test]
    fn test_backed_entity_records_backing_type() {
        let mut builder = ModelBuilder::new();
        let id = builder
            .entity(customer_backing(), ConfigurationSource::Explicit)
            .unwrap()
            .unwrap();
        assert!(!builder.model().entity(id).is_shadow());

        let shadow = builder
            .entity("Order", ConfigurationSource::Explicit)
            .unwrap()
            .unwrap();
        assert!(builder.model().entity(shadow).is_shadow());
    }

    #[test]
    fn test_ignore_blocks_weaker_add() {
        let mut builder = ModelBuilder::new();
        assert!(builder
            .ignore("Customer", ConfigurationSource::DataAnnotation)
            .unwrap());

        assert_eq!(
            builder
                .entity("Customer", ConfigurationSource::Convention)
                .unwrap(),
            None
        );
        assert_eq!(
            builder
                .entity("Customer", ConfigurationSource::DataAnnotation)
                .unwrap(),
            None
        );
        // A stronger add clears the marker.
        assert!(builder
            .entity("Customer", ConfigurationSource::Explicit)
            .unwrap()
            .is_some());
        assert_eq!(
            builder
                .entity("Customer", ConfigurationSource::Convention)
                .unwrap(),
            builder.model().find_entity("Customer")
        );
    }

    #[test]
    fn test_explicit_add_against_explicit_ignore_errors() {
        let mut builder = ModelBuilder::new();
        builder.ignore("Customer", ConfigurationSource::Explicit).unwrap();
        assert_eq!(
            builder.entity("Customer", ConfigurationSource::Explicit),
            Err(Error::EntityIgnoredExplicitly {
                entity: "Customer".to_string()
            })
        );
    }

    #[test]
    fn test_ignore_refuses_stronger_entity() {
        let mut builder = ModelBuilder::new();
        builder
            .entity("Customer", ConfigurationSource::DataAnnotation)
            .unwrap();

        assert!(!builder
            .ignore("Customer", ConfigurationSource::Convention)
            .unwrap());
        assert!(builder.model().find_entity("Customer").is_some());

        // Equal source succeeds.
        assert!(builder
            .ignore("Customer", ConfigurationSource::DataAnnotation)
            .unwrap());
        assert!(builder.model().find_entity("Customer").is_none());
    }

    #[test]
    fn test_ignore_of_explicit_entity_errors_only_when_explicit() {
        let mut builder = ModelBuilder::new();
        builder
            .entity("Customer", ConfigurationSource::Explicit)
            .unwrap();

        assert!(!builder
            .ignore("Customer", ConfigurationSource::DataAnnotation)
            .unwrap());
        assert_eq!(
            builder.ignore("Customer", ConfigurationSource::Explicit),
            Err(Error::EntityAddedExplicitly {
                entity: "Customer".to_string()
            })
        );
    }

    #[test]
    fn test_ignore_missing_entity_is_idempotent() {
        let mut builder = ModelBuilder::new();
        assert!(builder.ignore("Ghost", ConfigurationSource::Convention).unwrap());
        assert!(builder.ignore("Ghost", ConfigurationSource::Convention).unwrap());
    }
}
