//! Entity-scoped builder operations.

use tracing::debug;

use crate::builder::{ModelBuilder, Provenance};
use crate::error::Error;
use crate::metadata::{EntityId, ForeignKeyId, IndexId, KeyId, PropertyId, PropertyRef, ScalarType};
use crate::source::ConfigurationSource;

/// Builder scoped to one live entity type.
///
/// Obtained from [`ModelBuilder::entity_builder`]. Follows the same contract
/// as the model builder: precedence losses come back as `None`/`false`,
/// errors mean caller misuse, and refused cascades leave no partial change.
#[derive(Debug)]
pub struct EntityBuilder<'a> {
    pub(crate) builder: &'a mut ModelBuilder,
    pub(crate) entity: EntityId,
}

impl EntityBuilder<'_> {
    /// The model builder this entity builder borrows.
    pub fn model_builder(&mut self) -> &mut ModelBuilder {
        self.builder
    }

    fn entity_name(&self) -> String {
        self.builder.model.entity(self.entity).name.clone()
    }

    fn member_ignored(&self, name: &str) -> Option<ConfigurationSource> {
        self.builder
            .provenance
            .ignored_members
            .get(&(self.entity, name.to_string()))
            .copied()
    }

    fn clear_member_ignore(&mut self, name: &str) {
        self.builder
            .provenance
            .ignored_members
            .remove(&(self.entity, name.to_string()));
    }

    /// Get or add a property.
    ///
    /// A member reference binds to the backing type; a plain name resolves
    /// against the backing type and is an error when no member matches (and
    /// always an error on a shadow entity, where no type can be inferred).
    /// Returns `Ok(None)` when an ignore marker at equal or stronger source
    /// blocks the name.
    pub fn property(
        &mut self,
        property: impl Into<PropertyRef>,
        source: ConfigurationSource,
    ) -> Result<Option<PropertyId>, Error> {
        let property = property.into();
        let name = property.name().to_string();

        if let Some(ignored) = self.member_ignored(&name) {
            if ignored >= source {
                if ignored == ConfigurationSource::Explicit
                    && source == ConfigurationSource::Explicit
                {
                    return Err(Error::PropertyIgnoredExplicitly {
                        property: name,
                        entity: self.entity_name(),
                    });
                }
                return Ok(None);
            }
        }

        if let Some(id) = self.builder.model.try_get_property(self.entity, &name) {
            Provenance::raise(&mut self.builder.provenance.properties, id, source);
            self.clear_member_ignore(&name);
            return Ok(Some(id));
        }

        let entity = self.builder.model.entity(self.entity);
        let ty = match &property {
            PropertyRef::Member(member) => match entity.member(&member.name) {
                Some(member) => member.ty,
                None => {
                    return Err(Error::NoBackingMember {
                        property: name,
                        entity: self.entity_name(),
                    })
                }
            },
            PropertyRef::Named(_) => match entity.member(&name) {
                Some(member) => member.ty,
                None if entity.is_shadow() => {
                    return Err(Error::PropertyNotFound {
                        property: name,
                        entity: self.entity_name(),
                    })
                }
                None => {
                    return Err(Error::NoBackingMember {
                        property: name,
                        entity: self.entity_name(),
                    })
                }
            },
        };

        let id = self.builder.model.add_property(self.entity, &name, ty, false);
        self.builder.provenance.properties.insert(id, source);
        self.clear_member_ignore(&name);
        Ok(Some(id))
    }

    /// Get or add a property with an explicit type.
    ///
    /// Binds to a backing member of the same name when one exists; otherwise
    /// creates a shadow property of the given type. This is the only way to
    /// declare properties on a shadow entity.
    pub fn property_with_type(
        &mut self,
        name: &str,
        ty: ScalarType,
        source: ConfigurationSource,
    ) -> Result<Option<PropertyId>, Error> {
        if let Some(ignored) = self.member_ignored(name) {
            if ignored >= source {
                if ignored == ConfigurationSource::Explicit
                    && source == ConfigurationSource::Explicit
                {
                    return Err(Error::PropertyIgnoredExplicitly {
                        property: name.to_string(),
                        entity: self.entity_name(),
                    });
                }
                return Ok(None);
            }
        }

        if let Some(id) = self.builder.model.try_get_property(self.entity, name) {
            Provenance::raise(&mut self.builder.provenance.properties, id, source);
            self.clear_member_ignore(name);
            return Ok(Some(id));
        }

        let (ty, shadow) = match self.builder.model.entity(self.entity).member(name) {
            Some(member) => (member.ty, false),
            None => (ty, true),
        };
        let id = self.builder.model.add_property(self.entity, name, ty, shadow);
        self.builder.provenance.properties.insert(id, source);
        self.clear_member_ignore(name);
        Ok(Some(id))
    }

    /// Resolve a list of property references, creating missing properties.
    ///
    /// Validates every reference before creating anything, so a bad
    /// reference leaves the model unchanged. Returns `Ok(None)` when any
    /// name is blocked by an ignore marker at equal or stronger source.
    pub(crate) fn resolve_properties(
        &mut self,
        properties: &[PropertyRef],
        source: ConfigurationSource,
    ) -> Result<Option<Vec<PropertyId>>, Error> {
        for property in properties {
            if self
                .member_ignored(property.name())
                .is_some_and(|ignored| ignored >= source)
            {
                return Ok(None);
            }
        }
        for property in properties {
            let name = property.name();
            if self.builder.model.try_get_property(self.entity, name).is_some() {
                continue;
            }
            let entity = self.builder.model.entity(self.entity);
            if entity.member(name).is_none() {
                if entity.is_shadow() {
                    return Err(Error::PropertyNotFound {
                        property: name.to_string(),
                        entity: self.entity_name(),
                    });
                }
                return Err(Error::NoBackingMember {
                    property: name.to_string(),
                    entity: self.entity_name(),
                });
            }
        }

        let mut ids = Vec::with_capacity(properties.len());
        for property in properties {
            match self.property(property.clone(), source)? {
                Some(id) => ids.push(id),
                None => return Ok(None),
            }
        }
        Ok(Some(ids))
    }

    /// Get or add a candidate key over the given properties.
    ///
    /// A key over the same ordered property set is reused with its source
    /// raised.
    pub fn key(
        &mut self,
        properties: &[PropertyRef],
        source: ConfigurationSource,
    ) -> Result<Option<KeyId>, Error> {
        let Some(props) = self.resolve_properties(properties, source)? else {
            return Ok(None);
        };
        if let Some(id) = self.builder.model.find_key(self.entity, &props) {
            Provenance::raise(&mut self.builder.provenance.keys, id, source);
            return Ok(Some(id));
        }
        let id = self.builder.model.add_key(self.entity, props);
        self.builder.provenance.keys.insert(id, source);
        Ok(Some(id))
    }

    /// Get or designate the primary key.
    ///
    /// Re-declaring the current primary key's property set raises its source
    /// and returns it. Redesignating over a different set requires a source
    /// strictly stronger than the current designation and removes the old
    /// key (with its referencing foreign keys); the whole redesignation is
    /// refused up front if any of that removal would be refused.
    pub fn primary_key(
        &mut self,
        properties: &[PropertyRef],
        source: ConfigurationSource,
    ) -> Result<Option<KeyId>, Error> {
        let Some(props) = self.resolve_properties(properties, source)? else {
            return Ok(None);
        };

        let current = self.builder.model.get_primary_key(self.entity);
        if let Some(pk) = current {
            if self.builder.model.key(pk).properties == props {
                Provenance::raise(&mut self.builder.provenance.keys, pk, source);
                return Ok(Some(pk));
            }
            if source <= self.builder.key_source_or_explicit(pk) {
                return Ok(None);
            }
            if !self.builder.can_remove_key(pk, source) {
                return Ok(None);
            }
        }

        // Designate the new key before removing the old one so properties
        // shared between the two stay in use throughout.
        let id = match self.builder.model.find_key(self.entity, &props) {
            Some(id) => {
                Provenance::raise(&mut self.builder.provenance.keys, id, source);
                id
            }
            None => {
                let id = self.builder.model.add_key(self.entity, props);
                self.builder.provenance.keys.insert(id, source);
                id
            }
        };
        if let Some(pk) = current {
            self.builder.remove_key_internal(pk, source);
        }
        self.builder.model.set_primary_key(self.entity, Some(id));
        debug!(entity = %self.entity_name(), %source, "designated primary key");
        Ok(Some(id))
    }

    /// Get or add an index over the given properties.
    ///
    /// An index over the same ordered property set is reused with its source
    /// raised.
    pub fn index(
        &mut self,
        properties: &[PropertyRef],
        source: ConfigurationSource,
    ) -> Result<Option<IndexId>, Error> {
        let Some(props) = self.resolve_properties(properties, source)? else {
            return Ok(None);
        };
        if let Some(id) = self.builder.model.find_index(self.entity, &props) {
            Provenance::raise(&mut self.builder.provenance.indexes, id, source);
            return Ok(Some(id));
        }
        let id = self.builder.model.add_index(self.entity, props);
        self.builder.provenance.indexes.insert(id, source);
        Ok(Some(id))
    }

    /// Remove a key of this entity.
    ///
    /// Refused when `source` is weaker than the key's recorded source or
    /// that of any foreign key referencing it. Returns the recorded source
    /// of the removed key.
    pub fn remove_key(
        &mut self,
        key: KeyId,
        source: ConfigurationSource,
    ) -> Option<ConfigurationSource> {
        debug_assert_eq!(self.builder.model.key(key).entity, self.entity);
        let recorded = self.builder.key_source_or_explicit(key);
        if !self.builder.can_remove_key(key, source) {
            return None;
        }
        self.builder.remove_key_internal(key, source);
        Some(recorded)
    }

    /// Remove an index of this entity. Returns its recorded source, or
    /// `None` when `source` is too weak.
    pub fn remove_index(
        &mut self,
        index: IndexId,
        source: ConfigurationSource,
    ) -> Option<ConfigurationSource> {
        debug_assert_eq!(self.builder.model.index(index).entity, self.entity);
        let recorded = self.builder.index_source_or_explicit(index);
        if !source.overrides(Some(recorded)) {
            return None;
        }
        self.builder.remove_index_internal(index, source);
        Some(recorded)
    }

    /// Remove a foreign key this entity depends through. Attached
    /// navigations go with it. Returns its recorded source, or `None` when
    /// `source` is too weak.
    pub fn remove_relationship(
        &mut self,
        foreign_key: ForeignKeyId,
        source: ConfigurationSource,
    ) -> Option<ConfigurationSource> {
        debug_assert_eq!(
            self.builder.model.foreign_key(foreign_key).dependent,
            self.entity
        );
        let recorded = self.builder.foreign_key_source_or_explicit(foreign_key);
        if !source.overrides(Some(recorded)) {
            return None;
        }
        self.builder.remove_foreign_key_internal(foreign_key, source);
        Some(recorded)
    }

    /// Ignore a member name on this entity.
    ///
    /// Removes a live property of this name together with every key, index
    /// and foreign key using it, or a live navigation of this name together
    /// with its foreign key; then records the ignore marker. The whole
    /// cascade is validated before anything is removed. Ignoring a name with
    /// no live member just records the marker.
    pub fn ignore(&mut self, name: &str, source: ConfigurationSource) -> Result<bool, Error> {
        if let Some(property) = self.builder.model.try_get_property(self.entity, name) {
            let recorded = self.builder.property_source_or_explicit(property);
            if recorded > source {
                return Ok(false);
            }
            if recorded == ConfigurationSource::Explicit {
                return Err(Error::PropertyAddedExplicitly {
                    property: name.to_string(),
                    entity: self.entity_name(),
                });
            }

            let keys: Vec<KeyId> = self
                .builder
                .model
                .entity(self.entity)
                .key_ids()
                .iter()
                .copied()
                .filter(|&k| self.builder.model.key(k).properties.contains(&property))
                .collect();
            let indexes: Vec<IndexId> = self
                .builder
                .model
                .entity(self.entity)
                .index_ids()
                .iter()
                .copied()
                .filter(|&i| self.builder.model.index(i).properties.contains(&property))
                .collect();
            let foreign_keys: Vec<ForeignKeyId> = self
                .builder
                .model
                .entity(self.entity)
                .foreign_key_ids()
                .iter()
                .copied()
                .filter(|&f| {
                    self.builder
                        .model
                        .foreign_key(f)
                        .properties
                        .contains(&property)
                })
                .collect();

            for &key in &keys {
                if !self.builder.can_remove_key(key, source) {
                    return Ok(false);
                }
            }
            for &index in &indexes {
                if !source.overrides(Some(self.builder.index_source_or_explicit(index))) {
                    return Ok(false);
                }
            }
            for &fk in &foreign_keys {
                if !source.overrides(Some(self.builder.foreign_key_source_or_explicit(fk))) {
                    return Ok(false);
                }
            }

            for fk in foreign_keys {
                if self.builder.model.contains_foreign_key(fk) {
                    self.builder.remove_foreign_key_internal(fk, source);
                }
            }
            for key in keys {
                if self.builder.model.contains_key(key) {
                    self.builder.remove_key_internal(key, source);
                }
            }
            for index in indexes {
                if self.builder.model.contains_index(index) {
                    self.builder.remove_index_internal(index, source);
                }
            }
            // The cascade's garbage collection may have taken the property
            // already.
            if self.builder.model.contains_property(property) {
                self.builder.model.remove_property(property);
                self.builder.provenance.properties.remove(&property);
            }
            debug!(entity = %self.entity_name(), member = name, %source, "removed ignored property");
        } else if let Some(navigation) = self.builder.model.try_get_navigation(self.entity, name) {
            let recorded = self.builder.navigation_source_or_explicit(navigation);
            if recorded > source {
                return Ok(false);
            }
            if recorded == ConfigurationSource::Explicit {
                return Err(Error::NavigationAddedExplicitly {
                    navigation: name.to_string(),
                    entity: self.entity_name(),
                });
            }
            let fk = self.builder.model.navigation(navigation).foreign_key;
            if !source.overrides(Some(self.builder.foreign_key_source_or_explicit(fk))) {
                return Ok(false);
            }
            self.builder.remove_foreign_key_internal(fk, source);
            debug!(entity = %self.entity_name(), member = name, %source, "removed ignored navigation");
        }

        Provenance::raise(
            &mut self.builder.provenance.ignored_members,
            (self.entity, name.to_string()),
            source,
        );
        Ok(true)
    }
}
