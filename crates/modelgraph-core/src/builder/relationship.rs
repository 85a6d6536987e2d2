//! Foreign key and navigation builder operations.

use tracing::debug;

use crate::builder::{EntityBuilder, ModelBuilder, Provenance};
use crate::error::Error;
use crate::metadata::{
    EntityId, EntityRef, ForeignKeyId, KeyId, PropertyId, PropertyRef, ScalarType,
};
use crate::source::ConfigurationSource;

impl EntityBuilder<'_> {
    /// Get or add a foreign key from this entity to a principal.
    ///
    /// The given properties must pair positionally with a candidate key of
    /// the principal by count and value type; the primary key is preferred.
    /// Returns `Ok(None)` when the principal is blocked by an ignore marker
    /// or no compatible candidate key exists. A foreign key over the same
    /// properties and principal key is reused with its source raised.
    pub fn foreign_key(
        &mut self,
        principal: impl Into<EntityRef>,
        properties: &[PropertyRef],
        source: ConfigurationSource,
    ) -> Result<Option<ForeignKeyId>, Error> {
        let Some(principal_id) = self.builder.entity(principal, source)? else {
            return Ok(None);
        };
        let Some(props) = self.resolve_properties(properties, source)? else {
            return Ok(None);
        };
        let Some(principal_key) = self.builder.find_principal_key(principal_id, &props) else {
            return Ok(None);
        };

        if let Some(id) = self
            .builder
            .model
            .find_foreign_key(self.entity, &props, principal_key)
        {
            Provenance::raise(&mut self.builder.provenance.foreign_keys, id, source);
            return Ok(Some(id));
        }

        let id = self.builder.model.add_foreign_key(
            self.entity,
            props,
            principal_id,
            principal_key,
            false,
            false,
        );
        self.builder.provenance.foreign_keys.insert(id, source);
        debug!(
            dependent = %self.builder.model.entity(self.entity).name,
            principal = %self.builder.model.entity(principal_id).name,
            %source,
            "added foreign key"
        );
        Ok(Some(id))
    }

    /// Set or clear one navigation slot of a foreign key.
    ///
    /// The navigation lands on the dependent when `to_principal` is true,
    /// otherwise on the principal. `None` clears the slot. A navigation of
    /// the same name on the same slot is re-declared in place; an existing
    /// navigation of that name elsewhere on the entity loses only to a
    /// strictly stronger request, and is then detached from its own foreign
    /// key. Attaching a new navigation needs a source at least as strong as
    /// the foreign key's.
    pub fn navigation(
        &mut self,
        name: Option<&str>,
        foreign_key: ForeignKeyId,
        to_principal: bool,
        source: ConfigurationSource,
    ) -> Result<bool, Error> {
        let (owning, slot) = {
            let fk = self.builder.model.foreign_key(foreign_key);
            if to_principal {
                (fk.dependent, fk.to_principal)
            } else {
                (fk.principal, fk.to_dependent)
            }
        };
        debug_assert_eq!(owning, self.entity);

        let Some(name) = name else {
            if let Some(existing) = slot {
                let recorded = self.builder.navigation_source_or_explicit(existing);
                if !source.overrides(Some(recorded)) {
                    return Ok(false);
                }
                self.builder.model.remove_navigation(existing);
                self.builder.provenance.navigations.remove(&existing);
            }
            return Ok(true);
        };

        let owning_name = self.builder.model.entity(owning).name.clone();
        if let Some(&ignored) = self
            .builder
            .provenance
            .ignored_members
            .get(&(owning, name.to_string()))
        {
            if ignored >= source {
                if ignored == ConfigurationSource::Explicit
                    && source == ConfigurationSource::Explicit
                {
                    return Err(Error::NavigationIgnoredExplicitly {
                        navigation: name.to_string(),
                        entity: owning_name,
                    });
                }
                return Ok(false);
            }
        }

        if let Some(existing) = slot {
            if self.builder.model.navigation(existing).name == name {
                Provenance::raise(&mut self.builder.provenance.navigations, existing, source);
                self.builder
                    .provenance
                    .ignored_members
                    .remove(&(owning, name.to_string()));
                return Ok(true);
            }
        }

        // A same-named navigation elsewhere on the entity keeps its place
        // unless strictly outranked.
        let conflict = self.builder.model.try_get_navigation(owning, name);
        if let Some(conflict) = conflict {
            if self.builder.navigation_source_or_explicit(conflict) >= source {
                return Ok(false);
            }
        }
        if source < self.builder.foreign_key_source_or_explicit(foreign_key) {
            return Ok(false);
        }
        if let Some(existing) = slot {
            if !source.overrides(Some(self.builder.navigation_source_or_explicit(existing))) {
                return Ok(false);
            }
        }

        self.builder
            .provenance
            .ignored_members
            .remove(&(owning, name.to_string()));
        if let Some(conflict) = conflict {
            self.builder.model.remove_navigation(conflict);
            self.builder.provenance.navigations.remove(&conflict);
        }
        if let Some(existing) = slot {
            if self.builder.model.contains_navigation(existing) {
                self.builder.model.remove_navigation(existing);
                self.builder.provenance.navigations.remove(&existing);
            }
        }
        let id = self
            .builder
            .model
            .add_navigation(name, foreign_key, to_principal);
        self.builder.provenance.navigations.insert(id, source);
        debug!(entity = %owning_name, navigation = name, %source, "set navigation");
        Ok(true)
    }

    /// Whether a navigation of this name could be added to this entity at
    /// the given source without displacing anything.
    pub fn can_add_navigation(&self, name: &str, source: ConfigurationSource) -> bool {
        if self
            .builder
            .provenance
            .ignored_members
            .get(&(self.entity, name.to_string()))
            .is_some_and(|&ignored| ignored >= source)
        {
            return false;
        }
        self.builder.model.try_get_navigation(self.entity, name).is_none()
    }
}

impl ModelBuilder {
    /// Get or add a relationship between two entities, with optional
    /// navigations on both ends.
    ///
    /// When a navigation name is given and a foreign key between the same
    /// entities already carries exactly these navigation names, it is reused
    /// with sources raised; a request that overrides the foreign key's
    /// recorded source also rewrites its uniqueness and requiredness flags. Otherwise a new foreign key is created: the
    /// principal's primary key is used (a conventional `Id` key is created
    /// when there is none) and fresh shadow properties are added on the
    /// dependent to mirror it. Both navigation assignments are validated
    /// before anything is created, so a refused navigation leaves no foreign
    /// key behind.
    #[allow(clippy::too_many_arguments)]
    pub fn relationship(
        &mut self,
        principal: impl Into<EntityRef>,
        dependent: impl Into<EntityRef>,
        nav_to_principal: Option<&str>,
        nav_to_dependent: Option<&str>,
        source: ConfigurationSource,
        is_unique: bool,
        is_required: bool,
    ) -> Result<Option<ForeignKeyId>, Error> {
        let Some(principal_id) = self.entity(principal, source)? else {
            return Ok(None);
        };
        let Some(dependent_id) = self.entity(dependent, source)? else {
            return Ok(None);
        };

        if nav_to_principal.is_some() || nav_to_dependent.is_some() {
            if let Some(fk) =
                self.find_relationship(principal_id, dependent_id, nav_to_principal, nav_to_dependent)
            {
                // The later declaration wins on the flags too, when strong
                // enough to override the foreign key.
                let recorded = self.foreign_key_source_or_explicit(fk);
                Provenance::raise(&mut self.provenance.foreign_keys, fk, source);
                if source.overrides(Some(recorded)) {
                    self.model.set_foreign_key_flags(fk, is_unique, is_required);
                }
                let navigations = {
                    let fk = self.model.foreign_key(fk);
                    [fk.to_principal, fk.to_dependent]
                };
                for nav in navigations.into_iter().flatten() {
                    Provenance::raise(&mut self.provenance.navigations, nav, source);
                }
                return Ok(Some(fk));
            }
        }

        let ends = [
            (dependent_id, nav_to_principal),
            (principal_id, nav_to_dependent),
        ];
        for (owning, name) in ends {
            let Some(name) = name else { continue };
            if let Some(&ignored) = self
                .provenance
                .ignored_members
                .get(&(owning, name.to_string()))
            {
                if ignored >= source {
                    if ignored == ConfigurationSource::Explicit
                        && source == ConfigurationSource::Explicit
                    {
                        return Err(Error::NavigationIgnoredExplicitly {
                            navigation: name.to_string(),
                            entity: self.model.entity(owning).name.clone(),
                        });
                    }
                    return Ok(None);
                }
            }
            if let Some(conflict) = self.model.try_get_navigation(owning, name) {
                if self.navigation_source_or_explicit(conflict) >= source {
                    return Ok(None);
                }
            }
        }

        let principal_key = match self.model.get_primary_key(principal_id) {
            Some(pk) => pk,
            None => {
                let Some(key) = self.conventional_primary_key(principal_id, source)? else {
                    return Ok(None);
                };
                key
            }
        };

        let key_props = self.model.key(principal_key).properties.clone();
        let principal_name = self.model.entity(principal_id).name.clone();
        let mut fk_props = Vec::with_capacity(key_props.len());
        for key_prop in key_props {
            let (base, ty) = {
                let prop = self.model.property(key_prop);
                (format!("{principal_name}{}", prop.name), prop.ty)
            };
            let name = self.fresh_property_name(dependent_id, &base, source);
            self.provenance
                .ignored_members
                .remove(&(dependent_id, name.clone()));
            let id = self.model.add_property(dependent_id, name, ty, true);
            self.provenance.properties.insert(id, source);
            fk_props.push(id);
        }

        let fk = self.model.add_foreign_key(
            dependent_id,
            fk_props,
            principal_id,
            principal_key,
            is_unique,
            is_required,
        );
        self.provenance.foreign_keys.insert(fk, source);

        for (owning, name, to_principal) in [
            (dependent_id, nav_to_principal, true),
            (principal_id, nav_to_dependent, false),
        ] {
            let Some(name) = name else { continue };
            self.provenance
                .ignored_members
                .remove(&(owning, name.to_string()));
            if let Some(conflict) = self.model.try_get_navigation(owning, name) {
                self.model.remove_navigation(conflict);
                self.provenance.navigations.remove(&conflict);
            }
            let nav = self.model.add_navigation(name, fk, to_principal);
            self.provenance.navigations.insert(nav, source);
        }
        debug!(
            principal = %principal_name,
            dependent = %self.model.entity(dependent_id).name,
            %source,
            "added relationship"
        );
        Ok(Some(fk))
    }

    /// Find a foreign key between the two entities carrying exactly these
    /// navigation names.
    pub(crate) fn find_relationship(
        &self,
        principal: EntityId,
        dependent: EntityId,
        nav_to_principal: Option<&str>,
        nav_to_dependent: Option<&str>,
    ) -> Option<ForeignKeyId> {
        self.model
            .entity(dependent)
            .foreign_key_ids()
            .iter()
            .copied()
            .find(|&id| {
                let fk = self.model.foreign_key(id);
                fk.principal == principal
                    && fk
                        .to_principal
                        .map(|n| self.model.navigation(n).name.as_str())
                        == nav_to_principal
                    && fk
                        .to_dependent
                        .map(|n| self.model.navigation(n).name.as_str())
                        == nav_to_dependent
            })
    }

    /// Find a candidate key of `principal` compatible with the given
    /// dependent properties: same count, same value types in order. The
    /// primary key is preferred over other candidate keys.
    pub(crate) fn find_principal_key(
        &self,
        principal: EntityId,
        properties: &[PropertyId],
    ) -> Option<KeyId> {
        let compatible = |key: KeyId| {
            let key_props = &self.model.key(key).properties;
            key_props.len() == properties.len()
                && key_props
                    .iter()
                    .zip(properties)
                    .all(|(&k, &p)| self.model.property(k).ty == self.model.property(p).ty)
        };
        if let Some(pk) = self.model.get_primary_key(principal) {
            if compatible(pk) {
                return Some(pk);
            }
        }
        self.model
            .entity(principal)
            .key_ids()
            .iter()
            .copied()
            .find(|&key| Some(key) != self.model.get_primary_key(principal) && compatible(key))
    }

    /// Create the conventional `Id` primary key on an entity that has none.
    fn conventional_primary_key(
        &mut self,
        entity: EntityId,
        source: ConfigurationSource,
    ) -> Result<Option<KeyId>, Error> {
        let Some(id_prop) = self
            .entity_builder(entity)
            .property_with_type("Id", ScalarType::Int64, source)?
        else {
            return Ok(None);
        };
        let key = match self.model.find_key(entity, &[id_prop]) {
            Some(key) => {
                Provenance::raise(&mut self.provenance.keys, key, source);
                key
            }
            None => {
                let key = self.model.add_key(entity, vec![id_prop]);
                self.provenance.keys.insert(key, source);
                key
            }
        };
        self.model.set_primary_key(entity, Some(key));
        Ok(Some(key))
    }

    /// First property name derived from `base` that is neither taken nor
    /// blocked by an ignore marker the given source cannot clear.
    fn fresh_property_name(
        &self,
        entity: EntityId,
        base: &str,
        source: ConfigurationSource,
    ) -> String {
        let mut candidate = base.to_string();
        let mut suffix = 0usize;
        loop {
            let taken = self.model.try_get_property(entity, &candidate).is_some()
                || self
                    .provenance
                    .ignored_members
                    .get(&(entity, candidate.clone()))
                    .is_some_and(|&ignored| ignored >= source);
            if !taken {
                return candidate;
            }
            suffix += 1;
            candidate = format!("{base}{suffix}");
        }
    }
}
