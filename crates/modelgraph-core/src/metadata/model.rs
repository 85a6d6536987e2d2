//! Arena ownership of the metadata graph.

use std::sync::Arc;

use crate::metadata::{
    BackingType, EntityType, ForeignKey, Index, Key, Navigation, Property, ScalarType,
};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);
    };
}

id_type!(
    /// Stable handle to an entity type.
    EntityId
);
id_type!(
    /// Stable handle to a property.
    PropertyId
);
id_type!(
    /// Stable handle to a key.
    KeyId
);
id_type!(
    /// Stable handle to an index.
    IndexId
);
id_type!(
    /// Stable handle to a foreign key.
    ForeignKeyId
);
id_type!(
    /// Stable handle to a navigation.
    NavigationId
);

/// The metadata graph.
///
/// Elements live in per-kind arenas. Removal tombstones the slot; slot
/// indexes are never reused, so an id stays distinct for the life of the
/// model and a stale id can be detected. The graph records structure only;
/// declaration provenance lives in the builder layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    entities: Vec<Option<EntityType>>,
    properties: Vec<Option<Property>>,
    keys: Vec<Option<Key>>,
    indexes: Vec<Option<Index>>,
    foreign_keys: Vec<Option<ForeignKey>>,
    navigations: Vec<Option<Navigation>>,
}

impl Model {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids of all live entity types, in creation order.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|_| EntityId(i)))
            .collect()
    }

    /// The entity type for a live id.
    ///
    /// Panics on a stale or foreign id; ids handed out by this model stay
    /// valid until the element is removed.
    pub fn entity(&self, id: EntityId) -> &EntityType {
        self.entities[id.0].as_ref().expect("stale entity id")
    }

    /// Find a live entity type by name.
    pub fn find_entity(&self, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .enumerate()
            .find(|(_, slot)| slot.as_ref().is_some_and(|e| e.name == name))
            .map(|(i, _)| EntityId(i))
    }

    /// The property for a live id. Panics on a stale id.
    pub fn property(&self, id: PropertyId) -> &Property {
        self.properties[id.0].as_ref().expect("stale property id")
    }

    /// The key for a live id. Panics on a stale id.
    pub fn key(&self, id: KeyId) -> &Key {
        self.keys[id.0].as_ref().expect("stale key id")
    }

    /// The index for a live id. Panics on a stale id.
    pub fn index(&self, id: IndexId) -> &Index {
        self.indexes[id.0].as_ref().expect("stale index id")
    }

    /// The foreign key for a live id. Panics on a stale id.
    pub fn foreign_key(&self, id: ForeignKeyId) -> &ForeignKey {
        self.foreign_keys[id.0]
            .as_ref()
            .expect("stale foreign key id")
    }

    /// The navigation for a live id. Panics on a stale id.
    pub fn navigation(&self, id: NavigationId) -> &Navigation {
        self.navigations[id.0].as_ref().expect("stale navigation id")
    }

    /// Whether an entity id is still live.
    pub fn contains_entity(&self, id: EntityId) -> bool {
        self.entities.get(id.0).is_some_and(Option::is_some)
    }

    /// Whether a property id is still live.
    pub fn contains_property(&self, id: PropertyId) -> bool {
        self.properties.get(id.0).is_some_and(Option::is_some)
    }

    /// Whether a key id is still live.
    pub fn contains_key(&self, id: KeyId) -> bool {
        self.keys.get(id.0).is_some_and(Option::is_some)
    }

    /// Whether an index id is still live.
    pub fn contains_index(&self, id: IndexId) -> bool {
        self.indexes.get(id.0).is_some_and(Option::is_some)
    }

    /// Whether a foreign key id is still live.
    pub fn contains_foreign_key(&self, id: ForeignKeyId) -> bool {
        self.foreign_keys.get(id.0).is_some_and(Option::is_some)
    }

    /// Whether a navigation id is still live.
    pub fn contains_navigation(&self, id: NavigationId) -> bool {
        self.navigations.get(id.0).is_some_and(Option::is_some)
    }

    /// Properties of an entity in declaration order.
    pub fn properties_of(&self, entity: EntityId) -> Vec<(PropertyId, &Property)> {
        self.entity(entity)
            .properties
            .iter()
            .map(|&id| (id, self.property(id)))
            .collect()
    }

    /// Keys of an entity in declaration order.
    pub fn keys_of(&self, entity: EntityId) -> Vec<(KeyId, &Key)> {
        self.entity(entity)
            .keys
            .iter()
            .map(|&id| (id, self.key(id)))
            .collect()
    }

    /// Indexes of an entity in declaration order.
    pub fn indexes_of(&self, entity: EntityId) -> Vec<(IndexId, &Index)> {
        self.entity(entity)
            .indexes
            .iter()
            .map(|&id| (id, self.index(id)))
            .collect()
    }

    /// Dependent-side foreign keys of an entity in declaration order.
    pub fn foreign_keys_of(&self, entity: EntityId) -> Vec<(ForeignKeyId, &ForeignKey)> {
        self.entity(entity)
            .foreign_keys
            .iter()
            .map(|&id| (id, self.foreign_key(id)))
            .collect()
    }

    /// Navigations of an entity in declaration order.
    pub fn navigations_of(&self, entity: EntityId) -> Vec<(NavigationId, &Navigation)> {
        self.entity(entity)
            .navigations
            .iter()
            .map(|&id| (id, self.navigation(id)))
            .collect()
    }

    /// The primary key of an entity, if designated.
    pub fn get_primary_key(&self, entity: EntityId) -> Option<KeyId> {
        self.entity(entity).primary_key
    }

    /// Find a property of an entity by name.
    pub fn try_get_property(&self, entity: EntityId, name: &str) -> Option<PropertyId> {
        self.entity(entity)
            .properties
            .iter()
            .copied()
            .find(|&id| self.property(id).name == name)
    }

    /// Find a navigation of an entity by name.
    pub fn try_get_navigation(&self, entity: EntityId, name: &str) -> Option<NavigationId> {
        self.entity(entity)
            .navigations
            .iter()
            .copied()
            .find(|&id| self.navigation(id).name == name)
    }

    /// All foreign keys whose principal key is `key`.
    pub fn foreign_keys_referencing(&self, key: KeyId) -> Vec<ForeignKeyId> {
        self.foreign_keys
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.as_ref().is_some_and(|fk| fk.principal_key == key))
            .map(|(i, _)| ForeignKeyId(i))
            .collect()
    }

    /// All foreign keys where `entity` is the dependent or the principal.
    pub fn foreign_keys_involving(&self, entity: EntityId) -> Vec<ForeignKeyId> {
        self.foreign_keys
            .iter()
            .enumerate()
            .filter(|(_, slot)| {
                slot.as_ref()
                    .is_some_and(|fk| fk.dependent == entity || fk.principal == entity)
            })
            .map(|(i, _)| ForeignKeyId(i))
            .collect()
    }

    /// Whether a property participates in any key, index or foreign key.
    pub fn property_in_use(&self, property: PropertyId) -> bool {
        let entity = self.entity(self.property(property).entity);
        entity
            .keys
            .iter()
            .any(|&k| self.key(k).properties.contains(&property))
            || entity
                .indexes
                .iter()
                .any(|&i| self.index(i).properties.contains(&property))
            || entity
                .foreign_keys
                .iter()
                .any(|&f| self.foreign_key(f).properties.contains(&property))
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> &mut EntityType {
        self.entities[id.0].as_mut().expect("stale entity id")
    }

    pub(crate) fn add_entity(
        &mut self,
        name: impl Into<String>,
        backing: Option<Arc<BackingType>>,
    ) -> EntityId {
        let id = EntityId(self.entities.len());
        self.entities.push(Some(EntityType::new(name, backing)));
        id
    }

    /// Tombstone an entity slot. The caller has already removed every owned
    /// element.
    pub(crate) fn remove_entity(&mut self, id: EntityId) -> EntityType {
        let entity = self.entities[id.0].take().expect("stale entity id");
        debug_assert!(entity.properties.is_empty());
        debug_assert!(entity.keys.is_empty());
        debug_assert!(entity.indexes.is_empty());
        debug_assert!(entity.foreign_keys.is_empty());
        debug_assert!(entity.navigations.is_empty());
        entity
    }

    pub(crate) fn add_property(
        &mut self,
        entity: EntityId,
        name: impl Into<String>,
        ty: ScalarType,
        shadow: bool,
    ) -> PropertyId {
        let id = PropertyId(self.properties.len());
        self.properties.push(Some(Property {
            entity,
            name: name.into(),
            ty,
            shadow,
        }));
        self.entity_mut(entity).properties.push(id);
        id
    }

    /// Tombstone a property slot. The caller has already removed every key,
    /// index and foreign key using it.
    pub(crate) fn remove_property(&mut self, id: PropertyId) -> Property {
        debug_assert!(!self.property_in_use(id));
        let property = self.properties[id.0].take().expect("stale property id");
        self.entity_mut(property.entity)
            .properties
            .retain(|&p| p != id);
        property
    }

    pub(crate) fn add_key(&mut self, entity: EntityId, properties: Vec<PropertyId>) -> KeyId {
        let id = KeyId(self.keys.len());
        self.keys.push(Some(Key { entity, properties }));
        self.entity_mut(entity).keys.push(id);
        id
    }

    /// Find a live key of `entity` over exactly `properties`, in order.
    pub(crate) fn find_key(&self, entity: EntityId, properties: &[PropertyId]) -> Option<KeyId> {
        self.entity(entity)
            .keys
            .iter()
            .copied()
            .find(|&id| self.key(id).properties == properties)
    }

    /// Tombstone a key slot. The caller has already removed every foreign key
    /// referencing it. Clears the primary key designation when it points at
    /// this key.
    pub(crate) fn remove_key(&mut self, id: KeyId) -> Key {
        debug_assert!(self.foreign_keys_referencing(id).is_empty());
        let key = self.keys[id.0].take().expect("stale key id");
        let entity = self.entity_mut(key.entity);
        entity.keys.retain(|&k| k != id);
        if entity.primary_key == Some(id) {
            entity.primary_key = None;
        }
        key
    }

    pub(crate) fn set_primary_key(&mut self, entity: EntityId, key: Option<KeyId>) {
        self.entity_mut(entity).primary_key = key;
    }

    pub(crate) fn add_index(&mut self, entity: EntityId, properties: Vec<PropertyId>) -> IndexId {
        let id = IndexId(self.indexes.len());
        self.indexes.push(Some(Index { entity, properties }));
        self.entity_mut(entity).indexes.push(id);
        id
    }

    /// Find a live index of `entity` over exactly `properties`, in order.
    pub(crate) fn find_index(
        &self,
        entity: EntityId,
        properties: &[PropertyId],
    ) -> Option<IndexId> {
        self.entity(entity)
            .indexes
            .iter()
            .copied()
            .find(|&id| self.index(id).properties == properties)
    }

    pub(crate) fn remove_index(&mut self, id: IndexId) -> Index {
        let index = self.indexes[id.0].take().expect("stale index id");
        self.entity_mut(index.entity).indexes.retain(|&i| i != id);
        index
    }

    pub(crate) fn add_foreign_key(
        &mut self,
        dependent: EntityId,
        properties: Vec<PropertyId>,
        principal: EntityId,
        principal_key: KeyId,
        is_unique: bool,
        is_required: bool,
    ) -> ForeignKeyId {
        let id = ForeignKeyId(self.foreign_keys.len());
        self.foreign_keys.push(Some(ForeignKey {
            dependent,
            properties,
            principal,
            principal_key,
            is_unique,
            is_required,
            to_principal: None,
            to_dependent: None,
        }));
        self.entity_mut(dependent).foreign_keys.push(id);
        id
    }

    /// Find a live foreign key of `dependent` over exactly `properties`
    /// referencing `principal_key`.
    pub(crate) fn find_foreign_key(
        &self,
        dependent: EntityId,
        properties: &[PropertyId],
        principal_key: KeyId,
    ) -> Option<ForeignKeyId> {
        self.entity(dependent).foreign_keys.iter().copied().find(|&id| {
            let fk = self.foreign_key(id);
            fk.properties == properties && fk.principal_key == principal_key
        })
    }

    pub(crate) fn set_foreign_key_flags(
        &mut self,
        id: ForeignKeyId,
        is_unique: bool,
        is_required: bool,
    ) {
        let fk = self.foreign_keys[id.0]
            .as_mut()
            .expect("stale foreign key id");
        fk.is_unique = is_unique;
        fk.is_required = is_required;
    }

    /// Tombstone a foreign key slot, removing any attached navigations first.
    pub(crate) fn remove_foreign_key(&mut self, id: ForeignKeyId) -> ForeignKey {
        let navs = {
            let fk = self.foreign_key(id);
            [fk.to_principal, fk.to_dependent]
        };
        for nav in navs.into_iter().flatten() {
            self.remove_navigation(nav);
        }
        let fk = self.foreign_keys[id.0].take().expect("stale foreign key id");
        self.entity_mut(fk.dependent).foreign_keys.retain(|&f| f != id);
        fk
    }

    /// Attach a navigation to one slot of a foreign key. The slot must be
    /// vacant and the entity must not already have a navigation of this name.
    pub(crate) fn add_navigation(
        &mut self,
        name: impl Into<String>,
        foreign_key: ForeignKeyId,
        to_principal: bool,
    ) -> NavigationId {
        let fk = self.foreign_key(foreign_key);
        let entity = if to_principal { fk.dependent } else { fk.principal };
        let name = name.into();
        debug_assert!(self.try_get_navigation(entity, &name).is_none());
        let id = NavigationId(self.navigations.len());
        self.navigations.push(Some(Navigation {
            entity,
            name,
            foreign_key,
            to_principal,
        }));
        self.entity_mut(entity).navigations.push(id);
        let fk = self.foreign_keys[foreign_key.0]
            .as_mut()
            .expect("stale foreign key id");
        let slot = if to_principal {
            &mut fk.to_principal
        } else {
            &mut fk.to_dependent
        };
        debug_assert!(slot.is_none());
        *slot = Some(id);
        id
    }

    /// Tombstone a navigation slot, detaching it from its foreign key.
    pub(crate) fn remove_navigation(&mut self, id: NavigationId) -> Navigation {
        let nav = self.navigations[id.0].take().expect("stale navigation id");
        self.entity_mut(nav.entity).navigations.retain(|&n| n != id);
        if let Some(fk) = self.foreign_keys[nav.foreign_key.0].as_mut() {
            if nav.to_principal {
                fk.to_principal = None;
            } else {
                fk.to_dependent = None;
            }
        }
        nav
    }
}
