//! Recorded declaration sources for every live element.

use std::collections::HashMap;

use crate::metadata::{EntityId, ForeignKeyId, IndexId, KeyId, NavigationId, PropertyId};
use crate::source::ConfigurationSource;

/// Side table mapping each live element id to the strongest source that has
/// declared it, plus active ignore markers.
///
/// The graph itself stays provenance-free. Entries are removed when their
/// element is removed; a missing entry for a live element is treated as
/// explicit by the builders.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Provenance {
    pub(crate) entities: HashMap<EntityId, ConfigurationSource>,
    pub(crate) properties: HashMap<PropertyId, ConfigurationSource>,
    pub(crate) keys: HashMap<KeyId, ConfigurationSource>,
    pub(crate) indexes: HashMap<IndexId, ConfigurationSource>,
    pub(crate) foreign_keys: HashMap<ForeignKeyId, ConfigurationSource>,
    pub(crate) navigations: HashMap<NavigationId, ConfigurationSource>,
    /// Ignored entity type names, by name.
    pub(crate) ignored_entities: HashMap<String, ConfigurationSource>,
    /// Ignored member names, per entity.
    pub(crate) ignored_members: HashMap<(EntityId, String), ConfigurationSource>,
}

impl Provenance {
    /// Record `source` for a map entry, keeping the stronger of the two when
    /// an entry already exists.
    pub(crate) fn raise<K: std::hash::Hash + Eq>(
        map: &mut HashMap<K, ConfigurationSource>,
        key: K,
        source: ConfigurationSource,
    ) -> ConfigurationSource {
        let entry = map.entry(key).or_insert(source);
        *entry = (*entry).max(source);
        *entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_is_monotonic() {
        let mut map = HashMap::new();
        Provenance::raise(&mut map, EntityId(0), ConfigurationSource::DataAnnotation);
        Provenance::raise(&mut map, EntityId(0), ConfigurationSource::Convention);
        assert_eq!(
            map[&EntityId(0)],
            ConfigurationSource::DataAnnotation
        );
        Provenance::raise(&mut map, EntityId(0), ConfigurationSource::Explicit);
        assert_eq!(map[&EntityId(0)], ConfigurationSource::Explicit);
    }
}
