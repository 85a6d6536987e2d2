//! The metadata graph: entity types, properties, keys, indexes, foreign keys
//! and navigations, plus the arena that owns them.
//!
//! The graph holds structure only. Declaration provenance lives in the
//! builder layer; see [`crate::builder`].

mod entity;
mod foreign_key;
mod index;
mod key;
mod model;
mod navigation;
mod property;
mod types;

pub use entity::EntityType;
pub use foreign_key::ForeignKey;
pub use index::Index;
pub use key::Key;
pub use model::{EntityId, ForeignKeyId, IndexId, KeyId, Model, NavigationId, PropertyId};
pub use navigation::Navigation;
pub use property::Property;
pub use types::{BackingType, EntityRef, Member, PropertyRef, ScalarType};
