//! Modelgraph core - metadata graph and configuration-source precedence engine.
//!
//! This crate builds a single consistent object-relational mapping model out
//! of incremental, possibly conflicting declarations of entity types,
//! properties, keys, indexes, foreign keys and navigations. Declarations
//! arrive from three trust levels (convention inference, annotations,
//! explicit code); builders resolve conflicts by provenance and cascade
//! cleanup so the graph stays well formed after every mutation.

pub mod builder;
pub mod error;
pub mod metadata;
pub mod source;

pub use builder::{EntityBuilder, ModelBuilder};
pub use error::Error;
pub use metadata::{
    BackingType, EntityId, EntityRef, EntityType, ForeignKey, ForeignKeyId, Index, IndexId, Key,
    KeyId, Member, Model, Navigation, NavigationId, Property, PropertyId, PropertyRef, ScalarType,
};
pub use source::ConfigurationSource;
