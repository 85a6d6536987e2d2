//! Builders: the configuration-source precedence engine over the metadata
//! graph.
//!
//! All mutation goes through [`ModelBuilder`] and [`EntityBuilder`]. Each
//! operation carries a [`crate::source::ConfigurationSource`]; conflicts are
//! resolved by provenance and cascading cleanup keeps the graph consistent
//! after every change.

mod entity_builder;
mod model_builder;
mod provenance;
mod relationship;

pub use entity_builder::EntityBuilder;
pub use model_builder::ModelBuilder;
pub(crate) use provenance::Provenance;
