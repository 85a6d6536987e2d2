//! Value types and element identities.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Scalar value types a property can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
    /// Boolean value.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point.
    Float64,
    /// UTF-8 string.
    String,
    /// Binary data.
    Bytes,
    /// Timestamp (microseconds since Unix epoch).
    Timestamp,
    /// UUID (128-bit identifier).
    Uuid,
}

/// A member of a backing type: a name paired with its value type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Member name.
    pub name: String,
    /// Member value type.
    pub ty: ScalarType,
}

impl Member {
    /// Create a member descriptor.
    pub fn new(name: impl Into<String>, ty: ScalarType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A caller-described backing type for an entity.
///
/// This is the in-model stand-in for the application struct being mapped:
/// entity types built from a `BackingType` resolve property names against its
/// members, while entity types declared by name alone are shadow types with
/// no members at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackingType {
    /// Type name (unique within the model).
    pub name: String,
    /// Member descriptors in declaration order.
    pub members: Vec<Member>,
}

impl BackingType {
    /// Create a backing type with no members.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Add a member.
    pub fn with_member(mut self, name: impl Into<String>, ty: ScalarType) -> Self {
        self.members.push(Member::new(name, ty));
        self
    }

    /// Look up a member by name.
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Identity of an entity type: backed by a described type, or name-only
/// (shadow entity).
#[derive(Debug, Clone)]
pub enum EntityRef {
    /// An entity backed by a caller-described type.
    Backed(Arc<BackingType>),
    /// A shadow entity identified by name alone.
    Named(String),
}

impl EntityRef {
    /// The entity type name this reference resolves to.
    pub fn name(&self) -> &str {
        match self {
            EntityRef::Backed(backing) => &backing.name,
            EntityRef::Named(name) => name,
        }
    }
}

impl From<Arc<BackingType>> for EntityRef {
    fn from(backing: Arc<BackingType>) -> Self {
        EntityRef::Backed(backing)
    }
}

impl From<&Arc<BackingType>> for EntityRef {
    fn from(backing: &Arc<BackingType>) -> Self {
        EntityRef::Backed(Arc::clone(backing))
    }
}

impl From<&str> for EntityRef {
    fn from(name: &str) -> Self {
        EntityRef::Named(name.to_string())
    }
}

impl From<String> for EntityRef {
    fn from(name: String) -> Self {
        EntityRef::Named(name)
    }
}

/// Identity of a property: a member handle (name plus type, taken from the
/// backing type) or a plain name resolved against the entity.
#[derive(Debug, Clone)]
pub enum PropertyRef {
    /// A member handle from the backing type.
    Member(Member),
    /// A plain property name.
    Named(String),
}

impl PropertyRef {
    /// The property name this reference resolves to.
    pub fn name(&self) -> &str {
        match self {
            PropertyRef::Member(member) => &member.name,
            PropertyRef::Named(name) => name,
        }
    }
}

impl From<Member> for PropertyRef {
    fn from(member: Member) -> Self {
        PropertyRef::Member(member)
    }
}

impl From<&Member> for PropertyRef {
    fn from(member: &Member) -> Self {
        PropertyRef::Member(member.clone())
    }
}

impl From<&str> for PropertyRef {
    fn from(name: &str) -> Self {
        PropertyRef::Named(name.to_string())
    }
}

impl From<String> for PropertyRef {
    fn from(name: String) -> Self {
        PropertyRef::Named(name)
    }
}
