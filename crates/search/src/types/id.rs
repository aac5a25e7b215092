//! Object identifiers.
//!
//! An [`ObjectId`] names a single domain object by one of several id kinds.
//! The pair of entity kind and id kind forms an [`IdTag`], which is the key
//! used to find the resolver responsible for that id.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Technical id substituted for references to objects that do not exist.
///
/// Real technical ids are positive, so this value never matches an entity.
pub const NOT_FOUND_TECH_ID: i64 = -1;

/// Code substituted when a lookup produced no codes at all.
pub const NOT_FOUND_CODE: &str = "#NOT_FOUND#";

/// The kinds of domain objects a search can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    /// A top-level space.
    Space,
    /// A project inside a space.
    Project,
    /// An experiment (collection) inside a project.
    Experiment,
    /// A sample (object).
    Sample,
    /// A data set.
    DataSet,
    /// A material.
    Material,
    /// A user tag (metaproject).
    Tag,
}

impl EntityKind {
    /// All entity kinds, in registration order.
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Space,
        EntityKind::Project,
        EntityKind::Experiment,
        EntityKind::Sample,
        EntityKind::DataSet,
        EntityKind::Material,
        EntityKind::Tag,
    ];

    /// Entity kinds that carry an entity type.
    pub const TYPED: [EntityKind; 4] = [
        EntityKind::Experiment,
        EntityKind::Sample,
        EntityKind::DataSet,
        EntityKind::Material,
    ];

    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Space => "SPACE",
            EntityKind::Project => "PROJECT",
            EntityKind::Experiment => "EXPERIMENT",
            EntityKind::Sample => "SAMPLE",
            EntityKind::DataSet => "DATA_SET",
            EntityKind::Material => "MATERIAL",
            EntityKind::Tag => "TAG",
        }
    }

    /// Returns true if objects of this kind have an entity type.
    pub fn is_typed(&self) -> bool {
        EntityKind::TYPED.contains(self)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of an id value, without the value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdKind {
    /// Globally unique permanent id.
    PermId,
    /// Numeric database id.
    TechId,
    /// Code-based identifier (unique within the entity kind).
    Code,
    /// Hierarchical identifier such as `/SPACE/PROJECT/EXPERIMENT`.
    Identifier,
}

/// The value of an object id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdValue {
    /// Permanent id.
    PermId(String),
    /// Technical id.
    TechId(i64),
    /// Code.
    Code(String),
    /// Hierarchical identifier.
    Identifier(String),
}

impl IdValue {
    /// Returns the kind of this value.
    pub fn kind(&self) -> IdKind {
        match self {
            IdValue::PermId(_) => IdKind::PermId,
            IdValue::TechId(_) => IdKind::TechId,
            IdValue::Code(_) => IdKind::Code,
            IdValue::Identifier(_) => IdKind::Identifier,
        }
    }
}

impl fmt::Display for IdValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdValue::PermId(v) => write!(f, "PermId({v})"),
            IdValue::TechId(v) => write!(f, "TechId({v})"),
            IdValue::Code(v) => write!(f, "Code({v})"),
            IdValue::Identifier(v) => write!(f, "Identifier({v})"),
        }
    }
}

/// Key for looking up the resolver of an id: entity kind plus id kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdTag {
    /// Entity kind of the referenced object.
    pub entity: EntityKind,
    /// Kind of the id.
    pub id_kind: IdKind,
}

impl IdTag {
    /// Creates a new tag.
    pub fn new(entity: EntityKind, id_kind: IdKind) -> Self {
        Self { entity, id_kind }
    }
}

impl fmt::Display for IdTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", self.entity, self.id_kind)
    }
}

/// An opaque reference to a single domain object.
///
/// # Examples
///
/// ```
/// use labbase_search::types::{EntityKind, IdKind, ObjectId};
///
/// let id = ObjectId::identifier(EntityKind::Experiment, "/LAB/PROJ/EXP1");
/// assert_eq!(id.tag().id_kind, IdKind::Identifier);
/// assert_eq!(id.to_string(), "EXPERIMENT:Identifier(/LAB/PROJ/EXP1)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId {
    /// Entity kind of the referenced object.
    pub entity: EntityKind,
    /// The id value.
    pub value: IdValue,
}

impl ObjectId {
    /// Creates an id from its parts.
    pub fn new(entity: EntityKind, value: IdValue) -> Self {
        Self { entity, value }
    }

    /// Creates a permanent id.
    pub fn perm_id(entity: EntityKind, perm_id: impl Into<String>) -> Self {
        Self::new(entity, IdValue::PermId(perm_id.into()))
    }

    /// Creates a technical id.
    pub fn tech_id(entity: EntityKind, tech_id: i64) -> Self {
        Self::new(entity, IdValue::TechId(tech_id))
    }

    /// Creates a code id.
    pub fn code(entity: EntityKind, code: impl Into<String>) -> Self {
        Self::new(entity, IdValue::Code(code.into()))
    }

    /// Creates a hierarchical identifier.
    pub fn identifier(entity: EntityKind, identifier: impl Into<String>) -> Self {
        Self::new(entity, IdValue::Identifier(identifier.into()))
    }

    /// Returns the resolver lookup tag of this id.
    pub fn tag(&self) -> IdTag {
        IdTag::new(self.entity, self.value.kind())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity, self.value)
    }
}

/// A resolved domain object, as returned by an id resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedObject {
    /// Technical id.
    pub tech_id: i64,
    /// Permanent id, the surrogate key candidates are matched on.
    pub perm_id: String,
    /// Code.
    pub code: String,
}

impl ResolvedObject {
    /// Creates a resolved object.
    pub fn new(tech_id: i64, perm_id: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            tech_id,
            perm_id: perm_id.into(),
            code: code.into(),
        }
    }
}

/// An entity type returned by an entity-type search.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityTypeRecord {
    /// Technical id of the type.
    pub tech_id: i64,
    /// Type code.
    pub code: String,
}

impl EntityTypeRecord {
    /// Creates a type record.
    pub fn new(tech_id: i64, code: impl Into<String>) -> Self {
        Self {
            tech_id,
            code: code.into(),
        }
    }
}
