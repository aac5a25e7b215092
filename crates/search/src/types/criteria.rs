//! The criteria model.
//!
//! A search condition is a tree of [`Criteria`] nodes. Composite nodes combine
//! their children with AND or OR; leaves are typed conditions. Criteria are
//! plain values: they compare, hash and serialize structurally, which is what
//! lets them take part in cache keys.
//!
//! # Examples
//!
//! ```
//! use labbase_search::types::{Criteria, EntityKind, ObjectId, StringMatchKind};
//!
//! let criteria = Criteria::and(vec![
//!     Criteria::codes(["A", "B"]),
//!     Criteria::string_field("name", StringMatchKind::Contains, "x"),
//!     Criteria::entity_type(EntityKind::Sample, Criteria::codes(["CELL_PLATE"])),
//!     Criteria::id(ObjectId::code(EntityKind::Space, "LAB")),
//! ]);
//!
//! assert_eq!(criteria.kind_name(), "composite");
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::id::{EntityKind, ObjectId};
use crate::error::SearchEngineError;

/// Boolean operator of a composite node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SearchOperator {
    /// All children must match.
    #[default]
    And,
    /// At least one child must match.
    Or,
}

impl SearchOperator {
    /// Parses an operator from its wire name.
    ///
    /// Any name other than `AND` / `OR` (case-insensitive) is an
    /// [`SearchEngineError::UnsupportedOperator`] failure.
    pub fn parse(s: &str) -> Result<Self, SearchEngineError> {
        match s.to_ascii_uppercase().as_str() {
            "AND" => Ok(SearchOperator::And),
            "OR" => Ok(SearchOperator::Or),
            _ => Err(SearchEngineError::UnsupportedOperator {
                operator: s.to_string(),
            }),
        }
    }

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOperator::And => "AND",
            SearchOperator::Or => "OR",
        }
    }
}

impl TryFrom<String> for SearchOperator {
    type Error = SearchEngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SearchOperator::parse(&value)
    }
}

impl From<SearchOperator> for String {
    fn from(op: SearchOperator) -> Self {
        op.as_str().to_string()
    }
}

impl fmt::Display for SearchOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a string predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StringMatchKind {
    /// The whole value matches the pattern.
    Equals,
    /// The value starts with the pattern.
    StartsWith,
    /// The value ends with the pattern.
    EndsWith,
    /// The value contains the pattern.
    Contains,
    /// Every value matches.
    Any,
}

impl StringMatchKind {
    /// Parses a predicate kind from its wire name.
    pub fn parse(s: &str) -> Result<Self, SearchEngineError> {
        match s.to_ascii_uppercase().as_str() {
            "EQUALS" | "EQ" => Ok(StringMatchKind::Equals),
            "STARTS_WITH" | "STARTSWITH" => Ok(StringMatchKind::StartsWith),
            "ENDS_WITH" | "ENDSWITH" => Ok(StringMatchKind::EndsWith),
            "CONTAINS" => Ok(StringMatchKind::Contains),
            "ANY" => Ok(StringMatchKind::Any),
            _ => Err(SearchEngineError::UnknownStringPredicate {
                predicate: s.to_string(),
            }),
        }
    }

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            StringMatchKind::Equals => "EQUALS",
            StringMatchKind::StartsWith => "STARTS_WITH",
            StringMatchKind::EndsWith => "ENDS_WITH",
            StringMatchKind::Contains => "CONTAINS",
            StringMatchKind::Any => "ANY",
        }
    }
}

impl TryFrom<String> for StringMatchKind {
    type Error = SearchEngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StringMatchKind::parse(&value)
    }
}

impl From<StringMatchKind> for String {
    fn from(kind: StringMatchKind) -> Self {
        kind.as_str().to_string()
    }
}

/// A typed string predicate: `*` and `?` in the value are wildcards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringPredicate {
    /// How the value is compared.
    pub kind: StringMatchKind,
    /// The pattern; `None` or empty accepts everything.
    #[serde(default)]
    pub value: Option<String>,
}

impl StringPredicate {
    /// Creates a predicate.
    pub fn new(kind: StringMatchKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: Some(value.into()),
        }
    }

    /// A predicate accepting every value.
    pub fn any() -> Self {
        Self {
            kind: StringMatchKind::Any,
            value: None,
        }
    }
}

/// The candidate attribute a code-set criterion compares against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeAttribute {
    /// The candidate's own code.
    #[default]
    Code,
    /// The code of the candidate's entity type.
    TypeCode,
}

/// A composite node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompositeCriteria {
    /// Entity kind this node searches for, if it is an entity-search node.
    #[serde(default)]
    pub entity: Option<EntityKind>,
    /// How children are combined.
    #[serde(default)]
    pub operator: SearchOperator,
    /// Child criteria, in order.
    #[serde(default)]
    pub criteria: Vec<Criteria>,
}

impl CompositeCriteria {
    /// Creates an unscoped composite with the given operator.
    pub fn new(operator: SearchOperator) -> Self {
        Self {
            entity: None,
            operator,
            criteria: Vec::new(),
        }
    }

    /// Creates an entity-search composite (AND by default).
    pub fn search(entity: EntityKind) -> Self {
        Self {
            entity: Some(entity),
            operator: SearchOperator::And,
            criteria: Vec::new(),
        }
    }

    /// Sets the operator.
    pub fn with_operator(mut self, operator: SearchOperator) -> Self {
        self.operator = operator;
        self
    }

    /// Appends a child.
    pub fn with(mut self, criteria: Criteria) -> Self {
        self.criteria.push(criteria);
        self
    }
}

/// Identity criterion: a single object id. An unset id matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdCriterion {
    /// The referenced object.
    #[serde(default)]
    pub id: Option<ObjectId>,
}

/// Identity-set criterion: ids combined with implicit OR. An unset or empty
/// collection matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdSetCriterion {
    /// The referenced objects.
    #[serde(default)]
    pub ids: Option<Vec<ObjectId>>,
}

/// Code-set criterion: exact, case-sensitive code membership.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodesCriterion {
    /// Which candidate attribute is compared.
    #[serde(default)]
    pub attribute: CodeAttribute,
    /// Accepted codes.
    pub codes: BTreeSet<String>,
}

/// String-field criterion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringFieldCriterion {
    /// Name of the textual attribute.
    pub field: String,
    /// The predicate applied to the attribute.
    pub predicate: StringPredicate,
}

/// Entity-type criterion: a sub-tree evaluated over the entity types of a kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityTypeCriterion {
    /// Entity kind whose types are searched.
    pub entity: EntityKind,
    /// Criteria over the types.
    pub criteria: Box<Criteria>,
}

/// Custom predicate, evaluated by a function registered under `name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimpleCriterion {
    /// Name of the registered predicate.
    pub name: String,
    /// Argument passed to the predicate.
    #[serde(default)]
    pub value: String,
}

/// A node of the criteria tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Criteria {
    /// AND / OR over children.
    Composite(CompositeCriteria),
    /// Single object reference.
    Id(IdCriterion),
    /// Set of object references.
    IdSet(IdSetCriterion),
    /// Set of codes.
    Codes(CodesCriterion),
    /// Predicate over a textual attribute.
    StringField(StringFieldCriterion),
    /// Sub-tree over entity types.
    EntityType(EntityTypeCriterion),
    /// Custom predicate.
    Simple(SimpleCriterion),
}

impl Criteria {
    /// AND over the given children.
    pub fn and(criteria: Vec<Criteria>) -> Self {
        Criteria::Composite(CompositeCriteria {
            entity: None,
            operator: SearchOperator::And,
            criteria,
        })
    }

    /// OR over the given children.
    pub fn or(criteria: Vec<Criteria>) -> Self {
        Criteria::Composite(CompositeCriteria {
            entity: None,
            operator: SearchOperator::Or,
            criteria,
        })
    }

    /// Identity criterion for `id`.
    pub fn id(id: ObjectId) -> Self {
        Criteria::Id(IdCriterion { id: Some(id) })
    }

    /// Identity criterion with no id set.
    pub fn any_id() -> Self {
        Criteria::Id(IdCriterion { id: None })
    }

    /// Identity-set criterion.
    pub fn id_set(ids: impl IntoIterator<Item = ObjectId>) -> Self {
        Criteria::IdSet(IdSetCriterion {
            ids: Some(ids.into_iter().collect()),
        })
    }

    /// Code-set criterion over the candidate's own code.
    pub fn codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Criteria::Codes(CodesCriterion {
            attribute: CodeAttribute::Code,
            codes: codes.into_iter().map(Into::into).collect(),
        })
    }

    /// Code-set criterion over the candidate's entity-type code.
    pub fn type_codes<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Criteria::Codes(CodesCriterion {
            attribute: CodeAttribute::TypeCode,
            codes: codes.into_iter().map(Into::into).collect(),
        })
    }

    /// String-field criterion.
    pub fn string_field(
        field: impl Into<String>,
        kind: StringMatchKind,
        value: impl Into<String>,
    ) -> Self {
        Criteria::StringField(StringFieldCriterion {
            field: field.into(),
            predicate: StringPredicate::new(kind, value),
        })
    }

    /// Entity-type criterion.
    pub fn entity_type(entity: EntityKind, criteria: Criteria) -> Self {
        Criteria::EntityType(EntityTypeCriterion {
            entity,
            criteria: Box::new(criteria),
        })
    }

    /// Custom predicate criterion.
    pub fn simple(name: impl Into<String>, value: impl Into<String>) -> Self {
        Criteria::Simple(SimpleCriterion {
            name: name.into(),
            value: value.into(),
        })
    }

    /// Returns a short name of the node kind, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Criteria::Composite(_) => "composite",
            Criteria::Id(_) => "id",
            Criteria::IdSet(_) => "id-set",
            Criteria::Codes(_) => "codes",
            Criteria::StringField(_) => "string-field",
            Criteria::EntityType(_) => "entity-type",
            Criteria::Simple(_) => "simple",
        }
    }

    /// Returns true if this node is a composite.
    pub fn is_composite(&self) -> bool {
        matches!(self, Criteria::Composite(_))
    }

    /// Parses a criteria tree from JSON.
    pub fn from_json(value: serde_json::Value) -> Result<Self, SearchEngineError> {
        serde_json::from_value(value).map_err(|e| SearchEngineError::InvalidArgument {
            message: format!("malformed criteria: {e}"),
        })
    }
}

impl From<CompositeCriteria> for Criteria {
    fn from(composite: CompositeCriteria) -> Self {
        Criteria::Composite(composite)
    }
}
