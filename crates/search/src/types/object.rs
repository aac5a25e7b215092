//! What the engine needs to know about candidates and outputs.

use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A searchable application entity.
///
/// The matchers only need the attributes exposed here; everything else about
/// the entity is opaque to the engine.
pub trait Candidate: Clone + Send + Sync + 'static {
    /// The entity's code.
    fn code(&self) -> &str;

    /// The entity's permanent id: the surrogate key identity-set criteria
    /// resolve to, and the identity used to deduplicate OR results.
    fn perm_id(&self) -> &str;

    /// Code of the entity's type, for entities that have one.
    fn type_code(&self) -> Option<&str> {
        None
    }

    /// Value of a textual attribute, or `None` if the entity has no value for it.
    fn text_field(&self, field: &str) -> Option<Cow<'_, str>>;
}

/// A value an output object exposes for sorting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SortValue {
    /// Missing value; sorts before everything else.
    Null,
    /// Boolean.
    Bool(bool),
    /// Number.
    Number(f64),
    /// Text, compared case-insensitively.
    Text(String),
    /// Timestamp.
    Date(DateTime<Utc>),
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Null => 0,
            SortValue::Bool(_) => 1,
            SortValue::Number(_) => 2,
            SortValue::Text(_) => 3,
            SortValue::Date(_) => 4,
        }
    }

    /// Total order over sort values. Values of different variants order by
    /// variant, so a mixed column still sorts deterministically.
    pub fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Bool(a), SortValue::Bool(b)) => a.cmp(b),
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl From<&str> for SortValue {
    fn from(s: &str) -> Self {
        SortValue::Text(s.to_string())
    }
}

impl From<String> for SortValue {
    fn from(s: String) -> Self {
        SortValue::Text(s)
    }
}

impl From<i64> for SortValue {
    fn from(n: i64) -> Self {
        SortValue::Number(n as f64)
    }
}

impl From<f64> for SortValue {
    fn from(n: f64) -> Self {
        SortValue::Number(n)
    }
}

impl From<bool> for SortValue {
    fn from(b: bool) -> Self {
        SortValue::Bool(b)
    }
}

impl From<DateTime<Utc>> for SortValue {
    fn from(d: DateTime<Utc>) -> Self {
        SortValue::Date(d)
    }
}

impl<T: Into<SortValue>> From<Option<T>> for SortValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SortValue::Null)
    }
}

/// An output object that can be sorted by named fields.
pub trait Sortable: Clone + Send + Sync + 'static {
    /// Returns the value of `field`; unknown fields should return [`SortValue::Null`].
    fn sort_value(&self, field: &str) -> SortValue;
}
