//! Fetch options: caching, sorting and paging of a search.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SearchEngineError;

/// How the result cache is used by a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CacheMode {
    /// Bypass the cache; compute every time.
    NoCache,
    /// Reuse a cached result for the key, or compute and store it.
    Cache,
    /// Discard any cached result for the key, then compute and store.
    ReloadAndCache,
}

impl CacheMode {
    /// Parses a cache mode from its wire name.
    pub fn parse(s: &str) -> Result<Self, SearchEngineError> {
        match s.to_ascii_uppercase().as_str() {
            "NO_CACHE" => Ok(CacheMode::NoCache),
            "CACHE" => Ok(CacheMode::Cache),
            "RELOAD_AND_CACHE" => Ok(CacheMode::ReloadAndCache),
            _ => Err(SearchEngineError::UnsupportedCacheMode {
                mode: s.to_string(),
            }),
        }
    }

    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheMode::NoCache => "NO_CACHE",
            CacheMode::Cache => "CACHE",
            CacheMode::ReloadAndCache => "RELOAD_AND_CACHE",
        }
    }
}

impl TryFrom<String> for CacheMode {
    type Error = SearchEngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        CacheMode::parse(&value)
    }
}

impl From<CacheMode> for String {
    fn from(mode: CacheMode) -> Self {
        mode.as_str().to_string()
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// One element of a sort specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortBy {
    /// Field name, interpreted by the output type.
    pub field: String,
    /// Direction.
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortBy {
    /// Ascending sort on `field`.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    /// Descending sort on `field`.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Options controlling how search results are fetched.
///
/// # Examples
///
/// ```
/// use labbase_search::types::{CacheMode, FetchOptions, SortBy};
///
/// let options = FetchOptions::new()
///     .with_cache_mode(CacheMode::Cache)
///     .with_sort(SortBy::desc("registration_date"))
///     .with_page(20, 10);
///
/// assert_eq!(options.paging(), Some((20, 10)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Cache mode; `None` uses the engine's configured default.
    #[serde(default)]
    pub cache_mode: Option<CacheMode>,
    /// Sort specification; empty means no sorting.
    #[serde(default)]
    pub sort_by: Vec<SortBy>,
    /// Offset of the first returned result.
    #[serde(default)]
    pub from: Option<usize>,
    /// Maximum number of returned results.
    #[serde(default)]
    pub count: Option<usize>,
}

impl FetchOptions {
    /// Creates options with no caching preference, sorting or paging.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cache mode.
    pub fn with_cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = Some(mode);
        self
    }

    /// Appends a sort element.
    pub fn with_sort(mut self, sort: SortBy) -> Self {
        self.sort_by.push(sort);
        self
    }

    /// Sets the paging window.
    pub fn with_page(mut self, from: usize, count: usize) -> Self {
        self.from = Some(from);
        self.count = Some(count);
        self
    }

    /// Returns `(from, count)` when both are set.
    pub fn paging(&self) -> Option<(usize, usize)> {
        match (self.from, self.count) {
            (Some(from), Some(count)) => Some((from, count)),
            _ => None,
        }
    }

    /// Returns a copy without the cache mode.
    ///
    /// The cache mode says how to use the cache, not what is cached, so cache
    /// keys are built from this form.
    pub fn without_cache_mode(&self) -> Self {
        Self {
            cache_mode: None,
            ..self.clone()
        }
    }
}
