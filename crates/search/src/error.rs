//! Error types for the search engine.
//!
//! Every failure raised by the engine is fatal for the current `search` call:
//! there are no retries and no partial results. References to objects that do
//! not exist are *not* errors; they normalize to surrogate values that match
//! nothing.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The error type for all search engine operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchEngineError {
    /// A required input was missing or malformed.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A composite node carried an operator other than AND / OR.
    #[error("unsupported search operator: {operator}")]
    UnsupportedOperator { operator: String },

    /// The fetch options requested a cache mode the engine does not know.
    #[error("unsupported cache mode: {mode}")]
    UnsupportedCacheMode { mode: String },

    /// No resolver is registered for the kind of object id.
    #[error("unknown id: {id}")]
    UnknownIdKind { id: String },

    /// A rewrite that is deliberately not implemented.
    #[error("unsupported criteria rewrite: {message}")]
    UnsupportedRewrite { message: String },

    /// A string-field criterion used a predicate kind the matcher does not know.
    #[error("unknown string predicate: {predicate}")]
    UnknownStringPredicate { predicate: String },

    /// A criterion reached the matcher without a matcher able to evaluate it.
    #[error("unsupported criterion: {criterion}")]
    UnsupportedCriterion { criterion: String },

    /// A wildcard pattern could not be compiled.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// An external collaborator (resolver, indexed search, translator) failed.
    #[error("{collaborator} failed: {message}")]
    Collaborator {
        collaborator: String,
        message: String,
    },
}

impl SearchEngineError {
    /// Builds the "cannot be null" failure for a missing search input.
    pub fn missing(what: &str) -> Self {
        SearchEngineError::InvalidArgument {
            message: format!("{what} cannot be null"),
        }
    }

    /// Builds a collaborator failure.
    pub fn collaborator(collaborator: impl Into<String>, message: impl Into<String>) -> Self {
        SearchEngineError::Collaborator {
            collaborator: collaborator.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for search engine operations.
pub type SearchEngineResult<T> = Result<T, SearchEngineError>;
