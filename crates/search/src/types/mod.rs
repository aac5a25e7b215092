//! Core types for the search engine.
//!
//! - [`Criteria`] - The criteria tree and its leaf kinds
//! - [`ObjectId`], [`IdTag`] - Object references and resolver lookup keys
//! - [`FetchOptions`], [`CacheMode`] - Caching, sorting and paging options
//! - [`Candidate`], [`Sortable`] - What the engine needs from entities
//! - [`SearchObjectsResult`] - A sorted, paged result with its total count

mod criteria;
mod fetch_options;
mod id;
mod object;
mod result;

pub use criteria::{
    CodeAttribute, CodesCriterion, CompositeCriteria, Criteria, EntityTypeCriterion,
    IdCriterion, IdSetCriterion, SearchOperator, SimpleCriterion, StringFieldCriterion,
    StringMatchKind, StringPredicate,
};

pub use fetch_options::{CacheMode, FetchOptions, SortBy, SortDirection};

pub use id::{
    EntityKind, EntityTypeRecord, IdKind, IdTag, IdValue, NOT_FOUND_CODE, NOT_FOUND_TECH_ID,
    ObjectId, ResolvedObject,
};

pub use object::{Candidate, SortValue, Sortable};

pub use result::SearchObjectsResult;
