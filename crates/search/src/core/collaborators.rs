//! External collaborator traits.
//!
//! The engine orchestrates lookups but never performs them itself. Storage,
//! indexed search and DTO translation live behind these traits:
//!
//! - [`IdResolver`] - Batch-resolves object ids of one or more id kinds
//! - [`EntityTypeSearch`] - Finds the entity types matching a sub-criteria tree
//! - [`CandidateSource`] - Lists every candidate (brute-force strategy)
//! - [`IndexedSearchManager`] - Delegated, index-backed search (ids first, then objects)
//! - [`Translator`] - Turns matched entities into output objects

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use crate::error::SearchEngineResult;
use crate::session::SearchContext;
use crate::types::{
    Candidate, Criteria, EntityTypeRecord, FetchOptions, ObjectId, ResolvedObject, SortBy,
};

/// Batch id resolution.
#[async_trait]
pub trait IdResolver: Send + Sync {
    /// Resolves `ids`. Ids of objects that do not exist are simply absent
    /// from the returned map.
    async fn resolve(
        &self,
        context: &SearchContext,
        ids: &[ObjectId],
    ) -> SearchEngineResult<HashMap<ObjectId, ResolvedObject>>;
}

/// Search over the entity types of one entity kind.
#[async_trait]
pub trait EntityTypeSearch: Send + Sync {
    /// Returns the types matching `criteria`.
    async fn search(
        &self,
        context: &SearchContext,
        criteria: &Criteria,
    ) -> SearchEngineResult<Vec<EntityTypeRecord>>;
}

/// Lists all candidates known for a search, for brute-force matching.
#[async_trait]
pub trait CandidateSource<C: Candidate>: Send + Sync {
    /// Returns every candidate, in a stable order.
    async fn list_all(&self, context: &SearchContext) -> SearchEngineResult<Vec<C>>;
}

/// Index-backed search returning technical ids.
#[async_trait]
pub trait IndexedSearchManager<C: Candidate>: Send + Sync {
    /// Returns the technical ids of objects matching `criteria`.
    async fn search_for_ids(
        &self,
        context: &SearchContext,
        criteria: &Criteria,
        sort: &[SortBy],
    ) -> SearchEngineResult<BTreeSet<i64>>;

    /// Loads the objects with the given technical ids.
    async fn load(
        &self,
        context: &SearchContext,
        ids: &BTreeSet<i64>,
    ) -> SearchEngineResult<Vec<C>>;
}

/// Translation of matched entities into output objects.
#[async_trait]
pub trait Translator<C: Candidate, O>: Send + Sync {
    /// Translates `objects`, preserving their order.
    async fn translate(
        &self,
        context: &SearchContext,
        objects: Vec<C>,
        fetch_options: &FetchOptions,
    ) -> SearchEngineResult<Vec<O>>;
}
