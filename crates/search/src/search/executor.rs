//! The search entry point.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheKey, SearchCache};
use crate::config::EngineConfig;
use crate::core::{
    CandidateSource, EntityTypeSearch, EntityTypeSearches, IdResolver, IndexedSearchManager,
    ResolverRegistry, Translator,
};
use crate::error::{SearchEngineError, SearchEngineResult};
use crate::matcher::{CriteriaMatcher, SimplePredicates};
use crate::normalize::{CriteriaNormalizer, NormalizedCriteria};
use crate::session::{SearchContext, SessionLifecycle};
use crate::types::{
    Candidate, Criteria, EntityKind, FetchOptions, IdKind, SearchObjectsResult, Sortable,
};

use super::sort::{page, sort_objects};

/// How the full match set is obtained.
pub enum SearchStrategy<C: Candidate> {
    /// List every candidate and match criteria in memory.
    InMemory(Arc<dyn CandidateSource<C>>),
    /// Delegate to an index-backed search manager, then load the objects.
    Indexed(Arc<dyn IndexedSearchManager<C>>),
}

impl<C: Candidate> Clone for SearchStrategy<C> {
    fn clone(&self) -> Self {
        match self {
            SearchStrategy::InMemory(source) => SearchStrategy::InMemory(source.clone()),
            SearchStrategy::Indexed(manager) => SearchStrategy::Indexed(manager.clone()),
        }
    }
}

impl<C: Candidate> SearchStrategy<C> {
    fn name(&self) -> &'static str {
        match self {
            SearchStrategy::InMemory(_) => "in-memory",
            SearchStrategy::Indexed(_) => "indexed",
        }
    }
}

/// A search request as it arrives from the transport layer. Every field is
/// required; a missing one fails the search before any work is done.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    /// The caller's context.
    #[serde(default)]
    pub context: Option<SearchContext>,
    /// The criteria tree.
    #[serde(default)]
    pub criteria: Option<Criteria>,
    /// Fetch options.
    #[serde(default)]
    pub fetch_options: Option<FetchOptions>,
}

impl SearchRequest {
    /// Creates a complete request.
    pub fn new(context: SearchContext, criteria: Criteria, fetch_options: FetchOptions) -> Self {
        Self {
            context: Some(context),
            criteria: Some(criteria),
            fetch_options: Some(fetch_options),
        }
    }
}

/// Runs searches: normalize, match, translate, sort and page, with optional
/// caching of the match-and-translate step.
///
/// `C` is the candidate entity, `O` the translated output object.
pub struct SearchExecutor<C: Candidate, O: Sortable> {
    strategy: SearchStrategy<C>,
    translator: Arc<dyn Translator<C, O>>,
    normalizer: CriteriaNormalizer,
    predicates: SimplePredicates<C>,
    cache: SearchCache<O>,
    config: EngineConfig,
}

impl<C: Candidate, O: Sortable> SearchExecutor<C, O> {
    /// Starts building an executor.
    pub fn builder() -> SearchExecutorBuilder<C, O> {
        SearchExecutorBuilder::new()
    }

    /// Returns the result cache.
    pub fn cache(&self) -> &SearchCache<O> {
        &self.cache
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs a transport-level request, rejecting missing inputs.
    pub async fn search(
        &self,
        request: SearchRequest,
    ) -> SearchEngineResult<SearchObjectsResult<O>> {
        let context = request
            .context
            .ok_or_else(|| SearchEngineError::missing("Context"))?;
        let criteria = request
            .criteria
            .ok_or_else(|| SearchEngineError::missing("Criteria"))?;
        let fetch_options = request
            .fetch_options
            .ok_or_else(|| SearchEngineError::missing("Fetch options"))?;

        self.search_with(&context, &criteria, &fetch_options).await
    }

    /// Searches for objects matching `criteria`.
    ///
    /// The returned page is sorted by `fetch_options.sort_by` and windowed by
    /// its paging options; `total_count` is the number of matches before
    /// paging.
    pub async fn search_with(
        &self,
        context: &SearchContext,
        criteria: &Criteria,
        fetch_options: &FetchOptions,
    ) -> SearchEngineResult<SearchObjectsResult<O>> {
        self.validate(context, fetch_options)?;

        tracing::debug!(
            session = %context.session(),
            strategy = self.strategy.name(),
            criteria = criteria.kind_name(),
            "search started"
        );

        let normalized = self.normalizer.normalize_resolved(context, criteria).await?;
        let mode = self.config.effective_cache_mode(fetch_options.cache_mode);
        let key = CacheKey::new(&normalized.criteria, fetch_options);

        let translated = self
            .cache
            .get_or_compute(context.session(), key, mode, || {
                self.search_and_translate(context, &normalized, fetch_options)
            })
            .await?;

        let mut objects = translated.as_ref().clone();
        sort_objects(&mut objects, &fetch_options.sort_by);
        let total_count = objects.len();
        let objects = page(objects, fetch_options.paging());

        tracing::debug!(
            session = %context.session(),
            total = total_count,
            returned = objects.len(),
            "search finished"
        );

        Ok(SearchObjectsResult::new(objects, total_count))
    }

    /// Returns only the number of objects matching `criteria`.
    pub async fn search_count(
        &self,
        context: &SearchContext,
        criteria: &Criteria,
        fetch_options: &FetchOptions,
    ) -> SearchEngineResult<usize> {
        Ok(self
            .search_with(context, criteria, fetch_options)
            .await?
            .total_count)
    }

    fn validate(
        &self,
        context: &SearchContext,
        fetch_options: &FetchOptions,
    ) -> SearchEngineResult<()> {
        if context.session().is_blank() {
            return Err(SearchEngineError::InvalidArgument {
                message: "session token cannot be blank".to_string(),
            });
        }
        if let Some(count) = fetch_options.count {
            if count > self.config.max_page_size {
                return Err(SearchEngineError::InvalidArgument {
                    message: format!(
                        "count {count} exceeds the maximum page size {}",
                        self.config.max_page_size
                    ),
                });
            }
        }
        Ok(())
    }

    async fn search_and_translate(
        &self,
        context: &SearchContext,
        normalized: &NormalizedCriteria,
        fetch_options: &FetchOptions,
    ) -> SearchEngineResult<Vec<O>> {
        let criteria = &normalized.criteria;
        let matched = match &self.strategy {
            SearchStrategy::InMemory(source) => {
                let ids = normalized
                    .resolved
                    .clone()
                    .complete(self.normalizer.resolvers(), context, criteria)
                    .await?;
                let candidates = source.list_all(context).await?;
                CriteriaMatcher::new(&ids, &self.predicates).matches(&candidates, criteria)?
            }
            SearchStrategy::Indexed(manager) => {
                let ids = manager
                    .search_for_ids(context, criteria, &fetch_options.sort_by)
                    .await?;
                if ids.is_empty() {
                    Vec::new()
                } else {
                    manager.load(context, &ids).await?
                }
            }
        };

        tracing::trace!(matched = matched.len(), "translating matches");
        self.translator.translate(context, matched, fetch_options).await
    }
}

/// Builder for [`SearchExecutor`].
pub struct SearchExecutorBuilder<C: Candidate, O: Sortable> {
    strategy: Option<SearchStrategy<C>>,
    translator: Option<Arc<dyn Translator<C, O>>>,
    resolvers: ResolverRegistry,
    type_searches: EntityTypeSearches,
    predicates: SimplePredicates<C>,
    lifecycle: Option<Arc<dyn SessionLifecycle>>,
    config: EngineConfig,
}

impl<C: Candidate, O: Sortable> Default for SearchExecutorBuilder<C, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Candidate, O: Sortable> SearchExecutorBuilder<C, O> {
    /// Creates a builder with default configuration and no collaborators.
    pub fn new() -> Self {
        Self {
            strategy: None,
            translator: None,
            resolvers: ResolverRegistry::new(),
            type_searches: EntityTypeSearches::new(),
            predicates: SimplePredicates::new(),
            lifecycle: None,
            config: EngineConfig::default(),
        }
    }

    /// Uses brute-force matching over `source`.
    pub fn in_memory(mut self, source: Arc<dyn CandidateSource<C>>) -> Self {
        self.strategy = Some(SearchStrategy::InMemory(source));
        self
    }

    /// Uses delegated search through `manager`.
    pub fn indexed(mut self, manager: Arc<dyn IndexedSearchManager<C>>) -> Self {
        self.strategy = Some(SearchStrategy::Indexed(manager));
        self
    }

    /// Sets the translator.
    pub fn translator(mut self, translator: Arc<dyn Translator<C, O>>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Replaces the resolver table.
    pub fn resolvers(mut self, resolvers: ResolverRegistry) -> Self {
        self.resolvers = resolvers;
        self
    }

    /// Registers a resolver for several id kinds of `entity`.
    pub fn resolver(
        mut self,
        entity: EntityKind,
        id_kinds: &[IdKind],
        resolver: Arc<dyn IdResolver>,
    ) -> Self {
        self.resolvers = self.resolvers.with_resolver(entity, id_kinds, resolver);
        self
    }

    /// Registers the entity-type search for `entity`.
    pub fn type_search(mut self, entity: EntityKind, search: Arc<dyn EntityTypeSearch>) -> Self {
        self.type_searches = self.type_searches.with_search(entity, search);
        self
    }

    /// Registers a predicate for simple criteria named `name`.
    pub fn predicate<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&C, &str) -> bool + Send + Sync + 'static,
    {
        self.predicates = self.predicates.with(name, predicate);
        self
    }

    /// Attaches the session lifecycle used to drop cached results of ended
    /// sessions. Without one, the executor never caches.
    pub fn session_lifecycle(mut self, lifecycle: Arc<dyn SessionLifecycle>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    /// Sets the configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the executor.
    ///
    /// Caching is switched off when no session lifecycle is attached, since
    /// entries of ended sessions could never be dropped.
    pub fn build(mut self) -> SearchEngineResult<SearchExecutor<C, O>> {
        let strategy = self.strategy.ok_or_else(|| SearchEngineError::InvalidArgument {
            message: "a search strategy must be configured".to_string(),
        })?;
        let translator = self.translator.ok_or_else(|| SearchEngineError::InvalidArgument {
            message: "a translator must be configured".to_string(),
        })?;
        self.config
            .validate()
            .map_err(|errors| SearchEngineError::InvalidArgument {
                message: format!("invalid configuration: {}", errors.join("; ")),
            })?;

        let cache = match self.lifecycle {
            Some(lifecycle) => SearchCache::new().with_lifecycle(lifecycle),
            None => {
                if self.config.cache_enabled {
                    tracing::warn!("no session lifecycle attached, result caching disabled");
                    self.config.cache_enabled = false;
                }
                SearchCache::new()
            }
        };

        Ok(SearchExecutor {
            strategy,
            translator,
            normalizer: CriteriaNormalizer::new(self.resolvers, self.type_searches),
            predicates: self.predicates,
            cache,
            config: self.config,
        })
    }
}
