//! Mock collaborators over [`SampleFixture`] collections.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use labbase_search::core::{
    CandidateSource, EntityTypeSearch, IdResolver, IndexedSearchManager, ResolverRegistry,
    Translator,
};
use labbase_search::matcher::{CriteriaMatcher, ResolvedIds, SimplePredicates, StringPattern};
use labbase_search::types::{
    Criteria, EntityKind, EntityTypeRecord, FetchOptions, IdKind, IdValue, ObjectId,
    ResolvedObject, SearchOperator, SortBy,
};
use labbase_search::{SearchContext, SearchEngineError, SearchEngineResult};

use super::fixtures::{SampleFixture, SampleView};

/// Resolves sample ids of every kind against a fixed collection.
pub struct SampleResolver {
    samples: Vec<SampleFixture>,
    calls: Mutex<Vec<Vec<ObjectId>>>,
}

impl SampleResolver {
    /// Creates a resolver over `samples`.
    pub fn new(samples: Vec<SampleFixture>) -> Arc<Self> {
        Arc::new(Self {
            samples,
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Number of resolve calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Registers this resolver for every sample id kind.
    pub fn registry(self: &Arc<Self>) -> ResolverRegistry {
        ResolverRegistry::new().with_resolver(
            EntityKind::Sample,
            &[IdKind::PermId, IdKind::TechId, IdKind::Code, IdKind::Identifier],
            self.clone(),
        )
    }

    fn find(&self, id: &ObjectId) -> Option<&SampleFixture> {
        self.samples.iter().find(|s| match &id.value {
            IdValue::PermId(perm_id) => &s.perm_id == perm_id,
            IdValue::TechId(tech_id) => s.tech_id == *tech_id,
            IdValue::Code(code) => &s.code == code,
            IdValue::Identifier(identifier) => &s.identifier() == identifier,
        })
    }
}

#[async_trait]
impl IdResolver for SampleResolver {
    async fn resolve(
        &self,
        _context: &SearchContext,
        ids: &[ObjectId],
    ) -> SearchEngineResult<HashMap<ObjectId, ResolvedObject>> {
        self.calls.lock().push(ids.to_vec());
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.find(id).map(|s| {
                    (
                        id.clone(),
                        ResolvedObject::new(s.tech_id, s.perm_id.clone(), s.code.clone()),
                    )
                })
            })
            .collect())
    }
}

/// Entity-type search over a fixed list of sample type codes. Understands
/// code sets, `code` string fields and composites of those.
pub struct SampleTypeSearch {
    types: Vec<&'static str>,
    calls: Mutex<usize>,
}

impl SampleTypeSearch {
    /// Creates the search with the given type codes.
    pub fn new(types: Vec<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            types,
            calls: Mutex::new(0),
        })
    }

    /// Number of search calls so far.
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }

    fn matches(&self, code: &str, criteria: &Criteria) -> SearchEngineResult<bool> {
        Ok(match criteria {
            Criteria::Codes(codes) => codes.codes.contains(code),
            Criteria::StringField(field) if field.field == "code" => {
                StringPattern::compile(&field.predicate)?.matches(code)
            }
            Criteria::Composite(composite) => {
                let mut results = Vec::with_capacity(composite.criteria.len());
                for child in &composite.criteria {
                    results.push(self.matches(code, child)?);
                }
                match composite.operator {
                    SearchOperator::And => results.into_iter().all(|r| r),
                    SearchOperator::Or => results.is_empty() || results.into_iter().any(|r| r),
                }
            }
            other => {
                return Err(SearchEngineError::UnsupportedCriterion {
                    criterion: other.kind_name().to_string(),
                });
            }
        })
    }
}

#[async_trait]
impl EntityTypeSearch for SampleTypeSearch {
    async fn search(
        &self,
        _context: &SearchContext,
        criteria: &Criteria,
    ) -> SearchEngineResult<Vec<EntityTypeRecord>> {
        *self.calls.lock() += 1;
        let mut found = Vec::new();
        for (i, code) in self.types.iter().enumerate() {
            if self.matches(code, criteria)? {
                found.push(EntityTypeRecord::new(i as i64 + 1, *code));
            }
        }
        Ok(found)
    }
}

/// Lists a fixed collection, optionally after a delay.
pub struct InMemorySamples {
    samples: Mutex<Vec<SampleFixture>>,
    delay: Option<Duration>,
    calls: Mutex<usize>,
}

impl InMemorySamples {
    /// Creates the source.
    pub fn new(samples: Vec<SampleFixture>) -> Arc<Self> {
        Arc::new(Self {
            samples: Mutex::new(samples),
            delay: None,
            calls: Mutex::new(0),
        })
    }

    /// Creates a source that sleeps before answering.
    pub fn slow(samples: Vec<SampleFixture>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            samples: Mutex::new(samples),
            delay: Some(delay),
            calls: Mutex::new(0),
        })
    }

    /// Number of `list_all` calls so far.
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }

    /// Adds a sample, visible to subsequent listings.
    pub fn add(&self, sample: SampleFixture) {
        self.samples.lock().push(sample);
    }
}

#[async_trait]
impl CandidateSource<SampleFixture> for InMemorySamples {
    async fn list_all(&self, _context: &SearchContext) -> SearchEngineResult<Vec<SampleFixture>> {
        *self.calls.lock() += 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.samples.lock().clone())
    }
}

/// Index-backed search simulated by matching over a fixed collection with
/// its own resolver table.
pub struct IndexedSamples {
    samples: Vec<SampleFixture>,
    resolvers: ResolverRegistry,
    loads: Mutex<Vec<BTreeSet<i64>>>,
}

impl IndexedSamples {
    /// Creates the manager.
    pub fn new(samples: Vec<SampleFixture>, resolvers: ResolverRegistry) -> Arc<Self> {
        Arc::new(Self {
            samples,
            resolvers,
            loads: Mutex::new(Vec::new()),
        })
    }

    /// Number of `load` calls so far.
    pub fn load_count(&self) -> usize {
        self.loads.lock().len()
    }
}

#[async_trait]
impl IndexedSearchManager<SampleFixture> for IndexedSamples {
    async fn search_for_ids(
        &self,
        context: &SearchContext,
        criteria: &Criteria,
        _sort: &[SortBy],
    ) -> SearchEngineResult<BTreeSet<i64>> {
        let ids = ResolvedIds::resolve(&self.resolvers, context, criteria).await?;
        let predicates = SimplePredicates::new();
        let matched = CriteriaMatcher::new(&ids, &predicates).matches(&self.samples, criteria)?;
        Ok(matched.iter().map(|s| s.tech_id).collect())
    }

    async fn load(
        &self,
        _context: &SearchContext,
        ids: &BTreeSet<i64>,
    ) -> SearchEngineResult<Vec<SampleFixture>> {
        self.loads.lock().push(ids.clone());
        Ok(self
            .samples
            .iter()
            .filter(|s| ids.contains(&s.tech_id))
            .cloned()
            .collect())
    }
}

/// Translates fixtures into views, counting calls. Can be told to fail.
#[derive(Default)]
pub struct CountingTranslator {
    calls: Mutex<usize>,
    fail: Mutex<bool>,
}

impl CountingTranslator {
    /// Creates the translator.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of translate calls so far.
    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }

    /// Makes subsequent calls fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock() = fail;
    }
}

#[async_trait]
impl Translator<SampleFixture, SampleView> for CountingTranslator {
    async fn translate(
        &self,
        _context: &SearchContext,
        objects: Vec<SampleFixture>,
        _fetch_options: &FetchOptions,
    ) -> SearchEngineResult<Vec<SampleView>> {
        *self.calls.lock() += 1;
        if *self.fail.lock() {
            return Err(SearchEngineError::collaborator("translator", "backend unavailable"));
        }
        Ok(objects.into_iter().map(SampleView::from).collect())
    }
}
