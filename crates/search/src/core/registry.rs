//! Lookup tables from tags to collaborators, built once at startup.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use crate::error::{SearchEngineError, SearchEngineResult};
use crate::session::SearchContext;
use crate::types::{EntityKind, IdKind, IdTag, ObjectId, ResolvedObject};

use super::collaborators::{EntityTypeSearch, IdResolver};

/// Id resolvers keyed by [`IdTag`].
#[derive(Clone, Default)]
pub struct ResolverRegistry {
    resolvers: HashMap<IdTag, Arc<dyn IdResolver>>,
}

impl ResolverRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `resolver` for one tag, replacing any previous one.
    pub fn register(&mut self, tag: IdTag, resolver: Arc<dyn IdResolver>) {
        self.resolvers.insert(tag, resolver);
    }

    /// Registers `resolver` for several id kinds of one entity kind.
    pub fn with_resolver(
        mut self,
        entity: EntityKind,
        id_kinds: &[IdKind],
        resolver: Arc<dyn IdResolver>,
    ) -> Self {
        for id_kind in id_kinds {
            self.register(IdTag::new(entity, *id_kind), resolver.clone());
        }
        self
    }

    /// Returns true if a resolver is registered for `tag`.
    pub fn supports(&self, tag: IdTag) -> bool {
        self.resolvers.contains_key(&tag)
    }

    /// Fails with [`SearchEngineError::UnknownIdKind`] unless `id` has a resolver.
    pub fn check(&self, id: &ObjectId) -> SearchEngineResult<()> {
        if self.supports(id.tag()) {
            Ok(())
        } else {
            Err(SearchEngineError::UnknownIdKind { id: id.to_string() })
        }
    }

    /// Resolves `ids` with one collaborator call per tag.
    ///
    /// All ids are checked before any call is made, so an unknown id kind
    /// fails without side effects.
    pub async fn resolve_all<'a, I>(
        &self,
        context: &SearchContext,
        ids: I,
    ) -> SearchEngineResult<HashMap<ObjectId, ResolvedObject>>
    where
        I: IntoIterator<Item = &'a ObjectId>,
    {
        let mut seen: HashSet<&ObjectId> = HashSet::new();
        let mut by_tag: BTreeMap<IdTag, Vec<ObjectId>> = BTreeMap::new();
        for id in ids {
            self.check(id)?;
            if seen.insert(id) {
                by_tag.entry(id.tag()).or_default().push(id.clone());
            }
        }

        let mut resolved = HashMap::new();
        for (tag, batch) in by_tag {
            let Some(resolver) = self.resolvers.get(&tag) else {
                continue;
            };
            tracing::trace!(tag = %tag, ids = batch.len(), "resolving ids");
            resolved.extend(resolver.resolve(context, &batch).await?);
        }
        Ok(resolved)
    }
}

/// Entity-type searches keyed by entity kind.
#[derive(Clone, Default)]
pub struct EntityTypeSearches {
    searches: HashMap<EntityKind, Arc<dyn EntityTypeSearch>>,
}

impl EntityTypeSearches {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the type search for `entity`.
    pub fn with_search(mut self, entity: EntityKind, search: Arc<dyn EntityTypeSearch>) -> Self {
        self.searches.insert(entity, search);
        self
    }

    /// Returns the type search for `entity`.
    pub fn get(&self, entity: EntityKind) -> SearchEngineResult<&Arc<dyn EntityTypeSearch>> {
        self.searches
            .get(&entity)
            .ok_or_else(|| SearchEngineError::UnsupportedCriterion {
                criterion: format!("entity-type criterion for {entity}"),
            })
    }
}
