//! Criteria normalization.
//!
//! Criteria that reference other domain objects (by id or by entity type) are
//! rewritten into criteria over surrogate keys that both matching strategies
//! can evaluate directly:
//!
//! - identity criteria become technical-id sets of the same entity kind,
//! - entity-type criteria become code sets over the candidate's type code.
//!
//! Normalization runs in two passes. The first walks the tree depth-first and
//! records, per [`RewriteRule`], the paths of the nodes the rule applies to.
//! Each rule then resolves its whole batch at once, and a second pass builds a
//! fresh tree with the replacements substituted. The input tree is never
//! modified.
//!
//! Objects resolved while rewriting identity criteria are kept alongside the
//! new tree in [`NormalizedCriteria`], so in-memory matching never resolves
//! the surrogate ids a second time.

mod rewriter;

use std::collections::HashMap;

use crate::core::{EntityTypeSearches, ResolverRegistry};
use crate::error::SearchEngineResult;
use crate::matcher::ResolvedIds;
use crate::session::SearchContext;
use crate::types::{CompositeCriteria, Criteria};

pub use rewriter::RewriteRule;

/// Position of a node: child indices from the root.
type NodePath = Vec<usize>;

/// A normalized tree and the objects resolved while producing it.
#[derive(Debug, Clone)]
pub struct NormalizedCriteria {
    /// The rewritten tree.
    pub criteria: Criteria,
    /// Surrogate ids introduced by the rewrite, with their objects.
    pub resolved: ResolvedIds,
}

/// Rewrites reference criteria into surrogate-key criteria.
#[derive(Clone)]
pub struct CriteriaNormalizer {
    resolvers: ResolverRegistry,
    type_searches: EntityTypeSearches,
    rules: Vec<RewriteRule>,
}

impl CriteriaNormalizer {
    /// Creates a normalizer with the standard rule order.
    pub fn new(resolvers: ResolverRegistry, type_searches: EntityTypeSearches) -> Self {
        Self {
            resolvers,
            type_searches,
            rules: RewriteRule::standard(),
        }
    }

    /// Returns the rules in the order they are tried.
    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// Returns the resolver table.
    pub fn resolvers(&self) -> &ResolverRegistry {
        &self.resolvers
    }

    /// Returns `criteria` with every rewritable node replaced. A tree with
    /// nothing to rewrite is returned unchanged.
    pub async fn normalize(
        &self,
        context: &SearchContext,
        criteria: &Criteria,
    ) -> SearchEngineResult<Criteria> {
        Ok(self.normalize_resolved(context, criteria).await?.criteria)
    }

    /// Like [`normalize`](Self::normalize), also returning the objects
    /// resolved for the surrogate ids in the new tree.
    pub async fn normalize_resolved(
        &self,
        context: &SearchContext,
        criteria: &Criteria,
    ) -> SearchEngineResult<NormalizedCriteria> {
        let mut batches: Vec<Vec<(NodePath, &Criteria)>> = vec![Vec::new(); self.rules.len()];
        self.collect(criteria, &mut Vec::new(), None, &mut batches);

        let mut resolved = ResolvedIds::default();
        if batches.iter().all(Vec::is_empty) {
            return Ok(NormalizedCriteria {
                criteria: criteria.clone(),
                resolved,
            });
        }

        let mut replacements: HashMap<NodePath, Option<Criteria>> = HashMap::new();
        for (rule, batch) in self.rules.iter().zip(batches) {
            if batch.is_empty() {
                continue;
            }
            let (paths, originals): (Vec<NodePath>, Vec<&Criteria>) = batch.into_iter().unzip();
            let rewritten = rule
                .rewrite(
                    context,
                    &self.resolvers,
                    &self.type_searches,
                    &originals,
                    &mut resolved,
                )
                .await?;
            tracing::debug!(rule = %rule, count = rewritten.len(), "rewrote criteria");
            replacements.extend(paths.into_iter().zip(rewritten));
        }

        let criteria = rebuild(criteria, &mut Vec::new(), &replacements)
            .unwrap_or_else(|| Criteria::and(Vec::new()));
        Ok(NormalizedCriteria { criteria, resolved })
    }

    fn collect<'a>(
        &self,
        node: &'a Criteria,
        path: &mut NodePath,
        parent: Option<&CompositeCriteria>,
        batches: &mut [Vec<(NodePath, &'a Criteria)>],
    ) {
        if let Some(index) = self.rules.iter().position(|rule| rule.applies(node, parent)) {
            batches[index].push((path.clone(), node));
            return;
        }

        if let Criteria::Composite(composite) = node {
            for (i, child) in composite.criteria.iter().enumerate() {
                path.push(i);
                self.collect(child, path, Some(composite), batches);
                path.pop();
            }
        }
    }
}

/// Builds the rewritten tree. Returns `None` if the node itself was elided;
/// elided children are dropped from their parent, and a composite left with
/// no children matches everything.
fn rebuild(
    node: &Criteria,
    path: &mut NodePath,
    replacements: &HashMap<NodePath, Option<Criteria>>,
) -> Option<Criteria> {
    if let Some(replacement) = replacements.get(path.as_slice()) {
        return replacement.clone();
    }

    match node {
        Criteria::Composite(composite) => {
            let mut criteria = Vec::with_capacity(composite.criteria.len());
            for (i, child) in composite.criteria.iter().enumerate() {
                path.push(i);
                if let Some(rebuilt) = rebuild(child, path, replacements) {
                    criteria.push(rebuilt);
                }
                path.pop();
            }
            Some(Criteria::Composite(CompositeCriteria {
                entity: composite.entity,
                operator: composite.operator,
                criteria,
            }))
        }
        other => Some(other.clone()),
    }
}
