//! Rewrite rules.
//!
//! A rule decides whether it applies to a node and, given every node it was
//! applied to, produces one replacement per node. Replacements are expressed
//! in surrogate keys only, so their output is never itself rewritable.

use std::collections::HashMap;
use std::fmt;

use crate::core::{EntityTypeSearches, ResolverRegistry};
use crate::error::{SearchEngineError, SearchEngineResult};
use crate::matcher::ResolvedIds;
use crate::session::SearchContext;
use crate::types::{
    CompositeCriteria, Criteria, EntityKind, IdCriterion, IdKind, NOT_FOUND_CODE,
    NOT_FOUND_TECH_ID, ObjectId,
};

/// One criteria rewrite rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RewriteRule {
    /// Material permanent id inside a material search. Always fails.
    MaterialPermIdInMaterialSearch,
    /// Identity criterion referencing an object of the given kind, rewritten
    /// into a technical-id set.
    Reference(EntityKind),
    /// Entity-type criterion of the given kind, rewritten into a set of type codes.
    EntityType(EntityKind),
}

impl RewriteRule {
    /// The fixed rule order: the material restriction first, then one reference
    /// rule per entity kind, then one entity-type rule per typed kind.
    pub fn standard() -> Vec<RewriteRule> {
        let mut rules = vec![RewriteRule::MaterialPermIdInMaterialSearch];
        rules.extend(EntityKind::ALL.into_iter().map(RewriteRule::Reference));
        rules.extend(EntityKind::TYPED.into_iter().map(RewriteRule::EntityType));
        rules
    }

    /// Returns true if the rule rewrites `node`, whose immediate parent is `parent`.
    pub fn applies(&self, node: &Criteria, parent: Option<&CompositeCriteria>) -> bool {
        match (self, node) {
            (
                RewriteRule::MaterialPermIdInMaterialSearch,
                Criteria::Id(IdCriterion { id: Some(id) }),
            ) => {
                id.entity == EntityKind::Material
                    && id.value.kind() == IdKind::PermId
                    && parent.is_some_and(|p| p.entity == Some(EntityKind::Material))
            }
            (RewriteRule::Reference(kind), Criteria::Id(IdCriterion { id: Some(id) })) => {
                id.entity == *kind
            }
            (RewriteRule::EntityType(kind), Criteria::EntityType(criterion)) => {
                criterion.entity == *kind
            }
            _ => false,
        }
    }

    /// Produces one replacement per original, in order. `None` removes the
    /// node from its parent. Objects resolved on the way are recorded in
    /// `resolved` under the surrogate ids that replace them.
    pub async fn rewrite(
        &self,
        context: &SearchContext,
        resolvers: &ResolverRegistry,
        type_searches: &EntityTypeSearches,
        originals: &[&Criteria],
        resolved: &mut ResolvedIds,
    ) -> SearchEngineResult<Vec<Option<Criteria>>> {
        match self {
            RewriteRule::MaterialPermIdInMaterialSearch => {
                Err(SearchEngineError::UnsupportedRewrite {
                    message: "material permanent id in a material search; \
                              use id-based criterion instead"
                        .to_string(),
                })
            }
            RewriteRule::Reference(_) => {
                rewrite_references(context, resolvers, originals, resolved).await
            }
            RewriteRule::EntityType(kind) => {
                rewrite_entity_types(context, type_searches, *kind, originals).await
            }
        }
    }
}

impl fmt::Display for RewriteRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteRule::MaterialPermIdInMaterialSearch => write!(f, "material-perm-id"),
            RewriteRule::Reference(kind) => write!(f, "reference({kind})"),
            RewriteRule::EntityType(kind) => write!(f, "entity-type({kind})"),
        }
    }
}

async fn rewrite_references(
    context: &SearchContext,
    resolvers: &ResolverRegistry,
    originals: &[&Criteria],
    known: &mut ResolvedIds,
) -> SearchEngineResult<Vec<Option<Criteria>>> {
    let ids: Vec<Option<&ObjectId>> = originals
        .iter()
        .map(|criteria| match criteria {
            Criteria::Id(IdCriterion { id: Some(id) }) => Some(id),
            _ => None,
        })
        .collect();

    let resolved = resolvers.resolve_all(context, ids.iter().flatten().copied()).await?;

    Ok(originals
        .iter()
        .zip(ids)
        .map(|(original, id)| match id {
            Some(id) => {
                let object = resolved.get(id);
                let surrogate =
                    ObjectId::tech_id(id.entity, object.map_or(NOT_FOUND_TECH_ID, |o| o.tech_id));
                known.record(surrogate.clone(), object.cloned());
                Some(Criteria::id_set([surrogate]))
            }
            None => Some((*original).clone()),
        })
        .collect())
}

async fn rewrite_entity_types(
    context: &SearchContext,
    type_searches: &EntityTypeSearches,
    kind: EntityKind,
    originals: &[&Criteria],
) -> SearchEngineResult<Vec<Option<Criteria>>> {
    let search = type_searches.get(kind)?;

    // Identical sub-trees share one lookup.
    let mut codes_by_criteria: HashMap<&Criteria, Vec<String>> = HashMap::new();
    let mut replacements = Vec::with_capacity(originals.len());

    for original in originals {
        let Criteria::EntityType(criterion) = original else {
            replacements.push(Some((*original).clone()));
            continue;
        };
        let sub_criteria = criterion.criteria.as_ref();

        if !codes_by_criteria.contains_key(sub_criteria) {
            let types = search.search(context, sub_criteria).await?;
            codes_by_criteria.insert(sub_criteria, types.into_iter().map(|t| t.code).collect());
        }

        let codes = codes_by_criteria
            .get(sub_criteria)
            .map(Vec::as_slice)
            .unwrap_or_default();
        replacements.push(Some(if codes.is_empty() {
            Criteria::type_codes([NOT_FOUND_CODE])
        } else {
            Criteria::type_codes(codes.iter().cloned())
        }));
    }

    Ok(replacements)
}
