//! Boolean combination of criteria.
//!
//! Every child of a composite node is evaluated against the *same* candidate
//! list; children are independent projections, not a pipeline. Partial
//! results are then combined:
//!
//! | Operator | Result | Order | Duplicates |
//! |----------|--------|-------|------------|
//! | AND | intersection | first child's order | kept as in the first child |
//! | OR | union | first appearance | collapsed by permanent id |
//!
//! A composite with no children returns its input unchanged.

use std::collections::HashSet;

use crate::error::{SearchEngineError, SearchEngineResult};
use crate::types::{Candidate, CompositeCriteria, Criteria, SearchOperator};

use super::leaf::{
    CodesMatcher, IdMatcher, IdSetMatcher, LeafMatcher, ResolvedIds, SimpleMatcher,
    SimplePredicates, StringFieldMatcher,
};

/// Evaluates criteria trees against candidate lists.
pub struct CriteriaMatcher<'a, C: Candidate> {
    ids: &'a ResolvedIds,
    predicates: &'a SimplePredicates<C>,
}

impl<'a, C: Candidate> CriteriaMatcher<'a, C> {
    /// Creates a matcher using pre-resolved ids and registered predicates.
    pub fn new(ids: &'a ResolvedIds, predicates: &'a SimplePredicates<C>) -> Self {
        Self { ids, predicates }
    }

    /// Returns the candidates matching `criteria`.
    pub fn matches(&self, candidates: &[C], criteria: &Criteria) -> SearchEngineResult<Vec<C>> {
        match criteria {
            Criteria::Composite(composite) => self.matches_composite(candidates, composite),
            Criteria::Id(criterion) => IdMatcher::new(criterion, self.ids).matches(candidates),
            Criteria::IdSet(criterion) => {
                IdSetMatcher::new(criterion, self.ids).matches(candidates)
            }
            Criteria::Codes(criterion) => CodesMatcher::new(criterion).matches(candidates),
            Criteria::StringField(criterion) => {
                StringFieldMatcher::new(criterion)?.matches(candidates)
            }
            Criteria::Simple(criterion) => {
                SimpleMatcher::new(criterion, self.predicates)?.matches(candidates)
            }
            Criteria::EntityType(criterion) => Err(SearchEngineError::UnsupportedCriterion {
                criterion: format!(
                    "entity-type criterion for {} (normalize criteria before matching)",
                    criterion.entity
                ),
            }),
        }
    }

    fn matches_composite(
        &self,
        candidates: &[C],
        composite: &CompositeCriteria,
    ) -> SearchEngineResult<Vec<C>> {
        if composite.criteria.is_empty() {
            return Ok(candidates.to_vec());
        }

        let partials = composite
            .criteria
            .iter()
            .map(|child| self.matches(candidates, child))
            .collect::<SearchEngineResult<Vec<_>>>()?;

        Ok(match composite.operator {
            SearchOperator::And => intersection(partials),
            SearchOperator::Or => union(partials),
        })
    }
}

fn intersection<C: Candidate>(partials: Vec<Vec<C>>) -> Vec<C> {
    let mut partials = partials.into_iter();
    let Some(seed) = partials.next() else {
        return Vec::new();
    };

    let others: Vec<HashSet<String>> = partials
        .map(|partial| partial.iter().map(|c| c.perm_id().to_string()).collect())
        .collect();

    seed.into_iter()
        .filter(|c| others.iter().all(|set| set.contains(c.perm_id())))
        .collect()
}

fn union<C: Candidate>(partials: Vec<Vec<C>>) -> Vec<C> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for candidate in partials.into_iter().flatten() {
        if seen.insert(candidate.perm_id().to_string()) {
            merged.push(candidate);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use crate::types::{CompositeCriteria, StringMatchKind};

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        code: &'static str,
        name: &'static str,
    }

    impl Candidate for Item {
        fn code(&self) -> &str {
            self.code
        }

        fn perm_id(&self) -> &str {
            self.code
        }

        fn text_field(&self, field: &str) -> Option<Cow<'_, str>> {
            (field == "name").then_some(Cow::Borrowed(self.name))
        }
    }

    fn item(code: &'static str, name: &'static str) -> Item {
        Item { code, name }
    }

    fn items() -> Vec<Item> {
        vec![item("A", "ax"), item("B", "bx"), item("C", "cy")]
    }

    fn run(criteria: &Criteria, candidates: &[Item]) -> SearchEngineResult<Vec<&'static str>> {
        let ids = ResolvedIds::default();
        let predicates = SimplePredicates::new();
        let matcher = CriteriaMatcher::new(&ids, &predicates);
        Ok(matcher
            .matches(candidates, criteria)?
            .into_iter()
            .map(|i| i.code)
            .collect())
    }

    #[test]
    fn test_code_set_scenario() {
        let result = run(&Criteria::codes(["A", "C"]), &items()).unwrap();
        assert_eq!(result, vec!["A", "C"]);
    }

    #[test]
    fn test_and_scenario() {
        let criteria = Criteria::and(vec![
            Criteria::codes(["A", "B"]),
            Criteria::string_field("name", StringMatchKind::Contains, "b"),
        ]);
        assert_eq!(run(&criteria, &items()).unwrap(), vec!["B"]);
    }

    #[test]
    fn test_and_keeps_first_child_order() {
        let criteria = Criteria::and(vec![
            Criteria::string_field("name", StringMatchKind::EndsWith, "x"),
            Criteria::codes(["B", "A"]),
        ]);
        assert_eq!(run(&criteria, &items()).unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_or_is_union_without_duplicates() {
        let criteria = Criteria::or(vec![
            Criteria::codes(["C"]),
            Criteria::codes(["A", "C"]),
        ]);
        assert_eq!(run(&criteria, &items()).unwrap(), vec!["C", "A"]);
    }

    #[test]
    fn test_or_collapses_input_duplicates() {
        let mut candidates = items();
        candidates.push(item("A", "ax"));

        let codes = Criteria::codes(["A"]);
        assert_eq!(run(&codes, &candidates).unwrap(), vec!["A", "A"]);

        let or = Criteria::or(vec![Criteria::codes(["A"])]);
        assert_eq!(run(&or, &candidates).unwrap(), vec!["A"]);
    }

    #[test]
    fn test_children_see_original_candidates() {
        // The second OR branch must see C even though the first branch excluded it.
        let criteria = Criteria::or(vec![
            Criteria::codes(["A"]),
            Criteria::string_field("name", StringMatchKind::StartsWith, "c"),
        ]);
        assert_eq!(run(&criteria, &items()).unwrap(), vec!["A", "C"]);
    }

    #[test]
    fn test_empty_composite_matches_everything() {
        let criteria: Criteria = CompositeCriteria::new(SearchOperator::Or).into();
        assert_eq!(run(&criteria, &items()).unwrap(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_nested_composites() {
        let criteria = Criteria::and(vec![
            Criteria::or(vec![Criteria::codes(["A"]), Criteria::codes(["B"])]),
            Criteria::or(vec![Criteria::codes(["B"]), Criteria::codes(["C"])]),
        ]);
        assert_eq!(run(&criteria, &items()).unwrap(), vec!["B"]);
    }

    #[test]
    fn test_entity_type_leaf_requires_normalization() {
        let criteria = Criteria::entity_type(
            crate::types::EntityKind::Sample,
            Criteria::codes(["PLATE"]),
        );
        assert!(matches!(
            run(&criteria, &items()),
            Err(SearchEngineError::UnsupportedCriterion { .. })
        ));
    }
}
