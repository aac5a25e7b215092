//! Leaf matchers.
//!
//! Each matcher evaluates one leaf criterion against a candidate list and
//! returns the order-preserving subsequence of candidates that match.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::core::ResolverRegistry;
use crate::error::{SearchEngineError, SearchEngineResult};
use crate::session::SearchContext;
use crate::types::{
    Candidate, CodeAttribute, CodesCriterion, Criteria, IdCriterion, IdSetCriterion,
    NOT_FOUND_CODE, ObjectId, ResolvedObject, SimpleCriterion, StringFieldCriterion,
};

use super::pattern::StringPattern;

/// Evaluates one leaf criterion.
pub trait LeafMatcher<C: Candidate> {
    /// Returns the matching candidates, in input order.
    fn matches(&self, candidates: &[C]) -> SearchEngineResult<Vec<C>>;
}

fn filter<C: Candidate>(candidates: &[C], mut keep: impl FnMut(&C) -> bool) -> Vec<C> {
    candidates.iter().filter(|c| keep(c)).cloned().collect()
}

/// Ids referenced by a criteria tree, resolved in one batch before matching.
#[derive(Debug, Clone, Default)]
pub struct ResolvedIds {
    requested: HashSet<ObjectId>,
    objects: HashMap<ObjectId, ResolvedObject>,
}

impl ResolvedIds {
    /// Collects every id referenced by identity and identity-set leaves of
    /// `criteria` and resolves them with one call per id tag.
    pub async fn resolve(
        registry: &ResolverRegistry,
        context: &SearchContext,
        criteria: &Criteria,
    ) -> SearchEngineResult<Self> {
        Self::default().complete(registry, context, criteria).await
    }

    /// Resolves the ids of `criteria` that are not already known, keeping the
    /// ones that are. Known ids never reach the registry.
    pub async fn complete(
        mut self,
        registry: &ResolverRegistry,
        context: &SearchContext,
        criteria: &Criteria,
    ) -> SearchEngineResult<Self> {
        let mut requested = HashSet::new();
        collect_ids(criteria, &mut requested);

        let missing: Vec<&ObjectId> = requested
            .iter()
            .filter(|id| !self.requested.contains(*id))
            .collect();
        if !missing.is_empty() {
            let objects = registry.resolve_all(context, missing).await?;
            self.objects.extend(objects);
        }

        self.requested.extend(requested);
        Ok(self)
    }

    /// Records the outcome of resolving `id`; `None` marks a missing object.
    pub fn record(&mut self, id: ObjectId, object: Option<ResolvedObject>) {
        if let Some(object) = object {
            self.objects.insert(id.clone(), object);
        }
        self.requested.insert(id);
    }

    /// Number of ids known to the table, found or not.
    pub fn len(&self) -> usize {
        self.requested.len()
    }

    /// Returns true if no id is known.
    pub fn is_empty(&self) -> bool {
        self.requested.is_empty()
    }

    /// Builds the table directly from already-resolved objects.
    pub fn from_objects(objects: HashMap<ObjectId, ResolvedObject>) -> Self {
        Self {
            requested: objects.keys().cloned().collect(),
            objects,
        }
    }

    /// Returns the surrogate code (permanent id) of `id`, or [`NOT_FOUND_CODE`]
    /// when the object does not exist.
    pub fn surrogate(&self, id: &ObjectId) -> SearchEngineResult<&str> {
        if !self.requested.contains(id) && !self.objects.contains_key(id) {
            return Err(SearchEngineError::UnknownIdKind { id: id.to_string() });
        }
        Ok(self
            .objects
            .get(id)
            .map_or(NOT_FOUND_CODE, |object| object.perm_id.as_str()))
    }
}

fn collect_ids(criteria: &Criteria, out: &mut HashSet<ObjectId>) {
    match criteria {
        Criteria::Composite(composite) => {
            for child in &composite.criteria {
                collect_ids(child, out);
            }
        }
        Criteria::Id(IdCriterion { id: Some(id) }) => {
            out.insert(id.clone());
        }
        Criteria::IdSet(IdSetCriterion { ids: Some(ids) }) => {
            out.extend(ids.iter().cloned());
        }
        _ => {}
    }
}

/// Matches a single identity. An unset id is an open condition.
pub struct IdMatcher<'a> {
    criterion: &'a IdCriterion,
    ids: &'a ResolvedIds,
}

impl<'a> IdMatcher<'a> {
    /// Creates the matcher.
    pub fn new(criterion: &'a IdCriterion, ids: &'a ResolvedIds) -> Self {
        Self { criterion, ids }
    }
}

impl<C: Candidate> LeafMatcher<C> for IdMatcher<'_> {
    fn matches(&self, candidates: &[C]) -> SearchEngineResult<Vec<C>> {
        match &self.criterion.id {
            None => Ok(candidates.to_vec()),
            Some(id) => {
                IdSetMatcher::with_ids(std::slice::from_ref(id), self.ids).matches(candidates)
            }
        }
    }
}

/// Matches a set of identities. An unset or empty set matches nothing.
pub struct IdSetMatcher<'a> {
    ids: Option<&'a [ObjectId]>,
    resolved: &'a ResolvedIds,
}

impl<'a> IdSetMatcher<'a> {
    /// Creates the matcher for a criterion.
    pub fn new(criterion: &'a IdSetCriterion, resolved: &'a ResolvedIds) -> Self {
        Self {
            ids: criterion.ids.as_deref(),
            resolved,
        }
    }

    fn with_ids(ids: &'a [ObjectId], resolved: &'a ResolvedIds) -> Self {
        Self {
            ids: Some(ids),
            resolved,
        }
    }
}

impl<C: Candidate> LeafMatcher<C> for IdSetMatcher<'_> {
    fn matches(&self, candidates: &[C]) -> SearchEngineResult<Vec<C>> {
        let ids = match self.ids {
            Some(ids) if !ids.is_empty() => ids,
            _ => return Ok(Vec::new()),
        };

        let surrogates = ids
            .iter()
            .map(|id| self.resolved.surrogate(id))
            .collect::<SearchEngineResult<HashSet<&str>>>()?;

        Ok(filter(candidates, |c| surrogates.contains(c.perm_id())))
    }
}

/// Exact, case-sensitive code membership.
pub struct CodesMatcher<'a> {
    criterion: &'a CodesCriterion,
}

impl<'a> CodesMatcher<'a> {
    /// Creates the matcher.
    pub fn new(criterion: &'a CodesCriterion) -> Self {
        Self { criterion }
    }
}

impl<C: Candidate> LeafMatcher<C> for CodesMatcher<'_> {
    fn matches(&self, candidates: &[C]) -> SearchEngineResult<Vec<C>> {
        let codes = &self.criterion.codes;
        Ok(match self.criterion.attribute {
            CodeAttribute::Code => filter(candidates, |c| codes.contains(c.code())),
            CodeAttribute::TypeCode => filter(candidates, |c| {
                c.type_code().is_some_and(|code| codes.contains(code))
            }),
        })
    }
}

/// Predicate function for simple criteria: `(candidate, criterion value)`.
pub type SimplePredicate<C> = Arc<dyn Fn(&C, &str) -> bool + Send + Sync>;

/// Caller-registered predicates for simple criteria, by name.
pub struct SimplePredicates<C> {
    predicates: HashMap<String, SimplePredicate<C>>,
}

impl<C> Clone for SimplePredicates<C> {
    fn clone(&self) -> Self {
        Self {
            predicates: self.predicates.clone(),
        }
    }
}

impl<C> Default for SimplePredicates<C> {
    fn default() -> Self {
        Self {
            predicates: HashMap::new(),
        }
    }
}

impl<C: Candidate> SimplePredicates<C> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a predicate under `name`.
    pub fn with<F>(mut self, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&C, &str) -> bool + Send + Sync + 'static,
    {
        self.predicates.insert(name.into(), Arc::new(predicate));
        self
    }

    /// Returns the predicate registered under `name`.
    pub fn get(&self, name: &str) -> SearchEngineResult<&SimplePredicate<C>> {
        self.predicates
            .get(name)
            .ok_or_else(|| SearchEngineError::UnsupportedCriterion {
                criterion: format!("simple criterion '{name}'"),
            })
    }
}

/// Per-candidate custom predicate.
pub struct SimpleMatcher<'a, C> {
    predicate: &'a SimplePredicate<C>,
    value: &'a str,
}

impl<'a, C: Candidate> SimpleMatcher<'a, C> {
    /// Creates the matcher, looking the predicate up by the criterion's name.
    pub fn new(
        criterion: &'a SimpleCriterion,
        predicates: &'a SimplePredicates<C>,
    ) -> SearchEngineResult<Self> {
        Ok(Self {
            predicate: predicates.get(&criterion.name)?,
            value: &criterion.value,
        })
    }
}

impl<C: Candidate> LeafMatcher<C> for SimpleMatcher<'_, C> {
    fn matches(&self, candidates: &[C]) -> SearchEngineResult<Vec<C>> {
        Ok(filter(candidates, |c| (self.predicate)(c, self.value)))
    }
}

/// Wildcard predicate over one textual attribute. A missing attribute is
/// matched as the empty string.
pub struct StringFieldMatcher<'a> {
    field: &'a str,
    pattern: StringPattern,
}

impl<'a> StringFieldMatcher<'a> {
    /// Compiles the matcher for a criterion.
    pub fn new(criterion: &'a StringFieldCriterion) -> SearchEngineResult<Self> {
        Ok(Self {
            field: &criterion.field,
            pattern: StringPattern::compile(&criterion.predicate)?,
        })
    }
}

impl<C: Candidate> LeafMatcher<C> for StringFieldMatcher<'_> {
    fn matches(&self, candidates: &[C]) -> SearchEngineResult<Vec<C>> {
        Ok(filter(candidates, |c| {
            let value = c.text_field(self.field).unwrap_or_default();
            self.pattern.matches(&value)
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::*;
    use crate::types::{EntityKind, StringMatchKind};

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        code: &'static str,
        perm_id: &'static str,
        name: Option<&'static str>,
        type_code: Option<&'static str>,
    }

    impl Candidate for Item {
        fn code(&self) -> &str {
            self.code
        }

        fn perm_id(&self) -> &str {
            self.perm_id
        }

        fn type_code(&self) -> Option<&str> {
            self.type_code
        }

        fn text_field(&self, field: &str) -> Option<Cow<'_, str>> {
            match field {
                "name" => self.name.map(Cow::Borrowed),
                "code" => Some(Cow::Borrowed(self.code)),
                _ => None,
            }
        }
    }

    fn item(
        code: &'static str,
        name: Option<&'static str>,
        type_code: Option<&'static str>,
    ) -> Item {
        let perm_id = match code {
            "A" => "P-A",
            "B" => "P-B",
            _ => "P-C",
        };
        Item {
            code,
            perm_id,
            name,
            type_code,
        }
    }

    fn items() -> Vec<Item> {
        vec![
            item("A", Some("alpha"), Some("T1")),
            item("B", Some("bx"), Some("T2")),
            item("C", None, None),
        ]
    }

    fn codes(result: &[Item]) -> Vec<&str> {
        result.iter().map(|i| i.code).collect()
    }

    fn resolved() -> ResolvedIds {
        let mut objects = HashMap::new();
        objects.insert(
            ObjectId::code(EntityKind::Sample, "A"),
            ResolvedObject::new(1, "P-A", "A"),
        );
        objects.insert(
            ObjectId::tech_id(EntityKind::Sample, 3),
            ResolvedObject::new(3, "P-C", "C"),
        );
        let mut ids = ResolvedIds::from_objects(objects);
        ids.record(ObjectId::code(EntityKind::Sample, "MISSING"), None);
        ids
    }

    #[test]
    fn test_codes_exact_order_preserving() {
        let Criteria::Codes(criterion) = Criteria::codes(["C", "A"]) else {
            unreachable!()
        };
        let result = CodesMatcher::new(&criterion).matches(&items()).unwrap();
        assert_eq!(codes(&result), vec!["A", "C"]);
    }

    #[test]
    fn test_codes_case_sensitive() {
        let Criteria::Codes(criterion) = Criteria::codes(["a"]) else {
            unreachable!()
        };
        assert!(CodesMatcher::new(&criterion).matches(&items()).unwrap().is_empty());
    }

    #[test]
    fn test_type_codes() {
        let Criteria::Codes(criterion) = Criteria::type_codes(["T2"]) else {
            unreachable!()
        };
        let result = CodesMatcher::new(&criterion).matches(&items()).unwrap();
        assert_eq!(codes(&result), vec!["B"]);
    }

    #[test]
    fn test_unset_id_matches_all() {
        let criterion = IdCriterion { id: None };
        let ids = resolved();
        let result = IdMatcher::new(&criterion, &ids).matches(&items()).unwrap();
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_empty_id_set_matches_none() {
        let ids = resolved();
        let empty = IdSetCriterion { ids: Some(vec![]) };
        let unset = IdSetCriterion { ids: None };
        assert!(IdSetMatcher::new(&empty, &ids).matches(&items()).unwrap().is_empty());
        assert!(IdSetMatcher::new(&unset, &ids).matches(&items()).unwrap().is_empty());
    }

    #[test]
    fn test_id_set_resolves_to_perm_ids() {
        let ids = resolved();
        let criterion = IdSetCriterion {
            ids: Some(vec![
                ObjectId::tech_id(EntityKind::Sample, 3),
                ObjectId::code(EntityKind::Sample, "A"),
                ObjectId::code(EntityKind::Sample, "MISSING"),
            ]),
        };
        let result = IdSetMatcher::new(&criterion, &ids).matches(&items()).unwrap();
        assert_eq!(codes(&result), vec!["A", "C"]);
    }

    #[test]
    fn test_unresolved_id_is_unknown() {
        let ids = resolved();
        let criterion = IdCriterion {
            id: Some(ObjectId::perm_id(EntityKind::Tag, "never-collected")),
        };
        let err = LeafMatcher::<Item>::matches(&IdMatcher::new(&criterion, &ids), &items());
        assert!(matches!(err, Err(SearchEngineError::UnknownIdKind { .. })));
    }

    #[tokio::test]
    async fn test_complete_skips_known_ids() {
        let context = SearchContext::new(crate::session::SessionToken::new("s"));
        let registry = ResolverRegistry::new();
        let mut known = ResolvedIds::default();
        known.record(
            ObjectId::tech_id(EntityKind::Sample, 1),
            Some(ResolvedObject::new(1, "P-A", "A")),
        );
        known.record(ObjectId::tech_id(EntityKind::Sample, -1), None);

        let criteria = Criteria::id_set([
            ObjectId::tech_id(EntityKind::Sample, 1),
            ObjectId::tech_id(EntityKind::Sample, -1),
        ]);
        let ids = known.complete(&registry, &context, &criteria).await.unwrap();
        assert_eq!(ids.len(), 2);

        let Criteria::IdSet(criterion) = &criteria else {
            unreachable!()
        };
        let result = IdSetMatcher::new(criterion, &ids).matches(&items()).unwrap();
        assert_eq!(codes(&result), vec!["A"]);

        let unknown = Criteria::id(ObjectId::code(EntityKind::Sample, "A"));
        let err = ids.complete(&registry, &context, &unknown).await.unwrap_err();
        assert!(matches!(err, SearchEngineError::UnknownIdKind { .. }));
    }

    #[test]
    fn test_string_field_missing_value_is_empty() {
        let Criteria::StringField(criterion) =
            Criteria::string_field("name", StringMatchKind::Contains, "x")
        else {
            unreachable!()
        };
        let result = StringFieldMatcher::new(&criterion).unwrap().matches(&items()).unwrap();
        assert_eq!(codes(&result), vec!["B"]);

        let Criteria::StringField(star) =
            Criteria::string_field("name", StringMatchKind::Equals, "*")
        else {
            unreachable!()
        };
        let result = StringFieldMatcher::new(&star).unwrap().matches(&items()).unwrap();
        assert_eq!(result.len(), 3);
    }

    #[test]
    fn test_simple_predicate() {
        let predicates = SimplePredicates::<Item>::new().with("min_name_len", |item, value| {
            item.name.map_or(0, str::len) >= value.parse().unwrap_or(0)
        });
        let Criteria::Simple(criterion) = Criteria::simple("min_name_len", "3") else {
            unreachable!()
        };
        let result = SimpleMatcher::new(&criterion, &predicates)
            .unwrap()
            .matches(&items())
            .unwrap();
        assert_eq!(codes(&result), vec!["A"]);
    }

    #[test]
    fn test_unregistered_simple_predicate() {
        let predicates = SimplePredicates::<Item>::new();
        let Criteria::Simple(criterion) = Criteria::simple("nope", "") else {
            unreachable!()
        };
        assert!(matches!(
            SimpleMatcher::new(&criterion, &predicates),
            Err(SearchEngineError::UnsupportedCriterion { .. })
        ));
    }
}
