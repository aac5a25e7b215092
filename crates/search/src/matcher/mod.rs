//! In-memory matching of criteria against candidate lists.
//!
//! - [`StringPattern`] - Wildcard patterns compiled to anchored expressions
//! - [`LeafMatcher`] and its implementations - One leaf criterion each
//! - [`CriteriaMatcher`] - AND / OR combination over whole trees
//!
//! Ids referenced by the tree are resolved once up front into
//! [`ResolvedIds`], so matching itself is synchronous.

mod combinator;
mod leaf;
mod pattern;

pub use combinator::CriteriaMatcher;
pub use leaf::{
    CodesMatcher, IdMatcher, IdSetMatcher, LeafMatcher, ResolvedIds, SimpleMatcher,
    SimplePredicate, SimplePredicates, StringFieldMatcher,
};
pub use pattern::StringPattern;
