//! Wildcard string patterns.
//!
//! User patterns use `*` for any run of characters (including none) and `?`
//! for exactly one character. A pattern is compiled once into an anchored
//! regular expression; comparison is case-insensitive because both the
//! pattern and the corpus are lower-cased.

use regex::Regex;

use crate::error::{SearchEngineError, SearchEngineResult};
use crate::types::{StringMatchKind, StringPredicate};

/// A compiled string predicate.
#[derive(Debug, Clone)]
pub enum StringPattern {
    /// Accepts every value.
    Any,
    /// Anchored expression over the lower-cased value.
    Regex(Regex),
}

impl StringPattern {
    /// Compiles a predicate.
    ///
    /// # Examples
    ///
    /// ```
    /// use labbase_search::matcher::StringPattern;
    /// use labbase_search::types::{StringMatchKind, StringPredicate};
    ///
    /// let predicate = StringPredicate::new(StringMatchKind::StartsWith, "ab?d");
    /// let pattern = StringPattern::compile(&predicate).unwrap();
    /// assert!(pattern.matches("ABXD-1"));
    /// assert!(!pattern.matches("abd"));
    /// ```
    pub fn compile(predicate: &StringPredicate) -> SearchEngineResult<Self> {
        let value = match predicate.value.as_deref() {
            Some(v) if !v.is_empty() => v.to_lowercase(),
            _ => return Ok(StringPattern::Any),
        };

        let wildcard = match predicate.kind {
            StringMatchKind::Any => return Ok(StringPattern::Any),
            StringMatchKind::Equals => value,
            StringMatchKind::StartsWith => format!("{value}*"),
            StringMatchKind::EndsWith => format!("*{value}"),
            StringMatchKind::Contains => format!("*{value}*"),
        };

        let expression = wildcard_to_regex(&wildcard);
        Regex::new(&expression)
            .map(StringPattern::Regex)
            .map_err(|e| SearchEngineError::InvalidPattern {
                pattern: wildcard,
                message: e.to_string(),
            })
    }

    /// Tests a value against the pattern.
    pub fn matches(&self, corpus: &str) -> bool {
        match self {
            StringPattern::Any => true,
            StringPattern::Regex(regex) => regex.is_match(&corpus.to_lowercase()),
        }
    }
}

/// Translates a wildcard pattern into an anchored regular expression,
/// quoting literal runs between wildcards.
fn wildcard_to_regex(wildcard: &str) -> String {
    let mut expression = String::from("(?s)^");
    let mut literal = String::new();

    for ch in wildcard.chars() {
        match ch {
            '*' | '?' => {
                if !literal.is_empty() {
                    expression.push_str(&regex::escape(&literal));
                    literal.clear();
                }
                expression.push_str(if ch == '*' { ".*" } else { "." });
            }
            _ => literal.push(ch),
        }
    }
    if !literal.is_empty() {
        expression.push_str(&regex::escape(&literal));
    }

    expression.push('$');
    expression
}
