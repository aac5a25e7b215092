//! Search context for engine operations.
//!
//! Every search runs on behalf of a session. The [`SearchContext`] carries the
//! caller's [`SessionToken`], which scopes cached results, plus optional
//! identity used for logging and by the indexed search collaborator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque session handle.
///
/// # Examples
///
/// ```
/// use labbase_search::session::SessionToken;
///
/// let token = SessionToken::new("admin-250101120000000xA1B2");
/// assert_eq!(token.as_str(), "admin-250101120000000xA1B2");
/// assert!(!SessionToken::generate().as_str().is_empty());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps an existing token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Creates a fresh random token.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the token is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SessionToken {
    // Only a prefix is printed; tokens are credentials.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(8).collect();
        write!(f, "SessionToken({prefix}…)")
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix: String = self.0.chars().take(8).collect();
        write!(f, "{prefix}…")
    }
}

/// The caller's context for a search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchContext {
    session: SessionToken,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    correlation_id: Option<String>,
}

impl SearchContext {
    /// Creates a context for the given session.
    pub fn new(session: SessionToken) -> Self {
        Self {
            session,
            user_id: None,
            correlation_id: None,
        }
    }

    /// Sets the user on whose behalf the search runs.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Sets a correlation id for request tracing.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Returns the session token.
    pub fn session(&self) -> &SessionToken {
        &self.session
    }

    /// Returns the user id, if set.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Returns the correlation id, if set.
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let ctx = SearchContext::new(SessionToken::new("tok"))
            .with_user_id("alice")
            .with_correlation_id("req-1");
        assert_eq!(ctx.session().as_str(), "tok");
        assert_eq!(ctx.user_id(), Some("alice"));
        assert_eq!(ctx.correlation_id(), Some("req-1"));
    }

    #[test]
    fn test_debug_hides_token() {
        let token = SessionToken::new("secret-session-token");
        let printed = format!("{token:?}");
        assert!(!printed.contains("session-token"));
    }

    #[test]
    fn test_blank_token() {
        assert!(SessionToken::new("  ").is_blank());
        assert!(!SessionToken::generate().is_blank());
    }
}
