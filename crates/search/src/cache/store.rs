//! Session-scoped result cache with single-flight population.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::OnceCell;

use crate::error::SearchEngineResult;
use crate::session::{SessionLifecycle, SessionToken};
use crate::types::{CacheMode, Criteria, FetchOptions};

/// Key of a cache entry within one session.
///
/// The cache mode is left out of the fetch options: it says how to use the
/// cache, not what is cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    criteria: Criteria,
    fetch_options: FetchOptions,
}

impl CacheKey {
    /// Builds the key for a search.
    pub fn new(criteria: &Criteria, fetch_options: &FetchOptions) -> Self {
        Self {
            criteria: criteria.clone(),
            fetch_options: fetch_options.without_cache_mode(),
        }
    }
}

/// A lazily populated result. Population happens at most once; a failed
/// population leaves the entry empty.
pub struct CacheEntry<O> {
    value: OnceCell<Arc<Vec<O>>>,
}

impl<O> CacheEntry<O> {
    fn new() -> Self {
        Self {
            value: OnceCell::new(),
        }
    }

    /// Returns true once a result is stored.
    pub fn is_populated(&self) -> bool {
        self.value.initialized()
    }
}

type SessionEntries<O> = Mutex<HashMap<CacheKey, Arc<CacheEntry<O>>>>;

struct CacheState<O> {
    sessions: HashMap<SessionToken, Arc<SessionEntries<O>>>,
    listening: HashSet<SessionToken>,
}

impl<O> Default for CacheState<O> {
    fn default() -> Self {
        Self {
            sessions: HashMap::new(),
            listening: HashSet::new(),
        }
    }
}

/// Per-session memoization of search results.
///
/// Locking happens in two levels. The session's entry map is locked only to
/// evict, look up or create an entry; the entry itself is then populated
/// outside that lock, through a one-shot cell that lets exactly one caller
/// compute while concurrent callers for the same key wait for its result.
///
/// When a [`SessionLifecycle`] is attached, the cache registers one callback
/// per session and drops every entry of the session when it ends.
pub struct SearchCache<O> {
    state: Arc<Mutex<CacheState<O>>>,
    lifecycle: Option<Arc<dyn SessionLifecycle>>,
}

impl<O: Send + Sync + 'static> SearchCache<O> {
    /// Creates a cache without session teardown.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(CacheState::default())),
            lifecycle: None,
        }
    }

    /// Attaches the session lifecycle used for teardown.
    pub fn with_lifecycle(mut self, lifecycle: Arc<dyn SessionLifecycle>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    /// Returns the cached result for the key, computing it with `compute`
    /// according to `mode`.
    ///
    /// - [`CacheMode::NoCache`] always computes and stores nothing.
    /// - [`CacheMode::Cache`] computes only if no result is stored yet.
    /// - [`CacheMode::ReloadAndCache`] discards the stored entry first.
    pub async fn get_or_compute<F, Fut>(
        &self,
        session: &SessionToken,
        key: CacheKey,
        mode: CacheMode,
        compute: F,
    ) -> SearchEngineResult<Arc<Vec<O>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SearchEngineResult<Vec<O>>>,
    {
        if mode == CacheMode::NoCache {
            return compute().await.map(Arc::new);
        }

        let entry = self.entry(session, key, mode == CacheMode::ReloadAndCache);

        let computed = AtomicBool::new(false);
        let value = entry
            .value
            .get_or_try_init(|| {
                computed.store(true, Ordering::Relaxed);
                async move { compute().await.map(Arc::new) }
            })
            .await?;

        tracing::debug!(
            session = %session,
            mode = %mode,
            hit = !computed.load(Ordering::Relaxed),
            results = value.len(),
            "cache lookup"
        );
        Ok(value.clone())
    }

    /// Drops every entry of `session`. Returns how many entries were dropped.
    pub fn evict_session(&self, session: &SessionToken) -> usize {
        let removed = self.state.lock().sessions.remove(session);
        let count = removed.map_or(0, |entries| entries.lock().len());
        tracing::debug!(session = %session, entries = count, "evicted session");
        count
    }

    /// Number of entries across all sessions, populated or not.
    pub fn entry_count(&self) -> usize {
        let sessions: Vec<_> = self.state.lock().sessions.values().cloned().collect();
        sessions.iter().map(|entries| entries.lock().len()).sum()
    }

    /// Number of sessions with a cache slot.
    pub fn session_count(&self) -> usize {
        self.state.lock().sessions.len()
    }

    fn entry(&self, session: &SessionToken, key: CacheKey, reload: bool) -> Arc<CacheEntry<O>> {
        let entries = self.session_entries(session);
        let mut entries = entries.lock();
        if reload && entries.remove(&key).is_some() {
            tracing::debug!(session = %session, "discarded cache entry for reload");
        }
        entries
            .entry(key)
            .or_insert_with(|| Arc::new(CacheEntry::new()))
            .clone()
    }

    fn session_entries(&self, session: &SessionToken) -> Arc<SessionEntries<O>> {
        let (entries, register) = {
            let mut state = self.state.lock();
            let entries = state
                .sessions
                .entry(session.clone())
                .or_insert_with(|| Arc::new(Mutex::new(HashMap::new())))
                .clone();
            let register = self.lifecycle.is_some() && state.listening.insert(session.clone());
            (entries, register)
        };

        // Registered outside the state lock: a lifecycle may end the session
        // synchronously and the callback locks the state.
        if register {
            if let Some(lifecycle) = &self.lifecycle {
                lifecycle.on_session_end(session, teardown_callback(Arc::downgrade(&self.state)));
            }
        }

        entries
    }
}

impl<O: Send + Sync + 'static> Default for SearchCache<O> {
    fn default() -> Self {
        Self::new()
    }
}

fn teardown_callback<O: Send + Sync + 'static>(
    state: Weak<Mutex<CacheState<O>>>,
) -> crate::session::SessionEndCallback {
    Box::new(move |session: &SessionToken| {
        let Some(state) = state.upgrade() else {
            return;
        };
        let removed = {
            let mut state = state.lock();
            state.listening.remove(session);
            state.sessions.remove(session)
        };
        let count = removed.map_or(0, |entries| entries.lock().len());
        tracing::debug!(
            session = %session,
            entries = count,
            "session ended, cache entries dropped"
        );
    })
}
