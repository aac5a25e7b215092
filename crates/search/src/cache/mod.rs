//! Result caching.
//!
//! Results are memoized per session under a [`CacheKey`] built from the
//! normalized criteria and the fetch options. See [`SearchCache`] for the
//! locking discipline and session teardown.

mod store;

pub use store::{CacheEntry, CacheKey, SearchCache};
