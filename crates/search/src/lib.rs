//! LabBase Search Engine
//!
//! This crate provides the generic criteria engine every LabBase entity search
//! (spaces, projects, experiments, samples, data sets, materials, tags) is
//! built on. A boolean criteria tree is normalized into surrogate keys,
//! evaluated against candidates, translated, sorted and paged, and optionally
//! memoized per session.
//!
//! # Features
//!
//! - **Criteria trees**: AND / OR composites over identity, code-set, string-field,
//!   entity-type and custom leaves
//! - **Normalization**: object references rewritten into technical ids and type codes,
//!   resolved in one batch per id kind
//! - **Two strategies**: brute-force in-memory matching or delegated indexed search
//! - **Session cache**: single-flight population, dropped when the session ends
//!
//! # Architecture
//!
//! - [`types`] - Criteria, object ids, fetch options and results
//! - [`error`] - Error types for all operations
//! - [`session`] - Search context and session lifecycle
//! - [`core`] - Collaborator traits and their lookup tables
//! - [`matcher`] - Wildcard patterns, leaf matchers and boolean combination
//! - [`normalize`] - Reference-to-surrogate rewriting
//! - [`cache`] - Per-session result cache
//! - [`search`] - The search executor
//! - [`config`] - Engine configuration
//!
//! # Criteria
//!
//! ```
//! use labbase_search::types::{
//!     CompositeCriteria, Criteria, EntityKind, ObjectId, StringMatchKind,
//! };
//!
//! // Samples PLATE-1 or PLATE-2 whose name starts with "plate"
//! let criteria: Criteria = CompositeCriteria::search(EntityKind::Sample)
//!     .with(Criteria::id_set([
//!         ObjectId::code(EntityKind::Sample, "PLATE-1"),
//!         ObjectId::code(EntityKind::Sample, "PLATE-2"),
//!     ]))
//!     .with(Criteria::string_field("name", StringMatchKind::StartsWith, "plate"))
//!     .into();
//!
//! assert!(criteria.is_composite());
//! ```
//!
//! # Searching
//!
//! ```no_run
//! use std::sync::Arc;
//! use labbase_search::core::{CandidateSource, Translator};
//! use labbase_search::session::{SearchContext, SessionRegistry, SessionToken};
//! use labbase_search::types::{Candidate, CacheMode, Criteria, FetchOptions, SortBy, Sortable};
//! use labbase_search::{SearchExecutor, SearchEngineResult};
//!
//! async fn run<C: Candidate, O: Sortable>(
//!     source: Arc<dyn CandidateSource<C>>,
//!     translator: Arc<dyn Translator<C, O>>,
//! ) -> SearchEngineResult<usize> {
//!     let executor = SearchExecutor::builder()
//!         .in_memory(source)
//!         .translator(translator)
//!         .session_lifecycle(Arc::new(SessionRegistry::new()))
//!         .build()?;
//!
//!     let context = SearchContext::new(SessionToken::generate());
//!     let options = FetchOptions::new()
//!         .with_cache_mode(CacheMode::Cache)
//!         .with_sort(SortBy::asc("code"))
//!         .with_page(0, 20);
//!
//!     let result = executor
//!         .search_with(&context, &Criteria::codes(["A", "C"]), &options)
//!         .await?;
//!     Ok(result.total_count)
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cache;
pub mod config;
pub mod core;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod search;
pub mod session;
pub mod types;

// Re-export commonly used types at crate root
pub use config::EngineConfig;
pub use error::{SearchEngineError, SearchEngineResult};
pub use search::{SearchExecutor, SearchExecutorBuilder, SearchRequest, SearchStrategy};
pub use session::{SearchContext, SessionToken};
pub use types::{Criteria, FetchOptions, SearchObjectsResult};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Initializes logging with the given level.
///
/// `RUST_LOG` takes precedence when set.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("labbase_search={}", level)));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
