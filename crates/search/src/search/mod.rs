//! Search orchestration.
//!
//! - [`SearchExecutor`] - Validates, normalizes, matches, translates, sorts and pages
//! - [`SearchExecutorBuilder`] - Wires collaborators and configuration
//! - [`SearchRequest`] - A transport-level request with optional fields
//! - [`SearchStrategy`] - In-memory matching or delegated indexed search

mod executor;
mod sort;

pub use executor::{SearchExecutor, SearchExecutorBuilder, SearchRequest, SearchStrategy};
pub use sort::{page, sort_objects};
