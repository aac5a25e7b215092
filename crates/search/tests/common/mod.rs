//! Test infrastructure for the search engine.
//!
//! Fixtures describe a small sample collection; mocks implement the
//! collaborator traits over it and record how often they are called.

#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;

// Re-export commonly used items
pub use fixtures::*;
pub use mocks::*;
