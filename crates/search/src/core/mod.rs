//! Collaborator traits and their lookup tables.

mod collaborators;
mod registry;

pub use collaborators::{
    CandidateSource, EntityTypeSearch, IdResolver, IndexedSearchManager, Translator,
};
pub use registry::{EntityTypeSearches, ResolverRegistry};
