//! Search results.

use serde::{Deserialize, Serialize};

/// A sorted, paged search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchObjectsResult<T> {
    /// The objects of the requested page.
    pub objects: Vec<T>,

    /// Number of matching objects before paging.
    pub total_count: usize,
}

impl<T> SearchObjectsResult<T> {
    /// Creates a result.
    pub fn new(objects: Vec<T>, total_count: usize) -> Self {
        Self {
            objects,
            total_count,
        }
    }

    /// Creates an empty result.
    pub fn empty() -> Self {
        Self {
            objects: Vec::new(),
            total_count: 0,
        }
    }

    /// Returns true if the page is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Returns the number of objects in the page.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Maps the objects to a different type.
    pub fn map<U, F>(self, f: F) -> SearchObjectsResult<U>
    where
        F: FnMut(T) -> U,
    {
        SearchObjectsResult {
            objects: self.objects.into_iter().map(f).collect(),
            total_count: self.total_count,
        }
    }
}

impl<T> Default for SearchObjectsResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}
