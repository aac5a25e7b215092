//! Sorting and paging of translated results.

use std::cmp::Ordering;

use crate::types::{SortBy, SortDirection, Sortable};

/// Sorts `objects` by the comparator chain `sort_by`. The sort is stable, so
/// objects that compare equal on every field keep their strategy order. An
/// empty chain leaves the order untouched.
pub fn sort_objects<O: Sortable>(objects: &mut [O], sort_by: &[SortBy]) {
    if sort_by.is_empty() {
        return;
    }

    objects.sort_by(|a, b| {
        sort_by
            .iter()
            .map(|sort| {
                let ordering = a
                    .sort_value(&sort.field)
                    .compare(&b.sort_value(&sort.field));
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            })
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

/// Returns the half-open window `[from, from + count)` of `objects`, clamped
/// to its length. `None` returns everything.
pub fn page<O>(objects: Vec<O>, paging: Option<(usize, usize)>) -> Vec<O> {
    match paging {
        None => objects,
        Some((from, count)) => objects.into_iter().skip(from).take(count).collect(),
    }
}
