use std::sync::Arc;

use tracing::debug;

use crate::columns::TableSchema;
use crate::person::Person;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn indicator(&self) -> &'static str {
        match self {
            SortDirection::Ascending => " ▲",
            SortDirection::Descending => " ▼",
        }
    }
}

/// The active sort key. At most one leaf column is sorted at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    key: Option<(usize, SortDirection)>,
}

impl SortState {
    pub fn unsorted() -> Self {
        Self { key: None }
    }

    pub fn key(&self) -> Option<(usize, SortDirection)> {
        self.key
    }

    pub fn direction_of(&self, column: usize) -> Option<SortDirection> {
        match self.key {
            Some((c, dir)) if c == column => Some(dir),
            _ => None,
        }
    }

    /// Replaces the active key, `None` clears sorting.
    pub fn set_sort(&mut self, column: usize, direction: Option<SortDirection>) {
        self.key = direction.map(|d| (column, d));
    }

    pub fn clear(&mut self) {
        self.key = None;
    }

    /// unsorted -> ascending -> descending -> unsorted. Another column restarts at ascending.
    pub fn toggle(&mut self, column: usize) {
        let next = match self.direction_of(column) {
            None => Some(SortDirection::Ascending),
            Some(SortDirection::Ascending) => Some(SortDirection::Descending),
            Some(SortDirection::Descending) => None,
        };
        self.set_sort(column, next);
    }
}

/// Stable ordering of row indices into `people` for the given sort state.
/// Ties keep insertion order in both directions.
pub fn compute_order(people: &[Person], schema: &TableSchema, sort: &SortState) -> Vec<usize> {
    let mut rows: Vec<usize> = (0..people.len()).collect();

    let Some((column, direction)) = sort.key() else {
        return rows;
    };
    let Some(leaf) = schema.leaf(column) else {
        debug!("Sort column {column} does not exist, keeping insertion order");
        return rows;
    };
    let field = leaf.field;
    debug!("Sorting {} rows by {} {direction:?}", people.len(), field.accessor());

    // sort_by is stable, reversing the comparator keeps equal rows in place.
    match direction {
        SortDirection::Ascending => rows.sort_by(|&a, &b| {
            field
                .value(&people[a])
                .natural_cmp(&field.value(&people[b]))
        }),
        SortDirection::Descending => rows.sort_by(|&a, &b| {
            field
                .value(&people[b])
                .natural_cmp(&field.value(&people[a]))
        }),
    }
    rows
}

pub fn visible_rows(rows: &[usize], page_size: usize) -> &[usize] {
    &rows[..std::cmp::min(page_size, rows.len())]
}

/// A single slot cache for a value derived from `K`.
pub struct Memo<K, V> {
    slot: Option<(K, Arc<V>)>,
}

impl<K: PartialEq, V> Memo<K, V> {
    pub fn new() -> Self {
        Self { slot: None }
    }

    pub fn get_or_compute(&mut self, key: K, compute: impl FnOnce() -> V) -> Arc<V> {
        if let Some((k, v)) = &self.slot
            && *k == key
        {
            return Arc::clone(v);
        }
        let value = Arc::new(compute());
        self.slot = Some((key, Arc::clone(&value)));
        value
    }
}

impl<K: PartialEq, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
