//! Multi-key stable sorting of table rows.

use super::column::{find_column, ColumnId, ListColumn, SortDirection};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Most sort keys a table can hold at once.
pub const MAX_SORT_COLUMNS: usize = 5;

/// One precedence slot of the active sort spec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortColumn {
    pub column: ColumnId,
    pub direction: SortDirection,
}

impl SortColumn {
    pub fn new(column: ColumnId, direction: SortDirection) -> Self {
        Self { column, direction }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.direction)
    }
}

/// Direction-aware row comparator.
pub type RowComparator<R> = Box<dyn Fn(&R, &R) -> Ordering + Send + Sync>;

/// Chained comparators applied in precedence order.
///
/// Each comparator already encodes its direction. Sorting is stable, so rows
/// that tie on every key keep their input order across refreshes.
pub struct MultiKeySorter<R> {
    comparators: Vec<RowComparator<R>>,
}

impl<R> fmt::Debug for MultiKeySorter<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiKeySorter")
            .field("keys", &self.comparators.len())
            .finish()
    }
}

impl<R: 'static> MultiKeySorter<R> {
    /// Sorter over explicit comparators, primary first
    pub fn new(comparators: Vec<RowComparator<R>>) -> Self {
        Self { comparators }
    }

    /// Sorter for a sort spec over `columns`; slots naming unknown columns are skipped
    pub fn from_spec(columns: &[ListColumn<R>], spec: &[SortColumn]) -> Self {
        let comparators = spec
            .iter()
            .filter_map(|slot| {
                let column = find_column(columns, slot.column)?.clone();
                let direction = slot.direction;
                let comparator: RowComparator<R> =
                    Box::new(move |a: &R, b: &R| column.compare_directed(a, b, direction));
                Some(comparator)
            })
            .collect();
        Self { comparators }
    }

    /// Number of active keys
    pub fn len(&self) -> usize {
        self.comparators.len()
    }

    /// True when no keys are active
    pub fn is_empty(&self) -> bool {
        self.comparators.is_empty()
    }

    /// Compare two rows key by key
    #[inline]
    pub fn compare(&self, a: &R, b: &R) -> Ordering {
        for comparator in &self.comparators {
            let ordering = comparator(a, b);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Stable in-place sort
    pub fn sort(&self, rows: &mut [Arc<R>]) {
        if self.comparators.is_empty() {
            return;
        }
        rows.sort_by(|a, b| self.compare(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct Row {
        id: u32,
        app: &'static str,
        status: f64,
        rps: f64,
    }

    fn columns() -> Vec<ListColumn<Row>> {
        vec![
            ListColumn::alphanumeric("app", "APP", |r: &Row| r.app),
            ListColumn::numeric("status", "STATUS", |r: &Row| r.status),
            ListColumn::numeric("rps", "RPS", |r: &Row| r.rps),
        ]
    }

    fn rows() -> Vec<Arc<Row>> {
        vec![
            Arc::new(Row { id: 1, app: "b", status: 200.0, rps: 5.0 }),
            Arc::new(Row { id: 2, app: "a", status: 500.0, rps: 5.0 }),
            Arc::new(Row { id: 3, app: "a", status: 200.0, rps: 9.0 }),
            Arc::new(Row { id: 4, app: "b", status: 200.0, rps: 5.0 }),
            Arc::new(Row { id: 5, app: "a", status: 200.0, rps: 1.0 }),
        ]
    }

    fn ids(rows: &[Arc<Row>]) -> Vec<u32> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_three_key_precedence() {
        let spec = [
            SortColumn::new("app", SortDirection::Ascending),
            SortColumn::new("status", SortDirection::Ascending),
            SortColumn::new("rps", SortDirection::Descending),
        ];
        let sorter = MultiKeySorter::from_spec(&columns(), &spec);
        let mut rows = rows();
        sorter.sort(&mut rows);
        assert_eq!(ids(&rows), vec![3, 5, 2, 1, 4]);
    }

    #[test]
    fn test_reversing_one_key_only_flips_that_key() {
        let spec = [
            SortColumn::new("app", SortDirection::Ascending),
            SortColumn::new("status", SortDirection::Descending),
            SortColumn::new("rps", SortDirection::Descending),
        ];
        let sorter = MultiKeySorter::from_spec(&columns(), &spec);
        let mut rows = rows();
        sorter.sort(&mut rows);
        assert_eq!(ids(&rows), vec![2, 3, 5, 1, 4]);
    }

    #[test]
    fn test_stable_across_repeated_sorts() {
        let spec = [SortColumn::new("status", SortDirection::Ascending)];
        let sorter = MultiKeySorter::from_spec(&columns(), &spec);
        let mut rows = rows();
        sorter.sort(&mut rows);
        let first = ids(&rows);
        assert_eq!(first, vec![1, 3, 4, 5, 2]);
        for _ in 0..10 {
            sorter.sort(&mut rows);
            assert_eq!(ids(&rows), first);
        }
    }

    #[test]
    fn test_empty_spec_preserves_order() {
        let sorter = MultiKeySorter::from_spec(&columns(), &[]);
        assert!(sorter.is_empty());
        let mut rows = rows();
        sorter.sort(&mut rows);
        assert_eq!(ids(&rows), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_custom_comparators() {
        let by_id_desc: RowComparator<Row> = Box::new(|a: &Row, b: &Row| b.id.cmp(&a.id));
        let sorter = MultiKeySorter::new(vec![by_id_desc]);
        assert_eq!(sorter.len(), 1);
        let mut rows = rows();
        sorter.sort(&mut rows);
        assert_eq!(ids(&rows), vec![5, 4, 3, 2, 1]);
    }
}
