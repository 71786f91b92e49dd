//! Column descriptors for the stats tables.
//!
//! A column is either alphanumeric or numeric. The variant is fixed when the
//! column is defined and carries the accessor used for sorting, filtering and
//! display, so no per-row type inspection happens.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;

/// Stable column identifier.
pub type ColumnId = &'static str;

/// Sort direction of a column or sort slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// The opposite direction
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Apply this direction to an ascending ordering
    #[inline]
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "asc"),
            SortDirection::Descending => write!(f, "desc"),
        }
    }
}

/// Value type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Alphanumeric,
    Numeric,
}

/// Typed accessor for a column's value in a row
pub enum ColumnAccessor<R> {
    Alphanumeric(fn(&R) -> &str),
    Numeric(fn(&R) -> f64),
    /// Numeric value that may be absent, e.g. an average over an empty window
    OptionalNumeric(fn(&R) -> Option<f64>),
}

impl<R> Clone for ColumnAccessor<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for ColumnAccessor<R> {}

/// A row's value for one column
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Text(&'a str),
    Number(f64),
    /// No data for this cell
    Empty,
}

impl CellValue<'_> {
    /// Display text for the cell
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            CellValue::Text(s) => Cow::Borrowed(s),
            CellValue::Number(n) => Cow::Owned(format_number(*n)),
            CellValue::Empty => Cow::Borrowed("-"),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{:.2}", n)
    }
}

/// Static per-column descriptor
pub struct ListColumn<R> {
    id: ColumnId,
    label: &'static str,
    default_direction: SortDirection,
    accessor: ColumnAccessor<R>,
}

impl<R> Clone for ListColumn<R> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            label: self.label,
            default_direction: self.default_direction,
            accessor: self.accessor,
        }
    }
}

impl<R> fmt::Debug for ListColumn<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListColumn")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("kind", &self.kind())
            .field("default_direction", &self.default_direction)
            .finish()
    }
}

impl<R> ListColumn<R> {
    /// Alphanumeric column, sorted ascending by default
    pub fn alphanumeric(id: ColumnId, label: &'static str, accessor: fn(&R) -> &str) -> Self {
        Self {
            id,
            label,
            default_direction: SortDirection::Ascending,
            accessor: ColumnAccessor::Alphanumeric(accessor),
        }
    }

    /// Numeric column, sorted descending by default
    pub fn numeric(id: ColumnId, label: &'static str, accessor: fn(&R) -> f64) -> Self {
        Self {
            id,
            label,
            default_direction: SortDirection::Descending,
            accessor: ColumnAccessor::Numeric(accessor),
        }
    }

    /// Numeric column whose value may be missing, sorted descending by default
    pub fn optional_numeric(id: ColumnId, label: &'static str, accessor: fn(&R) -> Option<f64>) -> Self {
        Self {
            id,
            label,
            default_direction: SortDirection::Descending,
            accessor: ColumnAccessor::OptionalNumeric(accessor),
        }
    }

    pub fn id(&self) -> ColumnId {
        self.id
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn default_direction(&self) -> SortDirection {
        self.default_direction
    }

    pub fn kind(&self) -> ColumnKind {
        match self.accessor {
            ColumnAccessor::Alphanumeric(_) => ColumnKind::Alphanumeric,
            ColumnAccessor::Numeric(_) | ColumnAccessor::OptionalNumeric(_) => ColumnKind::Numeric,
        }
    }

    /// The row's value for this column
    #[inline]
    pub fn value<'a>(&self, row: &'a R) -> CellValue<'a> {
        match self.accessor {
            ColumnAccessor::Alphanumeric(get) => CellValue::Text(get(row)),
            ColumnAccessor::Numeric(get) => CellValue::Number(get(row)),
            ColumnAccessor::OptionalNumeric(get) => get(row).map_or(CellValue::Empty, CellValue::Number),
        }
    }

    /// Ascending comparison of two rows on this column
    #[inline]
    pub fn compare(&self, a: &R, b: &R) -> Ordering {
        self.compare_directed(a, b, SortDirection::Ascending)
    }

    /// Comparison of two rows in `direction`. Missing values sort last either way.
    #[inline]
    pub fn compare_directed(&self, a: &R, b: &R, direction: SortDirection) -> Ordering {
        match self.accessor {
            ColumnAccessor::Alphanumeric(get) => direction.apply(get(a).cmp(get(b))),
            ColumnAccessor::Numeric(get) => direction.apply(get(a).total_cmp(&get(b))),
            ColumnAccessor::OptionalNumeric(get) => match (get(a), get(b)) {
                (Some(x), Some(y)) => direction.apply(x.total_cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

/// Find a column by id
pub fn find_column<'a, R>(columns: &'a [ListColumn<R>], id: &str) -> Option<&'a ListColumn<R>> {
    columns.iter().find(|column| column.id == id)
}
