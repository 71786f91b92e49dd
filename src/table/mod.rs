//! Interactive table engine.
//!
//! Turns a snapshot of stat rows into the ordered, filtered sequence the
//! renderer draws:
//! - `column`: typed column descriptors
//! - `sort`: stable multi-key sorter
//! - `filter` / `expr`: per-column regex and numeric-expression filters
//! - `controller`: committed sort/filter state and the edit transaction

pub mod column;
pub mod controller;
pub mod expr;
pub mod filter;
pub mod sort;

use thiserror::Error;

pub use column::{find_column, CellValue, ColumnId, ColumnKind, ListColumn, SortDirection};
pub use controller::{ColumnTableController, EditState, SlotMove, TableCommand, TableSpec};
pub use filter::{FilterColumn, FilterMap, FilterPredicate};
pub use sort::{MultiKeySorter, RowComparator, SortColumn, MAX_SORT_COLUMNS};

/// Rejected table edits. The committed state is never touched when one of
/// these is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    #[error("invalid pattern for column '{column}': {message}")]
    InvalidPattern { column: String, message: String },

    #[error("invalid expression for column '{column}': {message}")]
    InvalidExpression { column: String, message: String },

    #[error("filter for column '{column}' must evaluate to a boolean, got {found}")]
    NotBoolean { column: String, found: &'static str },

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("column '{column}' is already sorted in slot {slot}")]
    DuplicateSortColumn { column: String, slot: usize },

    #[error("no edit in progress")]
    NoEditInProgress,

    #[error("an edit is already in progress")]
    EditInProgress,

    #[error("command requires the {expected} editor")]
    WrongEditor { expected: &'static str },

    #[error("no filter column selected")]
    NoFilterColumn,

    #[error("at most {max} sort columns are supported, got {requested}")]
    TooManySortColumns { max: usize, requested: usize },
}
