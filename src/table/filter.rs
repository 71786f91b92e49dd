//! Per-column filter predicates.
//!
//! Alphanumeric columns filter by regular expression, numeric columns by a
//! boolean expression over the row value (see [`super::expr`]). Filter text is
//! compiled and validated once, when it is accepted from the editor; the
//! committed map only ever holds compiled predicates.

use super::column::{find_column, CellValue, ColumnId, ColumnKind, ListColumn};
use super::expr::{parse_expression, Expr, Scalar, VALIDATION_SENTINEL};
use super::TableError;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Compiled predicate for one column
#[derive(Debug, Clone)]
pub enum FilterPredicate {
    Pattern(Regex),
    Expression(Expr),
}

impl FilterPredicate {
    /// Compile `text` for a column of the given kind
    pub fn compile(column: ColumnId, kind: ColumnKind, text: &str) -> Result<Self, TableError> {
        match kind {
            ColumnKind::Alphanumeric => Regex::new(text)
                .map(FilterPredicate::Pattern)
                .map_err(|e| TableError::InvalidPattern {
                    column: column.to_string(),
                    message: e.to_string(),
                }),
            ColumnKind::Numeric => {
                let expr = parse_expression(text).map_err(|e| TableError::InvalidExpression {
                    column: column.to_string(),
                    message: e.to_string(),
                })?;
                match expr.evaluate(VALIDATION_SENTINEL) {
                    Ok(Scalar::Bool(_)) => Ok(FilterPredicate::Expression(expr)),
                    Ok(other) => Err(TableError::NotBoolean {
                        column: column.to_string(),
                        found: other.type_name(),
                    }),
                    Err(e) => Err(TableError::InvalidExpression {
                        column: column.to_string(),
                        message: e.to_string(),
                    }),
                }
            },
        }
    }

    /// Whether a cell value passes this predicate
    pub fn matches(&self, value: CellValue<'_>) -> bool {
        match (self, value) {
            (FilterPredicate::Pattern(re), CellValue::Text(text)) => re.is_match(text),
            (FilterPredicate::Expression(expr), CellValue::Number(n)) => expr.matches(n),
            // no data never satisfies a numeric condition
            (FilterPredicate::Expression(_), CellValue::Empty) => false,
            // cross-kind pairs only arise if a column changes kind between
            // compile and evaluation; fall back to the textual form
            (FilterPredicate::Pattern(re), number) => re.is_match(&number.to_text()),
            (FilterPredicate::Expression(expr), CellValue::Text(text)) => {
                text.trim().parse::<f64>().map_or(false, |n| expr.matches(n))
            },
        }
    }
}

/// Committed filter for one column
#[derive(Debug, Clone)]
pub struct FilterColumn {
    column: ColumnId,
    text: String,
    predicate: FilterPredicate,
}

impl FilterColumn {
    /// Compile `text` against `column`
    pub fn compile<R>(column: &ListColumn<R>, text: &str) -> Result<Self, TableError> {
        let predicate = FilterPredicate::compile(column.id(), column.kind(), text)?;
        Ok(Self {
            column: column.id(),
            text: text.to_string(),
            predicate,
        })
    }

    pub fn column(&self) -> ColumnId {
        self.column
    }

    /// Filter text as entered
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn predicate(&self) -> &FilterPredicate {
        &self.predicate
    }
}

impl PartialEq for FilterColumn {
    fn eq(&self, other: &Self) -> bool {
        self.column == other.column && self.text == other.text
    }
}

/// Column id to committed filter. Absence means no filter.
pub type FilterMap = BTreeMap<ColumnId, FilterColumn>;

/// Compile raw filter texts for `columns`; empty texts are dropped
pub fn compile_filters<R>(
    columns: &[ListColumn<R>],
    texts: &BTreeMap<ColumnId, String>,
) -> Result<FilterMap, TableError> {
    let mut filters = FilterMap::new();
    for (&id, text) in texts {
        if text.trim().is_empty() {
            continue;
        }
        let column = find_column(columns, id).ok_or_else(|| TableError::UnknownColumn(id.to_string()))?;
        filters.insert(id, FilterColumn::compile(column, text)?);
    }
    Ok(filters)
}

/// True when `row` passes every committed filter
pub fn row_matches<R>(columns: &[ListColumn<R>], filters: &FilterMap, row: &R) -> bool {
    filters.values().all(|filter| match find_column(columns, filter.column) {
        Some(column) => filter.predicate.matches(column.value(row)),
        // a filter on a column this table does not have cannot reject anything
        None => true,
    })
}

/// Rows passing every committed filter, in input order
pub fn apply_filters<R>(columns: &[ListColumn<R>], filters: &FilterMap, rows: &[Arc<R>]) -> Vec<Arc<R>> {
    if filters.is_empty() {
        return rows.to_vec();
    }
    rows.iter()
        .filter(|row| row_matches(columns, filters, row))
        .map(Arc::clone)
        .collect()
}
