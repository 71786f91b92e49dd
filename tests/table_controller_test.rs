//! Table controller transaction tests: sort and filter edits, apply, cancel.

use std::sync::Arc;
use firetop_lib::table::{
    ColumnTableController, EditState, ListColumn, SlotMove, SortColumn, SortDirection, TableCommand,
    TableError,
};
use pretty_assertions::assert_eq;

#[derive(Debug)]
struct Row {
    id: u32,
    name: &'static str,
    ratio: f64,
    hits: f64,
}

fn rows() -> Vec<Arc<Row>> {
    vec![
        Arc::new(Row { id: 1, name: "appa", ratio: 0.10, hits: 5.0 }),
        Arc::new(Row { id: 2, name: "appb", ratio: 0.20, hits: 5.0 }),
        Arc::new(Row { id: 3, name: "appc", ratio: 0.30, hits: 9.0 }),
        Arc::new(Row { id: 4, name: "appa", ratio: 0.25, hits: 1.0 }),
    ]
}

fn table() -> ColumnTableController<Row> {
    let columns = vec![
        ListColumn::alphanumeric("name", "NAME", |r: &Row| r.name),
        ListColumn::numeric("ratio", "RATIO", |r: &Row| r.ratio),
        ListColumn::numeric("hits", "HITS", |r: &Row| r.hits),
    ];
    let mut table = ColumnTableController::new(
        columns,
        &[SortColumn::new("hits", SortDirection::Descending)],
    );
    table.refresh(rows());
    table
}

fn ids(rows: &[Arc<Row>]) -> Vec<u32> {
    rows.iter().map(|r| r.id).collect()
}

fn set_filter(table: &mut ColumnTableController<Row>, column: &'static str, text: &str) -> Result<(), TableError> {
    table.handle(TableCommand::OpenFilterEditor)?;
    table.handle(TableCommand::SelectFilterColumn(column))?;
    table.handle(TableCommand::SetFilterText(text.to_string()))?;
    table.handle(TableCommand::Apply)
}

#[test]
fn test_cancel_restores_pre_edit_sort() {
    let mut table = table();
    let before = table.committed();
    let displayed = table.displayed();

    table.handle(TableCommand::OpenSortEditor).unwrap();
    table.handle(TableCommand::SelectSortColumn("name")).unwrap();
    table.handle(TableCommand::MoveSortSlot(SlotMove::Down)).unwrap();
    table.handle(TableCommand::SelectSortColumn("ratio")).unwrap();
    assert_eq!(table.state(), EditState::EditingSort);
    table.handle(TableCommand::Cancel).unwrap();

    assert_eq!(table.state(), EditState::Viewing);
    assert!(Arc::ptr_eq(&before, &table.committed()));
    assert!(Arc::ptr_eq(&displayed, &table.displayed()));
    // cancelling again is harmless
    assert_eq!(table.handle(TableCommand::Cancel), Ok(()));
}

#[test]
fn test_apply_sort_reflected_in_recompute() {
    let mut table = table();
    assert_eq!(ids(&table.displayed()), vec![3, 1, 2, 4]);

    table.handle(TableCommand::OpenSortEditor).unwrap();
    table.handle(TableCommand::MoveSortSlot(SlotMove::Down)).unwrap();
    table.handle(TableCommand::SelectSortColumn("ratio")).unwrap();
    table.handle(TableCommand::Apply).unwrap();

    assert_eq!(
        table.committed().sort.as_slice(),
        &[
            SortColumn::new("hits", SortDirection::Descending),
            SortColumn::new("ratio", SortDirection::Descending),
        ]
    );
    assert_eq!(ids(&table.filter_and_sort_data(&rows())), vec![3, 2, 1, 4]);
    assert_eq!(ids(&table.displayed()), vec![3, 2, 1, 4]);
}

#[test]
fn test_delete_slot_compacts_upward() {
    let mut table = table();
    table.handle(TableCommand::OpenSortEditor).unwrap();
    table.handle(TableCommand::MoveSortSlot(SlotMove::Down)).unwrap();
    table.handle(TableCommand::SelectSortColumn("name")).unwrap();
    table.handle(TableCommand::MoveSortSlot(SlotMove::Down)).unwrap();
    table.handle(TableCommand::SelectSortColumn("ratio")).unwrap();

    table.handle(TableCommand::MoveSortSlot(SlotMove::Up)).unwrap();
    table.handle(TableCommand::MoveSortSlot(SlotMove::Up)).unwrap();
    table.handle(TableCommand::DeleteSortSlot).unwrap();
    assert_eq!(
        table.sort_slots().unwrap(),
        &[
            SortColumn::new("name", SortDirection::Ascending),
            SortColumn::new("ratio", SortDirection::Descending),
        ]
    );
    table.handle(TableCommand::Apply).unwrap();
    assert_eq!(ids(&table.displayed()), vec![4, 1, 2, 3]);
}

#[test]
fn test_pattern_and_numeric_filters() {
    let mut table = table();
    set_filter(&mut table, "name", "app[ab]").unwrap();
    assert_eq!(ids(&table.displayed()), vec![1, 2, 4]);

    set_filter(&mut table, "ratio", ">0.15").unwrap();
    assert_eq!(ids(&table.displayed()), vec![2, 4]);
    assert_eq!(table.committed().filters.len(), 2);
}

#[test]
fn test_invalid_filter_keeps_prior_commit() {
    let mut table = table();
    set_filter(&mut table, "ratio", ">0.15").unwrap();
    let before = table.committed();

    let err = set_filter(&mut table, "ratio", ")(").unwrap_err();
    assert!(matches!(err, TableError::InvalidExpression { .. }));
    assert_eq!(table.state(), EditState::EditingFilter);
    assert_eq!(table.filter_text("ratio"), Some(")("));
    assert!(table.last_error().is_some());

    // Apply refuses the working copy while it is invalid
    assert!(table.handle(TableCommand::Apply).is_err());
    table.handle(TableCommand::Cancel).unwrap();

    assert!(Arc::ptr_eq(&before, &table.committed()));
    assert_eq!(ids(&table.displayed()), vec![3, 2, 4]);
}

#[test]
fn test_invalid_pattern_rejected() {
    let mut table = table();
    let err = set_filter(&mut table, "name", "app[").unwrap_err();
    assert!(matches!(err, TableError::InvalidPattern { .. }));
    table.handle(TableCommand::Cancel).unwrap();
    assert!(table.committed().filters.is_empty());
}

#[test]
fn test_non_boolean_expression_rejected() {
    let mut table = table();
    let err = set_filter(&mut table, "hits", "value + 1").unwrap_err();
    assert!(matches!(err, TableError::NotBoolean { .. }));
}

#[test]
fn test_clear_filters_inside_editor_needs_apply() {
    let mut table = table();
    set_filter(&mut table, "name", "appa").unwrap();
    assert_eq!(ids(&table.displayed()), vec![1, 4]);

    table.handle(TableCommand::OpenFilterEditor).unwrap();
    table.handle(TableCommand::ClearAllFilters).unwrap();
    assert_eq!(table.filter_text("name"), None);
    assert_eq!(ids(&table.displayed()), vec![1, 4]);

    table.handle(TableCommand::Apply).unwrap();
    assert!(table.committed().filters.is_empty());
    assert_eq!(ids(&table.displayed()), vec![3, 1, 2, 4]);
}

#[test]
fn test_recompute_is_idempotent() {
    let table = table();
    let first = table.filter_and_sort_data(&rows());
    let second = table.filter_and_sort_data(&rows());
    assert_eq!(ids(&first), ids(&second));
    assert_eq!(ids(&first), vec![3, 1, 2, 4]);
}
