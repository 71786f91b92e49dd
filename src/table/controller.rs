//! Committed sort/filter state and its edit transaction.
//!
//! The controller is driven from the single-threaded UI path. Committed state
//! lives behind an [`ArcSwap`] and is only ever replaced whole, so any reader
//! holding a snapshot sees either the pre-apply or post-apply spec.

use super::column::{find_column, ColumnId, ListColumn};
use super::filter::{apply_filters, compile_filters, FilterColumn, FilterMap};
use super::sort::{MultiKeySorter, SortColumn, MAX_SORT_COLUMNS};
use super::TableError;
use arc_swap::ArcSwap;
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Ordered sort slots, primary first.
pub type SortSpec = SmallVec<[SortColumn; MAX_SORT_COLUMNS]>;

/// Committed sort spec and filter map
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSpec {
    pub sort: SortSpec,
    pub filters: FilterMap,
}

/// Editor state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Viewing,
    EditingSort,
    EditingFilter,
}

/// Cursor movement in the sort editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotMove {
    Up,
    Down,
}

/// Discrete user commands
#[derive(Debug, Clone, PartialEq)]
pub enum TableCommand {
    OpenSortEditor,
    OpenFilterEditor,
    MoveSortSlot(SlotMove),
    SelectSortColumn(ColumnId),
    DeleteSortSlot,
    SelectFilterColumn(ColumnId),
    SetFilterText(String),
    ClearAllFilters,
    Apply,
    Cancel,
}

#[derive(Debug, Clone)]
struct SortEdit {
    slots: SortSpec,
    cursor: usize,
}

impl SortEdit {
    // The cursor may rest on the first empty slot, never beyond it.
    fn max_cursor(&self) -> usize {
        self.slots.len().min(MAX_SORT_COLUMNS - 1)
    }
}

#[derive(Debug, Clone)]
struct FilterEdit {
    texts: BTreeMap<ColumnId, String>,
    selected: Option<ColumnId>,
}

#[derive(Debug, Clone)]
enum EditTransaction {
    Sort(SortEdit),
    Filter(FilterEdit),
}

/// Owns the committed table spec and recomputes the displayed rows.
pub struct ColumnTableController<R> {
    columns: Vec<ListColumn<R>>,
    committed: ArcSwap<TableSpec>,
    edit: Option<EditTransaction>,
    rows: Vec<Arc<R>>,
    displayed: ArcSwap<Vec<Arc<R>>>,
    last_error: Option<TableError>,
}

impl<R: Send + Sync + 'static> ColumnTableController<R> {
    /// Controller over `columns` with an initial sort spec
    pub fn new(columns: Vec<ListColumn<R>>, initial_sort: &[SortColumn]) -> Self {
        let sort: SortSpec = initial_sort
            .iter()
            .filter(|slot| find_column(&columns, slot.column).is_some())
            .take(MAX_SORT_COLUMNS)
            .copied()
            .collect();
        Self {
            columns,
            committed: ArcSwap::from_pointee(TableSpec {
                sort,
                filters: FilterMap::new(),
            }),
            edit: None,
            rows: Vec::new(),
            displayed: ArcSwap::from_pointee(Vec::new()),
            last_error: None,
        }
    }

    pub fn columns(&self) -> &[ListColumn<R>] {
        &self.columns
    }

    /// Snapshot of the committed spec
    pub fn committed(&self) -> Arc<TableSpec> {
        self.committed.load_full()
    }

    /// The current displayed (filtered, sorted) rows
    pub fn displayed(&self) -> Arc<Vec<Arc<R>>> {
        self.displayed.load_full()
    }

    pub fn state(&self) -> EditState {
        match self.edit {
            None => EditState::Viewing,
            Some(EditTransaction::Sort(_)) => EditState::EditingSort,
            Some(EditTransaction::Filter(_)) => EditState::EditingFilter,
        }
    }

    /// Validation error from the last rejected command, for display
    pub fn last_error(&self) -> Option<&TableError> {
        self.last_error.as_ref()
    }

    /// Working sort slots while the sort editor is open
    pub fn sort_slots(&self) -> Option<&[SortColumn]> {
        match &self.edit {
            Some(EditTransaction::Sort(edit)) => Some(edit.slots.as_slice()),
            _ => None,
        }
    }

    /// Selected sort slot while the sort editor is open
    pub fn sort_cursor(&self) -> Option<usize> {
        match &self.edit {
            Some(EditTransaction::Sort(edit)) => Some(edit.cursor),
            _ => None,
        }
    }

    /// Working filter text for `column` while the filter editor is open
    pub fn filter_text(&self, column: ColumnId) -> Option<&str> {
        match &self.edit {
            Some(EditTransaction::Filter(edit)) => edit.texts.get(column).map(String::as_str),
            _ => None,
        }
    }

    /// Column selected in the filter editor
    pub fn selected_filter_column(&self) -> Option<ColumnId> {
        match &self.edit {
            Some(EditTransaction::Filter(edit)) => edit.selected,
            _ => None,
        }
    }

    /// Replace the full row set and recompute the displayed rows
    pub fn refresh(&mut self, rows: Vec<Arc<R>>) -> Arc<Vec<Arc<R>>> {
        self.rows = rows;
        self.recompute()
    }

    /// Filter then sort `rows` under the committed spec
    pub fn filter_and_sort_data(&self, rows: &[Arc<R>]) -> Vec<Arc<R>> {
        let spec = self.committed.load();
        let mut out = apply_filters(&self.columns, &spec.filters, rows);
        MultiKeySorter::from_spec(&self.columns, &spec.sort).sort(&mut out);
        out
    }

    fn recompute(&mut self) -> Arc<Vec<Arc<R>>> {
        let displayed = Arc::new(self.filter_and_sort_data(&self.rows));
        self.displayed.store(Arc::clone(&displayed));
        displayed
    }

    fn commit(&mut self, spec: TableSpec) {
        self.committed.store(Arc::new(spec));
        self.recompute();
    }

    /// Process one user command.
    ///
    /// On error the edit stays open and the committed spec is unchanged.
    pub fn handle(&mut self, command: TableCommand) -> Result<(), TableError> {
        let result = self.dispatch(command);
        match &result {
            Ok(()) => self.last_error = None,
            Err(e) => {
                warn!(error = %e, "table edit rejected");
                self.last_error = Some(e.clone());
            },
        }
        result
    }

    fn dispatch(&mut self, command: TableCommand) -> Result<(), TableError> {
        match command {
            TableCommand::OpenSortEditor => self.open_sort_editor(),
            TableCommand::OpenFilterEditor => self.open_filter_editor(),
            TableCommand::MoveSortSlot(direction) => {
                let edit = self.sort_edit()?;
                edit.cursor = match direction {
                    SlotMove::Up => edit.cursor.saturating_sub(1),
                    SlotMove::Down => (edit.cursor + 1).min(edit.max_cursor()),
                };
                Ok(())
            },
            TableCommand::SelectSortColumn(column) => self.select_sort_column(column),
            TableCommand::DeleteSortSlot => {
                let edit = self.sort_edit()?;
                if edit.cursor < edit.slots.len() {
                    // remaining slots shift up, trailing slot becomes empty
                    edit.slots.remove(edit.cursor);
                }
                edit.cursor = edit.cursor.min(edit.max_cursor());
                Ok(())
            },
            TableCommand::SelectFilterColumn(column) => {
                if find_column(&self.columns, column).is_none() {
                    return Err(TableError::UnknownColumn(column.to_string()));
                }
                self.filter_edit()?.selected = Some(column);
                Ok(())
            },
            TableCommand::SetFilterText(text) => self.set_filter_text(text),
            TableCommand::ClearAllFilters => self.clear_all_filters(),
            TableCommand::Apply => self.apply(),
            TableCommand::Cancel => {
                if self.edit.take().is_some() {
                    debug!("table edit cancelled");
                }
                Ok(())
            },
        }
    }

    fn open_sort_editor(&mut self) -> Result<(), TableError> {
        if self.edit.is_some() {
            return Err(TableError::EditInProgress);
        }
        let slots = self.committed.load().sort.clone();
        debug!(slots = slots.len(), "sort editor opened");
        self.edit = Some(EditTransaction::Sort(SortEdit { slots, cursor: 0 }));
        Ok(())
    }

    fn open_filter_editor(&mut self) -> Result<(), TableError> {
        if self.edit.is_some() {
            return Err(TableError::EditInProgress);
        }
        let texts = self
            .committed
            .load()
            .filters
            .values()
            .map(|filter| (filter.column(), filter.text().to_string()))
            .collect();
        debug!("filter editor opened");
        self.edit = Some(EditTransaction::Filter(FilterEdit {
            texts,
            selected: None,
        }));
        Ok(())
    }

    fn sort_edit(&mut self) -> Result<&mut SortEdit, TableError> {
        match &mut self.edit {
            Some(EditTransaction::Sort(edit)) => Ok(edit),
            Some(_) => Err(TableError::WrongEditor { expected: "sort" }),
            None => Err(TableError::NoEditInProgress),
        }
    }

    fn filter_edit(&mut self) -> Result<&mut FilterEdit, TableError> {
        match &mut self.edit {
            Some(EditTransaction::Filter(edit)) => Ok(edit),
            Some(_) => Err(TableError::WrongEditor { expected: "filter" }),
            None => Err(TableError::NoEditInProgress),
        }
    }

    fn select_sort_column(&mut self, column: ColumnId) -> Result<(), TableError> {
        let default_direction = find_column(&self.columns, column)
            .ok_or_else(|| TableError::UnknownColumn(column.to_string()))?
            .default_direction();
        let edit = self.sort_edit()?;
        let cursor = edit.cursor;

        if let Some(slot) = edit.slots.get_mut(cursor) {
            if slot.column == column {
                slot.direction = slot.direction.toggled();
                return Ok(());
            }
        }
        if let Some(other) = edit.slots.iter().position(|slot| slot.column == column) {
            return Err(TableError::DuplicateSortColumn {
                column: column.to_string(),
                slot: other + 1,
            });
        }

        let selected = SortColumn::new(column, default_direction);
        match edit.slots.get_mut(cursor) {
            Some(slot) => *slot = selected,
            None => edit.slots.push(selected),
        }
        Ok(())
    }

    fn set_filter_text(&mut self, text: String) -> Result<(), TableError> {
        let edit = match &mut self.edit {
            Some(EditTransaction::Filter(edit)) => edit,
            Some(_) => return Err(TableError::WrongEditor { expected: "filter" }),
            None => return Err(TableError::NoEditInProgress),
        };
        let column_id = edit.selected.ok_or(TableError::NoFilterColumn)?;

        if text.trim().is_empty() {
            edit.texts.remove(column_id);
            return Ok(());
        }

        let column = find_column(&self.columns, column_id)
            .ok_or_else(|| TableError::UnknownColumn(column_id.to_string()))?;
        // keep the text so it can be corrected; Apply refuses it until it compiles
        let validation = FilterColumn::compile(column, &text).map(|_| ());
        edit.texts.insert(column_id, text);
        validation
    }

    fn clear_all_filters(&mut self) -> Result<(), TableError> {
        if self.edit.is_none() {
            // outside the editor this commits straight away
            let sort = self.committed.load().sort.clone();
            debug!("all filters cleared");
            self.commit(TableSpec {
                sort,
                filters: FilterMap::new(),
            });
            return Ok(());
        }
        self.filter_edit()?.texts.clear();
        Ok(())
    }

    fn apply(&mut self) -> Result<(), TableError> {
        let current = self.committed.load_full();
        let spec = match &self.edit {
            None => return Err(TableError::NoEditInProgress),
            Some(EditTransaction::Sort(edit)) => TableSpec {
                sort: edit.slots.clone(),
                filters: current.filters.clone(),
            },
            Some(EditTransaction::Filter(edit)) => TableSpec {
                sort: current.sort.clone(),
                filters: compile_filters(&self.columns, &edit.texts)?,
            },
        };
        debug!(
            sort = spec.sort.len(),
            filters = spec.filters.len(),
            "table edit applied"
        );
        self.edit = None;
        self.commit(spec);
        Ok(())
    }
}
