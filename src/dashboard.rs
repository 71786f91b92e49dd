//! Dashboard state: one table controller per view plus the active view.

use crate::core::config::ViewMode;
use crate::stats::rows::{
    app_columns, app_default_sort, host_columns, host_default_sort, route_columns, route_default_sort,
    user_agent_columns, user_agent_default_sort,
};
use crate::stats::{AppRow, EventProcessor, HostRow, RouteRow, UserAgentRow};
use crate::table::{
    find_column, ColumnId, ColumnTableController, EditState, ListColumn, TableCommand, TableError,
    MAX_SORT_COLUMNS,
};
use std::fmt::Write as _;
use std::time::Instant;
use tracing::debug;

/// Row counts after one refresh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub total: usize,
    pub displayed: usize,
}

/// All four tables and the view currently shown
pub struct Dashboard {
    view: ViewMode,
    apps: ColumnTableController<AppRow>,
    routes: ColumnTableController<RouteRow>,
    hosts: ColumnTableController<HostRow>,
    user_agents: ColumnTableController<UserAgentRow>,
    last_refresh: Option<Instant>,
}

impl Dashboard {
    pub fn new(view: ViewMode) -> Self {
        Self {
            view,
            apps: ColumnTableController::new(app_columns(), &app_default_sort()),
            routes: ColumnTableController::new(route_columns(), &route_default_sort()),
            hosts: ColumnTableController::new(host_columns(), &host_default_sort()),
            user_agents: ColumnTableController::new(user_agent_columns(), &user_agent_default_sort()),
            last_refresh: None,
        }
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    /// Switch views. Refused while an edit is open on the current view.
    pub fn set_view(&mut self, view: ViewMode) -> Result<(), TableError> {
        if self.edit_state() != EditState::Viewing {
            return Err(TableError::EditInProgress);
        }
        debug!(from = ?self.view, to = ?view, "switching view");
        self.view = view;
        Ok(())
    }

    /// Cycle to the next view
    pub fn next_view(&mut self) -> Result<(), TableError> {
        let next = match self.view {
            ViewMode::Apps => ViewMode::Routes,
            ViewMode::Routes => ViewMode::Hosts,
            ViewMode::Hosts => ViewMode::UserAgents,
            ViewMode::UserAgents => ViewMode::Apps,
        };
        self.set_view(next)
    }

    pub fn last_refresh(&self) -> Option<Instant> {
        self.last_refresh
    }

    /// Pull fresh rows for every view from `processor`
    pub fn refresh(&mut self, processor: &EventProcessor) -> RefreshSummary {
        let apps = processor.app_rows();
        let routes = processor.route_rows();
        let hosts = processor.host_rows();
        let agents = processor.user_agent_rows();
        let total = match self.view {
            ViewMode::Apps => apps.len(),
            ViewMode::Routes => routes.len(),
            ViewMode::Hosts => hosts.len(),
            ViewMode::UserAgents => agents.len(),
        };

        let displayed = [
            self.apps.refresh(apps).len(),
            self.routes.refresh(routes).len(),
            self.hosts.refresh(hosts).len(),
            self.user_agents.refresh(agents).len(),
        ];
        self.last_refresh = Some(Instant::now());

        RefreshSummary {
            total,
            displayed: displayed[self.view_index()],
        }
    }

    fn view_index(&self) -> usize {
        match self.view {
            ViewMode::Apps => 0,
            ViewMode::Routes => 1,
            ViewMode::Hosts => 2,
            ViewMode::UserAgents => 3,
        }
    }

    /// Route a table command to the active view
    pub fn handle(&mut self, command: TableCommand) -> Result<(), TableError> {
        match self.view {
            ViewMode::Apps => self.apps.handle(command),
            ViewMode::Routes => self.routes.handle(command),
            ViewMode::Hosts => self.hosts.handle(command),
            ViewMode::UserAgents => self.user_agents.handle(command),
        }
    }

    pub fn edit_state(&self) -> EditState {
        match self.view {
            ViewMode::Apps => self.apps.state(),
            ViewMode::Routes => self.routes.state(),
            ViewMode::Hosts => self.hosts.state(),
            ViewMode::UserAgents => self.user_agents.state(),
        }
    }

    /// Resolve a user-typed column name on the active view
    pub fn column_id(&self, name: &str) -> Option<ColumnId> {
        match self.view {
            ViewMode::Apps => lookup(self.apps.columns(), name),
            ViewMode::Routes => lookup(self.routes.columns(), name),
            ViewMode::Hosts => lookup(self.hosts.columns(), name),
            ViewMode::UserAgents => lookup(self.user_agents.columns(), name),
        }
    }

    /// Replace the active view's filters with `filters` in one transaction
    pub fn apply_filters(&mut self, filters: &[(String, String)]) -> Result<(), TableError> {
        let resolved = filters
            .iter()
            .map(|(name, text)| {
                self.column_id(name)
                    .map(|id| (id, text.clone()))
                    .ok_or_else(|| TableError::UnknownColumn(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.handle(TableCommand::OpenFilterEditor)?;
        let result = self.fill_filter_editor(resolved);
        if result.is_err() {
            self.handle(TableCommand::Cancel)?;
        }
        result
    }

    fn fill_filter_editor(&mut self, filters: Vec<(ColumnId, String)>) -> Result<(), TableError> {
        // the editor opens with the committed texts
        self.handle(TableCommand::ClearAllFilters)?;
        for (column, text) in filters {
            self.handle(TableCommand::SelectFilterColumn(column))?;
            self.handle(TableCommand::SetFilterText(text))?;
        }
        self.handle(TableCommand::Apply)
    }

    /// Replace the active view's sort with `columns`, primary first. A name
    /// prefixed with '-' flips that column's default direction.
    pub fn apply_sort(&mut self, columns: &[String]) -> Result<(), TableError> {
        if columns.len() > MAX_SORT_COLUMNS {
            return Err(TableError::TooManySortColumns {
                max: MAX_SORT_COLUMNS,
                requested: columns.len(),
            });
        }
        let mut resolved = Vec::with_capacity(columns.len());
        for name in columns {
            let (flip, bare) = match name.strip_prefix('-') {
                Some(bare) => (true, bare),
                None => (false, name.as_str()),
            };
            let id = self
                .column_id(bare)
                .ok_or_else(|| TableError::UnknownColumn(bare.to_string()))?;
            resolved.push((id, flip));
        }

        self.handle(TableCommand::OpenSortEditor)?;
        let result = self.fill_sort_editor(resolved);
        if result.is_err() {
            self.handle(TableCommand::Cancel)?;
        }
        result
    }

    fn fill_sort_editor(&mut self, columns: Vec<(ColumnId, bool)>) -> Result<(), TableError> {
        use crate::table::SlotMove;

        // clear existing slots from the top
        for _ in 0..MAX_SORT_COLUMNS {
            self.handle(TableCommand::DeleteSortSlot)?;
        }
        for (column, flip) in columns {
            self.handle(TableCommand::SelectSortColumn(column))?;
            if flip {
                self.handle(TableCommand::SelectSortColumn(column))?;
            }
            self.handle(TableCommand::MoveSortSlot(SlotMove::Down))?;
        }
        self.handle(TableCommand::Apply)
    }

    /// Plain-text rendering of the active view: header plus up to `limit` rows
    pub fn render_text(&self, limit: usize) -> String {
        match self.view {
            ViewMode::Apps => render(self.apps.columns(), &self.apps.displayed(), limit),
            ViewMode::Routes => render(self.routes.columns(), &self.routes.displayed(), limit),
            ViewMode::Hosts => render(self.hosts.columns(), &self.hosts.displayed(), limit),
            ViewMode::UserAgents => {
                render(self.user_agents.columns(), &self.user_agents.displayed(), limit)
            },
        }
    }

    pub fn apps(&self) -> &ColumnTableController<AppRow> {
        &self.apps
    }

    pub fn routes(&self) -> &ColumnTableController<RouteRow> {
        &self.routes
    }

    pub fn hosts(&self) -> &ColumnTableController<HostRow> {
        &self.hosts
    }

    pub fn user_agents(&self) -> &ColumnTableController<UserAgentRow> {
        &self.user_agents
    }
}

fn lookup<R>(columns: &[ListColumn<R>], name: &str) -> Option<ColumnId> {
    find_column(columns, name)
        .or_else(|| columns.iter().find(|c| c.label().eq_ignore_ascii_case(name)))
        .map(ListColumn::id)
}

fn render<R>(columns: &[ListColumn<R>], rows: &[std::sync::Arc<R>], limit: usize) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .take(limit)
        .map(|row| columns.iter().map(|c| c.value(row).to_text().into_owned()).collect())
        .collect();
    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| cells.iter().map(|r| r[i].len()).fold(c.label().len(), usize::max))
        .collect();

    let mut out = String::new();
    let header: Vec<String> = columns
        .iter()
        .zip(&widths)
        .map(|(c, w)| format!("{:<w$}", c.label(), w = *w))
        .collect();
    let _ = writeln!(out, "{}", header.join("  ").trim_end());
    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{cell:<w$}", w = *w))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AppId, ConfigBuilder, Event, HttpEvent, LogEvent, LogStream, ManualClock, SharedClock};
    use std::time::Duration;

    fn processor() -> EventProcessor {
        let config = ConfigBuilder::new().build().unwrap();
        let clock: SharedClock = ManualClock::new();
        let processor = EventProcessor::new(&config, clock);
        for (app, count) in [("alpha", 3), ("beta", 1), ("gamma", 2)] {
            processor.register_app(AppId::new(app).unwrap(), app);
            for _ in 0..count {
                processor.process(&Event::Http(HttpEvent {
                    app_id: AppId::new(app).unwrap(),
                    instance_index: 0,
                    host: format!("{app}.example.com"),
                    path: "/".to_string(),
                    method: "GET".to_string(),
                    status_code: 200,
                    response_time: Duration::from_millis(10),
                    user_agent: None,
                    remote_address: None,
                }));
            }
        }
        processor
    }

    fn app_names(dashboard: &Dashboard) -> Vec<String> {
        dashboard.apps().displayed().iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_refresh_sorts_by_requests() {
        let mut dashboard = Dashboard::new(ViewMode::Apps);
        let summary = dashboard.refresh(&processor());
        assert_eq!(summary, RefreshSummary { total: 3, displayed: 3 });
        assert_eq!(app_names(&dashboard), vec!["alpha", "gamma", "beta"]);
    }

    #[test]
    fn test_apply_filters_and_sort() {
        let mut dashboard = Dashboard::new(ViewMode::Apps);
        let processor = processor();
        dashboard.refresh(&processor);

        dashboard
            .apply_filters(&[("requests".to_string(), ">1".to_string())])
            .unwrap();
        assert_eq!(app_names(&dashboard), vec!["alpha", "gamma"]);

        dashboard.apply_sort(&["name".to_string()]).unwrap();
        assert_eq!(app_names(&dashboard), vec!["alpha", "gamma"]);
        dashboard.apply_sort(&["-name".to_string()]).unwrap();
        assert_eq!(app_names(&dashboard), vec!["gamma", "alpha"]);
    }

    #[test]
    fn test_bad_filter_leaves_view_usable() {
        let mut dashboard = Dashboard::new(ViewMode::Apps);
        dashboard.refresh(&processor());
        assert!(dashboard
            .apply_filters(&[("requests".to_string(), ")(".to_string())])
            .is_err());
        assert_eq!(dashboard.edit_state(), EditState::Viewing);
        assert_eq!(app_names(&dashboard).len(), 3);
        assert!(dashboard.next_view().is_ok());
        assert_eq!(dashboard.view(), ViewMode::Routes);
    }

    #[test]
    fn test_view_switch_blocked_during_edit() {
        let mut dashboard = Dashboard::new(ViewMode::Hosts);
        dashboard.handle(TableCommand::OpenSortEditor).unwrap();
        assert_eq!(dashboard.set_view(ViewMode::Apps), Err(TableError::EditInProgress));
        dashboard.handle(TableCommand::Cancel).unwrap();
        assert!(dashboard.set_view(ViewMode::Apps).is_ok());
    }

    #[test]
    fn test_render_text() {
        let mut dashboard = Dashboard::new(ViewMode::Hosts);
        dashboard.refresh(&processor());
        let text = dashboard.render_text(2);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("HOST"));
        assert!(lines[1].starts_with("alpha.example.com"));
    }

    #[test]
    fn test_apply_filters_replaces_committed_filters() {
        let mut dashboard = Dashboard::new(ViewMode::Apps);
        dashboard.refresh(&processor());
        dashboard
            .apply_filters(&[("name".to_string(), "^beta$".to_string())])
            .unwrap();
        assert_eq!(app_names(&dashboard), vec!["beta"]);

        dashboard
            .apply_filters(&[("requests".to_string(), ">1".to_string())])
            .unwrap();
        assert_eq!(app_names(&dashboard), vec!["alpha", "gamma"]);
        assert_eq!(dashboard.apps().committed().filters.len(), 1);
    }

    #[test]
    fn test_too_many_sort_columns_rejected() {
        let mut dashboard = Dashboard::new(ViewMode::Apps);
        let before = dashboard.apps().committed();
        let names: Vec<String> = ["name", "app_id", "requests", "rps", "2xx", "5xx"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            dashboard.apply_sort(&names),
            Err(TableError::TooManySortColumns { max: 5, requested: 6 })
        );
        assert_eq!(dashboard.edit_state(), EditState::Viewing);
        assert_eq!(dashboard.apps().committed().sort, before.sort);

        dashboard.apply_sort(&names[..5]).unwrap();
        assert_eq!(dashboard.apps().committed().sort.len(), 5);
    }

    #[test]
    fn test_app_without_http_renders_blank_and_fails_numeric_filter() {
        let config = ConfigBuilder::new().build().unwrap();
        let clock: SharedClock = ManualClock::new();
        let processor = EventProcessor::new(&config, clock);
        processor.process(&Event::Log(LogEvent {
            app_id: AppId::new("quiet").unwrap(),
            source_type: "APP/PROC/WEB".to_string(),
            stream: LogStream::Out,
        }));

        let mut dashboard = Dashboard::new(ViewMode::Apps);
        dashboard.refresh(&processor);
        let text = dashboard.render_text(10);
        assert!(!text.contains("-1"));
        assert_eq!(dashboard.apps().displayed()[0].avg_response_ms, None);

        dashboard
            .apply_filters(&[("resp_ms".to_string(), "<100".to_string())])
            .unwrap();
        assert!(dashboard.apps().displayed().is_empty());
    }

    #[test]
    fn test_unknown_column_name() {
        let mut dashboard = Dashboard::new(ViewMode::Apps);
        assert!(matches!(
            dashboard.apply_sort(&["nope".to_string()]),
            Err(TableError::UnknownColumn(_))
        ));
    }
}
