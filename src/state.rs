use std::cmp::Ordering;
use std::collections::{BTreeSet, VecDeque};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::config::{AppConfig, DataSource};
use crate::rows::{Row, Tier, tier_label};

pub const ALL_TEAMS_LABEL: &str = "All Teams";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Rank,
    Player,
    Team,
    Tier(Tier),
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::Rank,
        Column::Player,
        Column::Team,
        Column::Tier(Tier::Common),
        Column::Tier(Tier::Uncommon),
        Column::Tier(Tier::Rare),
        Column::Tier(Tier::Epic),
        Column::Tier(Tier::Legendary),
        Column::Tier(Tier::Mystic),
        Column::Tier(Tier::Iconic),
    ];

    pub fn is_numeric(self) -> bool {
        !matches!(self, Column::Player | Column::Team)
    }
}

pub fn column_label(column: Column) -> &'static str {
    match column {
        Column::Rank => "Rank",
        Column::Player => "Player",
        Column::Team => "Team",
        Column::Tier(tier) => tier_label(tier),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<Column>,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: None,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortState {
    /// Selecting the last-sorted column again flips the direction; any other
    /// column starts ascending.
    pub fn select(&mut self, column: Column) -> SortDirection {
        self.direction = if self.column == Some(column) {
            self.direction.toggled()
        } else {
            SortDirection::Ascending
        };
        self.column = Some(column);
        self.direction
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Stable sort of `order` (indices into `rows`) by one column.
///
/// Descending flips the comparator rather than the result, so rows with
/// equal keys keep their relative order in both directions.
pub fn sort_order(rows: &[Row], order: &mut [usize], column: Column, direction: SortDirection) {
    order.sort_by(|a, b| {
        let ord = compare_rows(&rows[*a], &rows[*b], column);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

fn compare_rows(a: &Row, b: &Row, column: Column) -> Ordering {
    match column {
        Column::Rank => a.rank.cmp(&b.rank),
        Column::Player => locale_cmp(&a.player, &b.player),
        Column::Team => locale_cmp(&a.team, &b.team),
        Column::Tier(tier) => a.values.get(tier).cmp(&b.values.get(tier)),
    }
}

/// Dictionary-style ordering: case-folded text first, then lowercase ahead
/// of uppercase, then plain code point order.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TeamFilter {
    #[default]
    All,
    Team(String),
}

impl TeamFilter {
    pub fn label(&self) -> &str {
        match self {
            TeamFilter::All => ALL_TEAMS_LABEL,
            TeamFilter::Team(team) => team,
        }
    }
}

/// Indices (in load order) of the rows that pass the search and team
/// filters. Search is a case-insensitive substring match on the player
/// name; the team filter is an exact match.
pub fn filter_visible(rows: &[Row], search: &str, team: &TeamFilter) -> Vec<usize> {
    let query = search.to_lowercase();
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row_matches(row, &query, team))
        .map(|(idx, _)| idx)
        .collect()
}

fn row_matches(row: &Row, query: &str, team: &TeamFilter) -> bool {
    let matches_search = query.is_empty() || row.player.to_lowercase().contains(query);
    let matches_team = match team {
        TeamFilter::All => true,
        TeamFilter::Team(name) => &row.team == name,
    };
    matches_search && matches_team
}

#[derive(Debug, Clone, Default)]
pub struct RowStore {
    rows: Vec<Row>,
    order: Vec<usize>,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, rows: Vec<Row>) {
        self.order = (0..rows.len()).collect();
        self.rows = rows;
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn get(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    pub fn display_order(&self) -> &[usize] {
        &self.order
    }

    pub fn display_rows(&self) -> Vec<&Row> {
        self.order.iter().filter_map(|idx| self.rows.get(*idx)).collect()
    }

    pub fn unique_teams(&self) -> BTreeSet<String> {
        self.rows.iter().map(|row| row.team.clone()).collect()
    }

    pub fn sort(&mut self, column: Column, direction: SortDirection) {
        sort_order(&self.rows, &mut self.order, column, direction);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Coalesces bursts of edits: every `arm` pushes the deadline out, and
/// `fire` reports true once the deadline has passed.
#[derive(Debug, Clone)]
pub struct SearchDebounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl SearchDebounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Idle,
    Loading {
        source: String,
    },
    Loaded {
        source: String,
        rows: usize,
        at: DateTime<Local>,
    },
    Failed {
        source: String,
        error: String,
    },
}

#[derive(Debug, Clone)]
pub struct ExportState {
    pub active: bool,
    pub done: bool,
    pub path: Option<String>,
    pub total: usize,
    pub message: String,
    pub error: Option<String>,
    pub last_updated: Option<Instant>,
}

impl Default for ExportState {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportState {
    pub fn new() -> Self {
        Self {
            active: false,
            done: false,
            path: None,
            total: 0,
            message: String::new(),
            error: None,
            last_updated: None,
        }
    }

    pub fn clear_if_done_for(&mut self, now: Instant, keep_secs: u64) {
        if !self.active || !self.done {
            return;
        }
        let Some(last) = self.last_updated else {
            return;
        };
        if now.duration_since(last).as_secs() >= keep_secs {
            *self = Self::new();
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub data_source: DataSource,
    pub export_path: PathBuf,
    pub store: RowStore,
    pub sort: SortState,
    pub search_input: String,
    pub search_term: String,
    pub search_active: bool,
    pub search_debounce: SearchDebounce,
    pub team_filter: TeamFilter,
    pub selected: usize,
    pub load_status: LoadStatus,
    pub export: ExportState,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    visible: Vec<bool>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            data_source: config.data_source.clone(),
            export_path: config.export_path.clone(),
            store: RowStore::new(),
            sort: SortState::default(),
            search_input: String::new(),
            search_term: String::new(),
            search_active: false,
            search_debounce: SearchDebounce::new(config.search_debounce),
            team_filter: TeamFilter::All,
            selected: 0,
            load_status: LoadStatus::Idle,
            export: ExportState::new(),
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
            visible: Vec::new(),
        }
    }

    pub fn maybe_clear_export(&mut self, now: Instant) {
        self.export.clear_if_done_for(now, 8);
    }

    /// Swaps in a freshly loaded row set. Sort state and team filter start
    /// over; the search term carries across loads.
    pub fn replace_rows(&mut self, rows: Vec<Row>) {
        self.store.replace_all(rows);
        self.sort.reset();
        self.team_filter = TeamFilter::All;
        self.refilter();
        self.clamp_selection();
    }

    pub fn sort_by(&mut self, column: Column) {
        let selected_idx = self.selected_index();
        let direction = self.sort.select(column);
        self.store.sort(column, direction);
        self.reselect(selected_idx);
    }

    pub fn push_search_char(&mut self, c: char, now: Instant) {
        self.search_input.push(c);
        self.search_debounce.arm(now);
    }

    pub fn pop_search_char(&mut self, now: Instant) {
        if self.search_input.pop().is_some() {
            self.search_debounce.arm(now);
        }
    }

    pub fn clear_search(&mut self, now: Instant) {
        if !self.search_input.is_empty() {
            self.search_input.clear();
            self.search_debounce.arm(now);
        }
    }

    /// Applies a pending search once the debounce delay has elapsed.
    /// Returns true when the view was refiltered.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.search_debounce.fire(now) {
            self.apply_search_now();
            return true;
        }
        false
    }

    pub fn apply_search_now(&mut self) {
        self.search_debounce.cancel();
        if self.search_term == self.search_input {
            return;
        }
        let selected_idx = self.selected_index();
        self.search_term = self.search_input.clone();
        self.refilter();
        self.reselect(selected_idx);
    }

    pub fn set_team_filter(&mut self, filter: TeamFilter) {
        let selected_idx = self.selected_index();
        self.team_filter = filter;
        self.refilter();
        self.reselect(selected_idx);
    }

    pub fn cycle_team_filter_next(&mut self) {
        let teams: Vec<String> = self.store.unique_teams().into_iter().collect();
        let next = match &self.team_filter {
            TeamFilter::All => teams.first().cloned(),
            TeamFilter::Team(current) => teams
                .iter()
                .position(|team| team == current)
                .and_then(|pos| teams.get(pos + 1).cloned()),
        };
        self.set_team_filter(next.map(TeamFilter::Team).unwrap_or(TeamFilter::All));
    }

    pub fn cycle_team_filter_prev(&mut self) {
        let teams: Vec<String> = self.store.unique_teams().into_iter().collect();
        let prev = match &self.team_filter {
            TeamFilter::All => teams.last().cloned(),
            TeamFilter::Team(current) => teams
                .iter()
                .position(|team| team == current)
                .and_then(|pos| pos.checked_sub(1))
                .and_then(|pos| teams.get(pos).cloned()),
        };
        self.set_team_filter(prev.map(TeamFilter::Team).unwrap_or(TeamFilter::All));
    }

    pub fn team_options(&self) -> Vec<String> {
        let mut options = vec![ALL_TEAMS_LABEL.to_string()];
        options.extend(self.store.unique_teams());
        options
    }

    /// Store indices of visible rows, in display order.
    pub fn visible_indices(&self) -> Vec<usize> {
        self.store
            .display_order()
            .iter()
            .copied()
            .filter(|idx| self.visible.get(*idx).copied().unwrap_or(false))
            .collect()
    }

    pub fn visible_rows(&self) -> Vec<&Row> {
        self.visible_indices()
            .into_iter()
            .filter_map(|idx| self.store.get(idx))
            .collect()
    }

    pub fn is_visible(&self, idx: usize) -> bool {
        self.visible.get(idx).copied().unwrap_or(false)
    }

    pub fn selected_row(&self) -> Option<&Row> {
        self.selected_index().and_then(|idx| self.store.get(idx))
    }

    pub fn select_next(&mut self) {
        let total = self.visible_indices().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.visible_indices().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        let total = self.visible_indices().len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    fn refilter(&mut self) {
        let mut visible = vec![false; self.store.len()];
        for idx in filter_visible(self.store.rows(), &self.search_term, &self.team_filter) {
            visible[idx] = true;
        }
        self.visible = visible;
    }

    fn selected_index(&self) -> Option<usize> {
        self.visible_indices().get(self.selected).copied()
    }

    fn reselect(&mut self, store_idx: Option<usize>) {
        if let Some(idx) = store_idx
            && let Some(pos) = self.visible_indices().iter().position(|v| *v == idx)
        {
            self.selected = pos;
            return;
        }
        self.clamp_selection();
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    LoadStarted {
        source: String,
    },
    SetRows {
        source: String,
        rows: Vec<Row>,
    },
    LoadFailed {
        source: String,
        error: String,
    },
    ExportStarted {
        path: String,
        total: usize,
    },
    ExportFinished {
        path: String,
        rows: usize,
        error: Option<String>,
    },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Load { source: DataSource },
    Export { path: PathBuf, rows: Vec<Row> },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::LoadStarted { source } => {
            state.load_status = LoadStatus::Loading { source };
        }
        Delta::SetRows { source, rows } => {
            let count = rows.len();
            state.replace_rows(rows);
            state.push_log(format!("[INFO] Loaded {count} rows from {source}"));
            state.load_status = LoadStatus::Loaded {
                source,
                rows: count,
                at: Local::now(),
            };
        }
        Delta::LoadFailed { source, error } => {
            // The previous rows stay on screen; only the status changes.
            state.push_log(format!("[WARN] Load failed for {source}: {error}"));
            state.load_status = LoadStatus::Failed { source, error };
        }
        Delta::ExportStarted { path, total } => {
            state.export.active = true;
            state.export.done = false;
            state.export.path = Some(path);
            state.export.total = total;
            state.export.message = "Starting export".to_string();
            state.export.error = None;
            state.export.last_updated = Some(Instant::now());
        }
        Delta::ExportFinished { path, rows, error } => {
            state.export.active = true;
            state.export.done = true;
            state.export.message = match &error {
                Some(err) => format!("Export failed: {err}"),
                None => format!("Exported {rows} rows to {path}"),
            };
            match &error {
                Some(err) => state.push_log(format!("[WARN] Export failed: {err}")),
                None => state.push_log(format!("[INFO] Export finished: {rows} rows")),
            }
            state.export.path = Some(path);
            state.export.error = error;
            state.export.last_updated = Some(Instant::now());
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}

pub fn sort_arrow(state: &AppState, column: Column) -> &'static str {
    match state.sort.column {
        Some(sorted) if sorted == column => match state.sort.direction {
            SortDirection::Ascending => " ↑",
            SortDirection::Descending => " ↓",
        },
        _ => "",
    }
}
