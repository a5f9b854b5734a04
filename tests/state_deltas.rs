use std::fs;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

use asset_board::config::{AppConfig, DataSource};
use asset_board::provider::{run_export, run_load};
use asset_board::rows::{Row, Tier, parse_rows};
use asset_board::state::{AppState, Column, Delta, LoadStatus, TeamFilter, apply_delta};

fn fixture_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("data.csv");
    path
}

fn fixture_rows() -> Vec<Row> {
    parse_rows(&fs::read_to_string(fixture_path()).expect("fixture file should be readable"))
}

fn set_rows(state: &mut AppState, rows: Vec<Row>) {
    apply_delta(
        state,
        Delta::SetRows {
            source: "data.csv".to_string(),
            rows,
        },
    );
}

#[test]
fn set_rows_replaces_store_and_records_status() {
    let mut state = AppState::new(&AppConfig::default());
    set_rows(&mut state, fixture_rows());
    assert_eq!(state.store.len(), 6);
    assert!(matches!(
        state.load_status,
        LoadStatus::Loaded { rows: 6, .. }
    ));
    assert!(state.logs.back().is_some_and(|msg| msg.starts_with("[INFO]")));

    let fewer = parse_rows("h\nSolo,Team,1,1,1,1,1,1,1\n");
    set_rows(&mut state, fewer);
    assert_eq!(state.store.len(), 1);
    assert_eq!(state.store.rows()[0].player, "Solo");
}

#[test]
fn failed_load_keeps_previous_rows() {
    let mut state = AppState::new(&AppConfig::default());
    set_rows(&mut state, fixture_rows());
    apply_delta(
        &mut state,
        Delta::LoadFailed {
            source: "https://example.com/data.csv".to_string(),
            error: "http 404 Not Found".to_string(),
        },
    );
    assert_eq!(state.store.len(), 6);
    assert_eq!(state.visible_rows().len(), 6);
    assert!(matches!(state.load_status, LoadStatus::Failed { .. }));
    assert!(state.logs.back().is_some_and(|msg| msg.starts_with("[WARN]")));
}

#[test]
fn reload_resets_sort_and_team_but_keeps_search() {
    let mut state = AppState::new(&AppConfig::default());
    set_rows(&mut state, fixture_rows());
    state.sort_by(Column::Tier(Tier::Epic));
    state.set_team_filter(TeamFilter::Team("Blue Team".to_string()));
    for c in "ali".chars() {
        state.push_search_char(c, Instant::now());
    }
    state.apply_search_now();

    set_rows(&mut state, fixture_rows());
    assert_eq!(state.sort.column, None);
    assert_eq!(state.team_filter, TeamFilter::All);
    assert_eq!(state.search_term, "ali");
    assert_eq!(state.store.display_order(), &[0, 1, 2, 3, 4, 5]);
    let names: Vec<&str> = state
        .visible_rows()
        .into_iter()
        .map(|row| row.player.as_str())
        .collect();
    assert_eq!(names, vec!["Alice (Red Team)", "alice2 (red team)"]);
}

#[test]
fn late_load_overwrites_earlier_one() {
    let mut state = AppState::new(&AppConfig::default());
    set_rows(&mut state, parse_rows("h\nNewer,T,1,1,1,1,1,1,1\n"));
    set_rows(&mut state, fixture_rows());
    assert_eq!(state.store.len(), 6);
}

#[test]
fn run_load_reads_file_source() {
    let (tx, rx) = mpsc::channel();
    run_load(&tx, &DataSource::File(fixture_path()));
    let deltas: Vec<Delta> = rx.try_iter().collect();
    assert_eq!(deltas.len(), 3);
    assert!(matches!(deltas[0], Delta::LoadStarted { .. }));
    match &deltas[1] {
        Delta::Log(msg) => assert!(msg.starts_with("[INFO] Fetching ")),
        other => panic!("unexpected delta: {other:?}"),
    }
    match &deltas[2] {
        Delta::SetRows { rows, .. } => assert_eq!(rows.len(), 6),
        other => panic!("unexpected delta: {other:?}"),
    }
}

#[test]
fn run_load_reports_missing_file() {
    let (tx, rx) = mpsc::channel();
    run_load(&tx, &DataSource::File(PathBuf::from("missing/data.csv")));
    let mut state = AppState::new(&AppConfig::default());
    set_rows(&mut state, fixture_rows());
    for delta in rx.try_iter() {
        apply_delta(&mut state, delta);
    }
    assert!(state.logs.iter().any(|msg| msg.starts_with("[INFO] Fetching ")));
    match &state.load_status {
        LoadStatus::Failed { error, .. } => assert!(error.contains("missing/data.csv")),
        other => panic!("unexpected status: {other:?}"),
    }
    assert_eq!(state.store.len(), 6);
}

#[test]
fn export_writes_visible_rows() {
    let mut state = AppState::new(&AppConfig::default());
    set_rows(&mut state, fixture_rows());
    state.set_team_filter(TeamFilter::Team("Red Team".to_string()));
    let rows: Vec<Row> = state.visible_rows().into_iter().cloned().collect();

    let path = std::env::temp_dir().join(format!("asset_board_export_{}.xlsx", std::process::id()));
    let (tx, rx) = mpsc::channel();
    run_export(&tx, &path, &rows);
    for delta in rx.try_iter() {
        apply_delta(&mut state, delta);
    }

    let written = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    let _ = fs::remove_file(&path);
    assert!(written > 0);
    assert!(state.export.done);
    assert!(state.export.error.is_none());
    assert!(state.export.message.contains("2 rows"));
}

#[test]
fn export_failure_is_reported() {
    let mut state = AppState::new(&AppConfig::default());
    let path = PathBuf::from("no/such/dir/out.xlsx");
    let (tx, rx) = mpsc::channel();
    run_export(&tx, &path, &fixture_rows());
    for delta in rx.try_iter() {
        apply_delta(&mut state, delta);
    }
    assert!(state.export.done);
    assert!(state.export.error.is_some());
    assert!(state.logs.back().is_some_and(|msg| msg.starts_with("[WARN]")));
}

#[test]
fn finished_export_clears_after_delay() {
    let mut state = AppState::new(&AppConfig::default());
    apply_delta(
        &mut state,
        Delta::ExportFinished {
            path: "out.xlsx".to_string(),
            rows: 3,
            error: None,
        },
    );
    let now = Instant::now();
    state.maybe_clear_export(now);
    assert!(state.export.active);
    state.maybe_clear_export(now + std::time::Duration::from_secs(9));
    assert!(!state.export.active);
}
