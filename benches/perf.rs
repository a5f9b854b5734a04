use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use asset_board::config::AppConfig;
use asset_board::rows::{Tier, parse_rows};
use asset_board::state::{AppState, Column, SortDirection, TeamFilter, filter_visible, sort_order};

const TEAMS: [&str; 6] = ["Red", "Blue", "Green", "Gold", "Black", "White"];

fn sample_csv(rows: usize) -> String {
    let mut out = String::from("name,team,common,uncommon,rare,epic,legendary,mystic,iconic\n");
    for idx in 0..rows {
        let team = TEAMS[idx % TEAMS.len()];
        let base = (idx * 7919) % 100_000;
        out.push_str(&format!(
            "\"Player {idx} ({team})\",,{},{},{},{},{},{},{}\n",
            base,
            base / 2,
            base / 3,
            base / 5,
            base / 7,
            base / 11,
            base / 13
        ));
        if idx % 50 == 0 {
            out.push_str("broken,row\n\n");
        }
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    let raw = sample_csv(2_000);
    c.bench_function("parse_rows_2k", |b| {
        b.iter(|| {
            let rows = parse_rows(black_box(&raw));
            black_box(rows.len());
        })
    });
}

fn bench_filter(c: &mut Criterion) {
    let rows = parse_rows(&sample_csv(2_000));
    let team = TeamFilter::Team("Gold".to_string());
    c.bench_function("filter_visible_2k", |b| {
        b.iter(|| {
            let visible = filter_visible(black_box(&rows), black_box("player 1"), &team);
            black_box(visible.len());
        })
    });
}

fn bench_sort(c: &mut Criterion) {
    let rows = parse_rows(&sample_csv(2_000));
    let base_order: Vec<usize> = (0..rows.len()).collect();
    c.bench_function("sort_numeric_2k", |b| {
        b.iter(|| {
            let mut order = base_order.clone();
            sort_order(
                &rows,
                &mut order,
                Column::Tier(Tier::Legendary),
                SortDirection::Descending,
            );
            black_box(order.first().copied());
        })
    });
    c.bench_function("sort_player_2k", |b| {
        b.iter(|| {
            let mut order = base_order.clone();
            sort_order(&rows, &mut order, Column::Player, SortDirection::Ascending);
            black_box(order.first().copied());
        })
    });
}

fn bench_state_cycle(c: &mut Criterion) {
    let rows = parse_rows(&sample_csv(2_000));
    c.bench_function("state_reload_sort_filter_2k", |b| {
        b.iter(|| {
            let mut state = AppState::new(&AppConfig::default());
            state.replace_rows(rows.clone());
            state.sort_by(Column::Tier(Tier::Common));
            state.cycle_team_filter_next();
            black_box(state.visible_indices().len());
        })
    });
}

criterion_group!(benches, bench_parse, bench_filter, bench_sort, bench_state_cycle);
criterion_main!(benches);
