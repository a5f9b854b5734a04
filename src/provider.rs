use std::path::Path;
use std::sync::mpsc::{Receiver, Sender};
use std::thread;

use crate::config::DataSource;
use crate::data_fetch;
use crate::rows::Row;
use crate::state::{Delta, ProviderCommand};
use crate::table_export;

/// Runs the background worker. Each command gets its own short-lived thread,
/// so a slow load never blocks a later one; whichever load finishes last is
/// the one the UI ends up showing.
pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                ProviderCommand::Load { source } => {
                    let tx = tx.clone();
                    thread::spawn(move || run_load(&tx, &source));
                }
                ProviderCommand::Export { path, rows } => {
                    let tx = tx.clone();
                    thread::spawn(move || run_export(&tx, &path, &rows));
                }
            }
        }
    });
}

pub fn run_load(tx: &Sender<Delta>, source: &DataSource) {
    let label = source.label();
    let _ = tx.send(Delta::LoadStarted {
        source: label.clone(),
    });
    let _ = tx.send(Delta::Log(format!("[INFO] Fetching {label}")));
    match data_fetch::load_rows(source) {
        Ok(rows) => {
            let _ = tx.send(Delta::SetRows {
                source: label,
                rows,
            });
        }
        Err(err) => {
            let _ = tx.send(Delta::LoadFailed {
                source: label,
                error: format!("{err:#}"),
            });
        }
    }
}

pub fn run_export(tx: &Sender<Delta>, path: &Path, rows: &[Row]) {
    let path_label = path.display().to_string();
    let _ = tx.send(Delta::ExportStarted {
        path: path_label.clone(),
        total: rows.len(),
    });
    match table_export::export_rows(path, rows) {
        Ok(report) => {
            let _ = tx.send(Delta::ExportFinished {
                path: path_label,
                rows: report.rows,
                error: None,
            });
        }
        Err(err) => {
            let _ = tx.send(Delta::ExportFinished {
                path: path_label,
                rows: 0,
                error: Some(format!("{err:#}")),
            });
        }
    }
}
