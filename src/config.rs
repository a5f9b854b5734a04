use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DATA_LOCATION: &str = "data.csv";
pub const DEFAULT_EXPORT_PATH: &str = "asset_board.xlsx";
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 100;
const MAX_SEARCH_DEBOUNCE_MS: u64 = 2000;

const ENV_DATA: &str = "ASSET_BOARD_DATA";
const ENV_DEBOUNCE: &str = "ASSET_BOARD_SEARCH_DEBOUNCE_MS";
const ENV_EXPORT: &str = "ASSET_BOARD_EXPORT_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl DataSource {
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        if location.starts_with("http://") || location.starts_with("https://") {
            DataSource::Url(location.to_string())
        } else {
            DataSource::File(PathBuf::from(location))
        }
    }

    pub fn label(&self) -> String {
        match self {
            DataSource::Url(url) => url.clone(),
            DataSource::File(path) => path.display().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_source: DataSource,
    pub search_debounce: Duration,
    pub export_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_source: DataSource::parse(DEFAULT_DATA_LOCATION),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
        }
    }
}

impl AppConfig {
    /// Reads `.env.local` and `.env` (first one wins per key), then the
    /// process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let data_source = lookup(ENV_DATA)
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| DataSource::parse(&raw))
            .unwrap_or_else(|| DataSource::parse(DEFAULT_DATA_LOCATION));
        let debounce_ms = lookup(ENV_DEBOUNCE)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS)
            .min(MAX_SEARCH_DEBOUNCE_MS);
        let export_path = lookup(ENV_EXPORT)
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| PathBuf::from(raw.trim()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_PATH));
        Self {
            data_source,
            search_debounce: Duration::from_millis(debounce_ms),
            export_path,
        }
    }
}
