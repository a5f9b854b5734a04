use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;

use crate::config::DataSource;
use crate::http_client::http_client;
use crate::rows::{Row, parse_rows};

pub fn load_rows(source: &DataSource) -> Result<Vec<Row>> {
    let raw = fetch_text(source)?;
    Ok(parse_rows(&raw))
}

pub fn fetch_text(source: &DataSource) -> Result<String> {
    match source {
        DataSource::Url(url) => fetch_url_text(url),
        DataSource::File(path) => read_file_text(path),
    }
}

fn fetch_url_text(url: &str) -> Result<String> {
    let client = http_client()?;
    let url = with_cache_buster(url);
    let resp = client.get(&url).send().context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, body.trim()));
    }
    Ok(body)
}

fn read_file_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))
}

/// Appends `v=<epoch millis>` unless the url already carries a `v` param.
pub fn with_cache_buster(url: &str) -> String {
    if has_query_param(url, "v") {
        return url.to_string();
    }
    let ts = Utc::now().timestamp_millis();
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}v={ts}")
}

fn has_query_param(url: &str, name: &str) -> bool {
    let Some((_, query)) = url.split_once('?') else {
        return false;
    };
    query
        .split('&')
        .any(|pair| pair.split('=').next() == Some(name))
}
