//! Source fetching and the forecast loader.
//!
//! Every location is either an `http(s)://` URL or a local path. Remote reads
//! go through a blocking client with an explicit timeout and a bounded retry
//! loop; local reads are attempted once.
use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::table::Table;
use crate::types::{REGIONAL_COLUMNS, REQUIRED_COVID_COLUMNS};
use crate::util::format_int;
use reqwest::blocking::Client;
use std::thread::sleep;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Anything that can hand back the raw text behind a location.
pub trait DataSource {
    fn fetch_text(&self, location: &str) -> Result<String>;

    fn fetch_table(&self, location: &str) -> Result<Table> {
        let text = self.fetch_text(location)?;
        let table = Table::from_csv_str(&text)?;
        info!(
            "fetched {} rows x {} columns from {}",
            format_int(table.len()),
            table.headers().len(),
            location
        );
        Ok(table)
    }
}

pub struct Fetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl Fetcher {
    pub fn new(cfg: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| DashboardError::Config(format!("http client: {}", e)))?;
        Ok(Fetcher {
            client,
            max_retries: cfg.max_retries.max(1),
            retry_delay: cfg.retry_delay(),
        })
    }

    fn get_once(&self, url: &str) -> Result<String> {
        let resp = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                DashboardError::retrieval(url, format!("timed out: {}", e))
            } else {
                DashboardError::retrieval(url, e)
            }
        })?;
        let status = resp.status();
        if status.is_server_error() {
            return Err(DashboardError::retrieval(url, format!("HTTP {}", status)));
        }
        if !status.is_success() {
            return Err(DashboardError::rejected(url, format!("HTTP {}", status)));
        }
        resp.text().map_err(|e| DashboardError::retrieval(url, e))
    }
}

impl DataSource for Fetcher {
    fn fetch_text(&self, location: &str) -> Result<String> {
        if !is_remote(location) {
            debug!("reading local source {}", location);
            return std::fs::read_to_string(location)
                .map_err(|e| DashboardError::rejected(location, e));
        }
        with_retry(self.max_retries, self.retry_delay, sleep, |attempt| {
            debug!("GET {} (attempt {})", location, attempt);
            self.get_once(location)
        })
    }
}

/// Run `op` up to `max_attempts` times. Only transient errors are retried;
/// the wait starts at `initial_delay` and doubles after every failure.
pub fn with_retry<T, F, S>(
    max_attempts: u32,
    initial_delay: Duration,
    mut sleep: S,
    mut op: F,
) -> Result<T>
where
    F: FnMut(u32) -> Result<T>,
    S: FnMut(Duration),
{
    let mut attempt = 0;
    let mut delay = initial_delay;
    loop {
        attempt += 1;
        match op(attempt) {
            Ok(v) => return Ok(v),
            Err(e) if attempt < max_attempts && e.is_transient() => {
                warn!(attempt, delay_ms = delay.as_millis() as u64, error = %e, "retrying");
                sleep(delay);
                delay *= 2;
            }
            Err(e) => return Err(e),
        }
    }
}

pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Fetch the daily per-country table and check its schema once, here.
pub fn fetch_covid<S: DataSource + ?Sized>(source: &S, location: &str) -> Result<Table> {
    let table = source.fetch_table(location)?;
    table.require(REQUIRED_COVID_COLUMNS)?;
    Ok(table)
}

pub fn fetch_regional<S: DataSource + ?Sized>(source: &S, location: &str) -> Result<Table> {
    let table = source.fetch_table(location)?;
    table.require(REGIONAL_COLUMNS)?;
    Ok(table)
}

/// The forecast is computed elsewhere; this is a plain fetch with no transform.
pub fn load_forecast<S: DataSource + ?Sized>(source: &S, location: &str) -> Result<Table> {
    source.fetch_table(location)
}
