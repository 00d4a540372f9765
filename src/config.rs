//! Data-source locations and fetch policy.
//!
//! Defaults point at the public datasets. A JSON file named by
//! `OMICRON_CONFIG` may override any field, and a handful of environment
//! variables override the file.
use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_COVID_URL: &str =
    "https://raw.githubusercontent.com/owid/covid-19-data/master/public/data/owid-covid-data.csv";
pub const DEFAULT_REGIONAL_URL: &str =
    "https://raw.githubusercontent.com/Dharani-Sri/Omicron-Prediction/main/src/statewise_cases.csv";
pub const DEFAULT_BOUNDARY_URL: &str = "https://gist.githubusercontent.com/jbrobst/56c13bbbf9d97d187fea01ca62ea5112/raw/e388c4cae20aa53cb5090210a42ebb9b765c0a36/india_states.geojson";
pub const DEFAULT_FORECAST_URL: &str =
    "https://raw.githubusercontent.com/Dharani-Sri/Omicron-Prediction/main/src/file1.csv";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub covid_url: String,
    pub regional_url: String,
    pub boundary_url: String,
    pub forecast_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub image_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            covid_url: DEFAULT_COVID_URL.to_string(),
            regional_url: DEFAULT_REGIONAL_URL.to_string(),
            boundary_url: DEFAULT_BOUNDARY_URL.to_string(),
            forecast_url: DEFAULT_FORECAST_URL.to_string(),
            timeout_secs: 10,
            max_retries: 3,
            retry_delay_ms: 500,
            image_dir: PathBuf::from("img"),
            output_dir: PathBuf::from("out"),
        }
    }
}

impl Config {
    /// Defaults, then the optional `OMICRON_CONFIG` file, then env overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var("OMICRON_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DashboardError::Config(format!("cannot read {}: {}", path, e)))?;
        serde_json::from_str(&text)
            .map_err(|e| DashboardError::Config(format!("invalid config {}: {}", path, e)))
    }

    /// `lookup` abstracts the environment so overrides can be tested.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("OMICRON_COVID_URL") {
            self.covid_url = v;
        }
        if let Some(v) = lookup("OMICRON_REGIONAL_URL") {
            self.regional_url = v;
        }
        if let Some(v) = lookup("OMICRON_BOUNDARY_URL") {
            self.boundary_url = v;
        }
        if let Some(v) = lookup("OMICRON_FORECAST_URL") {
            self.forecast_url = v;
        }
        if let Some(v) = lookup("OMICRON_TIMEOUT_SECS") {
            self.timeout_secs = v.trim().parse().map_err(|_| {
                DashboardError::Config(format!("OMICRON_TIMEOUT_SECS is not a number: {}", v))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(DashboardError::Config("timeout_secs must be positive".into()));
        }
        if self.max_retries == 0 {
            return Err(DashboardError::Config("max_retries must be at least 1".into()));
        }
        for (name, loc) in [
            ("covid_url", &self.covid_url),
            ("regional_url", &self.regional_url),
            ("boundary_url", &self.boundary_url),
            ("forecast_url", &self.forecast_url),
        ] {
            if loc.trim().is_empty() {
                return Err(DashboardError::Config(format!("{} is empty", name)));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
