use crate::util::deserialize_lenient_f64;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Identifier columns that are never displayed.
pub const PRUNED_COLUMNS: &[&str] = &["iso_code", "continent"];

/// Columns the daily covid table must carry; checked once when it is fetched.
pub const REQUIRED_COVID_COLUMNS: &[&str] = &[
    "location",
    "date",
    "total_cases",
    "new_cases",
    "new_cases_smoothed",
    "total_deaths",
    "new_deaths",
    "new_deaths_smoothed",
    "total_cases_per_million",
    "new_cases_per_million",
    "new_cases_smoothed_per_million",
    "total_deaths_per_million",
    "new_deaths_per_million",
];

/// The Omicron-window column subset used by the visualization views.
pub const OMICRON_COLUMNS: &[&str] = REQUIRED_COVID_COLUMNS;

pub const REGIONAL_COLUMNS: &[&str] = &["State", "Active_cases", "Cured_cases"];

/// Columns summed by the summary export.
pub const SUMMARY_COLUMNS: &[&str] = &["total_cases", "total_deaths", "positive_rate"];

/// The plotted fields of one Omicron-window row; other columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct OmicronRecord {
    pub location: String,
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub total_cases: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_f64")]
    pub total_deaths: Option<f64>,
}

/// One row of the per-state statistics table.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionalRecord {
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Active_cases", default, deserialize_with = "deserialize_lenient_f64")]
    pub active_cases: Option<f64>,
    #[serde(rename = "Cured_cases", default, deserialize_with = "deserialize_lenient_f64")]
    pub cured_cases: Option<f64>,
}

/// Group totals written by the summary export.
#[derive(Debug, Serialize, Deserialize, Tabled, Clone, PartialEq)]
pub struct SummaryRow {
    pub location: String,
    #[tabled(display_with = "display_total")]
    pub total_cases: f64,
    #[tabled(display_with = "display_total")]
    pub total_deaths: f64,
    #[tabled(display_with = "display_total")]
    pub positive_rate: f64,
}

fn display_total(v: &f64) -> String {
    crate::util::format_number(*v, 2)
}
