//! The view selector.
//!
//! A request is a `(Mode, SubMode)` pair plus the dataset load trigger. Each
//! request is resolved on its own: the sources it needs are fetched once,
//! passed by reference into the pure view builders below, and the result is
//! a list of artifacts for the display surface. Errors stop at `resolve` and
//! come back as a message view.
use crate::chart::{self, ChartSpec, LineField, RegionMeasure};
use crate::config::Config;
use crate::error::{DashboardError, Result};
use crate::fetch::{self, DataSource};
use crate::geo::{self, Boundaries, FEATURE_ID_KEY};
use crate::pipeline::{aggregate, cast_float, filter_after, filter_country, non_empty, prune};
use crate::stats;
use crate::table::Table;
use crate::types::{OmicronRecord, RegionalRecord, SummaryRow, OMICRON_COLUMNS, SUMMARY_COLUMNS};
use chrono::NaiveDate;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{error, info};

pub const COUNTRY: &str = "India";

/// Start of the Omicron window (exclusive).
pub fn omicron_cutoff() -> NaiveDate {
    ymd(2021, 12, 12)
}

/// Start of the forecasting history (exclusive).
pub fn forecast_cutoff() -> NaiveDate {
    ymd(2020, 12, 12)
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid calendar date")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Introduction,
    Dataset,
    Visualization,
    ModelPrediction,
    TimeseriesForecasting,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::Introduction,
        Mode::Dataset,
        Mode::Visualization,
        Mode::ModelPrediction,
        Mode::TimeseriesForecasting,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Introduction => "Introduction",
            Mode::Dataset => "Dataset",
            Mode::Visualization => "Visualization",
            Mode::ModelPrediction => "Model Prediction",
            Mode::TimeseriesForecasting => "Timeseries Forecasting",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubMode {
    DailyCases,
    Correlation,
    Timestamp,
    Choropleth,
}

impl SubMode {
    pub const ALL: [SubMode; 4] = [
        SubMode::DailyCases,
        SubMode::Correlation,
        SubMode::Timestamp,
        SubMode::Choropleth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SubMode::DailyCases => "Daily Cases",
            SubMode::Correlation => "Correlation",
            SubMode::Timestamp => "Timestamp",
            SubMode::Choropleth => "Chloropleth",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for SubMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts the menu label in any case, with or without spaces.
impl FromStr for Mode {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let key = normalize_label(s);
        Mode::ALL
            .into_iter()
            .find(|m| normalize_label(m.label()) == key)
            .ok_or_else(|| DashboardError::Config(format!("unknown mode: {}", s)))
    }
}

impl FromStr for SubMode {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let key = normalize_label(s);
        if key == "choropleth" {
            return Ok(SubMode::Choropleth);
        }
        SubMode::ALL
            .into_iter()
            .find(|m| normalize_label(m.label()) == key)
            .ok_or_else(|| DashboardError::Config(format!("unknown chart: {}", s)))
    }
}

fn normalize_label(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRequest {
    pub mode: Mode,
    /// Only read when `mode` is `Visualization`; defaults to daily cases.
    pub sub_mode: Option<SubMode>,
    /// The "load dataset" trigger for `Dataset`.
    pub load_dataset: bool,
}

impl ViewRequest {
    pub fn new(mode: Mode) -> Self {
        ViewRequest {
            mode,
            sub_mode: None,
            load_dataset: false,
        }
    }

    pub fn visualization(sub_mode: SubMode) -> Self {
        ViewRequest {
            mode: Mode::Visualization,
            sub_mode: Some(sub_mode),
            load_dataset: false,
        }
    }

    pub fn title(&self) -> String {
        match (self.mode, self.sub_mode) {
            (Mode::Visualization, Some(sub)) => format!("{} / {}", self.mode, sub),
            _ => self.mode.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Artifact {
    Text(String),
    Table { title: String, table: Table },
    Chart(ChartSpec),
    Image(PathBuf),
    /// Shown in place of a view that failed to build.
    Message(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub title: String,
    pub artifacts: Vec<Artifact>,
}

impl View {
    fn new(title: impl Into<String>) -> Self {
        View {
            title: title.into(),
            artifacts: Vec::new(),
        }
    }

    fn text(mut self, s: &str) -> Self {
        self.artifacts.push(Artifact::Text(s.to_string()));
        self
    }

    fn image(mut self, dir: &Path, name: &str) -> Self {
        self.artifacts.push(Artifact::Image(dir.join(name)));
        self
    }

    fn table(mut self, title: &str, table: Table) -> Self {
        self.artifacts.push(Artifact::Table {
            title: title.to_string(),
            table,
        });
        self
    }

    fn chart(mut self, spec: ChartSpec) -> Self {
        self.artifacts.push(Artifact::Chart(spec));
        self
    }

    pub fn fallback(title: impl Into<String>, err: &DashboardError) -> Self {
        View {
            title: title.into(),
            artifacts: vec![Artifact::Message(format!("Could not build this view: {}", err))],
        }
    }
}

/// Build the view for `req`, turning any failure into a message view.
pub fn resolve<S: DataSource + ?Sized>(req: &ViewRequest, source: &S, cfg: &Config) -> View {
    let title = req.title();
    info!("rendering {}", title);
    match build(req, source, cfg) {
        Ok(view) => view,
        Err(e) => {
            error!("{} failed: {}", title, e);
            View::fallback(title, &e)
        }
    }
}

fn build<S: DataSource + ?Sized>(req: &ViewRequest, source: &S, cfg: &Config) -> Result<View> {
    match req.mode {
        Mode::Introduction => Ok(introduction_view()),
        Mode::Dataset if !req.load_dataset => Ok(dataset_intro()),
        Mode::Dataset => {
            let raw = fetch::fetch_covid(source, &cfg.covid_url)?;
            Ok(dataset_view(&raw))
        }
        Mode::Visualization => match req.sub_mode.unwrap_or(SubMode::DailyCases) {
            SubMode::DailyCases => {
                let raw = fetch::fetch_covid(source, &cfg.covid_url)?;
                daily_cases_view(&omicron_table(&raw)?)
            }
            SubMode::Correlation => {
                let raw = fetch::fetch_covid(source, &cfg.covid_url)?;
                Ok(correlation_view(&omicron_table(&raw)?))
            }
            SubMode::Timestamp => Ok(timestamp_view(&cfg.image_dir)),
            SubMode::Choropleth => {
                let regional = fetch::fetch_regional(source, &cfg.regional_url)?;
                let boundaries =
                    Boundaries::from_geojson(&source.fetch_text(&cfg.boundary_url)?, FEATURE_ID_KEY)?;
                choropleth_view(&regional, &boundaries, &cfg.boundary_url)
            }
        },
        Mode::ModelPrediction => {
            let forecast = fetch::load_forecast(source, &cfg.forecast_url)?;
            Ok(model_prediction_view(forecast, &cfg.image_dir))
        }
        Mode::TimeseriesForecasting => {
            let raw = fetch::fetch_covid(source, &cfg.covid_url)?;
            Ok(timeseries_view(timeseries_table(&raw)?, &cfg.image_dir))
        }
    }
}

const INTRO: [&str; 3] = [
    "On November 26, 2021, the World Health Organization (WHO) classified a new variant, B.1.1.529, as a Variant of Concern and named it Omicron and on November 30, 2021, the United States also classified it as a Variant of Covid.\nCenters for Disease Control and Prevention is working with state and local public health officials to monitor the spread of Omicron. As of December 20, 2021, Omicron had been detected in every U.S. state and territory and continues to be the dominant variant in the United States.",
    "The Omicron variant spreads more easily than earlier variants of the virus that cause COVID-19, including the Delta variant. CDC expects that anyone with Omicron infection, regardless of vaccination status or whether or not they have symptoms, can spread the virus to others.",
    "Our goal is to understand the outbreak of OMICRON in India using Machine Learning Techniques.",
];

pub fn introduction_view() -> View {
    INTRO
        .iter()
        .fold(View::new(Mode::Introduction.label()), |v, p| v.text(p))
}

fn dataset_intro() -> View {
    View::new("Let us explore the dataset").text(
        "It is necessary to work on collected data, pre-process them in order to obtain a consistent dataset and then extract the most relevant features. Here we can see the raw dataset....",
    )
}

pub fn dataset_view(raw: &Table) -> View {
    dataset_intro().table("raw_dataset", prune(raw))
}

/// India rows inside the Omicron window, cut down to the display columns.
pub fn omicron_table(raw: &Table) -> Result<Table> {
    let india = filter_country(&prune(raw), COUNTRY)?;
    let window = filter_after(&india, "date", omicron_cutoff())?;
    non_empty(window.select(OMICRON_COLUMNS)?, "the Omicron window filter")
}

pub fn daily_cases_view(omicron: &Table) -> Result<View> {
    let records: Vec<OmicronRecord> = omicron.deserialize()?;
    Ok(View::new("Here we see the Intractive visualization of past Data")
        .text("Data Visualization is the first step towards getting an insight into a large data set in every project. Once the data has been acquired and preprocessed , the next step is Exploratory Data Analysis which kicks off with visualization of the data. The aim here is to extract useful information from the data.")
        .chart(ChartSpec::Line(chart::line_chart(
            "Daily Confirmed Omicron Cases",
            &records,
            LineField::TotalCases,
            None,
        )))
        .chart(ChartSpec::Line(chart::line_chart(
            "Daily Confirmed death Cases",
            &records,
            LineField::TotalDeaths,
            Some("red"),
        ))))
}

pub fn correlation_view(omicron: &Table) -> View {
    let matrix = stats::correlation(omicron);
    View::new("Let us check the correlation of the columns").chart(ChartSpec::Heatmap(
        chart::correlation_heatmap("Correlation of the columns", matrix),
    ))
}

pub fn timestamp_view(image_dir: &Path) -> View {
    View::new("Daily progress of New Cases").image(image_dir, "progress.PNG")
}

pub fn choropleth_view(regional: &Table, boundaries: &Boundaries, geojson: &str) -> Result<View> {
    let records: Vec<RegionalRecord> = regional.deserialize()?;
    let records = geo::join_regions(records, boundaries);
    let active = chart::choropleth(
        "Active cases of Indian states",
        geojson,
        FEATURE_ID_KEY,
        &records,
        RegionMeasure::Active,
        Some("Viridis"),
    );
    let cured = chart::choropleth(
        "Recovered cases of Indian states",
        geojson,
        FEATURE_ID_KEY,
        &records,
        RegionMeasure::Cured,
        None,
    );
    Ok(View::new(SubMode::Choropleth.label())
        .chart(ChartSpec::Choropleth(active))
        .chart(ChartSpec::Choropleth(cured)))
}

pub fn model_prediction_view(forecast: Table, image_dir: &Path) -> View {
    View::new("Prediction chart over week")
        .image(image_dir, "prediction1.PNG")
        .image(image_dir, "prediction2.PNG")
        .table("model_predictions", forecast)
}

/// India's `new_cases` history as a `(y, ds)` table ready for an external
/// forecaster.
pub fn timeseries_table(raw: &Table) -> Result<Table> {
    let india = filter_country(raw, COUNTRY)?.rename(&[("date", "ds"), ("new_cases", "y")]);
    let recent = filter_after(&india, "ds", forecast_cutoff())?;
    cast_float(recent, "y")?.select(&["y", "ds"])
}

pub fn timeseries_view(prepared: Table, image_dir: &Path) -> View {
    View::new("Timeseries Graph")
        .text("Prophet is a procedure for forecasting time series data based on an additive model where non-linear trends are fit with yearly, weekly, and daily seasonality, plus holiday effects.Here we can see the predictions made by the Prophet model.")
        .image(image_dir, "forecast.png")
        .table("timeseries_input", prepared)
}

/// Omicron-window totals per location, for the summary export.
pub fn summary_rows(raw: &Table) -> Result<Vec<SummaryRow>> {
    let india = filter_country(&prune(raw), COUNTRY)?;
    let window = non_empty(
        filter_after(&india, "date", omicron_cutoff())?,
        "the Omicron window filter",
    )?;
    aggregate(&window, "location", SUMMARY_COLUMNS)?.deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    const HEADER: &str = "iso_code,continent,location,date,total_cases,new_cases,new_cases_smoothed,total_deaths,new_deaths,new_deaths_smoothed,total_cases_per_million,new_cases_per_million,new_cases_smoothed_per_million,total_deaths_per_million,new_deaths_per_million,positive_rate";

    fn covid_csv() -> String {
        [
            HEADER,
            "IND,Asia,India,2020-12-01,100,5,5,1,0,0,1,1,1,0,0,0.1",
            "IND,Asia,India,2021-12-12,200,10,9,2,1,1,2,2,2,1,1,0.2",
            "IND,Asia,India,2021-12-13,300,20,15,4,2,1.5,3,3,3,2,2,0.3",
            "IND,Asia,India,2021-12-14,450,30,25,5,1,1.2,4,4,4,3,1,",
            "USA,North America,United States,2021-12-13,900,90,80,9,3,2,5,5,5,4,3,0.5",
        ]
        .join("\n")
    }

    const REGIONAL: &str = "State,Active_cases,Cured_cases\nKerala,\"15,000\",\"60,000\"\nGoa,500,1000\nAtlantis,1,1\n";
    const BOUNDARIES: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"ST_NM":"Kerala"},"geometry":null},
        {"type":"Feature","properties":{"ST_NM":"Goa"},"geometry":null}]}"#;

    /// Serves fixed documents and counts how often each was asked for.
    struct StubSource {
        docs: HashMap<String, String>,
        hits: RefCell<HashMap<String, usize>>,
    }

    impl StubSource {
        fn new(cfg: &Config) -> Self {
            let docs = [
                (cfg.covid_url.clone(), covid_csv()),
                (cfg.regional_url.clone(), REGIONAL.to_string()),
                (cfg.boundary_url.clone(), BOUNDARIES.to_string()),
                (cfg.forecast_url.clone(), "date,predicted\n2022-01-01,1000\n".to_string()),
            ]
            .into_iter()
            .collect();
            StubSource {
                docs,
                hits: RefCell::new(HashMap::new()),
            }
        }

        fn hits(&self, location: &str) -> usize {
            self.hits.borrow().get(location).copied().unwrap_or(0)
        }
    }

    impl DataSource for StubSource {
        fn fetch_text(&self, location: &str) -> Result<String> {
            *self.hits.borrow_mut().entry(location.to_string()).or_default() += 1;
            self.docs
                .get(location)
                .cloned()
                .ok_or_else(|| DashboardError::retrieval(location, "not found"))
        }
    }

    fn setup() -> (Config, StubSource) {
        let cfg = Config::default();
        let source = StubSource::new(&cfg);
        (cfg, source)
    }

    #[test]
    fn parses_menu_labels() {
        assert_eq!("model prediction".parse::<Mode>().unwrap(), Mode::ModelPrediction);
        assert_eq!("TimeseriesForecasting".parse::<Mode>().unwrap(), Mode::TimeseriesForecasting);
        assert_eq!("Chloropleth".parse::<SubMode>().unwrap(), SubMode::Choropleth);
        assert_eq!("choropleth".parse::<SubMode>().unwrap(), SubMode::Choropleth);
        assert_eq!("daily_cases".parse::<SubMode>().unwrap(), SubMode::DailyCases);
        assert!("maps".parse::<Mode>().is_err());
    }

    #[test]
    fn introduction_needs_no_fetch() {
        let (cfg, source) = setup();
        let view = resolve(&ViewRequest::new(Mode::Introduction), &source, &cfg);
        assert_eq!(view.artifacts.len(), 3);
        assert!(source.hits.borrow().is_empty());
    }

    #[test]
    fn dataset_waits_for_the_load_trigger() {
        let (cfg, source) = setup();
        let view = resolve(&ViewRequest::new(Mode::Dataset), &source, &cfg);
        assert!(matches!(view.artifacts.as_slice(), [Artifact::Text(_)]));
        assert_eq!(source.hits(&cfg.covid_url), 0);

        let req = ViewRequest {
            load_dataset: true,
            ..ViewRequest::new(Mode::Dataset)
        };
        let view = resolve(&req, &source, &cfg);
        match &view.artifacts[1] {
            Artifact::Table { table, .. } => {
                assert_eq!(table.len(), 5);
                let headers = table.headers();
                assert!(!headers.iter().any(|h| h == "iso_code" || h == "continent"));
                assert!(headers.iter().any(|h| h == "positive_rate"));
            }
            other => panic!("unexpected artifact {:?}", other),
        }
    }

    #[test]
    fn omicron_table_is_india_after_cutoff_with_display_columns() {
        let raw = Table::from_csv_str(&covid_csv()).unwrap();
        let t = omicron_table(&raw).unwrap();
        assert_eq!(t.headers().len(), 13);
        assert_eq!(t.column("date").unwrap(), ["2021-12-13", "2021-12-14"]);
        assert!(t.column("location").unwrap().iter().all(|l| *l == "India"));
    }

    #[test]
    fn daily_cases_is_two_line_charts_from_one_fetch() {
        let (cfg, source) = setup();
        let view = resolve(&ViewRequest::visualization(SubMode::DailyCases), &source, &cfg);
        let lines: Vec<_> = view
            .artifacts
            .iter()
            .filter_map(|a| match a {
                Artifact::Chart(ChartSpec::Line(l)) => Some(l),
                _ => None,
            })
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!((lines[0].x.as_str(), lines[0].y.as_str()), ("date", "total_cases"));
        assert_eq!((lines[1].x.as_str(), lines[1].y.as_str()), ("date", "total_deaths"));
        assert_eq!(lines[1].color.as_deref(), Some("red"));
        assert_eq!(lines[0].points.len(), 2);
        assert_eq!(source.hits(&cfg.covid_url), 1);
    }

    #[test]
    fn correlation_leaves_out_text_columns() {
        let (cfg, source) = setup();
        let view = resolve(&ViewRequest::visualization(SubMode::Correlation), &source, &cfg);
        let heatmap = match &view.artifacts[0] {
            Artifact::Chart(ChartSpec::Heatmap(h)) => h,
            other => panic!("unexpected artifact {:?}", other),
        };
        assert!(heatmap.annotate);
        assert_eq!(heatmap.matrix.labels.len(), 11);
        assert!(!heatmap.matrix.labels.iter().any(|l| l == "location" || l == "date"));
    }

    #[test]
    fn timestamp_is_a_static_image() {
        let (cfg, source) = setup();
        let view = resolve(&ViewRequest::visualization(SubMode::Timestamp), &source, &cfg);
        assert_eq!(view.artifacts, [Artifact::Image(PathBuf::from("img/progress.PNG"))]);
        assert!(source.hits.borrow().is_empty());
    }

    #[test]
    fn choropleth_uses_fixed_domains() {
        let (cfg, source) = setup();
        let view = resolve(&ViewRequest::visualization(SubMode::Choropleth), &source, &cfg);
        let maps: Vec<_> = view
            .artifacts
            .iter()
            .filter_map(|a| match a {
                Artifact::Chart(ChartSpec::Choropleth(m)) => Some(m),
                _ => None,
            })
            .collect();
        assert_eq!(maps.len(), 2);
        assert_eq!(maps[0].range_color.max, 10_000.0);
        assert_eq!(maps[1].range_color.max, 50_000.0);
        // Kerala's 15,000 active cases saturate; Atlantis has no shape.
        assert_eq!(maps[0].regions.len(), 2);
        assert_eq!(maps[0].regions[0].region, "Kerala");
        assert_eq!(maps[0].regions[0].value, Some(15_000.0));
        assert_eq!(maps[0].regions[0].scaled, Some(1.0));
        assert_eq!(maps[1].regions[0].scaled, Some(1.0));
        assert_eq!(maps[0].geojson, cfg.boundary_url);
    }

    #[test]
    fn model_prediction_only_fetches_the_forecast() {
        let (cfg, source) = setup();
        let view = resolve(&ViewRequest::new(Mode::ModelPrediction), &source, &cfg);
        assert_eq!(view.artifacts.len(), 3);
        assert!(matches!(&view.artifacts[2], Artifact::Table { table, .. } if table.len() == 1));
        assert_eq!(source.hits(&cfg.covid_url), 0);
        assert_eq!(source.hits(&cfg.forecast_url), 1);
    }

    #[test]
    fn timeseries_table_is_y_and_ds() {
        let raw = Table::from_csv_str(&covid_csv()).unwrap();
        let t = timeseries_table(&raw).unwrap();
        assert_eq!(t.headers(), ["y", "ds"]);
        assert_eq!(
            t.rows(),
            [
                vec!["10.0", "2021-12-12"],
                vec!["20.0", "2021-12-13"],
                vec!["30.0", "2021-12-14"],
            ]
        );
    }

    #[test]
    fn summary_sums_the_omicron_window() {
        let raw = Table::from_csv_str(&covid_csv()).unwrap();
        let rows = summary_rows(&raw).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].location, "India");
        assert_eq!(rows[0].total_cases, 750.0);
        assert_eq!(rows[0].total_deaths, 9.0);
        assert!((rows[0].positive_rate - 0.3).abs() < 1e-12);
    }

    #[test]
    fn failures_become_a_message_view() {
        let (mut cfg, source) = setup();
        cfg.covid_url = "missing.csv".to_string();
        let view = resolve(&ViewRequest::visualization(SubMode::DailyCases), &source, &cfg);
        assert!(matches!(view.artifacts.as_slice(), [Artifact::Message(_)]));
        assert_eq!(view.title, "Visualization / Daily Cases");
    }

    #[test]
    fn empty_window_is_reported_not_plotted() {
        let (cfg, mut source) = setup();
        source
            .docs
            .insert(cfg.covid_url.clone(), format!("{}\nIND,Asia,India,2021-01-01,1,1,1,1,1,1,1,1,1,1,1,0.1", HEADER));
        let view = resolve(&ViewRequest::visualization(SubMode::Correlation), &source, &cfg);
        match view.artifacts.as_slice() {
            [Artifact::Message(m)] => assert!(m.contains("no rows left")),
            other => panic!("unexpected artifacts {:?}", other),
        }
    }
}
