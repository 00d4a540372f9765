//! Chart specifications handed to the display surface.
//!
//! Nothing is drawn here. A spec names the chart kind, carries the data
//! points, and fixes the parameters (axes, color domain, map framing).
use crate::stats::CorrelationMatrix;
use crate::types::{OmicronRecord, RegionalRecord};
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartSpec {
    Line(LineChart),
    Heatmap(Heatmap),
    Choropleth(Choropleth),
}

impl ChartSpec {
    pub fn title(&self) -> &str {
        match self {
            ChartSpec::Line(c) => &c.title,
            ChartSpec::Heatmap(c) => &c.title,
            ChartSpec::Choropleth(c) => &c.title,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LinePoint {
    pub x: NaiveDate,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LineChart {
    pub title: String,
    pub series: String,
    pub x: String,
    pub y: String,
    pub color: Option<String>,
    pub points: Vec<LinePoint>,
}

/// Which field of an Omicron record a line chart plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineField {
    TotalCases,
    TotalDeaths,
}

impl LineField {
    pub fn column(self) -> &'static str {
        match self {
            LineField::TotalCases => "total_cases",
            LineField::TotalDeaths => "total_deaths",
        }
    }

    fn value(self, r: &OmicronRecord) -> Option<f64> {
        match self {
            LineField::TotalCases => r.total_cases,
            LineField::TotalDeaths => r.total_deaths,
        }
    }
}

/// A `(date, field)` line over the records, in record order.
pub fn line_chart(
    title: &str,
    records: &[OmicronRecord],
    field: LineField,
    color: Option<&str>,
) -> LineChart {
    LineChart {
        title: title.to_string(),
        series: records.first().map(|r| r.location.clone()).unwrap_or_default(),
        x: "date".to_string(),
        y: field.column().to_string(),
        color: color.map(str::to_string),
        points: records
            .iter()
            .map(|r| LinePoint {
                x: r.date,
                y: field.value(r),
            })
            .collect(),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Heatmap {
    pub title: String,
    pub annotate: bool,
    pub figsize: (u32, u32),
    pub matrix: CorrelationMatrix,
}

pub fn correlation_heatmap(title: &str, matrix: CorrelationMatrix) -> Heatmap {
    Heatmap {
        title: title.to_string(),
        annotate: true,
        figsize: (20, 15),
        matrix,
    }
}

/// A fixed color scale range. Values outside it saturate at the bounds; the
/// domain never stretches to fit the data.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ColorDomain {
    pub min: f64,
    pub max: f64,
}

impl ColorDomain {
    pub const ACTIVE_CASES: ColorDomain = ColorDomain { min: 0.0, max: 10_000.0 };
    pub const CURED_CASES: ColorDomain = ColorDomain { min: 0.0, max: 50_000.0 };

    /// Position of `v` on the scale, clamped to `[0, 1]`.
    pub fn position(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 || !v.is_finite() {
            return 0.0;
        }
        ((v - self.min) / span).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MapCenter {
    pub lat: f64,
    pub lon: f64,
}

pub const INDIA_CENTER: MapCenter = MapCenter {
    lat: 21.7679,
    lon: 78.8718,
};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RegionValue {
    pub region: String,
    pub value: Option<f64>,
    /// Position on the color scale after saturation.
    pub scaled: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Choropleth {
    pub title: String,
    pub geojson: String,
    pub feature_id_key: String,
    pub locations: String,
    pub color: String,
    pub range_color: ColorDomain,
    pub color_scale: Option<String>,
    pub center: MapCenter,
    pub zoom: u8,
    pub height: u32,
    pub mapbox_style: String,
    pub regions: Vec<RegionValue>,
}

/// Which regional measure a choropleth shades by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionMeasure {
    Active,
    Cured,
}

impl RegionMeasure {
    pub fn column(self) -> &'static str {
        match self {
            RegionMeasure::Active => "Active_cases",
            RegionMeasure::Cured => "Cured_cases",
        }
    }

    pub fn domain(self) -> ColorDomain {
        match self {
            RegionMeasure::Active => ColorDomain::ACTIVE_CASES,
            RegionMeasure::Cured => ColorDomain::CURED_CASES,
        }
    }

    fn value(self, r: &RegionalRecord) -> Option<f64> {
        match self {
            RegionMeasure::Active => r.active_cases,
            RegionMeasure::Cured => r.cured_cases,
        }
    }
}

pub fn choropleth(
    title: &str,
    geojson: &str,
    feature_id_key: &str,
    records: &[RegionalRecord],
    measure: RegionMeasure,
    color_scale: Option<&str>,
) -> Choropleth {
    let domain = measure.domain();
    Choropleth {
        title: title.to_string(),
        geojson: geojson.to_string(),
        feature_id_key: feature_id_key.to_string(),
        locations: "State".to_string(),
        color: measure.column().to_string(),
        range_color: domain,
        color_scale: color_scale.map(str::to_string),
        center: INDIA_CENTER,
        zoom: 3,
        height: 700,
        mapbox_style: "carto-positron".to_string(),
        regions: records
            .iter()
            .map(|r| {
                let value = measure.value(r);
                RegionValue {
                    region: r.state.clone(),
                    value,
                    scaled: value.map(|v| domain.position(v)),
                }
            })
            .collect(),
    }
}
