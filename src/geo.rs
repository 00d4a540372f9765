//! Region-name lookup against a boundary collection.
//!
//! Shapes are drawn by whatever renders the choropleth; here we only need to
//! know which names the boundary file can resolve.
use crate::error::{DashboardError, Result};
use crate::types::RegionalRecord;
use geojson::GeoJson;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Property path used to key boundary features.
pub const FEATURE_ID_KEY: &str = "properties.ST_NM";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Boundaries {
    names: BTreeSet<String>,
}

impl Boundaries {
    /// Collect the `properties.<key>` value of every feature in a
    /// FeatureCollection. Features without the property are skipped.
    pub fn from_geojson(text: &str, feature_id_key: &str) -> Result<Self> {
        let collection = match text.parse::<GeoJson>()? {
            GeoJson::FeatureCollection(fc) => fc,
            _ => return Err(DashboardError::Parse("boundary file is not a FeatureCollection".into())),
        };
        let property = feature_id_key
            .strip_prefix("properties.")
            .unwrap_or(feature_id_key);

        let names = collection
            .features
            .iter()
            .filter_map(|f| f.property(property).and_then(|v| v.as_str()))
            .map(str::to_string)
            .collect();
        Ok(Boundaries { names })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// Keep the records whose region resolves to a boundary shape. Unresolved
/// regions are logged and left out.
pub fn join_regions(records: Vec<RegionalRecord>, boundaries: &Boundaries) -> Vec<RegionalRecord> {
    let (matched, unmatched): (Vec<_>, Vec<_>) = records
        .into_iter()
        .partition(|r| boundaries.contains(&r.state));
    for r in &unmatched {
        warn!("no boundary shape for region {:?}", r.state);
    }
    debug!(
        "{} regions matched against {} boundary shapes",
        matched.len(),
        boundaries.len()
    );
    matched
}
