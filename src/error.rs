use thiserror::Error;

/// Everything that can go wrong between fetching a source and handing a
/// view to the display surface.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// `transient` failures (transport errors, timeouts, 5xx) may be retried.
    #[error("failed to retrieve {location}: {reason}")]
    Retrieval {
        location: String,
        reason: String,
        transient: bool,
    },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("column '{0}' not found")]
    ColumnMissing(String),

    #[error("no rows left after {0}")]
    EmptyResult(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl DashboardError {
    pub fn retrieval(location: &str, reason: impl ToString) -> Self {
        DashboardError::Retrieval {
            location: location.to_string(),
            reason: reason.to_string(),
            transient: true,
        }
    }

    /// A retrieval failure that another attempt will not fix (4xx, missing file).
    pub fn rejected(location: &str, reason: impl ToString) -> Self {
        DashboardError::Retrieval {
            location: location.to_string(),
            reason: reason.to_string(),
            transient: false,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, DashboardError::Retrieval { transient: true, .. })
    }
}

impl From<csv::Error> for DashboardError {
    fn from(err: csv::Error) -> Self {
        DashboardError::Parse(err.to_string())
    }
}

impl From<geojson::Error> for DashboardError {
    fn from(err: geojson::Error) -> Self {
        DashboardError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(err: serde_json::Error) -> Self {
        DashboardError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
