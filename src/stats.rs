// Correlation over the numeric columns of a table.
use crate::table::Table;
use crate::util::{is_missing, parse_f64_safe};
use serde::Serialize;

/// Square matrix of pairwise Pearson coefficients with its axis labels.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// Row-major; `None` where a pair has too few observations or no variance.
    pub values: Vec<Vec<Option<f64>>>,
}

/// A column counts as numeric when every non-empty cell parses as a number.
/// An all-empty column qualifies and correlates as `None` everywhere.
pub fn numeric_columns(table: &Table) -> Vec<String> {
    table
        .headers()
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            table.rows().iter().all(|row| {
                let cell = &row[*i];
                is_missing(cell) || parse_f64_safe(Some(cell)).is_some()
            })
        })
        .map(|(_, h)| h.clone())
        .collect()
}

/// Pairwise-complete Pearson correlation of every numeric column. Non-numeric
/// columns are left out rather than rejected.
pub fn correlation(table: &Table) -> CorrelationMatrix {
    let labels = numeric_columns(table);
    let columns: Vec<Vec<Option<f64>>> = labels
        .iter()
        .map(|name| {
            table
                .column(name)
                .unwrap_or_default()
                .into_iter()
                .map(|c| parse_f64_safe(Some(c)))
                .collect()
        })
        .collect();

    let n = labels.len();
    let mut values = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix { labels, values }
}

fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some((sxy / denom).clamp(-1.0, 1.0))
}
