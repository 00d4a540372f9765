//! Row and column transforms shared by the views.
//!
//! Every function takes a table by reference (or by value when it rewrites
//! cells) and returns a subset or summary of it. Nothing here fabricates rows.
use crate::error::{DashboardError, Result};
use crate::table::Table;
use crate::types::PRUNED_COLUMNS;
use crate::util::{format_date, format_int, is_missing, parse_date_flexible, parse_f64_safe};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Drop the identifier columns that are never displayed. Columns that are
/// already absent are skipped.
pub fn prune(table: &Table) -> Table {
    table.drop_columns(PRUNED_COLUMNS)
}

/// Exact, case-sensitive match on `location`. No match gives an empty table.
pub fn filter_country(table: &Table, name: &str) -> Result<Table> {
    let idx = table.column_index("location")?;
    let out = table.filter_rows(|r| r[idx] == name);
    debug!("{} rows for location {:?}", format_int(out.len()), name);
    Ok(out)
}

/// Keep rows whose date is strictly after `cutoff`, rewriting the date cell
/// to `YYYY-MM-DD`. Rows with unparseable dates are dropped with a warning;
/// if that leaves nothing out of a non-empty input, the column is rejected.
pub fn filter_after(table: &Table, date_column: &str, cutoff: NaiveDate) -> Result<Table> {
    let idx = table.column_index(date_column)?;
    let mut bad = 0usize;
    let mut parsed = 0usize;
    let mut rows = Vec::new();
    for row in table.rows() {
        match parse_date_flexible(&row[idx]) {
            Some(d) => {
                parsed += 1;
                if d > cutoff {
                    let mut row = row.clone();
                    row[idx] = format_date(d);
                    rows.push(row);
                }
            }
            None => bad += 1,
        }
    }
    if bad > 0 {
        warn!(
            "dropped {} rows with unparseable {} values",
            format_int(bad),
            date_column
        );
        if parsed == 0 {
            return Err(DashboardError::Parse(format!(
                "no parseable values in column '{}'",
                date_column
            )));
        }
    }
    Ok(Table::new(table.headers().to_vec(), rows))
}

/// Group by `group_key` and sum each of `sum_columns`. One output row per
/// distinct key, ordered by key; empty cells count as missing and are skipped.
///
/// The group key stays as the first column, where a dataframe would keep it
/// as the index; every other column is one of the requested sums.
pub fn aggregate(table: &Table, group_key: &str, sum_columns: &[&str]) -> Result<Table> {
    let key_idx = table.column_index(group_key)?;
    let idxs = sum_columns
        .iter()
        .map(|c| table.column_index(c))
        .collect::<Result<Vec<_>>>()?;

    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for row in table.rows() {
        let sums = groups
            .entry(row[key_idx].clone())
            .or_insert_with(|| vec![0.0; idxs.len()]);
        for (slot, (&i, col)) in idxs.iter().zip(sum_columns).enumerate() {
            let cell = &row[i];
            if is_missing(cell) {
                continue;
            }
            let v = parse_f64_safe(Some(cell)).ok_or_else(|| {
                DashboardError::Parse(format!("'{}' in column '{}' is not numeric", cell, col))
            })?;
            sums[slot] += v;
        }
    }

    let mut headers = vec![group_key.to_string()];
    headers.extend(sum_columns.iter().map(|c| c.to_string()));
    let rows = groups
        .into_iter()
        .map(|(key, sums)| {
            let mut row = vec![key];
            row.extend(sums.iter().map(|v| format!("{:?}", v)));
            row
        })
        .collect();
    Ok(Table::new(headers, rows))
}

/// Coerce a column to floats. Empty cells stay empty (missing).
pub fn cast_float(table: Table, column: &str) -> Result<Table> {
    table.map_column(column, |cell| {
        if is_missing(cell) {
            return Ok(String::new());
        }
        parse_f64_safe(Some(cell))
            .map(|v| format!("{:?}", v))
            .ok_or_else(|| {
                DashboardError::Parse(format!("'{}' in column '{}' is not numeric", cell, column))
            })
    })
}

/// Fail with `EmptyResult` when a stage left nothing to show.
pub fn non_empty(table: Table, stage: &str) -> Result<Table> {
    if table.is_empty() {
        Err(DashboardError::EmptyResult(stage.to_string()))
    } else {
        Ok(table)
    }
}
