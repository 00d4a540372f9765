//! A small header-addressed table of string cells.
//!
//! Sources arrive as delimited text with wide, partly-optional schemas, so the
//! pipeline keeps rows as strings and only coerces the columns it touches.
//! Typed records are pulled out with [`Table::deserialize`].
use crate::error::{DashboardError, Result};
use csv::{ReaderBuilder, StringRecord};
use serde::de::DeserializeOwned;
use std::io::{Read, Write};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Table { headers, rows }
    }

    /// Read a CSV document with a header line. Short rows are padded with
    /// empty cells so every row has one cell per header.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let width = headers.len();
        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            if record.len() > width {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                return Err(DashboardError::Parse(format!(
                    "line {}: {} cells for {} columns",
                    line,
                    record.len(),
                    width
                )));
            }
            let mut row: Vec<String> = record.iter().take(width).map(str::to_string).collect();
            row.resize(width, String::new());
            rows.push(row);
        }
        Ok(Table { headers, rows })
    }

    pub fn from_csv_str(text: &str) -> Result<Self> {
        Self::from_csv_reader(text.as_bytes())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| DashboardError::ColumnMissing(name.to_string()))
    }

    /// Fail with the first name in `names` that is not a column.
    pub fn require(&self, names: &[&str]) -> Result<()> {
        for name in names {
            self.column_index(name)?;
        }
        Ok(())
    }

    pub fn column(&self, name: &str) -> Result<Vec<&str>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r[idx].as_str()).collect())
    }

    /// Keep only `names`, in that order.
    pub fn select(&self, names: &[&str]) -> Result<Table> {
        let idxs = names
            .iter()
            .map(|n| self.column_index(n))
            .collect::<Result<Vec<_>>>()?;
        let rows = self
            .rows
            .iter()
            .map(|r| idxs.iter().map(|&i| r[i].clone()).collect())
            .collect();
        Ok(Table {
            headers: names.iter().map(|n| n.to_string()).collect(),
            rows,
        })
    }

    /// Remove the named columns; names that are not present are ignored.
    pub fn drop_columns(&self, names: &[&str]) -> Table {
        let keep: Vec<usize> = (0..self.headers.len())
            .filter(|&i| !names.contains(&self.headers[i].as_str()))
            .collect();
        Table {
            headers: keep.iter().map(|&i| self.headers[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|r| keep.iter().map(|&i| r[i].clone()).collect())
                .collect(),
        }
    }

    /// Rename columns by `(from, to)` pairs; unknown `from` names are ignored.
    pub fn rename(&self, pairs: &[(&str, &str)]) -> Table {
        let headers = self
            .headers
            .iter()
            .map(|h| {
                pairs
                    .iter()
                    .find(|(from, _)| from == h)
                    .map(|(_, to)| to.to_string())
                    .unwrap_or_else(|| h.clone())
            })
            .collect();
        Table {
            headers,
            rows: self.rows.clone(),
        }
    }

    pub fn filter_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[String]) -> bool,
    {
        Table {
            headers: self.headers.clone(),
            rows: self.rows.iter().filter(|r| keep(r)).cloned().collect(),
        }
    }

    /// Rewrite one column's cells in place. `f` may reject a cell, which
    /// aborts the whole rewrite.
    pub fn map_column<F>(mut self, name: &str, mut f: F) -> Result<Table>
    where
        F: FnMut(&str) -> Result<String>,
    {
        let idx = self.column_index(name)?;
        for row in &mut self.rows {
            row[idx] = f(&row[idx])?;
        }
        Ok(self)
    }

    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let headers = StringRecord::from(self.headers.clone());
        self.rows
            .iter()
            .map(|r| {
                StringRecord::from(r.clone())
                    .deserialize(Some(&headers))
                    .map_err(DashboardError::from)
            })
            .collect()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}
