// Console display surface: prints text and table previews, and exports
// tables as CSV and chart specs as JSON next to each other in one directory.
use crate::error::Result;
use crate::table::Table;
use crate::util::format_int;
use crate::view::{Artifact, View};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{builder::Builder, settings::Style, Tabled};
use tracing::info;

/// Rows shown in a console preview before pointing at the exported file.
pub const PREVIEW_ROWS: usize = 5;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    table.write_csv(fs::File::create(path)?)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    fs::write(path, s)?;
    Ok(())
}

/// Markdown rendering of the first `max_rows` rows.
pub fn preview_table(table: &Table, max_rows: usize) -> String {
    if table.is_empty() {
        return "(no rows)".to_string();
    }
    let mut builder = Builder::default();
    builder.push_record(table.headers().iter().cloned());
    for row in table.rows().iter().take(max_rows) {
        builder.push_record(row.iter().cloned());
    }
    builder.build().with(Style::markdown()).to_string()
}

pub fn preview_rows<T>(rows: &[T], max_rows: usize) -> String
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return "(no rows)".to_string();
    }
    tabled::Table::new(slice).with(Style::markdown()).to_string()
}

/// File-name friendly form of a title.
pub fn slug(title: &str) -> String {
    let mut out = String::new();
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

/// Print a view to stdout and export its tables and charts under `out_dir`.
/// Returns the files written.
pub fn render(view: &View, out_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let base = slug(&view.title);
    let mut written = Vec::new();

    println!("{}\n", view.title);
    for (n, artifact) in view.artifacts.iter().enumerate() {
        match artifact {
            Artifact::Text(s) => println!("{}\n", s),
            Artifact::Message(s) => println!("Error: {}\n", s),
            Artifact::Image(path) => println!("[image: {}]\n", path.display()),
            Artifact::Table { title, table } => {
                let path = out_dir.join(format!("{}.csv", slug(title)));
                write_table(&path, table)?;
                println!("{}", preview_table(table, PREVIEW_ROWS));
                println!(
                    "({} rows; full table exported to {})\n",
                    format_int(table.len()),
                    path.display()
                );
                written.push(path);
            }
            Artifact::Chart(spec) => {
                let path = out_dir.join(format!("{}_{}.json", base, n));
                write_json(&path, spec)?;
                println!("Chart: {} (spec exported to {})\n", spec.title(), path.display());
                written.push(path);
            }
        }
    }
    info!("rendered {} with {} exported files", view.title, written.len());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SummaryRow;
    use crate::view;

    #[test]
    fn slugs_titles() {
        assert_eq!(slug("Visualization / Daily Cases"), "visualization_daily_cases");
        assert_eq!(slug("  raw dataset!"), "raw_dataset");
    }

    #[test]
    fn previews_are_markdown_and_capped() {
        let t = Table::from_csv_str("a,b\n1,2\n3,4\n5,6\n").unwrap();
        let md = preview_table(&t, 2);
        assert!(md.contains("| a | b |"));
        assert!(md.contains("| 3 | 4 |"));
        assert!(!md.contains("| 5 | 6 |"));
        assert_eq!(preview_table(&Table::default(), 2), "(no rows)");
    }

    #[test]
    fn summary_rows_preview_with_formatted_totals() {
        let rows = vec![SummaryRow {
            location: "India".into(),
            total_cases: 1234567.0,
            total_deaths: 10.0,
            positive_rate: 0.5,
        }];
        let md = preview_rows(&rows, 5);
        assert!(md.contains("1,234,567.00"));
        assert!(md.contains("location"));
    }

    #[test]
    fn render_exports_tables_and_charts() {
        let dir = tempfile::tempdir().unwrap();
        let raw = Table::from_csv_str(
            "location,date,total_cases\nIndia,2021-12-13,1\n",
        )
        .unwrap();
        let v = view::dataset_view(&raw);
        let files = render(&v, dir.path()).unwrap();
        assert_eq!(files, [dir.path().join("raw_dataset.csv")]);
        let text = fs::read_to_string(&files[0]).unwrap();
        assert!(text.starts_with("location,date,total_cases"));

        let numeric = Table::from_csv_str("a,b\n1,2\n2,3\n").unwrap();
        let files = render(&view::correlation_view(&numeric), dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        let spec: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
        assert_eq!(spec["kind"], "heatmap");

        let v = view::timestamp_view(Path::new("img"));
        assert!(render(&v, dir.path()).unwrap().is_empty());

        let intro = view::introduction_view();
        assert!(render(&intro, dir.path()).unwrap().is_empty());
    }

    #[test]
    fn writes_summary_csv_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![SummaryRow {
            location: "India".into(),
            total_cases: 750.0,
            total_deaths: 9.0,
            positive_rate: 0.3,
        }];
        let csv_path = dir.path().join("summary.csv");
        write_csv(&csv_path, &rows).unwrap();
        assert_eq!(
            fs::read_to_string(&csv_path).unwrap(),
            "location,total_cases,total_deaths,positive_rate\nIndia,750.0,9.0,0.3\n"
        );
        let json_path = dir.path().join("summary.json");
        write_json(&json_path, &rows).unwrap();
        let back: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(back[0]["total_deaths"], 9.0);
    }
}
