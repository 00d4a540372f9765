// Entry point and interactive menu.
//
// Each menu choice is one rendering pass:
// - the view selector fetches what that view needs (once),
// - builds the view from the fetched tables,
// - and the console display prints it and exports tables/charts.
// Nothing is carried over between passes.
mod chart;
mod config;
mod error;
mod fetch;
mod geo;
mod output;
mod pipeline;
mod stats;
mod table;
mod types;
mod util;
mod view;

use anyhow::Context;
use config::Config;
use fetch::Fetcher;
use std::io::{self, Write};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};
use view::{Mode, SubMode, ViewRequest};

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask a Y/N question until the user gives one of the two answers.
fn prompt_yes_no(question: &str) -> bool {
    loop {
        print!("{} (Y/N): ", question);
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn choose_chart() -> Option<SubMode> {
    println!("Choose your charts");
    for (i, sub) in SubMode::ALL.iter().enumerate() {
        println!("[{}] {}", i + 1, sub);
    }
    let choice = read_choice();
    let picked = choice
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| SubMode::ALL.get(i).copied())
        .or_else(|| choice.parse().ok());
    if picked.is_none() {
        println!("Invalid choice. Please enter 1 to 4.\n");
    }
    picked
}

/// Resolve and display one view.
fn handle_view(req: ViewRequest, fetcher: &Fetcher, cfg: &Config) {
    let view = view::resolve(&req, fetcher, cfg);
    if let Err(e) = output::render(&view, &cfg.output_dir) {
        eprintln!("Write error: {}", e);
    }
}

/// Fetch once, sum the Omicron window, and write `summary.csv` and `summary.json`.
fn handle_export_summary(fetcher: &Fetcher, cfg: &Config) {
    let rows = match fetch::fetch_covid(fetcher, &cfg.covid_url).and_then(|raw| view::summary_rows(&raw)) {
        Ok(rows) => rows,
        Err(e) => {
            error!("summary export failed: {}", e);
            println!("Error: {}\n", e);
            return;
        }
    };

    if let Err(e) = std::fs::create_dir_all(&cfg.output_dir) {
        eprintln!("Write error: {}", e);
        return;
    }
    let csv_path = cfg.output_dir.join("summary.csv");
    if let Err(e) = output::write_csv(&csv_path, &rows) {
        eprintln!("Write error: {}", e);
    }
    let json_path = cfg.output_dir.join("summary.json");
    if let Err(e) = output::write_json(&json_path, &rows) {
        eprintln!("Write error: {}", e);
    }
    println!("Omicron window summary ({} after {})\n", view::COUNTRY, view::omicron_cutoff());
    println!("{}\n", output::preview_rows(&rows, output::PREVIEW_ROWS));
    println!("(Exported to {} and {})\n", csv_path.display(), json_path.display());
}

fn main() -> anyhow::Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let cfg = Config::load().context("loading configuration")?;
    let fetcher = Fetcher::new(&cfg).context("building http client")?;
    info!("covid source: {}", cfg.covid_url);

    println!("Exploratory Data Analysis, Prediction and Timeseries forecasting of Omicron in India");
    println!("-------\n");

    loop {
        println!("Explore our Project");
        for (i, mode) in Mode::ALL.iter().enumerate() {
            println!("[{}] {}", i + 1, mode);
        }
        println!("[6] Export Summary");
        println!("[0] Exit\n");
        match read_choice().as_str() {
            "1" => handle_view(ViewRequest::new(Mode::Introduction), &fetcher, &cfg),
            "2" => {
                let req = ViewRequest {
                    load_dataset: prompt_yes_no("Load the dataset"),
                    ..ViewRequest::new(Mode::Dataset)
                };
                handle_view(req, &fetcher, &cfg);
            }
            "3" => {
                if let Some(sub) = choose_chart() {
                    handle_view(ViewRequest::visualization(sub), &fetcher, &cfg);
                }
            }
            "4" => handle_view(ViewRequest::new(Mode::ModelPrediction), &fetcher, &cfg),
            "5" => handle_view(ViewRequest::new(Mode::TimeseriesForecasting), &fetcher, &cfg),
            "6" => handle_export_summary(&fetcher, &cfg),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0 to 6.\n"),
        }
    }
    Ok(())
}
