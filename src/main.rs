// Entry point: parse arguments, run the pipeline once, then print the load
// diagnostics, a preview of each aggregate and the report location.
use clap::Parser;
use std::error::Error;
use superstore_report::config::Args;
use superstore_report::util::format_int;
use superstore_report::{output, run, ReportConfig, RunOutcome};

fn print_outcome(outcome: &RunOutcome, preview_rows: usize) {
    println!(
        "Processing dataset... ({} rows loaded, {} kept after dropping missing values)",
        format_int(outcome.load.total_rows),
        format_int(outcome.load.retained_rows)
    );
    if outcome.load.dropped_rows > 0 {
        println!(
            "Note: {} rows dropped for missing values.",
            format_int(outcome.load.dropped_rows)
        );
    }
    println!();

    let analysis = &outcome.analysis;
    output::preview_view("Sales by Category", &analysis.category_sales, preview_rows);
    output::preview_view("Profit by Region", &analysis.region_profit, preview_rows);
    output::preview_view("Monthly Sales", &analysis.monthly_sales, preview_rows);
    output::preview_view(
        "Profit by Sub-Category (least first)",
        &analysis.subcategory_profit,
        preview_rows,
    );

    println!(" PDF report generated: {}", outcome.report_path.display());
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = ReportConfig::from(&args);

    match run(&config) {
        Ok(outcome) => print_outcome(&outcome, args.preview_rows),
        Err(err) => {
            eprintln!("Error: {}", err);
            print_error_sources(&err);
            std::process::exit(1);
        }
    }
}
