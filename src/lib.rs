//! Superstore sales report: load a CSV export, aggregate it, chart the
//! aggregates and bundle everything into a PDF.

pub mod charts;
pub mod config;
pub mod error;
pub mod fonts;
pub mod insights;
pub mod loader;
pub mod output;
pub mod pdf;
pub mod reports;
pub mod types;
pub mod util;

use std::path::PathBuf;

pub use config::ReportConfig;
pub use error::{ReportError, Result};
use types::{Analysis, LoadReport, Summary};

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub load: LoadReport,
    pub analysis: Analysis,
    pub charts: Vec<charts::RenderedChart>,
    pub report_path: PathBuf,
}

/// Runs the whole pipeline once. Files written before a failing step stay
/// on disk.
pub fn run(config: &ReportConfig) -> Result<RunOutcome> {
    let (records, load) = loader::load_and_clean(&config.input, &config.encoding)?;
    let analysis = reports::analyze(&records);

    for problem in insights::check(&analysis) {
        log::warn!("report insight not supported by data: {}", problem);
    }

    if let Some(path) = &config.summary {
        output::write_json(
            path,
            &Summary {
                load,
                analysis: &analysis,
            },
        )?;
        log::info!("wrote {}", path.display());
    }

    let fonts = fonts::discover(config.font_dir.as_deref())?;
    fonts::register_chart_font(&fonts)?;
    let charts = charts::render_all(&analysis, &config.output_dir)?;
    let report_path = pdf::compose(&config.output_dir, &charts, &fonts)?;

    Ok(RunOutcome {
        load,
        analysis,
        charts,
        report_path,
    })
}
