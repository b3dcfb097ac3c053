use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_INPUT: &str = "Sample - Superstore.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_ENCODING: &str = "ISO-8859-1";

/// Everything one pipeline run needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub encoding: String,
    pub font_dir: Option<PathBuf>,
    pub summary: Option<PathBuf>,
}

impl ReportConfig {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        ReportConfig {
            input: input.into(),
            output_dir: output_dir.into(),
            encoding: DEFAULT_ENCODING.to_string(),
            font_dir: None,
            summary: None,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig::new(DEFAULT_INPUT, DEFAULT_OUTPUT_DIR)
    }
}

/// Build a sales analysis PDF (charts plus key insights) from a Superstore CSV export.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// CSV file to analyse.
    #[arg(default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Directory receiving the chart images and the PDF.
    #[arg(long, short, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Text encoding of the CSV (any WHATWG label).
    #[arg(long, default_value = DEFAULT_ENCODING)]
    pub encoding: String,

    /// Directory holding a Liberation Sans or DejaVu Sans family.
    #[arg(long, value_name = "DIR")]
    pub font_dir: Option<PathBuf>,

    /// Also write the aggregate views as JSON to this path.
    #[arg(long, value_name = "PATH")]
    pub summary: Option<PathBuf>,

    /// Rows shown per view in the console preview.
    #[arg(long, default_value_t = 5)]
    pub preview_rows: usize,
}

impl From<&Args> for ReportConfig {
    fn from(args: &Args) -> Self {
        ReportConfig {
            input: args.input.clone(),
            output_dir: args.output_dir.clone(),
            encoding: args.encoding.clone(),
            font_dir: args.font_dir.clone(),
            summary: args.summary.clone(),
        }
    }
}
