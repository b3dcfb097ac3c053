use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to access {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV input")]
    Csv(#[from] csv::Error),

    #[error("row {row}: expected at most {expected} fields, found {found}")]
    FieldCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown text encoding label '{0}'")]
    UnknownEncoding(String),

    #[error("required column '{0}' is absent from the header")]
    MissingColumn(String),

    #[error("row {row}: column '{column}' has unparseable date '{value}'")]
    InvalidDate {
        column: &'static str,
        row: usize,
        value: String,
    },

    #[error("row {row}: column '{column}' has non-numeric value '{value}'")]
    InvalidNumber {
        column: &'static str,
        row: usize,
        value: String,
    },

    #[error("failed to draw chart {}", path.display())]
    Chart {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("no usable font family found (searched: {searched})")]
    FontNotFound { searched: String },

    #[error("failed to load font {}: {message}", path.display())]
    Font { path: PathBuf, message: String },

    #[error("failed to render PDF report")]
    Pdf(#[from] genpdf::error::Error),

    #[error("failed to serialize summary")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}
