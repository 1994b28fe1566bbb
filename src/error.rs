use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("unrecognized month '{value}' at row {row}")]
    UnknownMonth { value: String, row: usize },

    #[error("{path}: sheet has {found} columns but the reference list has {expected}")]
    ColumnMismatch {
        path: String,
        expected: usize,
        found: usize,
    },

    #[error("{0}: workbook contains no sheets")]
    EmptyWorkbook(String),

    #[error("{0}: not enough rows for a {1}-row header")]
    HeaderTooShort(String, usize),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("no data loaded; load the dataset first (option 1)")]
    NoData,
}

pub type Result<T> = std::result::Result<T, DashboardError>;
