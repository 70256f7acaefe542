use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

pub type LoadResult<T> = std::result::Result<T, DataLoadError>;

/// Fatal failures while reading or preparing the source dataset.
#[derive(Error, Debug)]
pub enum DataLoadError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Required column '{0}' not found in header")]
    MissingColumn(String),

    #[error("Invalid value '{value}' for column {column} on line {line}")]
    InvalidNumber {
        line: u64,
        column: String,
        value: String,
    },

    #[error(
        "Invalid timestamp on line {line}: year={year}, month={month}, day={day}, hour={hour}"
    )]
    InvalidTimestamp {
        line: u64,
        year: i64,
        month: i64,
        day: i64,
        hour: i64,
    },

    #[error("No complete records remain after dropping {dropped} incomplete rows")]
    EmptyDataset { dropped: usize },

    #[error("Value {value} of {column} is outside the fitted bin range ({min}, {max}]")]
    OutOfBinRange {
        column: String,
        value: f64,
        min: f64,
        max: f64,
    },
}

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Failed to load dataset: {0}")]
    Load(#[from] DataLoadError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("No records in the selected date range {start} to {end}")]
    EmptySelection { start: NaiveDate, end: NaiveDate },
}
