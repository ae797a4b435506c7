//! Error types shared by the loader, aggregator, outputs and analysis client.

use chrono::NaiveDate;
use thiserror::Error;

/// Everything that can go wrong while building the dashboard data.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The dataset is missing one or more required columns.
    #[error("dataset is missing required column(s): {}", .missing.join(", "))]
    DataFormat { missing: Vec<String> },

    /// The requested date range has its bounds reversed.
    #[error("empty date range: start {start} is after end {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },

    #[error("invalid date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("country name must not be empty")]
    EmptyCountry,

    /// The external text-generation service failed or returned nothing usable.
    #[error("analysis request failed: {0}")]
    Analysis(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_format_lists_every_missing_column() {
        let err = DashboardError::DataFormat {
            missing: vec!["URL".to_string(), "Pub_Date".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "dataset is missing required column(s): URL, Pub_Date"
        );
    }

    #[test]
    fn test_empty_range_message() {
        let err = DashboardError::EmptyRange {
            start: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        };
        assert!(err.to_string().contains("2024-02-01 is after end 2024-01-01"));
    }
}
