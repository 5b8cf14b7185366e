//! Data handling for the funnel chart engine
//!
//! Raw host data is normalized into rows, rows are aggregated into stages,
//! and the settings snapshot that drives the rest of the pipeline is loaded
//! here as well.

pub mod aggregate;
pub mod config;
pub mod normalize;
pub mod schema;
pub mod sources;

use arrow::error::ArrowError;
use tokio::task::JoinError;
use thiserror::Error;

// Re-exports
pub use aggregate::{aggregate, FunnelDataset, Segment, Stage};
pub use config::{FunnelSettings, NullConfig, SegmentOrder};
pub use normalize::{normalize, Normalizer, Row};
pub use sources::{ColumnRoles, CsvSource, RecordBatchSource, StaticSource};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arrow error: {0}")]
    Arrow(ArrowError),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Join error: {0}")]
    Join(#[from] JoinError),

    #[error(transparent)]
    Funnel(#[from] funnel_core::FunnelError),
}

impl From<csv::Error> for DataError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => DataError::Io(std::io::Error::new(io_err.kind(), error.to_string())),
            _ => DataError::Csv(error.to_string()),
        }
    }
}

impl From<ArrowError> for DataError {
    fn from(error: ArrowError) -> Self {
        DataError::Arrow(error)
    }
}

impl From<serde_json::Error> for DataError {
    fn from(error: serde_json::Error) -> Self {
        DataError::Settings(error.to_string())
    }
}
