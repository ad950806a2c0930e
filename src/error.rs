// ⚠️ Table Errors - Failures at the spreadsheet boundary
// The merge core never fails; only reading and writing tables can.

use thiserror::Error;

/// Result type for table I/O
pub type TableResult<T> = std::result::Result<T, TableError>;

#[derive(Error, Debug)]
pub enum TableError {
    /// File extension is not a supported table format
    #[error("Unsupported table format: {0}")]
    UnsupportedFormat(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read or write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Workbook could not be opened or decoded
    #[error("Workbook error: {0}")]
    Workbook(String),

    /// Requested worksheet does not exist
    #[error("Worksheet not found: {0}")]
    MissingSheet(String),

    /// Table has no header row to name its columns
    #[error("No header row in {0}")]
    NoHeader(String),
}
