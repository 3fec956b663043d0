use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Error type covering every failure that can abort a consolidation run.
///
/// None of these are recovered locally: a run either produces the complete
/// report or no report at all.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when a configuration file cannot be parsed or serialised.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when the input discovery pattern cannot be compiled.
    #[error("invalid input pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// Raised when a discovered input path cannot be inspected.
    #[error("input discovery failed: {0}")]
    Discovery(#[from] glob::GlobError),

    /// Raised when the report configuration fails validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Raised when an input workbook lacks a sheet named by the configuration.
    #[error("{}: missing sheet '{sheet}' required by {context}", .path.display())]
    MissingSheet {
        path: PathBuf,
        sheet: String,
        context: String,
    },

    /// Raised when a summed cell holds something other than a number.
    #[error(
        "{}: non-numeric value '{value}' at sheet '{sheet}' row {row} column {column} ({category})",
        .path.display()
    )]
    NonNumericCell {
        path: PathBuf,
        sheet: String,
        category: String,
        row: u32,
        column: u16,
        value: String,
    },

    /// Raised when a column total grows beyond what a decimal amount can hold.
    #[error(
        "{}: sum overflows at sheet '{sheet}' row {row} column {column} ({category})",
        .path.display()
    )]
    AmountOverflow {
        path: PathBuf,
        sheet: String,
        category: String,
        row: u32,
        column: u16,
    },

    /// Raised when the month cell cannot be turned into a month label.
    #[error("{}: cannot derive a month label from '{value}'", .path.display())]
    InvalidMonth { path: PathBuf, value: String },

    /// Raised when the user provides a path that does not exist.
    #[error("input not found: {0}")]
    MissingInput(PathBuf),

    /// Raised before any input is read when the report cannot be saved.
    #[error("output folder not found: {0}")]
    MissingOutputDir(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
