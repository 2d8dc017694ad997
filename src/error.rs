//! Error types for sigscreen.

use std::fmt;

/// All errors produced by sigscreen operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenError {
    /// CSV parsing failed.
    CsvParse { line: usize, message: String },
    /// Column contains missing values; the screening model requires clean data.
    MissingValues { column: String, count: usize },
    /// Column not found in DataFrame.
    ColumnNotFound { name: String },
    /// Column length does not match the table's row count.
    DimensionMismatch { expected: usize, actual: usize },
    /// A test was invoked on a column that violates its precondition
    /// (e.g., a binary-target test against a non-binary target).
    PreconditionFailed { column: String, requirement: String },
    /// A sample is unusable for the selected statistical test: too few
    /// observations, too many for Shapiro-Wilk, or zero variance.
    DegenerateSample { column: String, n: usize },
    /// Column's type does not fall into the numerical or categorical class.
    UnsupportedType { column: String, data_type: String },
    /// I/O error during file reading.
    Io(String),
}

impl fmt::Display for ScreenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CsvParse { line, message } => {
                write!(f, "CSV parse error at line {line}: {message}")
            }
            Self::MissingValues { column, count } => {
                write!(f, "column '{column}' has {count} missing values")
            }
            Self::ColumnNotFound { name } => {
                write!(f, "column '{name}' not found")
            }
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "expected {expected} rows, got {actual}")
            }
            Self::PreconditionFailed { column, requirement } => {
                write!(f, "column '{column}' must be {requirement}")
            }
            Self::DegenerateSample { column, n } => {
                write!(
                    f,
                    "column '{column}' has a degenerate sample (n={n}): too few observations or zero variance"
                )
            }
            Self::UnsupportedType { column, data_type } => {
                write!(
                    f,
                    "column '{column}' has unsupported type {data_type} for significance screening"
                )
            }
            Self::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for ScreenError {}

impl From<std::io::Error> for ScreenError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
