//! Column-major DataFrame for tabular data.
//!
//! The [`DataFrame`] stores data in column-major order with typed, dense
//! columns. Missing values are not modeled: significance screening requires
//! clean data, and the loader rejects tables that contain nulls.
//!
//! # Column Types
//!
//! | Type | Storage | Use case |
//! |------|---------|----------|
//! | [`Numeric`](Column::Numeric) | `Vec<f64>` | Continuous/integer values |
//! | [`Boolean`](Column::Boolean) | `Vec<bool>` | True/false values |
//! | [`Categorical`](Column::Categorical) | Dictionary + `Vec<u32>` | Low-cardinality strings |
//! | [`Text`](Column::Text) | `Vec<String>` | High-cardinality strings |
//! | [`DateTime`](Column::DateTime) | `Vec<String>` | ISO dates (not screenable) |
//!
//! # Example
//!
//! ```
//! use sigscreen::dataframe::{DataFrame, Column};
//!
//! let mut df = DataFrame::new();
//! df.add_column(
//!     "temperature".to_string(),
//!     Column::numeric(vec![20.5, 21.3, 19.8]),
//! ).unwrap();
//! assert_eq!(df.row_count(), 3);
//! assert_eq!(df.column_count(), 1);
//! ```

use crate::error::ScreenError;

// ── DataType ──────────────────────────────────────────────────────────

/// Semantic data type inferred for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Continuous or integer numeric values (stored as `f64`).
    Numeric,
    /// Boolean (true/false) values.
    Boolean,
    /// Low-cardinality strings (dictionary-encoded).
    Categorical,
    /// High-cardinality or free-form text.
    Text,
    /// ISO calendar dates. Recognized so that type classification can
    /// report them as unsupported instead of silently misreading them.
    DateTime,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric => write!(f, "Numeric"),
            Self::Boolean => write!(f, "Boolean"),
            Self::Categorical => write!(f, "Categorical"),
            Self::Text => write!(f, "Text"),
            Self::DateTime => write!(f, "DateTime"),
        }
    }
}

// ── Column ────────────────────────────────────────────────────────────

/// A typed column with dense value storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Dense `f64` values.
    Numeric { values: Vec<f64> },
    /// Boolean values.
    Boolean { values: Vec<bool> },
    /// Dictionary-encoded categorical column.
    ///
    /// `dictionary` contains unique string values in first-appearance
    /// order; `codes` maps each row to a dictionary index.
    Categorical {
        dictionary: Vec<String>,
        codes: Vec<u32>,
    },
    /// Free-form text column.
    Text { values: Vec<String> },
    /// Raw ISO date strings.
    DateTime { values: Vec<String> },
}

impl Column {
    /// Creates a numeric column.
    pub fn numeric(values: Vec<f64>) -> Self {
        Self::Numeric { values }
    }

    /// Creates a boolean column.
    pub fn boolean(values: Vec<bool>) -> Self {
        Self::Boolean { values }
    }

    /// Creates a categorical column from a dictionary and row codes.
    pub fn categorical(dictionary: Vec<String>, codes: Vec<u32>) -> Self {
        Self::Categorical { dictionary, codes }
    }

    /// Creates a text column.
    pub fn text(values: Vec<String>) -> Self {
        Self::Text { values }
    }

    /// Creates a date column from raw ISO date strings.
    pub fn date_time(values: Vec<String>) -> Self {
        Self::DateTime { values }
    }

    /// Returns the data type of this column.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Numeric { .. } => DataType::Numeric,
            Self::Boolean { .. } => DataType::Boolean,
            Self::Categorical { .. } => DataType::Categorical,
            Self::Text { .. } => DataType::Text,
            Self::DateTime { .. } => DataType::DateTime,
        }
    }

    /// Returns the number of rows in this column.
    pub fn len(&self) -> usize {
        match self {
            Self::Numeric { values } => values.len(),
            Self::Boolean { values } => values.len(),
            Self::Categorical { codes, .. } => codes.len(),
            Self::Text { values } => values.len(),
            Self::DateTime { values } => values.len(),
        }
    }

    /// Returns `true` if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the numeric values, or `None` if not a numeric column.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Self::Numeric { values } => Some(values),
            _ => None,
        }
    }

    /// Returns the boolean values, or `None` if not a boolean column.
    pub fn as_boolean(&self) -> Option<&[bool]> {
        match self {
            Self::Boolean { values } => Some(values),
            _ => None,
        }
    }

    /// Returns the category string for a row in a categorical column.
    pub fn category_at(&self, idx: usize) -> Option<&str> {
        match self {
            Self::Categorical { dictionary, codes } => {
                dictionary.get(*codes.get(idx)? as usize).map(|s| s.as_str())
            }
            _ => None,
        }
    }

    /// Returns the values of a number-class column as `f64`.
    ///
    /// Booleans are coded 0.0/1.0 since the classifier treats them as
    /// numerical. Returns `None` for string-typed and date columns.
    pub fn numeric_values(&self) -> Option<Vec<f64>> {
        match self {
            Self::Numeric { values } => Some(values.clone()),
            Self::Boolean { values } => {
                Some(values.iter().map(|&b| if b { 1.0 } else { 0.0 }).collect())
            }
            _ => None,
        }
    }

    /// Returns a grouping key for the value at `idx`.
    ///
    /// Keys distinguish distinct observed values regardless of storage
    /// type; they drive cardinality counts, contingency tables, and
    /// group partitioning.
    pub fn key_at(&self, idx: usize) -> String {
        match self {
            Self::Numeric { values } => format!("{}", values[idx]),
            Self::Boolean { values } => {
                if values[idx] { "true".into() } else { "false".into() }
            }
            Self::Categorical { dictionary, codes } => {
                dictionary[codes[idx] as usize].clone()
            }
            Self::Text { values } => values[idx].clone(),
            Self::DateTime { values } => values[idx].clone(),
        }
    }
}

// ── DataFrame ─────────────────────────────────────────────────────────

/// Column-major tabular data structure.
///
/// Stores named columns of typed data. All columns must have the same
/// number of rows; insertion order is preserved.
///
/// # Example
///
/// ```
/// use sigscreen::dataframe::{DataFrame, Column};
///
/// let mut df = DataFrame::new();
/// df.add_column(
///     "x".to_string(),
///     Column::numeric(vec![1.0, 2.0, 3.0]),
/// ).unwrap();
/// df.add_column(
///     "label".to_string(),
///     Column::text(vec!["a".into(), "b".into(), "c".into()]),
/// ).unwrap();
/// assert_eq!(df.row_count(), 3);
/// assert_eq!(df.column_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct DataFrame {
    names: Vec<String>,
    columns: Vec<Column>,
    row_count: usize,
}

impl DataFrame {
    /// Creates an empty DataFrame with no columns or rows.
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            columns: Vec::new(),
            row_count: 0,
        }
    }

    /// Adds a named column to the DataFrame.
    ///
    /// Returns an error if the column length doesn't match the existing
    /// row count (unless this is the first column).
    pub fn add_column(&mut self, name: String, column: Column) -> Result<(), ScreenError> {
        let col_len = column.len();
        if self.columns.is_empty() {
            self.row_count = col_len;
        } else if col_len != self.row_count {
            return Err(ScreenError::DimensionMismatch {
                expected: self.row_count,
                actual: col_len,
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Returns the number of rows.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the number of columns.
    #[inline]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the DataFrame has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns column names.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Returns a reference to the column at `index`.
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Returns a reference to the column with the given `name`.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.column_index(name).map(|i| &self.columns[i])
    }

    /// Returns the column with the given `name`, or a `ColumnNotFound` error.
    pub fn require_column(&self, name: &str) -> Result<&Column, ScreenError> {
        self.column_by_name(name)
            .ok_or_else(|| ScreenError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    /// Returns the index of the column with the given `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Returns an iterator over (name, column) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names.iter().map(|s| s.as_str()).zip(self.columns.iter())
    }

    /// Returns a summary of column data types.
    pub fn schema(&self) -> Vec<(&str, DataType)> {
        self.names
            .iter()
            .zip(self.columns.iter())
            .map(|(name, col)| (name.as_str(), col.data_type()))
            .collect()
    }

    /// Extracts the values of a number-class column (numeric or boolean).
    ///
    /// Fails with `PreconditionFailed` for string-typed or date columns.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<f64>, ScreenError> {
        let col = self.require_column(name)?;
        col.numeric_values()
            .ok_or_else(|| ScreenError::PreconditionFailed {
                column: name.to_string(),
                requirement: "a numeric variable".to_string(),
            })
    }

    /// Partitions the numeric values of `value_col` into groups keyed by the
    /// distinct values of `key_col`, in first-appearance order.
    pub fn grouped_numeric(
        &self,
        value_col: &str,
        key_col: &str,
    ) -> Result<Vec<(String, Vec<f64>)>, ScreenError> {
        let values = self.numeric_column(value_col)?;
        let keys = self.require_column(key_col)?;

        let mut order: Vec<String> = Vec::new();
        let mut groups: Vec<Vec<f64>> = Vec::new();
        for (idx, &v) in values.iter().enumerate() {
            let key = keys.key_at(idx);
            match order.iter().position(|k| *k == key) {
                Some(pos) => groups[pos].push(v),
                None => {
                    order.push(key);
                    groups.push(vec![v]);
                }
            }
        }

        Ok(order.into_iter().zip(groups).collect())
    }

    /// Builds the contingency table of observed frequencies for two columns.
    ///
    /// Returns the table flat in row-major order together with its
    /// dimensions; rows follow the distinct values of `row_col` and columns
    /// the distinct values of `col_col`, each in first-appearance order.
    pub fn contingency_table(
        &self,
        row_col: &str,
        col_col: &str,
    ) -> Result<(Vec<f64>, usize, usize), ScreenError> {
        let rows = self.require_column(row_col)?;
        let cols = self.require_column(col_col)?;

        let mut row_keys: Vec<String> = Vec::new();
        let mut col_keys: Vec<String> = Vec::new();
        let mut pairs: Vec<(usize, usize)> = Vec::with_capacity(self.row_count);

        for idx in 0..self.row_count {
            let rk = rows.key_at(idx);
            let ck = cols.key_at(idx);
            let ri = match row_keys.iter().position(|k| *k == rk) {
                Some(pos) => pos,
                None => {
                    row_keys.push(rk);
                    row_keys.len() - 1
                }
            };
            let ci = match col_keys.iter().position(|k| *k == ck) {
                Some(pos) => pos,
                None => {
                    col_keys.push(ck);
                    col_keys.len() - 1
                }
            };
            pairs.push((ri, ci));
        }

        let n_rows = row_keys.len();
        let n_cols = col_keys.len();
        let mut table = vec![0.0; n_rows * n_cols];
        for (ri, ci) in pairs {
            table[ri * n_cols + ci] += 1.0;
        }

        Ok((table, n_rows, n_cols))
    }
}

impl Default for DataFrame {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
