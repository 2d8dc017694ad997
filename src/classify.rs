//! Column type classification for test dispatch.
//!
//! Reduces the storage-level [`DataType`](crate::dataframe::DataType) to the
//! three classes the test selector dispatches on, and measures observed
//! cardinality (binary vs multi-valued).
//!
//! Classification rule: string-typed columns (categorical or text) are
//! **Categorical**; numeric and boolean columns are **Numerical** (a boolean
//! is just a two-valued numeric coding here); date columns are
//! **Unsupported** — an explicit class rather than a silent fall-through
//! into the numeric branch.
//!
//! # Example
//!
//! ```
//! use sigscreen::classify::{type_class, is_binary, TypeClass};
//! use sigscreen::dataframe::Column;
//!
//! let city = Column::text(vec!["Oslo".into(), "Lima".into(), "Oslo".into()]);
//! assert_eq!(type_class(&city), TypeClass::Categorical);
//! assert!(is_binary(&city)); // two distinct observed values
//!
//! let age = Column::numeric(vec![31.0, 45.0, 27.0]);
//! assert_eq!(type_class(&age), TypeClass::Numerical);
//! assert!(!is_binary(&age));
//! ```

use crate::dataframe::{Column, DataType};
use std::collections::HashSet;

/// Dispatch class of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeClass {
    /// Number-valued: numeric and boolean columns.
    Numerical,
    /// String-valued: categorical and text columns.
    Categorical,
    /// Neither class applies cleanly (dates); screening rejects these.
    Unsupported,
}

/// Returns the dispatch class of a column.
pub fn type_class(column: &Column) -> TypeClass {
    match column.data_type() {
        DataType::Numeric | DataType::Boolean => TypeClass::Numerical,
        DataType::Categorical | DataType::Text => TypeClass::Categorical,
        DataType::DateTime => TypeClass::Unsupported,
    }
}

/// Counts the distinct observed values of a column.
pub fn distinct_count(column: &Column) -> usize {
    let mut seen: HashSet<String> = HashSet::new();
    for idx in 0..column.len() {
        seen.insert(column.key_at(idx));
    }
    seen.len()
}

/// Returns `true` if the column has exactly two distinct observed values.
///
/// Binary status is a property of the observed data, not the storage type:
/// a numeric 0/1 column, a boolean column, and a "yes"/"no" text column
/// are all binary.
pub fn is_binary(column: &Column) -> bool {
    distinct_count(column) == 2
}

// ── Tests ─────────────────────────────────────────────────────────────
