//! Dataset-level screening: run the right test for every predictor
//! against one target and collect the verdicts.
//!
//! [`fit`] classifies the target (binary, multi-categorical, or
//! numerical), partitions the remaining columns into categorical and
//! numerical sets, and dispatches each predictor to the matching selector
//! entry point. Categorical predictors are screened before numerical
//! ones; within each set the original column order is kept.
//!
//! Screening is all-or-nothing: the first predictor whose test cannot run
//! aborts the whole pass with that predictor's error.

use crate::classify::{is_binary, type_class, TypeClass};
use crate::dataframe::DataFrame;
use crate::error::ScreenError;
use crate::normality::ALPHA;
use crate::select::{self, TestReport};

/// One screened predictor with its finished test report.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenEntry {
    /// The screened predictor column. When roles were swapped to fit a
    /// test's shape this still names the predictor, not the column the
    /// test treated as its grouping variable.
    pub column: String,
    /// The finished test.
    pub report: TestReport,
}

/// Ordered screening results for one dataset/target pair.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenResult {
    /// Entries in screening order: categorical predictors first, then
    /// numerical, each in original column order.
    pub entries: Vec<ScreenEntry>,
}

impl ScreenResult {
    /// Number of screened predictors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing was screened (target was the only column).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Report for one predictor, if it was screened.
    pub fn get(&self, column: &str) -> Option<&TestReport> {
        self.entries
            .iter()
            .find(|e| e.column == column)
            .map(|e| &e.report)
    }

    /// Predictor names paired with rendered explanation text, in
    /// screening order.
    pub fn explanations(&self) -> Vec<(&str, String)> {
        self.entries
            .iter()
            .map(|e| (e.column.as_str(), e.report.explanation()))
            .collect()
    }

    /// Predictor names paired with p-values, in screening order.
    pub fn p_values(&self) -> Vec<(&str, f64)> {
        self.entries
            .iter()
            .map(|e| (e.column.as_str(), e.report.p_value))
            .collect()
    }

    /// Predictors whose test failed to reject independence, i.e. whose
    /// p-value is strictly greater than 0.05. A p-value exactly at the
    /// threshold counts as dependent.
    pub fn independent_columns(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.report.p_value > ALPHA)
            .map(|e| e.column.as_str())
            .collect()
    }
}

#[derive(Clone, Copy)]
enum TargetCase {
    Binary,
    MultiCategorical,
    Numerical,
}

/// Screens every column of `df` against `target` and returns the ordered
/// results.
///
/// Target classification takes binary first: a column with exactly two
/// distinct values is a binary target no matter how it is stored. A
/// non-binary string column is a multi-categorical target; a non-binary
/// numeric or boolean column is a numerical target.
///
/// Under a numerical target the roles of a categorical predictor are
/// swapped so the pair fits a grouped test: a binary predictor gets the
/// two-sample branch and a multi-valued predictor the k-sample branch,
/// with the target as the measured variable in both.
///
/// # Errors
///
/// - [`ScreenError::ColumnNotFound`] if `target` is missing.
/// - [`ScreenError::DegenerateSample`] if the dataset has fewer than
///   three rows, or any tested sample is unusable.
/// - [`ScreenError::UnsupportedType`] if the target or any predictor is
///   a date column.
pub fn fit(df: &DataFrame, target: &str) -> Result<ScreenResult, ScreenError> {
    let target_col = df.require_column(target)?;
    if df.row_count() < 3 {
        return Err(ScreenError::DegenerateSample {
            column: target.to_string(),
            n: df.row_count(),
        });
    }

    let target_class = type_class(target_col);
    if target_class == TypeClass::Unsupported {
        return Err(ScreenError::UnsupportedType {
            column: target.to_string(),
            data_type: target_col.data_type().to_string(),
        });
    }

    let case = if is_binary(target_col) {
        TargetCase::Binary
    } else if target_class == TypeClass::Categorical {
        TargetCase::MultiCategorical
    } else {
        TargetCase::Numerical
    };

    let mut cat_cols: Vec<&str> = Vec::new();
    let mut num_cols: Vec<&str> = Vec::new();
    for (name, col) in df.iter() {
        if name == target {
            continue;
        }
        match type_class(col) {
            TypeClass::Categorical => cat_cols.push(name),
            TypeClass::Numerical => num_cols.push(name),
            TypeClass::Unsupported => {
                return Err(ScreenError::UnsupportedType {
                    column: name.to_string(),
                    data_type: col.data_type().to_string(),
                })
            }
        }
    }

    let mut entries = Vec::with_capacity(cat_cols.len() + num_cols.len());

    for &name in &cat_cols {
        let report = match case {
            TargetCase::Binary | TargetCase::MultiCategorical => {
                select::categorical_test(df, name, target)?
            }
            TargetCase::Numerical => {
                // Swap roles so the numerical target is the measured
                // variable grouped by the categorical predictor.
                if is_binary(df.require_column(name)?) {
                    select::numeric_binary_test(df, target, name)?
                } else {
                    select::numeric_categorical_test(df, target, name)?
                }
            }
        };
        entries.push(ScreenEntry {
            column: name.to_string(),
            report,
        });
    }

    for &name in &num_cols {
        let report = match case {
            TargetCase::Binary => select::numeric_binary_test(df, name, target)?,
            TargetCase::MultiCategorical => select::numeric_categorical_test(df, name, target)?,
            TargetCase::Numerical => select::numeric_numeric_test(df, name, target)?,
        };
        entries.push(ScreenEntry {
            column: name.to_string(),
            report,
        });
    }

    Ok(ScreenResult { entries })
}

// ── Tests ───────────────────────────────────────────────────────────
