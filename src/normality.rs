//! Normality gate for parametric test selection.
//!
//! Decides whether a predictor/target pair may be treated as normally
//! distributed, which is what switches the selector between parametric
//! and rank-based tests.
//!
//! The branch is keyed on the **target column's type class**:
//!
//! - Categorical target: the variable is split into one sample per target
//!   category and Shapiro-Wilk runs on each; the pair counts as normal
//!   only if **every** group fails to reject normality (all p > 0.05).
//! - Numerical target: Shapiro-Wilk runs on the target column and on the
//!   variable column independently; the pair counts as normal if
//!   **either** fails to reject (p > 0.05).
//!
//! The AND/OR asymmetry between the two branches is deliberate behavior
//! preservation; note that a binary target stored numerically takes the
//! lenient numeric branch. A sample Shapiro-Wilk is undefined on (fewer
//! than 3 observations, more than 5000, zero range) fails loud with
//! [`ScreenError::DegenerateSample`].

use crate::classify::{type_class, TypeClass};
use crate::dataframe::DataFrame;
use crate::error::ScreenError;
use crate::testing::shapiro_wilk_test;

/// Significance level shared by the normality gate and the independence
/// verdict.
pub const ALPHA: f64 = 0.05;

/// Runs Shapiro-Wilk on one sample, mapping undefined inputs to a
/// `DegenerateSample` error naming the column.
fn shapiro_p(sample: &[f64], column: &str) -> Result<f64, ScreenError> {
    shapiro_wilk_test(sample)
        .map(|r| r.p_value)
        .ok_or_else(|| ScreenError::DegenerateSample {
            column: column.to_string(),
            n: sample.len(),
        })
}

/// Returns whether `variable` may be treated as normally distributed with
/// respect to `target`.
///
/// # Errors
///
/// - [`ScreenError::ColumnNotFound`] if either column is missing.
/// - [`ScreenError::PreconditionFailed`] if `variable` is not numeric.
/// - [`ScreenError::DegenerateSample`] if any tested sample is unusable
///   for Shapiro-Wilk.
/// - [`ScreenError::UnsupportedType`] if the target column's type has no
///   class.
pub fn is_normal(df: &DataFrame, variable: &str, target: &str) -> Result<bool, ScreenError> {
    let target_col = df.require_column(target)?;

    match type_class(target_col) {
        TypeClass::Categorical => {
            let groups = df.grouped_numeric(variable, target)?;
            for (_, sample) in &groups {
                if shapiro_p(sample, variable)? <= ALPHA {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        TypeClass::Numerical => {
            let target_values = df.numeric_column(target)?;
            let variable_values = df.numeric_column(variable)?;
            let p_target = shapiro_p(&target_values, target)?;
            let p_variable = shapiro_p(&variable_values, variable)?;
            Ok(p_target > ALPHA || p_variable > ALPHA)
        }
        TypeClass::Unsupported => Err(ScreenError::UnsupportedType {
            column: target.to_string(),
            data_type: target_col.data_type().to_string(),
        }),
    }
}

// ── Tests ───────────────────────────────────────────────────────────
