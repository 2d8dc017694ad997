//! Test selection: one entry point per predictor/target type pair.
//!
//! Each entry point checks its precondition, consults the normality gate
//! where the pair calls for it, runs the chosen parametric or rank-based
//! test, and returns a structured [`TestReport`]. Explanation text is
//! rendered from the report at the presentation boundary, not stored.
//!
//! | Predictor | Target | Normal branch | Non-normal branch |
//! |-----------|--------|---------------|-------------------|
//! | categorical/binary | categorical/binary | chi-squared independence | (no normality check) |
//! | numerical | binary | Welch t | Mann-Whitney U |
//! | numerical | multi-categorical | one-way ANOVA | Kruskal-Wallis |
//! | numerical | numerical | Pearson | Spearman |

use crate::classify::{distinct_count, type_class, TypeClass};
use crate::dataframe::DataFrame;
use crate::error::ScreenError;
use crate::normality::is_normal;
use crate::testing;

/// The statistical test a selector chose for a column pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKind {
    /// Chi-squared test of independence over a contingency table.
    ChiSquared,
    /// Welch two-sample t-test (unequal variances).
    WelchT,
    /// Mann-Whitney U test.
    MannWhitney,
    /// One-way ANOVA.
    Anova,
    /// Kruskal-Wallis H test.
    KruskalWallis,
    /// Pearson correlation significance test.
    Pearson,
    /// Spearman rank correlation significance test.
    Spearman,
}

impl TestKind {
    /// Human-readable test name.
    pub fn name(self) -> &'static str {
        match self {
            Self::ChiSquared => "Chi-squared test",
            Self::WelchT => "T-test",
            Self::MannWhitney => "Mann-Whitney U test",
            Self::Anova => "ANOVA test",
            Self::KruskalWallis => "Kruskal-Wallis H test",
            Self::Pearson => "Pearson correlation",
            Self::Spearman => "Spearman correlation",
        }
    }

    /// Whether this is a correlation test (hypotheses speak of correlation
    /// rather than a relationship between groups).
    pub fn is_correlation(self) -> bool {
        matches!(self, Self::Pearson | Self::Spearman)
    }

    /// Null hypothesis wording.
    pub fn null_hypothesis(self) -> &'static str {
        if self.is_correlation() {
            "independence is true (no correlation between the two variables)"
        } else {
            "independence is true (no relationship)"
        }
    }

    /// Alternative hypothesis wording.
    pub fn alternative_hypothesis(self) -> &'static str {
        if self.is_correlation() {
            "independence is false (correlation between the two variables)"
        } else {
            "independence is false (relationship)"
        }
    }
}

impl std::fmt::Display for TestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Outcome of one predictor/target significance test.
///
/// Immutable once produced. Carries the structured facts; the templated
/// explanation text is rendered on demand by [`TestReport::explanation`].
#[derive(Debug, Clone, PartialEq)]
pub struct TestReport {
    /// Which test ran.
    pub test: TestKind,
    /// Predictor column name as passed to the selector.
    pub predictor: String,
    /// Target column name as passed to the selector.
    pub target: String,
    /// Two-tailed p-value in [0, 1].
    pub p_value: f64,
}

impl TestReport {
    /// Renders the templated explanation: test name, hypotheses, p-value.
    ///
    /// ```
    /// use sigscreen::select::{TestKind, TestReport};
    ///
    /// let report = TestReport {
    ///     test: TestKind::ChiSquared,
    ///     predictor: "city".into(),
    ///     target: "purchased".into(),
    ///     p_value: 0.03,
    /// };
    /// let text = report.explanation();
    /// assert!(text.contains("Chi-squared test"));
    /// assert!(text.contains("city"));
    /// assert!(text.contains("0.03"));
    /// ```
    pub fn explanation(&self) -> String {
        format!(
            "{} of independence of variables: predictor {} and target variable {}\n\
             Null hypothesis: {}\n\
             Alternative hypothesis: {}\n\
             the probability of observing a test statistic as extreme as the one computed, \
             assuming the null hypothesis of independence is true = {}",
            self.test.name(),
            self.predictor,
            self.target,
            self.test.null_hypothesis(),
            self.test.alternative_hypothesis(),
            self.p_value,
        )
    }
}

/// Maps an engine `None` (degenerate input) to a loud per-column error.
fn degenerate(column: &str, n: usize) -> ScreenError {
    ScreenError::DegenerateSample {
        column: column.to_string(),
        n,
    }
}

fn report(test: TestKind, predictor: &str, target: &str, p_value: f64) -> TestReport {
    TestReport {
        test,
        predictor: predictor.to_string(),
        target: target.to_string(),
        p_value,
    }
}

/// Chi-squared test of independence for a categorical or binary predictor
/// against a categorical or binary target.
///
/// No normality check applies to this pair; the test always runs on the
/// predictor × target contingency table.
pub fn categorical_test(
    df: &DataFrame,
    col: &str,
    target: &str,
) -> Result<TestReport, ScreenError> {
    let (table, n_rows, n_cols) = df.contingency_table(col, target)?;
    let stat = testing::chi_squared_independence(&table, n_rows, n_cols)
        .ok_or_else(|| degenerate(col, df.row_count()))?;
    Ok(report(TestKind::ChiSquared, col, target, stat.p_value))
}

/// Two-sample test for a numerical predictor against a binary target.
///
/// Welch t-test when the pair passes the normality gate, Mann-Whitney U
/// otherwise.
///
/// # Errors
///
/// [`ScreenError::PreconditionFailed`] if the target does not have exactly
/// two distinct values.
pub fn numeric_binary_test(
    df: &DataFrame,
    col: &str,
    target: &str,
) -> Result<TestReport, ScreenError> {
    let target_col = df.require_column(target)?;
    if distinct_count(target_col) != 2 {
        return Err(ScreenError::PreconditionFailed {
            column: target.to_string(),
            requirement: "a binary variable with two unique values".to_string(),
        });
    }

    let normal = is_normal(df, col, target)?;
    let groups = df.grouped_numeric(col, target)?;
    let (a, b) = (&groups[0].1, &groups[1].1);

    let (kind, stat) = if normal {
        (TestKind::WelchT, testing::welch_t_test(a, b))
    } else {
        (TestKind::MannWhitney, testing::mann_whitney_u_test(a, b))
    };
    let stat = stat.ok_or_else(|| degenerate(col, a.len().min(b.len())))?;

    Ok(report(kind, col, target, stat.p_value))
}

/// k-sample test for a numerical predictor against a multi-categorical
/// target.
///
/// One-way ANOVA when the pair passes the normality gate, Kruskal-Wallis
/// otherwise.
///
/// # Errors
///
/// [`ScreenError::PreconditionFailed`] if the target is not a
/// string-typed (categorical or text) column.
pub fn numeric_categorical_test(
    df: &DataFrame,
    col: &str,
    target: &str,
) -> Result<TestReport, ScreenError> {
    let target_col = df.require_column(target)?;
    if type_class(target_col) != TypeClass::Categorical {
        return Err(ScreenError::PreconditionFailed {
            column: target.to_string(),
            requirement: "a categorical variable (string or category)".to_string(),
        });
    }

    let normal = is_normal(df, col, target)?;
    let groups = df.grouped_numeric(col, target)?;
    let refs: Vec<&[f64]> = groups.iter().map(|(_, g)| g.as_slice()).collect();
    let min_group = refs.iter().map(|g| g.len()).min().unwrap_or(0);

    let (kind, stat) = if normal {
        (TestKind::Anova, testing::one_way_anova(&refs))
    } else {
        (TestKind::KruskalWallis, testing::kruskal_wallis_test(&refs))
    };
    let stat = stat.ok_or_else(|| degenerate(col, min_group))?;

    Ok(report(kind, col, target, stat.p_value))
}

/// Correlation significance test for two numerical columns.
///
/// Pearson when the pair passes the normality gate, Spearman otherwise.
/// Both tests are symmetric in predictor and target.
pub fn numeric_numeric_test(
    df: &DataFrame,
    col: &str,
    target: &str,
) -> Result<TestReport, ScreenError> {
    let normal = is_normal(df, col, target)?;
    let x = df.numeric_column(col)?;
    let y = df.numeric_column(target)?;

    let (kind, stat) = if normal {
        (TestKind::Pearson, testing::pearson_test(&x, &y))
    } else {
        (TestKind::Spearman, testing::spearman_test(&x, &y))
    };
    let stat = stat.ok_or_else(|| degenerate(col, x.len()))?;

    Ok(report(kind, col, target, stat.p_value))
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataframe::Column;
    use statrs::distribution::{ContinuousCDF, Normal};

    fn normal_like(n: usize, mean: f64, sd: f64) -> Vec<f64> {
        let dist = Normal::new(mean, sd).unwrap();
        (1..=n)
            .map(|i| dist.inverse_cdf(i as f64 / (n + 1) as f64))
            .collect()
    }

    fn skewed(n: usize) -> Vec<f64> {
        (1..=n).map(|i| (i as f64 / 2.0).exp()).collect()
    }

    fn labels(pattern: &[&str], n: usize) -> Vec<String> {
        (0..n).map(|i| pattern[i % pattern.len()].to_string()).collect()
    }

    // ── categorical_test ────────────────────────────────────────

    #[test]
    fn chi_squared_on_dependent_pair() {
        // Color tracks the outcome almost perfectly.
        let mut df = DataFrame::new();
        let color: Vec<String> = (0..40)
            .map(|i| if i < 20 { "red".into() } else { "blue".into() })
            .collect();
        let outcome: Vec<String> = (0..40)
            .map(|i| if i < 18 || i >= 38 { "yes".into() } else { "no".into() })
            .collect();
        df.add_column("color".into(), Column::text(color)).unwrap();
        df.add_column("outcome".into(), Column::text(outcome)).unwrap();

        let r = categorical_test(&df, "color", "outcome").unwrap();
        assert_eq!(r.test, TestKind::ChiSquared);
        assert!(r.p_value < 0.01, "p = {}", r.p_value);
    }

    #[test]
    fn chi_squared_single_category_degenerate() {
        let mut df = DataFrame::new();
        df.add_column("a".into(), Column::text(labels(&["only"], 10)))
            .unwrap();
        df.add_column("b".into(), Column::text(labels(&["x", "y"], 10)))
            .unwrap();
        assert!(matches!(
            categorical_test(&df, "a", "b"),
            Err(ScreenError::DegenerateSample { .. })
        ));
    }

    // ── numeric_binary_test ─────────────────────────────────────

    fn binary_target_df(values: Vec<f64>) -> DataFrame {
        let n = values.len();
        let mut df = DataFrame::new();
        df.add_column("x".into(), Column::numeric(values)).unwrap();
        df.add_column("grp".into(), Column::text(labels(&["a", "b"], n)))
            .unwrap();
        df
    }

    #[test]
    fn binary_target_normal_pair_takes_welch() {
        // Both groups drawn from normal populations: the gate must pass
        // and the parametric branch must run.
        let mut values = Vec::new();
        let a = normal_like(30, 10.0, 2.0);
        let b = normal_like(30, 12.0, 2.0);
        for i in 0..30 {
            values.push(a[i]);
            values.push(b[i]);
        }
        let df = binary_target_df(values);

        let r = numeric_binary_test(&df, "x", "grp").unwrap();
        assert_eq!(r.test, TestKind::WelchT);
        assert!(r.p_value < 0.05, "p = {}", r.p_value);
    }

    #[test]
    fn binary_target_skewed_pair_takes_mann_whitney() {
        let mut values = Vec::new();
        let a = skewed(30);
        let b: Vec<f64> = skewed(30).iter().map(|v| v * 3.0).collect();
        for i in 0..30 {
            values.push(a[i]);
            values.push(b[i]);
        }
        let df = binary_target_df(values);

        let r = numeric_binary_test(&df, "x", "grp").unwrap();
        assert_eq!(r.test, TestKind::MannWhitney);
    }

    #[test]
    fn non_binary_target_precondition() {
        let mut df = DataFrame::new();
        df.add_column("x".into(), Column::numeric(vec![1.0, 2.0, 3.0]))
            .unwrap();
        df.add_column("grp".into(), Column::text(labels(&["a", "b", "c"], 3)))
            .unwrap();
        assert!(matches!(
            numeric_binary_test(&df, "x", "grp"),
            Err(ScreenError::PreconditionFailed { ref column, .. }) if column == "grp"
        ));
    }

    // ── numeric_categorical_test ────────────────────────────────

    fn three_group_df(normal: bool) -> DataFrame {
        let (a, b, c) = if normal {
            (
                normal_like(20, 5.0, 1.0),
                normal_like(20, 8.0, 1.0),
                normal_like(20, 11.0, 1.0),
            )
        } else {
            (
                skewed(20),
                skewed(20).iter().map(|v| v * 2.0).collect(),
                skewed(20).iter().map(|v| v * 4.0).collect(),
            )
        };
        let mut values = Vec::new();
        for i in 0..20 {
            values.push(a[i]);
            values.push(b[i]);
            values.push(c[i]);
        }
        let mut df = DataFrame::new();
        df.add_column("x".into(), Column::numeric(values)).unwrap();
        df.add_column("grp".into(), Column::text(labels(&["p", "q", "r"], 60)))
            .unwrap();
        df
    }

    #[test]
    fn categorical_target_normal_groups_take_anova() {
        let df = three_group_df(true);
        let r = numeric_categorical_test(&df, "x", "grp").unwrap();
        assert_eq!(r.test, TestKind::Anova);
        assert!(r.p_value < 0.01, "p = {}", r.p_value);
    }

    #[test]
    fn categorical_target_skewed_groups_take_kruskal() {
        let df = three_group_df(false);
        let r = numeric_categorical_test(&df, "x", "grp").unwrap();
        assert_eq!(r.test, TestKind::KruskalWallis);
    }

    #[test]
    fn numeric_target_fails_categorical_precondition() {
        let mut df = DataFrame::new();
        df.add_column("x".into(), Column::numeric(vec![1.0, 2.0, 3.0]))
            .unwrap();
        df.add_column("t".into(), Column::numeric(vec![4.0, 5.0, 6.0]))
            .unwrap();
        assert!(matches!(
            numeric_categorical_test(&df, "x", "t"),
            Err(ScreenError::PreconditionFailed { ref column, .. }) if column == "t"
        ));
    }

    // ── numeric_numeric_test ────────────────────────────────────

    #[test]
    fn numeric_pair_normal_takes_pearson() {
        let x = normal_like(40, 0.0, 1.0);
        let y: Vec<f64> = x.iter().map(|&v| 1.5 * v + 0.3).collect();
        let mut df = DataFrame::new();
        df.add_column("x".into(), Column::numeric(x)).unwrap();
        df.add_column("y".into(), Column::numeric(y)).unwrap();

        let r = numeric_numeric_test(&df, "x", "y").unwrap();
        assert_eq!(r.test, TestKind::Pearson);
        assert!(r.p_value < 0.01);
    }

    #[test]
    fn numeric_pair_skewed_takes_spearman() {
        let x = skewed(40);
        let y: Vec<f64> = skewed(40).iter().map(|v| v * 2.0).collect();
        let mut df = DataFrame::new();
        df.add_column("x".into(), Column::numeric(x)).unwrap();
        df.add_column("y".into(), Column::numeric(y)).unwrap();

        let r = numeric_numeric_test(&df, "x", "y").unwrap();
        assert_eq!(r.test, TestKind::Spearman);
    }

    #[test]
    fn numeric_pair_is_symmetric() {
        let x = normal_like(30, 0.0, 1.0);
        let y: Vec<f64> = x.iter().enumerate().map(|(i, &v)| v + (i % 3) as f64).collect();
        let mut df = DataFrame::new();
        df.add_column("x".into(), Column::numeric(x)).unwrap();
        df.add_column("y".into(), Column::numeric(y)).unwrap();

        let xy = numeric_numeric_test(&df, "x", "y").unwrap();
        let yx = numeric_numeric_test(&df, "y", "x").unwrap();
        assert!((xy.p_value - yx.p_value).abs() < 1e-12);
    }

    // ── explanation rendering ───────────────────────────────────

    #[test]
    fn explanation_names_test_and_hypotheses() {
        let r = TestReport {
            test: TestKind::MannWhitney,
            predictor: "age".into(),
            target: "purchased".into(),
            p_value: 0.2,
        };
        let text = r.explanation();
        assert!(text.contains("Mann-Whitney U test"));
        assert!(text.contains("predictor age"));
        assert!(text.contains("target variable purchased"));
        assert!(text.contains("independence is true (no relationship)"));
        assert!(text.contains("0.2"));
    }

    #[test]
    fn correlation_explanation_speaks_of_correlation() {
        let r = TestReport {
            test: TestKind::Spearman,
            predictor: "sqft".into(),
            target: "price".into(),
            p_value: 0.7,
        };
        let text = r.explanation();
        assert!(text.contains("no correlation between the two variables"));
    }
}
