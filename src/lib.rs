//! # sigscreen
//!
//! Automated bivariate significance screening for tabular data.
//!
//! sigscreen answers one question per column: is this predictor
//! statistically related to the target? It classifies each column pair,
//! checks normality where it matters, runs the appropriate hypothesis
//! test, and reports p-values with plain-language explanations plus the
//! list of columns that failed to show any relationship.
//!
//! ## Modules
//!
//! - [`dataframe`] — Column-major tabular data model (DataFrame, Column, DataType)
//! - [`csv_parser`] — CSV parsing with automatic type inference
//! - [`classify`] — Column type classes and binary detection for test dispatch
//! - [`testing`] — Hypothesis test engines (chi-squared, Welch t, Mann-Whitney U, ANOVA, Kruskal-Wallis, Pearson, Spearman, Shapiro-Wilk)
//! - [`normality`] — Shapiro-Wilk normality gate for parametric test selection
//! - [`select`] — Per-pair test selection and structured reports
//! - [`screen`] — Dataset-level screening against one target column
//! - [`error`] — Error types
//!
//! ## Quick Start
//!
//! ```
//! use sigscreen::csv_parser::CsvParser;
//! use sigscreen::screen;
//!
//! let csv = "\
//! region,age,purchased
//! north,23,yes
//! south,47,no
//! north,25,yes
//! south,52,no
//! north,28,yes
//! south,44,no
//! north,31,yes
//! south,49,no
//! north,27,yes
//! south,55,no
//! north,34,yes
//! south,41,no
//! ";
//! let df = CsvParser::new().parse_str(csv).unwrap();
//! let result = screen::fit(&df, "purchased").unwrap();
//!
//! // One report per predictor, categorical columns first.
//! assert_eq!(result.len(), 2);
//! assert_eq!(result.entries[0].column, "region");
//! assert_eq!(result.entries[1].column, "age");
//!
//! for (column, p) in result.p_values() {
//!     assert!((0.0..=1.0).contains(&p), "{column}: {p}");
//! }
//! // Columns with p > 0.05 show no detectable relationship.
//! let _unrelated = result.independent_columns();
//! ```

pub mod classify;
pub mod csv_parser;
pub mod dataframe;
pub mod error;
pub mod normality;
pub mod screen;
pub mod select;
pub mod testing;
