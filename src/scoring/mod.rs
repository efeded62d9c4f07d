//! Heuristic EUDA scoring
//!
//! Two bounded scores are derived from a workbook snapshot. Neither is a
//! formal metric; they are weighted sums of individually capped factors.
//!
//! # Complexity
//!
//! ```text
//! Complexity = min(100, Σ min(factor × weight, cap))
//!
//!   sheets        × 5    cap 30
//!   formulas      × 0.5  cap 30
//!   vba modules   × 10   cap 40
//!   advanced fx   × 2    cap 20
//!   connections   × 15   cap 30
//!   code length   ÷ 100  cap 20
//!   risky APIs    5/10/10 per module, cap 30
//! ```
//!
//! Rating bands: Simple < 20 ≤ Basic < 40 ≤ Moderate < 60 ≤ Complex < 80 ≤ Very Complex
//!
//! # Remediation difficulty
//!
//! ```text
//! Difficulty = complexity × 0.5
//!            + min(vba modules × 5, 20)
//!            + min(connections × 5, 15)
//!            + min(lookup formulas, 15)
//! ```
//!
//! Rating bands: Easy < 30 ≤ Moderate < 60 ≤ Difficult < 80 ≤ Very Difficult

mod complexity;
mod difficulty;

pub use complexity::{score_complexity, ComplexityScorer};
pub use difficulty::estimate_difficulty;

/// Functions that mark a formula as "advanced" for complexity scoring
pub const ADVANCED_FUNCTIONS: &[&str] = &[
    "vlookup",
    "hlookup",
    "index",
    "match",
    "indirect",
    "offset",
    "sumifs",
    "countifs",
    "averageifs",
    "if",
];

/// Lookup-family functions counted by the difficulty estimator
pub const LOOKUP_FUNCTIONS: &[&str] = &["vlookup", "index", "match", "indirect", "offset"];

/// Count formulas whose lowercase text contains any of `functions`
pub fn count_formulas_using(
    formulas: &[crate::models::FormulaCell],
    functions: &[&str],
) -> usize {
    formulas
        .iter()
        .filter(|f| {
            let text = f.formula.to_lowercase();
            functions.iter().any(|func| text.contains(func))
        })
        .count()
}
