//! Formula classifier
//!
//! Annotates a spreadsheet formula with a rough pandas equivalent. This is a
//! heuristic annotator, not a transpiler: arguments are lifted out of the
//! formula text by positional regexes and pasted into templates verbatim, so
//! nested calls or quoted commas produce output that needs hand editing.
//!
//! Recognition is first-match-wins over [`FormulaPattern::RECOGNITION_ORDER`].

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::models::{FormulaCell, FormulaTranslation};

static LOOKUP_PATTERN: OnceLock<Regex> = OnceLock::new();
static SUM_PATTERN: OnceLock<Regex> = OnceLock::new();
static CONDITIONAL_SUM_PATTERN: OnceLock<Regex> = OnceLock::new();
static BRANCH_PATTERN: OnceLock<Regex> = OnceLock::new();

fn lookup_pattern() -> &'static Regex {
    LOOKUP_PATTERN.get_or_init(|| Regex::new(r"(?i)VLOOKUP\((.*?),(.*?),(.*?),.*?\)").unwrap())
}

fn sum_pattern() -> &'static Regex {
    SUM_PATTERN.get_or_init(|| Regex::new(r"(?i)SUM\((.*?)\)").unwrap())
}

fn conditional_sum_pattern() -> &'static Regex {
    CONDITIONAL_SUM_PATTERN.get_or_init(|| Regex::new(r"(?i)SUMIFS\((.*?),(.*?)\)").unwrap())
}

fn branch_pattern() -> &'static Regex {
    BRANCH_PATTERN.get_or_init(|| Regex::new(r"(?i)IF\((.*?),(.*?),(.*?)\)").unwrap())
}

/// Which template produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaPattern {
    /// `VLOOKUP(value, table, column, ...)`
    Lookup,
    /// `SUM(range)`
    Sum,
    /// `SUMIFS(sum_range, criteria...)`
    ConditionalSum,
    /// `IF(condition, then, else)`
    Branch,
    Unrecognized,
}

impl FormulaPattern {
    /// Evaluation order of the recognizers. `Unrecognized` is the fallback.
    pub const RECOGNITION_ORDER: [FormulaPattern; 4] = [
        FormulaPattern::Lookup,
        FormulaPattern::Sum,
        FormulaPattern::ConditionalSum,
        FormulaPattern::Branch,
    ];

    fn regex(self) -> Option<&'static Regex> {
        match self {
            FormulaPattern::Lookup => Some(lookup_pattern()),
            FormulaPattern::Sum => Some(sum_pattern()),
            FormulaPattern::ConditionalSum => Some(conditional_sum_pattern()),
            FormulaPattern::Branch => Some(branch_pattern()),
            FormulaPattern::Unrecognized => None,
        }
    }

    fn render(self, formula: &str, caps: Option<&Captures<'_>>) -> String {
        let arg = |i: usize| capture(caps, i);
        match self {
            FormulaPattern::Lookup => format!(
                "# Equivalent to: {formula}\n\
                 df.loc[df['key_column'] == {}, df.columns[{}-1]].values[0]",
                arg(1),
                arg(3)
            ),
            FormulaPattern::Sum => format!(
                "# Equivalent to: {formula}\n\
                 df[relevant_columns].sum()  # range: {}",
                arg(1)
            ),
            FormulaPattern::ConditionalSum => format!(
                "# Equivalent to: {formula}\n\
                 df[df['condition_column'] == condition_value]['sum_column'].sum()  # sum range: {}",
                arg(1)
            ),
            FormulaPattern::Branch => format!(
                "# Equivalent to: {formula}\n\
                 np.where({}, {}, {})",
                arg(1),
                arg(2),
                arg(3)
            ),
            FormulaPattern::Unrecognized => format!(
                "# No direct pandas equivalent found for: {formula}\n\
                 # Will need custom implementation"
            ),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FormulaPattern::Lookup => "lookup",
            FormulaPattern::Sum => "sum",
            FormulaPattern::ConditionalSum => "conditional_sum",
            FormulaPattern::Branch => "branch",
            FormulaPattern::Unrecognized => "unrecognized",
        }
    }
}

impl std::fmt::Display for FormulaPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn capture<'h>(caps: Option<&Captures<'h>>, i: usize) -> &'h str {
    caps.and_then(|c| c.get(i))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

/// Result of classifying one formula
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub pattern: FormulaPattern,
    /// Annotated pandas snippet; first line always echoes the formula
    pub code: String,
}

/// Classify a formula and render its pandas annotation.
///
/// Never fails: anything no recognizer accepts gets the fallback text.
pub fn classify_formula(formula: &str) -> Classification {
    let formula = formula.trim();

    for pattern in FormulaPattern::RECOGNITION_ORDER {
        let Some(regex) = pattern.regex() else {
            continue;
        };
        if let Some(caps) = regex.captures(formula) {
            return Classification {
                pattern,
                code: pattern.render(formula, Some(&caps)),
            };
        }
    }

    Classification {
        pattern: FormulaPattern::Unrecognized,
        code: FormulaPattern::Unrecognized.render(formula, None),
    }
}

/// Classify the first `limit` formula cells
pub fn translate_cells(cells: &[FormulaCell], limit: usize) -> Vec<FormulaTranslation> {
    cells
        .iter()
        .take(limit)
        .map(|cell| {
            let classification = classify_formula(&cell.formula);
            FormulaTranslation {
                sheet: cell.sheet.clone(),
                address: cell.address.clone(),
                pattern: classification.pattern.to_string(),
                code: classification.code,
            }
        })
        .collect()
}
