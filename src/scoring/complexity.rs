//! Complexity scorer
//!
//! Sums independently capped contributions from the snapshot's structure,
//! then caps the total.

use super::{count_formulas_using, ADVANCED_FUNCTIONS};
use crate::models::{ComplexityAssessment, ComplexityRating, ScoreFactor, WorkbookSnapshot};
use tracing::debug;

const MAX_TOTAL: f64 = 100.0;

const SHEET_WEIGHT: f64 = 5.0;
const SHEET_CAP: f64 = 30.0;
const FORMULA_WEIGHT: f64 = 0.5;
const FORMULA_CAP: f64 = 30.0;
const MODULE_WEIGHT: f64 = 10.0;
const MODULE_CAP: f64 = 40.0;
const ADVANCED_WEIGHT: f64 = 2.0;
const ADVANCED_CAP: f64 = 20.0;
const CONNECTION_WEIGHT: f64 = 15.0;
const CONNECTION_CAP: f64 = 30.0;
const CODE_LENGTH_DIVISOR: f64 = 100.0;
const CODE_LENGTH_CAP: f64 = 20.0;
const RISK_CAP: f64 = 30.0;

/// Points added per module for late-bound object creation
const LATE_BINDING_POINTS: f64 = 5.0;
/// Points added per module referencing ADO
const ADODB_POINTS: f64 = 10.0;
/// Points added per module mentioning SQL
const SQL_POINTS: f64 = 10.0;

/// Scores a single snapshot
pub struct ComplexityScorer<'a> {
    snapshot: &'a WorkbookSnapshot,
}

impl<'a> ComplexityScorer<'a> {
    pub fn new(snapshot: &'a WorkbookSnapshot) -> Self {
        Self { snapshot }
    }

    /// Calculate the score, rating and per-factor breakdown
    pub fn calculate(&self) -> ComplexityAssessment {
        let snap = self.snapshot;
        let advanced = count_formulas_using(&snap.formulas, ADVANCED_FUNCTIONS);

        let factors = vec![
            factor("sheets", snap.sheet_count() as f64 * SHEET_WEIGHT, SHEET_CAP),
            factor("formulas", snap.formula_count() as f64 * FORMULA_WEIGHT, FORMULA_CAP),
            factor("vba_modules", snap.vba_module_count() as f64 * MODULE_WEIGHT, MODULE_CAP),
            factor("advanced_formulas", advanced as f64 * ADVANCED_WEIGHT, ADVANCED_CAP),
            factor(
                "connections",
                snap.connection_count() as f64 * CONNECTION_WEIGHT,
                CONNECTION_CAP,
            ),
            factor(
                "vba_code_length",
                snap.macro_source_len() as f64 / CODE_LENGTH_DIVISOR,
                CODE_LENGTH_CAP,
            ),
            factor("vba_risk_keywords", self.macro_risk_points(), RISK_CAP),
        ];

        let total: f64 = factors.iter().map(|f| f.points).sum();
        let score = total.min(MAX_TOTAL);

        debug!(
            "Complexity factors: {}",
            factors
                .iter()
                .map(|f| format!("{}={:.1}", f.name, f.points))
                .collect::<Vec<_>>()
                .join(", ")
        );

        ComplexityAssessment {
            score,
            rating: ComplexityRating::from_score(score),
            factors,
        }
    }

    /// Uncapped risk points from late binding, ADO and SQL usage
    fn macro_risk_points(&self) -> f64 {
        self.snapshot
            .macro_modules
            .iter()
            .map(|module| {
                let code = module.code.to_lowercase();
                let mut points = 0.0;
                if code.contains("createobject") || code.contains("getobject") {
                    points += LATE_BINDING_POINTS;
                }
                if code.contains("adodb") {
                    points += ADODB_POINTS;
                }
                if code.contains("sql") {
                    points += SQL_POINTS;
                }
                points
            })
            .sum()
    }
}

fn factor(name: &str, raw: f64, cap: f64) -> ScoreFactor {
    ScoreFactor {
        name: name.to_string(),
        raw,
        points: raw.min(cap),
        cap,
    }
}

/// Score a snapshot's structural complexity
pub fn score_complexity(snapshot: &WorkbookSnapshot) -> ComplexityAssessment {
    ComplexityScorer::new(snapshot).calculate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DataConnection, FormulaCell, MacroModule};

    fn snapshot_with_sheets(n: usize) -> WorkbookSnapshot {
        WorkbookSnapshot {
            sheet_names: (0..n).map(|i| format!("Sheet{}", i + 1)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_snapshot_scores_zero() {
        let result = score_complexity(&WorkbookSnapshot::default());
        assert_eq!(result.score, 0.0);
        assert_eq!(result.rating, ComplexityRating::Simple);
        assert!(result.factors.iter().all(|f| f.points == 0.0));
    }

    #[test]
    fn test_sheet_factor_is_capped() {
        assert_eq!(score_complexity(&snapshot_with_sheets(3)).score, 15.0);
        assert_eq!(score_complexity(&snapshot_with_sheets(6)).score, 30.0);
        assert_eq!(score_complexity(&snapshot_with_sheets(50)).score, 30.0);
    }

    #[test]
    fn test_four_sheets_rate_basic_at_boundary() {
        let result = score_complexity(&snapshot_with_sheets(4));
        assert_eq!(result.score, 20.0);
        assert_eq!(result.rating, ComplexityRating::Basic);
    }

    #[test]
    fn test_advanced_formulas_counted_once_per_formula() {
        let mut snap = WorkbookSnapshot::default();
        // Matches vlookup, match and if, but counts as one advanced formula
        snap.formulas.push(FormulaCell::new(
            "S",
            "$A$1",
            "=IF(ISNA(MATCH(A1,B:B,0)),0,VLOOKUP(A1,B:C,2,FALSE))",
        ));
        snap.formulas.push(FormulaCell::new("S", "$A$2", "=A1+1"));
        let result = score_complexity(&snap);
        let advanced = result
            .factors
            .iter()
            .find(|f| f.name == "advanced_formulas")
            .unwrap();
        assert_eq!(advanced.points, 2.0);
        // 2 formulas × 0.5 + 1 advanced × 2
        assert_eq!(result.score, 3.0);
    }

    #[test]
    fn test_macro_risk_keywords() {
        let mut snap = WorkbookSnapshot::default();
        snap.macro_modules.push(MacroModule::new(
            "Module1",
            "Set cn = CreateObject(\"ADODB.Connection\")\ncn.Execute \"DELETE FROM t\" ' SQL",
        ));
        let result = score_complexity(&snap);
        let risk = result
            .factors
            .iter()
            .find(|f| f.name == "vba_risk_keywords")
            .unwrap();
        assert_eq!(risk.raw, 25.0);
        assert_eq!(risk.points, 25.0);
    }

    #[test]
    fn test_macro_risk_cap() {
        let mut snap = WorkbookSnapshot::default();
        for i in 0..3 {
            snap.macro_modules.push(MacroModule::new(
                format!("Module{i}"),
                "GetObject ADODB sql",
            ));
        }
        let result = score_complexity(&snap);
        let risk = result
            .factors
            .iter()
            .find(|f| f.name == "vba_risk_keywords")
            .unwrap();
        assert_eq!(risk.raw, 75.0);
        assert_eq!(risk.points, 30.0);
    }

    #[test]
    fn test_code_length_factor() {
        let mut snap = WorkbookSnapshot::default();
        snap.macro_modules.push(MacroModule::new("Module1", "x".repeat(550)));
        let result = score_complexity(&snap);
        // 10 for the module + 5.5 for length
        assert_eq!(result.score, 15.5);
    }

    #[test]
    fn test_total_capped_at_100() {
        let mut snap = snapshot_with_sheets(10);
        for i in 0..100 {
            snap.formulas
                .push(FormulaCell::new("Sheet1", format!("$A${i}"), "=VLOOKUP(A1,B:C,2,0)"));
        }
        for i in 0..5 {
            snap.macro_modules.push(MacroModule::new(
                format!("Module{i}"),
                "CreateObject(\"ADODB.Recordset\") SQL".repeat(100),
            ));
        }
        for i in 0..3 {
            snap.connections.push(DataConnection {
                name: format!("conn{i}"),
                ..Default::default()
            });
        }
        let result = score_complexity(&snap);
        let uncapped: f64 = result.factors.iter().map(|f| f.points).sum();
        assert_eq!(uncapped, 200.0);
        assert_eq!(result.score, 100.0);
        assert_eq!(result.rating, ComplexityRating::VeryComplex);
    }
}
