//! Remediation difficulty estimator

use super::{count_formulas_using, LOOKUP_FUNCTIONS};
use crate::models::{
    ComplexityAssessment, DifficultyAssessment, DifficultyRating, WorkbookSnapshot,
};

const COMPLEXITY_WEIGHT: f64 = 0.5;
const MODULE_WEIGHT: f64 = 5.0;
const MODULE_CAP: f64 = 20.0;
const CONNECTION_WEIGHT: f64 = 5.0;
const CONNECTION_CAP: f64 = 15.0;
const LOOKUP_CAP: f64 = 15.0;

/// Estimate how hard the workbook will be to migrate.
///
/// Reasons are appended in a fixed order (macros, connections, lookup
/// formulas), one for each contributor that added points.
pub fn estimate_difficulty(
    snapshot: &WorkbookSnapshot,
    complexity: &ComplexityAssessment,
) -> DifficultyAssessment {
    let mut score = complexity.score * COMPLEXITY_WEIGHT;
    let mut reasons = Vec::new();

    let modules = snapshot.vba_module_count();
    if modules > 0 {
        score += (modules as f64 * MODULE_WEIGHT).min(MODULE_CAP);
        reasons.push(format!("Contains {} VBA modules", modules));
    }

    let connections = snapshot.connection_count();
    if connections > 0 {
        score += (connections as f64 * CONNECTION_WEIGHT).min(CONNECTION_CAP);
        reasons.push(format!("Has {} external data connections", connections));
    }

    let lookups = count_formulas_using(&snapshot.formulas, LOOKUP_FUNCTIONS);
    if lookups > 0 {
        score += (lookups as f64).min(LOOKUP_CAP);
        reasons.push(format!("Uses {} advanced Excel functions", lookups));
    }

    DifficultyAssessment {
        score,
        rating: DifficultyRating::from_score(score),
        reasons,
    }
}
