//! Analysis pipeline
//!
//! Runs the heuristic core over a snapshot:
//! 1. Score complexity
//! 2. Estimate remediation difficulty
//! 3. Extract data sources from macros and connection strings
//! 4. Recommend a data model
//! 5. Annotate the leading formulas with pandas equivalents
//!
//! The LLM summary is not part of the pipeline; callers attach it afterwards.

use tracing::{debug, info};

use crate::datamodel::recommend_data_model;
use crate::formulas::translate_cells;
use crate::models::{AnalysisReport, WorkbookSnapshot};
use crate::scoring::{estimate_difficulty, score_complexity};
use crate::vba::extract_from_all;

/// Formulas annotated per report
pub const TRANSLATION_LIMIT: usize = 20;

/// Build a full report from a snapshot
pub fn analyze_snapshot(snapshot: WorkbookSnapshot) -> AnalysisReport {
    let complexity = score_complexity(&snapshot);
    let difficulty = estimate_difficulty(&snapshot, &complexity);

    let macro_texts = snapshot.macro_modules.iter().map(|m| m.code.as_str());
    let connection_texts = snapshot
        .connections
        .iter()
        .map(|c| c.connection_string.as_str());
    let data_sources: Vec<String> = extract_from_all(macro_texts.chain(connection_texts))
        .into_iter()
        .collect();
    debug!("Found {} data sources", data_sources.len());

    let data_model = recommend_data_model(&snapshot);
    let translations = translate_cells(&snapshot.formulas, TRANSLATION_LIMIT);

    info!(
        "Analyzed {}: complexity {:.1} ({}), difficulty {:.1} ({})",
        snapshot.file_name(),
        complexity.score,
        complexity.rating,
        difficulty.score,
        difficulty.rating
    );

    AnalysisReport {
        snapshot,
        complexity,
        difficulty,
        data_sources,
        data_model,
        translations,
        summary: None,
    }
}
