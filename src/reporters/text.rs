//! Text (terminal) reporter with colors and formatting

use crate::models::{AnalysisReport, ComplexityRating, DifficultyRating};
use anyhow::Result;

/// Reset ANSI color
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

/// Translations shown before collapsing the rest
const MAX_TRANSLATIONS_SHOWN: usize = 5;

fn complexity_color(rating: ComplexityRating) -> &'static str {
    match rating {
        ComplexityRating::Simple => "\x1b[32m",      // Green
        ComplexityRating::Basic => "\x1b[92m",       // Light green
        ComplexityRating::Moderate => "\x1b[33m",    // Yellow
        ComplexityRating::Complex => "\x1b[91m",     // Light red
        ComplexityRating::VeryComplex => "\x1b[31m", // Red
    }
}

fn difficulty_color(rating: DifficultyRating) -> &'static str {
    match rating {
        DifficultyRating::Easy => "\x1b[32m",
        DifficultyRating::Moderate => "\x1b[33m",
        DifficultyRating::Difficult => "\x1b[91m",
        DifficultyRating::VeryDifficult => "\x1b[31m",
    }
}

/// Render report as formatted terminal output
pub fn render(report: &AnalysisReport) -> Result<String> {
    let mut out = String::new();
    let snap = &report.snapshot;

    // Header
    out.push_str(&format!("\n{BOLD}EUDA Analysis: {}{RESET}\n", report.file_name()));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Sheets: {}  Formulas: {}  VBA modules: {}  Connections: {}\n\n",
        snap.sheet_count(),
        snap.formula_count(),
        snap.vba_module_count(),
        snap.connection_count()
    ));

    // Scores
    let cc = complexity_color(report.complexity.rating);
    let dc = difficulty_color(report.difficulty.rating);
    out.push_str(&format!("{BOLD}SCORES{RESET}\n"));
    out.push_str(&format!(
        "  Complexity: {BOLD}{:.1}/100{RESET} {cc}{}{RESET}\n",
        report.complexity.score, report.complexity.rating
    ));
    out.push_str(&format!(
        "  Remediation difficulty: {BOLD}{:.1}/100{RESET} {dc}{}{RESET}\n",
        report.difficulty.score, report.difficulty.rating
    ));

    let contributing: Vec<String> = report
        .complexity
        .factors
        .iter()
        .filter(|f| f.points > 0.0)
        .map(|f| format!("{} {:.1}/{:.0}", f.name, f.points, f.cap))
        .collect();
    if !contributing.is_empty() {
        out.push_str(&format!("  {DIM}{}{RESET}\n", contributing.join("  ")));
    }
    for reason in &report.difficulty.reasons {
        out.push_str(&format!("  - {}\n", reason));
    }
    out.push('\n');

    // Data sources
    out.push_str(&format!(
        "{BOLD}DATA SOURCES{RESET} ({})\n",
        report.data_sources.len()
    ));
    for source in &report.data_sources {
        out.push_str(&format!("  {}\n", source));
    }
    out.push('\n');

    // Data model
    let model = &report.data_model;
    if !model.entities.is_empty() {
        out.push_str(&format!("{BOLD}DATA MODEL{RESET}\n"));
        for entity in &model.entities {
            out.push_str(&format!("  {:<24} {DIM}{}{RESET}\n", entity.name, entity.source));
        }
        for rel in &model.relationships {
            out.push_str(&format!("  {} -> {} ({})\n", rel.from, rel.to, rel.kind));
        }
        out.push_str(&format!("  {DIM}{}{RESET}\n\n", model.recommendation));
    }

    // Formula translations
    if !report.translations.is_empty() {
        out.push_str(&format!("{BOLD}FORMULA TRANSLATIONS{RESET}\n"));
        for t in report.translations.iter().take(MAX_TRANSLATIONS_SHOWN) {
            out.push_str(&format!("  {DIM}{}!{} [{}]{RESET}\n", t.sheet, t.address, t.pattern));
            for line in t.code.lines() {
                out.push_str(&format!("    {}\n", line));
            }
        }
        let remaining = report
            .translations
            .len()
            .saturating_sub(MAX_TRANSLATIONS_SHOWN);
        if remaining > 0 {
            out.push_str(&format!(
                "\n  {DIM}...and {} more (use --format json){RESET}\n",
                remaining
            ));
        }
        out.push('\n');
    }

    // Summary
    if let Some(summary) = &report.summary {
        out.push_str(&format!("{BOLD}SUMMARY{RESET}\n"));
        out.push_str(summary.trim());
        out.push_str("\n\n");
    }

    Ok(out)
}
