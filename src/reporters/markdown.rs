//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Generates reports suitable for:
//! - Migration tickets
//! - Team wikis

use crate::models::AnalysisReport;
use anyhow::Result;
use chrono::Local;

/// Render report as GitHub-flavored Markdown
pub fn render(report: &AnalysisReport) -> Result<String> {
    let mut md = String::new();

    md.push_str(&render_header(report));
    md.push('\n');

    md.push_str(&render_overview(report));
    md.push('\n');

    md.push_str(&render_scores(report));
    md.push('\n');

    md.push_str(&render_data_sources(report));
    md.push('\n');

    md.push_str(&render_data_model(report));
    md.push('\n');

    md.push_str(&render_translations(report));

    if let Some(summary) = &report.summary {
        md.push_str("\n## Assessment\n\n");
        md.push_str(summary.trim());
        md.push('\n');
    }

    md.push_str(&render_footer());

    Ok(md)
}

fn render_header(report: &AnalysisReport) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

    format!(
        r#"# EUDA Analysis: {}

**Complexity: {} ({:.1}/100)** | **Remediation: {} ({:.1}/100)**

Generated: {}
"#,
        report.file_name(),
        report.complexity.rating,
        report.complexity.score,
        report.difficulty.rating,
        report.difficulty.score,
        timestamp
    )
}

fn render_overview(report: &AnalysisReport) -> String {
    let snap = &report.snapshot;
    format!(
        r#"## Overview

| Metric | Value |
|--------|-------|
| **Sheets** | {} |
| **Formulas** | {} |
| **VBA Modules** | {} |
| **Data Connections** | {} |
"#,
        snap.sheet_count(),
        snap.formula_count(),
        snap.vba_module_count(),
        snap.connection_count()
    )
}

fn render_scores(report: &AnalysisReport) -> String {
    let mut md = String::from(
        "## Complexity Factors\n\n| Factor | Points | Cap |\n|--------|--------|-----|\n",
    );
    for f in &report.complexity.factors {
        md.push_str(&format!("| {} | {:.1} | {:.0} |\n", f.name, f.points, f.cap));
    }

    if !report.difficulty.reasons.is_empty() {
        md.push_str("\n### Remediation Drivers\n\n");
        for reason in &report.difficulty.reasons {
            md.push_str(&format!("- {}\n", reason));
        }
    }
    md
}

fn render_data_sources(report: &AnalysisReport) -> String {
    let mut md = String::from("## Data Sources\n\n");
    if report.data_sources.is_empty() {
        md.push_str("_No data sources found in macros or connections._\n");
    } else {
        for source in &report.data_sources {
            md.push_str(&format!("- `{}`\n", escape_backticks(source)));
        }
    }
    md
}

fn render_data_model(report: &AnalysisReport) -> String {
    let model = &report.data_model;
    let mut md = String::from("## Proposed Data Model\n\n");

    if model.entities.is_empty() {
        md.push_str("_No entity sheets recognized._\n");
    } else {
        md.push_str("| Entity | Source |\n|--------|--------|\n");
        for e in &model.entities {
            md.push_str(&format!("| {} | {} |\n", e.name, e.source));
        }
    }

    if !model.relationships.is_empty() {
        md.push_str("\n| From | To | Type |\n|------|----|------|\n");
        for r in &model.relationships {
            md.push_str(&format!("| {} | {} | {} |\n", r.from, r.to, r.kind));
        }
    }

    md.push_str(&format!("\n> {}\n", model.recommendation));
    md
}

fn render_translations(report: &AnalysisReport) -> String {
    if report.translations.is_empty() {
        return String::new();
    }
    let mut md = String::from("## Formula Translations\n");
    for t in &report.translations {
        md.push_str(&format!(
            "\n**{}!{}** ({})\n\n```python\n{}\n```\n",
            t.sheet, t.address, t.pattern, t.code
        ));
    }
    md
}

fn render_footer() -> String {
    "\n---\n\n*Generated by eudalens. Translations are heuristic annotations and need review.*\n"
        .to_string()
}

fn escape_backticks(s: &str) -> String {
    s.replace('`', "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::test_report;

    #[test]
    fn test_markdown_render() {
        let md = render(&test_report()).unwrap();
        assert!(md.starts_with("# EUDA Analysis: Commission Calc.xlsm"));
        assert!(md.contains("| **VBA Modules** | 1 |"));
        assert!(md.contains("| RepData | RateTable | lookup |"));
        assert!(md.contains("```python\n# Equivalent to: =VLOOKUP"));
        assert!(md.contains("## Assessment"));
    }

    #[test]
    fn test_markdown_empty_sections() {
        let mut report = test_report();
        report.data_sources.clear();
        report.data_model.entities.clear();
        report.data_model.relationships.clear();
        let md = render(&report).unwrap();
        assert!(md.contains("_No data sources found"));
        assert!(md.contains("_No entity sheets recognized._"));
    }
}
