//! Output reporters for eudalens analysis results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON
//! - `markdown` - GitHub-flavored Markdown for migration tickets and wikis

mod json;
mod markdown;
mod text;

use crate::models::AnalysisReport;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Render an analysis report in the specified format
pub fn report(report: &AnalysisReport, format: &str) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(report, fmt)
}

/// Render an analysis report using an OutputFormat enum
pub fn report_with_format(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(report),
        OutputFormat::Json => json::render(report),
        OutputFormat::Markdown => markdown::render(report),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{DataConnection, FormulaCell, MacroModule, WorkbookSnapshot};
    use crate::pipeline::analyze_snapshot;

    /// Create a representative AnalysisReport for testing
    pub(crate) fn test_report() -> AnalysisReport {
        let mut snap = WorkbookSnapshot::new("/finance/Commission Calc.xlsm");
        snap.sheet_names = vec!["RepData".into(), "RateTable".into(), "Summary".into()];
        snap.formulas.push(FormulaCell::new(
            "RepData",
            "$D$2",
            "=VLOOKUP(C2,RateTable!A:B,2,FALSE)",
        ));
        snap.formulas
            .push(FormulaCell::new("Summary", "$B$1", "=SUM(RepData!E:E)"));
        snap.macro_modules.push(MacroModule::new(
            "Module1",
            "Set cn = CreateObject(\"ADODB.Connection\")\ncn.Open \"Provider=SQLOLEDB;Data Source=hr-sql;\"",
        ));
        snap.connections.push(DataConnection {
            name: "HR".into(),
            description: "Headcount feed".into(),
            connection_string: "DSN=HR;".into(),
        });
        let mut report = analyze_snapshot(snap);
        report.summary = Some("Calculates sales commissions from HR data.".into());
        report
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(
            OutputFormat::from_str("md").unwrap(),
            OutputFormat::Markdown
        );
        assert!(OutputFormat::from_str("sarif").is_err());
    }

    #[test]
    fn test_report_dispatch() {
        let r = test_report();
        for format in ["text", "json", "markdown"] {
            let out = report(&r, format).unwrap();
            assert!(out.contains("Commission Calc.xlsm"), "{format}");
        }
    }
}
