//! Prompt templates for workbook summaries, code generation and chat

use crate::models::{AnalysisReport, DataConnection, FormulaCell, MacroModule, StoredAnalysis};

/// Formulas quoted in a prompt
const PROMPT_FORMULA_LIMIT: usize = 20;
/// Macro modules quoted in a prompt
const PROMPT_MODULE_LIMIT: usize = 3;
/// Characters of each macro module quoted in a prompt
const PROMPT_MODULE_CHARS: usize = 1000;

const NO_SUMMARY: &str = "No summary available";

/// System prompts for each assistant task
pub struct PromptTemplate;

impl PromptTemplate {
    pub fn summary_system() -> &'static str {
        "You are an expert in Excel EUDA analysis and Python migration. \
         Provide concise, actionable insights."
    }

    pub fn codegen_system() -> &'static str {
        "You are an expert in Python development. Generate well-structured, \
         maintainable Python code that follows best practices."
    }

    pub fn chat_system() -> &'static str {
        "You are an expert in Excel EUDA analysis and Python migration. \
         Help users understand and remediate their EUDAs."
    }
}

/// Prompt asking for a summary and migration recommendation
pub fn summary_prompt(report: &AnalysisReport) -> String {
    let snap = &report.snapshot;
    format!(
        r#"You are an expert in analyzing Excel EUDAs (End User Developed Applications).
Please analyze the following Excel file and provide:
1. A concise summary of what this EUDA appears to be doing
2. The estimated complexity and why
3. Key data sources identified
4. A high-level recommendation on whether this could be migrated to a Python application

Excel File: {file}
Sheets: {sheets}
Complexity Score: {score:.1}
Complexity Rating: {rating}

# Sample Formulas:
{formulas}

# VBA Code (if any):
{macros}

# Data Connections:
{connections}

Based on this information, provide a concise analysis."#,
        file = report.file_name(),
        sheets = snap.sheet_names.join(", "),
        score = report.complexity.score,
        rating = report.complexity.rating,
        formulas = formula_section(&snap.formulas),
        macros = macro_section(&snap.macro_modules),
        connections = connection_section(&snap.connections),
    )
}

/// Prompt asking for a replacement Python application
pub fn codegen_prompt(analysis: &StoredAnalysis) -> String {
    let report = &analysis.report;
    let snap = &report.snapshot;
    format!(
        r#"You are an expert in converting Excel EUDAs to Python applications.
Please generate a Python application that replicates the functionality of this EUDA.

Excel File: {file}
Complexity: {rating}
Summary: {summary}

# Sample Formulas:
{formulas}

# VBA Code (if any):
{macros}

# Data Connections:
{connections}

Please generate a well-structured Python application that replicates this functionality.
Use pandas for data manipulation and include proper error handling.
If database connections are required, use SQLAlchemy.
Include clear comments and documentation.
Organize the code in a maintainable way using classes and functions.

The application should:
1. Load data from similar sources
2. Implement similar business logic
3. Produce equivalent outputs
4. Have a simple user interface if appropriate

Provide complete, working code."#,
        file = analysis.file_name,
        rating = report.complexity.rating,
        summary = analysis.summary().unwrap_or(NO_SUMMARY),
        formulas = formula_section(&snap.formulas),
        macros = macro_section(&snap.macro_modules),
        connections = connection_section(&snap.connections),
    )
}

/// Context preamble for a chat about one stored workbook
pub fn chat_context(analysis: &StoredAnalysis) -> String {
    let report = &analysis.report;
    format!(
        r#"You are an expert assistant for Excel EUDA remediation.
You are helping with this specific EUDA:

Excel File: {file}
Complexity: {rating} ({score:.1})
Remediation Difficulty: {difficulty}
Sheets: {sheets}
Data Sources: {sources}
Summary: {summary}

Answer the user's questions with helpful, accurate responses based on the EUDA details."#,
        file = analysis.file_name,
        rating = report.complexity.rating,
        score = report.complexity.score,
        difficulty = report.difficulty.rating,
        sheets = report.snapshot.sheet_names.join(", "),
        sources = if report.data_sources.is_empty() {
            "none found".to_string()
        } else {
            report.data_sources.join(", ")
        },
        summary = analysis.summary().unwrap_or(NO_SUMMARY),
    )
}

/// Text a stored analysis is embedded under for similarity search
pub fn embedding_text(report: &AnalysisReport) -> String {
    let mut text = format!(
        "{}\nSheets: {}\nComplexity: {}",
        report.file_name(),
        report.snapshot.sheet_names.join(", "),
        report.complexity.rating
    );
    if let Some(summary) = &report.summary {
        text.push('\n');
        text.push_str(summary);
    }
    text
}

fn formula_section(formulas: &[FormulaCell]) -> String {
    formulas
        .iter()
        .take(PROMPT_FORMULA_LIMIT)
        .map(|f| format!("Sheet: {}, Cell: {}, Formula: {}", f.sheet, f.address, f.formula))
        .collect::<Vec<_>>()
        .join("\n")
}

fn macro_section(modules: &[MacroModule]) -> String {
    modules
        .iter()
        .take(PROMPT_MODULE_LIMIT)
        .map(|m| {
            let code: String = sanitize_code(&m.code)
                .chars()
                .take(PROMPT_MODULE_CHARS)
                .collect();
            format!("\nModule: {}\n```vb\n{}...\n```\n", m.name, code)
        })
        .collect()
}

fn connection_section(connections: &[DataConnection]) -> String {
    connections
        .iter()
        .map(|c| format!("Name: {}, Description: {}", c.name, c.description))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace macro lines that try to address the model directly
fn sanitize_code(code: &str) -> String {
    const INJECTION_PATTERNS: &[&str] = &[
        "ignore all previous",
        "ignore above instructions",
        "disregard all prior",
        "disregard previous",
        "forget your instructions",
        "new instructions:",
        "system prompt:",
        "you are now",
        "reveal your",
        "print your system",
    ];

    let lower = code.to_lowercase();
    if !INJECTION_PATTERNS.iter().any(|p| lower.contains(p)) {
        return code.to_string();
    }

    code.lines()
        .map(|line| {
            let line_lower = line.to_lowercase();
            if INJECTION_PATTERNS.iter().any(|p| line_lower.contains(p)) {
                "' [prompt injection filtered]".to_string()
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
