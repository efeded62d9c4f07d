//! Core data models for eudalens
//!
//! The workbook snapshot is the single input every heuristic consumes.
//! Everything else in this module is derived from it and never mutated
//! after construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A cell holding a formula
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaCell {
    pub sheet: String,
    /// Absolute A1 address, e.g. `$B$4`
    pub address: String,
    #[serde(alias = "formula_text")]
    pub formula: String,
}

impl FormulaCell {
    pub fn new(
        sheet: impl Into<String>,
        address: impl Into<String>,
        formula: impl Into<String>,
    ) -> Self {
        Self {
            sheet: sheet.into(),
            address: address.into(),
            formula: formula.into(),
        }
    }
}

/// Kind of VBA component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MacroModuleKind {
    #[default]
    Standard,
    Class,
    Form,
    /// `ThisWorkbook` and per-sheet code-behind modules
    Document,
}

impl MacroModuleKind {
    /// Guess the component kind from the conventional VBA module names.
    pub fn from_module_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower == "thisworkbook" || lower.starts_with("sheet") || lower.starts_with("chart") {
            MacroModuleKind::Document
        } else if lower.starts_with("userform") {
            MacroModuleKind::Form
        } else if lower.starts_with("class") || lower.starts_with("cls") {
            MacroModuleKind::Class
        } else {
            MacroModuleKind::Standard
        }
    }
}

impl std::fmt::Display for MacroModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MacroModuleKind::Standard => write!(f, "standard"),
            MacroModuleKind::Class => write!(f, "class"),
            MacroModuleKind::Form => write!(f, "form"),
            MacroModuleKind::Document => write!(f, "document"),
        }
    }
}

/// A VBA module with its source text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroModule {
    pub name: String,
    #[serde(default, alias = "type")]
    pub kind: MacroModuleKind,
    #[serde(alias = "source_text")]
    pub code: String,
}

impl MacroModule {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: MacroModuleKind::from_module_name(&name),
            name,
            code: code.into(),
        }
    }
}

/// An external data connection declared by the workbook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DataConnection {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub connection_string: String,
}

/// Point-in-time extraction of a workbook.
///
/// Counts are methods over the sequences rather than stored fields, so they
/// always agree with the data they describe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WorkbookSnapshot {
    #[serde(default)]
    pub file_path: PathBuf,
    #[serde(default)]
    pub sheet_names: Vec<String>,
    #[serde(default)]
    pub formulas: Vec<FormulaCell>,
    #[serde(default, alias = "vba_modules")]
    pub macro_modules: Vec<MacroModule>,
    #[serde(default)]
    pub connections: Vec<DataConnection>,
}

impl WorkbookSnapshot {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Default::default()
        }
    }

    pub fn sheet_count(&self) -> usize {
        self.sheet_names.len()
    }

    pub fn formula_count(&self) -> usize {
        self.formulas.len()
    }

    pub fn vba_module_count(&self) -> usize {
        self.macro_modules.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Total macro source length in characters
    pub fn macro_source_len(&self) -> usize {
        self.macro_modules.iter().map(|m| m.code.chars().count()).sum()
    }

    /// File name component of the source path, or the whole path if it has none
    pub fn file_name(&self) -> String {
        file_name_of(&self.file_path)
    }
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Five-band complexity rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComplexityRating {
    Simple,
    Basic,
    Moderate,
    Complex,
    #[serde(rename = "Very Complex")]
    VeryComplex,
}

impl ComplexityRating {
    /// Step function over the score: 20 / 40 / 60 / 80 are lower bounds
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s < 20.0 => ComplexityRating::Simple,
            s if s < 40.0 => ComplexityRating::Basic,
            s if s < 60.0 => ComplexityRating::Moderate,
            s if s < 80.0 => ComplexityRating::Complex,
            _ => ComplexityRating::VeryComplex,
        }
    }
}

impl std::fmt::Display for ComplexityRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplexityRating::Simple => write!(f, "Simple"),
            ComplexityRating::Basic => write!(f, "Basic"),
            ComplexityRating::Moderate => write!(f, "Moderate"),
            ComplexityRating::Complex => write!(f, "Complex"),
            ComplexityRating::VeryComplex => write!(f, "Very Complex"),
        }
    }
}

/// Four-band remediation difficulty rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DifficultyRating {
    Easy,
    Moderate,
    Difficult,
    #[serde(rename = "Very Difficult")]
    VeryDifficult,
}

impl DifficultyRating {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s < 30.0 => DifficultyRating::Easy,
            s if s < 60.0 => DifficultyRating::Moderate,
            s if s < 80.0 => DifficultyRating::Difficult,
            _ => DifficultyRating::VeryDifficult,
        }
    }
}

impl std::fmt::Display for DifficultyRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DifficultyRating::Easy => write!(f, "Easy"),
            DifficultyRating::Moderate => write!(f, "Moderate"),
            DifficultyRating::Difficult => write!(f, "Difficult"),
            DifficultyRating::VeryDifficult => write!(f, "Very Difficult"),
        }
    }
}

/// One capped contribution to the complexity score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreFactor {
    pub name: String,
    /// Uncapped contribution
    pub raw: f64,
    /// Contribution after applying the cap
    pub points: f64,
    pub cap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityAssessment {
    pub score: f64,
    pub rating: ComplexityRating,
    #[serde(default)]
    pub factors: Vec<ScoreFactor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyAssessment {
    pub score: f64,
    pub rating: DifficultyRating,
    pub reasons: Vec<String>,
}

/// Entity candidate inferred from a sheet name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityHint {
    pub name: String,
    pub source: String,
}

/// Lookup-style link between two sheets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipHint {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DataModelRecommendation {
    pub entities: Vec<EntityHint>,
    pub relationships: Vec<RelationshipHint>,
    pub recommendation: String,
}

/// Best-effort pandas rendition of one formula cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormulaTranslation {
    pub sheet: String,
    pub address: String,
    pub pattern: String,
    pub code: String,
}

/// Full result of analysing one workbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub snapshot: WorkbookSnapshot,
    pub complexity: ComplexityAssessment,
    pub difficulty: DifficultyAssessment,
    pub data_sources: Vec<String>,
    pub data_model: DataModelRecommendation,
    pub translations: Vec<FormulaTranslation>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl AnalysisReport {
    pub fn file_name(&self) -> String {
        self.snapshot.file_name()
    }
}

/// An analysis as persisted by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub id: u64,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    pub report: AnalysisReport,
}

impl StoredAnalysis {
    pub fn summary(&self) -> Option<&str> {
        self.report.summary.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complexity_rating_boundaries() {
        assert_eq!(ComplexityRating::from_score(0.0), ComplexityRating::Simple);
        assert_eq!(ComplexityRating::from_score(19.99), ComplexityRating::Simple);
        assert_eq!(ComplexityRating::from_score(20.0), ComplexityRating::Basic);
        assert_eq!(ComplexityRating::from_score(40.0), ComplexityRating::Moderate);
        assert_eq!(ComplexityRating::from_score(60.0), ComplexityRating::Complex);
        assert_eq!(ComplexityRating::from_score(80.0), ComplexityRating::VeryComplex);
        assert_eq!(ComplexityRating::from_score(100.0), ComplexityRating::VeryComplex);
    }

    #[test]
    fn test_difficulty_rating_boundaries() {
        assert_eq!(DifficultyRating::from_score(29.5), DifficultyRating::Easy);
        assert_eq!(DifficultyRating::from_score(30.0), DifficultyRating::Moderate);
        assert_eq!(DifficultyRating::from_score(60.0), DifficultyRating::Difficult);
        assert_eq!(DifficultyRating::from_score(80.0), DifficultyRating::VeryDifficult);
    }

    #[test]
    fn test_rating_display_and_serde() {
        assert_eq!(ComplexityRating::VeryComplex.to_string(), "Very Complex");
        let json = serde_json::to_string(&DifficultyRating::VeryDifficult).unwrap();
        assert_eq!(json, "\"Very Difficult\"");
    }

    #[test]
    fn test_snapshot_counts_follow_sequences() {
        let mut snap = WorkbookSnapshot::new("/tmp/book.xlsm");
        assert_eq!(snap.formula_count(), 0);
        snap.formulas.push(FormulaCell::new("Sheet1", "$A$1", "=1+1"));
        snap.macro_modules.push(MacroModule::new("Module1", "Sub A()\nEnd Sub"));
        assert_eq!(snap.formula_count(), 1);
        assert_eq!(snap.vba_module_count(), 1);
        assert_eq!(snap.connection_count(), 0);
        assert_eq!(snap.file_name(), "book.xlsm");
    }

    #[test]
    fn test_module_kind_from_name() {
        assert_eq!(MacroModuleKind::from_module_name("ThisWorkbook"), MacroModuleKind::Document);
        assert_eq!(MacroModuleKind::from_module_name("Sheet3"), MacroModuleKind::Document);
        assert_eq!(MacroModuleKind::from_module_name("UserForm1"), MacroModuleKind::Form);
        assert_eq!(MacroModuleKind::from_module_name("Module1"), MacroModuleKind::Standard);
    }

    #[test]
    fn test_snapshot_accepts_original_field_names() {
        let json = r#"{
            "sheet_names": ["Data"],
            "formulas": [{"sheet": "Data", "address": "$A$1", "formula_text": "=SUM(B:B)"}],
            "vba_modules": [{"name": "Module1", "type": "standard", "source_text": "x"}]
        }"#;
        let snap: WorkbookSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.formulas[0].formula, "=SUM(B:B)");
        assert_eq!(snap.macro_modules[0].code, "x");
        assert!(snap.connections.is_empty());
    }
}
