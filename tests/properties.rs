//! Property-based tests for the heuristic core.

use eudalens::datamodel::recommend_data_model;
use eudalens::formulas::{classify_formula, FormulaPattern};
use eudalens::models::{
    ComplexityRating, DataConnection, DifficultyRating, FormulaCell, MacroModule,
    WorkbookSnapshot,
};
use eudalens::scoring::{
    count_formulas_using, estimate_difficulty, score_complexity, ADVANCED_FUNCTIONS,
    LOOKUP_FUNCTIONS,
};
use eudalens::vba::extract_data_sources;
use proptest::prelude::*;

const FORMULA_POOL: &[&str] = &[
    "=A1+B1",
    "=SUM(A1:A10)",
    "=VLOOKUP(A1,Rates!A:B,2,FALSE)",
    "=INDEX(B:B,MATCH(A1,A:A,0))",
    "=IF(A1>0,1,0)",
    "=SUMIFS(C:C,A:A,\"x\")",
    "=COUNTIF(A:A,\"y\")",
];

const MACRO_POOL: &[&str] = &[
    "Sub A()\nEnd Sub",
    "Set cn = CreateObject(\"ADODB.Connection\")",
    "rs.Open \"SELECT * FROM t\", cn",
    "Workbooks.Open(\"C:\\x.xlsx\")",
];

const RISK_KEYWORDS: &[&str] = &["CreateObject", "GetObject", "ADODB", "SQL"];

fn arb_snapshot() -> impl Strategy<Value = WorkbookSnapshot> {
    (
        prop::collection::vec("[A-Za-z]{1,12}", 0..12),
        prop::collection::vec(prop::sample::select(FORMULA_POOL), 0..80),
        prop::collection::vec(prop::sample::select(MACRO_POOL), 0..8),
        0usize..5,
    )
        .prop_map(|(sheets, formulas, macros, connections)| WorkbookSnapshot {
            file_path: "book.xlsm".into(),
            formulas: formulas
                .iter()
                .enumerate()
                .map(|(i, f)| {
                    let sheet = sheets.first().cloned().unwrap_or_else(|| "Sheet1".into());
                    FormulaCell::new(sheet, format!("$A${}", i + 1), *f)
                })
                .collect(),
            sheet_names: sheets,
            macro_modules: macros
                .iter()
                .enumerate()
                .map(|(i, code)| MacroModule::new(format!("Module{}", i + 1), *code))
                .collect(),
            connections: (0..connections)
                .map(|i| DataConnection {
                    name: format!("conn{i}"),
                    ..Default::default()
                })
                .collect(),
        })
}

proptest! {
    #[test]
    fn complexity_score_is_bounded(snap in arb_snapshot()) {
        let result = score_complexity(&snap);
        prop_assert!((0.0..=100.0).contains(&result.score));
        prop_assert_eq!(result.rating, ComplexityRating::from_score(result.score));
        for factor in &result.factors {
            prop_assert!(factor.points <= factor.cap);
            prop_assert!(factor.points >= 0.0);
        }
    }

    #[test]
    fn difficulty_score_is_bounded(snap in arb_snapshot()) {
        let complexity = score_complexity(&snap);
        let result = estimate_difficulty(&snap, &complexity);
        prop_assert!((0.0..=100.0).contains(&result.score));
        prop_assert!(result.score >= complexity.score * 0.5);
        prop_assert_eq!(result.rating, DifficultyRating::from_score(result.score));
    }

    #[test]
    fn difficulty_reasons_follow_contributors(snap in arb_snapshot()) {
        let result = estimate_difficulty(&snap, &score_complexity(&snap));
        let mut expected = Vec::new();
        if !snap.macro_modules.is_empty() {
            expected.push(format!("Contains {} VBA modules", snap.macro_modules.len()));
        }
        if !snap.connections.is_empty() {
            expected.push(format!("Has {} external data connections", snap.connections.len()));
        }
        let lookups = count_formulas_using(&snap.formulas, LOOKUP_FUNCTIONS);
        if lookups > 0 {
            expected.push(format!("Uses {} advanced Excel functions", lookups));
        }
        prop_assert_eq!(result.reasons, expected);
    }

    #[test]
    fn adding_a_sheet_never_lowers_complexity(snap in arb_snapshot()) {
        let before = score_complexity(&snap).score;
        let mut grown = snap.clone();
        grown.sheet_names.push("Extra".into());
        prop_assert!(score_complexity(&grown).score >= before);
    }

    #[test]
    fn adding_a_plain_formula_never_lowers_complexity(snap in arb_snapshot()) {
        let before = score_complexity(&snap).score;
        let mut grown = snap.clone();
        grown.formulas.push(FormulaCell::new("Sheet1", "$Z$1", "=A1+B1"));
        let after = score_complexity(&grown).score;
        prop_assert!(after >= before);
        prop_assert!(after <= 100.0);
    }

    #[test]
    fn making_a_formula_advanced_never_lowers_complexity(snap in arb_snapshot()) {
        let plain = snap
            .formulas
            .iter()
            .position(|f| count_formulas_using(std::slice::from_ref(f), ADVANCED_FUNCTIONS) == 0);
        prop_assume!(plain.is_some());
        let before = score_complexity(&snap).score;
        let mut grown = snap.clone();
        if let Some(i) = plain {
            grown.formulas[i].formula = "=SUMIFS(C:C,A:A,\"x\")".into();
        }
        let after = score_complexity(&grown).score;
        prop_assert!(after >= before);
        prop_assert!(after <= 100.0);
    }

    #[test]
    fn adding_an_empty_module_never_lowers_complexity(snap in arb_snapshot()) {
        let before = score_complexity(&snap).score;
        let mut grown = snap.clone();
        grown.macro_modules.push(MacroModule::new("Extra", ""));
        let after = score_complexity(&grown).score;
        prop_assert!(after >= before);
        prop_assert!(after <= 100.0);
    }

    #[test]
    fn adding_a_connection_never_lowers_complexity(snap in arb_snapshot()) {
        let before = score_complexity(&snap).score;
        let mut grown = snap.clone();
        grown.connections.push(DataConnection {
            name: "extra".into(),
            ..Default::default()
        });
        let after = score_complexity(&grown).score;
        prop_assert!(after >= before);
        prop_assert!(after <= 100.0);
    }

    #[test]
    fn longer_macro_source_never_lowers_complexity(
        snap in arb_snapshot(),
        extra in 1usize..5_000,
    ) {
        prop_assume!(!snap.macro_modules.is_empty());
        let before = score_complexity(&snap).score;
        let mut grown = snap.clone();
        // `x` cannot complete any risk keyword
        grown.macro_modules[0].code.push_str(&"x".repeat(extra));
        let after = score_complexity(&grown).score;
        prop_assert!(after >= before);
        prop_assert!(after <= 100.0);
    }

    #[test]
    fn risky_module_code_never_lowers_complexity(
        snap in arb_snapshot(),
        keyword in prop::sample::select(RISK_KEYWORDS),
    ) {
        prop_assume!(!snap.macro_modules.is_empty());
        let before = score_complexity(&snap).score;
        let mut grown = snap.clone();
        let module = grown.macro_modules.len() - 1;
        grown.macro_modules[module].code.push_str(&format!("\n' {keyword}"));
        let after = score_complexity(&grown).score;
        prop_assert!(after >= before);
        prop_assert!(after <= 100.0);
    }

    #[test]
    fn adding_a_module_never_lowers_difficulty(snap in arb_snapshot()) {
        let before = estimate_difficulty(&snap, &score_complexity(&snap)).score;
        let mut grown = snap.clone();
        grown.macro_modules.push(MacroModule::new("Extra", "Sub X()\nEnd Sub"));
        let after = estimate_difficulty(&grown, &score_complexity(&grown)).score;
        prop_assert!(after >= before);
    }

    #[test]
    fn complexity_rating_is_monotone(a in 0.0f64..120.0, b in 0.0f64..120.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(ComplexityRating::from_score(lo) <= ComplexityRating::from_score(hi));
        prop_assert!(DifficultyRating::from_score(lo) <= DifficultyRating::from_score(hi));
    }

    #[test]
    fn classification_echoes_formula(formula in "\\PC{0,60}") {
        let result = classify_formula(&formula);
        let first_line = result.code.lines().next().unwrap_or_default().to_string();
        prop_assert!(first_line.contains(formula.trim()));
        if result.pattern == FormulaPattern::Unrecognized {
            prop_assert_eq!(classify_formula(&formula), result);
        }
    }

    #[test]
    fn extracted_sources_are_substrings(code in "\\PC{0,200}") {
        for source in extract_data_sources(&code) {
            prop_assert!(!source.is_empty());
            prop_assert!(code.contains(source.as_str()));
        }
    }

    #[test]
    fn relationships_point_at_known_sheets(snap in arb_snapshot()) {
        let model = recommend_data_model(&snap);
        for entity in &model.entities {
            let sheet = entity.source.strip_prefix("Sheet: ").unwrap_or_default();
            prop_assert!(snap.sheet_names.iter().any(|s| s == sheet));
        }
        for rel in &model.relationships {
            prop_assert!(snap.sheet_names.contains(&rel.from));
            prop_assert!(snap.sheet_names.contains(&rel.to));
        }
    }
}

#[test]
fn rating_bands_at_boundaries() {
    assert_eq!(ComplexityRating::from_score(19.99), ComplexityRating::Simple);
    assert_eq!(ComplexityRating::from_score(20.0), ComplexityRating::Basic);
    assert_eq!(ComplexityRating::from_score(80.0), ComplexityRating::VeryComplex);
    assert_eq!(DifficultyRating::from_score(29.99), DifficultyRating::Easy);
    assert_eq!(DifficultyRating::from_score(30.0), DifficultyRating::Moderate);
    assert_eq!(DifficultyRating::from_score(80.0), DifficultyRating::VeryDifficult);
}
