//! Data-model recommender
//!
//! Proposes entities from sheet naming conventions and lookup relationships
//! from formulas that mention another sheet. The result is a starting point
//! for a normalized schema, not a schema.

use std::collections::HashSet;

use crate::models::{DataModelRecommendation, EntityHint, RelationshipHint, WorkbookSnapshot};

/// Lowercase fragments that mark a sheet as holding entity data
const ENTITY_MARKERS: &[&str] = &["data", "table", "list", "master", "info"];

/// CamelCase tokens stripped from a sheet name to form the entity name
const ENTITY_VOCABULARY: &[&str] = &["Data", "Table", "List", "Master", "Info"];

/// Only the first formulas are scanned for relationships
const RELATIONSHIP_SCAN_LIMIT: usize = 50;

const RELATIONSHIP_KIND: &str = "lookup";

const RECOMMENDATION: &str = "Based on the EUDA analysis, consider creating a normalized data \
model with the entities listed above. Use SQLAlchemy ORM to model these entities and their \
relationships in Python.";

/// Recommend entities and relationships for a snapshot
pub fn recommend_data_model(snapshot: &WorkbookSnapshot) -> DataModelRecommendation {
    let entities: Vec<EntityHint> = snapshot
        .sheet_names
        .iter()
        .filter(|sheet| is_entity_sheet(sheet))
        .map(|sheet| EntityHint {
            name: entity_name(sheet),
            source: format!("Sheet: {}", sheet),
        })
        .collect();

    let entity_sheets: HashSet<&str> = snapshot
        .sheet_names
        .iter()
        .filter(|sheet| is_entity_sheet(sheet))
        .map(String::as_str)
        .collect();

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut relationships = Vec::new();

    for cell in snapshot.formulas.iter().take(RELATIONSHIP_SCAN_LIMIT) {
        let text = cell.formula.to_lowercase();
        let is_lookup = text.contains("vlookup") || (text.contains("index") && text.contains("match"));
        if !is_lookup || cell.sheet.is_empty() || !entity_sheets.contains(cell.sheet.as_str()) {
            continue;
        }

        for target in &snapshot.sheet_names {
            if target == &cell.sheet || target.is_empty() {
                continue;
            }
            if !references_sheet(&cell.formula, target) {
                continue;
            }
            if seen.insert((cell.sheet.clone(), target.clone())) {
                relationships.push(RelationshipHint {
                    from: cell.sheet.clone(),
                    to: target.clone(),
                    kind: RELATIONSHIP_KIND.to_string(),
                });
            }
        }
    }

    DataModelRecommendation {
        entities,
        relationships,
        recommendation: RECOMMENDATION.to_string(),
    }
}

/// Whether `formula` names `sheet` in a reference, as `Sheet!A1` or
/// `'Sheet Name'!A1`. The name must match exactly.
fn references_sheet(formula: &str, sheet: &str) -> bool {
    let quoted = format!("'{}'!", sheet.replace('\'', "''"));
    if formula.contains(&quoted) {
        return true;
    }
    let bare = format!("{}!", sheet);
    formula.match_indices(&bare).any(|(i, _)| {
        !formula[..i]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '.')
    })
}

fn is_entity_sheet(sheet: &str) -> bool {
    let lower = sheet.to_lowercase();
    ENTITY_MARKERS.iter().any(|m| lower.contains(m))
}

/// Strip vocabulary tokens from a sheet name.
///
/// A token only counts when it is not followed by a lowercase letter, so
/// `CustomerData` becomes `Customer` while `Information` is left alone.
/// Falls back to the full sheet name when nothing else remains.
fn entity_name(sheet: &str) -> String {
    let mut out = String::with_capacity(sheet.len());
    let mut rest = sheet;

    'scan: while !rest.is_empty() {
        for token in ENTITY_VOCABULARY {
            if let Some(after) = rest.strip_prefix(token) {
                if !after.chars().next().is_some_and(char::is_lowercase) {
                    rest = after;
                    continue 'scan;
                }
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }

    let trimmed = out.trim_matches(|c: char| c.is_whitespace() || c == '_' || c == '-');
    if trimmed.is_empty() {
        sheet.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FormulaCell;

    fn snapshot(sheets: &[&str]) -> WorkbookSnapshot {
        WorkbookSnapshot {
            sheet_names: sheets.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_entities_from_sheet_names() {
        let result = recommend_data_model(&snapshot(&["CustomerData", "OrderTable", "Config"]));
        let names: Vec<&str> = result.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Customer", "Order"]);
        assert_eq!(result.entities[0].source, "Sheet: CustomerData");
        assert!(result.recommendation.contains("SQLAlchemy ORM"));
    }

    #[test]
    fn test_entity_name_stripping() {
        assert_eq!(entity_name("ProductInfo"), "Product");
        assert_eq!(entity_name("Information"), "Information");
        assert_eq!(entity_name("Employee List"), "Employee");
        assert_eq!(entity_name("Vendor_Master"), "Vendor");
        assert_eq!(entity_name("Data"), "Data");
        assert_eq!(entity_name("MasterData"), "MasterData");
        assert_eq!(entity_name("metadata"), "metadata");
    }

    #[test]
    fn test_lookup_relationships() {
        let mut snap = snapshot(&["OrderData", "CustomerData", "Summary"]);
        snap.formulas.push(FormulaCell::new(
            "OrderData",
            "$C$2",
            "=VLOOKUP(B2,CustomerData!A:D,2,FALSE)",
        ));
        snap.formulas.push(FormulaCell::new(
            "OrderData",
            "$C$3",
            "=VLOOKUP(B3,CustomerData!A:D,2,FALSE)",
        ));
        // Source sheet is not an entity
        snap.formulas.push(FormulaCell::new(
            "Summary",
            "$A$1",
            "=VLOOKUP(1,OrderData!A:B,2,FALSE)",
        ));
        let result = recommend_data_model(&snap);
        assert_eq!(
            result.relationships,
            vec![RelationshipHint {
                from: "OrderData".into(),
                to: "CustomerData".into(),
                kind: "lookup".into(),
            }]
        );
    }

    #[test]
    fn test_index_requires_match() {
        let mut snap = snapshot(&["PriceList", "ItemData"]);
        snap.formulas.push(FormulaCell::new("PriceList", "$A$1", "=INDEX(ItemData!A:A,3)"));
        assert!(recommend_data_model(&snap).relationships.is_empty());

        snap.formulas.push(FormulaCell::new(
            "PriceList",
            "$A$2",
            "=INDEX(ItemData!B:B,MATCH(A2,ItemData!A:A,0))",
        ));
        assert_eq!(recommend_data_model(&snap).relationships.len(), 1);
    }

    #[test]
    fn test_only_first_50_formulas_scanned() {
        let mut snap = snapshot(&["SalesData", "RegionTable"]);
        for i in 0..50 {
            snap.formulas.push(FormulaCell::new("SalesData", format!("$A${i}"), "=1"));
        }
        snap.formulas.push(FormulaCell::new(
            "SalesData",
            "$B$1",
            "=VLOOKUP(A1,RegionTable!A:B,2,FALSE)",
        ));
        assert!(recommend_data_model(&snap).relationships.is_empty());
    }

    #[test]
    fn test_target_must_be_a_sheet_reference() {
        let mut snap = snapshot(&["OrderData", "A", "CustomerData", "Customer"]);
        snap.formulas.push(FormulaCell::new(
            "OrderData",
            "$C$2",
            "=VLOOKUP(a1,CustomerData!A:D,2,FALSE)",
        ));
        let targets: Vec<String> = recommend_data_model(&snap)
            .relationships
            .into_iter()
            .map(|r| r.to)
            .collect();
        // Neither `A` nor the `Customer` prefix of `CustomerData!` count
        assert_eq!(targets, vec!["CustomerData".to_string()]);
    }

    #[test]
    fn test_quoted_and_case_sensitive_references() {
        let mut snap = snapshot(&["Order Data", "Price List", "RegionTable"]);
        snap.formulas.push(FormulaCell::new(
            "Order Data",
            "$B$2",
            "=INDEX('Price List'!B:B,MATCH(A2,'Price List'!A:A,0))+VLOOKUP(A2,regiontable!A:B,2,0)",
        ));
        let targets: Vec<String> = recommend_data_model(&snap)
            .relationships
            .into_iter()
            .map(|r| r.to)
            .collect();
        assert_eq!(targets, vec!["Price List".to_string()]);
    }

    #[test]
    fn test_references_sheet() {
        assert!(references_sheet("=Rates!A1", "Rates"));
        assert!(references_sheet("='Bob''s Rates'!A1", "Bob's Rates"));
        assert!(!references_sheet("=OldRates!A1", "Rates"));
        assert!(!references_sheet("=Rates", "Rates"));
    }

    #[test]
    fn test_empty_snapshot() {
        let result = recommend_data_model(&WorkbookSnapshot::default());
        assert!(result.entities.is_empty());
        assert!(result.relationships.is_empty());
        assert!(!result.recommendation.is_empty());
    }
}
