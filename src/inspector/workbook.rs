//! calamine-backed workbook reader

use calamine::{open_workbook_auto, Reader, Sheets};
use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, warn};

use super::InspectError;
use crate::models::{FormulaCell, MacroModule, WorkbookSnapshot};

/// Read sheets, formulas and VBA modules from a workbook file
pub(super) fn read_workbook(path: &Path) -> Result<WorkbookSnapshot, InspectError> {
    let mut workbook = open_workbook_auto(path).map_err(|source| InspectError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;

    let mut snapshot = WorkbookSnapshot::new(path);
    snapshot.sheet_names = workbook.sheet_names().to_vec();

    for sheet in snapshot.sheet_names.clone() {
        let range = match workbook.worksheet_formula(&sheet) {
            Ok(range) => range,
            Err(e) => {
                // Chart sheets and dialog sheets carry no formula grid
                debug!("No formulas read from sheet '{}': {}", sheet, e);
                continue;
            }
        };

        let (start_row, start_col) = range.start().unwrap_or_default();
        for (row, col, formula) in range.used_cells() {
            if formula.is_empty() {
                continue;
            }
            let address = absolute_address(start_row as usize + row, start_col as usize + col);
            let text = if formula.starts_with('=') {
                formula.clone()
            } else {
                format!("={}", formula)
            };
            snapshot.formulas.push(FormulaCell::new(&sheet, address, text));
        }
    }

    snapshot.macro_modules = read_macro_modules(&mut workbook);
    Ok(snapshot)
}

/// Non-empty VBA modules. Workbooks without a VBA project, or whose project
/// cannot be decoded, yield no modules.
fn read_macro_modules(workbook: &mut Sheets<BufReader<File>>) -> Vec<MacroModule> {
    let project = match workbook.vba_project() {
        None => return Vec::new(),
        Some(Ok(project)) => project,
        Some(Err(e)) => {
            warn!("Could not access VBA project: {}", e);
            return Vec::new();
        }
    };

    let names = project.get_module_names();
    collect_modules(names.iter().map(|name| (*name, project.get_module(name))))
}

/// Keep decoded modules with code in them. Decode failures are logged.
fn collect_modules<'a, E: Display>(
    decoded: impl IntoIterator<Item = (&'a str, Result<String, E>)>,
) -> Vec<MacroModule> {
    let mut modules = Vec::new();
    for (name, code) in decoded {
        match code {
            Ok(code) if !code.trim().is_empty() => {
                modules.push(MacroModule::new(name, code));
            }
            Ok(_) => {}
            Err(e) => warn!("Could not decode VBA module '{}': {}", name, e),
        }
    }
    modules
}

/// `$B$4` style address from zero-based row and column
fn absolute_address(row: usize, col: usize) -> String {
    format!("${}${}", column_letters(col), row + 1)
}

/// Spreadsheet column letters for a zero-based column index (0 → `A`, 26 → `AA`)
pub fn column_letters(col: usize) -> String {
    let mut n = col + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}
