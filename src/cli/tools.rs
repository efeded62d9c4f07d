//! Standalone heuristics: formula classification and data-source extraction

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use crate::formulas::classify_formula;
use crate::vba::extract_data_sources;

pub fn classify(formula: &str) -> Result<()> {
    let classification = classify_formula(formula);
    println!(
        "{} {}\n",
        style("Pattern:").bold(),
        style(classification.pattern).cyan()
    );
    println!("{}", classification.code);
    Ok(())
}

pub fn sources(file: &Path) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    // Exported .bas files are often Windows-1252
    let code = String::from_utf8_lossy(&bytes);

    let found = extract_data_sources(&code);
    if found.is_empty() {
        eprintln!("No data sources found in {}", file.display());
        return Ok(());
    }
    for source in found {
        println!("{}", source);
    }
    Ok(())
}
