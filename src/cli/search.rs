//! Search command - similarity search over stored analyses

use anyhow::{Context, Result};
use console::style;

use super::{embedder, with_spinner};
use crate::ai::Embedder;
use crate::config::UserConfig;
use crate::store::AnalysisStore;

pub fn run(config: &UserConfig, store: &AnalysisStore, query: &str, limit: usize) -> Result<()> {
    let embedder = embedder(config)?;
    let text = query.to_string();
    let vector = with_spinner("Embedding query...", move || embedder.embed(&text))?
        .context("Failed to embed query")?;

    let results = store.search_similar(&vector, limit)?;
    if results.is_empty() {
        println!("No matching analyses. Only analyses stored with an AI summary are searchable.");
        return Ok(());
    }

    for (analysis, similarity) in results {
        println!(
            "{:>5}  {:<32}  {}  {}",
            analysis.id,
            analysis.file_name,
            style(format!("{:.3}", similarity)).cyan(),
            style(analysis.report.complexity.rating.to_string()).dim()
        );
        if let Some(summary) = analysis.summary() {
            if let Some(first) = summary.lines().find(|l| !l.trim().is_empty()) {
                println!("       {}", style(first.trim()).dim());
            }
        }
    }
    Ok(())
}
