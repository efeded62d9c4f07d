//! Stored analysis commands: list, show, summarize, delete

use anyhow::{Context, Result};
use console::{style, Term};
use serde::Serialize;
use tracing::warn;

use super::{ai_client, embedder, with_spinner};
use crate::ai::{embedding_text, Assistant, Embedder};
use crate::config::UserConfig;
use crate::models::StoredAnalysis;
use crate::reporters;
use crate::store::AnalysisStore;

/// One row of `eudalens list --json`
#[derive(Debug, Serialize)]
struct ListEntry<'a> {
    id: u64,
    file_name: &'a str,
    created_at: String,
    complexity_score: f64,
    complexity_rating: String,
    difficulty_score: f64,
    difficulty_rating: String,
    has_summary: bool,
}

impl<'a> From<&'a StoredAnalysis> for ListEntry<'a> {
    fn from(a: &'a StoredAnalysis) -> Self {
        Self {
            id: a.id,
            file_name: &a.file_name,
            created_at: a.created_at.to_rfc3339(),
            complexity_score: a.report.complexity.score,
            complexity_rating: a.report.complexity.rating.to_string(),
            difficulty_score: a.report.difficulty.score,
            difficulty_rating: a.report.difficulty.rating.to_string(),
            has_summary: a.summary().is_some(),
        }
    }
}

pub fn list(store: &AnalysisStore, json: bool) -> Result<()> {
    let analyses = store.list()?;

    if json {
        let entries: Vec<ListEntry> = analyses.iter().map(ListEntry::from).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if analyses.is_empty() {
        println!("No stored analyses. Run `eudalens analyze <FILE>` first.");
        return Ok(());
    }

    println!(
        "{:>5}  {:<32}  {:<16}  {:<16}  {}",
        style("ID").bold(),
        style("FILE").bold(),
        style("COMPLEXITY").bold(),
        style("DIFFICULTY").bold(),
        style("CREATED").bold()
    );
    for a in &analyses {
        println!(
            "{:>5}  {:<32}  {:<16}  {:<16}  {}",
            a.id,
            truncate(&a.file_name, 32),
            format!("{:.0} {}", a.report.complexity.score, a.report.complexity.rating),
            format!("{:.0} {}", a.report.difficulty.score, a.report.difficulty.rating),
            style(a.created_at.format("%Y-%m-%d %H:%M")).dim()
        );
    }
    println!("\n{} analyses", analyses.len());
    Ok(())
}

pub fn show(store: &AnalysisStore, id: u64, format: &str) -> Result<()> {
    let analysis = load(store, id)?;
    print!("{}", reporters::report(&analysis.report, format)?);
    Ok(())
}

/// (Re)generate the AI summary of a stored analysis and refresh its embedding
pub fn summarize(config: &UserConfig, store: &AnalysisStore, id: u64) -> Result<()> {
    let mut analysis = load(store, id)?;
    let client = ai_client(config)?;

    let message = format!("Summarizing {} with {}...", analysis.file_name, client.model());
    let report = analysis.report.clone();
    let summary = with_spinner(message, move || Assistant::new(client).summarize(&report))?
        .context("AI summary failed")?;

    analysis.report.summary = Some(summary);
    store.update(&analysis)?;

    match embedder(config).map_err(|e| e.to_string()).and_then(|embedder| {
        embedder
            .embed(&embedding_text(&analysis.report))
            .map_err(|e| e.to_string())
    }) {
        Ok(vector) => store.put_embedding(id, &vector)?,
        Err(e) => warn!("Summary stored without embedding: {}", e),
    }

    println!("{}", analysis.summary().unwrap_or_default());
    Term::stderr().write_line(&format!(
        "{} Updated analysis #{}",
        style("✓").green(),
        id
    ))?;
    Ok(())
}

pub fn delete(store: &AnalysisStore, id: u64) -> Result<()> {
    if !store.delete(id)? {
        anyhow::bail!("Analysis #{} not found", id);
    }
    println!("{} Deleted analysis #{}", style("✓").green(), id);
    Ok(())
}

/// Fetch an analysis or fail with a hint
pub(super) fn load(store: &AnalysisStore, id: u64) -> Result<StoredAnalysis> {
    store.get(id)?.with_context(|| {
        format!(
            "Analysis #{} not found. Run `eudalens list` to see stored analyses.",
            id
        )
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short.xlsx", 32), "short.xlsx");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn test_load_missing_names_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = AnalysisStore::open(&dir.path().join("db.redb")).unwrap();
        let err = load(&store, 42).unwrap_err();
        assert!(err.to_string().contains("#42"));
    }
}
