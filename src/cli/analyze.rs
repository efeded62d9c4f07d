//! Analyze command implementation
//!
//! Inspect -> score -> (summarize) -> store -> render. The heuristic stages
//! are pure and fast; only the LLM summary and the embedding touch the
//! network, and neither failing aborts the command.

use anyhow::{Context, Result};
use console::{style, Term};
use std::path::Path;
use tracing::{info, warn};

use super::{ai_client, embedder, open_store, with_spinner};
use crate::ai::{embedding_text, Assistant, Embedder};
use crate::config::UserConfig;
use crate::inspector::inspect_workbook;
use crate::models::AnalysisReport;
use crate::pipeline::analyze_snapshot;
use crate::reporters;
use crate::store::AnalysisStore;

pub fn run(
    config: &UserConfig,
    db: Option<&Path>,
    file: &Path,
    format: &str,
    output: Option<&Path>,
    no_ai: bool,
    no_store: bool,
) -> Result<()> {
    let term = Term::stderr();

    let snapshot = inspect_workbook(file)
        .with_context(|| format!("Failed to inspect {}", file.display()))?;
    let mut report = analyze_snapshot(snapshot);

    if !no_ai {
        report.summary = summarize(config, &report, &term)?;
    }

    if !no_store {
        let store = open_store(config, db)?;
        let stored = store.insert(report.clone())?;
        term.write_line(&format!(
            "{} Stored as analysis #{} in {}",
            style("✓").green(),
            stored.id,
            style(store.path().display()).dim()
        ))?;

        if !no_ai && report.summary.is_some() {
            embed_report(config, &store, stored.id, &report);
        }
    }

    let rendered = reporters::report(&report, format)?;
    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            term.write_line(&format!(
                "{} Report written to {}",
                style("✓").green(),
                style(path.display()).cyan()
            ))?;
        }
        None => print!("{}", rendered),
    }

    Ok(())
}

/// Ask the LLM for a summary. Any failure is reported and yields `None`.
fn summarize(config: &UserConfig, report: &AnalysisReport, term: &Term) -> Result<Option<String>> {
    let client = match ai_client(config) {
        Ok(client) => client,
        Err(e) => {
            term.write_line(&format!(
                "{} Skipping AI summary: {}",
                style("○").dim(),
                e
            ))?;
            return Ok(None);
        }
    };

    let message = format!(
        "Summarizing {} with {}...",
        report.file_name(),
        client.model()
    );
    let for_worker = report.clone();
    let outcome = with_spinner(message, move || {
        Assistant::new(client).summarize(&for_worker)
    })?;

    match outcome {
        Ok(summary) => {
            info!("Generated AI summary ({} chars)", summary.len());
            Ok(Some(summary))
        }
        Err(e) => {
            warn!("AI summary failed: {}", e);
            term.write_line(&format!(
                "{} AI summary failed, storing the report without one: {}",
                style("⚠").yellow(),
                e
            ))?;
            Ok(None)
        }
    }
}

/// Store an embedding of the report for `eudalens search`; failures only warn
fn embed_report(config: &UserConfig, store: &AnalysisStore, id: u64, report: &AnalysisReport) {
    let embedder = match embedder(config) {
        Ok(embedder) => embedder,
        Err(e) => {
            info!("Skipping embedding: {:#}", e);
            return;
        }
    };

    let vector = match embedder.embed(&embedding_text(report)) {
        Ok(vector) => vector,
        Err(e) => {
            warn!("Embedding failed for analysis #{}: {}", id, e);
            return;
        }
    };

    if let Err(e) = store.put_embedding(id, &vector) {
        warn!("Failed to store embedding for analysis #{}: {:#}", id, e);
    }
}
