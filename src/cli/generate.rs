//! Generate command - replacement Python code for a stored analysis

use anyhow::{Context, Result};
use console::{style, Term};
use std::path::Path;

use super::{ai_client, history, with_spinner};
use crate::ai::Assistant;
use crate::config::UserConfig;
use crate::store::AnalysisStore;

pub fn run(
    config: &UserConfig,
    store: &AnalysisStore,
    id: u64,
    output: Option<&Path>,
) -> Result<()> {
    let analysis = history::load(store, id)?;
    let client = ai_client(config)?;
    let term = Term::stderr();

    term.write_line(&format!(
        "\n{} Generating Python replacement for {}",
        style("⚡").cyan(),
        style(&analysis.file_name).bold()
    ))?;
    term.write_line(&format!(
        "  {} {} ({})\n",
        style("Using:").dim(),
        client.model(),
        client.backend()
    ))?;

    let for_worker = analysis.clone();
    let code = with_spinner("Waiting for the model...", move || {
        Assistant::new(client).generate_code(&for_worker)
    })?
    .context("Code generation failed")?;

    match output {
        Some(path) => {
            std::fs::write(path, &code)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            term.write_line(&format!(
                "{} Exported {} lines to {}",
                style("✓").green(),
                code.lines().count(),
                style(path.display()).cyan()
            ))?;
        }
        None => println!("{}", code),
    }

    Ok(())
}
