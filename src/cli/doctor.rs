//! Doctor command - check environment

use anyhow::Result;
use console::style;
use std::path::Path;

use super::{open_store, resolve_db_path};
use crate::ai::{AiClient, LlmBackend};
use crate::config::UserConfig;

pub fn run(config: &UserConfig, db: Option<&Path>) -> Result<()> {
    println!("🩺 eudalens Doctor\n");
    let mut problems = 0;

    // User config
    match UserConfig::user_config_path() {
        Some(path) if path.exists() => match UserConfig::load_from(&path) {
            Ok(_) => println!("✓ Config: {}", path.display()),
            Err(e) => {
                problems += 1;
                println!("{} Config: {:#}", style("✗").red(), e);
            }
        },
        Some(path) => println!(
            "○ Config: none at {} (run `eudalens config init`)",
            path.display()
        ),
        None => println!("○ Config: no config directory on this platform"),
    }

    // Analysis database
    match resolve_db_path(config, db) {
        Ok(path) => match open_store(config, db).and_then(|store| store.list()) {
            Ok(analyses) => println!(
                "✓ Analysis database: {} ({} stored)",
                path.display(),
                analyses.len()
            ),
            Err(e) => {
                problems += 1;
                println!("{} Analysis database: {:#}", style("✗").red(), e);
            }
        },
        Err(e) => {
            problems += 1;
            println!("{} Analysis database: {}", style("✗").red(), e);
        }
    }

    // AI providers (all optional)
    let configured: Vec<&str> = LlmBackend::ALL
        .iter()
        .filter(|b| b.requires_api_key() && config.api_key_for(**b).is_some())
        .map(|b| b.as_str())
        .collect();
    let ollama = AiClient::ollama_available();

    if configured.is_empty() && !ollama {
        println!("○ AI providers: none configured (summaries, codegen, chat and search disabled)");
        println!("  Set ANTHROPIC_API_KEY, OPENAI_API_KEY or OPENROUTER_API_KEY, or start Ollama");
    } else {
        let mut providers = configured;
        if ollama {
            providers.push("ollama (local)");
        }
        println!("✓ AI providers: {}", providers.join(", "));
    }

    match config.ai_backend() {
        Ok(backend) if config.has_ai_key() || (!backend.requires_api_key() && ollama) => {
            println!("✓ Selected backend: {}", backend)
        }
        Ok(backend) if !backend.requires_api_key() => println!(
            "{} Selected backend: {} (server not reachable on localhost:11434)",
            style("⚠").yellow(),
            backend
        ),
        Ok(backend) => println!(
            "{} Selected backend: {} (no {} set, get one at {})",
            style("⚠").yellow(),
            backend,
            backend.env_key(),
            backend.signup_url()
        ),
        Err(e) => {
            problems += 1;
            println!("{} Selected backend: {:#}", style("✗").red(), e);
        }
    }

    if config.embedding_api_key().is_some()
        || config
            .embedding_config()
            .is_ok_and(|c| c.backend.env_key().is_none())
    {
        println!("✓ Embeddings: enabled");
    } else {
        println!("○ Embeddings: disabled (set OPENAI_API_KEY or use the ollama backend)");
    }

    if problems == 0 {
        println!("\n✅ All checks passed!");
        Ok(())
    } else {
        anyhow::bail!("{} check(s) failed", problems)
    }
}
